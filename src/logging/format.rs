//! Line formatting for the console (colored level) and the log file (plain).
//!
//! Both forms share the shape
//! `[<timestamp>] [<LEVEL>] [<file>:<line>] <message>[ | k1=v1 k2=v2]`.
use std::fmt::Write as _;

use chrono::{DateTime, Local};

use super::types::LogRecord;

const RESET: &str = "\x1b[0m";

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS` in local time.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Local>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Console form: the level token is wrapped in its ANSI color.
#[must_use]
pub fn format_console(record: &LogRecord) -> String {
    let level = format!("{}{}{RESET}", record.level.color(), record.level);
    render(record, &level)
}

/// File form: identical to the console form without escape codes.
#[must_use]
pub fn format_file(record: &LogRecord) -> String {
    render(record, record.level.as_str())
}

fn render(record: &LogRecord, level: &str) -> String {
    let mut line = format!(
        "[{}] [{level}] [{}] {}",
        format_timestamp(&record.timestamp),
        record.location,
        record.message
    );
    if !record.pairs.is_empty() {
        line.push_str(" |");
        for (key, value) in &record.pairs {
            let _ = write!(line, " {key}={value}");
        }
    }
    line
}
