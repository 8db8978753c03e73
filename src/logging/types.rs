//! Core logging types: levels, run mode, call sites, and the [`LogRecord`].
use std::fmt::{self, Display};
use std::panic::Location;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Local};

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Developer detail; suppressed in release mode.
    Debug,
    /// Normal operational message.
    Info,
    /// Something unexpected that the application recovered from.
    Warn,
    /// A failed operation.
    Error,
}

impl Level {
    /// Upper-case token used in both console and file lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    /// ANSI SGR sequence wrapped around the level token on the console.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Debug => "\x1b[36m",
            Self::Info => "\x1b[34m",
            Self::Warn => "\x1b[33m",
            Self::Error => "\x1b[31m",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Process-wide run mode controlling verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Development: every level is emitted.
    #[default]
    Dev,
    /// Release: DEBUG records are suppressed.
    Release,
}

impl RunMode {
    /// Parse a configured mode string.
    ///
    /// Only `release` selects [`RunMode::Release`]; every other value
    /// behaves as development mode. Unknown values are reported on the
    /// diagnostic channel.
    #[must_use]
    pub fn from_config(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "release" => Self::Release,
            "dev" => Self::Dev,
            other => {
                tracing::warn!(
                    target: super::DIAG_TARGET,
                    "unknown run mode '{other}', treating as dev"
                );
                Self::Dev
            }
        }
    }

    /// The configuration spelling of this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Release => "release",
        }
    }
}

impl Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source location of a logging call, reduced to the file's base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Base name of the source file (e.g. `main.rs`).
    pub file: String,
    /// 1-based line number.
    pub line: u32,
}

impl CallSite {
    /// Build a call site from an explicit path and line.
    #[must_use]
    pub fn new(file: &str, line: u32) -> Self {
        let base = Path::new(file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file);
        Self {
            file: base.to_string(),
            line,
        }
    }

    /// Location of the nearest caller not marked `#[track_caller]`.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }
}

impl From<&Location<'_>> for CallSite {
    fn from(loc: &Location<'_>) -> Self {
        Self::new(loc.file(), loc.line())
    }
}

impl Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A single log call, built per call and discarded after formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Record severity.
    pub level: Level,
    /// Wall-clock time of the call.
    pub timestamp: DateTime<Local>,
    /// Where the call was made.
    pub location: CallSite,
    /// Free-form message.
    pub message: String,
    /// Ordered key/value pairs, already stringified.
    pub pairs: Vec<(String, String)>,
}

impl LogRecord {
    /// Build a record, pairing up a flat argument list.
    ///
    /// Arguments are consumed two at a time as `key, value`. An unpaired
    /// trailing argument becomes a synthetic `extra` pair.
    #[must_use]
    pub fn new(
        level: Level,
        timestamp: DateTime<Local>,
        location: CallSite,
        message: &str,
        args: &[&dyn Display],
    ) -> Self {
        Self {
            level,
            timestamp,
            location,
            message: message.to_string(),
            pairs: pair_args(args),
        }
    }
}

/// Pair a flat `key, value, key, value, ...` list.
#[must_use]
pub fn pair_args(args: &[&dyn Display]) -> Vec<(String, String)> {
    args.chunks(2)
        .map(|chunk| match chunk {
            [key, value] => (key.to_string(), value.to_string()),
            [extra] => ("extra".to_string(), extra.to_string()),
            _ => (String::new(), String::new()),
        })
        .collect()
}
