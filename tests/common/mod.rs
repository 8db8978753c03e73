// Shared helpers for integration tests.
//
// Provides a temporary log directory, a manually driven clock, and a
// console buffer so each test can run the logging stack in isolation from
// the process-wide logger.
#![allow(dead_code)]

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeZone as _};
use dayz_server_tools::logging::{Clock, FileSink, Logger, ManualClock, Output, RunMode};

/// Local time on 2024-01-01 at `h:m:s`.
pub fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 1, 1, h, m, s)
        .single()
        .expect("unambiguous local time")
}

/// Console writer whose bytes the test can inspect.
#[derive(Clone, Default)]
pub struct ConsoleBuf(Arc<Mutex<Vec<u8>>>);

impl ConsoleBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().expect("console lock").clone()).expect("utf-8 console")
    }
}

impl Write for ConsoleBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("console lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A logger wired to a fresh file sink in a temporary directory.
pub struct LoggingContext {
    pub dir: tempfile::TempDir,
    pub clock: Arc<ManualClock>,
    pub console: ConsoleBuf,
    pub sink: Arc<FileSink>,
    pub logger: Logger,
}

impl LoggingContext {
    /// Start at `start` in `mode`, with output already routed to the sink.
    pub fn new(mode: RunMode, start: DateTime<Local>) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let clock = Arc::new(ManualClock::new(start));
        let console = ConsoleBuf::default();
        let sink = Arc::new(
            FileSink::open_with(
                dir.path().join("logs"),
                Arc::clone(&clock) as Arc<dyn Clock>,
                Box::new(console.clone()),
            )
            .expect("open file sink"),
        );
        let logger = Logger::with_output(
            mode,
            Arc::clone(&sink) as Arc<dyn Output>,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        Self {
            dir,
            clock,
            console,
            sink,
            logger,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.dir.path().join("logs")
    }

    pub fn read(&self, name: &str) -> String {
        read(&self.log_dir().join(name))
    }

    /// Names of all files in the log directory, sorted.
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.log_dir())
            .expect("read log dir")
            .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}
