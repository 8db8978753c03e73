//! Rotating file sink: sole owner of the open log file and its buffer.
//!
//! Every operation runs under one mutex, so a record is either written
//! entirely before a rotation or entirely after it, and bytes of two
//! records never interleave. Each record is flushed before the call
//! returns; there is no write-behind.
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};

use super::DIAG_TARGET;
use super::clock::{Clock, SystemClock};
use super::format::{format_console, format_file};
use super::logger::Output;
use super::rotation;
use super::types::LogRecord;
use crate::error::LogError;

/// Consecutive reopen attempts allowed after a failed rotation before file
/// output is abandoned until the next period boundary.
pub const MAX_REOPEN_ATTEMPTS: u32 = 3;

/// Mutable sink state; only touched while holding [`FileSink::state`].
struct SinkState {
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
    last_rotation: DateTime<Local>,
    reopen_attempts: u32,
    closed: bool,
    console: Box<dyn Write + Send>,
}

/// Log destination writing every record to the console and to a file that
/// rolls over at local midnight and noon.
pub struct FileSink {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
    state: Mutex<SinkState>,
}

impl fmt::Debug for FileSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("FileSink")
            .field("dir", &self.dir)
            .field("path", &state.path)
            .field("last_rotation", &state.last_rotation)
            .field("closed", &state.closed)
            .finish_non_exhaustive()
    }
}

impl FileSink {
    /// Open a sink in `dir` using the system clock and standard output.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::CreateDir`] or [`LogError::Open`] if the directory
    /// or the current period's file cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, LogError> {
        Self::open_with(dir, Arc::new(SystemClock), Box::new(io::stdout()))
    }

    /// Open a sink with an explicit clock and console writer.
    ///
    /// Creates `dir` if absent, then opens (appending) the file named for
    /// the clock's current period.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::CreateDir`] or [`LogError::Open`] on failure;
    /// the caller should keep logging to the console only.
    pub fn open_with(
        dir: impl Into<PathBuf>,
        clock: Arc<dyn Clock>,
        console: Box<dyn Write + Send>,
    ) -> Result<Self, LogError> {
        let dir = dir.into();
        create_log_dir(&dir)?;
        let now = clock.now();
        let (path, writer) = open_file(&dir, &now)?;
        tracing::debug!(target: DIAG_TARGET, "opened log file {}", path.display());
        Ok(Self {
            dir,
            clock,
            state: Mutex::new(SinkState {
                writer: Some(writer),
                path: Some(path),
                last_rotation: now,
                reopen_attempts: 0,
                closed: false,
                console,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Directory the log files live in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the most recently opened log file.
    #[must_use]
    pub fn current_path(&self) -> Option<PathBuf> {
        self.lock().path.clone()
    }

    /// Return `true` once [`close`](Self::close) has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Return `true` if the sink currently holds a file writer.
    #[must_use]
    pub fn has_writer(&self) -> bool {
        self.lock().writer.is_some()
    }

    /// Write one record to the console and the log file.
    ///
    /// Rotates first if a boundary was crossed. Failures are reported on the
    /// diagnostic channel and never returned; writes after
    /// [`close`](Self::close) are dropped.
    pub fn write_log(&self, record: &LogRecord) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        let now = self.clock.now();
        self.maintain(&mut state, &now);

        let console_line = format_console(record);
        let file_line = format_file(record);

        if let Err(e) = writeln!(state.console, "{console_line}").and_then(|()| state.console.flush())
        {
            tracing::warn!(target: DIAG_TARGET, "failed to write log to console: {e}");
        }
        if let Some(writer) = state.writer.as_mut()
            && let Err(e) = writeln!(writer, "{file_line}").and_then(|()| writer.flush())
        {
            tracing::warn!(target: DIAG_TARGET, "failed to write log file: {e}");
        }
    }

    /// Write raw bytes to the console and the log file.
    ///
    /// Performs the same rotation check as [`write_log`](Self::write_log).
    /// Console failures are only reported; file failures are returned.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::NotInitialized`] after close,
    /// [`LogError::WriterUnavailable`] when a reopen has failed, or the
    /// underlying write/flush error.
    pub fn write_raw(&self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock();
        if state.closed {
            return Err(LogError::NotInitialized.into());
        }
        let now = self.clock.now();
        self.maintain(&mut state, &now);

        if let Err(e) = state.console.write_all(buf).and_then(|()| state.console.flush()) {
            tracing::warn!(target: DIAG_TARGET, "failed to write log to console: {e}");
        }
        let Some(writer) = state.writer.as_mut() else {
            return Err(LogError::WriterUnavailable.into());
        };
        writer.write_all(buf)?;
        writer.flush()?;
        Ok(buf.len())
    }

    /// Rotate if a boundary has passed since the last rotation.
    ///
    /// Called by the background checker so idle periods still roll over.
    /// Returns `true` if a rotation happened.
    pub fn check_rotation(&self) -> bool {
        let mut state = self.lock();
        if state.closed {
            return false;
        }
        let now = self.clock.now();
        self.maintain(&mut state, &now)
    }

    /// Flush buffered file output.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Flush`] if the buffer cannot be written out.
    pub fn flush(&self) -> Result<(), LogError> {
        let mut state = self.lock();
        match state.writer.as_mut() {
            Some(writer) => writer.flush().map_err(LogError::Flush),
            None => Ok(()),
        }
    }

    /// Flush and close the current file; further record writes are dropped.
    ///
    /// Idempotent: closing an already-closed sink succeeds silently.
    ///
    /// # Errors
    ///
    /// Returns the flush or sync error of the final file. The sink is marked
    /// closed regardless.
    pub fn close(&self) -> Result<(), LogError> {
        let mut state = self.lock();
        if state.closed {
            return Ok(());
        }
        state.closed = true;
        let result = close_current(&mut state);
        tracing::info!(target: DIAG_TARGET, "log file closed");
        result
    }

    /// Run the rotation policy and the bounded reopen retry.
    fn maintain(&self, state: &mut SinkState, now: &DateTime<Local>) -> bool {
        if rotation::needs_rotation(&state.last_rotation, now) {
            state.reopen_attempts = 0;
            self.rotate(state, now);
            true
        } else {
            if state.writer.is_none() && state.reopen_attempts < MAX_REOPEN_ATTEMPTS {
                self.reopen(state, now);
            }
            false
        }
    }

    fn rotate(&self, state: &mut SinkState, now: &DateTime<Local>) {
        if let Err(e) = close_current(state) {
            tracing::warn!(target: DIAG_TARGET, "log rotation: {e}");
        }
        state.last_rotation = *now;
        self.reopen(state, now);
    }

    fn reopen(&self, state: &mut SinkState, now: &DateTime<Local>) {
        match open_file(&self.dir, now) {
            Ok((path, writer)) => {
                tracing::debug!(target: DIAG_TARGET, "opened log file {}", path.display());
                state.writer = Some(writer);
                state.path = Some(path);
                state.reopen_attempts = 0;
            }
            Err(e) => {
                state.reopen_attempts += 1;
                tracing::warn!(
                    target: DIAG_TARGET,
                    "log rotation failed (attempt {}/{MAX_REOPEN_ATTEMPTS}): {e}",
                    state.reopen_attempts
                );
            }
        }
    }
}

impl Output for FileSink {
    fn write_record(&self, record: &LogRecord) {
        self.write_log(record);
    }

    fn flush(&self) -> Result<(), LogError> {
        Self::flush(self)
    }
}

impl Write for &FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (*self).write_raw(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        FileSink::flush(*self).map_err(io::Error::from)
    }
}

/// Flush, sync and drop the current writer, if any.
fn close_current(state: &mut SinkState) -> Result<(), LogError> {
    let Some(writer) = state.writer.take() else {
        return Ok(());
    };
    let file = writer
        .into_inner()
        .map_err(|e| LogError::Flush(e.into_error()))?;
    file.sync_all().map_err(|source| LogError::Close {
        path: state.path.clone().unwrap_or_default(),
        source,
    })
}

fn create_log_dir(dir: &Path) -> Result<(), LogError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt as _;
        builder.mode(0o755);
    }
    builder.create(dir).map_err(|source| LogError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn open_file(dir: &Path, now: &DateTime<Local>) -> Result<(PathBuf, BufWriter<File>), LogError> {
    let path = dir.join(rotation::file_name(now));
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt as _;
        options.mode(0o644);
    }
    match options.open(&path) {
        Ok(file) => Ok((path, BufWriter::new(file))),
        Err(source) => Err(LogError::Open { path, source }),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::clock::ManualClock;
    use crate::logging::types::{CallSite, Level};
    use chrono::{TimeDelta, TimeZone as _};
    use std::thread;

    /// Console writer whose bytes the test can inspect.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 1, h, m, s).single().unwrap()
    }

    fn sink_at(
        start: DateTime<Local>,
    ) -> (FileSink, Arc<ManualClock>, SharedBuf, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let console = SharedBuf::default();
        let sink = FileSink::open_with(
            tmp.path().join("logs"),
            Arc::clone(&clock) as Arc<dyn Clock>,
            Box::new(console.clone()),
        )
        .unwrap();
        (sink, clock, console, tmp)
    }

    fn record(clock: &ManualClock, msg: &str) -> LogRecord {
        LogRecord::new(
            Level::Info,
            clock.now(),
            CallSite::new("sink.rs", 1),
            msg,
            &[],
        )
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn open_creates_dir_and_period_file() {
        let (sink, _clock, _console, tmp) = sink_at(at(9, 0, 0));
        let path = sink.current_path().unwrap();
        assert_eq!(path, tmp.path().join("logs").join("app_2024-01-01_AM.log"));
        assert!(path.exists(), "log file should exist after open");
    }

    #[test]
    fn open_fails_when_dir_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("logs");
        fs::write(&blocker, "not a directory").unwrap();
        let err = FileSink::open_with(
            &blocker,
            Arc::new(ManualClock::new(at(9, 0, 0))),
            Box::new(io::sink()),
        )
        .unwrap_err();
        assert!(matches!(err, LogError::CreateDir { .. }), "got {err:?}");
    }

    #[test]
    fn write_log_is_durable_immediately() {
        let (sink, clock, console, _tmp) = sink_at(at(9, 0, 0));
        sink.write_log(&record(&clock, "started"));
        let contents = read(&sink.current_path().unwrap());
        assert!(contents.contains("[2024-01-01 09:00:00] [INFO] [sink.rs:1] started\n"));
        assert!(
            console.contents().contains("\x1b[34mINFO\x1b[0m"),
            "console line should carry color"
        );
        assert!(!contents.contains('\x1b'), "file line must be plain");
    }

    #[test]
    fn write_appends_to_existing_file() {
        let (sink, clock, _console, tmp) = sink_at(at(9, 0, 0));
        sink.write_log(&record(&clock, "first"));
        sink.close().unwrap();
        let reopened = FileSink::open_with(
            tmp.path().join("logs"),
            Arc::clone(&clock) as Arc<dyn Clock>,
            Box::new(io::sink()),
        )
        .unwrap();
        reopened.write_log(&record(&clock, "second"));
        let contents = read(&reopened.current_path().unwrap());
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("first") && contents.contains("second"));
    }

    #[test]
    fn write_across_noon_rotates_once() {
        let (sink, clock, _console, _tmp) = sink_at(at(11, 59, 0));
        let am = sink.current_path().unwrap();
        sink.write_log(&record(&clock, "morning"));

        clock.set(at(12, 0, 1));
        sink.write_log(&record(&clock, "afternoon"));
        let pm = sink.current_path().unwrap();

        assert!(pm.ends_with("app_2024-01-01_PM.log"));
        assert_eq!(read(&am).lines().count(), 1, "AM file complete");
        assert!(read(&am).contains("morning"));
        assert!(!read(&am).contains("afternoon"));
        assert!(read(&pm).contains("afternoon"));
        assert!(!sink.check_rotation(), "no second rotation in same period");
    }

    #[test]
    fn check_rotation_rolls_idle_sink() {
        let (sink, clock, _console, _tmp) = sink_at(at(23, 59, 30));
        assert!(!sink.check_rotation());
        clock.advance(TimeDelta::seconds(60));
        assert!(sink.check_rotation());
        let path = sink.current_path().unwrap();
        assert!(path.ends_with("app_2024-01-02_AM.log"));
        assert!(path.exists(), "new file should be created proactively");
    }

    #[test]
    fn close_is_idempotent_and_drops_later_writes() {
        let (sink, clock, console, _tmp) = sink_at(at(9, 0, 0));
        sink.write_log(&record(&clock, "before"));
        assert!(sink.close().is_ok());
        assert!(sink.close().is_ok());
        assert!(sink.is_closed());
        assert!(!sink.has_writer());

        sink.write_log(&record(&clock, "after"));
        let contents = read(&sink.current_path().unwrap());
        assert!(!contents.contains("after"));
        assert!(!console.contents().contains("after"));
    }

    #[test]
    fn write_raw_after_close_is_not_initialized() {
        let (sink, _clock, _console, _tmp) = sink_at(at(9, 0, 0));
        sink.close().unwrap();
        let err = sink.write_raw(b"late\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        assert!(!sink.check_rotation(), "closed sink never rotates");
    }

    #[test]
    fn write_raw_returns_byte_count() {
        let (sink, _clock, console, _tmp) = sink_at(at(9, 0, 0));
        let mut w = &sink;
        let n = w.write(b"raw line\n").unwrap();
        assert_eq!(n, 9);
        assert_eq!(read(&sink.current_path().unwrap()), "raw line\n");
        assert_eq!(console.contents(), "raw line\n");
    }

    #[test]
    fn failed_reopen_keeps_console_and_retries_on_next_write() {
        let (sink, clock, console, tmp) = sink_at(at(11, 0, 0));
        let dir = tmp.path().join("logs");
        fs::remove_dir_all(&dir).unwrap();

        clock.set(at(12, 30, 0));
        sink.write_log(&record(&clock, "lost-file-half"));
        assert!(!sink.has_writer(), "reopen should have failed");
        assert!(console.contents().contains("lost-file-half"));

        let mut raw = &sink;
        let err = raw.write(b"raw\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);

        fs::create_dir_all(&dir).unwrap();
        sink.write_log(&record(&clock, "recovered"));
        let pm = sink.current_path().unwrap();
        assert!(pm.ends_with("app_2024-01-01_PM.log"));
        let contents = read(&pm);
        assert!(contents.contains("recovered"));
        assert!(!contents.contains("lost-file-half"));
    }

    #[test]
    fn reopen_retries_are_bounded_until_next_boundary() {
        let (sink, clock, _console, tmp) = sink_at(at(11, 0, 0));
        let dir = tmp.path().join("logs");
        fs::remove_dir_all(&dir).unwrap();

        clock.set(at(12, 0, 0));
        // Rotation attempt plus the remaining retries.
        for _ in 0..MAX_REOPEN_ATTEMPTS {
            sink.write_log(&record(&clock, "dropped"));
        }
        fs::create_dir_all(&dir).unwrap();
        sink.write_log(&record(&clock, "still-dropped"));
        assert!(!sink.has_writer(), "retry budget should be exhausted");

        clock.set(Local.with_ymd_and_hms(2024, 1, 2, 0, 0, 5).single().unwrap());
        sink.write_log(&record(&clock, "next-day"));
        assert!(sink.has_writer(), "boundary rotation resets the budget");
        let contents = read(&sink.current_path().unwrap());
        assert!(contents.contains("next-day"));
    }

    #[test]
    fn concurrent_writers_never_interleave() {
        let (sink, clock, _console, _tmp) = sink_at(at(9, 0, 0));
        let sink = Arc::new(sink);
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let sink = Arc::clone(&sink);
                let clock = Arc::clone(&clock);
                thread::spawn(move || {
                    for i in 0..50 {
                        sink.write_log(&record(&clock, &format!("thread-{t}-line-{i}")));
                    }
                })
            })
            .collect();
        for handle in threads {
            handle.join().unwrap();
        }
        let contents = read(&sink.current_path().unwrap());
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 400);
        for line in lines {
            assert!(
                line.starts_with("[2024-01-01 09:00:00] [INFO] [sink.rs:1] thread-"),
                "corrupted line: {line}"
            );
        }
    }
}
