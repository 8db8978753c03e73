//! Public logger facade and the output capability it writes through.
use std::fmt::{self, Display};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::DIAG_TARGET;
use super::clock::{Clock, SystemClock};
use super::format::format_console;
use super::gate::should_emit;
use super::types::{CallSite, Level, LogRecord, RunMode};
use crate::error::LogError;

/// A destination for formatted log records.
///
/// [`ConsoleOutput`] and [`FileSink`](super::sink::FileSink) implement this
/// trait; the [`Logger`] only ever talks to it.
pub trait Output: Send + Sync {
    /// Emit one record. Never fails; problems go to the diagnostic channel.
    fn write_record(&self, record: &LogRecord);

    /// Push any buffered output to its destination.
    ///
    /// # Errors
    ///
    /// Returns the underlying flush failure.
    fn flush(&self) -> Result<(), LogError> {
        Ok(())
    }
}

/// Plain console destination writing the colored form of each record.
pub struct ConsoleOutput {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl fmt::Debug for ConsoleOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleOutput").finish_non_exhaustive()
    }
}

impl ConsoleOutput {
    /// Console output backed by standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Console output backed by an arbitrary writer.
    #[must_use]
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }
}

impl Output for ConsoleOutput {
    fn write_record(&self, record: &LogRecord) {
        let line = format_console(record);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{line}") {
            tracing::warn!(target: DIAG_TARGET, "failed to write log to console: {e}");
        }
    }

    fn flush(&self) -> Result<(), LogError> {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
            .map_err(LogError::Flush)
    }
}

/// Leveled logging facade.
///
/// Holds the run mode, the clock, and the active [`Output`]. Every logging
/// method is `#[track_caller]`, so the recorded location is the call site
/// in application code.
pub struct Logger {
    mode: RwLock<RunMode>,
    output: RwLock<Arc<dyn Output>>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Logger writing to standard output with the system clock.
    #[must_use]
    pub fn new(mode: RunMode) -> Self {
        Self::with_output(mode, Arc::new(ConsoleOutput::stdout()), Arc::new(SystemClock))
    }

    /// Logger with an explicit output and clock.
    #[must_use]
    pub fn with_output(mode: RunMode, output: Arc<dyn Output>, clock: Arc<dyn Clock>) -> Self {
        Self {
            mode: RwLock::new(mode),
            output: RwLock::new(output),
            clock,
        }
    }

    /// Current run mode.
    #[must_use]
    pub fn mode(&self) -> RunMode {
        *self.mode.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the run mode.
    pub fn set_mode(&self, mode: RunMode) {
        *self.mode.write().unwrap_or_else(PoisonError::into_inner) = mode;
    }

    /// Swap the active output; in-flight calls finish on the old one.
    pub fn set_output(&self, output: Arc<dyn Output>) {
        *self.output.write().unwrap_or_else(PoisonError::into_inner) = output;
    }

    /// The active output.
    #[must_use]
    pub fn output(&self) -> Arc<dyn Output> {
        Arc::clone(&self.output.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Flush the active output.
    ///
    /// # Errors
    ///
    /// Returns the output's flush failure.
    pub fn flush(&self) -> Result<(), LogError> {
        self.output().flush()
    }

    /// Log `message` at `level` with a flat `key, value, ...` list.
    ///
    /// ```
    /// use dayz_server_tools::logging::{Level, Logger, RunMode};
    ///
    /// let log = Logger::new(RunMode::Dev);
    /// log.log(Level::Info, "user login", &[&"user_id", &123, &"ip", &"192.168.1.1"]);
    /// ```
    #[track_caller]
    pub fn log(&self, level: Level, message: &str, args: &[&dyn Display]) {
        if !should_emit(level, self.mode()) {
            return;
        }
        let location = CallSite::caller();
        self.dispatch(level, location, message, args);
    }

    /// Log with an explicit call site, for callers that capture it themselves.
    pub fn log_at(&self, level: Level, location: CallSite, message: &str, args: &[&dyn Display]) {
        if should_emit(level, self.mode()) {
            self.dispatch(level, location, message, args);
        }
    }

    fn dispatch(&self, level: Level, location: CallSite, message: &str, args: &[&dyn Display]) {
        let record = LogRecord::new(level, self.clock.now(), location, message, args);
        self.output().write_record(&record);
    }

    /// Log at DEBUG; dropped in release mode.
    #[track_caller]
    pub fn debug(&self, message: &str, args: &[&dyn Display]) {
        self.log(Level::Debug, message, args);
    }

    /// Log at INFO.
    #[track_caller]
    pub fn info(&self, message: &str, args: &[&dyn Display]) {
        self.log(Level::Info, message, args);
    }

    /// Log at WARN.
    #[track_caller]
    pub fn warn(&self, message: &str, args: &[&dyn Display]) {
        self.log(Level::Warn, message, args);
    }

    /// Log at ERROR.
    #[track_caller]
    pub fn error(&self, message: &str, args: &[&dyn Display]) {
        self.log(Level::Error, message, args);
    }
}
