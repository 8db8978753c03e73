//! Dual-destination logging with half-day file rotation.
//!
//! Records go through the [`Logger`] facade, which applies the level gate,
//! captures the call site, and hands the record to the active [`Output`]:
//! either a plain [`ConsoleOutput`] or the rotating [`FileSink`]. The sink
//! is shared with a [`RotationChecker`] thread and a
//! [`ShutdownCoordinator`] signal handler, all serialized by the sink's
//! lock.
//!
//! The free functions in this module operate on a process-wide logger that
//! is created lazily on first use.

mod checker;
mod clock;
mod format;
mod gate;
mod logger;
mod rotation;
mod shutdown;
mod sink;
mod subscriber;
mod types;

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

pub use checker::{CHECK_INTERVAL, RotationChecker};
pub use clock::{Clock, ManualClock, SystemClock};
pub use format::{format_console, format_file, format_timestamp};
pub use gate::should_emit;
pub use logger::{ConsoleOutput, Logger, Output};
pub use rotation::{Period, file_name, needs_rotation};
pub use shutdown::ShutdownCoordinator;
pub use sink::{FileSink, MAX_REOPEN_ATTEMPTS};
pub use subscriber::init_subscriber;
pub use types::{CallSite, Level, LogRecord, RunMode, pair_args};

use crate::error::LogError;

/// `tracing` target of the diagnostic side-channel.
pub const DIAG_TARGET: &str = "dayz_server_tools::diag";

static GLOBAL: OnceLock<Logger> = OnceLock::new();
static FILE_SINK: Mutex<Option<Arc<FileSink>>> = Mutex::new(None);

/// The process-wide logger, created on first use in the configured mode.
pub fn global() -> &'static Logger {
    GLOBAL.get_or_init(|| Logger::new(crate::config::global().mode()))
}

/// Replace the process-wide logger's output.
pub fn set_output(output: Arc<dyn Output>) {
    global().set_output(output);
}

/// `<cwd>/logs`, or a relative `logs` if the working directory is unknown.
#[must_use]
pub fn default_log_dir() -> PathBuf {
    std::env::current_dir().map_or_else(|_| PathBuf::from("logs"), |cwd| cwd.join("logs"))
}

/// The process-wide file sink, opened in `dir` on first call.
///
/// The first successful call also starts the background rotation checker
/// and registers the shutdown handler. Later calls return the same sink and
/// ignore `dir`. A failed call leaves nothing behind, so it may be retried.
///
/// # Errors
///
/// Returns [`LogError::CreateDir`] or [`LogError::Open`] if the sink cannot
/// be opened; console logging is unaffected.
pub fn file_sink(dir: &Path) -> Result<Arc<FileSink>, LogError> {
    let mut slot = FILE_SINK.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(sink) = slot.as_ref() {
        return Ok(Arc::clone(sink));
    }

    let sink = Arc::new(FileSink::open(dir)?);
    match RotationChecker::spawn(Arc::clone(&sink), CHECK_INTERVAL) {
        Ok(checker) => checker.detach(),
        Err(e) => tracing::warn!(target: DIAG_TARGET, "rotation checker not started: {e}"),
    }
    if let Err(e) = ShutdownCoordinator::new(Arc::clone(&sink)).install() {
        tracing::warn!(target: DIAG_TARGET, "{e}");
    }
    *slot = Some(Arc::clone(&sink));
    Ok(sink)
}

/// Open the file sink in `dir` and route the process-wide logger to it.
///
/// # Errors
///
/// Propagates [`file_sink`] failures; the logger then stays on the console.
pub fn init_file_logging(dir: &Path) -> Result<Arc<FileSink>, LogError> {
    let sink = file_sink(dir)?;
    set_output(Arc::clone(&sink) as Arc<dyn Output>);
    Ok(sink)
}

/// Flush whatever the process-wide logger is writing to.
///
/// # Errors
///
/// Returns the flush failure of the file sink or console.
pub fn flush_logs() -> Result<(), LogError> {
    let sink = FILE_SINK
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match sink {
        Some(sink) => sink.flush(),
        None => global().flush(),
    }
}

/// Log through the process-wide logger.
#[track_caller]
pub fn log(level: Level, message: &str, args: &[&dyn Display]) {
    global().log(level, message, args);
}

/// DEBUG through the process-wide logger.
#[track_caller]
pub fn debug(message: &str, args: &[&dyn Display]) {
    global().log(Level::Debug, message, args);
}

/// INFO through the process-wide logger.
#[track_caller]
pub fn info(message: &str, args: &[&dyn Display]) {
    global().log(Level::Info, message, args);
}

/// WARN through the process-wide logger.
#[track_caller]
pub fn warn(message: &str, args: &[&dyn Display]) {
    global().log(Level::Warn, message, args);
}

/// ERROR through the process-wide logger.
#[track_caller]
pub fn error(message: &str, args: &[&dyn Display]) {
    global().log(Level::Error, message, args);
}
