//! Orderly flush-and-close of the file sink on interrupt or termination.
use std::io::{self, Write as _};
use std::sync::{Arc, Mutex, PoisonError};

use super::DIAG_TARGET;
use super::sink::FileSink;
use crate::error::LogError;

static INSTALLED: Mutex<bool> = Mutex::new(false);

/// Closes the [`FileSink`] when the process is asked to stop.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    sink: Arc<FileSink>,
}

impl ShutdownCoordinator {
    /// Coordinator for `sink`.
    #[must_use]
    pub const fn new(sink: Arc<FileSink>) -> Self {
        Self { sink }
    }

    /// Print a notice, then flush and close the sink.
    ///
    /// Safe to call repeatedly; later calls find the sink already closed.
    /// The stdout lock is released before the sink lock is taken, since a
    /// logging thread holds them in the opposite order.
    pub fn shutdown(&self) {
        if let Err(e) = print_notice() {
            tracing::warn!(target: DIAG_TARGET, "failed to print shutdown notice: {e}");
        }
        if let Err(e) = self.sink.close() {
            tracing::error!(target: DIAG_TARGET, "failed to close log file: {e}");
        }
    }

    /// Register the interrupt/termination handler for this process.
    ///
    /// On Unix this covers SIGINT, SIGTERM and also SIGHUP. The handler runs
    /// [`shutdown`](Self::shutdown) and exits with status 0.
    /// Only the first call registers anything; later calls return `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::SignalHandler`] if the OS handler cannot be set.
    pub fn install(self) -> Result<bool, LogError> {
        let mut installed = INSTALLED.lock().unwrap_or_else(PoisonError::into_inner);
        if *installed {
            return Ok(false);
        }
        ctrlc::set_handler(move || {
            self.shutdown();
            std::process::exit(0);
        })?;
        *installed = true;
        Ok(true)
    }
}

fn print_notice() -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "shutting down, flushing logs...")?;
    out.flush()
}
