//! Background rotation checker.
//!
//! Wakes on a fixed interval and asks the [`FileSink`] to rotate, so files
//! roll on schedule even when nothing is being logged.
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::DIAG_TARGET;
use super::sink::FileSink;

/// Default wake-up interval.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Handle to the running checker thread.
///
/// Dropping the handle disconnects the stop channel, which ends the thread
/// without waiting for the next tick. [`stop`](Self::stop) also joins it;
/// [`detach`](Self::detach) keeps it alive until process exit.
#[derive(Debug)]
pub struct RotationChecker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl RotationChecker {
    /// Start checking `sink` every `interval`.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn(sink: Arc<FileSink>, interval: Duration) -> io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("log-rotation".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if sink.check_rotation() {
                                tracing::debug!(target: DIAG_TARGET, "scheduled log rotation");
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;
        Ok(Self { stop_tx, handle })
    }

    /// Signal the thread to stop and wait for it.
    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        if self.handle.join().is_err() {
            tracing::warn!(target: DIAG_TARGET, "rotation checker thread panicked");
        }
    }

    /// Keep the thread running for the rest of the process.
    pub fn detach(self) {
        let Self { stop_tx, handle } = self;
        // A leaked sender keeps the channel open, so the loop never sees
        // `Disconnected`.
        std::mem::forget(stop_tx);
        drop(handle);
    }
}
