//! Domain-specific error types for the server tools.
//!
//! Library modules return typed errors ([`LogError`], [`ConfigError`]);
//! the binary converts them to [`anyhow::Error`] at the command boundary
//! via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! LogError     : file sink initialization, rotation, flush, close, signals
//! ConfigError  : `.env` reading
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the file logging core.
///
/// Only the initialization variants ([`LogError::CreateDir`],
/// [`LogError::Open`]) are fatal to file logging; everything else is
/// reported on the diagnostic channel by the record path and only surfaces
/// to callers of the raw byte path or of explicit flush/close calls.
#[derive(Error, Debug)]
pub enum LogError {
    /// The log directory could not be created.
    #[error("failed to create log directory {}: {source}", .path.display())]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A log file could not be opened for appending.
    #[error("failed to open log file {}: {source}", .path.display())]
    Open {
        /// File that could not be opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Flushing the buffered writer failed.
    #[error("failed to flush log buffer: {0}")]
    Flush(#[source] io::Error),

    /// Closing (syncing) the current log file failed.
    #[error("failed to close log file {}: {source}", .path.display())]
    Close {
        /// File that was being closed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The sink has been closed and no longer accepts direct writes.
    #[error("log file writer is closed")]
    NotInitialized,

    /// The sink is open but holds no file writer (a reopen failed).
    #[error("log file writer is unavailable")]
    WriterUnavailable,

    /// The interrupt/termination handler could not be registered.
    #[error("failed to install shutdown signal handler: {0}")]
    SignalHandler(#[from] ctrlc::Error),
}

impl From<LogError> for io::Error {
    fn from(err: LogError) -> Self {
        match err {
            LogError::CreateDir { source, .. }
            | LogError::Open { source, .. }
            | LogError::Flush(source)
            | LogError::Close { source, .. } => source,
            other @ (LogError::NotInitialized | LogError::WriterUnavailable) => {
                Self::new(io::ErrorKind::NotConnected, other)
            }
            other @ LogError::SignalHandler(_) => Self::other(other),
        }
    }
}

/// Errors that arise from loading the `.env` configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A non-comment line has no `=` separator.
    #[error("invalid line {line} in config file: {content}")]
    InvalidLine {
        /// 1-based line number.
        line: usize,
        /// The offending line, trimmed.
        content: String,
    },
}
