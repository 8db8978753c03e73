//! Local game-server configuration tools.
//!
//! The heart of the crate is [`logging`]: a process-wide logger that writes
//! every record to both the console and a log file rolled at local midnight
//! and noon, with a background rotation checker and a signal-driven
//! flush-and-close on shutdown.
//!
//! - **[`config`]**: `.env` loading and the run mode
//! - **[`logging`]**: the logger facade, file sink, rotation and shutdown
//! - **[`cli`]**: command-line interface of the bundled binary
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
