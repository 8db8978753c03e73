//! Command-line interface: `run`, `log` and `version` plus global options.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::logging::{Level, RunMode};

/// Top-level CLI entry point for the server tools.
#[derive(Parser, Debug)]
#[command(
    name = "dayz-server-tools",
    about = "Local game-server configuration tools",
    version
)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,

    /// Show debug-level diagnostics from the logger itself
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by all commands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Path to the .env configuration file (default: ./.env)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured run mode
    #[arg(long, global = true, value_enum)]
    pub mode: Option<ModeArg>,

    /// Directory for rotated log files (default: ./logs)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

/// Run mode as accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Development: debug records are emitted.
    Dev,
    /// Release: debug records are suppressed.
    Release,
}

impl From<ModeArg> for RunMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Dev => Self::Dev,
            ModeArg::Release => Self::Release,
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start logging and wait for an interrupt or termination signal
    Run,
    /// Write a single log record
    Log(LogOpts),
    /// Print version information
    Version,
}

/// Options for the `log` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct LogOpts {
    /// Level of the record (debug, info, warn, error)
    #[arg(value_parser = clap::value_parser!(Level))]
    pub level: Level,

    /// Message text
    pub message: String,

    /// Flat key/value list; a trailing unpaired value is logged as `extra`
    pub fields: Vec<String>,
}
