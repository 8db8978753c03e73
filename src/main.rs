use std::fmt::Display;
use std::io::Write as _;

use anyhow::{Context as _, Result};
use clap::Parser;

use dayz_server_tools::cli::{self, Command, LogOpts};
use dayz_server_tools::config::{self, Config};
use dayz_server_tools::logging::{self, CallSite, RunMode};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose);

    if matches!(args.command, Command::Version) {
        let version = option_env!("DAYZ_TOOLS_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        writeln!(std::io::stdout(), "dayz-server-tools {version}")?;
        return Ok(());
    }

    let mut config = match &args.global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::load_from_cwd(),
    };
    if let Some(mode) = args.global.mode {
        config.mode = RunMode::from(mode);
    }
    let mode = config.mode();
    config::set_global(config.clone());
    logging::global().set_mode(mode);

    let log_dir = args
        .global
        .log_dir
        .clone()
        .unwrap_or_else(logging::default_log_dir);
    if let Err(e) = logging::init_file_logging(&log_dir) {
        logging::warn("file logging unavailable, using console only", &[&"error", &e]);
    }

    let result = match args.command {
        Command::Run => run(&config),
        Command::Log(opts) => {
            log_once(&opts);
            Ok(())
        }
        Command::Version => Ok(()),
    };
    logging::flush_logs().context("flushing logs")?;
    result
}

/// Log the startup notice, then idle until the shutdown handler exits.
fn run(config: &Config) -> ! {
    logging::info(
        "starting DayZ Server Tools",
        &[
            &"mode",
            &config.mode(),
            &"db_path",
            &config.db_path().display(),
        ],
    );
    loop {
        std::thread::park();
    }
}

fn log_once(opts: &LogOpts) {
    let fields: Vec<&dyn Display> = opts.fields.iter().map(|f| f as &dyn Display).collect();
    logging::global().log_at(
        opts.level,
        CallSite::new("cli", 0),
        &opts.message,
        &fields,
    );
}
