//! Application configuration loaded from a `.env` file.
//!
//! Only the run mode matters to the logging core; the database path is
//! carried for the persistence layer.
pub mod env;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::ConfigError;
use crate::logging::{DIAG_TARGET, RunMode};
use env::EnvFile;

/// Default database file name.
pub const DEFAULT_DB_PATH: &str = "database.db";

/// Loaded application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Verbosity mode.
    pub mode: RunMode,
    /// Path to the local database file.
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: RunMode::Dev,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

impl Config {
    /// Load from `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(EnvFile::load(path)?.map_or_else(Self::default, |env| Self::from_env(&env)))
    }

    /// Load `.env` from the working directory, falling back to defaults on
    /// any error.
    #[must_use]
    pub fn load_from_cwd() -> Self {
        let path = std::env::current_dir()
            .map(|cwd| cwd.join(".env"))
            .unwrap_or_else(|_| PathBuf::from(".env"));
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!(target: DIAG_TARGET, "{e}; using default configuration");
            Self::default()
        })
    }

    /// Build from parsed entries, applying per-key defaults.
    #[must_use]
    pub fn from_env(env: &EnvFile) -> Self {
        let mode = env.get_or("mode", RunMode::Dev.as_str().to_string());
        let db_path = env.get_or("db_path", DEFAULT_DB_PATH.to_string());
        Self {
            mode: RunMode::from_config(&mode),
            db_path: PathBuf::from(db_path),
        }
    }

    /// Current run mode.
    #[must_use]
    pub const fn mode(&self) -> RunMode {
        self.mode
    }

    /// Return `true` in development mode.
    #[must_use]
    pub fn is_dev(&self) -> bool {
        self.mode == RunMode::Dev
    }

    /// Database file path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

static GLOBAL: OnceLock<Config> = OnceLock::new();

/// Install `config` as the process-wide configuration.
///
/// Returns `false` if a configuration was already installed or loaded.
pub fn set_global(config: Config) -> bool {
    GLOBAL.set(config).is_ok()
}

/// The process-wide configuration, loaded from `<cwd>/.env` on first use.
pub fn global() -> &'static Config {
    GLOBAL.get_or_init(Config::load_from_cwd)
}
