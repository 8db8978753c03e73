//! `.env` file parsing and typed lookups with defaults.
use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;

use crate::error::ConfigError;
use crate::logging::DIAG_TARGET;

/// Parsed `key=value` pairs from a `.env` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    entries: HashMap<String, String>,
}

impl EnvFile {
    /// Read and parse `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(Self::parse(&content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parse `.env` content leniently.
    ///
    /// Format:
    /// ```text
    /// # comment
    /// mode = release          # inline comment stripped
    /// db_path = "data/#1.db"  # quotes kept literal '#'
    /// ```
    ///
    /// Lines without `=` are skipped. Later keys override earlier ones.
    ///
    /// ```
    /// use dayz_server_tools::config::env::EnvFile;
    ///
    /// let env = EnvFile::parse("mode = release # prod\nname='a # b'\n");
    /// assert_eq!(env.get("mode"), Some("release"));
    /// assert_eq!(env.get("name"), Some("a # b"));
    /// ```
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .filter_map(|line| parse_line(line).ok().flatten())
            .collect();
        Self { entries }
    }

    /// Parse `.env` content, rejecting lines without `=`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLine`] for the first malformed line.
    pub fn parse_strict(content: &str) -> Result<Self, ConfigError> {
        let mut entries = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            match parse_line(line) {
                Ok(Some((k, v))) => {
                    entries.insert(k, v);
                }
                Ok(None) => {}
                Err(()) => {
                    return Err(ConfigError::InvalidLine {
                        line: idx + 1,
                        content: line.trim().to_string(),
                    });
                }
            }
        }
        Ok(Self { entries })
    }

    /// Raw value of `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if no keys were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Typed value of `key`, or `default` when missing or not coercible.
    ///
    /// Both fallbacks are reported on the diagnostic channel.
    pub fn get_or<T: FromEnvValue + Display>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.get(key) else {
            tracing::warn!(
                target: DIAG_TARGET,
                "config: key '{key}' not set, using default '{default}'"
            );
            return default;
        };
        T::from_env_value(raw).unwrap_or_else(|| {
            tracing::warn!(
                target: DIAG_TARGET,
                "config: key '{key}' value '{raw}' invalid {}, using default '{default}'",
                T::TYPE_NAME
            );
            default
        })
    }
}

/// Split one line into a key/value pair.
///
/// `Ok(None)` for blank and comment lines, `Err(())` for lines with no `=`.
fn parse_line(line: &str) -> Result<Option<(String, String)>, ()> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let (key, value) = trimmed.split_once('=').ok_or(())?;
    Ok(Some((key.trim().to_string(), parse_value(value.trim()))))
}

fn parse_value(value: &str) -> String {
    for quote in ['"', '\''] {
        if value.len() >= 2
            && let Some(inner) = value
                .strip_prefix(quote)
                .and_then(|v| v.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    value
        .find('#')
        .map_or(value, |idx| value.get(..idx).unwrap_or(value).trim())
        .to_string()
}

/// Types a `.env` value can be coerced into.
pub trait FromEnvValue: Sized {
    /// Name used in coercion warnings.
    const TYPE_NAME: &'static str;

    /// Convert a raw value, or `None` if it does not fit.
    fn from_env_value(raw: &str) -> Option<Self>;
}

impl FromEnvValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_env_value(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FromEnvValue for i64 {
    const TYPE_NAME: &'static str = "int";

    fn from_env_value(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl FromEnvValue for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_env_value(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl FromEnvValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_env_value(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        }
    }
}
