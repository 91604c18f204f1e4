//! Compose session configuration.
//!
//! # Responsibility
//! - Provide defaults for search debounce and logging.
//! - Read overrides from environment variables or a JSON document.
//!
//! # Invariants
//! - Every field has a default; an empty environment is a valid config.
//! - Invalid values are rejected, never silently replaced by defaults.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_SEARCH_DELAY_MS: &str = "CHAIRMAIL_SEARCH_DELAY_MS";
pub const ENV_LOG_LEVEL: &str = "CHAIRMAIL_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CHAIRMAIL_LOG_DIR";

const DEFAULT_SEARCH_DELAY_MS: u64 = 250;

/// Configuration error with the offending key.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
    Json(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value for {key}: `{value}`"),
            Self::Json(err) => write!(f, "invalid config document: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidValue { .. } => None,
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Log verbosity accepted by [`crate::logging::init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    /// Parses a case-insensitive level name; `warning` is accepted for `warn`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl Default for LogLevel {
    /// `debug` in debug builds, `info` in release builds.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Info
        }
    }
}

/// Settings for one compose session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComposeConfig {
    /// Picker search debounce in milliseconds.
    pub search_delay_ms: u64,
    pub log_level: LogLevel,
    /// Absolute directory for rolling log files; `None` keeps logging off.
    pub log_dir: Option<PathBuf>,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            search_delay_ms: DEFAULT_SEARCH_DELAY_MS,
            log_level: LogLevel::default(),
            log_dir: None,
        }
    }
}

impl ComposeConfig {
    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }

    /// Reads a JSON config document; missing keys keep their defaults.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, which maps a variable name to its
    /// value. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = read(ENV_SEARCH_DELAY_MS) {
            config.search_delay_ms =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_SEARCH_DELAY_MS,
                        value: raw.clone(),
                    })?;
        }
        if let Some(raw) = read(ENV_LOG_LEVEL) {
            config.log_level = LogLevel::parse(&raw).ok_or(ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(raw.trim()));
        }

        Ok(config)
    }
}
