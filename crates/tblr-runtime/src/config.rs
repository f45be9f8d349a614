#![forbid(unsafe_code)]

//! Session configuration as data.
//!
//! [`SessionConfig`] groups the history limits and the logging setup so an
//! embedding application can load them from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # tblr.toml
//! [history]
//! max_depth = 500
//! max_bytes = 4194304
//!
//! [logging]
//! filter = "tblr=debug"
//! json = false
//! ```
//!
//! ```rust,ignore
//! let config = SessionConfig::from_toml_file("tblr.toml")?.validated()?;
//! let session = Session::with_config(&config);
//! ```
//!
//! # Defaults
//!
//! History is unbounded and logging uses `RUST_LOG` (or `info`) with the
//! plain text formatter.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::undo::HistoryConfig;

/// Top-level configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SessionConfig {
    /// Undo/redo limits.
    pub history: HistoryConfig,
    /// Subscriber setup used by [`logging::try_init`](crate::logging).
    pub logging: LogConfig,
}

/// Logging subscriber setup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct LogConfig {
    /// `EnvFilter` directives; falls back to `RUST_LOG`, then `info`.
    pub filter: Option<String>,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl SessionConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.history.validate();

        if let Some(filter) = &self.logging.filter {
            if filter.trim().is_empty() {
                errors.push("logging.filter must not be blank when set".into());
            }
            #[cfg(feature = "logging")]
            if let Err(e) = tracing_subscriber::EnvFilter::try_new(filter) {
                errors.push(format!("logging.filter is not a valid filter: {e}"));
            }
        }

        if self.logging.json && !cfg!(feature = "logging-json") {
            errors.push("logging.json requires the `logging-json` feature".into());
        }

        errors
    }

    /// Return `self` if [`validate`](Self::validate) finds no problems.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading a session configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
