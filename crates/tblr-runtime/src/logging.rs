#![forbid(unsafe_code)]

//! Optional `tracing-subscriber` installation.
//!
//! Library code only emits `tracing` events. Applications that do not bring
//! their own subscriber can call [`try_init`] with a [`LogConfig`].
//!
//! Targets emitted by tblr:
//!
//! | Target | Level | Events |
//! |---|---|---|
//! | `tblr.registry` | debug | every successful registry mutation |
//! | `tblr.undo` | debug / warn | execute, undo, redo; failed undo/redo |
//! | `tblr.command` | debug span | one span per executed command |
//! | `tblr.column` | trace | column conversion builds |

use std::fmt;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

const DEFAULT_FILTER: &str = "info";

/// Errors from [`try_init`].
#[derive(Debug)]
pub enum LogInitError {
    /// The configured filter did not parse.
    Filter(tracing_subscriber::filter::ParseError),
    /// JSON output was requested without the `logging-json` feature.
    JsonUnavailable,
    /// A global subscriber is already installed.
    Install(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl fmt::Display for LogInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(e) => write!(f, "invalid log filter: {e}"),
            Self::JsonUnavailable => write!(f, "JSON logging requires the `logging-json` feature"),
            Self::Install(e) => write!(f, "failed to install subscriber: {e}"),
        }
    }
}

impl std::error::Error for LogInitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Filter(e) => Some(e),
            Self::JsonUnavailable => None,
            Self::Install(e) => Some(e.as_ref()),
        }
    }
}

/// Filter from the config, else `RUST_LOG`, else `info`.
pub fn resolve_filter(config: &LogConfig) -> Result<EnvFilter, LogInitError> {
    match &config.filter {
        Some(directives) => EnvFilter::try_new(directives).map_err(LogInitError::Filter),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Install a global fmt subscriber.
///
/// Fails if another global subscriber is already set.
pub fn try_init(config: &LogConfig) -> Result<(), LogInitError> {
    let filter = resolve_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    if config.json {
        #[cfg(feature = "logging-json")]
        {
            return builder.json().try_init().map_err(LogInitError::Install);
        }
        #[cfg(not(feature = "logging-json"))]
        {
            return Err(LogInitError::JsonUnavailable);
        }
    }
    builder.try_init().map_err(LogInitError::Install)
}
