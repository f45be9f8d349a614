#![forbid(unsafe_code)]

//! tblr public facade crate.
//!
//! This crate provides the stable surface area for users. It re-exports the
//! common types from `tblr-core` and `tblr-runtime` and offers a prelude for
//! day-to-day usage.
//!
//! ```
//! use tblr::prelude::*;
//!
//! let mut session = Session::new();
//! let t = session.create_table()?;
//! let c = session.add_column(t)?;
//! session.add_row(t)?;
//! session.set_cell_value_from_str(t, c, 0, "42")?;
//! session.convert_column_type(t, c, ColumnType::Integer)?;
//! assert_eq!(session.registry().cell_value(t, c, 0)?, Some(Value::Integer(42)));
//!
//! session.undo();
//! assert_eq!(session.registry().column_type(t, c)?, ColumnType::Text);
//! # Ok::<(), tblr::Error>(())
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use tblr_core::{
    Column, ColumnId, ColumnType, ErrorKind, Table, TableError, TableId, Value, display_cell,
};

// --- Runtime re-exports ----------------------------------------------------

pub use tblr_runtime::undo::BlankRelaxation;
pub use tblr_runtime::{
    CommandBatch, CommandError, CommandMetadata, CommandSource, ConfigError, HistoryConfig,
    HistoryManager, LogConfig, Session, SessionConfig, TableRegistry, UndoableCmd,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for tblr applications.
#[derive(Debug)]
pub enum Error {
    /// A table operation was rejected.
    Table(TableError),
    /// A command could not run or be undone.
    Command(CommandError),
    /// Configuration could not be loaded or is invalid.
    Config(ConfigError),
}

impl Error {
    /// Error category of the underlying table failure, if any.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Table(e) => Some(e.kind()),
            Self::Command(e) => e.kind(),
            Self::Config(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(err) => write!(f, "{err}"),
            Self::Command(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Table(err) => Some(err),
            Self::Command(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<TableError> for Error {
    fn from(err: TableError) -> Self {
        Self::Table(err)
    }
}

impl From<CommandError> for Error {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Table(inner) => Self::Table(inner),
            other => Self::Command(other),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for tblr APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ColumnId, ColumnType, Error, ErrorKind, Result, Session, SessionConfig, TableId,
        TableRegistry, Value,
    };

    pub use crate::{core, runtime};
}

pub use tblr_core as core;
pub use tblr_runtime as runtime;
