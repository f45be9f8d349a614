#![forbid(unsafe_code)]

//! Errors raised by the table model.
//!
//! Every failure is surfaced synchronously to the caller; none is fatal and
//! none is retried. [`TableError::kind`] buckets variants into the four
//! kinds a presentation layer reacts to.

use std::fmt;

use crate::column_type::ColumnType;
use crate::id::{ColumnId, TableId};

/// Coarse classification of a [`TableError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown table or column id.
    NotFound,
    /// Blank/duplicate name, out-of-range row or column index.
    InvalidArgument,
    /// A value failed its column's validity or parse grammar.
    InvalidValue,
    /// Refused because of current contents (blanks present, strict conversion).
    Blocked,
}

/// Errors that can occur when reading or mutating tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// No table with this id.
    TableNotFound(TableId),
    /// No column with this id in the table.
    ColumnNotFound { table: TableId, column: ColumnId },
    /// Column id unknown inside a single table (no registry context).
    UnknownColumn(ColumnId),
    /// Name is empty or whitespace only.
    BlankName,
    /// Name already used by a sibling.
    DuplicateName(String),
    /// Id already used by a sibling.
    DuplicateId(u32),
    /// Row index is out of bounds.
    RowOutOfBounds { index: usize, len: usize },
    /// Column position is out of bounds.
    ColumnIndexOutOfBounds { index: usize, len: usize },
    /// Table position is out of bounds.
    TableIndexOutOfBounds { index: usize, len: usize },
    /// A column with the wrong number of values was offered to a table.
    RowCountMismatch { expected: usize, actual: usize },
    /// Blank value or default in a column that does not allow blanks.
    BlankNotAllowed,
    /// Value does not satisfy the column kind's rules.
    InvalidValue {
        column_type: ColumnType,
        input: String,
        reason: &'static str,
    },
    /// Value of one kind offered to a column of another.
    TypeMismatch {
        expected: ColumnType,
        actual: ColumnType,
    },
    /// Operation refused given the current contents.
    Blocked(String),
    /// A column-level failure annotated with the column's name.
    InColumn {
        column: String,
        source: Box<TableError>,
    },
}

impl TableError {
    /// Build an invalid-value error.
    #[must_use]
    pub fn invalid_value(column_type: ColumnType, input: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidValue {
            column_type,
            input: input.into(),
            reason,
        }
    }

    /// Wrap with the name of the column the failure happened in.
    #[must_use]
    pub fn in_column(self, column: impl Into<String>) -> Self {
        Self::InColumn {
            column: column.into(),
            source: Box::new(self),
        }
    }

    /// Classification used by callers to decide how to react.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TableNotFound(_) | Self::ColumnNotFound { .. } | Self::UnknownColumn(_) => {
                ErrorKind::NotFound
            }
            Self::BlankName
            | Self::DuplicateName(_)
            | Self::DuplicateId(_)
            | Self::RowOutOfBounds { .. }
            | Self::ColumnIndexOutOfBounds { .. }
            | Self::TableIndexOutOfBounds { .. }
            | Self::RowCountMismatch { .. } => ErrorKind::InvalidArgument,
            Self::BlankNotAllowed | Self::InvalidValue { .. } | Self::TypeMismatch { .. } => {
                ErrorKind::InvalidValue
            }
            Self::Blocked(_) => ErrorKind::Blocked,
            Self::InColumn { source, .. } => source.kind(),
        }
    }

    /// Innermost error, skipping context wrappers.
    #[must_use]
    pub fn root(&self) -> &TableError {
        match self {
            Self::InColumn { source, .. } => source.root(),
            other => other,
        }
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableNotFound(id) => write!(f, "table {id} not found"),
            Self::ColumnNotFound { table, column } => {
                write!(f, "column {column} not found in table {table}")
            }
            Self::UnknownColumn(id) => write!(f, "column {id} not found"),
            Self::BlankName => write!(f, "name cannot be blank"),
            Self::DuplicateName(name) => write!(f, "name '{name}' already exists"),
            Self::DuplicateId(id) => write!(f, "id {id} already exists"),
            Self::RowOutOfBounds { index, len } => {
                write!(f, "row {index} out of bounds (row count {len})")
            }
            Self::ColumnIndexOutOfBounds { index, len } => {
                write!(f, "column position {index} out of bounds (column count {len})")
            }
            Self::TableIndexOutOfBounds { index, len } => {
                write!(f, "table position {index} out of bounds (table count {len})")
            }
            Self::RowCountMismatch { expected, actual } => {
                write!(f, "column has {actual} values, table has {expected} rows")
            }
            Self::BlankNotAllowed => write!(f, "blank values are not allowed"),
            Self::InvalidValue {
                column_type,
                input,
                reason,
            } => write!(f, "invalid {column_type} value '{input}': {reason}"),
            Self::TypeMismatch { expected, actual } => {
                write!(f, "expected a {expected} value, got a {actual} value")
            }
            Self::Blocked(msg) => write!(f, "blocked: {msg}"),
            Self::InColumn { column, source } => write!(f, "column '{column}': {source}"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InColumn { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Standard result type for the table model.
pub type Result<T> = std::result::Result<T, TableError>;
