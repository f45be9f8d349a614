#![forbid(unsafe_code)]

//! Cell values crossing the column boundary.
//!
//! Inside a column, values are stored with their kind's native type
//! (`String`, `bool`, `i64`). Callers that do not know a column's kind
//! statically exchange [`Value`]s instead; a blank cell is `None`.

use std::fmt;

use crate::column_type::ColumnType;

/// A present (non-blank) cell value tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Text(String),
    Email(String),
    Boolean(bool),
    Integer(i64),
}

impl Value {
    /// Kind this value belongs to.
    #[must_use]
    pub const fn column_type(&self) -> ColumnType {
        match self {
            Self::Text(_) => ColumnType::Text,
            Self::Email(_) => ColumnType::Email,
            Self::Boolean(_) => ColumnType::Boolean,
            Self::Integer(_) => ColumnType::Integer,
        }
    }

    /// Empty text is the only representation of "blank" among present values.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) | Self::Email(s) => s.is_empty(),
            Self::Boolean(_) | Self::Integer(_) => false,
        }
    }

    /// Normalize a cell: blank text becomes `None`.
    #[must_use]
    pub fn normalize(cell: Option<Value>) -> Option<Value> {
        cell.filter(|v| !v.is_blank())
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + match self {
                Self::Text(s) | Self::Email(s) => s.len(),
                Self::Boolean(_) | Self::Integer(_) => 0,
            }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Email(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
        }
    }
}

/// Display form of a cell; blank renders as the empty string.
#[must_use]
pub fn display_cell(cell: Option<&Value>) -> String {
    cell.map(ToString::to_string).unwrap_or_default()
}
