#![forbid(unsafe_code)]

//! The closed set of column kinds.

use std::fmt;
use std::str::FromStr;

/// Kind of a column.
///
/// The set is closed; every match over it is checked for exhaustiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnType {
    /// Free-form text.
    #[default]
    Text,
    /// Text holding exactly one `@` and no whitespace.
    Email,
    /// `true` / `false`.
    Boolean,
    /// Signed integer in canonical decimal form.
    Integer,
}

impl ColumnType {
    /// All kinds in cycle order.
    pub const ALL: [ColumnType; 4] = [
        ColumnType::Text,
        ColumnType::Email,
        ColumnType::Boolean,
        ColumnType::Integer,
    ];

    /// Successor in the cycle Text → Email → Boolean → Integer → Text.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Text => Self::Email,
            Self::Email => Self::Boolean,
            Self::Boolean => Self::Integer,
            Self::Integer => Self::Text,
        }
    }

    /// Whether this kind refuses to absorb cross-type data on conversion.
    #[must_use]
    pub const fn is_strict(self) -> bool {
        !matches!(self, Self::Text)
    }

    /// Display label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Email => "Email",
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no column kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColumnType(pub String);

impl fmt::Display for UnknownColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown column type '{}'", self.0)
    }
}

impl std::error::Error for UnknownColumnType {}

impl FromStr for ColumnType {
    type Err = UnknownColumnType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "string" => Ok(Self::Text),
            "email" => Ok(Self::Email),
            "boolean" | "bool" => Ok(Self::Boolean),
            "integer" | "int" => Ok(Self::Integer),
            _ => Err(UnknownColumnType(s.to_string())),
        }
    }
}
