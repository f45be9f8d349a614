#![forbid(unsafe_code)]

//! Columns as a closed sum over the four kinds.
//!
//! [`Column`] wraps one [`TypedColumn`] per kind and forwards the shared
//! contract to it. Values cross this boundary as [`Value`]; a value of the
//! wrong kind is rejected with [`TableError::TypeMismatch`] rather than
//! coerced.
//!
//! # Type conversion rules
//!
//! [`Column::can_change_to_type`] looks only at the current default and
//! stored values:
//!
//! | From | To | Legal when |
//! |------|----|------------|
//! | any | same kind | always |
//! | any | Text | always |
//! | Text | Email | every value/default blank or containing `@` |
//! | Text | Integer | every value/default blank or a canonical integer |
//! | Text | Boolean | every value/default blank or `true`/`false` |
//! | strict | other strict | every value and the default blank |

pub mod convert;
pub mod kind;
pub mod typed;

use crate::column_type::ColumnType;
use crate::error::{Result, TableError};
use crate::id::ColumnId;
use crate::value::Value;

pub use convert::build_converted;
pub use kind::{Boolean, ColumnKind, Email, Integer, Text};
pub use typed::TypedColumn;

/// A column of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(TypedColumn<Text>),
    Email(TypedColumn<Email>),
    Boolean(TypedColumn<Boolean>),
    Integer(TypedColumn<Integer>),
}

/// Run `$body` with `$c` bound to the inner typed column.
macro_rules! with_typed {
    ($column:expr, $c:ident => $body:expr) => {
        match $column {
            Column::Text($c) => $body,
            Column::Email($c) => $body,
            Column::Boolean($c) => $body,
            Column::Integer($c) => $body,
        }
    };
}

/// Same as `with_typed!`, also binding the kind as a type alias `$k`.
macro_rules! with_kind {
    ($column:expr, $c:ident : $k:ident => $body:expr) => {
        match $column {
            Column::Text($c) => {
                type $k = Text;
                $body
            }
            Column::Email($c) => {
                type $k = Email;
                $body
            }
            Column::Boolean($c) => {
                type $k = Boolean;
                $body
            }
            Column::Integer($c) => {
                type $k = Integer;
                $body
            }
        }
    };
}

fn unwrap_cell<K: ColumnKind>(value: Option<Value>) -> Result<Option<K::Value>> {
    Value::normalize(value).map(K::unwrap).transpose()
}

impl Column {
    /// Empty column of `column_type` with a blank default.
    pub fn new(
        column_type: ColumnType,
        name: impl Into<String>,
        allows_blank: bool,
        id: ColumnId,
    ) -> Result<Self> {
        Ok(match column_type {
            ColumnType::Text => Self::Text(TypedColumn::new(name, allows_blank, None, id)?),
            ColumnType::Email => Self::Email(TypedColumn::new(name, allows_blank, None, id)?),
            ColumnType::Boolean => Self::Boolean(TypedColumn::new(name, allows_blank, None, id)?),
            ColumnType::Integer => Self::Integer(TypedColumn::new(name, allows_blank, None, id)?),
        })
    }

    /// Empty column of `column_type` whose default is `default`.
    pub fn with_default(
        column_type: ColumnType,
        name: impl Into<String>,
        allows_blank: bool,
        default: Option<Value>,
        id: ColumnId,
    ) -> Result<Self> {
        Ok(match column_type {
            ColumnType::Text => Self::Text(TypedColumn::new(
                name,
                allows_blank,
                unwrap_cell::<Text>(default)?,
                id,
            )?),
            ColumnType::Email => Self::Email(TypedColumn::new(
                name,
                allows_blank,
                unwrap_cell::<Email>(default)?,
                id,
            )?),
            ColumnType::Boolean => Self::Boolean(TypedColumn::new(
                name,
                allows_blank,
                unwrap_cell::<Boolean>(default)?,
                id,
            )?),
            ColumnType::Integer => Self::Integer(TypedColumn::new(
                name,
                allows_blank,
                unwrap_cell::<Integer>(default)?,
                id,
            )?),
        })
    }

    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Text(_) => ColumnType::Text,
            Self::Email(_) => ColumnType::Email,
            Self::Boolean(_) => ColumnType::Boolean,
            Self::Integer(_) => ColumnType::Integer,
        }
    }

    #[must_use]
    pub fn id(&self) -> ColumnId {
        with_typed!(self, c => c.id())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        with_typed!(self, c => c.name())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        with_typed!(self, c => c.set_name(name))
    }

    #[must_use]
    pub fn allows_blank(&self) -> bool {
        with_typed!(self, c => c.allows_blank())
    }

    /// See [`TypedColumn::set_allows_blank`].
    pub fn set_allows_blank(&mut self, allows_blank: bool) -> bool {
        with_typed!(self, c => c.set_allows_blank(allows_blank))
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        with_typed!(self, c => c.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn default_value(&self) -> Option<Value> {
        with_kind!(self, c: K => c.default_value().cloned().map(K::wrap))
    }

    #[must_use]
    pub fn default_value_as_string(&self) -> String {
        with_typed!(self, c => c.default_value_as_string())
    }

    /// Value at `index`.
    pub fn value(&self, index: usize) -> Result<Option<Value>> {
        with_kind!(self, c: K => Ok(c.value(index)?.cloned().map(K::wrap)))
    }

    /// Value at `index` in display form; blank is `""`.
    pub fn value_as_string(&self, index: usize) -> Result<String> {
        with_typed!(self, c => Ok(c.value(index)?.map(ToString::to_string).unwrap_or_default()))
    }

    /// All values in row order.
    #[must_use]
    pub fn values(&self) -> Vec<Option<Value>> {
        with_kind!(self, c: K => c.values().iter().cloned().map(|v| v.map(K::wrap)).collect())
    }

    /// Display strings of every stored value, blank as `None`.
    #[must_use]
    pub fn display_values(&self) -> Vec<Option<String>> {
        with_typed!(self, c => c.values().iter().map(|v| v.as_ref().map(ToString::to_string)).collect())
    }

    /// Whether `value` may be stored in this column.
    #[must_use]
    pub fn is_valid_value(&self, value: &Option<Value>) -> bool {
        with_kind!(self, c: K => match unwrap_cell::<K>(value.clone()) {
            Ok(v) => c.is_valid_value(&v),
            Err(_) => false,
        })
    }

    /// Parse a display string under this column's rules.
    pub fn parse_value(&self, input: &str) -> Result<Option<Value>> {
        with_kind!(self, c: K => Ok(c.parse_value(input)?.map(K::wrap)))
    }

    pub fn set_value(&mut self, index: usize, value: Option<Value>) -> Result<()> {
        with_kind!(self, c: K => c.set_value(index, unwrap_cell::<K>(value)?))
    }

    pub fn set_value_from_str(&mut self, index: usize, input: &str) -> Result<()> {
        with_typed!(self, c => c.set_value_from_str(index, input))
    }

    pub fn change_default_value(&mut self, value: Option<Value>) -> Result<()> {
        with_kind!(self, c: K => c.change_default_value(unwrap_cell::<K>(value)?))
    }

    pub fn change_default_value_from_str(&mut self, input: &str) -> Result<()> {
        with_typed!(self, c => c.change_default_value_from_str(input))
    }

    /// Default a Boolean toggle would produce. Boolean columns only.
    pub fn next_toggled_default(&self) -> Result<Option<bool>> {
        match self {
            Self::Boolean(c) => Ok(c.next_toggled_default()),
            other => Err(TableError::TypeMismatch {
                expected: ColumnType::Boolean,
                actual: other.column_type(),
            }),
        }
    }

    /// Advance a Boolean column's default through its toggle cycle.
    pub fn toggle_default_value(&mut self) -> Result<Option<bool>> {
        match self {
            Self::Boolean(c) => Ok(c.toggle_default_value()),
            other => Err(TableError::TypeMismatch {
                expected: ColumnType::Boolean,
                actual: other.column_type(),
            }),
        }
    }

    pub fn push_default(&mut self) {
        with_typed!(self, c => c.push_default())
    }

    pub fn insert_default_at(&mut self, index: usize) -> Result<()> {
        with_typed!(self, c => c.insert_default_at(index))
    }

    pub fn remove_value(&mut self, index: usize) -> Result<Option<Value>> {
        with_kind!(self, c: K => Ok(c.remove_value(index)?.map(K::wrap)))
    }

    /// Every stored value and the default are blank.
    #[must_use]
    pub fn is_all_blank(&self) -> bool {
        with_typed!(self, c => c.is_all_blank())
    }

    /// Whether this column's parser accepts, under its own blank rule, the
    /// display form of every value and the default of `source`.
    #[must_use]
    pub fn can_accept_all_values_from(&self, source: &Column) -> bool {
        let accepts = |cell: Option<String>| match cell {
            None => self.allows_blank(),
            Some(s) => self.parse_value(&s).is_ok(),
        };
        let default = source.default_value().map(|v| v.to_string());
        accepts(default) && source.display_values().into_iter().all(accepts)
    }

    /// Whether converting to `target` is legal given the current contents.
    #[must_use]
    pub fn can_change_to_type(&self, target: ColumnType) -> bool {
        let source = self.column_type();
        if source == target || target == ColumnType::Text {
            return true;
        }
        match self {
            Self::Text(c) => {
                let fits = |s: &String| match target {
                    ColumnType::Email => s.contains('@'),
                    ColumnType::Integer => Integer::parse_present(s).is_ok(),
                    ColumnType::Boolean => {
                        (Boolean::is_blank_input(s) && self.allows_blank())
                            || Boolean::parse_present(s).is_ok()
                    }
                    ColumnType::Text => true,
                };
                c.default_value().is_none_or(fits) && c.values().iter().flatten().all(fits)
            }
            // Strict kinds never absorb cross-kind data.
            Self::Email(_) | Self::Boolean(_) | Self::Integer(_) => self.is_all_blank(),
        }
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        with_typed!(self, c => c.size_bytes())
    }
}
