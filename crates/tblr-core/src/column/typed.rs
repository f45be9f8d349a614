#![forbid(unsafe_code)]

//! A column whose kind is known statically.
//!
//! # Invariants
//!
//! - `name` is non-empty after trimming.
//! - `is_valid_value` holds for `default` and for every stored value.
//! - Blank is always stored as `None`, never as an empty string.

use std::marker::PhantomData;

use crate::column::kind::{Boolean, ColumnKind};
use crate::error::{Result, TableError};
use crate::id::ColumnId;

/// Column of kind `K`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedColumn<K: ColumnKind> {
    id: ColumnId,
    name: String,
    allows_blank: bool,
    default: Option<K::Value>,
    values: Vec<Option<K::Value>>,
    kind: PhantomData<K>,
}

pub(crate) fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        Err(TableError::BlankName)
    } else {
        Ok(())
    }
}

impl<K: ColumnKind> TypedColumn<K> {
    /// Create an empty column.
    ///
    /// Fails if `name` is blank or `default` is not a valid value.
    pub fn new(
        name: impl Into<String>,
        allows_blank: bool,
        default: Option<K::Value>,
        id: ColumnId,
    ) -> Result<Self> {
        let name = name.into();
        check_name(&name)?;
        let mut column = Self {
            id,
            name,
            allows_blank,
            default: None,
            values: Vec::new(),
            kind: PhantomData,
        };
        let default = column.normalize(default);
        column.check_value(&default)?;
        column.default = default;
        Ok(column)
    }

    fn normalize(&self, value: Option<K::Value>) -> Option<K::Value> {
        value.filter(|v| !K::is_blank(v))
    }

    fn check_value(&self, value: &Option<K::Value>) -> Result<()> {
        match value {
            None if !self.allows_blank => Err(TableError::BlankNotAllowed),
            None => Ok(()),
            Some(v) if K::is_valid_present(v) => Ok(()),
            Some(v) => Err(TableError::invalid_value(
                K::TYPE,
                v.to_string(),
                "value is not valid for this column",
            )),
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.values.len() {
            Ok(())
        } else {
            Err(TableError::RowOutOfBounds {
                index,
                len: self.values.len(),
            })
        }
    }

    #[must_use]
    pub fn id(&self) -> ColumnId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename. Uniqueness among siblings is the table's concern.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        check_name(&name)?;
        self.name = name;
        Ok(())
    }

    #[must_use]
    pub fn allows_blank(&self) -> bool {
        self.allows_blank
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&K::Value> {
        self.default.as_ref()
    }

    /// All stored values in row order.
    #[must_use]
    pub fn values(&self) -> &[Option<K::Value>] {
        &self.values
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`.
    pub fn value(&self, index: usize) -> Result<Option<&K::Value>> {
        self.check_index(index)?;
        Ok(self.values[index].as_ref())
    }

    /// Whether `value` may be stored in (or be the default of) this column.
    #[must_use]
    pub fn is_valid_value(&self, value: &Option<K::Value>) -> bool {
        match value {
            None => self.allows_blank,
            Some(v) if K::is_blank(v) => self.allows_blank,
            Some(v) => K::is_valid_present(v),
        }
    }

    /// Overwrite the value at `index`.
    ///
    /// Blank input is normalized to `None`. Validation happens before the
    /// bounds check; nothing is coerced.
    pub fn set_value(&mut self, index: usize, value: Option<K::Value>) -> Result<()> {
        let value = self.normalize(value);
        self.check_value(&value)?;
        self.check_index(index)?;
        self.values[index] = value;
        Ok(())
    }

    /// Parse a display string under this column's rules.
    pub fn parse_value(&self, input: &str) -> Result<Option<K::Value>> {
        if K::is_blank_input(input) {
            if self.allows_blank {
                Ok(None)
            } else {
                Err(TableError::BlankNotAllowed)
            }
        } else {
            K::parse_present(input).map(Some)
        }
    }

    /// Parse then store the value at `index`.
    pub fn set_value_from_str(&mut self, index: usize, input: &str) -> Result<()> {
        self.check_index(index)?;
        let value = self.parse_value(input)?;
        self.set_value(index, value)
    }

    /// Any blank among the default and the stored values.
    #[must_use]
    pub fn has_blank(&self) -> bool {
        self.default.is_none() || self.values.iter().any(Option::is_none)
    }

    /// Every stored value and the default are blank.
    #[must_use]
    pub fn is_all_blank(&self) -> bool {
        self.default.is_none() && self.values.iter().all(Option::is_none)
    }

    /// Change blank-allowance.
    ///
    /// Returns `false` without mutating when blanks would be disallowed while
    /// the default or a stored value is blank. Unchanged input succeeds.
    pub fn set_allows_blank(&mut self, allows_blank: bool) -> bool {
        if allows_blank == self.allows_blank {
            return true;
        }
        if !allows_blank && self.has_blank() {
            return false;
        }
        self.allows_blank = allows_blank;
        true
    }

    /// Replace the default value.
    pub fn change_default_value(&mut self, value: Option<K::Value>) -> Result<()> {
        let value = self.normalize(value);
        self.check_value(&value)?;
        self.default = value;
        Ok(())
    }

    /// Parse then replace the default value.
    pub fn change_default_value_from_str(&mut self, input: &str) -> Result<()> {
        let value = self.parse_value(input)?;
        self.change_default_value(value)
    }

    /// Default in display form; blank is `""`.
    #[must_use]
    pub fn default_value_as_string(&self) -> String {
        self.default.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    /// Append the default value as a new row.
    pub fn push_default(&mut self) {
        self.values.push(self.default.clone());
    }

    /// Insert the default value at `index` (`index == len` appends).
    pub fn insert_default_at(&mut self, index: usize) -> Result<()> {
        if index > self.values.len() {
            return Err(TableError::RowOutOfBounds {
                index,
                len: self.values.len(),
            });
        }
        self.values.insert(index, self.default.clone());
        Ok(())
    }

    /// Remove and return the value at `index`.
    pub fn remove_value(&mut self, index: usize) -> Result<Option<K::Value>> {
        self.check_index(index)?;
        Ok(self.values.remove(index))
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        let cell = |v: &Option<K::Value>| v.as_ref().map_or(0, K::value_size);
        std::mem::size_of::<Self>()
            + self.name.len()
            + cell(&self.default)
            + self.values.iter().map(cell).sum::<usize>()
    }
}

impl TypedColumn<Boolean> {
    /// Default that a toggle would produce.
    ///
    /// With blanks allowed: blank → true → false → blank. Otherwise
    /// true ↔ false.
    #[must_use]
    pub fn next_toggled_default(&self) -> Option<bool> {
        match (self.allows_blank, self.default) {
            (true, None) => Some(true),
            (true, Some(true)) => Some(false),
            (true, Some(false)) => None,
            (false, Some(b)) => Some(!b),
            (false, None) => Some(true),
        }
    }

    /// Advance the default one step through the toggle cycle.
    pub fn toggle_default_value(&mut self) -> Option<bool> {
        let next = self.next_toggled_default();
        self.default = next;
        next
    }
}
