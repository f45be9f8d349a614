#![forbid(unsafe_code)]

//! Tables: ordered columns sharing one row count.
//!
//! # Invariants
//!
//! 1. Every column holds exactly `row_count` values, after every operation.
//! 2. Column ids and column names are unique within the table.
//! 3. Structural operations validate first and mutate second, so a failure
//!    leaves the table untouched.
//!
//! ```text
//!            Column1   Column2   Column3
//! row 0  │   "a"       7         true
//! row 1  │   ∅         8         false      ∅ = blank (None)
//! row 2  │   "c"       ∅         true
//!                                           row_count = 3
//! ```

use crate::column::Column;
use crate::column_type::ColumnType;
use crate::error::{Result, TableError};
use crate::id::{COLUMN_NAME_PREFIX, ColumnId, TableId, next_free_name, next_free_raw_id};
use crate::value::Value;

/// A named table exclusively owning its columns.
///
/// `Clone` is a deep copy: cloned columns share nothing with the original.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    id: TableId,
    name: String,
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Create an empty table.
    pub fn new(name: impl Into<String>, id: TableId) -> Result<Self> {
        let name = name.into();
        crate::column::typed::check_name(&name)?;
        Ok(Self {
            id,
            name,
            columns: Vec::new(),
            row_count: 0,
        })
    }

    #[must_use]
    pub fn id(&self) -> TableId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename. Uniqueness among tables is the registry's concern.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        crate::column::typed::check_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Independent copy of this table.
    #[must_use]
    pub fn deep_clone(&self) -> Table {
        self.clone()
    }

    // ========================================================================
    // Column access
    // ========================================================================

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[must_use]
    pub fn column_ids(&self) -> Vec<ColumnId> {
        self.columns.iter().map(Column::id).collect()
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    #[must_use]
    pub fn column_types(&self) -> Vec<ColumnType> {
        self.columns.iter().map(Column::column_type).collect()
    }

    #[must_use]
    pub fn has_column(&self, id: ColumnId) -> bool {
        self.columns.iter().any(|c| c.id() == id)
    }

    #[must_use]
    pub fn has_column_named(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    /// Position of the column with `id`.
    pub fn column_position(&self, id: ColumnId) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.id() == id)
            .ok_or(TableError::UnknownColumn(id))
    }

    pub fn column(&self, id: ColumnId) -> Result<&Column> {
        let pos = self.column_position(id)?;
        Ok(&self.columns[pos])
    }

    pub fn column_mut(&mut self, id: ColumnId) -> Result<&mut Column> {
        let pos = self.column_position(id)?;
        Ok(&mut self.columns[pos])
    }

    /// Column at visual position `index`.
    pub fn column_at(&self, index: usize) -> Result<&Column> {
        self.columns
            .get(index)
            .ok_or(TableError::ColumnIndexOutOfBounds {
                index,
                len: self.columns.len(),
            })
    }

    // ========================================================================
    // Naming
    // ========================================================================

    #[must_use]
    pub fn next_free_column_id(&self) -> ColumnId {
        ColumnId(next_free_raw_id(self.columns.iter().map(|c| c.id().raw())))
    }

    #[must_use]
    pub fn next_free_column_name(&self) -> String {
        next_free_name(COLUMN_NAME_PREFIX, self.columns.iter().map(Column::name))
    }

    /// Non-blank and not used by another column (`except` is ignored).
    #[must_use]
    pub fn is_valid_column_name(&self, name: &str, except: Option<ColumnId>) -> bool {
        !name.trim().is_empty()
            && !self
                .columns
                .iter()
                .any(|c| Some(c.id()) != except && c.name() == name)
    }

    fn check_column_name(&self, name: &str, except: Option<ColumnId>) -> Result<()> {
        crate::column::typed::check_name(name)?;
        if self.is_valid_column_name(name, except) {
            Ok(())
        } else {
            Err(TableError::DuplicateName(name.to_string()))
        }
    }

    pub fn rename_column(&mut self, id: ColumnId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.check_column_name(&name, Some(id))?;
        self.column_mut(id)?.set_name(name)
    }

    // ========================================================================
    // Column lifecycle
    // ========================================================================

    /// Append a blank-allowing Text column named `Column<i>`, back-filled
    /// to the current row count.
    pub fn create_column(&mut self) -> Result<ColumnId> {
        let id = self.next_free_column_id();
        let column = Column::new(ColumnType::Text, self.next_free_column_name(), true, id)?;
        self.insert_column_at(self.columns.len(), column)?;
        Ok(id)
    }

    /// Insert `column` at `index`, back-filling it with its default up to the
    /// row count.
    pub fn insert_column_at(&mut self, index: usize, mut column: Column) -> Result<()> {
        if index > self.columns.len() {
            return Err(TableError::ColumnIndexOutOfBounds {
                index,
                len: self.columns.len(),
            });
        }
        if self.has_column(column.id()) {
            return Err(TableError::DuplicateId(column.id().raw()));
        }
        self.check_column_name(column.name(), None)?;
        if column.len() > self.row_count {
            return Err(TableError::RowCountMismatch {
                expected: self.row_count,
                actual: column.len(),
            });
        }
        while column.len() < self.row_count {
            column.push_default();
        }
        self.columns.insert(index, column);
        Ok(())
    }

    /// Remove a column, returning its former position and the column.
    pub fn remove_column(&mut self, id: ColumnId) -> Result<(usize, Column)> {
        let pos = self.column_position(id)?;
        Ok((pos, self.columns.remove(pos)))
    }

    /// Put `new` in place of the column with `id`, returning the old column.
    pub fn replace_column_by_id(&mut self, id: ColumnId, mut new: Column) -> Result<Column> {
        self.swap_column(id, &mut new)?;
        Ok(new)
    }

    /// Exchange the column with `id` and `other` in place.
    ///
    /// On error neither side is touched.
    pub fn swap_column(&mut self, id: ColumnId, other: &mut Column) -> Result<()> {
        let pos = self.column_position(id)?;
        if other.id() != id && self.has_column(other.id()) {
            return Err(TableError::DuplicateId(other.id().raw()));
        }
        self.check_column_name(other.name(), Some(id))?;
        if other.len() != self.row_count {
            return Err(TableError::RowCountMismatch {
                expected: self.row_count,
                actual: other.len(),
            });
        }
        std::mem::swap(&mut self.columns[pos], other);
        Ok(())
    }

    // ========================================================================
    // Rows
    // ========================================================================

    fn check_row(&self, index: usize) -> Result<()> {
        if index < self.row_count {
            Ok(())
        } else {
            Err(TableError::RowOutOfBounds {
                index,
                len: self.row_count,
            })
        }
    }

    /// Append a row of defaults; returns its index.
    pub fn create_row(&mut self) -> usize {
        for column in &mut self.columns {
            column.push_default();
        }
        self.row_count += 1;
        self.row_count - 1
    }

    /// Insert a row of defaults at `index` (`index == row_count` appends).
    pub fn insert_row_at(&mut self, index: usize) -> Result<()> {
        if index > self.row_count {
            return Err(TableError::RowOutOfBounds {
                index,
                len: self.row_count,
            });
        }
        for column in &mut self.columns {
            column.insert_default_at(index)?;
        }
        self.row_count += 1;
        Ok(())
    }

    /// Remove row `index` from every column, returning the removed cells.
    pub fn remove_row(&mut self, index: usize) -> Result<Vec<(ColumnId, Option<Value>)>> {
        self.check_row(index)?;
        let mut removed = Vec::with_capacity(self.columns.len());
        for column in &mut self.columns {
            removed.push((column.id(), column.remove_value(index)?));
        }
        self.row_count -= 1;
        Ok(removed)
    }

    /// Every column's value in row `index`, in column order.
    pub fn row_values(&self, index: usize) -> Result<Vec<Option<Value>>> {
        self.check_row(index)?;
        self.columns.iter().map(|c| c.value(index)).collect()
    }

    // ========================================================================
    // Cells
    // ========================================================================

    pub fn value(&self, column: ColumnId, row: usize) -> Result<Option<Value>> {
        self.column(column)?.value(row)
    }

    /// Write a cell, wrapping failures with the column name.
    pub fn set_value(&mut self, column: ColumnId, row: usize, value: Option<Value>) -> Result<()> {
        let col = self.column_mut(column)?;
        col.set_value(row, value).map_err(|e| e.in_column(col.name()))
    }

    /// Parse then write a cell, wrapping failures with the column name.
    pub fn set_value_from_str(&mut self, column: ColumnId, row: usize, input: &str) -> Result<()> {
        let col = self.column_mut(column)?;
        col.set_value_from_str(row, input)
            .map_err(|e| e.in_column(col.name()))
    }

    pub fn is_valid_column_value(&self, column: ColumnId, value: &Option<Value>) -> Result<bool> {
        Ok(self.column(column)?.is_valid_value(value))
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.name.len()
            + self.columns.iter().map(Column::size_bytes).sum::<usize>()
    }
}
