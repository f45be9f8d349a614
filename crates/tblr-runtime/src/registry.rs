#![forbid(unsafe_code)]

//! The table registry: owner of every table and router of every mutation.
//!
//! [`TableRegistry`] allocates table identities and default names, checks
//! name uniqueness, and forwards structural and value operations to the
//! right [`Table`] / [`Column`]. It also hosts type conversion, which is
//! all-or-nothing: the replacement column is fully built before the old one
//! is swapped out.
//!
//! Read accessors hand out shared references or deep clones only; callers
//! never hold a live mutable alias into a table.

use tblr_core::{
    Column, ColumnId, ColumnType, Result, TABLE_NAME_PREFIX, Table, TableError, TableId, Value,
    build_converted,
};
use tblr_core::id::{next_free_name, next_free_raw_id};

/// Owns all tables of one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRegistry {
    tables: Vec<Table>,
}

impl TableRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Identity & naming
    // ========================================================================

    /// Smallest positive id not held by any table.
    #[must_use]
    pub fn next_free_table_id(&self) -> TableId {
        TableId(next_free_raw_id(self.tables.iter().map(|t| t.id().raw())))
    }

    /// Smallest `Table<i>` not used as a table name.
    #[must_use]
    pub fn next_free_table_name(&self) -> String {
        next_free_name(TABLE_NAME_PREFIX, self.tables.iter().map(Table::name))
    }

    /// Smallest positive id not held by any column of `table`.
    pub fn next_free_column_id(&self, table: TableId) -> Result<ColumnId> {
        Ok(self.table(table)?.next_free_column_id())
    }

    /// Smallest `Column<i>` not used as a column name in `table`.
    pub fn next_free_column_name(&self, table: TableId) -> Result<String> {
        Ok(self.table(table)?.next_free_column_name())
    }

    /// Non-blank and unique among tables.
    #[must_use]
    pub fn is_valid_table_name(&self, name: &str) -> bool {
        self.is_valid_table_name_except(name, None)
    }

    fn is_valid_table_name_except(&self, name: &str, except: Option<TableId>) -> bool {
        !name.trim().is_empty()
            && !self
                .tables
                .iter()
                .any(|t| Some(t.id()) != except && t.name() == name)
    }

    /// Non-blank and unique among the columns of `table`.
    pub fn is_valid_column_name(&self, table: TableId, name: &str) -> Result<bool> {
        Ok(self.table(table)?.is_valid_column_name(name, None))
    }

    // ========================================================================
    // Table access
    // ========================================================================

    /// Read-only view of every table in display order.
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Deep copy of every table.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Table> {
        self.tables.iter().map(Table::deep_clone).collect()
    }

    #[must_use]
    pub fn table_ids(&self) -> Vec<TableId> {
        self.tables.iter().map(Table::id).collect()
    }

    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn has_table(&self, id: TableId) -> bool {
        self.tables.iter().any(|t| t.id() == id)
    }

    /// Position of the table in display order.
    pub fn table_position(&self, id: TableId) -> Result<usize> {
        self.tables
            .iter()
            .position(|t| t.id() == id)
            .ok_or(TableError::TableNotFound(id))
    }

    pub fn table(&self, id: TableId) -> Result<&Table> {
        let pos = self.table_position(id)?;
        Ok(&self.tables[pos])
    }

    fn table_mut(&mut self, id: TableId) -> Result<&mut Table> {
        let pos = self.table_position(id)?;
        Ok(&mut self.tables[pos])
    }

    /// Deep copy of one table.
    pub fn clone_table(&self, id: TableId) -> Result<Table> {
        Ok(self.table(id)?.deep_clone())
    }

    pub fn table_name(&self, id: TableId) -> Result<&str> {
        Ok(self.table(id)?.name())
    }

    // ========================================================================
    // Table lifecycle
    // ========================================================================

    /// Append a new empty table with the smallest free id and name.
    pub fn create_table(&mut self) -> Result<TableId> {
        let id = self.next_free_table_id();
        let table = Table::new(self.next_free_table_name(), id)?;
        tracing::debug!(target: "tblr.registry", table_id = id.raw(), name = table.name(), "create table");
        self.tables.push(table);
        Ok(id)
    }

    /// Insert an existing table at `index` (`index == len` appends).
    pub fn insert_table_at(&mut self, index: usize, table: Table) -> Result<()> {
        if index > self.tables.len() {
            return Err(TableError::TableIndexOutOfBounds {
                index,
                len: self.tables.len(),
            });
        }
        if self.has_table(table.id()) {
            return Err(TableError::DuplicateId(table.id().raw()));
        }
        if !self.is_valid_table_name(table.name()) {
            return Err(TableError::DuplicateName(table.name().to_string()));
        }
        tracing::debug!(target: "tblr.registry", table_id = table.id().raw(), index, "insert table");
        self.tables.insert(index, table);
        Ok(())
    }

    /// Remove a table, returning its former position and the table.
    pub fn delete_table(&mut self, id: TableId) -> Result<(usize, Table)> {
        let pos = self.table_position(id)?;
        tracing::debug!(target: "tblr.registry", table_id = id.raw(), "delete table");
        Ok((pos, self.tables.remove(pos)))
    }

    /// Rename a table; the name must be non-blank and unused by other tables.
    pub fn rename_table(&mut self, id: TableId, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(TableError::BlankName);
        }
        if !self.is_valid_table_name_except(name, Some(id)) {
            return Err(TableError::DuplicateName(name.to_string()));
        }
        self.table_mut(id)?.set_name(name)?;
        tracing::debug!(target: "tblr.registry", table_id = id.raw(), name, "rename table");
        Ok(())
    }

    // ========================================================================
    // Column access
    // ========================================================================

    fn column_not_found(table: TableId) -> impl Fn(TableError) -> TableError {
        move |e| match e {
            TableError::UnknownColumn(column) => TableError::ColumnNotFound { table, column },
            other => other,
        }
    }

    pub fn column(&self, table: TableId, column: ColumnId) -> Result<&Column> {
        self.table(table)?
            .column(column)
            .map_err(Self::column_not_found(table))
    }

    fn column_mut(&mut self, table: TableId, column: ColumnId) -> Result<&mut Column> {
        self.table_mut(table)?
            .column_mut(column)
            .map_err(Self::column_not_found(table))
    }

    pub fn columns(&self, table: TableId) -> Result<&[Column]> {
        Ok(self.table(table)?.columns())
    }

    pub fn column_ids(&self, table: TableId) -> Result<Vec<ColumnId>> {
        Ok(self.table(table)?.column_ids())
    }

    pub fn column_names(&self, table: TableId) -> Result<Vec<String>> {
        Ok(self.table(table)?.column_names())
    }

    pub fn column_types(&self, table: TableId) -> Result<Vec<ColumnType>> {
        Ok(self.table(table)?.column_types())
    }

    pub fn column_count(&self, table: TableId) -> Result<usize> {
        Ok(self.table(table)?.column_count())
    }

    pub fn column_name(&self, table: TableId, column: ColumnId) -> Result<&str> {
        Ok(self.column(table, column)?.name())
    }

    pub fn column_type(&self, table: TableId, column: ColumnId) -> Result<ColumnType> {
        Ok(self.column(table, column)?.column_type())
    }

    /// Id of the column at visual position `index`.
    pub fn column_id_at(&self, table: TableId, index: usize) -> Result<ColumnId> {
        Ok(self.table(table)?.column_at(index)?.id())
    }

    pub fn column_position(&self, table: TableId, column: ColumnId) -> Result<usize> {
        self.table(table)?
            .column_position(column)
            .map_err(Self::column_not_found(table))
    }

    // ========================================================================
    // Column lifecycle
    // ========================================================================

    /// Append a default Text column to `table`.
    pub fn add_column(&mut self, table: TableId) -> Result<ColumnId> {
        let id = self.table_mut(table)?.create_column()?;
        tracing::debug!(target: "tblr.registry", table_id = table.raw(), column_id = id.raw(), "add column");
        Ok(id)
    }

    /// Insert an existing column at `index`.
    pub fn insert_column_at(&mut self, table: TableId, index: usize, column: Column) -> Result<()> {
        let column_id = column.id();
        self.table_mut(table)?.insert_column_at(index, column)?;
        tracing::debug!(target: "tblr.registry", table_id = table.raw(), column_id = column_id.raw(), index, "insert column");
        Ok(())
    }

    /// Remove a column, returning its former position and the column.
    pub fn delete_column(&mut self, table: TableId, column: ColumnId) -> Result<(usize, Column)> {
        let removed = self
            .table_mut(table)?
            .remove_column(column)
            .map_err(Self::column_not_found(table))?;
        tracing::debug!(target: "tblr.registry", table_id = table.raw(), column_id = column.raw(), "delete column");
        Ok(removed)
    }

    pub fn rename_column(&mut self, table: TableId, column: ColumnId, name: &str) -> Result<()> {
        self.table_mut(table)?
            .rename_column(column, name)
            .map_err(Self::column_not_found(table))?;
        tracing::debug!(target: "tblr.registry", table_id = table.raw(), column_id = column.raw(), name, "rename column");
        Ok(())
    }

    /// Swap in `new` for the column with id `column`, returning the old one.
    pub fn replace_column(&mut self, table: TableId, column: ColumnId, new: Column) -> Result<Column> {
        self.table_mut(table)?
            .replace_column_by_id(column, new)
            .map_err(Self::column_not_found(table))
    }

    /// Exchange the column with id `column` and `other` in place.
    pub fn swap_column(&mut self, table: TableId, column: ColumnId, other: &mut Column) -> Result<()> {
        self.table_mut(table)?
            .swap_column(column, other)
            .map_err(Self::column_not_found(table))
    }

    // ========================================================================
    // Column properties
    // ========================================================================

    pub fn allows_blank(&self, table: TableId, column: ColumnId) -> Result<bool> {
        Ok(self.column(table, column)?.allows_blank())
    }

    /// Change blank-allowance; disallowing while blanks exist is blocked.
    pub fn set_allows_blank(&mut self, table: TableId, column: ColumnId, allows_blank: bool) -> Result<()> {
        let col = self.column_mut(table, column)?;
        if col.set_allows_blank(allows_blank) {
            tracing::debug!(target: "tblr.registry", table_id = table.raw(), column_id = column.raw(), allows_blank, "set allows blank");
            Ok(())
        } else {
            tracing::debug!(target: "tblr.registry", table_id = table.raw(), column_id = column.raw(), "allows blank blocked by blank values");
            Err(TableError::Blocked(format!(
                "column '{}' holds blank values",
                col.name()
            )))
        }
    }

    pub fn default_value(&self, table: TableId, column: ColumnId) -> Result<Option<Value>> {
        Ok(self.column(table, column)?.default_value())
    }

    pub fn default_value_as_string(&self, table: TableId, column: ColumnId) -> Result<String> {
        Ok(self.column(table, column)?.default_value_as_string())
    }

    /// Parse `input` under the column's rules and make it the default.
    pub fn change_default_value(&mut self, table: TableId, column: ColumnId, input: &str) -> Result<()> {
        let col = self.column_mut(table, column)?;
        col.change_default_value_from_str(input)
            .map_err(|e| e.in_column(col.name()))
    }

    /// Replace the default with an already-typed value.
    pub fn set_default_value(&mut self, table: TableId, column: ColumnId, value: Option<Value>) -> Result<()> {
        let col = self.column_mut(table, column)?;
        col.change_default_value(value)
            .map_err(|e| e.in_column(col.name()))
    }

    /// Default a Boolean toggle would produce, without applying it.
    pub fn next_toggled_default(&self, table: TableId, column: ColumnId) -> Result<Option<bool>> {
        self.column(table, column)?.next_toggled_default()
    }

    /// Advance a Boolean column's default through its toggle cycle.
    pub fn toggle_default_value(&mut self, table: TableId, column: ColumnId) -> Result<Option<bool>> {
        self.column_mut(table, column)?.toggle_default_value()
    }

    // ========================================================================
    // Type conversion
    // ========================================================================

    /// Whether `column` may be converted to `target` given its contents.
    pub fn can_convert(&self, table: TableId, column: ColumnId, target: ColumnType) -> Result<bool> {
        Ok(self.column(table, column)?.can_change_to_type(target))
    }

    /// Build, without installing, the `target`-kind replacement of `column`.
    pub fn build_converted_column(&self, table: TableId, column: ColumnId, target: ColumnType) -> Result<Column> {
        let old = self.column(table, column)?;
        if !old.can_change_to_type(target) {
            return Err(TableError::Blocked(format!(
                "column '{}' cannot change from {} to {target} with its current values",
                old.name(),
                old.column_type()
            )));
        }
        build_converted(old, target)
    }

    /// Convert `column` to `target`, returning the replaced column.
    ///
    /// The table is unchanged if any value fails to convert.
    pub fn convert_column_type(&mut self, table: TableId, column: ColumnId, target: ColumnType) -> Result<Column> {
        let new = self.build_converted_column(table, column, target)?;
        let old = self.replace_column(table, column, new)?;
        tracing::debug!(
            target: "tblr.registry",
            table_id = table.raw(),
            column_id = column.raw(),
            from = %old.column_type(),
            target_type = %target,
            "convert column type"
        );
        Ok(old)
    }

    // ========================================================================
    // Rows & cells
    // ========================================================================

    pub fn row_count(&self, table: TableId) -> Result<usize> {
        Ok(self.table(table)?.row_count())
    }

    /// Append a row of defaults; returns its index.
    pub fn add_row(&mut self, table: TableId) -> Result<usize> {
        let row = self.table_mut(table)?.create_row();
        tracing::debug!(target: "tblr.registry", table_id = table.raw(), row, "add row");
        Ok(row)
    }

    pub fn insert_row_at(&mut self, table: TableId, row: usize) -> Result<()> {
        self.table_mut(table)?.insert_row_at(row)
    }

    /// Remove a row, returning the removed cell of each column.
    pub fn remove_row(&mut self, table: TableId, row: usize) -> Result<Vec<(ColumnId, Option<Value>)>> {
        let removed = self.table_mut(table)?.remove_row(row)?;
        tracing::debug!(target: "tblr.registry", table_id = table.raw(), row, "remove row");
        Ok(removed)
    }

    pub fn row_values(&self, table: TableId, row: usize) -> Result<Vec<Option<Value>>> {
        self.table(table)?.row_values(row)
    }

    pub fn cell_value(&self, table: TableId, column: ColumnId, row: usize) -> Result<Option<Value>> {
        self.column(table, column)?.value(row)
    }

    pub fn set_cell_value(&mut self, table: TableId, column: ColumnId, row: usize, value: Option<Value>) -> Result<()> {
        self.column(table, column)?;
        self.table_mut(table)?.set_value(column, row, value)
    }

    pub fn set_cell_value_from_str(&mut self, table: TableId, column: ColumnId, row: usize, input: &str) -> Result<()> {
        self.column(table, column)?;
        self.table_mut(table)?.set_value_from_str(column, row, input)
    }

    /// Parse `input` under the column's rules without writing it.
    pub fn parse_cell_value(&self, table: TableId, column: ColumnId, input: &str) -> Result<Option<Value>> {
        let col = self.column(table, column)?;
        col.parse_value(input).map_err(|e| e.in_column(col.name()))
    }

    /// Whether `value` would be accepted by the column, without writing it.
    pub fn is_valid_cell_value(&self, table: TableId, column: ColumnId, value: &Option<Value>) -> Result<bool> {
        Ok(self.column(table, column)?.is_valid_value(value))
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.tables.iter().map(Table::size_bytes).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tblr_core::ErrorKind;

    fn registry_with_table() -> (TableRegistry, TableId) {
        let mut reg = TableRegistry::new();
        let id = reg.create_table().unwrap();
        (reg, id)
    }

    #[test]
    fn create_table_reuses_smallest_free_slot() {
        let mut reg = TableRegistry::new();
        let ids: Vec<_> = (0..5).map(|_| reg.create_table().unwrap()).collect();
        reg.delete_table(ids[2]).unwrap();
        let id = reg.create_table().unwrap();
        assert_eq!(id, TableId(3));
        assert_eq!(reg.table_name(id).unwrap(), "Table3");
    }

    #[test]
    fn names_and_ids_are_allocated_independently() {
        let mut reg = TableRegistry::new();
        let first = reg.create_table().unwrap();
        reg.rename_table(first, "Table2").unwrap();
        let second = reg.create_table().unwrap();
        assert_eq!(second, TableId(2));
        assert_eq!(reg.table_name(second).unwrap(), "Table1");
    }

    #[test]
    fn delete_unknown_table_is_not_found() {
        let mut reg = TableRegistry::new();
        let err = reg.delete_table(TableId(9)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn rename_table_validates() {
        let mut reg = TableRegistry::new();
        let a = reg.create_table().unwrap();
        reg.create_table().unwrap();
        assert_eq!(reg.rename_table(a, " "), Err(TableError::BlankName));
        assert_eq!(
            reg.rename_table(a, "Table2"),
            Err(TableError::DuplicateName("Table2".into()))
        );
        reg.rename_table(a, "Table1").unwrap();
        reg.rename_table(a, "Orders").unwrap();
        assert_eq!(reg.table_name(a).unwrap(), "Orders");
    }

    #[test]
    fn column_errors_carry_table_context() {
        let (reg, t) = registry_with_table();
        let err = reg.column(t, ColumnId(4)).unwrap_err();
        assert_eq!(
            err,
            TableError::ColumnNotFound {
                table: t,
                column: ColumnId(4)
            }
        );
    }

    #[test]
    fn blank_cell_then_disallow_blank_is_blocked() {
        let (mut reg, t) = registry_with_table();
        let c = reg.add_column(t).unwrap();
        reg.add_row(t).unwrap();
        reg.set_cell_value_from_str(t, c, 0, "").unwrap();
        assert_eq!(reg.cell_value(t, c, 0).unwrap(), None);

        let err = reg.set_allows_blank(t, c, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Blocked);
        assert!(reg.allows_blank(t, c).unwrap());
    }

    #[test]
    fn convert_after_removing_bad_row() {
        let (mut reg, t) = registry_with_table();
        let c = reg.add_column(t).unwrap();
        for (row, v) in ["1", "2", "x"].iter().enumerate() {
            reg.add_row(t).unwrap();
            reg.set_cell_value_from_str(t, c, row, v).unwrap();
        }
        assert!(!reg.can_convert(t, c, ColumnType::Integer).unwrap());
        let err = reg.convert_column_type(t, c, ColumnType::Integer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Blocked);

        reg.remove_row(t, 2).unwrap();
        assert!(reg.can_convert(t, c, ColumnType::Integer).unwrap());
        let old = reg.convert_column_type(t, c, ColumnType::Integer).unwrap();
        assert_eq!(old.column_type(), ColumnType::Text);
        assert_eq!(
            reg.column(t, c).unwrap().values(),
            vec![Some(Value::Integer(1)), Some(Value::Integer(2))]
        );
    }

    #[test]
    fn failed_conversion_leaves_table_unchanged() {
        let (mut reg, t) = registry_with_table();
        let c = reg.add_column(t).unwrap();
        reg.add_row(t).unwrap();
        // Contains '@' so the legality check passes, but the grammar fails.
        reg.set_cell_value_from_str(t, c, 0, "a@b@c").unwrap();
        let before = reg.clone();
        let err = reg.convert_column_type(t, c, ColumnType::Email).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(reg, before);
    }

    #[test]
    fn email_cells_validate() {
        let (mut reg, t) = registry_with_table();
        let c = reg.add_column(t).unwrap();
        reg.convert_column_type(t, c, ColumnType::Email).unwrap();
        reg.add_row(t).unwrap();
        reg.set_cell_value_from_str(t, c, 0, "hello@world").unwrap();
        for bad in ["a@@b", "a b@c"] {
            let err = reg.set_cell_value_from_str(t, c, 0, bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidValue);
        }
        assert_eq!(
            reg.cell_value(t, c, 0).unwrap(),
            Some(Value::Email("hello@world".into()))
        );
    }

    #[test]
    fn snapshot_is_detached() {
        let (mut reg, t) = registry_with_table();
        let snap = reg.snapshot();
        reg.rename_table(t, "Renamed").unwrap();
        assert_eq!(snap[0].name(), "Table1");
    }

    #[test]
    fn column_id_at_maps_positions() {
        let (mut reg, t) = registry_with_table();
        reg.add_column(t).unwrap();
        let second = reg.add_column(t).unwrap();
        assert_eq!(reg.column_id_at(t, 1).unwrap(), second);
        assert_eq!(
            reg.column_id_at(t, 2).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }
}
