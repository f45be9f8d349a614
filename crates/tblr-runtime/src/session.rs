#![forbid(unsafe_code)]

//! The operation surface offered to a presentation layer.
//!
//! A [`Session`] owns one [`TableRegistry`] and one history. Every mutating
//! method builds the matching command, executes it through the history and
//! records it, so each call is one undo step. Read access goes through
//! [`Session::registry`], which hands out a shared reference only.
//!
//! Mutations that fail validation return the error and leave both the
//! registry and the history untouched.

use tblr_core::{ColumnId, ColumnType, TableId, Value};

use crate::config::SessionConfig;
use crate::registry::TableRegistry;
use crate::undo::{
    AddColumn, AddRow, ChangeColumnType, ChangeDefaultValue, CommandError, CommandSource,
    CreateTable, DeleteColumn, DeleteRow, DeleteTable, HistoryConfig, HistoryManager, RenameColumn,
    RenameTable, SetCellValue, ToggleAllowsBlank, UndoableCmd,
};

/// Registry plus undo/redo history.
#[derive(Debug, Default)]
pub struct Session {
    registry: TableRegistry,
    history: HistoryManager<TableRegistry>,
    source: CommandSource,
}

impl Session {
    /// Empty session with unbounded history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty session whose history follows `config.history`.
    #[must_use]
    pub fn with_config(config: &SessionConfig) -> Self {
        Self::with_history_config(config.history.clone())
    }

    #[must_use]
    pub fn with_history_config(config: HistoryConfig) -> Self {
        Self {
            registry: TableRegistry::new(),
            history: HistoryManager::new(config),
            source: CommandSource::User,
        }
    }

    /// Source stamped on commands built by this session's methods.
    #[must_use]
    pub fn with_source(mut self, source: CommandSource) -> Self {
        self.source = source;
        self
    }

    /// Read-only view of all tables.
    #[must_use]
    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    #[must_use]
    pub fn history(&self) -> &HistoryManager<TableRegistry> {
        &self.history
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Execute a caller-built command and record it.
    pub fn execute(&mut self, cmd: Box<dyn UndoableCmd<TableRegistry>>) -> Result<(), CommandError> {
        self.history.execute(cmd, &mut self.registry)
    }

    /// Undo the most recent command; `None` if there is nothing to undo.
    pub fn undo(&mut self) -> Option<Result<String, CommandError>> {
        self.history.undo(&mut self.registry)
    }

    /// Redo the most recently undone command; `None` if there is nothing to redo.
    pub fn redo(&mut self) -> Option<Result<String, CommandError>> {
        self.history.redo(&mut self.registry)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drop all history without touching the tables.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ========================================================================
    // Tables
    // ========================================================================

    /// Create a table with the smallest free id and name.
    pub fn create_table(&mut self) -> Result<TableId, CommandError> {
        let id = self.registry.next_free_table_id();
        self.execute(Box::new(CreateTable::new().with_source(self.source)))?;
        Ok(id)
    }

    pub fn delete_table(&mut self, table: TableId) -> Result<(), CommandError> {
        self.execute(Box::new(DeleteTable::new(table).with_source(self.source)))
    }

    pub fn rename_table(&mut self, table: TableId, name: &str) -> Result<(), CommandError> {
        let cmd = RenameTable::capture(&self.registry, table, name)?.with_source(self.source);
        self.execute(Box::new(cmd))
    }

    // ========================================================================
    // Columns
    // ========================================================================

    /// Append a blank-allowing Text column; returns its id.
    pub fn add_column(&mut self, table: TableId) -> Result<ColumnId, CommandError> {
        let id = self.registry.next_free_column_id(table)?;
        self.execute(Box::new(AddColumn::new(table).with_source(self.source)))?;
        Ok(id)
    }

    pub fn delete_column(&mut self, table: TableId, column: ColumnId) -> Result<(), CommandError> {
        self.execute(Box::new(DeleteColumn::new(table, column).with_source(self.source)))
    }

    pub fn rename_column(&mut self, table: TableId, column: ColumnId, name: &str) -> Result<(), CommandError> {
        let cmd = RenameColumn::capture(&self.registry, table, column, name)?.with_source(self.source);
        self.execute(Box::new(cmd))
    }

    /// Convert a column to `target`; blocked or unparseable data fails.
    pub fn convert_column_type(&mut self, table: TableId, column: ColumnId, target: ColumnType) -> Result<(), CommandError> {
        let cmd = ChangeColumnType::capture(&self.registry, table, column, target)?.with_source(self.source);
        self.execute(Box::new(cmd))
    }

    /// Convert a column to the kind after its current one.
    pub fn cycle_column_type(&mut self, table: TableId, column: ColumnId) -> Result<ColumnType, CommandError> {
        let target = self.registry.column_type(table, column)?.next();
        let cmd = ChangeColumnType::capture_next(&self.registry, table, column)?.with_source(self.source);
        self.execute(Box::new(cmd))?;
        Ok(target)
    }

    /// Whether converting is legal given the column's current contents.
    pub fn can_convert(&self, table: TableId, column: ColumnId, target: ColumnType) -> Result<bool, CommandError> {
        Ok(self.registry.can_convert(table, column, target)?)
    }

    /// Set the default from its string form.
    pub fn change_default_value(&mut self, table: TableId, column: ColumnId, input: &str) -> Result<(), CommandError> {
        let cmd = ChangeDefaultValue::capture(&self.registry, table, column, input)?.with_source(self.source);
        self.execute(Box::new(cmd))
    }

    /// Advance a Boolean column's default through its toggle cycle.
    pub fn toggle_default_value(&mut self, table: TableId, column: ColumnId) -> Result<Option<bool>, CommandError> {
        let next = self.registry.next_toggled_default(table, column)?;
        let cmd = ChangeDefaultValue::capture_toggle(&self.registry, table, column)?.with_source(self.source);
        self.execute(Box::new(cmd))?;
        Ok(next)
    }

    /// Allow or disallow blanks; disallowing while blanks exist is blocked.
    pub fn set_allows_blank(&mut self, table: TableId, column: ColumnId, allows_blank: bool) -> Result<(), CommandError> {
        self.execute(Box::new(
            ToggleAllowsBlank::new(table, column, allows_blank).with_source(self.source),
        ))
    }

    pub fn toggle_allows_blank(&mut self, table: TableId, column: ColumnId) -> Result<(), CommandError> {
        let cmd = ToggleAllowsBlank::capture(&self.registry, table, column)?.with_source(self.source);
        self.execute(Box::new(cmd))
    }

    // ========================================================================
    // Rows & cells
    // ========================================================================

    /// Append a row of defaults; returns its index.
    pub fn add_row(&mut self, table: TableId) -> Result<usize, CommandError> {
        let row = self.registry.row_count(table)?;
        self.execute(Box::new(AddRow::new(table).with_source(self.source)))?;
        Ok(row)
    }

    pub fn delete_row(&mut self, table: TableId, row: usize) -> Result<(), CommandError> {
        self.execute(Box::new(DeleteRow::new(table, row).with_source(self.source)))
    }

    pub fn set_cell_value(&mut self, table: TableId, column: ColumnId, row: usize, value: Option<Value>) -> Result<(), CommandError> {
        let cmd = SetCellValue::capture(&self.registry, table, column, row, value)?.with_source(self.source);
        self.execute(Box::new(cmd))
    }

    /// Parse `input` with the column's rules and write it.
    pub fn set_cell_value_from_str(&mut self, table: TableId, column: ColumnId, row: usize, input: &str) -> Result<(), CommandError> {
        let cmd = SetCellValue::capture_from_str(&self.registry, table, column, row, input)?.with_source(self.source);
        self.execute(Box::new(cmd))
    }
}
