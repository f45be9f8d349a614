#![forbid(unsafe_code)]

use ahash::AHashMap;
use tblr_core::{ColumnId, TableError, TableId, Value};

use crate::registry::TableRegistry;
use crate::undo::command::{CommandError, CommandMetadata, CommandResult, UndoableCmd};

/// Append a row of defaults.
#[derive(Debug)]
pub struct AddRow {
    table: TableId,
    added: Option<usize>,
    pub metadata: CommandMetadata,
}

impl AddRow {
    #[must_use]
    pub fn new(table: TableId) -> Self {
        Self {
            table,
            added: None,
            metadata: CommandMetadata::new("Add row"),
        }
    }

    /// Row index appended by the last execute.
    #[must_use]
    pub fn added(&self) -> Option<usize> {
        self.added
    }
}

command_common!(AddRow);

impl UndoableCmd<TableRegistry> for AddRow {
    fn execute(&mut self, registry: &mut TableRegistry) -> CommandResult {
        self.added = Some(registry.add_row(self.table)?);
        Ok(())
    }

    fn undo(&mut self, registry: &mut TableRegistry) -> CommandResult {
        let row = self.added.ok_or_else(|| CommandError::not_executed("AddRow"))?;
        registry.remove_row(self.table, row)?;
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.metadata.size_bytes()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "AddRow"
    }
}

/// Remove a row, backing up its cells by column id.
#[derive(Debug)]
pub struct DeleteRow {
    table: TableId,
    row: usize,
    backup: Option<AHashMap<ColumnId, Option<Value>>>,
    pub metadata: CommandMetadata,
}

impl DeleteRow {
    #[must_use]
    pub fn new(table: TableId, row: usize) -> Self {
        Self {
            table,
            row,
            backup: None,
            metadata: CommandMetadata::new("Delete row"),
        }
    }
}

command_common!(DeleteRow);

impl UndoableCmd<TableRegistry> for DeleteRow {
    fn execute(&mut self, registry: &mut TableRegistry) -> CommandResult {
        let removed = registry.remove_row(self.table, self.row)?;
        self.backup = Some(removed.into_iter().collect());
        Ok(())
    }

    fn undo(&mut self, registry: &mut TableRegistry) -> CommandResult {
        let backup = self
            .backup
            .as_ref()
            .ok_or_else(|| CommandError::not_executed("DeleteRow"))?;

        // Check every restore before inserting so a failure leaves no row behind.
        for (&column, value) in backup {
            if !registry.is_valid_cell_value(self.table, column, value)? {
                return Err(TableError::invalid_value(
                    registry.column_type(self.table, column)?,
                    tblr_core::display_cell(value.as_ref()),
                    "backed-up value no longer fits its column",
                )
                .into());
            }
        }

        registry.insert_row_at(self.table, self.row)?;
        for (&column, value) in backup {
            registry.set_cell_value(self.table, column, self.row, value.clone())?;
        }
        self.backup = None;
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        let cells = self.backup.as_ref().map_or(0, |b| {
            b.values()
                .map(|v| {
                    std::mem::size_of::<(ColumnId, Option<Value>)>()
                        + v.as_ref().map_or(0, Value::size_bytes)
                })
                .sum()
        });
        std::mem::size_of::<Self>() + self.metadata.size_bytes() + cells
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "DeleteRow"
    }
}

/// Write one cell; the old value is read when the command is built.
#[derive(Debug)]
pub struct SetCellValue {
    table: TableId,
    column: ColumnId,
    row: usize,
    old_value: Option<Value>,
    new_value: Option<Value>,
    pub metadata: CommandMetadata,
}

impl SetCellValue {
    pub fn capture(
        registry: &TableRegistry,
        table: TableId,
        column: ColumnId,
        row: usize,
        new_value: Option<Value>,
    ) -> Result<Self, CommandError> {
        Ok(Self {
            table,
            column,
            row,
            old_value: registry.cell_value(table, column, row)?,
            new_value,
            metadata: CommandMetadata::new("Set cell value"),
        })
    }

    /// Parse `input` under the column's rules, then capture.
    pub fn capture_from_str(
        registry: &TableRegistry,
        table: TableId,
        column: ColumnId,
        row: usize,
        input: &str,
    ) -> Result<Self, CommandError> {
        let value = registry.parse_cell_value(table, column, input)?;
        Self::capture(registry, table, column, row, value)
    }
}

command_common!(SetCellValue);

impl UndoableCmd<TableRegistry> for SetCellValue {
    fn execute(&mut self, registry: &mut TableRegistry) -> CommandResult {
        registry.set_cell_value(self.table, self.column, self.row, self.new_value.clone())?;
        Ok(())
    }

    fn undo(&mut self, registry: &mut TableRegistry) -> CommandResult {
        registry.set_cell_value(self.table, self.column, self.row, self.old_value.clone())?;
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        let cell = |v: &Option<Value>| v.as_ref().map_or(0, Value::size_bytes);
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + cell(&self.old_value)
            + cell(&self.new_value)
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "SetCellValue"
    }
}
