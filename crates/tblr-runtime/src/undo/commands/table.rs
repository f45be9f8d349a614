#![forbid(unsafe_code)]

use tblr_core::{Table, TableId};

use crate::registry::TableRegistry;
use crate::undo::command::{CommandError, CommandMetadata, CommandResult, UndoableCmd};

/// Append a new table with the smallest free id and name.
#[derive(Debug)]
pub struct CreateTable {
    created: Option<TableId>,
    pub metadata: CommandMetadata,
}

impl CreateTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            created: None,
            metadata: CommandMetadata::new("Create table"),
        }
    }

    /// Id assigned by the last execute.
    #[must_use]
    pub fn created(&self) -> Option<TableId> {
        self.created
    }
}

impl Default for CreateTable {
    fn default() -> Self {
        Self::new()
    }
}

command_common!(CreateTable);

impl UndoableCmd<TableRegistry> for CreateTable {
    fn execute(&mut self, registry: &mut TableRegistry) -> CommandResult {
        self.created = Some(registry.create_table()?);
        Ok(())
    }

    fn undo(&mut self, registry: &mut TableRegistry) -> CommandResult {
        let id = self
            .created
            .ok_or_else(|| CommandError::not_executed("CreateTable"))?;
        if registry.has_table(id) {
            registry.delete_table(id)?;
        }
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.metadata.size_bytes()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "CreateTable"
    }
}

/// Remove a table, keeping a deep copy and its position for undo.
#[derive(Debug)]
pub struct DeleteTable {
    table: TableId,
    removed: Option<(usize, Table)>,
    pub metadata: CommandMetadata,
}

impl DeleteTable {
    #[must_use]
    pub fn new(table: TableId) -> Self {
        Self {
            table,
            removed: None,
            metadata: CommandMetadata::new("Delete table"),
        }
    }
}

command_common!(DeleteTable);

impl UndoableCmd<TableRegistry> for DeleteTable {
    fn execute(&mut self, registry: &mut TableRegistry) -> CommandResult {
        self.removed = Some(registry.delete_table(self.table)?);
        Ok(())
    }

    fn undo(&mut self, registry: &mut TableRegistry) -> CommandResult {
        let (position, table) = self
            .removed
            .as_ref()
            .ok_or_else(|| CommandError::not_executed("DeleteTable"))?;
        registry.insert_table_at(*position, table.deep_clone())?;
        self.removed = None;
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.removed.as_ref().map_or(0, |(_, t)| t.size_bytes())
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "DeleteTable"
    }
}

/// Rename a table; the old name is read when the command is built.
#[derive(Debug)]
pub struct RenameTable {
    table: TableId,
    old_name: String,
    new_name: String,
    pub metadata: CommandMetadata,
}

impl RenameTable {
    /// Build against the current name of `table`.
    pub fn capture(registry: &TableRegistry, table: TableId, new_name: impl Into<String>) -> Result<Self, CommandError> {
        Ok(Self {
            table,
            old_name: registry.table_name(table)?.to_string(),
            new_name: new_name.into(),
            metadata: CommandMetadata::new("Rename table"),
        })
    }
}

command_common!(RenameTable);

impl UndoableCmd<TableRegistry> for RenameTable {
    fn execute(&mut self, registry: &mut TableRegistry) -> CommandResult {
        registry.rename_table(self.table, &self.new_name)?;
        Ok(())
    }

    fn undo(&mut self, registry: &mut TableRegistry) -> CommandResult {
        registry.rename_table(self.table, &self.old_name)?;
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.old_name.len()
            + self.new_name.len()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "RenameTable"
    }
}
