#![forbid(unsafe_code)]

use tblr_core::{Column, ColumnId, ColumnType, TableId};

use crate::registry::TableRegistry;
use crate::undo::command::{CommandError, CommandMetadata, CommandResult, UndoableCmd};
use crate::undo::transaction::BlankRelaxation;

/// Append a default Text column to a table.
#[derive(Debug)]
pub struct AddColumn {
    table: TableId,
    added: Option<ColumnId>,
    pub metadata: CommandMetadata,
}

impl AddColumn {
    #[must_use]
    pub fn new(table: TableId) -> Self {
        Self {
            table,
            added: None,
            metadata: CommandMetadata::new("Add column"),
        }
    }

    /// Id assigned by the last execute.
    #[must_use]
    pub fn added(&self) -> Option<ColumnId> {
        self.added
    }
}

command_common!(AddColumn);

impl UndoableCmd<TableRegistry> for AddColumn {
    fn execute(&mut self, registry: &mut TableRegistry) -> CommandResult {
        self.added = Some(registry.add_column(self.table)?);
        Ok(())
    }

    fn undo(&mut self, registry: &mut TableRegistry) -> CommandResult {
        let column = self
            .added
            .ok_or_else(|| CommandError::not_executed("AddColumn"))?;
        registry.delete_column(self.table, column)?;
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.metadata.size_bytes()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "AddColumn"
    }
}

/// Remove a column, keeping it and its position for undo.
#[derive(Debug)]
pub struct DeleteColumn {
    table: TableId,
    column: ColumnId,
    removed: Option<(usize, Column)>,
    pub metadata: CommandMetadata,
}

impl DeleteColumn {
    #[must_use]
    pub fn new(table: TableId, column: ColumnId) -> Self {
        Self {
            table,
            column,
            removed: None,
            metadata: CommandMetadata::new("Delete column"),
        }
    }
}

command_common!(DeleteColumn);

impl UndoableCmd<TableRegistry> for DeleteColumn {
    fn execute(&mut self, registry: &mut TableRegistry) -> CommandResult {
        self.removed = Some(registry.delete_column(self.table, self.column)?);
        Ok(())
    }

    fn undo(&mut self, registry: &mut TableRegistry) -> CommandResult {
        let (position, column) = self
            .removed
            .as_ref()
            .ok_or_else(|| CommandError::not_executed("DeleteColumn"))?;
        registry.insert_column_at(self.table, *position, column.clone())?;
        self.removed = None;
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.removed.as_ref().map_or(0, |(_, c)| c.size_bytes())
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "DeleteColumn"
    }
}

/// Rename a column; the old name is read when the command is built.
#[derive(Debug)]
pub struct RenameColumn {
    table: TableId,
    column: ColumnId,
    old_name: String,
    new_name: String,
    pub metadata: CommandMetadata,
}

impl RenameColumn {
    pub fn capture(
        registry: &TableRegistry,
        table: TableId,
        column: ColumnId,
        new_name: impl Into<String>,
    ) -> Result<Self, CommandError> {
        Ok(Self {
            table,
            column,
            old_name: registry.column_name(table, column)?.to_string(),
            new_name: new_name.into(),
            metadata: CommandMetadata::new("Rename column"),
        })
    }
}

command_common!(RenameColumn);

impl UndoableCmd<TableRegistry> for RenameColumn {
    fn execute(&mut self, registry: &mut TableRegistry) -> CommandResult {
        registry.rename_column(self.table, self.column, &self.new_name)?;
        Ok(())
    }

    fn undo(&mut self, registry: &mut TableRegistry) -> CommandResult {
        registry.rename_column(self.table, self.column, &self.old_name)?;
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
        "RenameColumn"
    }
}

/// Convert a column to another kind.
///
/// The replacement is fully built when the command is captured, so an
/// illegal or unparseable conversion fails before anything is recorded.
/// Execute and undo both swap the stored column with the live one.
#[derive(Debug)]
pub struct ChangeColumnType {
    table: TableId,
    column: ColumnId,
    /// The column not currently installed: the converted one before
    /// execute, the original one after.
    stashed: Column,
    applied: bool,
    pub metadata: CommandMetadata,
}

impl ChangeColumnType {
    pub fn capture(
        registry: &TableRegistry,
        table: TableId,
        column: ColumnId,
        target: ColumnType,
    ) -> Result<Self, CommandError> {
        Ok(Self {
            table,
            column,
            stashed: registry.build_converted_column(table, column, target)?,
            applied: false,
            metadata: CommandMetadata::new(format!("Change column type to {target}")),
        })
    }

    /// Build a conversion to the kind after the current one.
    pub fn capture_next(registry: &TableRegistry, table: TableId, column: ColumnId) -> Result<Self, CommandError> {
        let target = registry.column_type(table, column)?.next();
        Self::capture(registry, table, column, target)
    }

    fn swap(&mut self, registry: &mut TableRegistry) -> CommandResult {
        registry.swap_column(self.table, self.column, &mut self.stashed)?;
        self.applied = !self.applied;
        Ok(())
    }
}

command_common!(ChangeColumnType);

impl UndoableCmd<TableRegistry> for ChangeColumnType {
    fn execute(&mut self, registry: &mut TableRegistry) -> CommandResult {
        if self.applied {
            return Err(CommandError::InvalidState(
                "column type change already applied".to_string(),
            ));
        }
        self.swap(registry)
    }

    fn undo(&mut self, registry: &mut TableRegistry) -> CommandResult {
        if !self.applied {
            return Err(CommandError::not_executed("ChangeColumnType"));
        }
        self.swap(registry)
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.metadata.size_bytes() + self.stashed.size_bytes()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "ChangeColumnType"
    }
}

/// Change a column's default from its string form.
///
/// Both directions run inside a [`BlankRelaxation`] that restores the
/// blank-allowance observed when the command was built.
#[derive(Debug)]
pub struct ChangeDefaultValue {
    table: TableId,
    column: ColumnId,
    old_value: String,
    new_value: String,
    allows_blank: bool,
    pub metadata: CommandMetadata,
}

impl ChangeDefaultValue {
    pub fn capture(
        registry: &TableRegistry,
        table: TableId,
        column: ColumnId,
        new_value: impl Into<String>,
    ) -> Result<Self, CommandError> {
        Ok(Self {
            table,
            column,
            old_value: registry.default_value_as_string(table, column)?,
            new_value: new_value.into(),
            allows_blank: registry.allows_blank(table, column)?,
            metadata: CommandMetadata::new("Change default value"),
        })
    }

    /// Advance a Boolean column's default one step through its toggle cycle.
    pub fn capture_toggle(registry: &TableRegistry, table: TableId, column: ColumnId) -> Result<Self, CommandError> {
        let next = registry.next_toggled_default(table, column)?;
        let mut cmd = Self::capture(
            registry,
            table,
            column,
            next.map(|b| b.to_string()).unwrap_or_default(),
        )?;
        cmd.metadata.description = "Toggle default value".to_string();
        Ok(cmd)
    }

    fn apply(&self, registry: &mut TableRegistry, input: &str) -> CommandResult {
        let mut tx = BlankRelaxation::begin(registry, self.table, self.column, self.allows_blank)?;
        tx.change_default_value(input)?;
        tx.commit()?;
        Ok(())
    }
}

command_common!(ChangeDefaultValue);

impl UndoableCmd<TableRegistry> for ChangeDefaultValue {
    fn execute(&mut self, registry: &mut TableRegistry) -> CommandResult {
        self.apply(registry, &self.new_value)
    }

    fn undo(&mut self, registry: &mut TableRegistry) -> CommandResult {
        self.apply(registry, &self.old_value)
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.old_value.len()
            + self.new_value.len()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "ChangeDefaultValue"
    }
}

/// Set whether a column accepts blanks.
#[derive(Debug)]
pub struct ToggleAllowsBlank {
    table: TableId,
    column: ColumnId,
    allows_blank: bool,
    previous: Option<bool>,
    pub metadata: CommandMetadata,
}

impl ToggleAllowsBlank {
    #[must_use]
    pub fn new(table: TableId, column: ColumnId, allows_blank: bool) -> Self {
        Self {
            table,
            column,
            allows_blank,
            previous: None,
            metadata: CommandMetadata::new(if allows_blank {
                "Allow blanks"
            } else {
                "Disallow blanks"
            }),
        }
    }

    /// Flip the column's current flag.
    pub fn capture(registry: &TableRegistry, table: TableId, column: ColumnId) -> Result<Self, CommandError> {
        Ok(Self::new(table, column, !registry.allows_blank(table, column)?))
    }
}

command_common!(ToggleAllowsBlank);

impl UndoableCmd<TableRegistry> for ToggleAllowsBlank {
    fn execute(&mut self, registry: &mut TableRegistry) -> CommandResult {
        let previous = registry.allows_blank(self.table, self.column)?;
        registry.set_allows_blank(self.table, self.column, self.allows_blank)?;
        self.previous = Some(previous);
        Ok(())
    }

    fn undo(&mut self, registry: &mut TableRegistry) -> CommandResult {
        let previous = self
            .previous
            .ok_or_else(|| CommandError::not_executed("ToggleAllowsBlank"))?;
        registry.set_allows_blank(self.table, self.column, previous)?;
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.metadata.size_bytes()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "ToggleAllowsBlank"
    }
}
