#![forbid(unsafe_code)]

//! Undoable command infrastructure.
//!
//! [`UndoableCmd`] is generic over the state it mutates. A command holds only
//! ids, values and the pre-state it captured; the state itself is passed in
//! on every call, so commands never alias the registry they operate on and
//! can be exercised against any target type in tests.
//!
//! # Invariants
//!
//! - `execute()` followed by `undo()` restores prior state exactly
//! - `undo()` followed by `redo()` restores the executed state exactly
//! - A failing `execute()` leaves the target unchanged
//! - `size_bytes()` covers captured pre-state for memory budgeting
//!
//! # Failure Modes
//!
//! - **Out-of-order use**: undo before execute has nothing to invert
//!   - Mitigation: [`CommandError::InvalidState`]
//! - **State drift**: the target changed outside the history
//!   - Mitigation: validation errors from the target surface as
//!     [`CommandError::Table`]

use std::fmt;
use std::time::Instant;

use tblr_core::{ErrorKind, TableError};

/// Source of a command - who/what triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandSource {
    /// Direct user action.
    #[default]
    User,
    /// Triggered programmatically by application code.
    Programmatic,
    /// Replayed from a recorded macro.
    Macro,
    /// Triggered by an external system/API.
    External,
}

/// Metadata attached to every command for tracing and UI display.
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    /// Human-readable description for UI (e.g., "Rename table").
    pub description: String,
    /// When the command was created.
    pub timestamp: Instant,
    /// Who/what triggered the command.
    pub source: CommandSource,
}

impl CommandMetadata {
    /// Create new metadata with the given description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            timestamp: Instant::now(),
            source: CommandSource::User,
        }
    }

    /// Set the command source.
    #[must_use]
    pub fn with_source(mut self, source: CommandSource) -> Self {
        self.source = source;
        self
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.description.len()
    }
}

impl Default for CommandMetadata {
    fn default() -> Self {
        Self::new("Unknown")
    }
}

/// Result of command execution or undo.
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur during command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The target rejected the operation.
    Table(TableError),
    /// Command cannot run in its current state.
    InvalidState(String),
    /// Generic error with message.
    Other(String),
}

impl CommandError {
    /// Error category of the underlying table failure, if any.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Table(e) => Some(e.kind()),
            Self::InvalidState(_) | Self::Other(_) => None,
        }
    }

    pub(crate) fn not_executed(command: &str) -> Self {
        Self::InvalidState(format!("{command} has not been executed"))
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(e) => write!(f, "{e}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Table(e) => Some(e),
            Self::InvalidState(_) | Self::Other(_) => None,
        }
    }
}

impl From<TableError> for CommandError {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}

/// A reversible command over a target of type `T`.
pub trait UndoableCmd<T: ?Sized>: Send + Sync {
    /// Execute the command, applying its effect.
    fn execute(&mut self, target: &mut T) -> CommandResult;

    /// Undo the command, reverting its effect.
    fn undo(&mut self, target: &mut T) -> CommandResult;

    /// Redo the command after it was undone.
    fn redo(&mut self, target: &mut T) -> CommandResult {
        self.execute(target)
    }

    /// Human-readable description for UI display.
    fn description(&self) -> &str {
        &self.metadata().description
    }

    /// Size of this command in bytes for memory budgeting.
    fn size_bytes(&self) -> usize;

    /// Get the command metadata.
    fn metadata(&self) -> &CommandMetadata;

    /// Debug description of the command.
    fn debug_name(&self) -> &'static str {
        "UndoableCmd"
    }
}

impl<T: ?Sized> fmt::Debug for dyn UndoableCmd<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.debug_name())
            .field("description", &self.description())
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

/// A batch of commands that execute and undo together.
///
/// Appears as a single history entry. If a member fails, the members that
/// already ran are undone in reverse order before the error is returned.
pub struct CommandBatch<T: ?Sized> {
    /// Commands in execution order.
    commands: Vec<Box<dyn UndoableCmd<T>>>,
    /// Batch metadata.
    metadata: CommandMetadata,
    /// Number of leading commands currently applied.
    executed_to: usize,
}

impl<T: ?Sized> fmt::Debug for CommandBatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBatch")
            .field("commands_count", &self.commands.len())
            .field("metadata", &self.metadata)
            .field("executed_to", &self.executed_to)
            .finish()
    }
}

impl<T: ?Sized> CommandBatch<T> {
    /// Create a new command batch.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            commands: Vec::new(),
            metadata: CommandMetadata::new(description),
            executed_to: 0,
        }
    }

    /// Set the command source.
    #[must_use]
    pub fn with_source(mut self, source: CommandSource) -> Self {
        self.metadata.source = source;
        self
    }

    /// Add a command to the batch.
    pub fn push(&mut self, cmd: Box<dyn UndoableCmd<T>>) {
        self.commands.push(cmd);
    }

    /// Number of commands in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<T: ?Sized> UndoableCmd<T> for CommandBatch<T> {
    fn execute(&mut self, target: &mut T) -> CommandResult {
        for i in 0..self.commands.len() {
            if let Err(e) = self.commands[i].execute(target) {
                for j in (0..i).rev() {
                    if let Err(rollback) = self.commands[j].undo(target) {
                        tracing::warn!(
                            target: "tblr.undo",
                            command = self.commands[j].debug_name(),
                            error = %rollback,
                            "batch rollback failed"
                        );
                    }
                }
                self.executed_to = 0;
                return Err(e);
            }
            self.executed_to = i + 1;
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut T) -> CommandResult {
        for i in (0..self.executed_to).rev() {
            self.commands[i].undo(target)?;
            self.executed_to = i;
        }
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.commands.iter().map(|c| c.size_bytes()).sum::<usize>()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "CommandBatch"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Appends a character to a string; fails on a configured character.
    struct PushChar {
        ch: char,
        metadata: CommandMetadata,
    }

    impl PushChar {
        fn new(ch: char) -> Self {
            Self {
                ch,
                metadata: CommandMetadata::new(format!("Push {ch}")),
            }
        }
    }

    impl UndoableCmd<String> for PushChar {
        fn execute(&mut self, target: &mut String) -> CommandResult {
            if self.ch == '!' {
                return Err(CommandError::Other("bang".into()));
            }
            target.push(self.ch);
            Ok(())
        }

        fn undo(&mut self, target: &mut String) -> CommandResult {
            match target.pop() {
                Some(c) if c == self.ch => Ok(()),
                _ => Err(CommandError::InvalidState("unexpected tail".into())),
            }
        }

        fn size_bytes(&self) -> usize {
            std::mem::size_of::<Self>() + self.metadata.size_bytes()
        }

        fn metadata(&self) -> &CommandMetadata {
            &self.metadata
        }
    }

    #[test]
    fn test_command_metadata_size() {
        let meta = CommandMetadata::new("Test command");
        let size = meta.size_bytes();
        assert!(size >= std::mem::size_of::<CommandMetadata>() + "Test command".len());
    }

    #[test]
    fn test_command_metadata_with_source() {
        let meta = CommandMetadata::new("Test").with_source(CommandSource::Macro);
        assert_eq!(meta.source, CommandSource::Macro);
        assert_eq!(CommandMetadata::default().description, "Unknown");
    }

    #[test]
    fn test_command_error_wraps_table_error() {
        let err = CommandError::from(TableError::BlankName);
        assert_eq!(err.kind(), Some(ErrorKind::InvalidArgument));
        assert_eq!(err.to_string(), TableError::BlankName.to_string());
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(CommandError::not_executed("AddRow").kind(), None);
    }

    #[test]
    fn test_description_defaults_to_metadata() {
        let cmd = PushChar::new('a');
        assert_eq!(cmd.description(), "Push a");
        let boxed: Box<dyn UndoableCmd<String>> = Box::new(cmd);
        assert!(format!("{boxed:?}").contains("Push a"));
    }

    #[test]
    fn test_command_batch_execute_undo_redo() {
        let mut buf = String::new();
        let mut batch = CommandBatch::new("Two chars");
        batch.push(Box::new(PushChar::new('a')));
        batch.push(Box::new(PushChar::new('b')));

        batch.execute(&mut buf).unwrap();
        assert_eq!(buf, "ab");
        batch.undo(&mut buf).unwrap();
        assert_eq!(buf, "");
        batch.redo(&mut buf).unwrap();
        assert_eq!(buf, "ab");
    }

    #[test]
    fn test_command_batch_rolls_back_on_failure() {
        let mut buf = String::from("x");
        let mut batch = CommandBatch::new("Fails");
        batch.push(Box::new(PushChar::new('a')));
        batch.push(Box::new(PushChar::new('!')));

        assert!(batch.execute(&mut buf).is_err());
        assert_eq!(buf, "x");
    }

    #[test]
    fn test_command_batch_empty() {
        let batch: CommandBatch<String> = CommandBatch::new("Empty");
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }
}
