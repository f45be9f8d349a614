#![forbid(unsafe_code)]

//! History stack for undo/redo operations.
//!
//! [`HistoryManager`] keeps dual stacks of executed commands:
//!
//! - **Branch handling**: a new command clears the redo stack
//! - **Failure isolation**: a command whose execute fails is never recorded
//! - **Depth limits**: optional maximum number of undo entries
//! - **Memory limits**: optional byte budget over both stacks
//!
//! # Invariants
//!
//! 1. `total_bytes` always equals sum of `size_bytes()` for all commands
//! 2. `undo_stack.len() <= config.max_depth` (after any operation)
//! 3. `total_bytes <= config.max_bytes` (after any operation, if enforced)
//! 4. Redo stack is cleared whenever a new command is pushed
//!
//! ```text
//! execute(c1), execute(c2)
//!   Undo: [c1, c2]   Redo: []
//! undo()
//!   Undo: [c1]       Redo: [c2]
//! execute(c3)        <-- new branch, c2 is gone
//!   Undo: [c1, c3]   Redo: []
//! ```

use std::collections::VecDeque;
use std::fmt;

use super::command::{CommandError, CommandMetadata, UndoableCmd};

/// Limits for the history manager.
///
/// The default is unbounded: history is limited only by memory.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct HistoryConfig {
    /// Maximum number of commands to keep in undo history.
    pub max_depth: usize,
    /// Maximum total bytes for all commands (0 = unlimited).
    pub max_bytes: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl HistoryConfig {
    /// Create a new configuration with custom limits.
    #[must_use]
    pub fn new(max_depth: usize, max_bytes: usize) -> Self {
        Self {
            max_depth,
            max_bytes,
        }
    }

    /// No depth or byte limit.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
            max_bytes: 0,
        }
    }

    /// Validate limits, returning human-readable problems.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.max_depth == 0 {
            errors.push("history.max_depth must be > 0".to_string());
        }
        errors
    }
}

/// Manager for undo/redo history over a target of type `T`.
pub struct HistoryManager<T: ?Sized> {
    /// Commands available for undo (newest at back).
    undo_stack: VecDeque<Box<dyn UndoableCmd<T>>>,
    /// Commands available for redo (newest at back).
    redo_stack: VecDeque<Box<dyn UndoableCmd<T>>>,
    config: HistoryConfig,
    /// Total bytes used by all commands.
    total_bytes: usize,
}

impl<T: ?Sized> fmt::Debug for HistoryManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryManager")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("total_bytes", &self.total_bytes)
            .field("config", &self.config)
            .finish()
    }
}

impl<T: ?Sized> Default for HistoryManager<T> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<T: ?Sized> HistoryManager<T> {
    /// Create a new history manager with the given configuration.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
            total_bytes: 0,
        }
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Execute `cmd` against `target` and record it.
    ///
    /// On failure the command is dropped and both stacks are untouched.
    pub fn execute(&mut self, mut cmd: Box<dyn UndoableCmd<T>>, target: &mut T) -> Result<(), CommandError> {
        let span = tracing::debug_span!(
            target: "tblr.command",
            "command",
            name = cmd.debug_name(),
            outcome = tracing::field::Empty
        );
        let _guard = span.enter();
        match cmd.execute(target) {
            Ok(()) => {
                span.record("outcome", "ok");
                tracing::debug!(target: "tblr.undo", description = cmd.description(), "executed");
                self.push(cmd);
                Ok(())
            }
            Err(e) => {
                span.record("outcome", "rejected");
                tracing::debug!(target: "tblr.undo", description = cmd.description(), error = %e, "command rejected");
                Err(e)
            }
        }
    }

    /// Push an already-executed command onto the undo stack.
    ///
    /// This clears the redo stack (new branch) and enforces limits.
    pub fn push(&mut self, cmd: Box<dyn UndoableCmd<T>>) {
        self.clear_redo();
        self.total_bytes += cmd.size_bytes();
        self.undo_stack.push_back(cmd);
        self.enforce_limits();
    }

    /// Undo the last command.
    ///
    /// # Returns
    ///
    /// - `Ok(description)` if undo succeeded
    /// - `Err(error)` if undo failed (command remains on undo stack)
    /// - `None` if no commands to undo
    pub fn undo(&mut self, target: &mut T) -> Option<Result<String, CommandError>> {
        let mut cmd = self.undo_stack.pop_back()?;
        let description = cmd.description().to_string();
        let old_size = cmd.size_bytes();

        let result = cmd.undo(target);
        self.total_bytes = self.total_bytes.saturating_sub(old_size) + cmd.size_bytes();
        match result {
            Ok(()) => {
                tracing::debug!(target: "tblr.undo", description = %description, "undone");
                self.redo_stack.push_back(cmd);
                Some(Ok(description))
            }
            Err(e) => {
                tracing::warn!(target: "tblr.undo", description = %description, error = %e, "undo failed");
                self.undo_stack.push_back(cmd);
                Some(Err(e))
            }
        }
    }

    /// Redo the last undone command.
    ///
    /// # Returns
    ///
    /// - `Ok(description)` if redo succeeded
    /// - `Err(error)` if redo failed (command remains on redo stack)
    /// - `None` if no commands to redo
    pub fn redo(&mut self, target: &mut T) -> Option<Result<String, CommandError>> {
        let mut cmd = self.redo_stack.pop_back()?;
        let description = cmd.description().to_string();
        let old_size = cmd.size_bytes();

        let result = cmd.redo(target);
        self.total_bytes = self.total_bytes.saturating_sub(old_size) + cmd.size_bytes();
        match result {
            Ok(()) => {
                tracing::debug!(target: "tblr.undo", description = %description, "redone");
                self.undo_stack.push_back(cmd);
                Some(Ok(description))
            }
            Err(e) => {
                tracing::warn!(target: "tblr.undo", description = %description, error = %e, "redo failed");
                self.redo_stack.push_back(cmd);
                Some(Err(e))
            }
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // ========================================================================
    // Info
    // ========================================================================

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Descriptions of undo commands, most recent first.
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.undo_stack
            .iter()
            .rev()
            .take(limit)
            .map(|c| c.description())
            .collect()
    }

    /// Descriptions of redo commands, most recent first.
    pub fn redo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.redo_stack
            .iter()
            .rev()
            .take(limit)
            .map(|c| c.description())
            .collect()
    }

    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.description())
    }

    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|c| c.description())
    }

    /// Metadata of the next undo command.
    #[must_use]
    pub fn next_undo_metadata(&self) -> Option<&CommandMetadata> {
        self.undo_stack.back().map(|c| c.metadata())
    }

    /// Total memory usage in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.total_bytes
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Clear all history (both undo and redo).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.total_bytes = 0;
    }

    fn clear_redo(&mut self) {
        for cmd in self.redo_stack.drain(..) {
            self.total_bytes = self.total_bytes.saturating_sub(cmd.size_bytes());
        }
    }

    /// Evict oldest commands until depth and memory limits hold.
    fn enforce_limits(&mut self) {
        while self.undo_stack.len() > self.config.max_depth {
            if let Some(cmd) = self.undo_stack.pop_front() {
                self.total_bytes = self.total_bytes.saturating_sub(cmd.size_bytes());
            }
        }

        if self.config.max_bytes > 0 {
            while self.total_bytes > self.config.max_bytes {
                // Redo entries are speculative; drop them first.
                if let Some(cmd) = self.redo_stack.pop_front() {
                    self.total_bytes = self.total_bytes.saturating_sub(cmd.size_bytes());
                    continue;
                }
                if let Some(cmd) = self.undo_stack.pop_front() {
                    self.total_bytes = self.total_bytes.saturating_sub(cmd.size_bytes());
                } else {
                    break;
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
