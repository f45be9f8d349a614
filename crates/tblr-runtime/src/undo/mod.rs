#![forbid(unsafe_code)]

//! Undo/Redo command history.
//!
//! Every registry mutation has a reversible command. Commands carry only ids,
//! values and the pre-state they captured; the [`TableRegistry`] is handed to
//! each call by the [`HistoryManager`], which owns the two stacks.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     HistoryManager<T>                    │
//! │  ┌──────────────────┐          ┌──────────────────┐      │
//! │  │   Undo Stack     │  undo()  │   Redo Stack     │      │
//! │  │  CommandN        │ ───────► │  Command1        │      │
//! │  │  ...             │ ◄─────── │  ...             │      │
//! │  │  Command1        │  redo()  │  CommandN        │      │
//! │  └──────────────────┘          └──────────────────┘      │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │ &mut T on every call
//!                              ▼
//!                        TableRegistry
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use tblr_runtime::undo::{CreateTable, HistoryManager};
//! use tblr_runtime::TableRegistry;
//!
//! let mut registry = TableRegistry::new();
//! let mut history = HistoryManager::default();
//! history.execute(Box::new(CreateTable::new()), &mut registry)?;
//! history.undo(&mut registry);
//! ```
//!
//! # Module Structure
//!
//! - [`command`]: the [`UndoableCmd`] trait, metadata, errors, batches
//! - [`history`]: the [`HistoryManager`] and its limits
//! - [`transaction`]: the [`BlankRelaxation`] scope
//! - [`commands`]: one command per registry mutation
//!
//! [`TableRegistry`]: crate::TableRegistry

pub mod command;
pub mod commands;
pub mod history;
pub mod transaction;

pub use command::{
    CommandBatch, CommandError, CommandMetadata, CommandResult, CommandSource, UndoableCmd,
};
pub use commands::{
    AddColumn, AddRow, ChangeColumnType, ChangeDefaultValue, CreateTable, DeleteColumn,
    DeleteRow, DeleteTable, RenameColumn, RenameTable, SetCellValue, ToggleAllowsBlank,
};
pub use history::{HistoryConfig, HistoryManager};
pub use transaction::BlankRelaxation;
