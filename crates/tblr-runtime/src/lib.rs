#![forbid(unsafe_code)]

//! Runtime: the table registry, undo/redo history and session surface.
//!
//! # Role in tblr
//! `tblr-runtime` sits on top of `tblr-core`. It owns every table through
//! [`TableRegistry`], turns each mutation into a reversible command, and
//! records those commands in a [`HistoryManager`]. [`Session`] bundles the
//! two into the operation surface a presentation layer calls into.
//!
//! # Primary responsibilities
//! - **Registry**: identity allocation, name uniqueness, all-or-nothing type
//!   conversion, and routing of cell/row/column operations.
//! - **Undo**: one command per mutation, dual-stack history with optional
//!   depth and byte limits.
//! - **Session**: one method per mutation, each recorded as one undo step.
//! - **Config**: history limits and logging setup as loadable data.
//!
//! # How it fits in the system
//! The runtime is single-threaded and synchronous. Callers serialize access;
//! read methods return shared references or deep copies, never live aliases.

pub mod config;
#[cfg(feature = "logging")]
pub mod logging;
pub mod registry;
pub mod session;
pub mod undo;

pub use config::{ConfigError, LogConfig, SessionConfig};
pub use registry::TableRegistry;
pub use session::Session;
pub use undo::{
    CommandBatch, CommandError, CommandMetadata, CommandSource, HistoryConfig, HistoryManager,
    UndoableCmd,
};
