#![forbid(unsafe_code)]

//! Core: typed columns, tables, and value conversion rules.
//!
//! # Role in tblr
//! `tblr-core` is the data layer. It owns the closed set of column kinds,
//! their validity and parse rules, the [`Column`] sum type, and [`Table`]
//! with its lock-step row invariant. It performs no orchestration and keeps
//! no history; `tblr-runtime` builds the registry and the undo log on top.
//!
//! # Primary responsibilities
//! - **Column kinds**: [`Text`], [`Email`], [`Boolean`], [`Integer`] rules.
//! - **Columns**: blank handling, defaults, type-change legality.
//! - **Tables**: column lifecycle, row insert/remove, cell writes.
//! - **Identity**: smallest-free-integer ids and default names.

pub mod column;
pub mod column_type;
pub mod error;
pub mod id;
pub mod table;
pub mod value;

pub use column::{
    Boolean, Column, ColumnKind, Email, Integer, Text, TypedColumn, build_converted,
};
pub use column_type::{ColumnType, UnknownColumnType};
pub use error::{ErrorKind, Result, TableError};
pub use id::{COLUMN_NAME_PREFIX, ColumnId, TABLE_NAME_PREFIX, TableId};
pub use table::Table;
pub use value::{Value, display_cell};
