#![forbid(unsafe_code)]

//! One command per registry mutation.
//!
//! | Command | Captured for undo | Undo action |
//! |---|---|---|
//! | [`CreateTable`] | id assigned during execute | delete that table if it still exists |
//! | [`DeleteTable`] | deep clone + position | reinsert at that position |
//! | [`RenameTable`] | old name | rename back |
//! | [`AddColumn`] | id assigned during execute | delete that column |
//! | [`DeleteColumn`] | column + position | reinsert at that position |
//! | [`RenameColumn`] | old name | rename back |
//! | [`ChangeColumnType`] | pre-built column of the other kind | swap columns back |
//! | [`ChangeDefaultValue`] | old default string + blank flag | re-apply inside a [`BlankRelaxation`](super::BlankRelaxation) |
//! | [`ToggleAllowsBlank`] | flag before execute | re-apply that flag |
//! | [`AddRow`] | row index appended during execute | remove that row |
//! | [`DeleteRow`] | removed cells by column id | reinsert row, restore cells |
//! | [`SetCellValue`] | old cell value | write it back |
//!
//! Commands hold ids and values only; the [`TableRegistry`](crate::TableRegistry)
//! is passed to every call.

/// Implements the metadata plumbing shared by every registry command.
macro_rules! command_common {
    ($name:ident) => {
        impl $name {
            /// Set the command source.
            #[must_use]
            pub fn with_source(mut self, source: $crate::undo::CommandSource) -> Self {
                self.metadata.source = source;
                self
            }
        }
    };
}

mod column;
mod row;
mod table;

pub use column::{
    AddColumn, ChangeColumnType, ChangeDefaultValue, DeleteColumn, RenameColumn,
    ToggleAllowsBlank,
};
pub use row::{AddRow, DeleteRow, SetCellValue};
pub use table::{CreateTable, DeleteTable, RenameTable};
