#![forbid(unsafe_code)]

//! Bounded relaxation of a column's blank rule.
//!
//! Changing a default is applied with blanks temporarily allowed and then the
//! target blank-allowance is restored. [`BlankRelaxation`] makes that window
//! explicit: [`begin`](BlankRelaxation::begin) relaxes,
//! [`commit`](BlankRelaxation::commit) restores the target flag, and any exit
//! without a successful commit (an error, an early return, a drop) rolls the
//! column back to the default and flag it had before `begin`.
//!
//! ```text
//! begin      allows_blank := true          (remember default, flag)
//! apply      default := new
//! commit     allows_blank := restore_to    ok  -> done
//!                                          err -> rollback, Blocked
//! drop       rollback if not committed
//! ```

use tblr_core::{ColumnId, Result, TableId, Value};

use crate::registry::TableRegistry;

/// RAII transaction over one column's default value and blank-allowance.
pub struct BlankRelaxation<'a> {
    registry: &'a mut TableRegistry,
    table: TableId,
    column: ColumnId,
    /// Flag applied on commit.
    restore_to: bool,
    /// State before `begin`, applied on rollback.
    previous_flag: bool,
    previous_default: Option<Value>,
    finished: bool,
}

impl<'a> BlankRelaxation<'a> {
    /// Relax the column's blank rule until commit or rollback.
    pub fn begin(
        registry: &'a mut TableRegistry,
        table: TableId,
        column: ColumnId,
        restore_to: bool,
    ) -> Result<Self> {
        let previous_flag = registry.allows_blank(table, column)?;
        let previous_default = registry.default_value(table, column)?;
        registry.set_allows_blank(table, column, true)?;
        tracing::trace!(target: "tblr.undo", table_id = table.raw(), column_id = column.raw(), "blank relaxation begin");
        Ok(Self {
            registry,
            table,
            column,
            restore_to,
            previous_flag,
            previous_default,
            finished: false,
        })
    }

    /// Parse `input` and make it the default while relaxed.
    pub fn change_default_value(&mut self, input: &str) -> Result<()> {
        self.registry
            .change_default_value(self.table, self.column, input)
    }

    /// Restore the target blank-allowance.
    ///
    /// If the current default is illegal under that flag, the transaction is
    /// rolled back and the blocking error returned.
    pub fn commit(mut self) -> Result<()> {
        self.finished = true;
        match self
            .registry
            .set_allows_blank(self.table, self.column, self.restore_to)
        {
            Ok(()) => Ok(()),
            Err(e) => {
                self.restore();
                Err(e)
            }
        }
    }

    /// Undo everything done since `begin`.
    pub fn rollback(mut self) {
        self.finished = true;
        self.restore();
    }

    fn restore(&mut self) {
        let default = self.previous_default.take();
        let restored = self
            .registry
            .set_default_value(self.table, self.column, default)
            .and_then(|()| {
                self.registry
                    .set_allows_blank(self.table, self.column, self.previous_flag)
            });
        match restored {
            Ok(()) => {
                tracing::trace!(target: "tblr.undo", table_id = self.table.raw(), column_id = self.column.raw(), "blank relaxation rolled back");
            }
            Err(e) => {
                tracing::warn!(target: "tblr.undo", table_id = self.table.raw(), column_id = self.column.raw(), error = %e, "blank relaxation rollback failed");
            }
        }
    }
}

impl Drop for BlankRelaxation<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.restore();
        }
    }
}
