#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tblr_core::ColumnType;
use tblr_runtime::{Session, TableRegistry};

#[derive(Debug, Arbitrary)]
enum Op {
    CreateTable,
    DeleteTable(u8),
    RenameTable(u8, String),
    AddColumn(u8),
    DeleteColumn(u8, u8),
    ConvertColumn(u8, u8, u8),
    ChangeDefault(u8, u8, String),
    ToggleAllowsBlank(u8, u8),
    AddRow(u8),
    DeleteRow(u8, u8),
    SetCell(u8, u8, u8, String),
    Undo,
    Redo,
}

fn apply(session: &mut Session, op: &Op) {
    let tables = session.registry().table_ids();
    let table = |i: u8| (!tables.is_empty()).then(|| tables[i as usize % tables.len()]);
    let column = |session: &Session, t, i: u8| {
        let ids = session.registry().column_ids(t).ok()?;
        (!ids.is_empty()).then(|| ids[i as usize % ids.len()])
    };

    // Rejections are expected; only panics and broken invariants are bugs.
    match op {
        Op::CreateTable => {
            let _ = session.create_table();
        }
        Op::DeleteTable(t) => {
            if let Some(t) = table(*t) {
                let _ = session.delete_table(t);
            }
        }
        Op::RenameTable(t, name) => {
            if let Some(t) = table(*t) {
                let _ = session.rename_table(t, name);
            }
        }
        Op::AddColumn(t) => {
            if let Some(t) = table(*t) {
                let _ = session.add_column(t);
            }
        }
        Op::DeleteColumn(t, c) => {
            if let Some(t) = table(*t) {
                if let Some(c) = column(session, t, *c) {
                    let _ = session.delete_column(t, c);
                }
            }
        }
        Op::ConvertColumn(t, c, k) => {
            if let Some(t) = table(*t) {
                if let Some(c) = column(session, t, *c) {
                    let target = ColumnType::ALL[*k as usize % ColumnType::ALL.len()];
                    let _ = session.convert_column_type(t, c, target);
                }
            }
        }
        Op::ChangeDefault(t, c, input) => {
            if let Some(t) = table(*t) {
                if let Some(c) = column(session, t, *c) {
                    let _ = session.change_default_value(t, c, input);
                }
            }
        }
        Op::ToggleAllowsBlank(t, c) => {
            if let Some(t) = table(*t) {
                if let Some(c) = column(session, t, *c) {
                    let _ = session.toggle_allows_blank(t, c);
                }
            }
        }
        Op::AddRow(t) => {
            if let Some(t) = table(*t) {
                let _ = session.add_row(t);
            }
        }
        Op::DeleteRow(t, r) => {
            if let Some(t) = table(*t) {
                let _ = session.delete_row(t, *r as usize);
            }
        }
        Op::SetCell(t, c, r, input) => {
            if let Some(t) = table(*t) {
                if let Some(c) = column(session, t, *c) {
                    let _ = session.set_cell_value_from_str(t, c, *r as usize, input);
                }
            }
        }
        Op::Undo => {
            if let Some(result) = session.undo() {
                assert!(result.is_ok(), "undo failed: {result:?}");
            }
        }
        Op::Redo => {
            if let Some(result) = session.redo() {
                assert!(result.is_ok(), "redo failed: {result:?}");
            }
        }
    }
}

fn check(reg: &TableRegistry) {
    for table in reg.tables() {
        for col in table.columns() {
            assert_eq!(col.len(), table.row_count(), "rows out of lock-step");
            if !col.allows_blank() {
                assert!(col.default_value().is_some(), "blank default");
                assert!(col.values().iter().all(Option::is_some), "blank value");
            }
        }
    }
}

fuzz_target!(|ops: Vec<Op>| {
    if ops.len() > 256 {
        return;
    }
    let mut session = Session::new();
    for op in &ops {
        apply(&mut session, op);
        check(session.registry());
    }

    // Rewinding the whole history always lands on the empty registry.
    while let Some(result) = session.undo() {
        assert!(result.is_ok(), "undo failed: {result:?}");
    }
    assert_eq!(session.registry(), &TableRegistry::new());
});
