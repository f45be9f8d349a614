//! Property-based invariant tests for the session history.
//!
//! Random operation sequences are driven through a [`Session`]:
//!
//! 1. A successful command is exactly inverted by undo, and redo restores
//!    the post-execute state
//! 2. A rejected command changes neither the tables nor the history
//! 3. Undoing everything returns to the empty registry; redoing everything
//!    returns to the final state
//! 4. Structural invariants hold after every step (lock-step rows, unique
//!    ids and names, no blanks in blank-free columns)

use proptest::prelude::*;
use tblr_core::{ColumnType, Value};
use tblr_runtime::{CommandError, HistoryConfig, Session, TableRegistry};

// ── Strategies ──────────────────────────────────────────────────────────

/// Operations addressed by position; positions wrap over what exists.
#[derive(Debug, Clone)]
enum Op {
    CreateTable,
    DeleteTable(usize),
    RenameTable(usize, &'static str),
    AddColumn(usize),
    DeleteColumn(usize, usize),
    RenameColumn(usize, usize, &'static str),
    ConvertColumn(usize, usize, ColumnType),
    ChangeDefault(usize, usize, &'static str),
    ToggleDefault(usize, usize),
    SetAllowsBlank(usize, usize, bool),
    AddRow(usize),
    DeleteRow(usize, usize),
    SetCell(usize, usize, usize, &'static str),
}

const INPUTS: &[&str] = &[
    "", "1", "-3", "007", "42", "true", "False", " true ", "a@b", "a@@b", "x y@z", "hello",
    "Table1", "Column1",
];

fn input() -> impl Strategy<Value = &'static str> {
    prop::sample::select(INPUTS)
}

fn column_type() -> impl Strategy<Value = ColumnType> {
    prop::sample::select(ColumnType::ALL.to_vec())
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let ix = || 0usize..8;
    prop_oneof![
        2 => Just(Op::CreateTable),
        1 => ix().prop_map(Op::DeleteTable),
        1 => (ix(), input()).prop_map(|(t, s)| Op::RenameTable(t, s)),
        3 => ix().prop_map(Op::AddColumn),
        1 => (ix(), ix()).prop_map(|(t, c)| Op::DeleteColumn(t, c)),
        1 => (ix(), ix(), input()).prop_map(|(t, c, s)| Op::RenameColumn(t, c, s)),
        2 => (ix(), ix(), column_type()).prop_map(|(t, c, ty)| Op::ConvertColumn(t, c, ty)),
        2 => (ix(), ix(), input()).prop_map(|(t, c, s)| Op::ChangeDefault(t, c, s)),
        1 => (ix(), ix()).prop_map(|(t, c)| Op::ToggleDefault(t, c)),
        2 => (ix(), ix(), any::<bool>()).prop_map(|(t, c, b)| Op::SetAllowsBlank(t, c, b)),
        3 => ix().prop_map(Op::AddRow),
        1 => (ix(), ix()).prop_map(|(t, r)| Op::DeleteRow(t, r)),
        4 => (ix(), ix(), ix(), input()).prop_map(|(t, c, r, s)| Op::SetCell(t, c, r, s)),
    ]
}

/// Apply `op` if it addresses something that exists.
///
/// Row positions are not wrapped, so out-of-range rows exercise rejection.
fn apply(session: &mut Session, op: &Op) -> Option<Result<(), CommandError>> {
    let reg = session.registry();
    let table = |i: usize| {
        let ids = reg.table_ids();
        (!ids.is_empty()).then(|| ids[i % ids.len()])
    };
    let column = |t, i: usize| {
        let ids = reg.column_ids(t).ok()?;
        (!ids.is_empty()).then(|| ids[i % ids.len()])
    };

    match *op {
        Op::CreateTable => Some(session.create_table().map(|_| ())),
        Op::DeleteTable(t) => {
            let t = table(t)?;
            Some(session.delete_table(t))
        }
        Op::RenameTable(t, name) => {
            let t = table(t)?;
            Some(session.rename_table(t, name))
        }
        Op::AddColumn(t) => {
            let t = table(t)?;
            Some(session.add_column(t).map(|_| ()))
        }
        Op::DeleteColumn(t, c) => {
            let t = table(t)?;
            let c = column(t, c)?;
            Some(session.delete_column(t, c))
        }
        Op::RenameColumn(t, c, name) => {
            let t = table(t)?;
            let c = column(t, c)?;
            Some(session.rename_column(t, c, name))
        }
        Op::ConvertColumn(t, c, ty) => {
            let t = table(t)?;
            let c = column(t, c)?;
            Some(session.convert_column_type(t, c, ty))
        }
        Op::ChangeDefault(t, c, s) => {
            let t = table(t)?;
            let c = column(t, c)?;
            Some(session.change_default_value(t, c, s))
        }
        Op::ToggleDefault(t, c) => {
            let t = table(t)?;
            let c = column(t, c)?;
            Some(session.toggle_default_value(t, c).map(|_| ()))
        }
        Op::SetAllowsBlank(t, c, b) => {
            let t = table(t)?;
            let c = column(t, c)?;
            Some(session.set_allows_blank(t, c, b))
        }
        Op::AddRow(t) => {
            let t = table(t)?;
            Some(session.add_row(t).map(|_| ()))
        }
        Op::DeleteRow(t, r) => {
            let t = table(t)?;
            Some(session.delete_row(t, r))
        }
        Op::SetCell(t, c, r, s) => {
            let t = table(t)?;
            let c = column(t, c)?;
            Some(session.set_cell_value_from_str(t, c, r, s))
        }
    }
}

/// Structural invariants that must hold between any two operations.
fn check_invariants(reg: &TableRegistry) -> Result<(), TestCaseError> {
    let mut table_ids = reg.table_ids();
    table_ids.sort();
    table_ids.dedup();
    prop_assert_eq!(table_ids.len(), reg.table_count(), "duplicate table id");

    let mut names: Vec<_> = reg.tables().iter().map(|t| t.name().to_string()).collect();
    names.sort();
    names.dedup();
    prop_assert_eq!(names.len(), reg.table_count(), "duplicate table name");

    for table in reg.tables() {
        let mut col_names = table.column_names();
        col_names.sort();
        col_names.dedup();
        prop_assert_eq!(col_names.len(), table.column_count(), "duplicate column name");

        for col in table.columns() {
            prop_assert_eq!(col.len(), table.row_count(), "rows out of lock-step");
            if !col.allows_blank() {
                prop_assert!(col.default_value().is_some(), "blank default in {}", col.name());
                prop_assert!(
                    col.values().iter().all(Option::is_some),
                    "blank value in {}",
                    col.name()
                );
            }
            for v in col.values().into_iter().flatten() {
                prop_assert_eq!(v.column_type(), col.column_type());
            }
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// 1-2. Each step is exactly invertible; rejections leave no trace
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn every_command_is_inverted_by_undo(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut session = Session::new();
        for op in &ops {
            let before = session.registry().clone();
            let depth = session.history().undo_depth();

            match apply(&mut session, op) {
                None => continue,
                Some(Err(_)) => {
                    prop_assert_eq!(session.registry(), &before, "rejected {:?} mutated state", op);
                    prop_assert_eq!(session.history().undo_depth(), depth);
                }
                Some(Ok(())) => {
                    let after = session.registry().clone();
                    prop_assert!(matches!(session.undo(), Some(Ok(_))), "undo of {:?} failed", op);
                    prop_assert_eq!(session.registry(), &before, "undo of {:?} is not exact", op);
                    prop_assert!(matches!(session.redo(), Some(Ok(_))), "redo of {:?} failed", op);
                    prop_assert_eq!(session.registry(), &after, "redo of {:?} is not exact", op);
                }
            }
            check_invariants(session.registry())?;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Whole-history rewind and replay
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn undo_all_then_redo_all(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut session = Session::new();
        for op in &ops {
            let _ = apply(&mut session, op);
        }
        let final_state = session.registry().clone();
        let depth = session.history().undo_depth();

        for _ in 0..depth {
            prop_assert!(matches!(session.undo(), Some(Ok(_))));
        }
        prop_assert!(session.undo().is_none());
        prop_assert_eq!(session.registry(), &TableRegistry::new());

        for _ in 0..depth {
            prop_assert!(matches!(session.redo(), Some(Ok(_))));
        }
        prop_assert!(session.redo().is_none());
        prop_assert_eq!(session.registry(), &final_state);
    }

    #[test]
    fn new_command_after_undo_invalidates_redo(ops in prop::collection::vec(op_strategy(), 1..20)) {
        let mut session = Session::new();
        for op in &ops {
            let _ = apply(&mut session, op);
        }
        if session.can_undo() {
            session.undo();
            prop_assert!(session.can_redo());
            session.create_table().unwrap();
            prop_assert!(!session.can_redo());
            prop_assert!(session.redo().is_none());
        }
    }

    #[test]
    fn bounded_history_respects_depth(ops in prop::collection::vec(op_strategy(), 1..40), depth in 1usize..6) {
        let mut session = Session::with_history_config(HistoryConfig::new(depth, 0));
        for op in &ops {
            let _ = apply(&mut session, op);
            prop_assert!(session.history().undo_depth() <= depth);
        }
    }
}

#[test]
fn blank_cell_round_trips_through_history() {
    let mut session = Session::new();
    let t = session.create_table().unwrap();
    let c = session.add_column(t).unwrap();
    session.add_row(t).unwrap();
    session.set_cell_value(t, c, 0, Some(Value::Text("v".into()))).unwrap();
    session.set_cell_value_from_str(t, c, 0, "").unwrap();
    assert_eq!(session.registry().cell_value(t, c, 0).unwrap(), None);
    session.undo().unwrap().unwrap();
    assert_eq!(
        session.registry().cell_value(t, c, 0).unwrap(),
        Some(Value::Text("v".into()))
    );
}
