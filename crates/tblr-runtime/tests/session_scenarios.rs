//! End-to-end scenarios driven through [`Session`].
//!
//! Run:
//!   cargo test -p tblr-runtime --test session_scenarios

use tblr_core::{ColumnId, ColumnType, ErrorKind, TableId, Value};
use tblr_runtime::undo::{AddColumn, AddRow, CreateTable};
use tblr_runtime::{CommandBatch, CommandError, CommandSource, Session, TableRegistry};

fn kind(result: Result<(), CommandError>) -> Option<ErrorKind> {
    result.err().and_then(|e| e.kind())
}

/// One table with one Text column and `rows` rows.
fn table_with_column(session: &mut Session, rows: usize) -> (TableId, ColumnId) {
    let t = session.create_table().unwrap();
    let c = session.add_column(t).unwrap();
    for _ in 0..rows {
        session.add_row(t).unwrap();
    }
    (t, c)
}

// ============================================================================
// Blank handling
// ============================================================================

#[test]
fn blank_cell_blocks_disallowing_blanks() {
    let mut session = Session::new();
    let (t, c) = table_with_column(&mut session, 1);
    assert_eq!(session.registry().column_type(t, c).unwrap(), ColumnType::Text);
    assert!(session.registry().allows_blank(t, c).unwrap());

    session.set_cell_value_from_str(t, c, 0, "").unwrap();
    assert_eq!(session.registry().cell_value(t, c, 0).unwrap(), None);

    let depth = session.history().undo_depth();
    assert_eq!(kind(session.set_allows_blank(t, c, false)), Some(ErrorKind::Blocked));
    assert!(session.registry().allows_blank(t, c).unwrap());
    assert_eq!(session.history().undo_depth(), depth);
}

#[test]
fn filled_column_can_disallow_blanks_and_undo_restores() {
    let mut session = Session::new();
    let (t, c) = table_with_column(&mut session, 0);
    session.change_default_value(t, c, "n/a").unwrap();
    session.add_row(t).unwrap();
    session.set_allows_blank(t, c, false).unwrap();

    assert_eq!(
        kind(session.set_cell_value_from_str(t, c, 0, "")),
        Some(ErrorKind::InvalidValue)
    );
    assert_eq!(
        kind(session.change_default_value(t, c, "")),
        Some(ErrorKind::Blocked)
    );
    assert_eq!(session.registry().default_value_as_string(t, c).unwrap(), "n/a");

    session.undo().unwrap().unwrap();
    assert!(session.registry().allows_blank(t, c).unwrap());
    session.change_default_value(t, c, "").unwrap();
    assert_eq!(session.registry().default_value(t, c).unwrap(), None);
}

#[test]
fn toggle_allows_blank_round_trips() {
    let mut session = Session::new();
    let (t, c) = table_with_column(&mut session, 0);
    session.toggle_allows_blank(t, c).unwrap_err();
    session.change_default_value(t, c, "x").unwrap();
    session.toggle_allows_blank(t, c).unwrap();
    assert!(!session.registry().allows_blank(t, c).unwrap());
    session.toggle_allows_blank(t, c).unwrap();
    assert!(session.registry().allows_blank(t, c).unwrap());
    session.undo().unwrap().unwrap();
    assert!(!session.registry().allows_blank(t, c).unwrap());
}

// ============================================================================
// Type conversion
// ============================================================================

#[test]
fn conversion_becomes_legal_after_removing_bad_row() {
    let mut session = Session::new();
    let (t, c) = table_with_column(&mut session, 3);
    for (row, input) in ["1", "2", "x"].into_iter().enumerate() {
        session.set_cell_value_from_str(t, c, row, input).unwrap();
    }

    assert!(!session.can_convert(t, c, ColumnType::Integer).unwrap());
    assert_eq!(
        kind(session.convert_column_type(t, c, ColumnType::Integer)),
        Some(ErrorKind::Blocked)
    );

    session.delete_row(t, 2).unwrap();
    assert!(session.can_convert(t, c, ColumnType::Integer).unwrap());
    session.convert_column_type(t, c, ColumnType::Integer).unwrap();

    let col = session.registry().column(t, c).unwrap();
    assert_eq!(col.column_type(), ColumnType::Integer);
    assert_eq!(col.values(), vec![Some(Value::Integer(1)), Some(Value::Integer(2))]);

    session.undo().unwrap().unwrap();
    assert_eq!(session.registry().column_type(t, c).unwrap(), ColumnType::Text);
    assert_eq!(
        session.registry().cell_value(t, c, 1).unwrap(),
        Some(Value::Text("2".into()))
    );
}

#[test]
fn strict_kinds_only_convert_between_each_other_when_blank() {
    let mut session = Session::new();
    let (t, c) = table_with_column(&mut session, 1);
    session.set_cell_value_from_str(t, c, 0, "1").unwrap();
    session.convert_column_type(t, c, ColumnType::Integer).unwrap();

    assert!(!session.can_convert(t, c, ColumnType::Boolean).unwrap());
    assert!(session.can_convert(t, c, ColumnType::Text).unwrap());

    session.set_cell_value(t, c, 0, None).unwrap();
    assert!(session.can_convert(t, c, ColumnType::Boolean).unwrap());
    session.convert_column_type(t, c, ColumnType::Boolean).unwrap();
    assert_eq!(session.registry().column_type(t, c).unwrap(), ColumnType::Boolean);
}

#[test]
fn cycling_visits_every_kind_on_an_empty_column() {
    let mut session = Session::new();
    let (t, c) = table_with_column(&mut session, 2);
    let mut seen = vec![session.registry().column_type(t, c).unwrap()];
    for _ in 0..3 {
        seen.push(session.cycle_column_type(t, c).unwrap());
    }
    assert_eq!(
        seen,
        vec![ColumnType::Text, ColumnType::Email, ColumnType::Boolean, ColumnType::Integer]
    );
    assert_eq!(session.cycle_column_type(t, c).unwrap(), ColumnType::Text);
}

// ============================================================================
// Identity reuse
// ============================================================================

#[test]
fn deleted_slot_is_reused_by_next_table() {
    let mut session = Session::new();
    let ids: Vec<TableId> = (0..5).map(|_| session.create_table().unwrap()).collect();
    session.delete_table(ids[2]).unwrap();

    let t = session.create_table().unwrap();
    assert_eq!(t, TableId(3));
    assert_eq!(session.registry().table_name(t).unwrap(), "Table3");
    assert_eq!(session.registry().table_count(), 5);
}

#[test]
fn deleted_table_returns_to_its_position_on_undo() {
    let mut session = Session::new();
    for _ in 0..3 {
        session.create_table().unwrap();
    }
    let (t, c) = (TableId(2), session.add_column(TableId(2)).unwrap());
    session.add_row(t).unwrap();
    session.set_cell_value_from_str(t, c, 0, "kept").unwrap();
    let before = session.registry().clone();

    session.delete_table(t).unwrap();
    assert!(!session.registry().has_table(t));
    session.undo().unwrap().unwrap();

    assert_eq!(session.registry(), &before);
    assert_eq!(session.registry().table_position(t).unwrap(), 1);
}

#[test]
fn column_names_stay_unique_within_a_table() {
    let mut session = Session::new();
    let t = session.create_table().unwrap();
    let a = session.add_column(t).unwrap();
    let b = session.add_column(t).unwrap();
    assert_eq!(
        kind(session.rename_column(t, b, "Column1")),
        Some(ErrorKind::InvalidArgument)
    );
    session.rename_column(t, a, "Column1").unwrap();
    session.rename_column(t, a, "Price").unwrap();
    session.rename_column(t, b, "Column1").unwrap();
    assert_eq!(
        session.registry().column_names(t).unwrap(),
        vec!["Price".to_string(), "Column1".to_string()]
    );
}

// ============================================================================
// Email grammar
// ============================================================================

#[test]
fn email_cells_require_a_single_at_sign() {
    let mut session = Session::new();
    let (t, c) = table_with_column(&mut session, 1);
    session.convert_column_type(t, c, ColumnType::Email).unwrap();

    session.set_cell_value_from_str(t, c, 0, "hello@world").unwrap();
    for bad in ["a@@b", "a b@c"] {
        assert_eq!(
            kind(session.set_cell_value_from_str(t, c, 0, bad)),
            Some(ErrorKind::InvalidValue),
            "{bad} should be rejected"
        );
    }
    assert_eq!(
        session.registry().cell_value(t, c, 0).unwrap(),
        Some(Value::Email("hello@world".into()))
    );
}

// ============================================================================
// Boolean defaults
// ============================================================================

#[test]
fn boolean_default_toggles_and_undoes() {
    let mut session = Session::new();
    let (t, c) = table_with_column(&mut session, 0);
    session.convert_column_type(t, c, ColumnType::Boolean).unwrap();

    assert_eq!(session.toggle_default_value(t, c).unwrap(), Some(true));
    assert_eq!(session.toggle_default_value(t, c).unwrap(), Some(false));
    assert_eq!(session.history().next_undo_description(), Some("Toggle default value"));

    session.add_row(t).unwrap();
    assert_eq!(
        session.registry().cell_value(t, c, 0).unwrap(),
        Some(Value::Boolean(false))
    );

    session.undo().unwrap().unwrap();
    session.undo().unwrap().unwrap();
    assert_eq!(
        session.registry().default_value(t, c).unwrap(),
        Some(Value::Boolean(true))
    );
}

// ============================================================================
// History
// ============================================================================

#[test]
fn new_command_after_undo_discards_redo() {
    let mut session = Session::new();
    let t = session.create_table().unwrap();
    session.rename_table(t, "People").unwrap();
    session.undo().unwrap().unwrap();
    assert_eq!(session.history().next_redo_description(), Some("Rename table"));

    session.add_column(t).unwrap();
    assert!(!session.can_redo());
    assert!(session.redo().is_none());
    assert_eq!(session.registry().table_name(t).unwrap(), "Table1");
}

#[test]
fn empty_history_reports_nothing_to_do() {
    let mut session = Session::new();
    assert!(session.undo().is_none());
    assert!(session.redo().is_none());
    assert!(!session.can_undo());
}

#[test]
fn clear_history_keeps_tables() {
    let mut session = Session::new();
    session.create_table().unwrap();
    session.clear_history();
    assert!(!session.can_undo());
    assert_eq!(session.registry().table_count(), 1);
}

#[test]
fn batch_is_a_single_undo_step() {
    let mut session = Session::new();
    let mut batch = CommandBatch::<TableRegistry>::new("Add starter table")
        .with_source(CommandSource::Programmatic);
    batch.push(Box::new(CreateTable::new()));
    batch.push(Box::new(AddColumn::new(TableId(1))));
    batch.push(Box::new(AddRow::new(TableId(1))));
    session.execute(Box::new(batch)).unwrap();

    assert_eq!(session.registry().row_count(TableId(1)).unwrap(), 1);
    assert_eq!(session.history().undo_depth(), 1);
    assert_eq!(session.history().next_undo_description(), Some("Add starter table"));

    session.undo().unwrap().unwrap();
    assert_eq!(session.registry(), &TableRegistry::new());
    session.redo().unwrap().unwrap();
    assert_eq!(session.registry().column_count(TableId(1)).unwrap(), 1);
}

#[test]
fn failed_batch_rolls_back_and_records_nothing() {
    let mut session = Session::new();
    let mut batch = CommandBatch::<TableRegistry>::new("Broken");
    batch.push(Box::new(CreateTable::new()));
    batch.push(Box::new(AddColumn::new(TableId(9))));
    let err = session.execute(Box::new(batch)).unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    assert_eq!(session.registry().table_count(), 0);
    assert!(!session.can_undo());
}

#[test]
fn rejected_operations_report_their_kind() {
    let mut session = Session::new();
    let (t, c) = table_with_column(&mut session, 1);

    assert_eq!(kind(session.delete_table(TableId(42))), Some(ErrorKind::NotFound));
    assert_eq!(kind(session.delete_column(t, ColumnId(42))), Some(ErrorKind::NotFound));
    assert_eq!(kind(session.rename_table(t, "  ")), Some(ErrorKind::InvalidArgument));
    assert_eq!(kind(session.delete_row(t, 1)), Some(ErrorKind::InvalidArgument));
    assert_eq!(
        kind(session.set_cell_value_from_str(t, c, 5, "x")),
        Some(ErrorKind::InvalidArgument)
    );
    assert_eq!(session.history().undo_depth(), 3);
}
