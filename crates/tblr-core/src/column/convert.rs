#![forbid(unsafe_code)]

//! Building a column of another kind from an existing one.

use crate::column::Column;
use crate::column_type::ColumnType;
use crate::error::Result;

/// Build a `target`-kind copy of `old`.
///
/// The copy keeps the id, name and blank-allowance. Its default and every
/// row are obtained by rendering the old value to its display string and
/// parsing it under the target kind's rules. Any parse failure aborts the
/// whole build; `old` is never touched.
pub fn build_converted(old: &Column, target: ColumnType) -> Result<Column> {
    let wrap = |e: crate::TableError| e.in_column(old.name());

    let mut new = Column::new(target, old.name(), true, old.id()).map_err(wrap)?;
    new.change_default_value_from_str(&old.default_value_as_string())
        .map_err(wrap)?;
    if !old.allows_blank() && !new.set_allows_blank(false) {
        return Err(wrap(crate::TableError::BlankNotAllowed));
    }

    for _ in 0..old.len() {
        new.push_default();
    }
    for row in 0..old.len() {
        let display = old.value_as_string(row).map_err(wrap)?;
        new.set_value_from_str(row, &display).map_err(wrap)?;
    }

    tracing::trace!(
        target: "tblr.column",
        column_id = old.id().raw(),
        from = %old.column_type(),
        to = %target,
        rows = new.len(),
        "built converted column"
    );
    Ok(new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ColumnId;
    use crate::value::Value;

    fn text_with(values: &[&str]) -> Column {
        let mut col = Column::new(ColumnType::Text, "Qty", true, ColumnId(4)).unwrap();
        for (i, v) in values.iter().enumerate() {
            col.push_default();
            col.set_value_from_str(i, v).unwrap();
        }
        col
    }

    #[test]
    fn text_to_integer_parses_every_row() {
        let old = text_with(&["1", "", "-3"]);
        let new = build_converted(&old, ColumnType::Integer).unwrap();
        assert_eq!(new.column_type(), ColumnType::Integer);
        assert_eq!(new.id(), ColumnId(4));
        assert_eq!(new.name(), "Qty");
        assert_eq!(
            new.values(),
            vec![Some(Value::Integer(1)), None, Some(Value::Integer(-3))]
        );
    }

    #[test]
    fn failed_parse_aborts_without_touching_source() {
        let old = text_with(&["1", "x"]);
        let before = old.clone();
        let err = build_converted(&old, ColumnType::Integer).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidValue);
        assert_eq!(old, before);
    }

    #[test]
    fn integer_to_text_renders_display_strings() {
        let mut old = Column::new(ColumnType::Integer, "N", true, ColumnId(1)).unwrap();
        old.change_default_value(Some(Value::Integer(7))).unwrap();
        old.push_default();
        let new = build_converted(&old, ColumnType::Text).unwrap();
        assert_eq!(new.default_value(), Some(Value::Text("7".into())));
        assert_eq!(new.values(), vec![Some(Value::Text("7".into()))]);
    }

    #[test]
    fn blank_allowance_is_preserved() {
        let mut old = Column::with_default(
            ColumnType::Text,
            "Flag",
            true,
            Some(Value::Text("true".into())),
            ColumnId(2),
        )
        .unwrap();
        old.push_default();
        assert!(old.set_allows_blank(false));
        let new = build_converted(&old, ColumnType::Boolean).unwrap();
        assert!(!new.allows_blank());
        assert_eq!(new.default_value(), Some(Value::Boolean(true)));
    }
}
