#![forbid(unsafe_code)]

//! Per-kind value rules.
//!
//! Each column kind is a zero-sized marker implementing [`ColumnKind`]. The
//! trait is the single table of per-kind behavior: which present values are
//! valid, how a display string parses, and how native values map to and from
//! [`Value`]. Blank handling is shared and lives in
//! [`TypedColumn`](super::TypedColumn).

use std::fmt;

use crate::column_type::ColumnType;
use crate::error::{Result, TableError};
use crate::value::Value;

/// Rules for one column kind.
pub trait ColumnKind: Copy + Default + fmt::Debug + PartialEq + Eq + Send + Sync + 'static {
    /// Native type stored in the column.
    type Value: Clone + fmt::Debug + fmt::Display + PartialEq + Send + Sync + 'static;

    /// The kind's tag.
    const TYPE: ColumnType;

    /// Validity of a present, non-blank value.
    fn is_valid_present(value: &Self::Value) -> bool;

    /// Parse a non-blank display string.
    fn parse_present(input: &str) -> Result<Self::Value>;

    /// Whether a native value counts as blank.
    fn is_blank(_value: &Self::Value) -> bool {
        false
    }

    /// Whether a display string denotes a blank cell.
    fn is_blank_input(input: &str) -> bool {
        input.is_empty()
    }

    /// Tag a native value.
    fn wrap(value: Self::Value) -> Value;

    /// Untag a value, rejecting values of other kinds.
    fn unwrap(value: Value) -> Result<Self::Value>;

    /// Heap + inline size of a value, for memory accounting.
    fn value_size(_value: &Self::Value) -> usize {
        std::mem::size_of::<Self::Value>()
    }
}

fn mismatch<K: ColumnKind>(value: &Value) -> TableError {
    TableError::TypeMismatch {
        expected: K::TYPE,
        actual: value.column_type(),
    }
}

/// Free-form text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Text;

impl ColumnKind for Text {
    type Value = String;
    const TYPE: ColumnType = ColumnType::Text;

    fn is_valid_present(value: &String) -> bool {
        !value.is_empty()
    }

    fn parse_present(input: &str) -> Result<String> {
        Ok(input.to_string())
    }

    fn is_blank(value: &String) -> bool {
        value.is_empty()
    }

    fn wrap(value: String) -> Value {
        Value::Text(value)
    }

    fn unwrap(value: Value) -> Result<String> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn value_size(value: &String) -> usize {
        std::mem::size_of::<String>() + value.len()
    }
}

/// Email address: exactly one `@`, no whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Email;

impl Email {
    /// Grammar `^[^\s@]+@[^\s@]+$`.
    #[must_use]
    pub fn matches_grammar(input: &str) -> bool {
        let Some((local, domain)) = input.split_once('@') else {
            return false;
        };
        let part_ok = |part: &str| !part.is_empty() && !part.contains(|c: char| c == '@' || c.is_whitespace());
        part_ok(local) && part_ok(domain)
    }
}

impl ColumnKind for Email {
    type Value = String;
    const TYPE: ColumnType = ColumnType::Email;

    fn is_valid_present(value: &String) -> bool {
        !value.is_empty()
            && value.matches('@').count() == 1
            && !value.chars().any(char::is_whitespace)
    }

    fn parse_present(input: &str) -> Result<String> {
        if Self::matches_grammar(input) {
            Ok(input.to_string())
        } else {
            Err(TableError::invalid_value(
                ColumnType::Email,
                input,
                "expected local@domain with exactly one '@' and no whitespace",
            ))
        }
    }

    fn is_blank(value: &String) -> bool {
        value.is_empty()
    }

    fn wrap(value: String) -> Value {
        Value::Email(value)
    }

    fn unwrap(value: Value) -> Result<String> {
        match value {
            Value::Email(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn value_size(value: &String) -> usize {
        std::mem::size_of::<String>() + value.len()
    }
}

/// `true` / `false`, case-insensitive on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Boolean;

impl ColumnKind for Boolean {
    type Value = bool;
    const TYPE: ColumnType = ColumnType::Boolean;

    fn is_valid_present(_value: &bool) -> bool {
        true
    }

    fn parse_present(input: &str) -> Result<bool> {
        let normalized = input.trim();
        if normalized.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if normalized.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(TableError::invalid_value(
                ColumnType::Boolean,
                input,
                "expected 'true' or 'false'",
            ))
        }
    }

    fn is_blank_input(input: &str) -> bool {
        input.trim().is_empty()
    }

    fn wrap(value: bool) -> Value {
        Value::Boolean(value)
    }

    fn unwrap(value: Value) -> Result<bool> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

/// Signed integer in canonical decimal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Integer;

impl ColumnKind for Integer {
    type Value = i64;
    const TYPE: ColumnType = ColumnType::Integer;

    fn is_valid_present(_value: &i64) -> bool {
        true
    }

    fn parse_present(input: &str) -> Result<i64> {
        let parsed: i64 = input.parse().map_err(|_| {
            TableError::invalid_value(ColumnType::Integer, input, "not an integer")
        })?;
        // Rejects leading zeros, a leading '+', and "-0".
        if parsed.to_string() != input {
            return Err(TableError::invalid_value(
                ColumnType::Integer,
                input,
                "integer is not in canonical form",
            ));
        }
        Ok(parsed)
    }

    fn wrap(value: i64) -> Value {
        Value::Integer(value)
    }

    fn unwrap(value: Value) -> Result<i64> {
        match value {
            Value::Integer(n) => Ok(n),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validity_requires_one_at_and_no_whitespace() {
        assert!(Email::is_valid_present(&"hello@world".to_string()));
        assert!(!Email::is_valid_present(&"a@@b".to_string()));
        assert!(!Email::is_valid_present(&"a b@c".to_string()));
        assert!(!Email::is_valid_present(&"nobody".to_string()));
        assert!(!Email::is_valid_present(&"tab\t@x".to_string()));
    }

    #[test]
    fn email_grammar_requires_both_parts() {
        assert!(Email::matches_grammar("a@b"));
        assert!(!Email::matches_grammar("@b"));
        assert!(!Email::matches_grammar("a@"));
        assert!(!Email::matches_grammar("a@b@c"));
        assert!(Email::parse_present("x@y.z").is_ok());
        assert!(Email::parse_present("x@").is_err());
    }

    #[test]
    fn boolean_parse_is_case_insensitive_only_for_true_false() {
        assert!(Boolean::parse_present("TRUE").unwrap());
        assert!(!Boolean::parse_present("False").unwrap());
        assert!(Boolean::parse_present(" true ").unwrap());
        assert!(Boolean::parse_present("yes").is_err());
        assert!(Boolean::parse_present("1").is_err());
    }

    #[test]
    fn integer_parse_rejects_non_canonical_forms() {
        assert_eq!(Integer::parse_present("42").unwrap(), 42);
        assert_eq!(Integer::parse_present("-7").unwrap(), -7);
        assert_eq!(Integer::parse_present("0").unwrap(), 0);
        for bad in ["007", "+5", "-0", " 5", "5 ", "1.0", "x", ""] {
            assert!(Integer::parse_present(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn unwrap_rejects_other_kinds() {
        let err = Integer::unwrap(Value::Text("1".into())).unwrap_err();
        assert_eq!(
            err,
            TableError::TypeMismatch {
                expected: ColumnType::Integer,
                actual: ColumnType::Text
            }
        );
        assert_eq!(Text::unwrap(Value::Text("a".into())).unwrap(), "a");
    }

    #[test]
    fn only_text_kinds_have_blank_values() {
        assert!(Text::is_blank(&String::new()));
        assert!(Email::is_blank(&String::new()));
        assert!(!Integer::is_blank(&0));
        assert!(Boolean::is_blank_input("   "));
        assert!(!Text::is_blank_input("   "));
    }
}
