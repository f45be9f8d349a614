#![forbid(unsafe_code)]

//! Stable identities and smallest-free-integer allocation.
//!
//! Tables and columns are identified by small positive integers that never
//! change after creation. New identities (and default names such as
//! `Table3` / `Column2`) reuse the lowest positive integer that no sibling
//! currently holds, so deleting `Table3` and creating a new table yields
//! `Table3` again rather than growing without bound.
//!
//! # Invariants
//!
//! - Allocation is a pure function of the set of taken candidates; it does
//!   not depend on sibling iteration order.
//! - With `n` siblings, the answer is always in `1..=n + 1` (pigeonhole), so
//!   the scan is bounded.

use std::fmt;

use ahash::AHashSet;

/// Default-name prefix for tables.
pub const TABLE_NAME_PREFIX: &str = "Table";

/// Default-name prefix for columns.
pub const COLUMN_NAME_PREFIX: &str = "Column";

/// Identity of a table, unique among the tables of one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableId(pub u32);

impl TableId {
    /// Create a table ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a column, unique among the columns of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnId(pub u32);

impl ColumnId {
    /// Create a column ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Smallest positive integer for which `is_taken` returns false.
///
/// `sibling_count` bounds the scan: among `sibling_count + 1` candidates at
/// least one must be free.
#[must_use]
pub fn smallest_free(sibling_count: usize, is_taken: impl Fn(u32) -> bool) -> u32 {
    let upper = u32::try_from(sibling_count)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1);
    for candidate in 1..=upper {
        if !is_taken(candidate) {
            return candidate;
        }
    }
    upper.saturating_add(1)
}

/// Smallest positive raw id not present in `taken`.
#[must_use]
pub fn next_free_raw_id(taken: impl IntoIterator<Item = u32>) -> u32 {
    let taken: AHashSet<u32> = taken.into_iter().collect();
    smallest_free(taken.len(), |n| taken.contains(&n))
}

/// Smallest `prefix<i>` name not present in `names`.
#[must_use]
pub fn next_free_name<'a>(prefix: &str, names: impl IntoIterator<Item = &'a str>) -> String {
    // Only names shaped like `prefix<digits>` can collide with a candidate.
    let taken: AHashSet<u32> = names
        .into_iter()
        .filter_map(|name| name.strip_prefix(prefix))
        .filter(|suffix| !suffix.starts_with('0') && !suffix.starts_with('+'))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .collect();
    let n = smallest_free(taken.len(), |n| taken.contains(&n));
    format!("{prefix}{n}")
}
