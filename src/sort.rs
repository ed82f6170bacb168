//! Ordering and truncation of the filtered catalog.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::errors::{CoreError, Result};
use crate::models::Entry;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum SortKey {
    /// Deletion time.
    #[default]
    Date,
    /// Full original path.
    Path,
    /// File name of the original path.
    Name,
    /// Size in bytes; unknown sizes come first.
    Size,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [Self::Date, Self::Path, Self::Name, Self::Size];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Path => "path",
            Self::Name => "name",
            Self::Size => "size",
        }
    }

    pub fn needs_size(&self) -> bool {
        matches!(self, Self::Size)
    }

    fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        match self {
            Self::Date => a.deleted_at.cmp(&b.deleted_at),
            Self::Path => a.original_path.cmp(&b.original_path),
            Self::Name => a.name().cmp(b.name()),
            Self::Size => a.size.bytes().cmp(&b.size.bytes()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| CoreError::invalid_input(format!("unknown sort key: {value}")))
    }
}

/// Stable sort on `key`. Direction applies to the key only; ties are always
/// broken by original path, then by storage path, ascending.
pub fn sort_entries(entries: &mut [Entry], key: SortKey, ascending: bool) {
    entries.sort_by(|a, b| {
        let primary = key.compare(a, b);
        let primary = if ascending { primary } else { primary.reverse() };
        primary
            .then_with(|| a.original_path.cmp(&b.original_path))
            .then_with(|| a.trash_path.cmp(&b.trash_path))
    });
}

/// Keeps the last `n` entries of the sorted order. `0` keeps everything.
pub fn keep_last(entries: &mut Vec<Entry>, n: usize) {
    if n > 0 && entries.len() > n {
        entries.drain(..entries.len() - n);
    }
}
