//! Predicates applied to catalog entries. An entry survives when every
//! active predicate accepts it.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Local};

use crate::models::Entry;

/// Deletion date window, in whole days before the reference time.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DayRange {
    /// Deleted within the last N days, boundary included.
    New(u32),
    /// Deleted more than N days ago.
    Old(u32),
}

impl DayRange {
    pub fn contains(&self, deleted_at: &DateTime<Local>, now: &DateTime<Local>) -> bool {
        let days = match self {
            Self::New(days) | Self::Old(days) => *days,
        };
        let cutoff = Duration::try_days(i64::from(days)).and_then(|delta| now.checked_sub_signed(delta));
        let is_new = match cutoff {
            Some(cutoff) => *deleted_at >= cutoff,
            None => true,
        };
        match self {
            Self::New(_) => is_new,
            Self::Old(_) => !is_new,
        }
    }
}

/// Size threshold in bytes.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SizeRange {
    /// At least N bytes.
    Large(u64),
    /// Fewer than N bytes.
    Small(u64),
}

impl SizeRange {
    /// Entries whose size is not known never match.
    pub fn contains(&self, size: Option<u64>) -> bool {
        match (self, size) {
            (Self::Large(limit), Some(size)) => size >= *limit,
            (Self::Small(limit), Some(size)) => size < *limit,
            (_, None) => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Required parent directory of the original path, already absolute.
    pub directory: Option<PathBuf>,
    pub days: Option<DayRange>,
    pub sizes: Option<SizeRange>,
}

impl Filter {
    /// True when sizes must be known before [`Filter::keep_size`] can run.
    pub fn needs_size(&self) -> bool {
        self.sizes.is_some()
    }

    /// Directory and date predicates; cheap, no I/O.
    pub fn keep_scope(&self, entry: &Entry, now: &DateTime<Local>) -> bool {
        let in_directory = self
            .directory
            .as_deref()
            .map_or(true, |dir| entry.original_dir() == Some(dir));
        let in_days = self
            .days
            .map_or(true, |days| days.contains(&entry.deleted_at, now));
        in_directory && in_days
    }

    pub fn keep_size(&self, entry: &Entry) -> bool {
        self.sizes.map_or(true, |sizes| sizes.contains(entry.size.bytes()))
    }

    pub fn keep(&self, entry: &Entry, now: &DateTime<Local>) -> bool {
        self.keep_scope(entry, now) && self.keep_size(entry)
    }

    pub fn apply(&self, entries: Vec<Entry>, now: &DateTime<Local>) -> Vec<Entry> {
        entries.into_iter().filter(|entry| self.keep(entry, now)).collect()
    }
}
