//! Restore and permanent removal of trashed entries.
//!
//! Each entry is handled on its own: a failure is recorded in the report and
//! the batch moves on. Data is always moved or deleted before its sidecar,
//! and a completed data move is never undone.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{CoreError, Result};
use crate::fs::{create_dir_all, exists_no_follow, move_path, remove_file, remove_path};
use crate::models::{Entry, OrphanKind, OrphanMeta};

/// Result of a successful per-entry operation.
#[derive(Debug)]
pub enum Outcome {
    Done,
    /// The data was handled but its sidecar could not be deleted; it will
    /// show up as an orphan on the next load.
    MetadataLeft(CoreError),
}

#[derive(Debug)]
pub struct EntryReport {
    /// Original path of the entry, or the orphan's path for repairs.
    pub path: PathBuf,
    pub result: std::result::Result<Outcome, CoreError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<EntryReport>,
}

impl BatchReport {
    fn push(&mut self, path: PathBuf, result: std::result::Result<Outcome, CoreError>) {
        match &result {
            Ok(Outcome::Done) => debug!(path = %path.display(), "done"),
            Ok(Outcome::MetadataLeft(err)) => {
                warn!(path = %path.display(), error = %err, "trashinfo left behind")
            }
            Err(err) => warn!(path = %path.display(), error = %err, "failed"),
        }
        self.entries.push(EntryReport { path, result });
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &CoreError)> {
        self.entries.iter().filter_map(|e| match &e.result {
            Err(err) => Some((e.path.as_path(), err)),
            Ok(_) => None,
        })
    }

    /// Entries whose sidecar survived a successful data operation.
    pub fn metadata_left(&self) -> impl Iterator<Item = (&Path, &CoreError)> {
        self.entries.iter().filter_map(|e| match &e.result {
            Ok(Outcome::MetadataLeft(err)) => Some((e.path.as_path(), err)),
            _ => None,
        })
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// `Err(CoreError::Batch)` when any entry failed.
    pub fn into_result(self) -> Result<Self> {
        let failed = self.failures().count();
        if failed == 0 {
            Ok(self)
        } else {
            Err(CoreError::Batch {
                failed,
                total: self.entries.len(),
            })
        }
    }
}

/// Moves entries back out of the trash.
///
/// Without `restore_to` every entry goes back to its original path; with it,
/// entries land in that directory under their original file name. Existing
/// destinations are never overwritten.
pub fn restore(entries: &[Entry], restore_to: Option<&Path>) -> BatchReport {
    let mut report = BatchReport::default();
    for entry in entries {
        let destination = match restore_to {
            Some(dir) => dir.join(entry.name()),
            None => entry.original_path.clone(),
        };
        let result = restore_one(entry, &destination);
        report.push(entry.original_path.clone(), result);
    }
    report
}

fn restore_one(entry: &Entry, destination: &Path) -> Result<Outcome> {
    if !exists_no_follow(&entry.trash_path) {
        return Err(CoreError::NotFound(entry.trash_path.clone()));
    }
    if exists_no_follow(destination) {
        return Err(CoreError::Conflict(destination.to_path_buf()));
    }
    if let Some(parent) = destination.parent() {
        create_dir_all(parent)?;
    }

    move_path(&entry.trash_path, destination)?;
    debug!(from = %entry.trash_path.display(), to = %destination.display(), "restored");

    Ok(match remove_file(&entry.info_path) {
        Ok(()) => Outcome::Done,
        Err(err) => Outcome::MetadataLeft(err),
    })
}

/// Deletes entries permanently, data first, then the sidecar.
pub fn remove(entries: &[Entry]) -> BatchReport {
    let mut report = BatchReport::default();
    for entry in entries {
        report.push(entry.original_path.clone(), remove_one(entry));
    }
    report
}

fn remove_one(entry: &Entry) -> Result<Outcome> {
    remove_path(&entry.trash_path)?;
    Ok(match remove_file(&entry.info_path) {
        Ok(()) => Outcome::Done,
        Err(err) => Outcome::MetadataLeft(err),
    })
}

/// Deletes the sidecars of orphans that have no usable data behind them.
/// Stored data without a sidecar is reported and left alone.
pub fn fix_orphans(orphans: &[OrphanMeta]) -> BatchReport {
    let mut report = BatchReport::default();
    for orphan in orphans {
        let result = match (&orphan.kind, &orphan.info_path) {
            (OrphanKind::MissingMetadata, _) => Err(CoreError::precondition(format!(
                "keeping {}: stored data without trashinfo",
                orphan.path().display()
            ))),
            (_, Some(info_path)) => remove_file(info_path).map(|()| Outcome::Done),
            (_, None) => Err(CoreError::precondition(format!(
                "orphan without trashinfo: {}",
                orphan.path().display()
            ))),
        };
        report.push(orphan.path().to_path_buf(), result);
    }
    report
}
