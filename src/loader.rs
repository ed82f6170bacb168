//! Pairs sidecars with stored data for one trash directory.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::os::unix::ffi::OsStrExt;

use tracing::{debug, warn};

use crate::errors::Result;
use crate::fs::{exists_no_follow, list_dir};
use crate::helpers::{compose_original_location, TRASHINFO_EXTENSION};
use crate::models::{Entry, OrphanKind, OrphanMeta, TrashLocation};
use crate::trashinfo;

/// Everything found in one location.
#[derive(Debug, Default, Clone)]
pub struct Loaded {
    pub entries: Vec<Entry>,
    pub orphans: Vec<OrphanMeta>,
}

/// Loads a location. Broken pairs become orphans; only a failure to list
/// `info/` or `files/` aborts the location.
pub fn load(location: &TrashLocation) -> Result<Loaded> {
    let infos = list_dir(&location.info_dir)?;
    let stored = list_dir(&location.files_dir)?;
    let mut loaded = Loaded::default();
    let mut paired: HashSet<OsString> = HashSet::new();

    for info_path in infos {
        let Some(name) = info_path.file_name().and_then(strip_trashinfo_extension) else {
            debug!(path = %info_path.display(), "ignoring non trashinfo file");
            continue;
        };
        paired.insert(name.to_os_string());
        let trash_path = location.files_dir.join(name);
        let has_data = exists_no_follow(&trash_path);

        let decoded = fs::read_to_string(&info_path)
            .map_err(|err| err.to_string())
            .and_then(|contents| trashinfo::decode(&contents).map_err(|err| err.to_string()));

        match decoded {
            Ok(info) if has_data => loaded.entries.push(Entry::new(
                compose_original_location(&location.topdir, &info.path),
                info.deleted_at,
                trash_path,
                info_path,
                location.path.clone(),
            )),
            Ok(_) => loaded.orphans.push(OrphanMeta {
                kind: OrphanKind::MissingFile,
                info_path: Some(info_path),
                trash_path: None,
                trash_dir: location.path.clone(),
            }),
            Err(reason) => {
                warn!(path = %info_path.display(), %reason, "unreadable trashinfo");
                loaded.orphans.push(OrphanMeta {
                    kind: OrphanKind::Corrupt(reason),
                    info_path: Some(info_path),
                    trash_path: has_data.then_some(trash_path),
                    trash_dir: location.path.clone(),
                });
            }
        }
    }

    for trash_path in stored {
        let is_paired = trash_path
            .file_name()
            .is_some_and(|name| paired.contains(name));
        if !is_paired {
            loaded.orphans.push(OrphanMeta {
                kind: OrphanKind::MissingMetadata,
                info_path: None,
                trash_path: Some(trash_path),
                trash_dir: location.path.clone(),
            });
        }
    }

    debug!(
        path = %location.path.display(),
        entries = loaded.entries.len(),
        orphans = loaded.orphans.len(),
        "loaded trash dir"
    );
    Ok(loaded)
}

fn strip_trashinfo_extension(file_name: &OsStr) -> Option<&OsStr> {
    file_name
        .as_bytes()
        .strip_suffix(TRASHINFO_EXTENSION.as_bytes())
        .filter(|stem| !stem.is_empty())
        .map(OsStr::from_bytes)
}
