//! Discovery of the trash directories visible to the current user.
//!
//! The home trash is always reported. Every volume (from `TRASH_VOLUMES` or
//! the mount table) may add `$topdir/.Trash/$uid`, which must sit below a
//! sticky, non-symlink `.Trash`, and `$topdir/.Trash-$uid`, which must be a
//! real directory owned by the user.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::LocatorConfig;
use crate::errors::{CoreError, Result};
use crate::fs::{
    can_access, device_of, dir_identity, exists_no_follow, is_owned_by, is_real_dir, is_sticky_dir, is_symlink,
    READ, WRITE,
};
use crate::helpers::unescape_mountpoint;
use crate::models::{Discovery, LocationKind, SkipReason, SkippedLocation, TrashLocation};

/// Finds every usable trash directory.
///
/// Fails only when the mount table has to be read and cannot be.
pub fn discover(config: &LocatorConfig) -> Result<Discovery> {
    let mut scan = Scan::default();

    if let Some(home) = &config.home_trash {
        let location = TrashLocation::new(home.clone(), PathBuf::from("/"), LocationKind::Home);
        scan.found(finish(location));
    }

    if !config.only_home_trash {
        let volumes = match &config.volumes {
            Some(volumes) => volumes.clone(),
            None => read_mount_points(&config.mount_table)?,
        };
        for volume in &volumes {
            scan_top_trash_dirs(volume, config.uid, &mut scan);
        }
    }

    debug!(
        found = scan.discovery.locations.len(),
        skipped = scan.discovery.skipped.len(),
        "trash discovery finished"
    );
    Ok(scan.discovery)
}

/// Mount points listed in a `/proc/mounts` style table, in table order,
/// without duplicates.
pub fn read_mount_points(table: &Path) -> Result<Vec<PathBuf>> {
    let content =
        fs::read_to_string(table).map_err(|err| CoreError::MountTable(table.to_path_buf(), err))?;

    let mut seen = HashSet::new();
    Ok(content
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(|field| PathBuf::from(unescape_mountpoint(field)))
        .filter(|point| seen.insert(point.clone()))
        .collect())
}

/// Identity of a discovered trash directory. Bind mounts and symlinks
/// reach one directory through several paths but share its inode.
#[derive(Debug, PartialEq, Eq, Hash)]
enum DirKey {
    Inode(u64, u64),
    Path(PathBuf),
}

impl DirKey {
    fn of(path: &Path) -> Self {
        match dir_identity(path) {
            Some((dev, ino)) => Self::Inode(dev, ino),
            None => Self::Path(fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())),
        }
    }
}

#[derive(Default)]
struct Scan {
    discovery: Discovery,
    seen: HashSet<DirKey>,
}

impl Scan {
    fn found(&mut self, location: TrashLocation) {
        if !self.seen.insert(DirKey::of(&location.path)) {
            debug!(path = %location.path.display(), "trash dir already discovered");
            return;
        }
        debug!(path = %location.path.display(), kind = %location.kind, usable = location.usable, "found trash dir");
        self.discovery.locations.push(location);
    }

    fn skip(&mut self, path: PathBuf, reason: SkipReason) {
        warn!(path = %path.display(), %reason, "trash dir skipped");
        self.discovery.skipped.push(SkippedLocation { path, reason });
    }
}

fn scan_top_trash_dirs(volume: &Path, uid: u32, scan: &mut Scan) {
    let shared = volume.join(".Trash");
    if exists_no_follow(&shared) {
        let top = shared.join(uid.to_string());
        match validate_shared_trash_dir(&shared, &top) {
            Ok(true) => scan.found(finish(TrashLocation::new(
                top,
                volume.to_path_buf(),
                LocationKind::TopSticky,
            ))),
            Ok(false) => {}
            Err(reason) => scan.skip(top, reason),
        }
    }

    let alt = volume.join(format!(".Trash-{uid}"));
    match validate_user_trash_dir(&alt, uid) {
        Ok(true) => scan.found(finish(TrashLocation::new(
            alt,
            volume.to_path_buf(),
            LocationKind::TopUser,
        ))),
        Ok(false) => {}
        Err(reason) => scan.skip(alt, reason),
    }
}

/// `Ok(false)` means there is nothing to report.
fn validate_shared_trash_dir(shared: &Path, top: &Path) -> std::result::Result<bool, SkipReason> {
    if is_symlink(shared) {
        return Err(SkipReason::Symlink);
    }
    if !is_sticky_dir(shared) {
        return Err(SkipReason::NotSticky);
    }
    if !exists_no_follow(top) {
        return Ok(false);
    }
    if is_symlink(top) {
        return Err(SkipReason::Symlink);
    }
    if !is_real_dir(top) {
        return Ok(false);
    }
    if !can_access(top, READ) {
        return Err(SkipReason::Unreadable);
    }
    Ok(true)
}

fn validate_user_trash_dir(path: &Path, uid: u32) -> std::result::Result<bool, SkipReason> {
    if !exists_no_follow(path) {
        return Ok(false);
    }
    if is_symlink(path) {
        return Err(SkipReason::Symlink);
    }
    if !is_real_dir(path) {
        return Ok(false);
    }
    if !is_owned_by(path, uid) {
        return Err(SkipReason::NotOwned);
    }
    if !can_access(path, READ) {
        return Err(SkipReason::Unreadable);
    }
    Ok(true)
}

fn finish(location: TrashLocation) -> TrashLocation {
    let device = device_of(&location.path).unwrap_or(0);
    let usable = can_access(&location.files_dir, WRITE) && can_access(&location.info_dir, WRITE);
    location.with_device(device).with_usable(usable)
}
