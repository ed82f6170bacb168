//! Filesystem primitives used by discovery, loading and the mutators.
//!
//! Every failure is mapped into [`CoreError`] with the offending path so the
//! callers can attach it to the right entry.

use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::{CoreError, Result};

/// Access mode bits accepted by [`can_access`].
pub const READ: i32 = libc::R_OK | libc::X_OK;
pub const WRITE: i32 = libc::W_OK | libc::X_OK;

/// True when the path exists, without following a trailing symlink.
pub fn exists_no_follow(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .ok()
        .is_some_and(|metadata| metadata.file_type().is_symlink())
}

/// A real (non symlink) directory.
pub fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .ok()
        .is_some_and(|metadata| metadata.file_type().is_dir())
}

pub fn is_sticky_dir(path: &Path) -> bool {
    fs::metadata(path)
        .ok()
        .map(|metadata| metadata.is_dir() && metadata.permissions().mode() & 0o1000 == 0o1000)
        .unwrap_or(false)
}

pub fn is_owned_by(path: &Path, uid: u32) -> bool {
    fs::symlink_metadata(path)
        .ok()
        .is_some_and(|metadata| metadata.uid() == uid)
}

/// `(device, inode)` of a directory, following symlinks. Identical for
/// every bind mount or symlink that reaches the same directory.
pub fn dir_identity(path: &Path) -> Option<(u64, u64)> {
    fs::metadata(path).ok().map(|metadata| (metadata.dev(), metadata.ino()))
}

/// Device id hosting `path`, following symlinks.
pub fn device_of(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().map(|metadata| metadata.dev())
}

/// Checks `access(2)` for the real uid with the given mode bits.
pub fn can_access(path: &Path, mode: i32) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid NUL terminated string for the duration of the call.
    unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
}

/// Lists directory children sorted by path. A missing directory is empty.
pub fn list_dir(path: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(CoreError::io(path, err)),
    };
    let mut children = entries
        .map(|entry| entry.map(|v| v.path()))
        .collect::<std::result::Result<Vec<PathBuf>, io::Error>>()
        .map_err(|err| CoreError::io(path, err))?;
    children.sort();
    Ok(children)
}

/// Apparent size of a file, or the sum over a directory tree.
/// Symlinks are counted by their own size and never followed.
pub fn disk_usage(path: &Path) -> Result<u64> {
    let metadata = fs::symlink_metadata(path).map_err(|err| CoreError::io(path, err))?;
    if !metadata.is_dir() {
        return Ok(metadata.len());
    }

    let mut total = 0u64;
    for entry in WalkDir::new(path).follow_links(false) {
        let entry = entry.map_err(|err| CoreError::io(path, err.into()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let metadata = entry
            .metadata()
            .map_err(|err| CoreError::io(entry.path(), err.into()))?;
        total = total.saturating_add(metadata.len());
    }
    Ok(total)
}

/// Deletes a file, symlink or whole directory tree.
pub fn remove_path(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(CoreError::NotFound(path.to_path_buf()))
        }
        Err(err) => return Err(CoreError::io(path, err)),
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(|err| CoreError::io(path, err))
    } else {
        fs::remove_file(path).map_err(|err| CoreError::io(path, err))
    }
}

pub fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|err| CoreError::io(path, err))
}

pub fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|err| CoreError::io(path, err))
}

/// Moves `from` to `to`, copying and deleting when they live on different devices.
pub fn move_path(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.raw_os_error() == Some(libc::EXDEV) => {
            tracing::debug!(from = %from.display(), to = %to.display(), "cross-device move, copying");
            move_by_copy(from, to)
        }
        Err(err) => Err(CoreError::io(from, err)),
    }
}

/// Copies `from` into a hidden sibling of `to`, renames the copy into place
/// and only then deletes the source. On failure only the staged copy is
/// removed; `to` and `from` are left as they were.
fn move_by_copy(from: &Path, to: &Path) -> Result<()> {
    let staging = staging_path(to)?;
    if exists_no_follow(&staging) {
        return Err(CoreError::Conflict(staging));
    }

    if let Err(err) = copy_tree(from, &staging) {
        let _ = remove_path(&staging);
        return Err(err);
    }
    if exists_no_follow(to) {
        let _ = remove_path(&staging);
        return Err(CoreError::Conflict(to.to_path_buf()));
    }
    if let Err(err) = fs::rename(&staging, to) {
        let _ = remove_path(&staging);
        return Err(CoreError::io(to, err));
    }
    remove_path(from)
}

fn staging_path(to: &Path) -> Result<PathBuf> {
    let Some(name) = to.file_name() else {
        return Err(CoreError::invalid_input(format!("no file name in {}", to.display())));
    };
    let mut staged = std::ffi::OsString::from(".");
    staged.push(name);
    staged.push(format!(".partial-{}", std::process::id()));
    Ok(to.with_file_name(staged))
}

/// Recursive copy that never overwrites: `to` and everything below it must
/// not exist yet. Symlinks are copied as links. Permissions are carried over.
fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.map_err(|err| CoreError::io(from, err.into()))?;
        let relative = entry.path().strip_prefix(from).unwrap_or(Path::new(""));
        let target = if relative.as_os_str().is_empty() {
            to.to_path_buf()
        } else {
            to.join(relative)
        };
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir(&target).map_err(|err| CoreError::io(&target, err))?;
            let metadata = entry.metadata().map_err(|err| CoreError::io(entry.path(), err.into()))?;
            dirs.push((target, metadata.permissions()));
        } else if file_type.is_symlink() {
            let link = fs::read_link(entry.path()).map_err(|err| CoreError::io(entry.path(), err))?;
            std::os::unix::fs::symlink(&link, &target).map_err(|err| CoreError::io(&target, err))?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }

    // deepest first, so read-only directories are locked after their children exist
    for (dir, permissions) in dirs.into_iter().rev() {
        fs::set_permissions(&dir, permissions).map_err(|err| CoreError::io(&dir, err))?;
    }
    Ok(())
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    let mut source = fs::File::open(from).map_err(|err| CoreError::io(from, err))?;
    let mut target = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(to)
        .map_err(|err| CoreError::io(to, err))?;
    io::copy(&mut source, &mut target).map_err(|err| CoreError::io(to, err))?;

    let permissions = source
        .metadata()
        .map_err(|err| CoreError::io(from, err))?
        .permissions();
    target.set_permissions(permissions).map_err(|err| CoreError::io(to, err))
}
