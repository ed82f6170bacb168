//! Builds throwaway trash layouts for the integration tests.

#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local, TimeZone};
use tempfile::TempDir;
use trash_box_core::config::current_uid;
use trash_box_core::trashinfo::{encode, TrashInfo};
use trash_box_core::{BoxOptions, LocatorConfig, TrashBox};

pub const KB: u64 = 1_000;
pub const MB: u64 = 1_000_000;
pub const GB: u64 = 1_000_000_000;

/// Fixed reference time so day filters do not depend on the wall clock.
pub fn now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).earliest().unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Local> {
    now() - Duration::days(days)
}

pub struct Fixture {
    pub dir: TempDir,
    pub home_trash: PathBuf,
    pub volume: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let home_trash = dir.path().join("home/.local/share/Trash");
        let volume = dir.path().join("volume");
        fs::create_dir_all(home_trash.join("files")).unwrap();
        fs::create_dir_all(home_trash.join("info")).unwrap();
        fs::create_dir_all(&volume).unwrap();
        Self { dir, home_trash, volume }
    }

    /// Path inside the fixture that stands in for a user's original file.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn volume_trash(&self) -> PathBuf {
        let trash = self.volume.join(format!(".Trash-{}", current_uid()));
        fs::create_dir_all(trash.join("files")).unwrap();
        fs::create_dir_all(trash.join("info")).unwrap();
        trash
    }

    pub fn locator(&self) -> LocatorConfig {
        LocatorConfig::from_environ(&Default::default())
            .with_home_trash(&self.home_trash)
            .with_volumes(vec![self.volume.clone()])
            .with_only_home_trash(false)
    }

    /// Stores a sparse file of `size` bytes in `trash` with its sidecar.
    pub fn trash_in(&self, trash: &Path, name: &str, original: &Path, deleted_at: DateTime<Local>, size: u64) {
        let file = File::create(trash.join("files").join(name)).unwrap();
        file.set_len(size).unwrap();
        self.write_info(trash, name, original, deleted_at);
    }

    pub fn trash(&self, name: &str, original: &Path, deleted_at: DateTime<Local>, size: u64) {
        self.trash_in(&self.home_trash, name, original, deleted_at, size);
    }

    pub fn write_info(&self, trash: &Path, name: &str, original: &Path, deleted_at: DateTime<Local>) {
        let info = TrashInfo {
            path: original.to_path_buf(),
            deleted_at,
        };
        fs::write(trash.join("info").join(format!("{name}.trashinfo")), encode(&info)).unwrap();
    }

    pub fn open(&self, options: BoxOptions) -> TrashBox {
        let mut trash = TrashBox::new(options.with_now(now()), self.locator()).unwrap();
        trash.open().unwrap();
        trash
    }
}

pub fn originals(trash: &TrashBox) -> Vec<PathBuf> {
    trash.files.iter().map(|f| f.original_path.clone()).collect()
}
