use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::helpers::print_size;

/// How a trash directory was found.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum LocationKind {
    /// `$XDG_DATA_HOME/Trash`.
    Home,
    /// `$topdir/.Trash/$uid`, below a shared sticky directory.
    TopSticky,
    /// `$topdir/.Trash-$uid`, owned by the user.
    TopUser,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::TopSticky => "top-sticky",
            Self::TopUser => "top-user",
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One trash directory with its `files` and `info` halves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashLocation {
    pub path: PathBuf,
    pub files_dir: PathBuf,
    pub info_dir: PathBuf,
    /// Volume that relative sidecar paths are resolved against.
    pub topdir: PathBuf,
    /// `st_dev` of the trash directory, 0 when it does not exist yet.
    pub device: u64,
    pub kind: LocationKind,
    /// Whether both halves are writable by this process.
    pub usable: bool,
}

impl TrashLocation {
    pub fn new(path: PathBuf, topdir: PathBuf, kind: LocationKind) -> Self {
        Self {
            files_dir: path.join("files"),
            info_dir: path.join("info"),
            path,
            topdir,
            device: 0,
            kind,
            usable: false,
        }
    }

    pub fn with_device(mut self, device: u64) -> Self {
        self.device = device;
        self
    }

    pub fn with_usable(mut self, usable: bool) -> Self {
        self.usable = usable;
        self
    }
}

/// Lazily computed size of a trashed entry.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum Size {
    /// Not requested yet.
    #[default]
    Pending,
    Known(u64),
    /// Requested but could not be computed.
    Unknown,
}

impl Size {
    pub fn bytes(&self) -> Option<u64> {
        match self {
            Self::Known(bytes) => Some(*bytes),
            Self::Pending | Self::Unknown => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Human readable size, `-` when it is not known.
    pub fn human(&self) -> String {
        match self {
            Self::Known(bytes) => print_size(*bytes),
            Self::Pending | Self::Unknown => "-".to_string(),
        }
    }
}

/// One trashed item in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub original_path: PathBuf,
    pub deleted_at: DateTime<Local>,
    /// Stored data below `files/`.
    pub trash_path: PathBuf,
    /// Sidecar below `info/`.
    pub info_path: PathBuf,
    /// Root of the owning trash directory.
    pub trash_dir: PathBuf,
    pub size: Size,
}

impl Entry {
    pub fn new(
        original_path: PathBuf,
        deleted_at: DateTime<Local>,
        trash_path: PathBuf,
        info_path: PathBuf,
        trash_dir: PathBuf,
    ) -> Self {
        Self {
            original_path,
            deleted_at,
            trash_path,
            info_path,
            trash_dir,
            size: Size::Pending,
        }
    }

    /// File name of the original location, empty for `/`.
    pub fn name(&self) -> &std::ffi::OsStr {
        self.original_path.file_name().unwrap_or_default()
    }

    /// Directory the entry was deleted from.
    pub fn original_dir(&self) -> Option<&Path> {
        self.original_path.parent()
    }
}

/// Which half of a sidecar/data pair is broken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrphanKind {
    /// Sidecar without stored data.
    MissingFile,
    /// Stored data without a sidecar.
    MissingMetadata,
    /// Sidecar that could not be read or decoded.
    Corrupt(String),
}

impl fmt::Display for OrphanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFile => write!(f, "missing file"),
            Self::MissingMetadata => write!(f, "missing metadata"),
            Self::Corrupt(reason) => write!(f, "corrupt metadata: {reason}"),
        }
    }
}

/// An inconsistency found while loading a trash directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanMeta {
    pub kind: OrphanKind,
    pub info_path: Option<PathBuf>,
    pub trash_path: Option<PathBuf>,
    pub trash_dir: PathBuf,
}

impl OrphanMeta {
    /// Path that best identifies the orphan on disk.
    pub fn path(&self) -> &Path {
        self.info_path
            .as_deref()
            .or(self.trash_path.as_deref())
            .unwrap_or(&self.trash_dir)
    }
}

/// Why a candidate trash directory was not used.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SkipReason {
    /// `$topdir/.Trash` exists but lacks the sticky bit.
    NotSticky,
    /// The candidate or its shared parent is a symlink.
    Symlink,
    /// The directory is owned by another user.
    NotOwned,
    /// The directory cannot be read by this process.
    Unreadable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NotSticky => "parent not sticky",
            Self::Symlink => "is symlink",
            Self::NotOwned => "not owned by user",
            Self::Unreadable => "not readable",
        };
        write!(f, "{reason}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLocation {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Result of trash discovery: usable locations plus diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub locations: Vec<TrashLocation>,
    pub skipped: Vec<SkippedLocation>,
}
