//! Codec for `.trashinfo` sidecar records.
//!
//! A record is a tiny desktop-entry style file:
//!
//! ```text
//! [Trash Info]
//! Path=/home/user/some%20file.txt
//! DeletionDate=2024-05-01T10:22:31
//! ```
//!
//! `Path` is percent-encoded segment by segment, so `/` survives encoding.
//! The date is local time without an offset. Nothing here touches the disk.

use std::ffi::OsString;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::helpers::{parse_trash_datetime, TRASHINFO_TIME_FORMAT};

const GROUP_HEADER: &str = "[Trash Info]";
const PATH_KEY: &str = "Path=";
const DATE_KEY: &str = "DeletionDate=";

/// Decoded content of one sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashInfo {
    /// Original location, absolute for the home trash and possibly relative
    /// to the volume topdir for top trash directories.
    pub path: PathBuf,
    pub deleted_at: DateTime<Local>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TrashInfoError {
    #[error("missing [Trash Info] group")]
    MissingHeader,

    #[error("missing Path key")]
    MissingPath,

    #[error("empty Path value")]
    EmptyPath,

    #[error("missing DeletionDate key")]
    MissingDeletionDate,

    #[error("unparsable DeletionDate {0:?}")]
    InvalidDate(String),
}

/// Parses a sidecar. The first `Path` and `DeletionDate` keys of the
/// `[Trash Info]` group win; keys of other groups are ignored.
pub fn decode(contents: &str) -> Result<TrashInfo, TrashInfoError> {
    let mut in_group = false;
    let mut seen_group = false;
    let mut path = None;
    let mut date = None;

    for line in contents.lines() {
        let line = line.trim_end_matches('\r');
        if line.starts_with('[') {
            in_group = line == GROUP_HEADER;
            seen_group |= in_group;
            continue;
        }
        if !in_group {
            continue;
        }
        if let Some(value) = line.strip_prefix(PATH_KEY) {
            path.get_or_insert(value);
        } else if let Some(value) = line.strip_prefix(DATE_KEY) {
            date.get_or_insert(value);
        }
    }

    if !seen_group {
        return Err(TrashInfoError::MissingHeader);
    }
    let raw_path = path.ok_or(TrashInfoError::MissingPath)?;
    if raw_path.is_empty() {
        return Err(TrashInfoError::EmptyPath);
    }
    let raw_date = date.ok_or(TrashInfoError::MissingDeletionDate)?;
    let deleted_at = parse_trash_datetime(raw_date)
        .ok_or_else(|| TrashInfoError::InvalidDate(raw_date.to_string()))?;

    Ok(TrashInfo {
        path: decode_path(raw_path),
        deleted_at,
    })
}

/// Renders a sidecar in the canonical layout, newline terminated.
pub fn encode(info: &TrashInfo) -> String {
    format!(
        "{GROUP_HEADER}\n{PATH_KEY}{}\n{DATE_KEY}{}\n",
        encode_path(&info.path),
        info.deleted_at.format(TRASHINFO_TIME_FORMAT)
    )
}

fn encode_path(path: &Path) -> String {
    path.as_os_str()
        .as_bytes()
        .split(|b| *b == b'/')
        .map(|segment| urlencoding::encode_binary(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn decode_path(raw: &str) -> PathBuf {
    let bytes = urlencoding::decode_binary(raw.as_bytes()).into_owned();
    PathBuf::from(OsString::from_vec(bytes))
}
