//! Small path, date and size utilities shared by the catalog and the command layer.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Timelike};

use crate::errors::{CoreError, Result};

/// File extension used by trash info files.
pub const TRASHINFO_EXTENSION: &str = ".trashinfo";

/// Deletion date format used by Trash info metadata.
pub const TRASHINFO_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Format used when listing deletion dates.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a deletion date. The canonical form carries no offset and is read
/// as local time; RFC 3339 values written by other tools are accepted too.
/// Sub-second precision is dropped.
pub fn parse_trash_datetime(value: &str) -> Option<DateTime<Local>> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TRASHINFO_TIME_FORMAT)
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.with_timezone(&Local)))
        .and_then(|dt| dt.with_nanosecond(0))
}

/// Human readable size rendering.
pub fn print_size(bytes: u64) -> String {
    const SUFFIXES: [&str; 5] = ["B", "K", "M", "G", "T"];
    let mut value = bytes as f64;
    let mut idx = 0usize;

    while value >= 1024.0 && idx < SUFFIXES.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }

    if idx == 0 {
        format!("{:.0} {}", value, SUFFIXES[idx])
    } else {
        format!("{:.1} {}", value, SUFFIXES[idx])
    }
}

/// Parses a size threshold like `512`, `5MB`, `1.5 GiB` or `10mb` into bytes.
///
/// Plain SI suffixes (`K`, `KB`, `M`, `MB`, ...) are powers of 1000, the
/// `i` forms (`KiB`, `MiB`, ...) powers of 1024.
pub fn parse_size(value: &str) -> Result<u64> {
    let invalid = || CoreError::InvalidSize(value.to_string());
    let trimmed = value.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    if number.is_empty() {
        return Err(invalid());
    }
    let number: f64 = number.parse().map_err(|_| invalid())?;

    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" => 1_000,
        "m" | "mb" => 1_000_000,
        "g" | "gb" => 1_000_000_000,
        "t" | "tb" => 1_000_000_000_000,
        "ki" | "kib" => 1 << 10,
        "mi" | "mib" => 1 << 20,
        "gi" | "gib" => 1 << 30,
        "ti" | "tib" => 1 << 40,
        _ => return Err(invalid()),
    };

    let bytes = number * multiplier as f64;
    if !bytes.is_finite() || bytes > u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(bytes as u64)
}

/// Makes `path` absolute against `cwd` and removes `.`/`..` segments
/// lexically, without touching the filesystem.
pub fn normalize_path(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolves a sidecar `Path` value against the volume it was trashed from.
pub fn compose_original_location(topdir: &Path, location: &Path) -> PathBuf {
    if location.is_absolute() {
        location.to_path_buf()
    } else {
        topdir.join(location)
    }
}

/// Decodes the octal escapes (`\040` and friends) used in `/proc/mounts`.
pub fn unescape_mountpoint(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && is_octal_escape(&bytes[i + 1..i + 4]) {
            let byte = bytes[i + 1..i + 4]
                .iter()
                .fold(0u8, |acc, d| (acc << 3) | (d - b'0'));
            decoded.push(byte);
            i += 4;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

fn is_octal_escape(digits: &[u8]) -> bool {
    digits.len() == 3 && digits[0] <= b'3' && digits.iter().all(|d| (b'0'..=b'7').contains(d))
}
