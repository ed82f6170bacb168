use std::{io, path::PathBuf};

/// Error type shared by the locator, loader, catalog and mutators.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// File system I/O failure.
    #[error("I/O error while accessing {0}")]
    Io(PathBuf, #[source] io::Error),

    /// The mount table could not be read, so no volume can be discovered.
    #[error("unable to read mount table {0}")]
    MountTable(PathBuf, #[source] io::Error),

    /// A query could not be compiled in the selected mode.
    #[error("invalid {mode} pattern {pattern:?}: {reason}")]
    InvalidPattern {
        mode: &'static str,
        pattern: String,
        reason: String,
    },

    /// A size threshold such as `10MB` could not be parsed.
    #[error("invalid size: {0:?}")]
    InvalidSize(String),

    /// An operation was rejected due to configuration/argument issues.
    #[error("invalid command input: {0}")]
    InvalidInput(String),

    /// The stored file of an entry no longer exists.
    #[error("not found in trash: {0}")]
    NotFound(PathBuf),

    /// The operation could not be completed because a pre-condition failed.
    #[error("pre-condition failed: {0}")]
    PreconditionFailed(String),

    /// A restore destination is already occupied.
    #[error("refusing to overwrite existing path: {0}")]
    Conflict(PathBuf),

    /// Some entries of a restore/remove batch failed.
    #[error("{failed} of {total} entries failed")]
    Batch { failed: usize, total: usize },
}

impl CoreError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::Io(path.into(), error)
    }

    /// True when the error is an I/O error of kind `NotFound`, or `NotFound` itself.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(_, err) => err.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Shared result alias for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
