use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Engine-level errors.
///
/// Every variant that comes from the filesystem carries the path involved and
/// the underlying cause, so callers can show it to a user as is.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Cannot read {}: {source}", path.display())]
    ListFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Copy failed for {}: {source}", path.display())]
    CopyFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Move failed for {}: {source}", path.display())]
    MoveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Delete failed for {}: {source}", path.display())]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not save {}: {source}", path.display())]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Another file operation is still running")]
    Busy,

    #[error("Clipboard is empty")]
    NothingStaged,

    #[error("No entry selected")]
    NoSelection,

    #[error("Delete was not confirmed")]
    NotConfirmed,

    #[error("Is a directory: {}", .0.display())]
    IsDirectory(PathBuf),
}

impl AppError {
    pub fn copy_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::CopyFailed { path: path.into(), source }
    }

    pub fn move_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::MoveFailed { path: path.into(), source }
    }

    pub fn delete_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::DeleteFailed { path: path.into(), source }
    }

    pub fn persist_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::PersistFailed { path: path.into(), source }
    }
}

pub type AppResult<T> = Result<T, AppError>;
