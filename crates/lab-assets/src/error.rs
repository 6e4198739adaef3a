//! Asset error types.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from asset directory and archive operations.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Path not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Path already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    /// Any other I/O failure on `path`.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The archive is unreadable or contains unsafe entries.
    #[error("Archive error: {0}")]
    Archive(String),
}

impl AssetError {
    /// Classify an `io::Error` that happened on `path`.
    #[must_use]
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether repeating the operation unchanged could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// The path involved, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path }
            | Self::PermissionDenied { path }
            | Self::AlreadyExists { path }
            | Self::Io { path, .. } => Some(path),
            Self::Archive(_) => None,
        }
    }
}
