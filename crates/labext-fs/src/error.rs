//! Error types for labext-fs

use std::path::PathBuf;

/// Result type for labext-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in labext-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON at {path}: {message}")]
    JsonParse { path: PathBuf, message: String },

    #[error("Failed to serialize JSON for {path}: {message}")]
    JsonSerialize { path: PathBuf, message: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    #[error("Archive entry escapes destination: {entry}")]
    UnsafeArchiveEntry { entry: PathBuf },

    #[error("Unsupported archive: {path}")]
    UnsupportedArchive { path: PathBuf },

    #[error("Failed to read archive {path}: {message}")]
    Archive { path: PathBuf, message: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
