//! Error types for ffdb
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using FfdbError
pub type Result<T> = std::result::Result<T, FfdbError>;

/// Unified error type for ffdb operations
#[derive(Debug, Error)]
pub enum FfdbError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A file could not be opened, or a writer target already exists
    #[error("Could not open {}: {source}", .path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Index Errors
    // -------------------------------------------------------------------------
    /// A line of the text index could not be parsed (`line` is 1-based)
    #[error("Malformed index {}:{line}: {reason}", .path.display())]
    Format {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Invalid database read: position {position} (size {size})")]
    OutOfBounds { position: usize, size: usize },

    #[error("Key not found")]
    KeyNotFound,

    // -------------------------------------------------------------------------
    // Usage Errors
    // -------------------------------------------------------------------------
    /// Data access without `USE_DATA`, or malformed call arguments
    #[error("Mode error: {0}")]
    Mode(String),

    // -------------------------------------------------------------------------
    // Write Errors
    // -------------------------------------------------------------------------
    #[error("Write failed: {0}")]
    Write(String),

    #[error("Index cache error: {0}")]
    Cache(String),
}

impl FfdbError {
    pub(crate) fn open_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FfdbError::OpenFailed {
            path: path.into(),
            source,
        }
    }
}
