//! Error types for the newsvault library
//!
//! This module defines all error types that can occur while maintaining the
//! archive. The taxonomy mirrors the failure policy of the pipeline: parse
//! failures of a manifest or merge source abort the run, while asset-level
//! I/O failures are logged at the operation boundary and the run continues.

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Results in the newsvault library
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Main error type for all archive operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// I/O errors during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A persisted document could not be parsed
    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        /// Path of the document that failed to parse
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// A required source document is absent
    #[error("Missing source document: {0:?}")]
    MissingSource(PathBuf),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Walk directory error from walkdir crate
    #[error("Walk directory error")]
    WalkDir(#[from] walkdir::Error),
}

impl ArchiveError {
    /// Create a parse error for a document at `path`
    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        ArchiveError::Parse {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid-configuration error with a custom message
    pub fn config(msg: impl Into<String>) -> Self {
        ArchiveError::InvalidConfiguration(msg.into())
    }

    /// Check whether this error must abort the run
    ///
    /// Corrupt or absent required state (manifest or merge source) cannot be
    /// worked around and stops the pipeline. Plain I/O errors are asset-level
    /// and are handled at the operation boundary: logged with path context,
    /// then the run continues with the remaining assets.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ArchiveError::Parse { .. }
                | ArchiveError::Json(_)
                | ArchiveError::InvalidConfiguration(_)
                | ArchiveError::MissingSource(_)
        )
    }
}
