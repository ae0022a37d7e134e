//! Error types for the driftwatch state files.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for state file operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing shared state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{} not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        StoreError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn not_found(path: &Path) -> Self {
        StoreError::NotFound {
            path: path.to_path_buf(),
        }
    }

    /// A data row (0-based, after the header) holding a NaN or infinite
    /// feature.
    pub(crate) fn non_finite(path: &Path, row_index: usize) -> Self {
        StoreError::InvalidRecord(format!(
            "non-finite feature value in {} at line {}",
            path.display(),
            row_index + 2
        ))
    }

    /// True for a missing file, as opposed to an unreadable or malformed one.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
