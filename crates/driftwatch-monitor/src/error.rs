//! Error types for the drift evaluator.

use std::path::PathBuf;

use thiserror::Error;

use driftwatch_store::StoreError;

pub type MonitorResult<T> = Result<T, MonitorError>;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(
        "reference data not found at {}. Run the training job first to capture a reference snapshot.",
        .path.display()
    )]
    MissingReference { path: PathBuf },

    #[error("reference data at {} has no rows. Re-run the training job.", .path.display())]
    EmptyReference { path: PathBuf },

    #[error(
        "{reason} at {}. Hit the prediction endpoint (or `driftwatch record`) a few times to generate logs.",
        .path.display()
    )]
    MissingLog { path: PathBuf, reason: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to serialize drift report: {0}")]
    Report(#[from] serde_json::Error),
}

impl MonitorError {
    /// Missing inputs, as opposed to unreadable or corrupt state.
    pub fn is_missing_precondition(&self) -> bool {
        matches!(
            self,
            MonitorError::MissingReference { .. }
                | MonitorError::EmptyReference { .. }
                | MonitorError::MissingLog { .. }
        )
    }
}
