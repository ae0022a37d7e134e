//! Error types for the retrain controller.

use thiserror::Error;

use driftwatch_store::StoreError;

use crate::training::TrainingError;

pub type RetrainResult<T> = Result<T, RetrainError>;

/// Unrecoverable controller errors.
///
/// A training run that fails is not an error here; it is reported as
/// `RetrainOutcome::Failed`.
#[derive(Debug, Error)]
pub enum RetrainError {
    /// The drift status or model artifact could not be read.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot build training service: {0}")]
    Training(#[from] TrainingError),
}
