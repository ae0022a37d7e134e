//! driftwatch-retrain: drift-triggered retraining.
//!
//! The controller polls the drift status written by the evaluator and runs
//! the training service only when the latest verdict reports drift.
//!
//! # Architecture
//!
//! ```text
//! RetrainController::maybe_retrain()
//!   ├── DriftStatusStore::read()
//!   │   ├── absent          → Skipped(NoStatus)
//!   │   ├── data_drift=false → Skipped(NoDrift)
//!   │   └── data_drift=true
//!   └── TrainingService::run()
//!       ├── exit 0          → Retrained { artifact_sha256 }
//!       └── otherwise       → Failed(reason), artifact untouched
//! ```

pub mod controller;
pub mod error;
pub mod training;

pub use controller::{RetrainController, RetrainOutcome, SkipReason};
pub use error::{RetrainError, RetrainResult};
pub use training::{CommandTrainingService, TrainingError, TrainingRun, TrainingService};
