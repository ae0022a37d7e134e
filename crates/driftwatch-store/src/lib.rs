//! driftwatch-store: the durable state shared by the loop's processes.
//!
//! Serving, monitoring, and retraining never call each other. They meet
//! only through the files managed here:
//!
//! - `PredictionLogger` / `PredictionLog`: append-only CSV of served
//!   predictions, written under an exclusive file lock.
//! - `ReferenceSnapshot`: the labeled CSV captured at training time.
//! - `DriftStatusStore`: the single current `{"data_drift": bool}` verdict,
//!   replaced atomically.
//! - `ModelArtifact`: the opaque serving model, fingerprinted with SHA-256.

pub mod artifact;
pub mod error;
pub mod prediction_log;
pub mod reference;
pub mod status;

pub use artifact::ModelArtifact;
pub use error::{StoreError, StoreResult};
pub use prediction_log::{PredictionLog, PredictionLogger};
pub use reference::ReferenceSnapshot;
pub use status::DriftStatusStore;
