//! Drift status: the single current verdict shared by the evaluator and
//! the retrain controller.

use std::path::{Path, PathBuf};

use tracing::debug;

use driftwatch_core::fsutil::write_atomic;
use driftwatch_core::{DriftStatus, LoopConfig};

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct DriftStatusStore {
    path: PathBuf,
}

impl DriftStatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &LoopConfig) -> Self {
        Self::new(&config.paths.drift_status)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current verdict. `None` when no evaluation has run yet.
    pub fn read(&self) -> StoreResult<Option<DriftStatus>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        let status: DriftStatus =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::json(&self.path, e))?;
        Ok(Some(status))
    }

    /// Overwrite the verdict. Readers see the old or the new object, never
    /// a mix.
    pub fn write(&self, status: &DriftStatus) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(status)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        write_atomic(&self.path, &json).map_err(|e| StoreError::io(&self.path, e))?;
        debug!(path = %self.path.display(), data_drift = status.data_drift, "drift status written");
        Ok(())
    }
}
