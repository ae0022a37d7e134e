//! Model artifact: the opaque serialized classifier read by serving.
//!
//! The loop never interprets the bytes. It fingerprints them so operators
//! can tell whether a retrain actually replaced the model.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::info;

use driftwatch_core::LoopConfig;
use driftwatch_core::fsutil::write_atomic;

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct ModelArtifact {
    path: PathBuf,
}

impl ModelArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &LoopConfig) -> Self {
        Self::new(&config.paths.model_artifact)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn read(&self) -> StoreResult<Vec<u8>> {
        std::fs::read(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::not_found(&self.path),
            _ => StoreError::io(&self.path, e),
        })
    }

    /// SHA-256 hex digest of the current artifact, `None` if absent.
    pub fn fingerprint(&self) -> StoreResult<Option<String>> {
        match self.read() {
            Ok(bytes) => Ok(Some(hex::encode(Sha256::digest(&bytes)))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Atomically install a new artifact.
    ///
    /// Only training services call this; a failed training run never does.
    pub fn replace(&self, bytes: &[u8]) -> StoreResult<()> {
        write_atomic(&self.path, bytes).map_err(|e| StoreError::io(&self.path, e))?;
        info!(path = %self.path.display(), size_bytes = bytes.len(), "model artifact replaced");
        Ok(())
    }
}
