//! Reference snapshot: the labeled baseline captured at training time.
//!
//! The training service replaces this file wholesale on every successful
//! run. Everything else treats it as read-only.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use driftwatch_core::fsutil::write_atomic;
use driftwatch_core::{FeatureVector, LoopConfig, ReferenceRow};

use crate::error::{StoreError, StoreResult};

/// On-disk row layout. Column names are the reference side of
/// `FEATURE_COLUMNS`.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotRow {
    #[serde(rename = "sepal length (cm)")]
    sepal_length: f64,
    #[serde(rename = "sepal width (cm)")]
    sepal_width: f64,
    #[serde(rename = "petal length (cm)")]
    petal_length: f64,
    #[serde(rename = "petal width (cm)")]
    petal_width: f64,
    target: u32,
}

impl From<SnapshotRow> for ReferenceRow {
    fn from(row: SnapshotRow) -> Self {
        ReferenceRow {
            features: FeatureVector::new(
                row.sepal_length,
                row.sepal_width,
                row.petal_length,
                row.petal_width,
            ),
            target: row.target,
        }
    }
}

impl From<&ReferenceRow> for SnapshotRow {
    fn from(row: &ReferenceRow) -> Self {
        let f = &row.features;
        SnapshotRow {
            sepal_length: f.sepal_length,
            sepal_width: f.sepal_width,
            petal_length: f.petal_length,
            petal_width: f.petal_width,
            target: row.target,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceSnapshot {
    path: PathBuf,
}

impl ReferenceSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &LoopConfig) -> Self {
        Self::new(&config.paths.reference)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load every labeled row. Extra columns are ignored; NaN or infinite
    /// features are rejected.
    pub fn load(&self) -> StoreResult<Vec<ReferenceRow>> {
        if !self.exists() {
            return Err(StoreError::not_found(&self.path));
        }

        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| StoreError::csv(&self.path, e))?;
        let mut rows = Vec::new();
        for (index, row) in reader.deserialize::<SnapshotRow>().enumerate() {
            let row = ReferenceRow::from(row.map_err(|e| StoreError::csv(&self.path, e))?);
            if !row.features.is_finite() {
                return Err(StoreError::non_finite(&self.path, index));
            }
            rows.push(row);
        }
        debug!(path = %self.path.display(), rows = rows.len(), "reference snapshot loaded");
        Ok(rows)
    }

    /// Replace the snapshot atomically.
    ///
    /// Used by in-process training services; the subprocess trainer writes
    /// the file itself.
    pub fn replace(&self, rows: &[ReferenceRow]) -> StoreResult<()> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer
                .serialize(SnapshotRow::from(row))
                .map_err(|e| StoreError::Serialize(e.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| StoreError::Serialize(e.to_string()))?;

        write_atomic(&self.path, &bytes).map_err(|e| StoreError::io(&self.path, e))?;
        debug!(path = %self.path.display(), rows = rows.len(), "reference snapshot replaced");
        Ok(())
    }
}
