//! Shared types used across driftwatch crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point in the shared four-dimensional feature space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

impl FeatureVector {
    pub fn new(sepal_length: f64, sepal_width: f64, petal_length: f64, petal_width: f64) -> Self {
        Self {
            sepal_length,
            sepal_width,
            petal_length,
            petal_width,
        }
    }

    /// Values in `FEATURE_COLUMNS` order.
    pub fn values(&self) -> [f64; 4] {
        [
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.values().iter().all(|v| v.is_finite())
    }
}

/// One served prediction. Immutable once appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub timestamp: DateTime<Utc>,
    pub features: FeatureVector,
    /// Class index returned by the model.
    pub prediction: u32,
}

impl PredictionRecord {
    /// Stamp a prediction with the current UTC time.
    pub fn now(features: FeatureVector, prediction: u32) -> Self {
        Self {
            timestamp: Utc::now(),
            features,
            prediction,
        }
    }
}

/// One labeled row of the reference snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRow {
    pub features: FeatureVector,
    /// Ground-truth class index.
    pub target: u32,
}

/// Verdict of the most recent drift evaluation.
///
/// On disk this is exactly `{"data_drift": bool}`. A missing key reads as
/// no drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftStatus {
    #[serde(default)]
    pub data_drift: bool,
}

impl DriftStatus {
    pub fn new(data_drift: bool) -> Self {
        Self { data_drift }
    }
}
