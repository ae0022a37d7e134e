//! Projection of raw datasets into the comparison schema.
//!
//! The drift suite compares two tables with identical columns: the four
//! features under their reference names, a `target` column and a
//! `prediction` column. Neither source has both label columns. The
//! reference only knows the ground truth and the log only knows what the
//! model answered, so each side fills the missing column from the one it
//! has. `LabelSource` records where each label column really came from.

use serde::{Deserialize, Serialize};

use driftwatch_core::schema::{FEATURE_COLUMNS, PREDICTION_COLUMN, TARGET_COLUMN};
use driftwatch_core::{PredictionRecord, ReferenceRow};

/// Provenance of a label column in a `ComparisonTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    /// True labels captured at training time.
    GroundTruth,
    /// Classes returned by the serving model.
    ModelOutput,
}

/// Which columns the suite treats as what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub numerical_features: Vec<String>,
    pub categorical_features: Vec<String>,
    pub target: String,
    pub prediction: String,
}

impl ColumnMapping {
    /// The mapping shared by both comparison tables.
    pub fn shared() -> Self {
        Self {
            numerical_features: FEATURE_COLUMNS
                .iter()
                .map(|c| c.reference_name.to_string())
                .collect(),
            categorical_features: Vec::new(),
            target: TARGET_COLUMN.to_string(),
            prediction: PREDICTION_COLUMN.to_string(),
        }
    }
}

/// A named numerical column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub name: &'static str,
    pub values: Vec<f64>,
}

/// One side of the comparison, column-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    pub features: Vec<NumericColumn>,
    pub target: Vec<u32>,
    pub prediction: Vec<u32>,
    pub target_source: LabelSource,
    pub prediction_source: LabelSource,
}

impl ComparisonTable {
    /// Reference side: ground truth doubles as the prediction column.
    pub fn from_reference(rows: &[ReferenceRow]) -> Self {
        let features = project(rows.iter().map(|r| r.features.values()));
        let target: Vec<u32> = rows.iter().map(|r| r.target).collect();
        Self {
            features,
            prediction: target.clone(),
            target,
            target_source: LabelSource::GroundTruth,
            prediction_source: LabelSource::GroundTruth,
        }
    }

    /// Live side: model output doubles as the target column.
    ///
    /// Log columns are renamed to their reference names through
    /// `FEATURE_COLUMNS`.
    pub fn from_log(records: &[PredictionRecord]) -> Self {
        let features = project(records.iter().map(|r| r.features.values()));
        let prediction: Vec<u32> = records.iter().map(|r| r.prediction).collect();
        Self {
            features,
            target: prediction.clone(),
            prediction,
            target_source: LabelSource::ModelOutput,
            prediction_source: LabelSource::ModelOutput,
        }
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.features
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Column names in the same order on both sides.
    pub fn column_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.features.iter().map(|c| c.name).collect();
        names.push(TARGET_COLUMN);
        names.push(PREDICTION_COLUMN);
        names
    }
}

fn project(rows: impl Iterator<Item = [f64; 4]>) -> Vec<NumericColumn> {
    let mut columns: Vec<NumericColumn> = FEATURE_COLUMNS
        .iter()
        .map(|c| NumericColumn {
            name: c.reference_name,
            values: Vec::new(),
        })
        .collect();
    for values in rows {
        for (column, value) in columns.iter_mut().zip(values) {
            column.values.push(value);
        }
    }
    columns
}
