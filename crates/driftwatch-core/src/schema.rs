//! The shared four-dimensional feature space.
//!
//! Serving logs features under short snake_case names while the training
//! snapshot keeps the dataset's original column names. `FEATURE_COLUMNS`
//! is the fixed renaming table between the two.

/// One feature as named by each side of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureColumn {
    /// Column name in the prediction log.
    pub log_name: &'static str,
    /// Column name in the reference snapshot.
    pub reference_name: &'static str,
}

/// Ordered renaming table. Order matches `FeatureVector::values`.
pub const FEATURE_COLUMNS: [FeatureColumn; 4] = [
    FeatureColumn {
        log_name: "sepal_length",
        reference_name: "sepal length (cm)",
    },
    FeatureColumn {
        log_name: "sepal_width",
        reference_name: "sepal width (cm)",
    },
    FeatureColumn {
        log_name: "petal_length",
        reference_name: "petal length (cm)",
    },
    FeatureColumn {
        log_name: "petal_width",
        reference_name: "petal width (cm)",
    },
];

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const TARGET_COLUMN: &str = "target";
pub const PREDICTION_COLUMN: &str = "prediction";

/// Translate a prediction-log column name into its reference name.
pub fn reference_name(log_name: &str) -> Option<&'static str> {
    FEATURE_COLUMNS
        .iter()
        .find(|c| c.log_name == log_name)
        .map(|c| c.reference_name)
}

/// Reference-side feature names, in table order.
pub fn reference_feature_names() -> [&'static str; 4] {
    FEATURE_COLUMNS.map(|c| c.reference_name)
}

/// Header of the prediction log, in on-disk order.
pub fn log_header() -> Vec<&'static str> {
    let mut header = vec![TIMESTAMP_COLUMN];
    header.extend(FEATURE_COLUMNS.iter().map(|c| c.log_name));
    header.push(PREDICTION_COLUMN);
    header
}

/// Header of the reference snapshot, in on-disk order.
pub fn reference_header() -> Vec<&'static str> {
    let mut header: Vec<&'static str> = reference_feature_names().to_vec();
    header.push(TARGET_COLUMN);
    header
}
