//! driftwatch-monitor: drift evaluation for the retraining loop.
//!
//! Compares the logged prediction traffic against the reference snapshot
//! and publishes a single dataset-level verdict for the retrain controller.
//!
//! # Architecture
//!
//! ```text
//! DriftEvaluator::evaluate()
//!   ├── ReferenceSnapshot::load()   ─┐
//!   ├── PredictionLog::read_all()   ─┴─> ComparisonTable (shared columns)
//!   ├── run_suite()
//!   │   ├── DataDrift: K-S per feature, share rule
//!   │   └── TargetDrift: chi-square on target and prediction
//!   ├── extract_dataset_drift()     (from the serialized report)
//!   ├── DriftStatusStore::write()   (atomic)
//!   └── drift_report.json
//! ```
//!
//! Only the `DataDrift` metric decides the verdict. Target drift is
//! reported for inspection.

pub mod comparison;
pub mod error;
pub mod evaluator;
pub mod report;
pub mod stattest;
pub mod suite;

pub use comparison::{ColumnMapping, ComparisonTable, LabelSource};
pub use error::{MonitorError, MonitorResult};
pub use evaluator::{DriftEvaluation, DriftEvaluator};
pub use report::{DriftReport, ExtractError, Metric, extract_dataset_drift, format_report};
pub use stattest::{StatTest, TestOutcome};
