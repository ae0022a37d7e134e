//! Drift report: the persisted result of one evaluation, plus the
//! verdict extraction and the human-readable rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::stattest::StatTest;

/// Full report written next to the drift status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub generated_at: DateTime<Utc>,
    pub reference_rows: usize,
    pub current_rows: usize,
    /// Fewer logged predictions than `drift.min_log_rows`.
    pub low_confidence: bool,
    /// The verdict could not be read from `metrics` and was defaulted.
    pub verdict_defaulted: bool,
    pub data_drift: bool,
    pub metrics: Vec<Metric>,
}

/// One metric of the suite, serialized as `{"metric": ..., "result": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", content = "result")]
pub enum Metric {
    DataDrift(DatasetDriftResult),
    TargetDrift(TargetDriftResult),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDriftResult {
    pub dataset_drift: bool,
    pub drift_share: f64,
    pub number_of_columns: usize,
    pub number_of_drifted_columns: usize,
    pub share_of_drifted_columns: f64,
    pub columns: Vec<ColumnDrift>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDriftResult {
    pub target: ColumnDrift,
    pub prediction: ColumnDrift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Numerical,
    Categorical,
}

/// Result of one statistical test on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDrift {
    pub column: String,
    pub column_type: ColumnType,
    pub stattest: StatTest,
    pub statistic: f64,
    pub p_value: f64,
    pub threshold: f64,
    pub drift_detected: bool,
}

/// Why the dataset-level flag could not be read from a report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("report has no `metrics` array")]
    MissingMetrics,
    #[error("no DataDrift metric in report")]
    NoDataDriftMetric,
    #[error("DataDrift metric has no boolean `result.dataset_drift`")]
    MissingFlag,
}

/// Read the dataset-level drift flag from a serialized report.
///
/// Only the feature-drift metric decides; target drift is informational.
/// The first metric whose name contains `DataDrift` wins.
pub fn extract_dataset_drift(report: &Value) -> Result<bool, ExtractError> {
    let metrics = report
        .get("metrics")
        .and_then(Value::as_array)
        .ok_or(ExtractError::MissingMetrics)?;

    let metric = metrics
        .iter()
        .find(|m| {
            m.get("metric")
                .or_else(|| m.get("metric_name"))
                .and_then(Value::as_str)
                .is_some_and(|name| name.contains("DataDrift"))
        })
        .ok_or(ExtractError::NoDataDriftMetric)?;

    metric
        .get("result")
        .and_then(|r| r.get("dataset_drift"))
        .and_then(Value::as_bool)
        .ok_or(ExtractError::MissingFlag)
}

/// Render a report for the terminal.
pub fn format_report(report: &DriftReport) -> String {
    let mut out = String::new();

    let verdict = if report.data_drift { "DRIFT DETECTED" } else { "NO DRIFT" };
    out.push_str("\n╔══════════════════════════════════════════╗\n");
    out.push_str("║  driftwatch Drift Report                 ║\n");
    out.push_str("╠══════════════════════════════════════════╣\n");
    out.push_str(&format!("║  Reference rows: {:<23}║\n", report.reference_rows));
    out.push_str(&format!("║  Current rows:   {:<23}║\n", report.current_rows));
    out.push_str(&format!("║  Verdict:        {:<23}║\n", verdict));
    out.push_str("╚══════════════════════════════════════════╝\n\n");

    if report.low_confidence {
        out.push_str("⚠️  Few logged predictions; treat this verdict as low confidence.\n\n");
    }
    if report.verdict_defaulted {
        out.push_str("⚠️  Dataset drift flag could not be read; verdict was defaulted.\n\n");
    }

    for metric in &report.metrics {
        match metric {
            Metric::DataDrift(result) => {
                out.push_str(&format!(
                    "Feature drift ({} of {} columns drifted, share {:.2}, threshold {:.2}):\n",
                    result.number_of_drifted_columns,
                    result.number_of_columns,
                    result.share_of_drifted_columns,
                    result.drift_share,
                ));
                for column in &result.columns {
                    out.push_str(&format_column(column));
                }
                out.push('\n');
            }
            Metric::TargetDrift(result) => {
                out.push_str("Label drift (informational):\n");
                out.push_str(&format_column(&result.target));
                out.push_str(&format_column(&result.prediction));
                out.push('\n');
            }
        }
    }

    out
}

fn format_column(column: &ColumnDrift) -> String {
    let symbol = if column.drift_detected { "❌" } else { "✅" };
    format!(
        "  {symbol} {:<20} {} = {:.4} (statistic {:.4})\n",
        column.column,
        column.stattest.name(),
        column.p_value,
        column.statistic,
    )
}
