//! Drift evaluator: compares logged traffic against the reference
//! snapshot and publishes the verdict as the current drift status.
//!
//! The evaluator never talks to the retrain controller. Its only outputs
//! are the status file (overwritten atomically each run) and the report.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{info, warn};

use driftwatch_core::config::DriftConfig;
use driftwatch_core::fsutil::write_atomic;
use driftwatch_core::{DriftStatus, LoopConfig, PredictionRecord, ReferenceRow};
use driftwatch_store::{DriftStatusStore, PredictionLog, ReferenceSnapshot, StoreError};

use crate::comparison::{ColumnMapping, ComparisonTable};
use crate::error::{MonitorError, MonitorResult};
use crate::report::{DriftReport, extract_dataset_drift};
use crate::suite::run_suite;

/// Outcome of one evaluation.
#[derive(Debug, Clone)]
pub struct DriftEvaluation {
    pub status: DriftStatus,
    pub report: DriftReport,
}

pub struct DriftEvaluator {
    reference: ReferenceSnapshot,
    log: PredictionLog,
    status: DriftStatusStore,
    report_path: PathBuf,
    settings: DriftConfig,
}

impl DriftEvaluator {
    pub fn new(config: &LoopConfig) -> Self {
        Self {
            reference: ReferenceSnapshot::from_config(config),
            log: PredictionLog::from_config(config),
            status: DriftStatusStore::from_config(config),
            report_path: config.paths.drift_report.clone(),
            settings: config.drift.clone(),
        }
    }

    /// Run the drift suite and publish its verdict.
    ///
    /// Missing inputs fail before anything is written, so a failed run
    /// leaves the previous status in place.
    pub fn evaluate(&self) -> MonitorResult<DriftEvaluation> {
        let reference_rows = self.load_reference()?;
        let records = self.load_log()?;

        let low_confidence = records.len() < self.settings.min_log_rows;
        if low_confidence {
            warn!(
                rows = records.len(),
                min_rows = self.settings.min_log_rows,
                path = %self.log.path().display(),
                "few logged predictions; drift verdict is low confidence"
            );
        }

        let reference = ComparisonTable::from_reference(&reference_rows);
        let current = ComparisonTable::from_log(&records);
        info!(
            reference_rows = reference.len(),
            current_rows = current.len(),
            "comparison tables prepared"
        );

        let mapping = ColumnMapping::shared();
        let metrics = run_suite(&reference, &current, &mapping, &self.settings);

        let mut report = DriftReport {
            generated_at: Utc::now(),
            reference_rows: reference.len(),
            current_rows: current.len(),
            low_confidence,
            verdict_defaulted: false,
            data_drift: false,
            metrics,
        };

        let verdict = self.read_verdict(&mut report)?;
        report.data_drift = verdict;

        let status = DriftStatus::new(verdict);
        self.status.write(&status)?;
        info!(
            data_drift = verdict,
            path = %self.status.path().display(),
            "drift status saved"
        );

        let json = serde_json::to_vec_pretty(&report)?;
        write_atomic(&self.report_path, &json).map_err(|source| StoreError::Io {
            path: self.report_path.clone(),
            source,
        })?;
        info!(path = %self.report_path.display(), "drift report saved");

        Ok(DriftEvaluation { status, report })
    }

    /// Pull the dataset-level flag out of the serialized report.
    ///
    /// An unreadable shape falls back to `drift.ambiguous_verdict` and is
    /// flagged on the report instead of failing the run.
    fn read_verdict(&self, report: &mut DriftReport) -> MonitorResult<bool> {
        let value = serde_json::to_value(&*report)?;
        match extract_dataset_drift(&value) {
            Ok(flag) => Ok(flag),
            Err(e) => {
                let fallback = self.settings.ambiguous_verdict;
                warn!(
                    error = %e,
                    fallback,
                    "could not read dataset drift flag from report; using fallback verdict"
                );
                report.verdict_defaulted = true;
                Ok(fallback)
            }
        }
    }

    fn load_reference(&self) -> MonitorResult<Vec<ReferenceRow>> {
        let path = self.reference.path().to_path_buf();
        let rows = match self.reference.load() {
            Ok(rows) => rows,
            Err(e) if e.is_not_found() => return Err(MonitorError::MissingReference { path }),
            Err(e) => return Err(e.into()),
        };
        if rows.is_empty() {
            return Err(MonitorError::EmptyReference { path });
        }
        info!(path = %path.display(), rows = rows.len(), "reference data loaded");
        Ok(rows)
    }

    fn load_log(&self) -> MonitorResult<Vec<PredictionRecord>> {
        let path = self.log.path().to_path_buf();
        let records = match self.log.read_all() {
            Ok(records) => records,
            Err(e) if e.is_not_found() => {
                return Err(MonitorError::MissingLog {
                    path,
                    reason: "prediction log not found",
                });
            }
            Err(e) => return Err(e.into()),
        };
        if records.is_empty() {
            return Err(MonitorError::MissingLog {
                path,
                reason: "prediction log has no records",
            });
        }
        info!(path = %path.display(), rows = records.len(), "prediction log loaded");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Metric;
    use driftwatch_core::FeatureVector;
    use driftwatch_store::PredictionLogger;

    fn reference_rows() -> Vec<ReferenceRow> {
        (0..150u32)
            .map(|i| {
                let x = f64::from(i);
                ReferenceRow {
                    features: FeatureVector::new(
                        4.3 + x * 0.024,
                        2.0 + x * 0.016,
                        1.0 + x * 0.04,
                        0.1 + x * 0.016,
                    ),
                    target: i / 50,
                }
            })
            .collect()
    }

    fn setup() -> (tempfile::TempDir, LoopConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = LoopConfig::rooted(dir.path());
        (dir, config)
    }

    #[test]
    fn missing_reference_writes_no_status() {
        let (_dir, config) = setup();
        PredictionLogger::from_config(&config)
            .record(FeatureVector::new(5.1, 3.5, 1.4, 0.2), 0)
            .unwrap();

        let err = DriftEvaluator::new(&config).evaluate().unwrap_err();
        assert!(matches!(err, MonitorError::MissingReference { .. }));
        assert!(err.to_string().contains("training"));
        assert!(!config.paths.drift_status.exists());
        assert!(!config.paths.drift_report.exists());
    }

    #[test]
    fn missing_log_writes_no_status() {
        let (_dir, config) = setup();
        ReferenceSnapshot::from_config(&config)
            .replace(&reference_rows())
            .unwrap();

        let err = DriftEvaluator::new(&config).evaluate().unwrap_err();
        assert!(matches!(err, MonitorError::MissingLog { .. }));
        assert!(err.is_missing_precondition());
        assert!(!config.paths.drift_status.exists());
    }

    #[test]
    fn header_only_log_is_missing() {
        let (_dir, config) = setup();
        ReferenceSnapshot::from_config(&config)
            .replace(&reference_rows())
            .unwrap();
        std::fs::create_dir_all(config.paths.prediction_log.parent().unwrap()).unwrap();
        std::fs::write(
            &config.paths.prediction_log,
            "timestamp,sepal_length,sepal_width,petal_length,petal_width,prediction\n",
        )
        .unwrap();

        let err = DriftEvaluator::new(&config).evaluate().unwrap_err();
        assert!(matches!(err, MonitorError::MissingLog { .. }));
    }

    #[test]
    fn empty_reference_is_rejected() {
        let (_dir, config) = setup();
        ReferenceSnapshot::from_config(&config).replace(&[]).unwrap();
        PredictionLogger::from_config(&config)
            .record(FeatureVector::new(5.1, 3.5, 1.4, 0.2), 0)
            .unwrap();

        let err = DriftEvaluator::new(&config).evaluate().unwrap_err();
        assert!(matches!(err, MonitorError::EmptyReference { .. }));
    }

    #[test]
    fn non_finite_log_fails_without_status() {
        let (_dir, config) = setup();
        ReferenceSnapshot::from_config(&config)
            .replace(&reference_rows())
            .unwrap();
        std::fs::create_dir_all(config.paths.prediction_log.parent().unwrap()).unwrap();
        std::fs::write(
            &config.paths.prediction_log,
            "timestamp,sepal_length,sepal_width,petal_length,petal_width,prediction\n\
             2024-05-01T12:00:00Z,NaN,3.5,1.4,0.2,0\n",
        )
        .unwrap();

        let err = DriftEvaluator::new(&config).evaluate().unwrap_err();
        assert!(matches!(
            err,
            MonitorError::Store(driftwatch_store::StoreError::InvalidRecord(_))
        ));
        assert!(!err.is_missing_precondition());
        assert!(!config.paths.drift_status.exists());
    }

    #[test]
    fn identical_populations_report_no_drift() {
        let (_dir, config) = setup();
        let rows = reference_rows();
        ReferenceSnapshot::from_config(&config).replace(&rows).unwrap();
        let logger = PredictionLogger::from_config(&config);
        for row in &rows {
            logger.record(row.features, row.target).unwrap();
        }

        let evaluation = DriftEvaluator::new(&config).evaluate().unwrap();
        assert!(!evaluation.status.data_drift);
        assert!(!evaluation.report.low_confidence);
        assert!(!evaluation.report.verdict_defaulted);

        let stored = DriftStatusStore::from_config(&config).read().unwrap();
        assert_eq!(stored, Some(DriftStatus::new(false)));
        assert!(config.paths.drift_report.exists());
    }

    #[test]
    fn shifted_log_reports_drift_and_overwrites_status() {
        let (_dir, config) = setup();
        let status_store = DriftStatusStore::from_config(&config);
        status_store.write(&DriftStatus::new(false)).unwrap();

        ReferenceSnapshot::from_config(&config)
            .replace(&reference_rows())
            .unwrap();
        let logger = PredictionLogger::from_config(&config);
        for i in 0..50u32 {
            let x = f64::from(i);
            logger
                .record(FeatureVector::new(50.0 + x, 40.0 + x, 60.0 + x, 30.0 + x), i % 3)
                .unwrap();
        }

        let evaluation = DriftEvaluator::new(&config).evaluate().unwrap();
        assert!(evaluation.status.data_drift);
        assert_eq!(status_store.read().unwrap(), Some(DriftStatus::new(true)));

        let report: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&config.paths.drift_report).unwrap()).unwrap();
        assert_eq!(report["data_drift"], true);
        assert_eq!(report["metrics"][0]["result"]["number_of_drifted_columns"], 4);
    }

    #[test]
    fn small_log_is_low_confidence_but_still_evaluated() {
        let (_dir, config) = setup();
        let rows = reference_rows();
        ReferenceSnapshot::from_config(&config).replace(&rows).unwrap();
        let logger = PredictionLogger::from_config(&config);
        for idx in [15, 45, 75, 105, 135] {
            logger.record(rows[idx].features, rows[idx].target).unwrap();
        }

        let evaluation = DriftEvaluator::new(&config).evaluate().unwrap();
        assert!(evaluation.report.low_confidence);
        assert!(!evaluation.status.data_drift);
        assert!(matches!(evaluation.report.metrics[0], Metric::DataDrift(_)));
    }

    #[test]
    fn unreadable_report_shape_uses_fallback() {
        let (_dir, mut config) = setup();
        config.drift.ambiguous_verdict = true;
        let evaluator = DriftEvaluator::new(&config);

        let mut report = DriftReport {
            generated_at: Utc::now(),
            reference_rows: 0,
            current_rows: 0,
            low_confidence: false,
            verdict_defaulted: false,
            data_drift: false,
            metrics: Vec::new(),
        };
        let verdict = evaluator.read_verdict(&mut report).unwrap();
        assert!(verdict);
        assert!(report.verdict_defaulted);
    }
}
