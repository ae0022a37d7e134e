//! End-to-end: serve, evaluate, retrain, evaluate again.
//!
//! The training service here rebuilds the reference from the logged
//! traffic, so after a retrain the loop settles back to "no drift".

use driftwatch_core::{FeatureVector, LoopConfig, ReferenceRow};
use driftwatch_monitor::DriftEvaluator;
use driftwatch_retrain::{
    RetrainController, RetrainOutcome, SkipReason, TrainingError, TrainingRun, TrainingService,
};
use driftwatch_store::{DriftStatusStore, ModelArtifact, PredictionLog, PredictionLogger, ReferenceSnapshot};

/// Retrains on whatever has been served so far.
struct RefitOnLog {
    config: LoopConfig,
}

impl TrainingService for RefitOnLog {
    fn run(&self) -> Result<TrainingRun, TrainingError> {
        let to_training_error = |e: driftwatch_store::StoreError| TrainingError::Other(e.to_string());

        let records = PredictionLog::from_config(&self.config)
            .read_all()
            .map_err(to_training_error)?;
        let rows: Vec<ReferenceRow> = records
            .iter()
            .map(|r| ReferenceRow {
                features: r.features,
                target: r.prediction,
            })
            .collect();

        ReferenceSnapshot::from_config(&self.config)
            .replace(&rows)
            .map_err(to_training_error)?;
        ModelArtifact::from_config(&self.config)
            .replace(format!("model trained on {} rows", rows.len()).as_bytes())
            .map_err(to_training_error)?;

        Ok(TrainingRun::succeeded())
    }

    fn describe(&self) -> String {
        "refit-on-log".to_string()
    }
}

fn initial_reference() -> Vec<ReferenceRow> {
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

#[test]
fn drift_triggers_retrain_and_loop_settles() {
    let dir = tempfile::tempdir().unwrap();
    let config = LoopConfig::rooted(dir.path());

    let reference = initial_reference();
    ReferenceSnapshot::from_config(&config).replace(&reference).unwrap();
    ModelArtifact::from_config(&config).replace(b"initial model").unwrap();
    let initial_sha = ModelArtifact::from_config(&config).fingerprint().unwrap();

    let evaluator = DriftEvaluator::new(&config);
    let controller = RetrainController::new(
        DriftStatusStore::from_config(&config),
        ModelArtifact::from_config(&config),
        Box::new(RefitOnLog {
            config: config.clone(),
        }),
    );

    // Before any evaluation the controller has nothing to act on.
    assert_eq!(
        controller.maybe_retrain().unwrap(),
        RetrainOutcome::Skipped(SkipReason::NoStatus)
    );

    // In-distribution traffic.
    let logger = PredictionLogger::from_config(&config);
    for idx in [15, 45, 75, 105, 135] {
        logger
            .record(reference[idx].features, reference[idx].target)
            .unwrap();
    }
    let evaluation = evaluator.evaluate().unwrap();
    assert!(!evaluation.status.data_drift);
    assert!(evaluation.report.low_confidence);
    assert_eq!(
        controller.maybe_retrain().unwrap(),
        RetrainOutcome::Skipped(SkipReason::NoDrift)
    );
    assert_eq!(
        ModelArtifact::from_config(&config).fingerprint().unwrap(),
        initial_sha
    );

    // Traffic moves far outside the training range; the log is rotated so
    // only the new population is evaluated.
    std::fs::remove_file(&config.paths.prediction_log).unwrap();
    for row in reference.iter().take(50) {
        let f = row.features;
        logger
            .record(
                FeatureVector::new(
                    f.sepal_length + 100.0,
                    f.sepal_width + 100.0,
                    f.petal_length + 100.0,
                    f.petal_width + 100.0,
                ),
                row.target,
            )
            .unwrap();
    }
    let evaluation = evaluator.evaluate().unwrap();
    assert!(evaluation.status.data_drift);
    assert_eq!(evaluation.report.current_rows, 50);

    let outcome = controller.maybe_retrain().unwrap();
    let new_sha = ModelArtifact::from_config(&config).fingerprint().unwrap();
    assert_ne!(new_sha, initial_sha);
    assert_eq!(
        outcome,
        RetrainOutcome::Retrained {
            artifact_sha256: new_sha
        }
    );

    // The new reference matches what is being served.
    let evaluation = evaluator.evaluate().unwrap();
    assert!(!evaluation.status.data_drift);
    assert_eq!(evaluation.report.reference_rows, 50);
    assert_eq!(evaluation.report.current_rows, 50);
    assert_eq!(
        controller.maybe_retrain().unwrap(),
        RetrainOutcome::Skipped(SkipReason::NoDrift)
    );
}

#[test]
fn failed_evaluation_leaves_previous_status() {
    let dir = tempfile::tempdir().unwrap();
    let config = LoopConfig::rooted(dir.path());
    let status = DriftStatusStore::from_config(&config);
    status
        .write(&driftwatch_core::DriftStatus::new(true))
        .unwrap();

    // No reference snapshot: evaluation must fail without touching status.
    PredictionLogger::from_config(&config)
        .record(FeatureVector::new(5.1, 3.5, 1.4, 0.2), 0)
        .unwrap();
    assert!(DriftEvaluator::new(&config).evaluate().is_err());
    assert_eq!(
        status.read().unwrap(),
        Some(driftwatch_core::DriftStatus::new(true))
    );
}
