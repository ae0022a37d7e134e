//! Retrain controller: turns the current drift verdict into at most one
//! training run.
//!
//! The controller is pull-based. It reads the status file written by the
//! evaluator, never calls the evaluator itself, and is safe to invoke on
//! any schedule, including redundantly.

use std::fmt;

use tracing::{debug, info, warn};

use driftwatch_core::LoopConfig;
use driftwatch_store::{DriftStatusStore, ModelArtifact};

use crate::error::RetrainResult;
use crate::training::{CommandTrainingService, TrainingService};

/// Why a controller run did not train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No evaluation has run yet.
    NoStatus,
    /// The latest evaluation found no drift.
    NoDrift,
}

/// Result of one `maybe_retrain` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrainOutcome {
    Skipped(SkipReason),
    /// Training succeeded. Carries the fingerprint of the artifact now on
    /// disk, if the training service left one.
    Retrained { artifact_sha256: Option<String> },
    /// Training failed; the previous artifact is untouched.
    Failed(String),
}

impl RetrainOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RetrainOutcome::Failed(_))
    }
}

impl fmt::Display for RetrainOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrainOutcome::Skipped(SkipReason::NoStatus) => {
                write!(f, "skipped: no drift status yet (run `driftwatch evaluate` first)")
            }
            RetrainOutcome::Skipped(SkipReason::NoDrift) => {
                write!(f, "skipped: no data drift detected")
            }
            RetrainOutcome::Retrained {
                artifact_sha256: Some(sha),
            } => write!(f, "retrained: model artifact sha256 {sha}"),
            RetrainOutcome::Retrained {
                artifact_sha256: None,
            } => write!(f, "retrained: training produced no model artifact"),
            RetrainOutcome::Failed(reason) => write!(f, "training failed: {reason}"),
        }
    }
}

pub struct RetrainController {
    status: DriftStatusStore,
    artifact: ModelArtifact,
    trainer: Box<dyn TrainingService>,
}

impl RetrainController {
    pub fn new(
        status: DriftStatusStore,
        artifact: ModelArtifact,
        trainer: Box<dyn TrainingService>,
    ) -> Self {
        Self {
            status,
            artifact,
            trainer,
        }
    }

    /// Controller wired to the configured state files and training command.
    pub fn from_config(config: &LoopConfig) -> RetrainResult<Self> {
        let trainer = CommandTrainingService::from_config(&config.training)?;
        Ok(Self::new(
            DriftStatusStore::from_config(config),
            ModelArtifact::from_config(config),
            Box::new(trainer),
        ))
    }

    /// Retrain if, and only if, the latest verdict reports drift.
    ///
    /// A status file that exists but cannot be parsed is an error, never a
    /// silent skip.
    pub fn maybe_retrain(&self) -> RetrainResult<RetrainOutcome> {
        let status = match self.status.read()? {
            Some(status) => status,
            None => {
                info!(
                    path = %self.status.path().display(),
                    "no drift status found; skipping retrain"
                );
                return Ok(RetrainOutcome::Skipped(SkipReason::NoStatus));
            }
        };

        if !status.data_drift {
            info!("no data drift detected; skipping retrain");
            return Ok(RetrainOutcome::Skipped(SkipReason::NoDrift));
        }

        let previous = self.artifact.fingerprint()?;
        info!(
            command = %self.trainer.describe(),
            previous_sha256 = previous.as_deref().unwrap_or("none"),
            "data drift detected; retraining"
        );

        let run = match self.trainer.run() {
            Ok(run) => run,
            Err(e) => {
                warn!(error = %e, "training service could not run");
                return Ok(RetrainOutcome::Failed(e.to_string()));
            }
        };

        if !run.stdout.trim().is_empty() {
            debug!(stdout = %run.stdout.trim(), "training output");
        }

        if !run.success() {
            let reason = run.diagnostic();
            warn!(exit_code = ?run.exit_code, reason = %reason, "training failed");
            return Ok(RetrainOutcome::Failed(reason));
        }

        let artifact_sha256 = self.artifact.fingerprint()?;
        match &artifact_sha256 {
            Some(sha) if previous.as_ref() == Some(sha) => {
                warn!(sha256 = %sha, "training succeeded but the model artifact is unchanged");
            }
            Some(sha) => info!(sha256 = %sha, "retraining complete"),
            None => warn!(
                path = %self.artifact.path().display(),
                "training succeeded but no model artifact was found"
            ),
        }

        Ok(RetrainOutcome::Retrained { artifact_sha256 })
    }
}
