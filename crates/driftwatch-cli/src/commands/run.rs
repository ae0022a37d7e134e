use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use driftwatch_core::LoopConfig;
use driftwatch_monitor::{DriftEvaluator, MonitorError};
use driftwatch_retrain::{RetrainController, RetrainError, RetrainOutcome};

/// Why a scheduled tick did not complete.
#[derive(Debug, Error)]
pub enum TickError {
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error(transparent)]
    Retrain(#[from] RetrainError),

    #[error("training failed: {0}")]
    TrainingFailed(String),
}

impl TickError {
    pub fn stage(&self) -> &'static str {
        match self {
            TickError::Monitor(_) => "monitor",
            TickError::Retrain(_) | TickError::TrainingFailed(_) => "retrain",
        }
    }
}

pub fn run(config: &LoopConfig, interval: Duration, once: bool) -> anyhow::Result<()> {
    let evaluator = Arc::new(DriftEvaluator::new(config));
    let controller = Arc::new(RetrainController::from_config(config)?);

    if once {
        let outcome = tick(&evaluator, &controller)?;
        println!("[retrain] {outcome}");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the scheduler runtime")?;

    runtime.block_on(async move {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(forward_shutdown(tokio::signal::ctrl_c(), shutdown_tx));
        schedule(evaluator, controller, interval, shutdown_rx).await;
    });
    Ok(())
}

/// Flip the shutdown flag once `signal` fires.
///
/// If the signal cannot be listened for, the sender is held forever so the
/// loop keeps running instead of reading a closed channel as shutdown.
async fn forward_shutdown<F>(signal: F, shutdown_tx: watch::Sender<bool>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
        Err(e) => {
            error!(error = %e, "failed to install Ctrl-C handler; loop continues until killed");
            std::future::pending::<()>().await;
        }
    }
}

/// Evaluate, then let the controller act on the fresh verdict.
///
/// A failed evaluation skips the retrain step so a stale status is not
/// acted on twice.
fn tick(
    evaluator: &DriftEvaluator,
    controller: &RetrainController,
) -> Result<RetrainOutcome, TickError> {
    let evaluation = evaluator.evaluate()?;
    info!(
        data_drift = evaluation.status.data_drift,
        low_confidence = evaluation.report.low_confidence,
        "evaluation complete"
    );

    match controller.maybe_retrain()? {
        RetrainOutcome::Failed(reason) => Err(TickError::TrainingFailed(reason)),
        outcome => Ok(outcome),
    }
}

/// No reference or no traffic yet. Normal right after deployment.
fn is_waiting_for_inputs(e: &TickError) -> bool {
    matches!(e, TickError::Monitor(inner) if inner.is_missing_precondition())
}

async fn schedule(
    evaluator: Arc<DriftEvaluator>,
    controller: Arc<RetrainController>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval_secs = interval.as_secs(), "driftwatch loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let evaluator = Arc::clone(&evaluator);
                let controller = Arc::clone(&controller);
                let result = tokio::task::spawn_blocking(move || tick(&evaluator, &controller)).await;
                match result {
                    Ok(Ok(outcome)) => info!(%outcome, "tick complete"),
                    Ok(Err(e)) if is_waiting_for_inputs(&e) => {
                        warn!(stage = e.stage(), error = %e, "tick skipped");
                    }
                    Ok(Err(e)) => error!(stage = e.stage(), error = %e, "tick failed"),
                    Err(e) => error!(error = %e, "tick task panicked"),
                }
            }
            _ = shutdown.changed() => {
                info!("driftwatch loop shutting down");
                break;
            }
        }
    }
}
