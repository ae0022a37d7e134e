use anyhow::bail;

use driftwatch_core::LoopConfig;
use driftwatch_retrain::{RetrainController, RetrainOutcome};

pub fn retrain(config: &LoopConfig) -> anyhow::Result<()> {
    let controller = RetrainController::from_config(config)?;

    match controller.maybe_retrain()? {
        RetrainOutcome::Failed(reason) => bail!("training failed: {reason}"),
        outcome => println!("[retrain] {outcome}"),
    }

    Ok(())
}
