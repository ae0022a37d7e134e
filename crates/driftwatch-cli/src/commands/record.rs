use driftwatch_core::{FeatureVector, LoopConfig};
use driftwatch_store::PredictionLogger;

pub fn record(config: &LoopConfig, features: FeatureVector, prediction: u32) -> anyhow::Result<()> {
    let logger = PredictionLogger::from_config(config);
    let record = logger.record(features, prediction)?;

    println!(
        "[record] ✓ Recorded prediction {} at {} in {}",
        record.prediction,
        record.timestamp.to_rfc3339(),
        logger.path().display()
    );

    Ok(())
}
