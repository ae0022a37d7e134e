use driftwatch_core::LoopConfig;
use driftwatch_monitor::{DriftEvaluator, format_report};

use crate::OutputFormat;

pub fn evaluate(config: &LoopConfig, format: OutputFormat) -> anyhow::Result<()> {
    let evaluation = DriftEvaluator::new(config).evaluate()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&evaluation.report)?);
        }
        OutputFormat::Text => {
            println!("{}", format_report(&evaluation.report));
            println!(
                "[monitor] ✓ Drift status saved to {} (data_drift = {})",
                config.paths.drift_status.display(),
                evaluation.status.data_drift
            );
        }
    }

    Ok(())
}
