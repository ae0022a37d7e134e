use driftwatch_core::LoopConfig;
use driftwatch_store::{DriftStatusStore, ModelArtifact, PredictionLog, ReferenceSnapshot};

pub fn status(config: &LoopConfig) -> anyhow::Result<()> {
    let drift = match DriftStatusStore::from_config(config).read()? {
        Some(status) => format!("data_drift = {}", status.data_drift),
        None => "absent (no evaluation yet)".to_string(),
    };

    let log = PredictionLog::from_config(config);
    let logged = if log.exists() {
        format!("{} records", log.read_all()?.len())
    } else {
        "absent".to_string()
    };

    let reference = ReferenceSnapshot::from_config(config);
    let reference_state = if reference.exists() { "present" } else { "absent" };

    let model = ModelArtifact::from_config(config)
        .fingerprint()?
        .map_or_else(|| "absent".to_string(), |sha| format!("sha256 {sha}"));

    println!("Drift status:    {drift}");
    println!("Prediction log:  {logged}");
    println!("Reference data:  {reference_state}");
    println!("Model artifact:  {model}");

    Ok(())
}
