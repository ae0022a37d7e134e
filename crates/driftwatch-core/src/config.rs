//! driftwatch.toml configuration parser.
//!
//! Every component receives its paths and thresholds from a `LoopConfig`
//! at construction time. All sections and fields are optional; missing
//! values fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "driftwatch.toml";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub paths: PathsConfig,
    pub drift: DriftConfig,
    pub training: TrainingConfig,
}

/// Locations of the shared state files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub prediction_log: PathBuf,
    pub reference: PathBuf,
    pub drift_status: PathBuf,
    pub drift_report: PathBuf,
    pub model_artifact: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            prediction_log: PathBuf::from("data/logs/predictions.csv"),
            reference: PathBuf::from("data/processed/reference.csv"),
            drift_status: PathBuf::from("reports/drift_status.json"),
            drift_report: PathBuf::from("reports/drift_report.json"),
            model_artifact: PathBuf::from("models/model.pkl"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Per-column p-value below which a column counts as drifted.
    pub stattest_threshold: f64,
    /// Share of drifted feature columns that flips the dataset-level flag.
    pub drift_share: f64,
    /// Below this many logged predictions the verdict is low-confidence.
    pub min_log_rows: usize,
    /// Verdict used when the report cannot be interpreted.
    pub ambiguous_verdict: bool,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            stattest_threshold: 0.05,
            drift_share: 0.5,
            min_log_rows: 10,
            ambiguous_verdict: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Program and arguments of the training job.
    pub command: Vec<String>,
    pub working_dir: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            command: vec!["python".to_string(), "src/training/train.py".to_string()],
            working_dir: PathBuf::from("."),
        }
    }
}

impl LoopConfig {
    /// Parse a config file. Relative paths resolve against the file's directory.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: LoopConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(root) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.resolve_against(root);
        }
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults relative
    /// to the working directory.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if path.is_file() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Default configuration with every path placed under `root`.
    pub fn rooted(root: &Path) -> Self {
        let mut config = Self::default();
        config.resolve_against(root);
        config
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let threshold = self.drift.stattest_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "drift.stattest_threshold must be in (0, 1], got {threshold}"
            )));
        }
        let share = self.drift.drift_share;
        if !(share > 0.0 && share <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "drift.drift_share must be in (0, 1], got {share}"
            )));
        }
        if self.training.command.is_empty() {
            return Err(ConfigError::Invalid(
                "training.command must name a program".to_string(),
            ));
        }
        Ok(())
    }

    fn resolve_against(&mut self, root: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };
        join(&mut self.paths.prediction_log);
        join(&mut self.paths.reference);
        join(&mut self.paths.drift_status);
        join(&mut self.paths.drift_report);
        join(&mut self.paths.model_artifact);
        join(&mut self.training.working_dir);
    }
}
