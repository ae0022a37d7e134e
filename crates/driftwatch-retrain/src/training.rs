//! Training service capability.
//!
//! The controller only needs "run training and tell me how it went". The
//! default implementation shells out to the configured training command;
//! tests and embedders can supply their own.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

use driftwatch_core::config::TrainingConfig;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("training command is empty")]
    EmptyCommand,

    #[error("failed to start `{program}` in {}: {source}", .working_dir.display())]
    Spawn {
        program: String,
        working_dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("training service error: {0}")]
    Other(String),
}

/// Captured result of one training run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingRun {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl TrainingRun {
    pub fn succeeded() -> Self {
        Self {
            exit_code: Some(0),
            ..Self::default()
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// The most useful explanation of a failed run.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.exit_code {
            Some(code) => format!("training exited with code {code}"),
            None => "training was terminated by a signal".to_string(),
        }
    }
}

/// Produces a new model artifact and reference snapshot.
///
/// On success the implementation must have replaced both atomically. On
/// failure it must leave the current artifact untouched.
pub trait TrainingService: Send + Sync {
    fn run(&self) -> Result<TrainingRun, TrainingError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Runs the training job as a child process and waits for it.
#[derive(Debug, Clone)]
pub struct CommandTrainingService {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl CommandTrainingService {
    pub fn new(command: &[String], working_dir: impl Into<PathBuf>) -> Result<Self, TrainingError> {
        let (program, args) = command.split_first().ok_or(TrainingError::EmptyCommand)?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            working_dir: working_dir.into(),
        })
    }

    pub fn from_config(config: &TrainingConfig) -> Result<Self, TrainingError> {
        Self::new(&config.command, &config.working_dir)
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

impl TrainingService for CommandTrainingService {
    fn run(&self) -> Result<TrainingRun, TrainingError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.working_dir);

        debug!("Running: {:?}", cmd);

        let output = cmd.output().map_err(|source| TrainingError::Spawn {
            program: self.program.clone(),
            working_dir: self.working_dir.clone(),
            source,
        })?;

        Ok(TrainingRun {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn describe(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.as_str());
        parts.extend(self.args.iter().map(String::as_str));
        parts.join(" ")
    }
}
