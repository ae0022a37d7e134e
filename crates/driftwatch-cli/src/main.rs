use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use driftwatch_core::config::CONFIG_FILE;
use driftwatch_core::fsutil::parse_duration;
use driftwatch_core::{FeatureVector, LoopConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "driftwatch",
    about = "driftwatch: drift-triggered retraining for a served classifier",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to driftwatch.toml (default: ./driftwatch.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare logged predictions against the reference snapshot and
    /// publish the drift status.
    Evaluate {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Retrain if the current drift status reports drift.
    Retrain,
    /// Append one served prediction to the prediction log.
    Record {
        #[arg(long)]
        sepal_length: f64,
        #[arg(long)]
        sepal_width: f64,
        #[arg(long)]
        petal_length: f64,
        #[arg(long)]
        petal_width: f64,
        /// Predicted class index
        #[arg(long)]
        prediction: u32,
    },
    /// Show the current drift status and model fingerprint.
    Status,
    /// Evaluate then retrain on a fixed interval until Ctrl-C.
    Run {
        /// Time between ticks, e.g. 30s, 5m, 1h
        #[arg(long, default_value = "5m", value_parser = parse_interval)]
        interval: Duration,
        /// Run a single tick and exit
        #[arg(long)]
        once: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Commands {
    /// Prefix for fatal diagnostics.
    fn stage(&self) -> &'static str {
        match self {
            Commands::Evaluate { .. } => "monitor",
            Commands::Retrain => "retrain",
            Commands::Record { .. } => "record",
            Commands::Status => "status",
            Commands::Run { .. } => "run",
        }
    }
}

fn parse_interval(s: &str) -> Result<Duration, String> {
    match parse_duration(s) {
        Some(d) if !d.is_zero() => Ok(d),
        Some(_) => Err("interval must be greater than zero".to_string()),
        None => Err(format!("invalid duration `{s}` (expected e.g. 30s, 5m, 1h)")),
    }
}

/// Used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str =
    "warn,driftwatch=info,driftwatch_core=info,driftwatch_store=info,driftwatch_monitor=info,driftwatch_retrain=info";

fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<LoopConfig> {
    let config = match path {
        Some(path) => LoopConfig::from_file(path)?,
        None => LoopConfig::load(Path::new(CONFIG_FILE))
            .with_context(|| format!("loading ./{CONFIG_FILE}"))?,
    };
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_json) {
        eprintln!("[driftwatch] error: {e:#}");
        return ExitCode::FAILURE;
    }

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[config] error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let stage = cli.command.stage();
    let result = match cli.command {
        Commands::Evaluate { format } => commands::evaluate::evaluate(&config, format),
        Commands::Retrain => commands::retrain::retrain(&config),
        Commands::Record {
            sepal_length,
            sepal_width,
            petal_length,
            petal_width,
            prediction,
        } => commands::record::record(
            &config,
            FeatureVector::new(sepal_length, sepal_width, petal_length, petal_width),
            prediction,
        ),
        Commands::Status => commands::status::status(&config),
        Commands::Run { interval, once } => commands::run::run(&config, interval, once),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let stage = e
                .downcast_ref::<commands::run::TickError>()
                .map_or(stage, commands::run::TickError::stage);
            eprintln!("[{stage}] error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
