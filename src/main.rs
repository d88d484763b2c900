use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use signalfuse::application::pipeline::{run_inference, run_training};
use signalfuse::config::PipelineConfig;
use signalfuse::infrastructure::observability::init_tracing;
use signalfuse::infrastructure::{ArtifactStore, RunLog};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-source feature fusion and signal ensemble", long_about = None)]
struct Cli {
    /// TOML configuration file. Environment variables are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the source CSV files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory for model artifacts, metrics and the run log
    #[arg(long, global = true)]
    artifacts_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild features and retrain the four models
    Train,
    /// Score the latest row per symbol and print the signals as JSON
    Infer {
        /// Restrict output to one symbol ("ALL" for every symbol)
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Print the tail of the training log
    Logs {
        #[arg(long, default_value_t = 50)]
        lines: usize,
    },
    /// Print the evaluation metrics of the latest training run
    Metrics,
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_toml_file(path)?,
        None => PipelineConfig::from_env().context("Failed to load configuration")?,
    };
    if let Some(dir) = &cli.data_dir {
        config.paths.data_dir = dir.clone();
    }
    if let Some(dir) = &cli.artifacts_dir {
        config.paths.artifacts_dir = dir.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let run_log = RunLog::new(config.paths.log_path());

    match cli.command {
        Command::Train => {
            let log_file = run_log.open_append();
            let log_error = log_file.as_ref().err().map(|e| e.to_string());
            init_tracing(log_file.ok());
            if let Some(e) = log_error {
                warn!("Run log unavailable, logging to console only: {}", e);
            }

            let report = run_training(&config)?;
            info!(
                "Trained {:?}; skipped {:?}",
                report.trained(),
                report.skipped.iter().map(|s| s.target).collect::<Vec<_>>()
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Infer { symbol } => {
            init_tracing(None);
            let report = run_inference(&config, symbol.as_deref());
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Logs { lines } => {
            for line in run_log.tail(lines) {
                println!("{}", line);
            }
        }
        Command::Metrics => {
            init_tracing(None);
            let store = ArtifactStore::new(&config.paths.artifacts_dir);
            let metrics = store.load_metrics().unwrap_or_else(|e| {
                warn!("No metrics available: {}", e);
                Vec::new()
            });
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
    }
    Ok(())
}
