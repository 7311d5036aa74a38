//! mrai-dp - runs dataset pipeline stages over a data directory
//!
//! Each subcommand runs one stage; `run` chains the offline stages.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mrai_common::config::{LoggingConfig, TomlConfig};
use mrai_dp::{PipelineOrchestrator, Stage, BUILD_INFO};

/// Command-line arguments for mrai-dp
#[derive(Parser, Debug)]
#[command(name = "mrai-dp")]
#[command(about = "Album rating dataset builder")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, global = true, env = "MRAI_CONFIG")]
    config: Option<PathBuf>,

    /// Root of the raw/processed/feature/final tree
    #[arg(short, long, global = true, env = "MRAI_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Clean the raw chart scrape
    ProcessRym,
    /// Match chart albums against cached catalog searches
    Resolve,
    /// Clean catalog track features, identities and matches
    ProcessSpotify,
    /// Encode chart-side features
    SelectRym,
    /// Rescale and reshape catalog tracks
    SelectSpotify,
    /// Assemble the final datasets
    Finalize,
    /// Run every offline stage in order
    Run,
}

impl Command {
    fn stages(self) -> Vec<Stage> {
        match self {
            Command::ProcessRym => vec![Stage::ProcessRym],
            Command::Resolve => vec![Stage::Resolve],
            Command::ProcessSpotify => vec![Stage::ProcessSpotify],
            Command::SelectRym => vec![Stage::SelectRym],
            Command::SelectSpotify => vec![Stage::SelectSpotify],
            Command::Finalize => vec![Stage::Finalize],
            Command::Run => Stage::RUN_ORDER.to_vec(),
        }
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)
            .with_context(|| format!("Invalid log level '{}'", logging.level))?,
    };

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref(), args.data_dir.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    info!(
        "Starting mrai-dp v{} [{}] built {} ({})",
        BUILD_INFO.version, BUILD_INFO.git_hash, BUILD_INFO.build_timestamp, BUILD_INFO.build_profile
    );
    info!("Data directory: {}", display_dir(&config.data_dir));

    let orchestrator =
        PipelineOrchestrator::new(config).context("Failed to initialize pipeline")?;

    for stage in args.command.stages() {
        let summary = orchestrator
            .run_stage(stage)
            .with_context(|| format!("Stage {} failed", stage))?;
        info!("{}", summary);
    }

    Ok(())
}

fn display_dir(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
