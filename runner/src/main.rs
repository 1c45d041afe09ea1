mod analyze;
mod config;
mod error;
mod report;

#[cfg(test)]
mod config_test;

use crate::{config::RunConfig, error::RunError};
use clap::{Parser, Subcommand};
use reachbench_ingest::Aggregation;
use std::{path::PathBuf, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compare reachability strategies over benchmark batches")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, cross-check and compare the result tables of a batch
    Analyze {
        /// YAML run config
        #[arg(short, long)]
        config: PathBuf,
        /// batch directory, overrides `data.path`
        #[arg(long)]
        data: Option<PathBuf>,
        /// output directory, overrides `output.path`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Aggregate tool logs into a CSV table
    Ingest {
        #[command(subcommand)]
        source: IngestCommand,
    },
}

#[derive(Subcommand, Debug)]
enum IngestCommand {
    /// ITS-tools statistics of the full state space
    Its {
        logs: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// ITS-tools deadlock search durations
    ItsDeadlocks {
        logs: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// pnml-encode wall times
    PnmlEncode {
        logs: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// pnml-encode and ddmc wall times of the hmorph LDDs
    Hmorph {
        encode_logs: PathBuf,
        ddmc_logs: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
}

impl IngestCommand {
    fn into_parts(self) -> (Aggregation, PathBuf) {
        match self {
            Self::Its { logs, output } => (Aggregation::ItsStats { logs }, output),
            Self::ItsDeadlocks { logs, output } => (Aggregation::ItsDeadlocks { logs }, output),
            Self::PnmlEncode { logs, output } => (Aggregation::PnmlEncode { logs }, output),
            Self::Hmorph {
                encode_logs,
                ddmc_logs,
                output,
            } => (
                Aggregation::Hmorph {
                    encode_logs,
                    ddmc_logs,
                },
                output,
            ),
        }
    }
}

/// returns whether every job succeeded
fn run(command: Command) -> Result<bool, RunError> {
    match command {
        Command::Analyze {
            config,
            data,
            output,
        } => {
            let mut config = RunConfig::load(&config)?;

            if let Some(data) = data {
                config.data.path = data;
            }
            if let Some(output) = output {
                config.output.path = output;
            }

            if config.preflight_checks() {
                return Err(RunError::Preflight);
            }

            let summary = analyze::analyze(&config)?;

            Ok(summary.failed == 0)
        }
        Command::Ingest { source } => {
            let (aggregation, output) = source.into_parts();
            let rows = aggregation.run(&output)?;

            info!(rows = rows, "Aggregated {}", aggregation.name());
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse().command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("Some jobs failed, see above");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = ?e, "{e}");
            ExitCode::FAILURE
        }
    }
}
