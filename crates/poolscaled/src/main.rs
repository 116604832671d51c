//! poolscaled — the poolscale daemon and simulator.
//!
//! # Usage
//!
//! ```text
//! poolscaled simulate --config poolscale.toml --trace trace.toml --ticks 720
//! poolscaled run --config poolscale.toml --trace trace.toml --tick-interval 2s
//! poolscaled check-config --config poolscale.toml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "poolscaled",
    about = "poolscale — utilization-driven autoscaler for per-kind instance pools",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a trace against a simulated fleet as fast as possible.
    Simulate {
        /// Scaler configuration (defaults apply when omitted).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Workload trace to replay.
        #[arg(short, long)]
        trace: PathBuf,

        /// Number of ticks to simulate (720 = one day at 2-minute ticks).
        #[arg(short = 'n', long, default_value = "720")]
        ticks: u64,

        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,

        /// Append Prometheus text exposition of the scaler metrics.
        #[arg(long)]
        metrics: bool,
    },
    /// Drive the simulated fleet on a wall-clock cadence until Ctrl-C.
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long)]
        trace: PathBuf,

        /// Override the configured tick interval, e.g. "2s" for a quick demo.
        #[arg(long)]
        tick_interval: Option<String>,
    },
    /// Validate a configuration file and print the effective values.
    CheckConfig {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().or_else(|_| {
                tracing_subscriber::EnvFilter::try_new("info,poolscaled=debug,poolscale=debug")
            })?,
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate {
            config,
            trace,
            ticks,
            json,
            metrics,
        } => commands::simulate::simulate(config.as_deref(), &trace, ticks, json, metrics),
        Command::Run {
            config,
            trace,
            tick_interval,
        } => commands::run::run(config.as_deref(), &trace, tick_interval.as_deref()).await,
        Command::CheckConfig { config } => commands::check_config::check_config(&config),
    }
}
