use std::path::Path;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info};

use poolscale_core::config::parse_duration;
use poolscale_core::TickReport;
use poolscale_metrics::{ScalerMetrics, render_prometheus};
use poolscale_sim::{Simulation, Trace, report};

use super::load_config;

pub async fn run(
    config: Option<&Path>,
    trace: &Path,
    tick_interval: Option<&str>,
) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let interval = match tick_interval {
        Some(s) => parse_duration(s)?,
        None => config.tick_interval()?,
    };
    anyhow::ensure!(!interval.is_zero(), "tick interval must be non-zero");

    let trace =
        Trace::from_file(trace).with_context(|| format!("loading trace {}", trace.display()))?;
    let (scaler, mut fleet) = Simulation::new(config, &trace)?.into_parts();

    let metrics = ScalerMetrics::new();
    let recorder = metrics.clone();
    let mut scaler = scaler.with_report_fn(Box::new(move |tick: &TickReport| {
        recorder.record(tick);
        if tick.total_creates() + tick.total_destroys() > 0 {
            info!(
                tick = tick.tick,
                creates = tick.total_creates(),
                destroys = tick.total_destroys(),
                "pools changed"
            );
        }
    }));

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutdown signal received"),
            Err(e) => error!(error = %e, "failed to listen for ctrl-c, stopping"),
        }
        let _ = shutdown_tx.send(true);
    });

    info!(interval_secs = interval.as_secs_f64(), "poolscaled running, ctrl-c to stop");
    scaler.run(&mut fleet, interval, shutdown_rx).await;

    print!("{}", report::format_summary(&fleet.summary()));
    println!();
    print!("{}", render_prometheus(&metrics.snapshot(), metrics.ticks()));

    info!("poolscaled stopped");
    Ok(())
}
