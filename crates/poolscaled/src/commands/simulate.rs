use std::path::Path;

use anyhow::Context;
use tracing::info;

use poolscale_metrics::{ScalerMetrics, render_prometheus};
use poolscale_sim::{Simulation, Trace, report};

use super::load_config;

pub fn simulate(
    config: Option<&Path>,
    trace: &Path,
    ticks: u64,
    json: bool,
    metrics: bool,
) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let trace =
        Trace::from_file(trace).with_context(|| format!("loading trace {}", trace.display()))?;

    info!(
        ticks,
        jobs = trace.job_count(),
        kinds = trace.all_kinds().len(),
        "starting simulation"
    );
    let mut sim = Simulation::new(config, &trace)?;
    let summary = sim.run(ticks)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", report::format_summary(&summary));
    }

    if metrics {
        let collector = ScalerMetrics::new();
        for tick in sim.reports() {
            collector.record(tick);
        }
        println!();
        print!("{}", render_prometheus(&collector.snapshot(), collector.ticks()));
    }

    Ok(())
}
