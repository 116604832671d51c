//! Plain-text rendering of simulation summaries.

use crate::simulation::SimulationSummary;

/// Format a summary as an aligned table, one row per kind.
pub fn format_summary(summary: &SimulationSummary) -> String {
    let mut out = String::new();

    let hours = summary.simulated_secs as f64 / 3600.0;
    out.push_str(&format!(
        "Simulated {} ticks ({hours:.1}h), {} jobs outstanding\n\n",
        summary.ticks, summary.outstanding_jobs
    ));

    if summary.kinds.is_empty() {
        out.push_str("No workload kinds.\n");
        return out;
    }

    let width = summary
        .kinds
        .iter()
        .map(|k| k.kind.as_str().len())
        .max()
        .unwrap_or(0)
        .max("KIND".len());

    out.push_str(&format!(
        "{:<width$}  {:>5}  {:>5}  {:>7}  {:>9}  {:>9}  {:>7}\n",
        "KIND", "POOL", "PEAK", "CREATED", "DESTROYED", "COMPLETED", "BACKLOG"
    ));
    for k in &summary.kinds {
        out.push_str(&format!(
            "{:<width$}  {:>5}  {:>5}  {:>7}  {:>9}  {:>9}  {:>7}\n",
            k.kind.as_str(),
            k.final_pool,
            k.peak_pool,
            k.created,
            k.destroyed,
            format!("{}/{}", k.jobs_completed, k.jobs_submitted),
            k.backlog,
        ));
    }

    out
}
