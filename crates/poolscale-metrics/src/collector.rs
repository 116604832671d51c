//! Metrics collector — accumulates per-kind scaling activity.
//!
//! Cheap to clone: clones share the same counters, so one handle can live
//! inside the autoscaler's report callback while another renders.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use poolscale_core::{KindOutcome, TickReport, WorkloadKind};

/// Point-in-time metrics for one workload kind.
#[derive(Debug, Clone, PartialEq)]
pub struct KindMetrics {
    pub kind: WorkloadKind,
    /// Pool size once the latest tick's requests are carried out.
    pub pool_size: usize,
    pub instances_created: u64,
    pub instances_destroyed: u64,
    /// Sole instances destroyed after the grace period.
    pub retirements: u64,
    /// Mean utilization from the latest growth evaluation.
    pub average_utilization: f64,
    /// Current idle count of the kind's sole instance, 0 if none.
    pub idle_ticks: u32,
}

impl KindMetrics {
    fn new(kind: WorkloadKind) -> Self {
        Self {
            kind,
            pool_size: 0,
            instances_created: 0,
            instances_destroyed: 0,
            retirements: 0,
            average_utilization: 0.0,
            idle_ticks: 0,
        }
    }
}

/// Collects scaling metrics across all kinds.
#[derive(Debug, Clone, Default)]
pub struct ScalerMetrics {
    kinds: Arc<Mutex<BTreeMap<WorkloadKind, KindMetrics>>>,
    ticks: Arc<AtomicU64>,
}

impl ScalerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one tick report into the counters.
    pub fn record(&self, report: &TickReport) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        let mut kinds = self.lock();

        for decision in &report.kinds {
            let m = kinds.entry(decision.kind.clone()).or_insert_with(|| {
                debug!(kind = %decision.kind, "tracking metrics for new kind");
                KindMetrics::new(decision.kind.clone())
            });

            m.pool_size = decision.resulting_pool_size();
            m.instances_created += decision.creates() as u64;
            m.instances_destroyed += decision.destroys() as u64;
            m.idle_ticks = 0;

            match decision.outcome {
                KindOutcome::GracePeriod { idle_ticks } => m.idle_ticks = idle_ticks,
                KindOutcome::Retired { .. } => m.retirements += 1,
                KindOutcome::Grew { average, .. } | KindOutcome::Steady { average } => {
                    m.average_utilization = average;
                }
                KindOutcome::ColdStart | KindOutcome::Shrunk { .. } => {}
            }
        }
    }

    /// Ticks recorded so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Current metrics of every kind, in kind order.
    pub fn snapshot(&self) -> Vec<KindMetrics> {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<WorkloadKind, KindMetrics>> {
        // Counters stay usable even if a recording thread panicked.
        self.kinds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
