//! SimulatedFleet — in-memory instances that execute trace jobs.

use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, info, warn};

use poolscale_autoscale::{InstanceLifecycle, UtilizationSource};
use poolscale_core::{ConfigResult, InstanceId, ScalerConfig, WorkloadKind};

use crate::error::TraceError;
use crate::trace::{Trace, job_duration_secs};
use crate::window::UtilizationWindow;

#[derive(Debug, Clone)]
struct Job {
    remaining_secs: u64,
}

#[derive(Debug)]
struct SimInstance {
    kind: WorkloadKind,
    running: Option<Job>,
    window: UtilizationWindow,
}

/// Counters kept per kind for summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindStats {
    pub created: u64,
    pub destroyed: u64,
    pub peak_pool: usize,
    pub jobs_submitted: u64,
    pub jobs_completed: u64,
}

#[derive(Debug, Default)]
struct KindPool {
    instances: Vec<InstanceId>,
    /// Jobs waiting for a free instance.
    backlog: VecDeque<Job>,
    stats: KindStats,
}

/// A pending trace entry, already resolved to seconds.
#[derive(Debug, Clone)]
struct Arrival {
    kind: WorkloadKind,
    tick: u64,
    duration_secs: u64,
    count: u32,
}

/// Simulated instances for every workload kind.
///
/// Each `sync` advances the simulation by exactly one tick interval,
/// regardless of the clock value passed in.
#[derive(Debug)]
pub struct SimulatedFleet {
    tick_secs: u64,
    window_ticks: usize,
    pools: BTreeMap<WorkloadKind, KindPool>,
    /// Ordered so that free instances pull work in id order.
    instances: BTreeMap<InstanceId, SimInstance>,
    /// Sorted by arrival tick.
    arrivals: VecDeque<Arrival>,
    next_instance: u64,
    tick: u64,
}

impl SimulatedFleet {
    /// Create an empty fleet paced by `config`'s tick interval and
    /// utilization window.
    pub fn new(config: &ScalerConfig) -> ConfigResult<Self> {
        Ok(Self {
            tick_secs: config.tick_interval()?.as_secs(),
            window_ticks: config.window_ticks()? as usize,
            pools: BTreeMap::new(),
            instances: BTreeMap::new(),
            arrivals: VecDeque::new(),
            next_instance: 0,
            tick: 0,
        })
    }

    /// Make `kind` known to the fleet with an empty pool.
    pub fn register_kind(&mut self, kind: WorkloadKind) {
        self.pools.entry(kind).or_default();
    }

    /// Register every kind of `trace` and schedule its jobs.
    pub fn load_trace(&mut self, trace: &Trace) -> Result<(), TraceError> {
        for kind in trace.all_kinds() {
            self.register_kind(kind);
        }

        let mut arrivals = Vec::with_capacity(trace.jobs.len());
        for (index, job) in trace.jobs.iter().enumerate() {
            arrivals.push(Arrival {
                kind: job.kind.clone(),
                tick: job.arrival_tick,
                duration_secs: job_duration_secs(index, job)?,
                count: job.count,
            });
        }
        arrivals.extend(self.arrivals.drain(..));
        // Stable: jobs arriving on the same tick keep trace order.
        arrivals.sort_by_key(|a| a.tick);
        self.arrivals = arrivals.into();

        info!(
            kinds = self.pools.len(),
            jobs = trace.job_count(),
            "trace loaded"
        );
        Ok(())
    }

    /// Ticks simulated so far.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn tick_secs(&self) -> u64 {
        self.tick_secs
    }

    pub fn pool_size(&self, kind: &WorkloadKind) -> usize {
        self.pools.get(kind).map_or(0, |p| p.instances.len())
    }

    /// Pool size of every kind, in kind order.
    pub fn pool_sizes(&self) -> BTreeMap<WorkloadKind, usize> {
        self.pools
            .iter()
            .map(|(kind, pool)| (kind.clone(), pool.instances.len()))
            .collect()
    }

    pub fn backlog_len(&self, kind: &WorkloadKind) -> usize {
        self.pools.get(kind).map_or(0, |p| p.backlog.len())
    }

    pub fn is_running(&self, instance: InstanceId) -> bool {
        self.instances
            .get(&instance)
            .is_some_and(|i| i.running.is_some())
    }

    pub fn stats(&self, kind: &WorkloadKind) -> Option<&KindStats> {
        self.pools.get(kind).map(|p| &p.stats)
    }

    /// Jobs not yet admitted, assigned, or finished.
    pub fn outstanding_jobs(&self) -> u64 {
        let pending: u64 = self.arrivals.iter().map(|a| u64::from(a.count)).sum();
        let backlog: usize = self.pools.values().map(|p| p.backlog.len()).sum();
        let running = self.instances.values().filter(|i| i.running.is_some()).count();
        pending + backlog as u64 + running as u64
    }

    fn admit_arrivals(&mut self) {
        while self
            .arrivals
            .front()
            .is_some_and(|a| a.tick <= self.tick)
        {
            let Some(arrival) = self.arrivals.pop_front() else {
                break;
            };
            let pool = self.pools.entry(arrival.kind.clone()).or_default();
            for _ in 0..arrival.count {
                pool.backlog.push_back(Job {
                    remaining_secs: arrival.duration_secs,
                });
            }
            pool.stats.jobs_submitted += u64::from(arrival.count);
            debug!(
                kind = %arrival.kind,
                count = arrival.count,
                tick = self.tick,
                "jobs arrived"
            );
        }
    }

    /// Burn one tick of work on every instance and record its busy fraction.
    ///
    /// A free instance pulls the next job from its kind's backlog, so time
    /// left over after a job finishes flows into the next one.
    fn advance_work(&mut self) {
        for instance in self.instances.values_mut() {
            let Some(pool) = self.pools.get_mut(&instance.kind) else {
                continue;
            };
            let mut budget = self.tick_secs;
            while budget > 0 {
                if instance.running.is_none() {
                    instance.running = pool.backlog.pop_front();
                }
                let Some(job) = instance.running.as_mut() else {
                    break;
                };
                let spent = budget.min(job.remaining_secs);
                job.remaining_secs -= spent;
                budget -= spent;
                if job.remaining_secs == 0 {
                    instance.running = None;
                    pool.stats.jobs_completed += 1;
                }
            }
            let busy = (self.tick_secs - budget) as f64 / self.tick_secs as f64;
            instance.window.record(busy);
        }
    }
}

impl InstanceLifecycle for SimulatedFleet {
    fn kinds(&self) -> Vec<WorkloadKind> {
        self.pools.keys().cloned().collect()
    }

    fn pool_for(&self, kind: &WorkloadKind) -> Option<Vec<InstanceId>> {
        self.pools.get(kind).map(|p| p.instances.clone())
    }

    fn request_create(&mut self, kind: &WorkloadKind) {
        self.next_instance += 1;
        let id = InstanceId(self.next_instance);
        self.instances.insert(
            id,
            SimInstance {
                kind: kind.clone(),
                running: None,
                window: UtilizationWindow::new(self.window_ticks),
            },
        );
        let pool = self.pools.entry(kind.clone()).or_default();
        pool.instances.push(id);
        pool.stats.created += 1;
        pool.stats.peak_pool = pool.stats.peak_pool.max(pool.instances.len());
        debug!(%kind, instance = %id, size = pool.instances.len(), "instance created");
    }

    fn request_destroy(&mut self, kind: &WorkloadKind, instance: InstanceId) {
        let Some(removed) = self.instances.remove(&instance) else {
            warn!(%kind, %instance, "destroy requested for unknown instance");
            return;
        };
        if &removed.kind != kind {
            warn!(%kind, %instance, owner = %removed.kind, "destroy requested under the wrong kind");
        }
        let pool = self.pools.entry(removed.kind.clone()).or_default();
        pool.instances.retain(|id| *id != instance);
        pool.stats.destroyed += 1;
        // Unfinished work goes back to the front of the line.
        if let Some(job) = removed.running {
            pool.backlog.push_front(job);
        }
        debug!(kind = %removed.kind, %instance, size = pool.instances.len(), "instance destroyed");
    }

    fn sync(&mut self, _now: u64) {
        self.tick += 1;
        self.admit_arrivals();
        self.advance_work();
    }
}

impl UtilizationSource for SimulatedFleet {
    fn hourly_utilization(&self, instance: InstanceId) -> f64 {
        self.instances
            .get(&instance)
            .map_or(0.0, |i| i.window.average())
    }

    fn is_busy_or_pending(&self, instance: InstanceId) -> bool {
        self.instances
            .get(&instance)
            .is_some_and(|i| i.running.is_some())
    }
}
