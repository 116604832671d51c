//! Autoscaler — the control-loop body.
//!
//! Reads each kind's pool from the instance lifecycle, asks the
//! utilization source about every member, decides, and sends the
//! resulting create/destroy requests back to the lifecycle.

use std::collections::HashSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use poolscale_core::*;

use crate::fleet::{InstanceLifecycle, UtilizationSource};
use crate::hysteresis::IdleHysteresisTracker;

/// Absorbs rounding noise in `|pool| * factor` before taking the ceiling.
const TARGET_EPSILON: f64 = 1e-9;

/// Callback invoked with every completed tick report.
pub type ReportCallback = Box<dyn FnMut(&TickReport) + Send>;

/// Decides pool sizes for every workload kind, one tick at a time.
pub struct Autoscaler {
    config: ScalerConfig,
    /// Consecutive idle ticks of sole instances.
    idle: IdleHysteresisTracker,
    /// Sole idle instances seen during the tick in progress.
    observed_idle: HashSet<InstanceId>,
    ticks: u64,
    report_fn: Option<ReportCallback>,
}

impl Autoscaler {
    /// Create an autoscaler. `config` is expected to have passed
    /// `ScalerConfig::validate`.
    pub fn new(config: ScalerConfig) -> Self {
        Self {
            config,
            idle: IdleHysteresisTracker::new(),
            observed_idle: HashSet::new(),
            ticks: 0,
            report_fn: None,
        }
    }

    /// Set a callback that receives every tick report produced by `run`.
    pub fn with_report_fn(mut self, f: ReportCallback) -> Self {
        self.report_fn = Some(f);
        self
    }

    pub fn config(&self) -> &ScalerConfig {
        &self.config
    }

    pub fn hysteresis(&self) -> &IdleHysteresisTracker {
        &self.idle
    }

    /// Number of ticks started so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Decide what to do with one kind's pool.
    ///
    /// `pool` is the snapshot taken at the start of processing this kind;
    /// the decision never re-reads it.
    pub fn evaluate_kind(
        &mut self,
        kind: &WorkloadKind,
        pool: &[InstanceSnapshot],
    ) -> KindDecision {
        let (outcome, actions) = match pool {
            [] => {
                debug!(%kind, "empty pool, requesting first instance");
                (
                    KindOutcome::ColdStart,
                    vec![ScaleAction::Create { kind: kind.clone() }],
                )
            }
            [sole] if sole.is_idle() => self.evaluate_idle_sole(kind, sole),
            [sole] => {
                self.idle.clear(sole.id);
                self.evaluate_growth(kind, pool)
            }
            _ => self.evaluate_multi(kind, pool),
        };

        KindDecision {
            kind: kind.clone(),
            pool_size: pool.len(),
            outcome,
            actions,
        }
    }

    fn evaluate_idle_sole(
        &mut self,
        kind: &WorkloadKind,
        sole: &InstanceSnapshot,
    ) -> (KindOutcome, Vec<ScaleAction>) {
        let idle_ticks = self.idle.observe_idle(sole.id);

        if idle_ticks < self.config.idle_grace_ticks {
            self.observed_idle.insert(sole.id);
            debug!(
                %kind,
                instance = %sole.id,
                idle_ticks,
                grace = self.config.idle_grace_ticks,
                "sole instance idle, within grace period"
            );
            return (KindOutcome::GracePeriod { idle_ticks }, Vec::new());
        }

        self.idle.clear(sole.id);
        info!(
            %kind,
            instance = %sole.id,
            idle_ticks,
            "sole instance idle for the whole grace period, destroying"
        );
        (
            KindOutcome::Retired { instance: sole.id },
            vec![ScaleAction::Destroy {
                kind: kind.clone(),
                instance: sole.id,
            }],
        )
    }

    fn evaluate_multi(
        &mut self,
        kind: &WorkloadKind,
        pool: &[InstanceSnapshot],
    ) -> (KindOutcome, Vec<ScaleAction>) {
        // Nobody in a multi-instance pool is a sole instance.
        for member in pool {
            self.idle.clear(member.id);
        }

        let threshold = self.config.destroy_utilization_threshold;
        let (mut doomed, mut survivors): (Vec<&InstanceSnapshot>, Vec<&InstanceSnapshot>) = pool
            .iter()
            .partition(|m| m.is_idle() && m.hourly_utilization < threshold);

        if doomed.is_empty() {
            return self.evaluate_growth(kind, pool);
        }

        // Only the grace path may empty a pool: keep the busiest candidate,
        // earliest in pool order on ties.
        if survivors.is_empty()
            && let Some(keep) = doomed
                .iter()
                .enumerate()
                .max_by(|(ia, a), (ib, b)| {
                    a.hourly_utilization
                        .total_cmp(&b.hourly_utilization)
                        .then(ib.cmp(ia))
                })
                .map(|(index, _)| index)
        {
            survivors.push(doomed.remove(keep));
        }

        let actions: Vec<ScaleAction> = doomed
            .iter()
            .map(|m| {
                debug!(
                    %kind,
                    instance = %m.id,
                    utilization = m.hourly_utilization,
                    threshold,
                    "idle and underutilized, destroying"
                );
                ScaleAction::Destroy {
                    kind: kind.clone(),
                    instance: m.id,
                }
            })
            .collect();

        info!(
            %kind,
            from = pool.len(),
            to = survivors.len(),
            "shrinking pool, skipping growth this tick"
        );
        (
            KindOutcome::Shrunk {
                destroyed: actions.len() as u32,
            },
            actions,
        )
    }

    fn evaluate_growth(
        &self,
        kind: &WorkloadKind,
        pool: &[InstanceSnapshot],
    ) -> (KindOutcome, Vec<ScaleAction>) {
        let size = pool.len();
        let average = pool.iter().map(|m| m.hourly_utilization).sum::<f64>() / size as f64;

        let Some(factor) = self.config.growth_factor(average) else {
            debug!(%kind, size, average, "utilization within bounds");
            return (KindOutcome::Steady { average }, Vec::new());
        };

        let target = ((size as f64) * factor - TARGET_EPSILON).ceil() as usize;
        let needed = target.saturating_sub(size);

        info!(
            %kind,
            from = size,
            to = size + needed,
            average,
            factor,
            "scaling up"
        );
        let actions = (0..needed)
            .map(|_| ScaleAction::Create { kind: kind.clone() })
            .collect();
        (
            KindOutcome::Grew {
                average,
                factor,
                requested: needed as u32,
            },
            actions,
        )
    }

    /// Run one control-loop tick against `fleet`.
    ///
    /// Kinds are processed in the order `fleet.kinds()` returns them and each
    /// kind's requests are issued before the next kind is read. A
    /// precondition violation stops the tick; requests already issued for
    /// earlier kinds stand.
    pub fn tick<F>(&mut self, now: u64, fleet: &mut F) -> ScaleResult<TickReport>
    where
        F: InstanceLifecycle + UtilizationSource,
    {
        fleet.sync(now);
        self.ticks += 1;
        self.observed_idle.clear();

        let mut seen = HashSet::new();
        let mut decisions = Vec::new();

        for kind in fleet.kinds() {
            let ids = fleet
                .pool_for(&kind)
                .ok_or_else(|| ScaleError::KindVanished(kind.clone()))?;

            let mut pool = Vec::with_capacity(ids.len());
            for id in ids {
                if !seen.insert(id) {
                    return Err(ScaleError::DuplicateInstance { instance: id });
                }
                let utilization = fleet.hourly_utilization(id);
                if !(0.0..=1.0).contains(&utilization) {
                    return Err(ScaleError::UtilizationOutOfRange {
                        instance: id,
                        value: utilization,
                    });
                }
                pool.push(InstanceSnapshot::new(
                    id,
                    fleet.is_busy_or_pending(id),
                    utilization,
                ));
            }

            let decision = self.evaluate_kind(&kind, &pool);
            apply_actions(fleet, &decision.actions);
            decisions.push(decision);
        }

        // Instances that vanished or stopped being sole-idle lose their counter.
        self.idle.retain_observed(&self.observed_idle);

        Ok(TickReport {
            tick: self.ticks,
            now,
            kinds: decisions,
            tracked_idle: self.idle.len(),
        })
    }

    /// Run the autoscaler loop until the shutdown signal fires.
    pub async fn run<F>(
        &mut self,
        fleet: &mut F,
        interval: Duration,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) where
        F: InstanceLifecycle + UtilizationSource,
    {
        info!(
            interval_secs = interval.as_secs(),
            grace_ticks = self.config.idle_grace_ticks,
            "autoscaler started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    match self.tick(epoch_secs(), fleet) {
                        Ok(report) => {
                            if let Some(ref mut report_fn) = self.report_fn {
                                report_fn(&report);
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, tick = self.ticks, "autoscaler tick failed");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!(ticks = self.ticks, "autoscaler shutting down");
                    break;
                }
            }
        }
    }
}

fn apply_actions<L: InstanceLifecycle>(fleet: &mut L, actions: &[ScaleAction]) {
    for action in actions {
        match action {
            ScaleAction::Destroy { kind, instance } => fleet.request_destroy(kind, *instance),
            ScaleAction::Create { kind } => fleet.request_create(kind),
        }
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
