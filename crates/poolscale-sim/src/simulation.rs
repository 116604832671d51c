//! Simulation — drives an `Autoscaler` against a `SimulatedFleet`.

use serde::{Deserialize, Serialize};
use tracing::info;

use poolscale_autoscale::Autoscaler;
use poolscale_core::{ScaleResult, ScalerConfig, TickReport, WorkloadKind};

use crate::error::SimError;
use crate::fleet::SimulatedFleet;
use crate::trace::Trace;

/// Per-kind outcome of a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSummary {
    pub kind: WorkloadKind,
    pub final_pool: usize,
    pub peak_pool: usize,
    pub created: u64,
    pub destroyed: u64,
    pub jobs_submitted: u64,
    pub jobs_completed: u64,
    pub backlog: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub ticks: u64,
    pub simulated_secs: u64,
    pub outstanding_jobs: u64,
    pub kinds: Vec<KindSummary>,
}

/// A deterministic, faster-than-real-time control loop.
pub struct Simulation {
    fleet: SimulatedFleet,
    scaler: Autoscaler,
    reports: Vec<TickReport>,
}

impl Simulation {
    /// Build a fleet for `trace` and an autoscaler for `config`.
    pub fn new(config: ScalerConfig, trace: &Trace) -> Result<Self, SimError> {
        config.validate()?;
        let mut fleet = SimulatedFleet::new(&config)?;
        fleet.load_trace(trace)?;
        Ok(Self {
            fleet,
            scaler: Autoscaler::new(config),
            reports: Vec::new(),
        })
    }

    /// Advance one tick: the fleet does one interval of work, then the
    /// autoscaler decides. The report is also kept in `reports()`.
    pub fn step(&mut self) -> ScaleResult<TickReport> {
        let now = (self.fleet.current_tick() + 1) * self.fleet.tick_secs();
        let report = self.scaler.tick(now, &mut self.fleet)?;
        self.reports.push(report.clone());
        Ok(report)
    }

    /// Run `ticks` ticks and summarize.
    pub fn run(&mut self, ticks: u64) -> ScaleResult<SimulationSummary> {
        for _ in 0..ticks {
            self.step()?;
        }
        let summary = self.summary();
        info!(
            ticks = summary.ticks,
            outstanding = summary.outstanding_jobs,
            "simulation finished"
        );
        Ok(summary)
    }

    pub fn summary(&self) -> SimulationSummary {
        self.fleet.summary()
    }

    pub fn reports(&self) -> &[TickReport] {
        &self.reports
    }

    pub fn fleet(&self) -> &SimulatedFleet {
        &self.fleet
    }

    pub fn scaler(&self) -> &Autoscaler {
        &self.scaler
    }

    /// Split into the parts `Autoscaler::run` needs.
    pub fn into_parts(self) -> (Autoscaler, SimulatedFleet) {
        (self.scaler, self.fleet)
    }
}

impl SimulatedFleet {
    /// Summarize the fleet as it stands after the ticks simulated so far.
    pub fn summary(&self) -> SimulationSummary {
        let kinds = self
            .pool_sizes()
            .into_iter()
            .map(|(kind, final_pool)| {
                let stats = self.stats(&kind).cloned().unwrap_or_default();
                KindSummary {
                    backlog: self.backlog_len(&kind),
                    kind,
                    final_pool,
                    peak_pool: stats.peak_pool,
                    created: stats.created,
                    destroyed: stats.destroyed,
                    jobs_submitted: stats.jobs_submitted,
                    jobs_completed: stats.jobs_completed,
                }
            })
            .collect();

        SimulationSummary {
            ticks: self.current_tick(),
            simulated_secs: self.current_tick() * self.tick_secs(),
            outstanding_jobs: self.outstanding_jobs(),
            kinds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::JobSpec;
    use poolscale_core::KindOutcome;

    fn batch() -> WorkloadKind {
        WorkloadKind::from("batch")
    }

    #[test]
    fn idle_kind_cycles_between_cold_start_and_retirement() {
        let trace = Trace {
            kinds: vec![batch()],
            ..Trace::default()
        };
        let mut sim = Simulation::new(ScalerConfig::default(), &trace).unwrap();

        // Tick 1 creates the first instance.
        let report = sim.step().unwrap();
        assert_eq!(report.decision_for(&batch()).unwrap().outcome, KindOutcome::ColdStart);

        // Ticks 2..=30 are idle ticks 1..=29.
        for idle in 1..=29 {
            let report = sim.step().unwrap();
            assert_eq!(
                report.decision_for(&batch()).unwrap().outcome,
                KindOutcome::GracePeriod { idle_ticks: idle }
            );
        }

        let report = sim.step().unwrap();
        assert!(matches!(
            report.decision_for(&batch()).unwrap().outcome,
            KindOutcome::Retired { .. }
        ));
        assert_eq!(sim.fleet().pool_size(&batch()), 0);

        let report = sim.step().unwrap();
        assert_eq!(report.decision_for(&batch()).unwrap().outcome, KindOutcome::ColdStart);
        assert_eq!(sim.fleet().pool_size(&batch()), 1);
    }

    #[test]
    fn sustained_load_grows_the_pool() {
        let trace = Trace::from_jobs(vec![JobSpec::new("batch", 1, "2h").times(8)]);
        let mut sim = Simulation::new(ScalerConfig::default(), &trace).unwrap();

        // 1 -> 2 -> 4 -> 8 -> 15 while every instance stays saturated.
        let summary = sim.run(5).unwrap();
        let kind = &summary.kinds[0];
        assert_eq!(kind.peak_pool, 15);
        assert_eq!(kind.destroyed, 0);
        assert_eq!(kind.jobs_submitted, 8);
        assert_eq!(kind.backlog, 0);
        assert_eq!(summary.ticks, 5);
        assert_eq!(summary.simulated_secs, 600);
    }

    #[test]
    fn drained_pool_shrinks_back() {
        let trace = Trace::from_jobs(vec![JobSpec::new("batch", 1, "20m").times(6)]);
        let mut sim = Simulation::new(ScalerConfig::default(), &trace).unwrap();

        let summary = sim.run(240).unwrap();
        let kind = &summary.kinds[0];
        assert_eq!(kind.jobs_completed, 6);
        assert_eq!(summary.outstanding_jobs, 0);
        assert!(kind.destroyed > 0);
        assert!(kind.final_pool <= 1);
    }

    #[test]
    fn reports_are_kept_in_order() {
        let mut sim = Simulation::new(ScalerConfig::default(), &Trace::default()).unwrap();
        sim.run(3).unwrap();
        let ticks: Vec<u64> = sim.reports().iter().map(|r| r.tick).collect();
        assert_eq!(ticks, vec![1, 2, 3]);
        assert_eq!(sim.reports()[2].now, 360);
    }

    #[test]
    fn step_returns_the_report_it_keeps() {
        let mut sim = Simulation::new(ScalerConfig::default(), &Trace::default()).unwrap();
        let first = sim.step().unwrap();
        let second = sim.step().unwrap();
        assert_eq!(sim.reports(), &[first, second][..]);
        assert_eq!(sim.reports()[1].tick, 2);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ScalerConfig {
            idle_grace_ticks: 0,
            ..ScalerConfig::default()
        };
        assert!(matches!(
            Simulation::new(config, &Trace::default()),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn summary_serializes() {
        let trace = Trace::from_jobs(vec![JobSpec::new("web", 1, "5m")]);
        let mut sim = Simulation::new(ScalerConfig::default(), &trace).unwrap();
        let summary = sim.run(2).unwrap();
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"kind\":\"web\""));
    }
}
