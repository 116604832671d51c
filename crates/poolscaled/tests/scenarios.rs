//! End-to-end scenarios.
//!
//! Drive the autoscaler against the simulated fleet the same way the
//! `simulate` and `run` subcommands do, entirely in-process.

use std::path::PathBuf;
use std::time::Duration;

use poolscale_core::{KindOutcome, ScalerConfig, TickReport, WorkloadKind};
use poolscale_metrics::{ScalerMetrics, render_prometheus};
use poolscale_sim::{Simulation, Trace};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

fn demo_simulation() -> Simulation {
    let config = ScalerConfig::from_file(&demo("poolscale.toml")).unwrap();
    let trace = Trace::from_file(&demo("trace.toml")).unwrap();
    Simulation::new(config, &trace).unwrap()
}

#[test]
fn demo_config_matches_defaults() {
    let config = ScalerConfig::from_file(&demo("poolscale.toml")).unwrap();
    assert_eq!(config, ScalerConfig::default());
}

#[test]
fn demo_day_completes_every_job() {
    let mut sim = demo_simulation();
    let summary = sim.run(720).unwrap();

    assert_eq!(summary.ticks, 720);
    assert_eq!(summary.simulated_secs, 24 * 3600);
    assert_eq!(summary.outstanding_jobs, 0);

    let submitted: u64 = summary.kinds.iter().map(|k| k.jobs_submitted).sum();
    let completed: u64 = summary.kinds.iter().map(|k| k.jobs_completed).sum();
    assert_eq!(submitted, 35);
    assert_eq!(completed, 35);

    let batch = summary
        .kinds
        .iter()
        .find(|k| k.kind.as_str() == "batch")
        .unwrap();
    assert!(batch.peak_pool > 1, "batch never grew: {batch:?}");

    // Never used: only cold starts and retirements.
    let reports = summary
        .kinds
        .iter()
        .find(|k| k.kind.as_str() == "reports")
        .unwrap();
    assert_eq!(reports.jobs_submitted, 0);
    assert_eq!(reports.peak_pool, 1);
    assert!(reports.destroyed >= 1);
}

#[test]
fn every_tick_respects_the_pool_invariants() {
    let mut sim = demo_simulation();
    sim.run(720).unwrap();

    for report in sim.reports() {
        for decision in &report.kinds {
            if decision.pool_size >= 2 {
                assert!(
                    decision.resulting_pool_size() >= 1,
                    "tick {} emptied {} outside the grace path",
                    report.tick,
                    decision.kind
                );
            }
            match decision.outcome {
                KindOutcome::Shrunk { destroyed } => {
                    assert_eq!(decision.creates(), 0);
                    assert_eq!(decision.destroys(), destroyed as usize);
                }
                KindOutcome::GracePeriod { idle_ticks } => {
                    assert!(idle_ticks < 30);
                    assert!(decision.actions.is_empty());
                }
                KindOutcome::Retired { .. } => assert_eq!(decision.pool_size, 1),
                KindOutcome::ColdStart => assert_eq!(decision.pool_size, 0),
                KindOutcome::Grew { requested, .. } => {
                    assert!(requested >= 1);
                    assert_eq!(decision.destroys(), 0);
                }
                KindOutcome::Steady { .. } => assert!(decision.actions.is_empty()),
            }
        }
        assert!(report.tracked_idle <= report.kinds.len());
    }
}

#[test]
fn config_and_trace_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("poolscale.toml");
    let trace_path = dir.path().join("trace.toml");
    std::fs::write(&config_path, "idle_grace_ticks = 5\n").unwrap();
    std::fs::write(&trace_path, "kinds = [\"idle\"]\n").unwrap();

    let config = ScalerConfig::from_file(&config_path).unwrap();
    let trace = Trace::from_file(&trace_path).unwrap();
    let mut sim = Simulation::new(config, &trace).unwrap();
    sim.run(7).unwrap();

    let idle = WorkloadKind::from("idle");
    let outcomes: Vec<&KindOutcome> = sim
        .reports()
        .iter()
        .map(|r| &r.decision_for(&idle).unwrap().outcome)
        .collect();
    assert_eq!(*outcomes[0], KindOutcome::ColdStart);
    assert_eq!(*outcomes[4], KindOutcome::GracePeriod { idle_ticks: 4 });
    assert!(matches!(outcomes[5], KindOutcome::Retired { .. }));
    assert_eq!(*outcomes[6], KindOutcome::ColdStart);
}

#[test]
fn metrics_follow_the_simulation() {
    let mut sim = demo_simulation();
    let summary = sim.run(120).unwrap();

    let metrics = ScalerMetrics::new();
    for report in sim.reports() {
        metrics.record(report);
    }
    assert_eq!(metrics.ticks(), 120);

    for (kind, summary) in metrics.snapshot().iter().zip(&summary.kinds) {
        assert_eq!(kind.kind, summary.kind);
        assert_eq!(kind.pool_size, summary.final_pool);
        assert_eq!(kind.instances_created, summary.created);
        assert_eq!(kind.instances_destroyed, summary.destroyed);
    }

    let text = render_prometheus(&metrics.snapshot(), metrics.ticks());
    assert!(text.contains("poolscale_ticks_total 120"));
    assert!(text.contains("poolscale_pool_size{kind=\"batch\"}"));
    assert!(text.contains("poolscale_retirements_total{kind=\"reports\"}"));
}

#[tokio::test(start_paused = true)]
async fn paced_loop_drives_the_simulated_fleet() {
    let trace = Trace {
        kinds: vec![WorkloadKind::from("batch")],
        ..Trace::default()
    };
    let (scaler, mut fleet) = Simulation::new(ScalerConfig::default(), &trace)
        .unwrap()
        .into_parts();

    let metrics = ScalerMetrics::new();
    let recorder = metrics.clone();
    let mut scaler =
        scaler.with_report_fn(Box::new(move |report: &TickReport| recorder.record(report)));
    let (tx, rx) = tokio::sync::watch::channel(false);

    let stopper = async move {
        tokio::time::sleep(Duration::from_secs(5 * 120 + 60)).await;
        tx.send(true).unwrap();
    };
    tokio::join!(scaler.run(&mut fleet, Duration::from_secs(120), rx), stopper);

    assert_eq!(metrics.ticks(), 5);
    assert_eq!(fleet.current_tick(), 5);
    assert_eq!(fleet.pool_size(&WorkloadKind::from("batch")), 1);
    // Tick 1 created the instance; ticks 2..=5 counted it idle.
    assert_eq!(metrics.snapshot()[0].idle_ticks, 4);
}
