//! Prometheus text exposition format.

use crate::collector::KindMetrics;

/// Render per-kind metrics plus the tick counter in Prometheus text format.
///
/// Produces GAUGE and COUNTER metrics with `kind` labels.
pub fn render_prometheus(kinds: &[KindMetrics], ticks: u64) -> String {
    let mut out = String::new();

    out.push_str("# HELP poolscale_ticks_total Control-loop ticks completed.\n");
    out.push_str("# TYPE poolscale_ticks_total counter\n");
    out.push_str(&format!("poolscale_ticks_total {ticks}\n"));

    out.push_str("# HELP poolscale_pool_size Instances per kind after the latest tick.\n");
    out.push_str("# TYPE poolscale_pool_size gauge\n");
    for k in kinds {
        out.push_str(&format!(
            "poolscale_pool_size{{kind=\"{}\"}} {}\n",
            k.kind, k.pool_size
        ));
    }

    out.push_str("# HELP poolscale_average_utilization Mean hourly utilization at the latest growth check (0.0-1.0).\n");
    out.push_str("# TYPE poolscale_average_utilization gauge\n");
    for k in kinds {
        out.push_str(&format!(
            "poolscale_average_utilization{{kind=\"{}\"}} {:.4}\n",
            k.kind, k.average_utilization
        ));
    }

    out.push_str("# HELP poolscale_idle_ticks Consecutive idle ticks of the sole instance.\n");
    out.push_str("# TYPE poolscale_idle_ticks gauge\n");
    for k in kinds {
        out.push_str(&format!(
            "poolscale_idle_ticks{{kind=\"{}\"}} {}\n",
            k.kind, k.idle_ticks
        ));
    }

    out.push_str("# HELP poolscale_instances_created_total Instance creations requested.\n");
    out.push_str("# TYPE poolscale_instances_created_total counter\n");
    for k in kinds {
        out.push_str(&format!(
            "poolscale_instances_created_total{{kind=\"{}\"}} {}\n",
            k.kind, k.instances_created
        ));
    }

    out.push_str("# HELP poolscale_instances_destroyed_total Instance destructions requested.\n");
    out.push_str("# TYPE poolscale_instances_destroyed_total counter\n");
    for k in kinds {
        out.push_str(&format!(
            "poolscale_instances_destroyed_total{{kind=\"{}\"}} {}\n",
            k.kind, k.instances_destroyed
        ));
    }

    out.push_str("# HELP poolscale_retirements_total Sole instances destroyed after the idle grace period.\n");
    out.push_str("# TYPE poolscale_retirements_total counter\n");
    for k in kinds {
        out.push_str(&format!(
            "poolscale_retirements_total{{kind=\"{}\"}} {}\n",
            k.kind, k.retirements
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolscale_core::WorkloadKind;

    fn test_metrics(kind: &str) -> KindMetrics {
        KindMetrics {
            kind: WorkloadKind::from(kind),
            pool_size: 4,
            instances_created: 9,
            instances_destroyed: 5,
            retirements: 1,
            average_utilization: 0.7375,
            idle_ticks: 0,
        }
    }

    #[test]
    fn render_empty() {
        let output = render_prometheus(&[], 0);
        assert!(output.contains("# HELP poolscale_pool_size"));
        assert!(output.contains("# TYPE poolscale_pool_size gauge"));
        assert!(output.contains("poolscale_ticks_total 0\n"));
    }

    #[test]
    fn render_single_kind() {
        let output = render_prometheus(&[test_metrics("batch")], 12);

        assert!(output.contains("poolscale_ticks_total 12"));
        assert!(output.contains("poolscale_pool_size{kind=\"batch\"} 4"));
        assert!(output.contains("poolscale_average_utilization{kind=\"batch\"} 0.7375"));
        assert!(output.contains("poolscale_idle_ticks{kind=\"batch\"} 0"));
        assert!(output.contains("poolscale_instances_created_total{kind=\"batch\"} 9"));
        assert!(output.contains("poolscale_instances_destroyed_total{kind=\"batch\"} 5"));
        assert!(output.contains("poolscale_retirements_total{kind=\"batch\"} 1"));
    }

    #[test]
    fn render_multiple_kinds() {
        let output = render_prometheus(&[test_metrics("batch"), test_metrics("web")], 1);
        assert!(output.contains("kind=\"batch\""));
        assert!(output.contains("kind=\"web\""));
    }

    #[test]
    fn render_format_is_prometheus_compatible() {
        let output = render_prometheus(&[test_metrics("test")], 3);

        // Every sample line is `name[{labels}] value`.
        for line in output.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (name, value) = line.rsplit_once(' ').expect("sample has a value");
            assert!(name.starts_with("poolscale_"), "bad name: {line}");
            assert!(value.parse::<f64>().is_ok(), "bad value: {line}");
            if !name.starts_with("poolscale_ticks_total") {
                assert!(
                    name.contains('{') && name.ends_with('}'),
                    "line should have labels: {line}"
                );
            }
        }
    }
}
