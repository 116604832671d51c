//! poolscale-metrics — observability for the autoscaler.
//!
//! Folds every `TickReport` into per-kind counters and gauges and renders
//! them in the Prometheus text exposition format.
//!
//! # Architecture
//!
//! ```text
//! ScalerMetrics
//!   ├── record() ← called with each tick report
//!   └── snapshot() → Vec<KindMetrics>
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain
//! ```

pub mod collector;
pub mod prometheus;

pub use collector::{KindMetrics, ScalerMetrics};
pub use prometheus::render_prometheus;
