//! poolscale-autoscale — utilization-driven pool sizing per workload kind.
//!
//! Once per tick the `Autoscaler` walks every workload kind known to the
//! instance lifecycle and decides which instances to keep, which to
//! destroy, and how many to add. Requests go back to the lifecycle; the
//! autoscaler never provisions anything itself.
//!
//! # Scaling Algorithm
//!
//! ```text
//! |pool| == 0:
//!     create 1
//!
//! |pool| == 1 and idle:
//!     idle_ticks += 1
//!     if idle_ticks >= idle_grace_ticks: destroy it (recreated next tick)
//!     (never grow an idle sole instance)
//!
//! |pool| >= 2:
//!     destroy every idle member with utilization < destroy threshold,
//!         keeping the busiest one if all of them qualify
//!     if anything was destroyed: stop here for this tick
//!
//! grow (busy sole instance, or multi-instance pool that did not shrink):
//!     avg    = mean(utilization)
//!     factor = first band with lower < avg < upper
//!     create ceil(|pool| * factor) - |pool|
//! ```
//!
//! The idle counter is what keeps a lone instance from flapping: a kind is
//! only emptied after `idle_grace_ticks` consecutive idle observations
//! (one hour at the default 2-minute tick).

pub mod fleet;
pub mod hysteresis;
pub mod scaler;

pub use fleet::{InstanceLifecycle, UtilizationSource};
pub use hysteresis::IdleHysteresisTracker;
pub use scaler::Autoscaler;
