//! poolscale-sim — a simulated fleet for driving the autoscaler.
//!
//! Replays a job trace against instances that exist only in memory, so
//! scaling behaviour can be exercised deterministically and much faster
//! than real time.
//!
//! # Architecture
//!
//! ```text
//! Simulation
//!   ├── Autoscaler (poolscale-autoscale)
//!   └── SimulatedFleet: InstanceLifecycle + UtilizationSource
//!       ├── per-kind pool + FIFO backlog of waiting jobs
//!       └── per-instance running job + UtilizationWindow
//!
//! report::format_summary() → human-readable summary table
//! ```
//!
//! Each tick the fleet admits jobs whose arrival tick has come and burns
//! one tick interval of work on every instance before the autoscaler looks
//! at it. Free instances pull the next job from their kind's backlog.

pub mod error;
pub mod fleet;
pub mod report;
pub mod simulation;
pub mod trace;
pub mod window;

pub use error::{SimError, TraceError};
pub use fleet::{KindStats, SimulatedFleet};
pub use simulation::{KindSummary, Simulation, SimulationSummary};
pub use trace::{JobSpec, Trace};
pub use window::UtilizationWindow;
