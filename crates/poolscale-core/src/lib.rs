//! poolscale-core — shared vocabulary for the poolscale control loop.
//!
//! Holds the domain types exchanged between the decision engine, the
//! instance lifecycle, and the metrics layer, plus the scaler
//! configuration (`ScalerConfig`, loaded from TOML) and the error types.
//!
//! # Layout
//!
//! ```text
//! types   WorkloadKind, InstanceId, InstanceSnapshot,
//!         ScaleAction, KindOutcome, KindDecision, TickReport
//! config  ScalerConfig, GrowthBand, parse_duration
//! error   ScaleError, ConfigError
//! ```

pub mod config;
pub mod error;
pub mod types;

pub use config::{GrowthBand, ScalerConfig};
pub use error::{ConfigError, ConfigResult, ScaleError, ScaleResult};
pub use types::*;
