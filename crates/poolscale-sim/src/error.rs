//! Simulation error types.

use thiserror::Error;

use poolscale_core::{ConfigError, ScaleError};

/// Errors raised while loading a workload trace.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse trace: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("job {index}: {reason}")]
    InvalidJob { index: usize, reason: String },
}

/// Errors that can stop a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("trace error: {0}")]
    Trace(#[from] TraceError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("scaling error: {0}")]
    Scale(#[from] ScaleError),
}
