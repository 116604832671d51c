//! Error types for poolscale.

use thiserror::Error;

use crate::types::{InstanceId, WorkloadKind};

/// Result type alias for engine operations.
pub type ScaleResult<T> = Result<T, ScaleError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Precondition violations detected while running a tick.
///
/// The engine trusts its collaborators; any of these means the lifecycle
/// or the utilization source handed it something impossible, and the tick
/// stops instead of acting on it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScaleError {
    #[error("workload kind {0} was listed but has no pool")]
    KindVanished(WorkloadKind),

    #[error("utilization {value} of instance {instance} is outside [0, 1]")]
    UtilizationOutOfRange { instance: InstanceId, value: f64 },

    #[error("instance {instance} reported more than once in a single tick")]
    DuplicateInstance { instance: InstanceId },
}

/// Errors raised while loading or validating a `ScalerConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid duration: {0}")]
    Duration(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
