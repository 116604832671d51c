//! Seams between the autoscaler and the infrastructure it drives.

use poolscale_core::{InstanceId, WorkloadKind};

/// Owns the authoritative instance pools and carries out create/destroy
/// requests.
///
/// Requests are fire-and-forget: the autoscaler only assumes a destroyed
/// instance is gone from `pool_for` by the start of the next tick.
pub trait InstanceLifecycle {
    /// Every registered kind, in a stable order.
    fn kinds(&self) -> Vec<WorkloadKind>;

    /// Current pool of `kind`, or `None` if the kind is unknown.
    fn pool_for(&self, kind: &WorkloadKind) -> Option<Vec<InstanceId>>;

    fn request_create(&mut self, kind: &WorkloadKind);

    fn request_destroy(&mut self, kind: &WorkloadKind, instance: InstanceId);

    /// Bring the pool view up to date before a tick reads it.
    fn sync(&mut self, _now: u64) {}
}

/// Per-instance load figures.
pub trait UtilizationSource {
    /// Busy fraction over the trailing window, in [0, 1].
    fn hourly_utilization(&self, instance: InstanceId) -> f64;

    /// True if the instance has work in flight or queued.
    fn is_busy_or_pending(&self, instance: InstanceId) -> bool;
}
