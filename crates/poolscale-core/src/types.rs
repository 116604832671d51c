//! Domain types shared by the engine, the fleet, and the metrics layer.
//!
//! Instances are referred to by `InstanceId` only. The lifecycle owns the
//! instances themselves; everything here is a per-tick view or a record of
//! what the engine decided.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Identity ──────────────────────────────────────────────────────

/// Name of a class of executable workload. Each kind owns one pool.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkloadKind(String);

impl WorkloadKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkloadKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for WorkloadKind {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Stable identity of a provisioned instance.
///
/// Ids are handed out by the lifecycle and never reused within a process,
/// so a stale id can at worst miss, never alias a newer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vm-{}", self.0)
    }
}

// ── Per-tick view ─────────────────────────────────────────────────

/// What the engine knows about one instance during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceSnapshot {
    pub id: InstanceId,
    /// True if the instance has work running or queued.
    pub busy_or_pending: bool,
    /// Trailing-window busy fraction in [0, 1].
    pub hourly_utilization: f64,
}

impl InstanceSnapshot {
    pub fn new(id: InstanceId, busy_or_pending: bool, hourly_utilization: f64) -> Self {
        Self {
            id,
            busy_or_pending,
            hourly_utilization,
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.busy_or_pending
    }
}

// ── Decisions ─────────────────────────────────────────────────────

/// A side-effecting request the engine issues to the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScaleAction {
    Create { kind: WorkloadKind },
    Destroy { kind: WorkloadKind, instance: InstanceId },
}

/// Which branch of the per-kind procedure was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum KindOutcome {
    /// Empty pool; one instance requested.
    ColdStart,
    /// Sole instance idle, retained while its counter is below the grace limit.
    GracePeriod { idle_ticks: u32 },
    /// Sole instance idle for the full grace period; destroyed.
    Retired { instance: InstanceId },
    /// Idle, underutilized members of a multi-instance pool destroyed.
    Shrunk { destroyed: u32 },
    /// Average utilization fell in a growth band.
    Grew {
        average: f64,
        factor: f64,
        requested: u32,
    },
    /// Average utilization matched no growth band.
    Steady { average: f64 },
}

/// The engine's verdict for one kind in one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindDecision {
    pub kind: WorkloadKind,
    /// Pool size observed at the start of processing this kind.
    pub pool_size: usize,
    pub outcome: KindOutcome,
    pub actions: Vec<ScaleAction>,
}

impl KindDecision {
    pub fn creates(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, ScaleAction::Create { .. }))
            .count()
    }

    pub fn destroys(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, ScaleAction::Destroy { .. }))
            .count()
    }

    /// Pool size once every action of this decision has been carried out.
    pub fn resulting_pool_size(&self) -> usize {
        (self.pool_size + self.creates()).saturating_sub(self.destroys())
    }
}

/// Everything decided during one control-loop tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// 1-based tick sequence number.
    pub tick: u64,
    /// Caller-supplied clock value (unix seconds or simulated seconds).
    pub now: u64,
    pub kinds: Vec<KindDecision>,
    /// Instances carrying an idle counter after the tick.
    pub tracked_idle: usize,
}

impl TickReport {
    pub fn decision_for(&self, kind: &WorkloadKind) -> Option<&KindDecision> {
        self.kinds.iter().find(|d| &d.kind == kind)
    }

    pub fn actions(&self) -> impl Iterator<Item = &ScaleAction> {
        self.kinds.iter().flat_map(|d| d.actions.iter())
    }

    pub fn total_creates(&self) -> usize {
        self.kinds.iter().map(KindDecision::creates).sum()
    }

    pub fn total_destroys(&self) -> usize {
        self.kinds.iter().map(KindDecision::destroys).sum()
    }
}
