//! Consecutive idle tick counting for sole instances.

use std::collections::{HashMap, HashSet};

use poolscale_core::InstanceId;

/// Counts how many ticks in a row a sole instance has been seen idle.
///
/// Keyed by `InstanceId`, never by handle. An entry only lives while its
/// instance is the sole member of its pool and keeps being observed idle;
/// every other transition removes it.
#[derive(Debug, Default)]
pub struct IdleHysteresisTracker {
    idle_ticks: HashMap<InstanceId, u32>,
}

impl IdleHysteresisTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more idle tick and return the new count (starts at 1).
    pub fn observe_idle(&mut self, instance: InstanceId) -> u32 {
        let count = self.idle_ticks.entry(instance).or_insert(0);
        *count += 1;
        *count
    }

    /// Forget `instance`. No-op if it has no entry.
    pub fn clear(&mut self, instance: InstanceId) {
        self.idle_ticks.remove(&instance);
    }

    pub fn get(&self, instance: InstanceId) -> Option<u32> {
        self.idle_ticks.get(&instance).copied()
    }

    /// Drop every entry not in `observed`.
    pub fn retain_observed(&mut self, observed: &HashSet<InstanceId>) {
        self.idle_ticks.retain(|id, _| observed.contains(id));
    }

    pub fn len(&self) -> usize {
        self.idle_ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idle_ticks.is_empty()
    }
}
