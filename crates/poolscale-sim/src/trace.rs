//! Workload trace files.
//!
//! ```toml
//! [[job]]
//! kind = "batch"
//! arrival_tick = 3
//! duration = "10m"
//! count = 4          # optional, defaults to 1
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use poolscale_core::WorkloadKind;
use poolscale_core::config::parse_duration;

use crate::error::TraceError;

/// One line of a trace: `count` identical jobs arriving together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    pub kind: WorkloadKind,
    /// Tick (1-based) at which the jobs become visible to the fleet.
    pub arrival_tick: u64,
    /// Run time of each job on an otherwise idle instance.
    pub duration: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

impl JobSpec {
    pub fn new(kind: impl Into<WorkloadKind>, arrival_tick: u64, duration: &str) -> Self {
        Self {
            kind: kind.into(),
            arrival_tick,
            duration: duration.to_string(),
            count: 1,
        }
    }

    pub fn times(mut self, count: u32) -> Self {
        self.count = count;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default, rename = "job")]
    pub jobs: Vec<JobSpec>,
    /// Kinds that exist from the first tick even if no job ever names them.
    #[serde(default)]
    pub kinds: Vec<WorkloadKind>,
}

impl Trace {
    pub fn from_file(path: &Path) -> Result<Self, TraceError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, TraceError> {
        let trace: Trace = toml::from_str(content)?;
        trace.validate()?;
        Ok(trace)
    }

    pub fn from_jobs(jobs: Vec<JobSpec>) -> Self {
        Self {
            jobs,
            kinds: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), TraceError> {
        for (index, job) in self.jobs.iter().enumerate() {
            job_duration_secs(index, job)?;
        }
        Ok(())
    }

    /// Every kind named by the trace, sorted and deduplicated.
    pub fn all_kinds(&self) -> Vec<WorkloadKind> {
        let kinds: BTreeSet<WorkloadKind> = self
            .kinds
            .iter()
            .cloned()
            .chain(self.jobs.iter().map(|j| j.kind.clone()))
            .collect();
        kinds.into_iter().collect()
    }

    /// Total number of individual jobs.
    pub fn job_count(&self) -> u64 {
        self.jobs.iter().map(|j| u64::from(j.count)).sum()
    }
}

/// Duration of one job of `job`, rejecting zero-length jobs.
pub(crate) fn job_duration_secs(index: usize, job: &JobSpec) -> Result<u64, TraceError> {
    let secs = parse_duration(&job.duration)
        .map_err(|e| TraceError::InvalidJob {
            index,
            reason: e.to_string(),
        })?
        .as_secs();
    if secs == 0 {
        return Err(TraceError::InvalidJob {
            index,
            reason: "duration must be non-zero".to_string(),
        });
    }
    Ok(secs)
}
