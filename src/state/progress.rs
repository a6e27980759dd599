/// Persisted crawl progress: which tasks reached a terminal outcome.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Checkpoint of task outcomes across runs
///
/// `failed` is advisory: a task listed there is retried on the next run and
/// moves to `completed` once it succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    #[serde(default)]
    pub completed: BTreeSet<String>,

    #[serde(default)]
    pub failed: BTreeSet<String>,

    /// Number of runs in which each task ended as failed
    #[serde(default)]
    pub failures: BTreeMap<String, u32>,

    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
}

impl ProgressState {
    /// Creates an empty progress state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self, task_id: &str) -> bool {
        self.completed.contains(task_id)
    }

    pub fn is_failed(&self, task_id: &str) -> bool {
        self.failed.contains(task_id)
    }

    /// Number of runs in which the task failed
    pub fn failure_count(&self, task_id: &str) -> u32 {
        self.failures.get(task_id).copied().unwrap_or(0)
    }

    /// Returns true if the task failed in at least `cap` runs
    pub fn is_exhausted(&self, task_id: &str, cap: Option<u32>) -> bool {
        match cap {
            Some(cap) => !self.is_completed(task_id) && self.failure_count(task_id) >= cap,
            None => false,
        }
    }

    /// Records a successful outcome, clearing any earlier failure
    pub fn mark_completed(&mut self, task_id: &str) {
        self.completed.insert(task_id.to_string());
        self.failed.remove(task_id);
        self.failures.remove(task_id);
    }

    /// Records a failed outcome and bumps the task's failure counter
    pub fn mark_failed(&mut self, task_id: &str) {
        self.failed.insert(task_id.to_string());
        *self.failures.entry(task_id.to_string()).or_insert(0) += 1;
    }
}
