//! Batch scheduler for dispatching crawl tasks
//!
//! This module handles:
//! - Filtering out tasks that already completed in an earlier run
//! - Skipping tasks that reached the cross-run failure cap
//! - Running fixed-size batches concurrently with a barrier between batches
//! - Recording every task outcome in the progress checkpoint as it happens

use crate::output::RunReport;
use crate::state::Task;
use crate::storage::{is_completed, ProgressStore, ProgressTracker};
use crate::HarvestError;
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;

/// Dispatches tasks in fixed-size concurrent batches
///
/// At most `batch_size` tasks are in flight at any time: every task of a batch
/// reaches a terminal outcome before the next batch starts.
pub struct BatchScheduler<'a, S: ProgressStore> {
    tracker: &'a ProgressTracker<S>,
    batch_size: usize,
    cooldown: Duration,
    max_task_failures: Option<u32>,
}

impl<'a, S: ProgressStore> BatchScheduler<'a, S> {
    pub fn new(tracker: &'a ProgressTracker<S>, batch_size: usize, cooldown: Duration) -> Self {
        Self {
            tracker,
            batch_size: batch_size.max(1),
            cooldown,
            max_task_failures: None,
        }
    }

    /// Skips tasks that failed in at least `cap` runs
    pub fn with_failure_cap(mut self, cap: Option<u32>) -> Self {
        self.max_task_failures = cap;
        self
    }

    /// Runs every pending task through `processor`
    ///
    /// A task error is recorded as a failure and never stops sibling tasks or
    /// later batches.
    pub async fn run<P, Fut>(&self, tasks: Vec<Task>, processor: P) -> RunReport
    where
        P: Fn(Task) -> Fut,
        Fut: Future<Output = Result<(), HarvestError>>,
    {
        let mut report = RunReport {
            discovered: tasks.len(),
            ..RunReport::default()
        };

        let progress = self.tracker.snapshot().await;
        let mut pending = Vec::with_capacity(tasks.len());
        for task in tasks {
            let task_id = task.id();
            if is_completed(&progress, &task_id) {
                report.skipped += 1;
            } else if progress.is_exhausted(&task_id, self.max_task_failures) {
                tracing::warn!(
                    "Skipping {}: failed in {} runs",
                    task_id,
                    progress.failure_count(&task_id)
                );
                report.exhausted.push(task_id);
            } else {
                pending.push(task);
            }
        }

        let batches: Vec<&[Task]> = pending.chunks(self.batch_size).collect();
        report.batches = batches.len();
        tracing::info!(
            "{} tasks pending ({} already completed), {} batches of up to {}",
            pending.len(),
            report.skipped,
            batches.len(),
            self.batch_size
        );

        for (index, batch) in batches.iter().enumerate() {
            tracing::info!(
                "Starting batch {}/{} ({} tasks)",
                index + 1,
                batches.len(),
                batch.len()
            );

            let outcomes = join_all(
                batch
                    .iter()
                    .map(|task| self.run_task(task.clone(), &processor)),
            )
            .await;

            let succeeded = outcomes.iter().filter(|ok| **ok).count();
            report.succeeded += succeeded;
            report.failed += outcomes.len() - succeeded;

            tracing::info!(
                "Finished batch {}/{}: {} succeeded, {} failed",
                index + 1,
                batches.len(),
                succeeded,
                outcomes.len() - succeeded
            );

            if index + 1 < batches.len() && !self.cooldown.is_zero() {
                tracing::debug!("Cooling down for {:?}", self.cooldown);
                tokio::time::sleep(self.cooldown).await;
            }
        }

        report
    }

    /// Runs one task and records its outcome; returns true on success
    async fn run_task<P, Fut>(&self, task: Task, processor: &P) -> bool
    where
        P: Fn(Task) -> Fut,
        Fut: Future<Output = Result<(), HarvestError>>,
    {
        let task_id = task.id();

        match processor(task).await {
            Ok(()) => {
                if let Err(e) = self.tracker.record_completed(&task_id).await {
                    tracing::error!("Failed to persist completion of {}: {}", task_id, e);
                }
                true
            }
            Err(e) => {
                tracing::warn!("Task {} failed: {}", task_id, e);
                if let Err(e) = self.tracker.record_failed(&task_id).await {
                    tracing::error!("Failed to persist failure of {}: {}", task_id, e);
                }
                false
            }
        }
    }
}
