//! Run summaries built from the persisted progress state
//!
//! This module provides functionality for summarizing task outcomes and
//! displaying them at the end of a run or on `--stats`.

use crate::state::ProgressState;
use chrono::{DateTime, Utc};

/// Summary of the persisted progress checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSummary {
    /// Number of tasks that completed in any run
    pub completed: usize,

    /// Tasks whose latest outcome was a failure, sorted
    pub failed: Vec<String>,

    /// When the checkpoint was last written
    pub last_run: Option<DateTime<Utc>>,
}

/// Counters collected while a run dispatches tasks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Tasks discovered on the root page
    pub discovered: usize,

    /// Tasks skipped because they already completed
    pub skipped: usize,

    /// Tasks skipped because they failed too many times
    pub exhausted: Vec<String>,

    /// Tasks that completed during this run
    pub succeeded: usize,

    /// Tasks that failed during this run
    pub failed: usize,

    /// Number of batches dispatched
    pub batches: usize,

    /// Result pages fetched by completed tasks
    pub pages: usize,

    /// Records handed to the sink
    pub records: usize,
}

impl RunReport {
    /// Tasks that were actually dispatched
    pub fn dispatched(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Summarizes the progress state
pub fn summarize(state: &ProgressState) -> ProgressSummary {
    ProgressSummary {
        completed: state.completed.len(),
        failed: state.failed.iter().cloned().collect(),
        last_run: state.last_run,
    }
}

/// Prints the progress summary to stdout
pub fn print_summary(summary: &ProgressSummary) {
    println!("=== Harvest Progress ===\n");

    match summary.last_run {
        Some(last_run) => println!("Last run: {}", last_run.to_rfc3339()),
        None => println!("Last run: never"),
    }
    println!("Completed tasks: {}", summary.completed);
    println!("Failed tasks: {}", summary.failed.len());

    if !summary.failed.is_empty() {
        println!("\nFailed task ids (retried on the next run):");
        for task_id in &summary.failed {
            println!("  - {}", task_id);
        }
    }
}

/// Prints the counters of one run to stdout
pub fn print_run_report(report: &RunReport) {
    println!("=== Run Report ===\n");
    println!("  Tasks discovered: {}", report.discovered);
    println!("  Already completed: {}", report.skipped);
    println!("  Dispatched: {} in {} batches", report.dispatched(), report.batches);
    println!("  Succeeded: {}", report.succeeded);
    println!("  Failed: {}", report.failed);
    println!("  Pages fetched: {}", report.pages);
    println!("  Records appended: {}", report.records);

    if !report.exhausted.is_empty() {
        println!("  Not attempted (failure cap reached): {}", report.exhausted.len());
        for task_id in &report.exhausted {
            println!("    - {}", task_id);
        }
    }
    println!();
}
