//! Storage traits and error types
//!
//! This module defines the trait interface for progress storage backends and
//! associated error types.

use crate::state::ProgressState;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable record of task outcomes
///
/// Implementations only need last-writer-wins semantics; callers that share a
/// store between concurrent tasks go through a `ProgressTracker`.
pub trait ProgressStore: Send + Sync {
    /// Reads the persisted state
    ///
    /// Never fails: a missing or unreadable checkpoint yields an empty state.
    fn load(&self) -> ProgressState;

    /// Overwrites the persisted state, stamping `last_run` with the current time
    ///
    /// A concurrent reader observes either the previous or the new state, never
    /// a partial write.
    fn save(&self, state: &mut ProgressState) -> StorageResult<()>;

    /// Removes the persisted state so the next run starts from scratch
    fn reset(&self) -> StorageResult<()>;
}

/// Returns true if the task reached a successful outcome in `state`
pub fn is_completed(state: &ProgressState, task_id: &str) -> bool {
    state.is_completed(task_id)
}
