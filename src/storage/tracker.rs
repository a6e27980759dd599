//! Serialized access to the shared progress state
//!
//! Concurrent tasks never touch the checkpoint directly. Each outcome is applied
//! to the single in-memory `ProgressState` under a lock and the full snapshot is
//! flushed before the lock is released, so sibling updates cannot be lost.

use crate::state::ProgressState;
use crate::storage::traits::{ProgressStore, StorageResult};
use tokio::sync::Mutex;

pub struct ProgressTracker<S: ProgressStore> {
    store: S,
    state: Mutex<ProgressState>,
}

impl<S: ProgressStore> ProgressTracker<S> {
    /// Loads the persisted state once and takes ownership of the store
    pub fn open(store: S) -> Self {
        let state = store.load();
        tracing::debug!(
            "Loaded progress: {} completed, {} failed",
            state.completed.len(),
            state.failed.len()
        );
        Self {
            store,
            state: Mutex::new(state),
        }
    }

    /// Returns a copy of the current state
    pub async fn snapshot(&self) -> ProgressState {
        self.state.lock().await.clone()
    }

    pub async fn is_completed(&self, task_id: &str) -> bool {
        self.state.lock().await.is_completed(task_id)
    }

    // The store writes synchronously while the lock is held. Siblings wait for
    // the flush, which keeps the file in step with the in-memory state.

    /// Marks the task completed and persists the snapshot
    pub async fn record_completed(&self, task_id: &str) -> StorageResult<()> {
        let mut state = self.state.lock().await;
        state.mark_completed(task_id);
        self.store.save(&mut state)
    }

    /// Marks the task failed and persists the snapshot
    pub async fn record_failed(&self, task_id: &str) -> StorageResult<()> {
        let mut state = self.state.lock().await;
        state.mark_failed(task_id);
        self.store.save(&mut state)
    }
}
