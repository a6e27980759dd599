//! In-memory record sink

use crate::output::traits::{RecordSink, SinkError, SinkResult};
use crate::state::BusinessRecord;
use std::sync::Mutex;

/// Keeps every append call as a separate batch
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Mutex<Vec<Vec<BusinessRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the appended batches in call order
    pub fn batches(&self) -> Vec<Vec<BusinessRecord>> {
        match self.batches.lock() {
            Ok(batches) => batches.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Total number of records appended
    pub fn record_count(&self) -> usize {
        self.batches().iter().map(Vec::len).sum()
    }
}

impl RecordSink for MemorySink {
    fn append(&self, records: &[BusinessRecord]) -> SinkResult<()> {
        let mut batches = self.batches.lock().map_err(|_| SinkError::Poisoned)?;
        batches.push(records.to_vec());
        Ok(())
    }
}
