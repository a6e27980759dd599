//! Record sink trait and error type

use crate::state::BusinessRecord;
use thiserror::Error;

/// Errors that can occur while appending records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write records: {0}")]
    Write(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sink lock poisoned")]
    Poisoned,
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Durable destination for extracted records
///
/// Appends from different tasks may interleave; one call's records are written
/// together and in order.
pub trait RecordSink: Send + Sync {
    fn append(&self, records: &[BusinessRecord]) -> SinkResult<()>;
}
