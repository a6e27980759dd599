//! Output module for extracted records and run summaries
//!
//! This module handles:
//! - The `RecordSink` boundary and its CSV and in-memory implementations
//! - Summaries of task outcomes from the progress checkpoint

mod csv_sink;
mod memory;
pub mod stats;
mod traits;

pub use csv_sink::CsvSink;
pub use memory::MemorySink;
pub use stats::{print_run_report, print_summary, summarize, ProgressSummary, RunReport};
pub use traits::{RecordSink, SinkError, SinkResult};
