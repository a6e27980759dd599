//! Listing Harvester: a resumable directory-site crawler
//!
//! This crate walks a business directory hierarchically (category → subcategory →
//! paginated result lists), extracts structured business records, appends them to
//! a record sink and checkpoints per-task progress so interrupted runs resume where
//! they left off.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Listing Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Root discovery failed; nothing can be dispatched
    #[error("Setup failed: {0}")]
    Setup(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Task {task_id} failed: {reason}")]
    TaskFailed { task_id: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Sink error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("Crawl interrupted")]
    Interrupted,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector for '{name}': {selector}")]
    InvalidSelector { name: String, selector: String },
}

/// Errors raised by a page fetcher
#[derive(Debug, Error)]
pub enum FetchError {
    /// Timeout, transport failure or a server-side status; retryable
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// A fresh fetch context could not be acquired
    #[error("Failed to open fetch context: {0}")]
    Context(String),

    #[error("Extraction failed on {url}: {source}")]
    Extraction {
        url: String,
        #[source]
        source: ExtractionError,
    },
}

impl FetchError {
    /// Returns true if another navigation attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Navigation { .. })
    }
}

/// Errors raised while extracting data from a loaded page
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Results did not appear within {0:?}")]
    ResultsTimeout(Duration),

    #[error("Element not found: {0}")]
    MissingElement(String),

    #[error("Failed to read page body: {0}")]
    Body(String),
}

/// Result type alias for Listing Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{BusinessRecord, Category, ProgressState, SubCategory, Task};
