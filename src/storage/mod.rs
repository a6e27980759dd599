//! Storage module for persisting crawl progress
//!
//! This module handles the durable checkpoint of task outcomes:
//! - The `ProgressStore` trait and its JSON file implementation
//! - Atomic snapshot writes so readers never see a partial file
//! - The `ProgressTracker`, which serializes updates from concurrent tasks

mod json;
mod tracker;
mod traits;

pub use json::JsonProgressStore;
pub use tracker::ProgressTracker;
pub use traits::{is_completed, ProgressStore, StorageError, StorageResult};
