//! State module for the crawl's data model
//!
//! # Components
//!
//! - `Category`, `SubCategory`, `Task`: the work discovered on the root page
//! - `BusinessRecord`: one extracted listing
//! - `ProgressState`: the persisted checkpoint of task outcomes

mod progress;
mod record;
mod task;

// Re-export main types
pub use progress::ProgressState;
pub use record::{same_page, BusinessRecord, NOT_AVAILABLE};
pub use task::{flatten_tasks, task_id, Category, SubCategory, Task};
