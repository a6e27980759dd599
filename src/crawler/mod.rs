//! Crawler module for discovering and draining directory listings
//!
//! This module contains the core crawling logic, including:
//! - Page fetching behind the `Browser`/`PageFetcher` boundary, with retries
//! - HTML extraction of the category tree and business listings
//! - Pagination of one task until its result list is exhausted
//! - Batch scheduling with progress checkpointing
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod walker;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{run_crawl, CrawlDriver, HttpCrawlDriver};
pub use fetcher::{fetch_with_retries, Browser, HttpBrowser, HttpPage, PageFetcher, RetryPolicy};
pub use parser::{extract_categories, extract_listings, SiteSelectors};
pub use scheduler::BatchScheduler;
pub use walker::{PaginationWalker, StopReason, WalkOutcome, WalkSettings};
