//! Pagination walker: drains one task's paginated result list
//!
//! Pages are requested in strictly increasing order starting at 1. The walk
//! stops normally when a page has no results container, repeats the previous
//! page verbatim, or carries no listings. A page whose navigation keeps failing
//! past the retry budget fails the whole task.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{fetch_with_retries, PageFetcher, RetryPolicy};
use crate::crawler::parser::{extract_listings, SiteSelectors};
use crate::output::RecordSink;
use crate::state::{same_page, BusinessRecord, Task};
use crate::url::page_url;
use crate::{ExtractionError, FetchError};
use rand::Rng;
use scraper::Html;
use std::time::Duration;

/// Timing and retry parameters for walking result pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkSettings {
    pub retry: RetryPolicy,

    /// Bounded wait for a page's results
    pub result_wait: Duration,

    /// Inclusive range of the randomized delay between pages
    pub page_delay: (Duration, Duration),
}

impl WalkSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            retry: RetryPolicy::from_config(config),
            result_wait: config.result_wait_timeout(),
            page_delay: config.page_delay(),
        }
    }
}

/// Why a walk stopped normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The page had no results container
    NoResults,
    /// The page repeated the previous page
    DuplicatePage,
    /// The results container held no listings
    EmptyPage,
}

/// Terminal outcome of walking one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkOutcome {
    Completed {
        /// Pages whose records were handed to the sink
        pages: u32,
        /// Records the sink accepted
        records: usize,
        reason: StopReason,
    },
    Failed {
        /// Page on which the walk gave up
        page: u32,
        reason: String,
    },
}

impl WalkOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

pub struct PaginationWalker<'a, S: RecordSink> {
    selectors: &'a SiteSelectors,
    sink: &'a S,
    settings: &'a WalkSettings,
}

impl<'a, S: RecordSink> PaginationWalker<'a, S> {
    pub fn new(selectors: &'a SiteSelectors, sink: &'a S, settings: &'a WalkSettings) -> Self {
        Self {
            selectors,
            sink,
            settings,
        }
    }

    /// Walks every result page of `task` using the given fetch context
    pub async fn walk<P: PageFetcher>(&self, page: &P, task: &Task) -> WalkOutcome {
        let task_id = task.id();
        let category = task.category.name.as_str();
        let sub_category = task.sub_category.name.as_str();

        let mut page_number: u32 = 1;
        let mut previous: Vec<BusinessRecord> = Vec::new();
        let mut records = 0;

        loop {
            let url = page_url(&task.sub_category.link, page_number);
            let extracted = fetch_with_retries(
                page,
                &url,
                &self.settings.retry,
                self.settings.result_wait,
                |document: &Html| {
                    Ok(extract_listings(
                        document,
                        &url,
                        self.selectors,
                        category,
                        sub_category,
                    ))
                },
            )
            .await;

            let completed = |reason| WalkOutcome::Completed {
                pages: page_number - 1,
                records,
                reason,
            };

            let listings = match extracted {
                Ok(Some(listings)) => listings,
                Ok(None)
                | Err(FetchError::Extraction {
                    source: ExtractionError::ResultsTimeout(_),
                    ..
                }) => {
                    tracing::debug!("[{}] No results on page {}", task_id, page_number);
                    return completed(StopReason::NoResults);
                }
                Err(e) => {
                    tracing::warn!("[{}] Stopping on page {}: {}", task_id, page_number, e);
                    return WalkOutcome::Failed {
                        page: page_number,
                        reason: e.to_string(),
                    };
                }
            };

            tracing::debug!(
                "[{}] Page {} fetched ({} records)",
                task_id,
                page_number,
                listings.len()
            );

            if !previous.is_empty() && same_page(&listings, &previous) {
                tracing::debug!(
                    "[{}] Page {} repeats page {}, stopping",
                    task_id,
                    page_number,
                    page_number - 1
                );
                return completed(StopReason::DuplicatePage);
            }

            if listings.is_empty() {
                return completed(StopReason::EmptyPage);
            }

            match self.sink.append(&listings) {
                Ok(()) => records += listings.len(),
                Err(e) => tracing::error!(
                    "[{}] Failed to write {} records from page {}: {}",
                    task_id,
                    listings.len(),
                    page_number,
                    e
                ),
            }

            previous = listings;
            page_number += 1;

            let delay = random_delay(self.settings.page_delay);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Draws a delay uniformly from the inclusive `[min, max]` range
fn random_delay((min, max): (Duration, Duration)) -> Duration {
    if max <= min {
        return min;
    }
    let millis = rand::rng().random_range(min.as_millis() as u64..=max.as_millis() as u64);
    Duration::from_millis(millis)
}
