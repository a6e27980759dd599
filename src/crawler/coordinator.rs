//! Crawl driver - main crawl orchestration logic
//!
//! This module contains the end-to-end run that coordinates:
//! - Discovering the category tree on the root page
//! - Flattening it into tasks and skipping those already completed
//! - Dispatching tasks through the batch scheduler
//! - Walking each task's result pages inside its own fetch context
//! - Reporting the final progress summary

use crate::config::Config;
use crate::crawler::fetcher::{fetch_with_retries, Browser, HttpBrowser, RetryPolicy};
use crate::crawler::parser::{extract_categories, SiteSelectors};
use crate::crawler::scheduler::BatchScheduler;
use crate::crawler::walker::{PaginationWalker, WalkOutcome, WalkSettings};
use crate::output::{summarize, CsvSink, ProgressSummary, RecordSink, RunReport};
use crate::state::{flatten_tasks, Category, ProgressState, Task};
use crate::storage::{JsonProgressStore, ProgressStore, ProgressTracker};
use crate::HarvestError;
use scraper::Html;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// Drives a complete crawl run
pub struct CrawlDriver<B: Browser, S: RecordSink, P: ProgressStore> {
    config: Config,
    browser: B,
    sink: S,
    tracker: ProgressTracker<P>,
    selectors: SiteSelectors,
    settings: WalkSettings,
}

impl<B: Browser, S: RecordSink, P: ProgressStore> CrawlDriver<B, S, P> {
    /// Creates a driver from its collaborators
    ///
    /// The progress checkpoint is loaded once, here.
    pub fn new(config: Config, browser: B, sink: S, store: P) -> Result<Self, HarvestError> {
        let selectors = SiteSelectors::compile(&config.selectors)?;
        let settings = WalkSettings::from_config(&config.crawler);

        Ok(Self {
            config,
            browser,
            sink,
            tracker: ProgressTracker::open(store),
            selectors,
            settings,
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns a copy of the current progress state
    pub async fn progress(&self) -> ProgressState {
        self.tracker.snapshot().await
    }

    /// Summarizes the progress state
    pub async fn summary(&self) -> ProgressSummary {
        summarize(&self.tracker.snapshot().await)
    }

    /// Fetches the root page and extracts the category tree
    ///
    /// The root page's fetch context is released before this returns. Any
    /// failure here is fatal to the run.
    pub async fn discover_categories(&self) -> Result<Vec<Category>, HarvestError> {
        let root_url = Url::parse(&self.config.site.root_url)
            .map_err(|e| HarvestError::Setup(format!("Invalid root URL: {}", e)))?;

        let page = self
            .browser
            .new_page()
            .await
            .map_err(|e| HarvestError::Setup(e.to_string()))?;

        let categories = fetch_with_retries(
            &page,
            &root_url,
            &RetryPolicy::from_config(&self.config.crawler),
            self.config.crawler.page_load_timeout(),
            |document: &Html| extract_categories(document, &root_url, &self.selectors),
        )
        .await
        .map_err(|e| HarvestError::Setup(format!("Root page discovery failed: {}", e)))?;

        drop(page);

        for (index, category) in categories.iter().enumerate() {
            tracing::info!(
                "{}: {} ({} subcategories)",
                index + 1,
                category.name,
                category.sub_categories.len()
            );
            for (idx, sub_category) in category.sub_categories.iter().enumerate() {
                tracing::debug!("  {}. {} - {}", idx + 1, sub_category.name, sub_category.link);
            }
        }

        Ok(categories)
    }

    /// Discovers the full task list
    pub async fn discover(&self) -> Result<Vec<Task>, HarvestError> {
        let tasks = flatten_tasks(self.discover_categories().await?);
        if tasks.is_empty() {
            return Err(HarvestError::Setup(
                "No subcategories found on the root page".to_string(),
            ));
        }
        Ok(tasks)
    }

    /// Runs the crawl end to end
    ///
    /// Returns an error only when discovery fails; task failures are recorded in
    /// the progress checkpoint and counted in the report.
    pub async fn run(&self) -> Result<RunReport, HarvestError> {
        let tasks = self.discover().await?;
        tracing::info!("Discovered {} tasks, starting to crawl", tasks.len());

        let scheduler = BatchScheduler::new(
            &self.tracker,
            self.config.crawler.concurrency as usize,
            self.config.crawler.batch_cooldown(),
        )
        .with_failure_cap(self.config.crawler.max_task_failures);

        let pages = AtomicUsize::new(0);
        let records = AtomicUsize::new(0);
        let driver = self;
        let tally = (&pages, &records);
        let mut report = scheduler
            .run(tasks, move |task| driver.process_task(task, tally))
            .await;

        report.pages = pages.into_inner();
        report.records = records.into_inner();
        Ok(report)
    }

    /// Walks one task inside a fresh fetch context
    async fn process_task(
        &self,
        task: Task,
        (pages_total, records_total): (&AtomicUsize, &AtomicUsize),
    ) -> Result<(), HarvestError> {
        let task_id = task.id();
        tracing::info!("[{}] Starting {}", task_id, task.sub_category.link);

        let outcome = {
            let page = self.browser.new_page().await?;
            let walker = PaginationWalker::new(&self.selectors, &self.sink, &self.settings);
            walker.walk(&page, &task).await
        };

        match outcome {
            WalkOutcome::Completed {
                pages,
                records,
                reason,
            } => {
                tracing::info!(
                    "[{}] Completed: {} records over {} pages ({:?})",
                    task_id,
                    records,
                    pages,
                    reason
                );
                pages_total.fetch_add(pages as usize, Ordering::Relaxed);
                records_total.fetch_add(records, Ordering::Relaxed);
                Ok(())
            }
            WalkOutcome::Failed { page, reason } => Err(HarvestError::TaskFailed {
                task_id,
                reason: format!("page {}: {}", page, reason),
            }),
        }
    }
}

/// Driver wired with the HTTP browser, CSV sink and JSON progress file
pub type HttpCrawlDriver = CrawlDriver<HttpBrowser, CsvSink, JsonProgressStore>;

impl HttpCrawlDriver {
    /// Builds the production driver from the configuration
    pub fn from_config(config: Config) -> Result<Self, HarvestError> {
        let browser = HttpBrowser::new(&config.site, &config.crawler);
        let sink = CsvSink::open(Path::new(&config.output.output_path))?;
        let store = JsonProgressStore::new(&config.output.progress_path);
        Self::new(config, browser, sink, store)
    }
}

/// Runs the main crawl operation
///
/// # Example
///
/// ```no_run
/// use listing_harvester::config::load_config;
/// use listing_harvester::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let summary = run_crawl(config).await?;
/// println!("{} completed, {} failed", summary.completed, summary.failed.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<ProgressSummary, HarvestError> {
    let driver = HttpCrawlDriver::from_config(config)?;
    driver.run().await?;
    Ok(driver.summary().await)
}
