//! Page fetching boundary
//!
//! This module defines the capability the crawl core needs from a page loader:
//! - `Browser` hands out fresh fetch contexts, released when dropped
//! - `PageFetcher` navigates to a URL and runs a pure extraction function on the
//!   loaded document
//! - `fetch_with_retries` applies the bounded navigation retry policy
//!
//! `HttpBrowser` is the reqwest-backed implementation used by the binary.

use crate::config::{CrawlerConfig, SiteConfig};
use crate::{ExtractionError, FetchError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::Html;
use std::time::Duration;
use url::Url;

/// Loads pages and extracts structured data from them
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Navigates to `url` and applies `extract` to the loaded document
    ///
    /// `result_wait` bounds how long the fetcher waits for the page's results
    /// once navigation succeeded; exceeding it yields
    /// `ExtractionError::ResultsTimeout`.
    async fn fetch<T, E>(&self, url: &Url, result_wait: Duration, extract: E) -> Result<T, FetchError>
    where
        T: Send,
        E: FnOnce(&Html) -> Result<T, ExtractionError> + Send;
}

/// Source of isolated fetch contexts
#[async_trait]
pub trait Browser: Send + Sync {
    type Page: PageFetcher;

    /// Opens a fresh context; dropping it releases its resources
    async fn new_page(&self) -> Result<Self::Page, FetchError>;
}

/// Navigation retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total navigation attempts, including the first
    pub attempts: u32,

    /// Pause between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            attempts: config.retry_attempts.max(1),
            delay: config.retry_delay(),
        }
    }
}

/// Fetches `url`, retrying navigation failures up to `policy.attempts` times
///
/// Extraction failures are returned immediately; only navigation is retried.
pub async fn fetch_with_retries<P, T, E>(
    page: &P,
    url: &Url,
    policy: &RetryPolicy,
    result_wait: Duration,
    extract: E,
) -> Result<T, FetchError>
where
    P: PageFetcher,
    T: Send,
    E: Fn(&Html) -> Result<T, ExtractionError> + Send + Sync,
{
    let mut attempt = 1;
    loop {
        match page.fetch(url, result_wait, &extract).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.attempts => {
                tracing::warn!(
                    "Failed to navigate to {} (attempt {}/{}): {}",
                    url,
                    attempt,
                    policy.attempts,
                    e
                );
                attempt += 1;
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::warn!("Giving up on {} after {} attempts", url, policy.attempts);
                }
                return Err(e);
            }
        }
    }
}

/// Parses `body` and runs the extractor on it
///
/// The parsed document never outlives this call, so callers stay `Send`.
pub(crate) fn extract_document<T, E>(body: &str, extract: E) -> Result<T, ExtractionError>
where
    E: FnOnce(&Html) -> Result<T, ExtractionError>,
{
    let document = Html::parse_document(body);
    extract(&document)
}

/// Builds fetch contexts backed by reqwest clients
#[derive(Debug, Clone)]
pub struct HttpBrowser {
    user_agent: String,
    page_load_timeout: Duration,
}

impl HttpBrowser {
    pub fn new(site: &SiteConfig, crawler: &CrawlerConfig) -> Self {
        Self {
            user_agent: site.user_agent.clone(),
            page_load_timeout: crawler.page_load_timeout(),
        }
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    type Page = HttpPage;

    async fn new_page(&self) -> Result<HttpPage, FetchError> {
        // Each context gets its own connection pool
        let client = Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.page_load_timeout)
            .connect_timeout(self.page_load_timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| FetchError::Context(e.to_string()))?;

        tracing::trace!("Opened fetch context");
        Ok(HttpPage { client })
    }
}

/// One HTTP fetch context
pub struct HttpPage {
    client: Client,
}

#[async_trait]
impl PageFetcher for HttpPage {
    async fn fetch<T, E>(&self, url: &Url, result_wait: Duration, extract: E) -> Result<T, FetchError>
    where
        T: Send,
        E: FnOnce(&Html) -> Result<T, ExtractionError> + Send,
    {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Navigation {
                url: url.to_string(),
                message: classify_request_error(&e),
            })?;

        // Server-side trouble is worth another attempt; any other status still
        // delivers a document to look for results in.
        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::Navigation {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = match tokio::time::timeout(result_wait, response.text()).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                return Err(FetchError::Extraction {
                    url: url.to_string(),
                    source: ExtractionError::Body(e.to_string()),
                })
            }
            Err(_) => {
                return Err(FetchError::Extraction {
                    url: url.to_string(),
                    source: ExtractionError::ResultsTimeout(result_wait),
                })
            }
        };

        extract_document(&body, extract).map_err(|source| FetchError::Extraction {
            url: url.to_string(),
            source,
        })
    }
}

impl Drop for HttpPage {
    fn drop(&mut self) {
        tracing::trace!("Released fetch context");
    }
}

fn classify_request_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}
