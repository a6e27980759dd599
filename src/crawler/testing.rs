//! Scripted fetch contexts for unit tests

use crate::crawler::fetcher::{extract_document, Browser, PageFetcher};
use crate::state::{Category, SubCategory, Task};
use crate::url::PAGE_PARAM;
use crate::{ExtractionError, FetchError};
use async_trait::async_trait;
use scraper::Html;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// One scripted response
#[derive(Debug, Clone)]
pub enum Scripted {
    Html(String),
    NavFail,
    ResultsTimeout,
    /// Never answers
    Stall,
}

/// Fetch context answering from per-URL response queues
///
/// Queues are keyed by URL path and page number; an exhausted or missing queue
/// answers with a page without results.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPage {
    responses: Arc<Mutex<HashMap<(String, u32), VecDeque<Scripted>>>>,
    requests: Arc<Mutex<Vec<Url>>>,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts page `page` of the default test path
    pub fn script(self, page: u32, responses: Vec<Scripted>) -> Self {
        self.script_path("/pizza", page, responses)
    }

    pub fn script_path(self, path: &str, page: u32, responses: Vec<Scripted>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((path.to_string(), page), responses.into());
        self
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requests().iter().map(page_of).collect()
    }
}

fn page_of(url: &Url) -> u32 {
    url.query_pairs()
        .find(|(key, _)| key == PAGE_PARAM)
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(0)
}

#[async_trait]
impl PageFetcher for ScriptedPage {
    async fn fetch<T, E>(&self, url: &Url, result_wait: Duration, extract: E) -> Result<T, FetchError>
    where
        T: Send,
        E: FnOnce(&Html) -> Result<T, ExtractionError> + Send,
    {
        self.requests.lock().unwrap().push(url.clone());
        let key = (url.path().to_string(), page_of(url));
        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        match next.unwrap_or_else(|| Scripted::Html(no_results_page())) {
            Scripted::NavFail => Err(FetchError::Navigation {
                url: url.to_string(),
                message: "scripted failure".to_string(),
            }),
            Scripted::Stall => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(FetchError::Navigation {
                    url: url.to_string(),
                    message: "stalled".to_string(),
                })
            }
            Scripted::ResultsTimeout => Err(FetchError::Extraction {
                url: url.to_string(),
                source: ExtractionError::ResultsTimeout(result_wait),
            }),
            Scripted::Html(body) => {
                extract_document(&body, extract).map_err(|source| FetchError::Extraction {
                    url: url.to_string(),
                    source,
                })
            }
        }
    }
}

/// Browser handing out clones of one scripted page
///
/// `opened` counts every context handed out, `live` those not yet dropped.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBrowser {
    pub page: ScriptedPage,
    pub opened: Arc<Mutex<usize>>,
    pub live: Arc<Mutex<usize>>,
}

#[async_trait]
impl Browser for ScriptedBrowser {
    type Page = ScriptedContext;

    async fn new_page(&self) -> Result<ScriptedContext, FetchError> {
        *self.opened.lock().unwrap() += 1;
        *self.live.lock().unwrap() += 1;
        Ok(ScriptedContext {
            page: self.page.clone(),
            live: Arc::clone(&self.live),
        })
    }
}

/// Context handed out by `ScriptedBrowser`; releases its slot on drop
pub struct ScriptedContext {
    page: ScriptedPage,
    live: Arc<Mutex<usize>>,
}

#[async_trait]
impl PageFetcher for ScriptedContext {
    async fn fetch<T, E>(&self, url: &Url, result_wait: Duration, extract: E) -> Result<T, FetchError>
    where
        T: Send,
        E: FnOnce(&Html) -> Result<T, ExtractionError> + Send,
    {
        self.page.fetch(url, result_wait, extract).await
    }
}

impl Drop for ScriptedContext {
    fn drop(&mut self) {
        *self.live.lock().unwrap() -= 1;
    }
}

/// Result page with `count` listings named `<prefix>-<n>`
pub fn listing_page(prefix: &str, count: usize) -> String {
    let listings: String = (0..count)
        .map(|i| {
            format!(
                r#"<div class="result"><a class="business-name"><span>{prefix}-{i}</span></a>
                <div class="phones phone primary">(555) 010-{i:04}</div></div>"#
            )
        })
        .collect();
    format!(r#"<html><body><div class="organic">{listings}</div></body></html>"#)
}

pub fn no_results_page() -> String {
    "<html><body><p>No results found</p></body></html>".to_string()
}

pub fn test_task(category: &str, sub_category: &str) -> Task {
    let sub_category = SubCategory {
        name: sub_category.to_string(),
        link: Url::parse("https://example.com/pizza").unwrap(),
    };
    Task {
        category: Arc::new(Category {
            name: category.to_string(),
            sub_categories: vec![sub_category.clone()],
        }),
        sub_category,
    }
}
