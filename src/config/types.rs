use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Listing Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root page listing the categories and their subcategories
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Crawler behavior configuration
///
/// All durations are expressed in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of tasks dispatched together in one batch
    pub concurrency: u32,

    /// Navigation attempts per page before the task is failed
    #[serde(rename = "retry-attempts")]
    pub retry_attempts: u32,

    /// Pause between navigation attempts
    #[serde(rename = "retry-delay", default)]
    pub retry_delay: u64,

    /// Maximum time for a navigation to answer
    #[serde(rename = "page-load-timeout")]
    pub page_load_timeout: u64,

    /// Maximum time to wait for the results of a loaded page
    #[serde(rename = "result-wait-timeout")]
    pub result_wait_timeout: u64,

    /// Randomized delay between result pages, as `[min, max]`
    #[serde(rename = "page-delay")]
    pub page_delay: [u64; 2],

    /// Pause between batches
    #[serde(rename = "batch-cooldown")]
    pub batch_cooldown: u64,

    /// Runs in which a task may fail before it is no longer attempted
    #[serde(rename = "max-task-failures", default)]
    pub max_task_failures: Option<u32>,
}

impl CrawlerConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_millis(self.page_load_timeout)
    }

    pub fn result_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.result_wait_timeout)
    }

    pub fn page_delay(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.page_delay[0]),
            Duration::from_millis(self.page_delay[1]),
        )
    }

    pub fn batch_cooldown(&self) -> Duration {
        Duration::from_millis(self.batch_cooldown)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV file receiving business records
    #[serde(rename = "output-path")]
    pub output_path: String,

    /// Path to the JSON progress checkpoint
    #[serde(rename = "progress-path")]
    pub progress_path: String,
}

/// CSS selectors describing the directory site's markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SelectorConfig {
    /// Container of the category tree on the root page
    pub categories: String,
    /// One category inside the container
    pub category: String,
    pub category_name: String,
    pub sub_category_link: String,
    /// Container of the listings on a result page
    pub results: String,
    /// One listing inside the results container
    pub result: String,
    pub name: String,
    pub phone: String,
    pub street: String,
    pub locality: String,
    pub business_categories: String,
    pub website: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            categories: ".popular-cats".to_string(),
            category: "article".to_string(),
            category_name: "h3".to_string(),
            sub_category_link: ".row.expand-area a".to_string(),
            results: ".organic".to_string(),
            result: ".result".to_string(),
            name: ".business-name span".to_string(),
            phone: ".phones.phone.primary".to_string(),
            street: ".street-address".to_string(),
            locality: ".locality".to_string(),
            business_categories: ".categories a".to_string(),
            website: ".track-visit-website".to_string(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}
