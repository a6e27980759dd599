use crate::config::types::{Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates the target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root-url '{}' must use http or https",
            config.root_url
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry-attempts must be >= 1, got {}",
            config.retry_attempts
        )));
    }

    if config.page_load_timeout == 0 {
        return Err(ConfigError::Validation(
            "page-load-timeout must be > 0ms".to_string(),
        ));
    }

    if config.result_wait_timeout == 0 {
        return Err(ConfigError::Validation(
            "result-wait-timeout must be > 0ms".to_string(),
        ));
    }

    let [min, max] = config.page_delay;
    if min > max {
        return Err(ConfigError::Validation(format!(
            "page-delay minimum ({}ms) exceeds maximum ({}ms)",
            min, max
        )));
    }

    if config.max_task_failures == Some(0) {
        return Err(ConfigError::Validation(
            "max-task-failures must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.output_path.is_empty() {
        return Err(ConfigError::Validation(
            "output-path cannot be empty".to_string(),
        ));
    }

    if config.progress_path.is_empty() {
        return Err(ConfigError::Validation(
            "progress-path cannot be empty".to_string(),
        ));
    }

    if config.output_path == config.progress_path {
        return Err(ConfigError::Validation(
            "output-path and progress-path must differ".to_string(),
        ));
    }

    Ok(())
}

/// Checks that every configured selector compiles
fn validate_selectors(selectors: &SelectorConfig) -> Result<(), ConfigError> {
    for (name, selector) in selectors.entries() {
        parse_selector(name, selector)?;
    }
    Ok(())
}

/// Compiles one CSS selector, naming the config key on failure
pub(crate) fn parse_selector(name: &str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        name: name.to_string(),
        selector: selector.to_string(),
    })
}

impl SelectorConfig {
    /// Key/value view over all selectors, keyed by their config names
    pub fn entries(&self) -> [(&'static str, &str); 12] {
        [
            ("categories", self.categories.as_str()),
            ("category", self.category.as_str()),
            ("category-name", self.category_name.as_str()),
            ("sub-category-link", self.sub_category_link.as_str()),
            ("results", self.results.as_str()),
            ("result", self.result.as_str()),
            ("name", self.name.as_str()),
            ("phone", self.phone.as_str()),
            ("street", self.street.as_str()),
            ("locality", self.locality.as_str()),
            ("business-categories", self.business_categories.as_str()),
            ("website", self.website.as_str()),
        ]
    }
}
