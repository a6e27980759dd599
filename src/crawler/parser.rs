//! HTML extraction for the directory site
//!
//! This module turns loaded documents into the crawl's data model:
//! - The category tree on the root page
//! - Business listings on a result page
//!
//! All functions here are pure: they take a parsed document and never block.

use crate::config::{parse_selector, SelectorConfig};
use crate::state::{BusinessRecord, Category, SubCategory, NOT_AVAILABLE};
use crate::url::resolve_link;
use crate::{ConfigError, ExtractionError};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Compiled selectors for the site's markup
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    categories_source: String,
    categories: Selector,
    category: Selector,
    category_name: Selector,
    sub_category_link: Selector,
    results: Selector,
    result: Selector,
    name: Selector,
    phone: Selector,
    street: Selector,
    locality: Selector,
    business_categories: Selector,
    website: Selector,
}

impl SiteSelectors {
    /// Compiles every selector of the configuration
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            categories_source: config.categories.clone(),
            categories: parse_selector("categories", &config.categories)?,
            category: parse_selector("category", &config.category)?,
            category_name: parse_selector("category-name", &config.category_name)?,
            sub_category_link: parse_selector("sub-category-link", &config.sub_category_link)?,
            results: parse_selector("results", &config.results)?,
            result: parse_selector("result", &config.result)?,
            name: parse_selector("name", &config.name)?,
            phone: parse_selector("phone", &config.phone)?,
            street: parse_selector("street", &config.street)?,
            locality: parse_selector("locality", &config.locality)?,
            business_categories: parse_selector(
                "business-categories",
                &config.business_categories,
            )?,
            website: parse_selector("website", &config.website)?,
        })
    }
}

/// Extracts the category tree from the root page
///
/// Categories without a name are skipped, as are subcategory links that do not
/// resolve to an HTTP(S) URL. A page without the categories container is an
/// extraction error: the root page did not render what the crawl depends on.
pub fn extract_categories(
    document: &Html,
    base_url: &Url,
    selectors: &SiteSelectors,
) -> Result<Vec<Category>, ExtractionError> {
    let container = document
        .select(&selectors.categories)
        .next()
        .ok_or_else(|| ExtractionError::MissingElement(selectors.categories_source.clone()))?;

    let mut categories = Vec::new();
    for element in container.select(&selectors.category) {
        let Some(name) = first_text(element, &selectors.category_name) else {
            tracing::debug!("Skipping category without a name");
            continue;
        };

        let sub_categories = element
            .select(&selectors.sub_category_link)
            .filter_map(|link| {
                let name = element_text(link);
                let href = link.value().attr("href")?;
                let link = resolve_link(href, base_url)?;
                (!name.is_empty()).then_some(SubCategory { name, link })
            })
            .collect();

        categories.push(Category {
            name,
            sub_categories,
        });
    }

    Ok(categories)
}

/// Extracts the business listings of one result page
///
/// Returns `None` when the page has no results container, which marks the end
/// of a subcategory's pagination.
pub fn extract_listings(
    document: &Html,
    page_url: &Url,
    selectors: &SiteSelectors,
    category: &str,
    sub_category: &str,
) -> Option<Vec<BusinessRecord>> {
    let container = document.select(&selectors.results).next()?;

    let records = container
        .select(&selectors.result)
        .map(|listing| {
            let business_categories = listing
                .select(&selectors.business_categories)
                .map(element_text)
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join("; ");

            let website = listing
                .select(&selectors.website)
                .next()
                .and_then(|el| el.value().attr("href"))
                .and_then(|href| resolve_link(href, page_url))
                .map(String::from)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());

            BusinessRecord {
                name: text_or_sentinel(listing, &selectors.name),
                phone: text_or_sentinel(listing, &selectors.phone),
                street: text_or_sentinel(listing, &selectors.street),
                locality: text_or_sentinel(listing, &selectors.locality),
                business_categories,
                website,
                category: category.to_string(),
                sub_category: sub_category.to_string(),
            }
        })
        .collect();

    Some(records)
}

/// Visible text of an element with whitespace collapsed
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(element: ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn text_or_sentinel(element: ElementRef, selector: &Selector) -> String {
    first_text(element, selector).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
