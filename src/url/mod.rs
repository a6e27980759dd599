//! URL handling module for Listing Harvester
//!
//! This module builds result-page URLs and resolves links found on the root page.

use url::Url;

/// Name of the query parameter selecting a result page
pub const PAGE_PARAM: &str = "page";

/// Builds the URL of result page `page` for a subcategory link
///
/// Any existing `page` parameter is replaced; other query parameters and their
/// order are preserved.
///
/// # Examples
///
/// ```
/// use listing_harvester::url::page_url;
/// use url::Url;
///
/// let link = Url::parse("https://example.com/los-angeles-ca/pizza?sort=name").unwrap();
/// assert_eq!(
///     page_url(&link, 3).as_str(),
///     "https://example.com/los-angeles-ca/pizza?sort=name&page=3"
/// );
/// ```
pub fn page_url(link: &Url, page: u32) -> Url {
    let retained: Vec<(String, String)> = link
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = link.clone();
    url.set_query(None);
    url.set_fragment(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(PAGE_PARAM, &page.to_string());
    }
    url
}

/// Resolves a link href against the page it was found on
///
/// Returns None for empty hrefs, fragment-only anchors, special schemes
/// (`javascript:`, `mailto:`, `tel:`, `data:`) and anything that does not
/// resolve to an HTTP(S) URL.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}
