//! Directory listing parser
//!
//! Extracts the entries of an auto-generated index page (Apache, nginx,
//! lighttpd and similar) as absolute URLs.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Hrefs that point back up the tree rather than at an entry
const NAVIGATION_HREFS: &[&str] = &["/", "../"];

/// Parses a listing page and returns its entries as absolute URLs
///
/// # Link Extraction Rules
///
/// **Include:**
/// - every `<a href="...">`, resolved against `base_url`
///
/// **Exclude:**
/// - the parent/root links `"../"` and `"/"`
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - fragment-only links and query-only links (column sort links)
/// - anything that does not resolve to http or https
///
/// Fragments are stripped and duplicates removed; document order is kept.
/// Scope filtering is not applied here.
///
/// # Example
///
/// ```
/// use sumi_mirror::crawler::parse_listing;
/// use url::Url;
///
/// let html = r#"<a href="../">Parent</a><a href="sub/">sub/</a><a href="file.txt">file.txt</a>"#;
/// let base = Url::parse("https://mirror.example/repo/").unwrap();
/// let links = parse_listing(html, &base);
/// assert_eq!(links.len(), 2);
/// assert_eq!(links[0].as_str(), "https://mirror.example/repo/sub/");
/// ```
pub fn parse_listing(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    if seen.insert(absolute_url.clone()) {
                        links.push(absolute_url);
                    }
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || NAVIGATION_HREFS.contains(&href) {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') || href.starts_with('?') {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);

    Some(absolute_url)
}
