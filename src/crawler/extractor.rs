use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::parse_listing;
use crate::url::Scope;
use std::sync::Arc;
use url::Url;

/// Fetches listing pages and returns their in-scope entries
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    fetcher: Fetcher,
    scope: Arc<Scope>,
}

impl LinkExtractor {
    pub fn new(fetcher: Fetcher, scope: Arc<Scope>) -> Self {
        Self { fetcher, scope }
    }

    /// Fetches one listing and returns absolute, in-scope links in document order
    ///
    /// A failed fetch is logged and yields no links; the caller carries on
    /// with the rest of the tree.
    pub async fn get_links(&self, url: &Url) -> Vec<Url> {
        let body = match self.fetcher.fetch_text(url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to list {}: {}", url, e);
                return Vec::new();
            }
        };

        let links: Vec<Url> = parse_listing(&body, url)
            .into_iter()
            .filter(|link| self.scope.should_download(link))
            .collect();

        tracing::debug!("{} in-scope entries in {}", links.len(), url);
        links
    }
}
