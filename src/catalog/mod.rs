//! Catalog client: search/detail URL building and page retrieval.
//!
//! Wraps a [`PageFetcher`] with knowledge of the catalog's URL layout and
//! the reveal-more interaction on detail pages. HTML extraction lives in
//! [`parser`].

pub mod parser;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};
use url::Url;

use crate::fetch::{FetchError, PageFetcher};
use crate::normalize::SearchQuery;

/// Client for the external book catalog.
pub struct CatalogClient {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
    reveal_wait: Duration,
}

impl CatalogClient {
    /// Creates a client against `base_url` (no trailing slash).
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>, reveal_wait: Duration) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            reveal_wait,
        }
    }

    /// Builds the search URL for a query.
    #[must_use]
    pub fn search_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}/search?q={}",
            self.base_url,
            urlencoding::encode(query.as_str())
        )
    }

    /// Resolves a detail href (usually relative) against the catalog root.
    ///
    /// Returns `None` if the href cannot be resolved; the orchestrator
    /// treats that the same as a missing link.
    #[must_use]
    pub fn detail_url(&self, href: &str) -> Option<String> {
        if href.starts_with("http://") || href.starts_with("https://") {
            return Some(href.to_string());
        }
        let base = Url::parse(&self.base_url).ok()?;
        let joined = base.join(href).ok()?;
        Some(joined.to_string())
    }

    /// Fetches the search results page for a query.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] from the underlying fetcher; callers degrade
    /// this to an empty page.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &SearchQuery) -> Result<String, FetchError> {
        self.fetcher.fetch(&self.search_url(query)).await
    }

    /// Fetches a detail page, honoring the reveal-more interaction.
    ///
    /// If the first fetch shows no genre tags but a reveal control is
    /// present, waits one bounded interval and fetches once more,
    /// proceeding with whatever is present. A failed second fetch falls
    /// back to the first page; the timeout is not a hard failure.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] only when the initial fetch fails.
    #[instrument(skip(self))]
    pub async fn detail(&self, url: &str) -> Result<String, FetchError> {
        let first = self.fetcher.fetch(url).await?;

        if parser::parse_genre_tags(&first).is_empty() && parser::has_reveal_control(&first) {
            debug!(url = %url, wait_ms = self.reveal_wait.as_millis(), "genre tags hidden behind reveal control, refetching");
            tokio::time::sleep(self.reveal_wait).await;
            match self.fetcher.fetch(url).await {
                Ok(second) => return Ok(second),
                Err(error) => {
                    debug!(url = %url, error = %error, "reveal refetch failed, proceeding with first page");
                }
            }
        }

        Ok(first)
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url)
            .field("reveal_wait", &self.reveal_wait)
            .finish_non_exhaustive()
    }
}
