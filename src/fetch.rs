//! Page fetching collaborator contract.
//!
//! The pipeline is agnostic to the fetching mechanism; anything exposing
//! `fetch(url) -> html` works. The default implementation is a direct
//! HTTP client with a bounded per-request timeout. Fetch failures are
//! never hard errors upstream - the orchestrator degrades them to empty
//! content and an `Unknown` outcome.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

/// Overall per-request timeout for page fetches. Slow pages degrade to
/// an error the orchestrator absorbs rather than blocking a batch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for page fetches.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (connect error, timeout).
    #[error("fetch failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("fetch returned status {status} for {url}")]
    Status {
        /// HTTP status code returned.
        status: u16,
        /// The URL that was fetched.
        url: String,
    },
}

/// Retrieves page content for a URL.
///
/// Implementations may block or suspend; the scheduler bounds how many
/// fetches are in flight at once.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns the page HTML.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure or non-success status.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Direct HTTP page fetcher over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a fresh client using the default timeout.
    ///
    /// Falls back to the default client configuration if the builder
    /// fails (it only fails when TLS backend initialization fails).
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Creates a fetcher over an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let html = response.text().await?;
        debug!(url = %url, bytes = html.len(), "page fetched");
        Ok(html)
    }
}
