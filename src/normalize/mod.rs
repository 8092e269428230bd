//! Query normalization: raw filename to search-safe query string.
//!
//! Normalization has two stages: an opaque text-normalization capability
//! ([`NameCleaner`]) that rewrites a messy filename into "title author"
//! form, and a pure, deterministic sanitizer ([`sanitize_query`]) applied
//! to whatever the cleaner produced. If the cleaner is unavailable or
//! returns nothing, the raw filename is sanitized directly - an explicit
//! fallback, never a silent one.

mod cleaner;
mod sanitize;

pub use cleaner::{CleanError, HttpNameCleaner, NameCleaner};
pub use sanitize::sanitize_query;

use tracing::{debug, warn};

/// Search-safe query text derived from a cleaned filename. Transient;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Wraps already-sanitized query text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The query text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds a search query for one filename.
///
/// Invokes the cleaner once (no retry, no quality check on the result)
/// and sanitizes its output. On cleaner failure or empty output, falls
/// back to sanitizing the raw filename.
pub async fn build_query(
    cleaner: Option<&dyn NameCleaner>,
    file_name: &str,
    extension: &str,
) -> SearchQuery {
    if let Some(cleaner) = cleaner {
        match cleaner.clean(file_name).await {
            Ok(cleaned) if !cleaned.trim().is_empty() => {
                debug!(file = %file_name, cleaned = %cleaned, "filename cleaned");
                return SearchQuery::new(sanitize_query(&cleaned, extension));
            }
            Ok(_) => {
                warn!(file = %file_name, "cleaner returned empty text; sanitizing raw filename");
            }
            Err(error) => {
                warn!(file = %file_name, error = %error, "cleaner unavailable; sanitizing raw filename");
            }
        }
    }
    SearchQuery::new(sanitize_query(file_name, extension))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedCleaner(String);

    #[async_trait]
    impl NameCleaner for FixedCleaner {
        async fn clean(&self, _file_name: &str) -> Result<String, CleanError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenCleaner;

    #[async_trait]
    impl NameCleaner for BrokenCleaner {
        async fn clean(&self, _file_name: &str) -> Result<String, CleanError> {
            Err(CleanError::EmptyResponse)
        }
    }

    #[tokio::test]
    async fn test_build_query_sanitizes_cleaner_output() {
        let cleaner = FixedCleaner("A Christmas Carol Thanos Kondylis".to_string());
        let query = build_query(Some(&cleaner), "whatever.epub", "epub").await;
        assert_eq!(query.as_str(), "A Christmas Carol Thanos Kondylis");
    }

    #[tokio::test]
    async fn test_build_query_falls_back_on_empty_cleaner_output() {
        let cleaner = FixedCleaner("   ".to_string());
        let query = build_query(Some(&cleaner), "Dune - Frank Herbert.epub", "epub").await;
        assert_eq!(query.as_str(), "Dune Frank Herbert");
    }

    #[tokio::test]
    async fn test_build_query_falls_back_on_cleaner_error() {
        let query = build_query(Some(&BrokenCleaner), "Dune - Frank Herbert.epub", "epub").await;
        assert_eq!(query.as_str(), "Dune Frank Herbert");
    }

    #[tokio::test]
    async fn test_build_query_without_cleaner_sanitizes_raw() {
        let query = build_query(None, "Dune (1965) - Frank Herbert.epub", "epub").await;
        assert_eq!(query.as_str(), "Dune 1965 Frank Herbert");
    }
}
