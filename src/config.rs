//! Runtime configuration for the enrichment pipeline.
//!
//! The popularity threshold and batch size were hardcoded in earlier
//! versions of this workflow; both are tunable here with defaults matching
//! the observed values.

use std::time::Duration;

/// Default minimum rating count for a book to be considered popular.
/// The boundary is inclusive: exactly this many ratings proceeds to the
/// detail fetch.
pub const DEFAULT_RATING_THRESHOLD: u64 = 500;

/// Default number of books per batch. Also the bound on in-flight
/// normalizations and catalog fetches within a batch.
pub const DEFAULT_BATCH_SIZE: usize = 15;

/// Default book file extension to scan for.
pub const DEFAULT_EXTENSION: &str = "epub";

/// Default catalog root URL.
pub const DEFAULT_CATALOG_URL: &str = "https://www.goodreads.com";

/// Default bounded wait before retrying a detail page whose genre section
/// is hidden behind a reveal control.
pub const DEFAULT_REVEAL_WAIT: Duration = Duration::from_secs(1);

/// Configuration for an enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Catalog root URL (search and detail paths are relative to it).
    pub catalog_url: String,
    /// Optional endpoint of the text-normalization capability. `None`
    /// disables cleanup; queries are sanitized from raw filenames.
    pub cleaner_url: Option<String>,
    /// Minimum rating count to pass the popularity gate (inclusive).
    pub rating_threshold: u64,
    /// Books per batch; also the in-flight concurrency bound.
    pub batch_size: usize,
    /// Book file extension to scan for.
    pub extension: String,
    /// Bounded wait for the detail page reveal control.
    pub reveal_wait: Duration,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            cleaner_url: None,
            rating_threshold: DEFAULT_RATING_THRESHOLD,
            batch_size: DEFAULT_BATCH_SIZE,
            extension: DEFAULT_EXTENSION.to_string(),
            reveal_wait: DEFAULT_REVEAL_WAIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_constants() {
        let config = EnrichConfig::default();
        assert_eq!(config.rating_threshold, 500);
        assert_eq!(config.batch_size, 15);
        assert_eq!(config.extension, "epub");
        assert!(config.cleaner_url.is_none());
    }
}
