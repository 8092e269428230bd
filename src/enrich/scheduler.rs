//! Batch scheduler for the enrichment pipeline.
//!
//! Splits the not-yet-processed books into fixed-size batches. Within a
//! batch, two semaphore-bounded fan-out/fan-in phases run in sequence:
//! every member's query normalization first, then every member's
//! orchestration. A batch fully completes before the next starts - the
//! join is a hard barrier that caps in-flight catalog connections at the
//! batch size and guarantees batch N's markers are written before batch
//! N+1 begins. No task outlives its batch and there is no cancellation
//! primitive.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::book::{BookFile, ScanError, scan_directory};
use crate::catalog::CatalogClient;
use crate::config::EnrichConfig;
use crate::normalize::{self, NameCleaner};
use crate::store::MetadataStore;

use super::orchestrator;
use super::outcome::GenreOutcome;

/// Minimum allowed batch size.
const MIN_BATCH_SIZE: usize = 1;

/// Maximum allowed batch size. The batch cap is the only throttle
/// against the catalog's rate limit.
const MAX_BATCH_SIZE: usize = 50;

/// Error type for enrichment runs.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// Invalid batch size configured.
    #[error("invalid batch size {value}: must be between {MIN_BATCH_SIZE} and {MAX_BATCH_SIZE}")]
    InvalidBatchSize {
        /// The invalid value that was provided.
        value: usize,
    },

    /// The source directory could not be enumerated. Fatal to the run.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Statistics from an enrichment run.
///
/// Atomic counters updated from concurrent per-book tasks.
#[derive(Debug, Default)]
pub struct EnrichStats {
    tagged: AtomicUsize,
    unpopular: AtomicUsize,
    unknown: AtomicUsize,
    skipped: AtomicUsize,
    write_errors: AtomicUsize,
}

impl EnrichStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Books that received a `Tagged` outcome this run.
    #[must_use]
    pub fn tagged(&self) -> usize {
        self.tagged.load(Ordering::SeqCst)
    }

    /// Books that received an `Unpopular` outcome this run.
    #[must_use]
    pub fn unpopular(&self) -> usize {
        self.unpopular.load(Ordering::SeqCst)
    }

    /// Books that received an `Unknown` outcome this run.
    #[must_use]
    pub fn unknown(&self) -> usize {
        self.unknown.load(Ordering::SeqCst)
    }

    /// Books excluded up front because a marker already existed.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Marker writes that failed.
    #[must_use]
    pub fn write_errors(&self) -> usize {
        self.write_errors.load(Ordering::SeqCst)
    }

    /// Books processed to a terminal outcome this run.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.tagged() + self.unpopular() + self.unknown()
    }

    fn record(&self, outcome: &GenreOutcome) {
        let counter = match outcome {
            GenreOutcome::Tagged(_) => &self.tagged,
            GenreOutcome::Unpopular => &self.unpopular,
            GenreOutcome::Unknown => &self.unknown,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn add_skipped(&self, count: usize) {
        self.skipped.fetch_add(count, Ordering::SeqCst);
    }

    fn increment_write_errors(&self) {
        self.write_errors.fetch_add(1, Ordering::SeqCst);
    }
}

/// Per-book completion callback, for progress reporting.
pub type ProgressFn = Arc<dyn Fn(&BookFile) + Send + Sync>;

/// Enrichment engine driving batches of books through the pipeline.
pub struct EnrichEngine {
    catalog: Arc<CatalogClient>,
    cleaner: Option<Arc<dyn NameCleaner>>,
    config: EnrichConfig,
}

impl EnrichEngine {
    /// Creates an engine over a catalog client and optional name cleaner.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::InvalidBatchSize`] if the configured batch
    /// size is outside the valid range (1-50).
    pub fn new(
        catalog: Arc<CatalogClient>,
        cleaner: Option<Arc<dyn NameCleaner>>,
        config: EnrichConfig,
    ) -> Result<Self, EnrichError> {
        if !(MIN_BATCH_SIZE..=MAX_BATCH_SIZE).contains(&config.batch_size) {
            return Err(EnrichError::InvalidBatchSize {
                value: config.batch_size,
            });
        }

        debug!(
            batch_size = config.batch_size,
            rating_threshold = config.rating_threshold,
            catalog_url = %config.catalog_url,
            "creating enrichment engine"
        );

        Ok(Self {
            catalog,
            cleaner,
            config,
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EnrichConfig {
        &self.config
    }

    /// Books in `directory` that have no persisted outcome yet.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the directory cannot be enumerated.
    pub fn pending(&self, directory: &Path) -> Result<Vec<BookFile>, ScanError> {
        let store = MetadataStore::new(directory);
        let books = scan_directory(directory, &self.config.extension)?;
        Ok(books
            .into_iter()
            .filter(|book| !store.has_outcome(book))
            .collect())
    }

    /// Processes every unenriched book in `directory`.
    ///
    /// Idempotent: books with an existing marker are excluded before any
    /// work starts, so re-running on a completed directory writes nothing
    /// and fetches nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Scan`] if the directory cannot be read.
    /// Per-book failures degrade to persisted outcomes and never fail
    /// the run.
    pub async fn process(&self, directory: &Path) -> Result<EnrichStats, EnrichError> {
        self.process_with_progress(directory, None).await
    }

    /// Like [`process`](Self::process), invoking `progress` as each book
    /// reaches a terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Scan`] if the directory cannot be read.
    #[instrument(skip(self, progress), fields(directory = %directory.display()))]
    pub async fn process_with_progress(
        &self,
        directory: &Path,
        progress: Option<ProgressFn>,
    ) -> Result<EnrichStats, EnrichError> {
        let store = MetadataStore::new(directory);
        let books = scan_directory(directory, &self.config.extension)?;
        let total = books.len();

        // Resumability: anything with a marker is already processed.
        let pending: Vec<BookFile> = books
            .into_iter()
            .filter(|book| !store.has_outcome(book))
            .collect();

        let stats = Arc::new(EnrichStats::new());
        stats.add_skipped(total - pending.len());

        info!(
            total,
            pending = pending.len(),
            skipped = stats.skipped(),
            batch_size = self.config.batch_size,
            "starting enrichment run"
        );

        for (batch_index, batch) in pending.chunks(self.config.batch_size).enumerate() {
            self.run_batch(batch, &store, &stats, progress.as_ref())
                .await?;
            debug!(batch = batch_index + 1, size = batch.len(), "batch barrier passed");
        }

        info!(
            tagged = stats.tagged(),
            unpopular = stats.unpopular(),
            unknown = stats.unknown(),
            skipped = stats.skipped(),
            write_errors = stats.write_errors(),
            "enrichment run complete"
        );

        match Arc::try_unwrap(stats) {
            Ok(stats) => Ok(stats),
            Err(arc_stats) => {
                // All tasks joined, so this should not happen; rebuild
                // from the atomic values rather than panic.
                let new_stats = EnrichStats::new();
                new_stats.tagged.store(arc_stats.tagged(), Ordering::SeqCst);
                new_stats
                    .unpopular
                    .store(arc_stats.unpopular(), Ordering::SeqCst);
                new_stats
                    .unknown
                    .store(arc_stats.unknown(), Ordering::SeqCst);
                new_stats
                    .skipped
                    .store(arc_stats.skipped(), Ordering::SeqCst);
                new_stats
                    .write_errors
                    .store(arc_stats.write_errors(), Ordering::SeqCst);
                Ok(new_stats)
            }
        }
    }

    /// Runs one batch to completion: normalize all members, then enrich
    /// all members, each phase bounded by the batch size.
    async fn run_batch(
        &self,
        batch: &[BookFile],
        store: &MetadataStore,
        stats: &Arc<EnrichStats>,
        progress: Option<&ProgressFn>,
    ) -> Result<(), EnrichError> {
        // Phase 1: query normalization fan-out. Latency-bound work, safe
        // to overlap up to the batch size.
        let semaphore = Arc::new(Semaphore::new(self.config.batch_size));
        let mut handles = Vec::with_capacity(batch.len());

        for book in batch {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| EnrichError::SemaphoreClosed)?;
            let cleaner = self.cleaner.clone();
            let extension = self.config.extension.clone();
            let book = book.clone();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let query =
                    normalize::build_query(cleaner.as_deref(), &book.file_name, &extension).await;
                (book, query)
            }));
        }

        let mut normalized = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(pair) => normalized.push(pair),
                Err(error) => warn!(error = %error, "normalization task panicked"),
            }
        }

        // Phase 2: orchestration fan-out, same bound, no cross-member
        // dependency. Joining all handles is the batch barrier.
        let semaphore = Arc::new(Semaphore::new(self.config.batch_size));
        let mut handles = Vec::with_capacity(normalized.len());

        for (book, query) in normalized {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| EnrichError::SemaphoreClosed)?;
            let catalog = Arc::clone(&self.catalog);
            let store = store.clone();
            let stats = Arc::clone(stats);
            let progress = progress.cloned();
            let rating_threshold = self.config.rating_threshold;

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                match orchestrator::enrich_book(&catalog, &store, &book, &query, rating_threshold)
                    .await
                {
                    Ok(outcome) => stats.record(&outcome),
                    Err(error) => {
                        warn!(book = %book.file_name, error = %error, "failed to persist outcome");
                        stats.increment_write_errors();
                    }
                }
                if let Some(progress) = progress {
                    progress(&book);
                }
            }));
        }

        for handle in handles {
            if let Err(error) = handle.await {
                warn!(error = %error, "enrichment task panicked");
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for EnrichEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fetch::HttpFetcher;
    use std::time::Duration;

    fn test_catalog() -> Arc<CatalogClient> {
        Arc::new(CatalogClient::new(
            Arc::new(HttpFetcher::new()),
            "https://catalog.example",
            Duration::from_millis(1),
        ))
    }

    fn config_with_batch_size(batch_size: usize) -> EnrichConfig {
        EnrichConfig {
            batch_size,
            ..EnrichConfig::default()
        }
    }

    #[test]
    fn test_engine_new_valid_batch_sizes() {
        for size in [1, 10, 15, 50] {
            let engine =
                EnrichEngine::new(test_catalog(), None, config_with_batch_size(size)).unwrap();
            assert_eq!(engine.config().batch_size, size);
        }
    }

    #[test]
    fn test_engine_new_invalid_batch_size_zero() {
        let result = EnrichEngine::new(test_catalog(), None, config_with_batch_size(0));
        assert!(matches!(
            result,
            Err(EnrichError::InvalidBatchSize { value: 0 })
        ));
    }

    #[test]
    fn test_engine_new_invalid_batch_size_too_high() {
        let result = EnrichEngine::new(test_catalog(), None, config_with_batch_size(51));
        assert!(matches!(
            result,
            Err(EnrichError::InvalidBatchSize { value: 51 })
        ));
    }

    #[test]
    fn test_stats_record_and_accessors() {
        let stats = EnrichStats::new();
        stats.record(&GenreOutcome::Tagged(
            ["horror".to_string()].into_iter().collect(),
        ));
        stats.record(&GenreOutcome::Unpopular);
        stats.record(&GenreOutcome::Unpopular);
        stats.record(&GenreOutcome::Unknown);
        stats.add_skipped(3);
        stats.increment_write_errors();

        assert_eq!(stats.tagged(), 1);
        assert_eq!(stats.unpopular(), 2);
        assert_eq!(stats.unknown(), 1);
        assert_eq!(stats.processed(), 4);
        assert_eq!(stats.skipped(), 3);
        assert_eq!(stats.write_errors(), 1);
    }

    #[test]
    fn test_stats_default_is_zero() {
        let stats = EnrichStats::default();
        assert_eq!(stats.processed(), 0);
        assert_eq!(stats.skipped(), 0);
        assert_eq!(stats.write_errors(), 0);
    }
}
