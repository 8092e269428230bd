//! Per-book enrichment pipeline.
//!
//! Drives one book from search query to terminal outcome:
//! search fetch → first match → popularity gate → detail fetch → genre
//! tags. Every terminal performs exactly one store write and one
//! info-level message. Fetch failures degrade to empty pages; only a
//! marker write failure surfaces as an error.

use tracing::{info, instrument, warn};

use crate::book::BookFile;
use crate::catalog::{CatalogClient, parser};
use crate::normalize::SearchQuery;
use crate::store::{MetadataStore, StoreError};

use super::outcome::GenreOutcome;

/// Runs the full pipeline for one book and persists the outcome.
///
/// The popularity gate runs strictly before the detail fetch: an
/// unpopular book costs one round-trip, not two.
///
/// # Errors
///
/// Returns [`StoreError`] only if writing the outcome marker fails.
#[instrument(skip(catalog, store, query), fields(book = %book.file_name, query = %query))]
pub async fn enrich_book(
    catalog: &CatalogClient,
    store: &MetadataStore,
    book: &BookFile,
    query: &SearchQuery,
    rating_threshold: u64,
) -> Result<GenreOutcome, StoreError> {
    let search_html = match catalog.search(query).await {
        Ok(html) => html,
        Err(error) => {
            warn!(error = %error, "search fetch failed, proceeding with empty page");
            String::new()
        }
    };

    let Some(record) = parser::parse_search_results(&search_html) else {
        info!(outcome = "unknown", "no search results");
        return finish(store, book, GenreOutcome::Unknown);
    };

    let rating_count = parser::extract_rating_count(&record);
    if rating_count < rating_threshold {
        info!(
            outcome = "unpopular",
            rating_count, rating_threshold, "below popularity threshold"
        );
        return finish(store, book, GenreOutcome::Unpopular);
    }

    let detail_url = parser::extract_detail_link(&record)
        .and_then(|href| catalog.detail_url(&href));
    let Some(detail_url) = detail_url else {
        info!(outcome = "unknown", "no detail link in first result");
        return finish(store, book, GenreOutcome::Unknown);
    };

    let detail_html = match catalog.detail(&detail_url).await {
        Ok(html) => html,
        Err(error) => {
            warn!(error = %error, url = %detail_url, "detail fetch failed, proceeding with empty page");
            String::new()
        }
    };

    let genres = parser::parse_genre_tags(&detail_html);
    let outcome = GenreOutcome::tagged(genres);
    match &outcome {
        GenreOutcome::Tagged(genres) => {
            info!(outcome = "tagged", genre_count = genres.len(), "genres extracted");
        }
        _ => {
            // Some entries legitimately list no genres.
            info!(outcome = "unknown", "detail page listed no genres");
        }
    }
    finish(store, book, outcome)
}

/// Persists the terminal outcome. One write per book, whole-file replace.
fn finish(
    store: &MetadataStore,
    book: &BookFile,
    outcome: GenreOutcome,
) -> Result<GenreOutcome, StoreError> {
    store.write_outcome(book, &outcome)?;
    Ok(outcome)
}
