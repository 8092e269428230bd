//! Enrichment pipeline: per-book orchestration and batch scheduling.
//!
//! # Overview
//!
//! The pipeline consists of:
//! - [`GenreOutcome`] - The persisted three-way result per book
//! - [`orchestrator`] - One book through search, gate, and genre extraction
//! - [`EnrichEngine`] - Batching, bounded concurrency, resumability
//! - [`EnrichStats`] - Counters for a completed run
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use genreshelf_core::{CatalogClient, EnrichConfig, EnrichEngine, HttpFetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EnrichConfig::default();
//! let catalog = Arc::new(CatalogClient::new(
//!     Arc::new(HttpFetcher::new()),
//!     config.catalog_url.clone(),
//!     config.reveal_wait,
//! ));
//! let engine = EnrichEngine::new(catalog, None, config)?;
//! let stats = engine.process(Path::new("./library")).await?;
//! println!("tagged: {}, unpopular: {}, unknown: {}", stats.tagged(), stats.unpopular(), stats.unknown());
//! # Ok(())
//! # }
//! ```

pub mod orchestrator;
mod outcome;
mod scheduler;

pub use orchestrator::enrich_book;
pub use outcome::GenreOutcome;
pub use scheduler::{EnrichEngine, EnrichError, EnrichStats, ProgressFn};
