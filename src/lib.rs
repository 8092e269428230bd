//! Genreshelf Core Library
//!
//! This library provides the core functionality for the genreshelf tool,
//! which enriches a local e-book collection with genre metadata scraped
//! from an external book catalog, then filters, moves, or deletes files
//! by genre.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`book`] - Book file identity and directory scanning
//! - [`normalize`] - Filename cleanup and search query sanitization
//! - [`fetch`] - Page fetching collaborator contract
//! - [`catalog`] - Catalog URL building and HTML result parsing
//! - [`enrich`] - Enrichment orchestrator and batch scheduler
//! - [`store`] - Per-book marker file persistence
//! - [`library`] - Genre index and move/delete library operations

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod book;
pub mod catalog;
pub mod config;
pub mod enrich;
pub mod fetch;
pub mod library;
pub mod normalize;
pub mod store;

// Re-export commonly used types
pub use book::{BookFile, ScanError, scan_directory};
pub use catalog::CatalogClient;
pub use config::{
    DEFAULT_BATCH_SIZE, DEFAULT_CATALOG_URL, DEFAULT_EXTENSION, DEFAULT_RATING_THRESHOLD,
    EnrichConfig,
};
pub use enrich::{EnrichEngine, EnrichError, EnrichStats, GenreOutcome};
pub use fetch::{FetchError, HttpFetcher, PageFetcher};
pub use library::{GenreIndex, LibraryError, OpReport, delete_genre, move_genre};
pub use normalize::{CleanError, HttpNameCleaner, NameCleaner, SearchQuery, sanitize_query};
pub use store::{MetadataStore, StoreError};
