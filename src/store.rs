//! Marker-file metadata store.
//!
//! One flat UTF-8 text record per processed book, written next to the
//! book itself: `<base name>.txt`. Content is the encoded
//! [`GenreOutcome`] - a comma-joined genre list, or the literal
//! `unpopular` / `unknown`. A marker's existence is what makes a book
//! "processed"; outcomes are never overwritten by later runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::book::BookFile;
use crate::enrich::GenreOutcome;

/// Error type for marker-file operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing a marker file failed.
    #[error("marker file {path}: {source}")]
    Io {
        /// Marker path involved.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Persisted outcome store for one library directory.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    directory: PathBuf,
}

impl MetadataStore {
    /// Creates a store over `directory`.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The directory this store reads and writes.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether `book` already has a persisted outcome.
    ///
    /// The resumability check: books with a marker are excluded from
    /// later runs.
    #[must_use]
    pub fn has_outcome(&self, book: &BookFile) -> bool {
        book.marker_path().exists()
    }

    /// Writes the outcome marker for `book` as a whole-file replacement.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the write fails.
    #[instrument(skip(self, outcome), fields(book = %book.file_name))]
    pub fn write_outcome(&self, book: &BookFile, outcome: &GenreOutcome) -> Result<(), StoreError> {
        let path = book.marker_path();
        std::fs::write(&path, outcome.encode()).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "outcome marker written");
        Ok(())
    }

    /// Reads the outcome marker for `book`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if an existing marker cannot be read.
    pub fn read_outcome(&self, book: &BookFile) -> Result<Option<GenreOutcome>, StoreError> {
        let path = book.marker_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Some(GenreOutcome::decode(&content)))
    }

    /// Scans every marker in the directory into a base-name → outcome map.
    ///
    /// Unreadable directories error; individual non-UTF-8 marker names
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory or a marker file
    /// cannot be read.
    #[instrument(skip(self), fields(directory = %self.directory.display()))]
    pub fn outcomes(&self) -> Result<BTreeMap<String, GenreOutcome>, StoreError> {
        let entries = std::fs::read_dir(&self.directory).map_err(|source| StoreError::Io {
            path: self.directory.clone(),
            source,
        })?;

        let mut outcomes = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.directory.clone(),
                source,
            })?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let Some(base) = name.strip_suffix(".txt") else {
                continue;
            };
            let path = entry.path();
            let content = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            outcomes.insert(base.to_string(), GenreOutcome::decode(&content));
        }

        debug!(count = outcomes.len(), "scanned outcome markers");
        Ok(outcomes)
    }
}
