//! Book file identity and source directory scanning.
//!
//! A [`BookFile`] is one managed e-book entry. Its identity is the original
//! filename; it is created by a directory scan and removed only by the
//! library move/delete operations.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

/// Error type for directory scanning.
///
/// Failing to enumerate the source directory is the only fatal error in
/// the pipeline; everything downstream degrades to a persisted outcome.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The source directory could not be read.
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        /// Directory that could not be enumerated.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// One managed e-book entry.
///
/// Identity is the original filename. The base name (filename without the
/// extension) keys the marker file and the genre index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFile {
    /// Directory containing the book.
    pub directory: PathBuf,
    /// Original filename, extension included.
    pub file_name: String,
}

impl BookFile {
    /// Creates a book entry for `file_name` inside `directory`.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
        }
    }

    /// Filename without its extension.
    #[must_use]
    pub fn base_name(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((base, _ext)) if !base.is_empty() => base,
            _ => &self.file_name,
        }
    }

    /// Full path to the book file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// Path of the sibling marker file recording this book's outcome.
    #[must_use]
    pub fn marker_path(&self) -> PathBuf {
        self.directory.join(format!("{}.txt", self.base_name()))
    }
}

/// Scans `directory` for book files with the given extension.
///
/// Entries are returned in directory order; ordering is not significant
/// to the pipeline. Subdirectories and non-matching files are ignored.
///
/// # Errors
///
/// Returns [`ScanError::ReadDir`] if the directory cannot be enumerated.
/// This is fatal to the whole run.
#[instrument(fields(directory = %directory.display()))]
pub fn scan_directory(directory: &Path, extension: &str) -> Result<Vec<BookFile>, ScanError> {
    let entries = std::fs::read_dir(directory).map_err(|source| ScanError::ReadDir {
        path: directory.to_path_buf(),
        source,
    })?;

    let suffix = format!(".{}", extension.to_ascii_lowercase());
    let mut books = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                return Err(ScanError::ReadDir {
                    path: directory.to_path_buf(),
                    source,
                });
            }
        };
        let Ok(name) = entry.file_name().into_string() else {
            debug!(entry = ?entry.file_name(), "skipping non-UTF-8 filename");
            continue;
        };
        if !name.to_ascii_lowercase().ends_with(&suffix) {
            continue;
        }
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            continue;
        }
        books.push(BookFile::new(directory, name));
    }

    debug!(count = books.len(), "scanned source directory");
    Ok(books)
}
