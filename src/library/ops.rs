//! Bulk library operations: move or delete every book of a genre.
//!
//! Both operate on (book, marker) pairs and collect per-item failures
//! into a report instead of rolling back - a half-moved genre is left as
//! is and reported.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::index::GenreIndex;

/// Error type for library operations.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// The genre destination folder could not be created.
    #[error("failed to create genre folder {path}: {source}")]
    CreateDir {
        /// Folder that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// One failed item within a bulk operation.
#[derive(Debug)]
pub struct ItemError {
    /// Filename the operation failed on.
    pub file: String,
    /// Failure description.
    pub reason: String,
}

/// Result of a bulk move or delete.
#[derive(Debug, Default)]
pub struct OpReport {
    /// Files moved or removed.
    pub affected: usize,
    /// Per-item failures; the operation is not rolled back.
    pub errors: Vec<ItemError>,
}

/// Moves every (book, marker) pair of `genre` into a genre-named
/// subfolder of `directory`.
///
/// Name collisions in the target resolve by appending `_1`, `_2`, ...
/// before the extension until a free name is found; nothing is ever
/// overwritten.
///
/// # Errors
///
/// Returns [`LibraryError::CreateDir`] if the genre folder cannot be
/// created. Per-file failures are collected in the report.
#[instrument(skip(index), fields(directory = %directory.display()))]
pub fn move_genre(
    directory: &Path,
    index: &GenreIndex,
    genre: &str,
    extension: &str,
) -> Result<OpReport, LibraryError> {
    let target = directory.join(genre);
    std::fs::create_dir_all(&target).map_err(|source| LibraryError::CreateDir {
        path: target.clone(),
        source,
    })?;

    let mut report = OpReport::default();
    for file in genre_files(index, genre, extension) {
        let src = directory.join(&file);
        if !src.exists() {
            continue;
        }
        let dst = unique_destination(target.join(&file));
        match std::fs::rename(&src, &dst) {
            Ok(()) => report.affected += 1,
            Err(error) => {
                warn!(file = %file, error = %error, "move failed");
                report.errors.push(ItemError {
                    file,
                    reason: error.to_string(),
                });
            }
        }
    }

    info!(
        genre = %genre,
        moved = report.affected,
        errors = report.errors.len(),
        "genre move complete"
    );
    Ok(report)
}

/// Removes every (book, marker) pair of `genre` from `directory`.
///
/// Confirmation is the caller's responsibility; this function deletes
/// unconditionally and reports the count removed.
#[must_use]
#[instrument(skip(index), fields(directory = %directory.display()))]
pub fn delete_genre(
    directory: &Path,
    index: &GenreIndex,
    genre: &str,
    extension: &str,
) -> OpReport {
    let mut report = OpReport::default();
    for file in genre_files(index, genre, extension) {
        let path = directory.join(&file);
        if !path.exists() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => report.affected += 1,
            Err(error) => {
                warn!(file = %file, error = %error, "delete failed");
                report.errors.push(ItemError {
                    file,
                    reason: error.to_string(),
                });
            }
        }
    }

    info!(
        genre = %genre,
        removed = report.affected,
        errors = report.errors.len(),
        "genre delete complete"
    );
    report
}

/// Book and marker filenames for every member of a genre.
fn genre_files(index: &GenreIndex, genre: &str, extension: &str) -> Vec<String> {
    let Some(bases) = index.books_for(genre) else {
        return Vec::new();
    };
    bases
        .iter()
        .flat_map(|base| [format!("{base}.{extension}"), format!("{base}.txt")])
        .collect()
}

/// First free variant of `path`, appending `_1`, `_2`, ... before the
/// extension.
fn unique_destination(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file")
        .to_string();
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_string);
    let parent = path.parent().map_or_else(PathBuf::new, Path::to_path_buf);

    let mut counter = 1u32;
    loop {
        let candidate_name = match &extension {
            Some(ext) => format!("{stem}_{counter}.{ext}"),
            None => format!("{stem}_{counter}"),
        };
        let candidate = parent.join(candidate_name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MetadataStore;

    fn library_with(markers: &[(&str, &str)]) -> (tempfile::TempDir, GenreIndex) {
        let dir = tempfile::tempdir().unwrap();
        for (base, content) in markers {
            std::fs::write(dir.path().join(format!("{base}.epub")), b"book").unwrap();
            std::fs::write(dir.path().join(format!("{base}.txt")), content).unwrap();
        }
        let index = GenreIndex::rebuild(&MetadataStore::new(dir.path())).unwrap();
        (dir, index)
    }

    #[test]
    fn test_move_genre_relocates_pairs() {
        let (dir, index) = library_with(&[("a", "scifi"), ("b", "scifi"), ("c", "horror")]);

        let report = move_genre(dir.path(), &index, "scifi", "epub").unwrap();

        assert_eq!(report.affected, 4);
        assert!(report.errors.is_empty());
        assert!(dir.path().join("scifi/a.epub").exists());
        assert!(dir.path().join("scifi/a.txt").exists());
        assert!(dir.path().join("scifi/b.epub").exists());
        assert!(!dir.path().join("a.epub").exists());
        // Other genres untouched.
        assert!(dir.path().join("c.epub").exists());
    }

    #[test]
    fn test_move_genre_collision_appends_suffixes() {
        let (dir, index) = library_with(&[("a", "scifi")]);
        std::fs::create_dir_all(dir.path().join("scifi")).unwrap();
        std::fs::write(dir.path().join("scifi/a.epub"), b"occupied").unwrap();
        std::fs::write(dir.path().join("scifi/a_1.epub"), b"also occupied").unwrap();

        let report = move_genre(dir.path(), &index, "scifi", "epub").unwrap();

        assert_eq!(report.affected, 2);
        assert!(dir.path().join("scifi/a_2.epub").exists());
        // Nothing overwritten.
        assert_eq!(
            std::fs::read(dir.path().join("scifi/a.epub")).unwrap(),
            b"occupied"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("scifi/a_2.epub")).unwrap(),
            "book"
        );
    }

    #[test]
    fn test_move_genre_unknown_genre_moves_nothing() {
        let (dir, index) = library_with(&[("a", "scifi")]);
        let report = move_genre(dir.path(), &index, "fantasy", "epub").unwrap();
        assert_eq!(report.affected, 0);
        assert!(dir.path().join("a.epub").exists());
    }

    #[test]
    fn test_move_genre_missing_source_is_skipped_not_error() {
        let (dir, index) = library_with(&[("a", "scifi")]);
        std::fs::remove_file(dir.path().join("a.epub")).unwrap();

        let report = move_genre(dir.path(), &index, "scifi", "epub").unwrap();
        // Only the marker remained to move.
        assert_eq!(report.affected, 1);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_delete_genre_removes_pairs_and_counts() {
        let (dir, index) = library_with(&[("a", "scifi"), ("b", "scifi"), ("c", "horror")]);

        let report = delete_genre(dir.path(), &index, "scifi", "epub");

        assert_eq!(report.affected, 4);
        assert!(!dir.path().join("a.epub").exists());
        assert!(!dir.path().join("a.txt").exists());
        assert!(!dir.path().join("b.epub").exists());
        assert!(dir.path().join("c.epub").exists());
        assert!(dir.path().join("c.txt").exists());
    }

    #[test]
    fn test_delete_genre_unknown_genre_removes_nothing() {
        let (dir, index) = library_with(&[("a", "scifi")]);
        let report = delete_genre(dir.path(), &index, "fantasy", "epub");
        assert_eq!(report.affected, 0);
        assert!(dir.path().join("a.epub").exists());
    }

    #[test]
    fn test_unique_destination_no_collision_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("free.epub");
        assert_eq!(unique_destination(path.clone()), path);
    }
}
