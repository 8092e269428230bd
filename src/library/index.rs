//! Frequency-ranked genre index over the metadata store.
//!
//! The index is an explicit object rebuilt from the store on demand and
//! passed into whatever presentation layer consumes it; nothing here is
//! ambient state. It is always fully rebuilt, never patched
//! incrementally.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, instrument};

use crate::enrich::GenreOutcome;
use crate::store::{MetadataStore, StoreError};

/// Sentinel genre contributed by `Unpopular` outcomes.
pub const UNPOPULAR_GENRE: &str = "unpopular";

/// Process-wide aggregation of genres to book base names.
///
/// Genres are lower-cased and trimmed. `Tagged` outcomes contribute each
/// genre; `Unpopular` contributes the sentinel genre; `Unknown`
/// contributes nothing. Ordering is (frequency desc, name asc).
///
/// Selection is single-select toggle: selecting a second genre deselects
/// the first, re-selecting the current one clears it.
#[derive(Debug, Clone, Default)]
pub struct GenreIndex {
    books: BTreeMap<String, BTreeSet<String>>,
    ranked: Vec<(String, usize)>,
    selected: Option<String>,
}

impl GenreIndex {
    /// Rebuilds the index from every marker in the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be scanned.
    #[instrument(skip(store), fields(directory = %store.directory().display()))]
    pub fn rebuild(store: &MetadataStore) -> Result<Self, StoreError> {
        let mut books: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for (base_name, outcome) in store.outcomes()? {
            match outcome {
                GenreOutcome::Tagged(genres) => {
                    for genre in genres {
                        let genre = genre.trim().to_lowercase();
                        if genre.is_empty() {
                            continue;
                        }
                        books.entry(genre).or_default().insert(base_name.clone());
                    }
                }
                GenreOutcome::Unpopular => {
                    books
                        .entry(UNPOPULAR_GENRE.to_string())
                        .or_default()
                        .insert(base_name);
                }
                GenreOutcome::Unknown => {}
            }
        }

        let mut ranked: Vec<(String, usize)> = books
            .iter()
            .map(|(genre, bases)| (genre.clone(), bases.len()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        debug!(genres = ranked.len(), "genre index rebuilt");
        Ok(Self {
            books,
            ranked,
            selected: None,
        })
    }

    /// Genres with frequencies, ordered by (frequency desc, name asc).
    #[must_use]
    pub fn ranked(&self) -> &[(String, usize)] {
        &self.ranked
    }

    /// Book base names carrying `genre`.
    #[must_use]
    pub fn books_for(&self, genre: &str) -> Option<&BTreeSet<String>> {
        self.books.get(genre)
    }

    /// Number of distinct genres.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// Whether the index holds no genres.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Toggles the selection of `genre`.
    ///
    /// Selecting a second genre deselects the first; toggling the
    /// selected genre clears the selection. Unknown genres are ignored.
    pub fn toggle(&mut self, genre: &str) {
        if !self.books.contains_key(genre) {
            return;
        }
        if self.selected.as_deref() == Some(genre) {
            self.selected = None;
        } else {
            self.selected = Some(genre.to_string());
        }
    }

    /// The currently selected genre, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Genres visible under a live filter query: case-insensitive
    /// substring match, in ranked order. Controls visibility only -
    /// the selection is untouched even when filtered out of view.
    #[must_use]
    pub fn visible(&self, filter: &str) -> Vec<&str> {
        let needle = filter.to_lowercase();
        self.ranked
            .iter()
            .filter(|(genre, _)| genre.contains(&needle))
            .map(|(genre, _)| genre.as_str())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn index_from_markers(markers: &[(&str, &str)]) -> GenreIndex {
        let dir = tempfile::tempdir().unwrap();
        for (base, content) in markers {
            std::fs::write(dir.path().join(format!("{base}.txt")), content).unwrap();
        }
        GenreIndex::rebuild(&MetadataStore::new(dir.path())).unwrap()
    }

    #[test]
    fn test_rebuild_ranks_by_frequency_then_name() {
        let index = index_from_markers(&[
            ("a", "scifi, horror"),
            ("b", "scifi"),
            ("c", "unknown"),
        ]);
        assert_eq!(
            index.ranked(),
            &[("scifi".to_string(), 2), ("horror".to_string(), 1)]
        );
    }

    #[test]
    fn test_rebuild_ties_break_alphabetically() {
        let index = index_from_markers(&[("a", "zebra, apple")]);
        assert_eq!(
            index.ranked(),
            &[("apple".to_string(), 1), ("zebra".to_string(), 1)]
        );
    }

    #[test]
    fn test_rebuild_lowercases_genres() {
        let index = index_from_markers(&[("a", "Science Fiction"), ("b", "SCIENCE FICTION")]);
        assert_eq!(index.ranked(), &[("science fiction".to_string(), 2)]);
    }

    #[test]
    fn test_unpopular_contributes_sentinel_genre() {
        let index = index_from_markers(&[("a", "unpopular"), ("b", "unpopular")]);
        assert_eq!(index.ranked(), &[(UNPOPULAR_GENRE.to_string(), 2)]);
        assert_eq!(index.books_for(UNPOPULAR_GENRE).unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_contributes_nothing() {
        let index = index_from_markers(&[("a", "unknown")]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_toggle_single_select() {
        let mut index = index_from_markers(&[("a", "scifi, horror")]);

        index.toggle("scifi");
        assert_eq!(index.selected(), Some("scifi"));

        // Selecting a second genre deselects the first.
        index.toggle("horror");
        assert_eq!(index.selected(), Some("horror"));

        // Re-toggling clears.
        index.toggle("horror");
        assert_eq!(index.selected(), None);
    }

    #[test]
    fn test_toggle_unknown_genre_is_ignored() {
        let mut index = index_from_markers(&[("a", "scifi")]);
        index.toggle("nonexistent");
        assert_eq!(index.selected(), None);
    }

    #[test]
    fn test_visible_substring_match_keeps_selection() {
        let mut index = index_from_markers(&[("a", "science fiction, horror"), ("b", "fantasy")]);
        index.toggle("horror");

        let visible = index.visible("FICTION");
        assert_eq!(visible, vec!["science fiction"]);
        // Filter affects visibility only, not selection.
        assert_eq!(index.selected(), Some("horror"));

        assert_eq!(index.visible("").len(), 3);
    }
}
