//! The three-way enrichment outcome and its flat marker encoding.

use std::collections::BTreeSet;

/// Persisted enrichment result for one book.
///
/// Exactly one outcome exists per processed book. `Tagged` is non-empty
/// by construction - build values through [`GenreOutcome::tagged`], which
/// maps an empty set to `Unknown`. The `unpopular` / `unknown` sentinel
/// strings exist only at the marker-file boundary; in memory the tag is
/// always explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenreOutcome {
    /// The catalog listed these genres for the book.
    Tagged(BTreeSet<String>),
    /// The book's rating count fell below the popularity threshold.
    Unpopular,
    /// No match, no detail link, or nothing parseable.
    Unknown,
}

/// Marker literal for [`GenreOutcome::Unpopular`].
const UNPOPULAR_LITERAL: &str = "unpopular";

/// Marker literal for [`GenreOutcome::Unknown`].
const UNKNOWN_LITERAL: &str = "unknown";

impl GenreOutcome {
    /// Builds a `Tagged` outcome, collapsing an empty set to `Unknown`.
    #[must_use]
    pub fn tagged(genres: BTreeSet<String>) -> Self {
        if genres.is_empty() {
            Self::Unknown
        } else {
            Self::Tagged(genres)
        }
    }

    /// Short label for log lines.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tagged(_) => "tagged",
            Self::Unpopular => UNPOPULAR_LITERAL,
            Self::Unknown => UNKNOWN_LITERAL,
        }
    }

    /// Encodes the outcome as marker-file text.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Tagged(genres) => genres.iter().cloned().collect::<Vec<_>>().join(", "),
            Self::Unpopular => UNPOPULAR_LITERAL.to_string(),
            Self::Unknown => UNKNOWN_LITERAL.to_string(),
        }
    }

    /// Decodes marker-file text back into an outcome.
    ///
    /// Sentinel literals reconstruct their tags; anything else splits on
    /// commas into a genre set. Blank content decodes to `Unknown`.
    #[must_use]
    pub fn decode(content: &str) -> Self {
        let trimmed = content.trim();
        match trimmed {
            UNPOPULAR_LITERAL => Self::Unpopular,
            UNKNOWN_LITERAL => Self::Unknown,
            _ => Self::tagged(
                trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(ToString::to_string)
                    .collect(),
            ),
        }
    }

    /// The genre set for a `Tagged` outcome.
    #[must_use]
    pub fn genres(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Tagged(genres) => Some(genres),
            _ => None,
        }
    }
}
