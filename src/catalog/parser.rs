//! HTML extraction for catalog search and detail pages.
//!
//! All functions are pure over the page text: they parse, extract, and
//! drop the DOM before returning, so results can cross task boundaries.
//! Missing or malformed markup degrades to `None` / `0` / empty sets
//! rather than errors.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, trace};

/// Book-record marker on the search results page.
#[allow(clippy::expect_used)]
static BOOK_ROW: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"tr[itemscope][itemtype="http://schema.org/Book"]"#)
        .expect("book row selector is valid") // Static pattern, safe to panic
});

/// Ratings text inside a book record.
#[allow(clippy::expect_used)]
static MINIRATING: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("span.minirating").expect("minirating selector is valid") // Static pattern, safe to panic
});

/// Detail anchor inside a book record.
#[allow(clippy::expect_used)]
static BOOK_TITLE_LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a.bookTitle").expect("book title selector is valid") // Static pattern, safe to panic
});

/// Genre label elements on a detail page.
#[allow(clippy::expect_used)]
static GENRE_LABEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("span.BookPageMetadataSection__genreButton span.Button__labelItem")
        .expect("genre label selector is valid") // Static pattern, safe to panic
});

/// Reveal-more control on a detail page.
#[allow(clippy::expect_used)]
static REVEAL_CONTROL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"button[aria-label="Show all items in the list"]"#)
        .expect("reveal control selector is valid") // Static pattern, safe to panic
});

/// Extracts the first book record from a search results page.
///
/// Only the first match is ever authoritative; later rows are ignored.
/// Returns the record's HTML so rating and link extraction can run on it
/// independently.
#[must_use]
pub fn parse_search_results(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let row = document.select(&BOOK_ROW).next()?;
    trace!("found first book record");
    Some(row.html())
}

/// Parses a book-record fragment. Rows only parse inside a table context.
fn parse_record(record: &str) -> Html {
    Html::parse_fragment(&format!("<table>{record}</table>"))
}

/// Extracts the rating count from a book record.
///
/// The ratings text reads like `"4.27 avg rating — 12,345 ratings"`: the
/// count is the token preceding the unit word, after the em dash, with
/// thousands separators stripped. Any parse failure returns 0 - below
/// every sensible threshold, not an error.
#[must_use]
pub fn extract_rating_count(record: &str) -> u64 {
    let fragment = parse_record(record);
    let Some(minirating) = fragment.select(&MINIRATING).next() else {
        debug!("no ratings text in record");
        return 0;
    };

    let text: String = minirating.text().collect();
    let after_dash = text.rsplit('\u{2014}').next().unwrap_or("").trim();
    let Some(count_token) = after_dash.split_whitespace().next() else {
        debug!("ratings text has no count token");
        return 0;
    };

    match count_token.replace(',', "").parse::<u64>() {
        Ok(count) => count,
        Err(_) => {
            debug!(token = %count_token, "ratings count not numeric");
            0
        }
    }
}

/// Extracts the detail link from a book record, if present.
#[must_use]
pub fn extract_detail_link(record: &str) -> Option<String> {
    let fragment = parse_record(record);
    let anchor = fragment.select(&BOOK_TITLE_LINK).next()?;
    let href = anchor.value().attr("href")?;
    if href.is_empty() {
        return None;
    }
    Some(href.to_string())
}

/// Extracts the genre tags from a detail page. Duplicates collapse.
///
/// An empty set is a legitimate result - some entries list no genres.
#[must_use]
pub fn parse_genre_tags(html: &str) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    document
        .select(&GENRE_LABEL)
        .map(|label| label.text().collect::<String>().trim().to_string())
        .filter(|genre| !genre.is_empty())
        .collect()
}

/// Whether the detail page carries a reveal-more control hiding further
/// genre tags behind a client interaction.
#[must_use]
pub fn has_reveal_control(html: &str) -> bool {
    let document = Html::parse_document(html);
    document.select(&REVEAL_CONTROL).next().is_some()
}
