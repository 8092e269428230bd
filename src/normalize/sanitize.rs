//! Deterministic search-query sanitization.
//!
//! Pure text processing, no I/O: unit-testable independent of the
//! text-normalization capability.

/// Punctuation stripped from queries. Periods and hyphens survive;
/// hyphen separators are collapsed separately.
const STRIPPED_PUNCTUATION: &str = "!\"#$%&'()*+,/:;<=>?@[\\]^_`{|}~";

/// Bracket characters stripped from queries.
const STRIPPED_BRACKETS: &str = "[](){}";

/// Sanitizes a filename or cleaned title into search-safe query text.
///
/// Steps, in order:
/// 1. Strip the trailing `.{extension}` (case-insensitive)
/// 2. Strip the fixed punctuation set and bracket characters
/// 3. Collapse the separator patterns `" - "` and `"- "` to one space
/// 4. Collapse runs of whitespace and trim
#[must_use]
pub fn sanitize_query(raw: &str, extension: &str) -> String {
    let suffix = format!(".{}", extension.to_ascii_lowercase());
    let name = if raw.to_ascii_lowercase().ends_with(&suffix) {
        &raw[..raw.len() - suffix.len()]
    } else {
        raw
    };

    let stripped: String = name
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(*c) && !STRIPPED_BRACKETS.contains(*c))
        .collect();

    let collapsed = stripped.replace(" - ", " ").replace("- ", " ");

    collapsed.split_whitespace().collect::<Vec<_>>().join(" ")
}
