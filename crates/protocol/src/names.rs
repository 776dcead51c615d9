//! Case-insensitive name comparison shared by tag selection, file-name
//! resolution and search.
//!
//! Every equality check between a tag and a category name goes through
//! [`names_match`] so both sides are normalized the same way.

/// Trims surrounding whitespace and lowercases.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[must_use]
pub fn names_match(left: &str, right: &str) -> bool {
    normalize_name(left) == normalize_name(right)
}

/// Removes every whitespace character, including interior ones.
#[must_use]
pub fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Substring test of an already lowercased query against a candidate text.
#[must_use]
pub fn contains_query(candidate: &str, query: &str) -> bool {
    candidate.to_lowercase().contains(query)
}
