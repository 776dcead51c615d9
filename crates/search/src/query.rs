use crate::error::{Result, SearchError};
use std::fmt;

/// A trimmed, lowercased, non-empty search query.
///
/// Blank input has no `Query`: callers show the unfiltered document instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query(String);

impl Query {
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring test against `candidate`.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        catalog_protocol::contains_query(candidate, &self.0)
    }

    #[must_use]
    pub fn matches_opt(&self, candidate: Option<&str>) -> bool {
        candidate.is_some_and(|text| self.matches(text))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
