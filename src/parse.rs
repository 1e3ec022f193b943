use crate::error::MatchError;
use regex::{Regex, RegexBuilder};

/// Compiled size cap for highlight patterns built from user input
const HIGHLIGHT_SIZE_LIMIT: usize = 1 << 20;

/// Trim a raw input value into the query the resolvers see
pub fn normalize_query(raw: &str) -> &str {
    raw.trim()
}

/// True when nothing would be searched for
pub fn is_blank(raw: &str) -> bool {
    normalize_query(raw).is_empty()
}

/// Split a query into whitespace-separated terms (ASCII and ideographic spaces)
pub fn query_terms(query: &str) -> Vec<&str> {
    query.split_whitespace().collect()
}

/// Case-insensitive matcher for the literal terms of a query
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Regex,
}

impl Highlighter {
    /// Build a highlighter; Ok(None) when the query has no terms
    pub fn new(query: &str) -> Result<Option<Self>, MatchError> {
        Self::with_size_limit(query, HIGHLIGHT_SIZE_LIMIT)
    }

    pub fn with_size_limit(query: &str, size_limit: usize) -> Result<Option<Self>, MatchError> {
        let mut terms = query_terms(query);
        if terms.is_empty() {
            return Ok(None);
        }
        // Longest first so overlapping terms prefer the longer match
        terms.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .size_limit(size_limit)
            .build()?;
        Ok(Some(Highlighter { pattern }))
    }

    /// Byte ranges of every match in `text`, in order and non-overlapping
    pub fn ranges(&self, text: &str) -> Vec<(usize, usize)> {
        self.pattern
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| (m.start(), m.end()))
            .collect()
    }
}
