//! Query classification
//!
//! A query "looks like a bare genre name" when it is short and made only of
//! ASCII letters, digits and whitespace. Such queries go to the keyword
//! matcher; everything else takes the semantic path.

/// Queries at or above this many characters are always complex
pub const SIMPLE_QUERY_MAX_CHARS: usize = 30;

/// Search strategy selected for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Simple,
    Complex,
}

/// True iff `query` is non-empty, ASCII alphanumeric/whitespace only, and shorter than 30 chars
pub fn is_simple(query: &str) -> bool {
    !query.is_empty()
        && query.chars().count() < SIMPLE_QUERY_MAX_CHARS
        && query
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
}

pub fn classify(query: &str) -> QueryKind {
    if is_simple(query) {
        QueryKind::Simple
    } else {
        QueryKind::Complex
    }
}
