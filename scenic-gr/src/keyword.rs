//! Keyword matcher: deterministic, model-free search over the taxonomy
//!
//! Primary path for simple queries. Never touches the completion service.

use crate::taxonomy::Taxonomy;
use crate::types::{GenreMatch, ResolutionResult};

/// Confidence for a case-insensitive exact name hit
pub const EXACT_MATCH_CONFIDENCE: f64 = 1.0;
/// Confidence for any other substring hit
pub const PARTIAL_MATCH_CONFIDENCE: f64 = 0.7;

/// Substring search wrapped as a resolution result
pub fn search(taxonomy: &Taxonomy, query: &str, limit: usize) -> ResolutionResult {
    let reason = format!("Name match: \"{}\"", query);
    let needle = query.trim().to_lowercase();

    let matches: Vec<GenreMatch> = taxonomy
        .search(query, limit)
        .into_iter()
        .map(|entry| {
            let confidence = if entry.name.to_lowercase() == needle {
                EXACT_MATCH_CONFIDENCE
            } else {
                PARTIAL_MATCH_CONFIDENCE
            };
            GenreMatch::from_entry(entry, reason.clone(), confidence, None)
        })
        .collect();

    let summary = match matches.len() {
        0 => "No matching genres found".to_string(),
        1 => "Found 1 matching genre".to_string(),
        n => format!("Found {} matching genres", n),
    };

    ResolutionResult {
        query: query.to_string(),
        matches,
        related_terms: Vec::new(),
        summary,
    }
}
