//! Structured-output contracts for the two semantic stages

use serde::Deserialize;
use serde_json::json;

use crate::completion::{CompletionError, OutputSchema};

/// Upper bound on main genres kept from stage 1
pub const MAX_MAIN_SELECTIONS: usize = 3;

/// Stage 1 reply
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainGenreSelection {
    pub selected_main_genres: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// One stage 2 candidate, before enrichment
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMatch {
    pub name: String,
    #[serde(alias = "reason")]
    pub match_reason: String,
    pub confidence: f64,
    #[serde(default)]
    pub scene_vibe: Option<String>,
}

/// Stage 2 reply
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubGenreMatching {
    pub matches: Vec<CandidateMatch>,
    #[serde(default)]
    pub related_terms: Vec<String>,
    pub summary: String,
}

impl SubGenreMatching {
    /// Reject confidences that are not finite or fall outside [0, 1]
    pub fn check_confidences(&self) -> Result<(), CompletionError> {
        match self
            .matches
            .iter()
            .find(|m| !m.confidence.is_finite() || !(0.0..=1.0).contains(&m.confidence))
        {
            Some(bad) => Err(CompletionError::SchemaViolation(format!(
                "confidence {} for '{}' is outside [0, 1]",
                bad.confidence, bad.name
            ))),
            None => Ok(()),
        }
    }
}

pub fn main_genre_selection_schema() -> OutputSchema {
    OutputSchema {
        name: "main_genre_selection",
        schema: json!({
            "type": "object",
            "properties": {
                "selectedMainGenres": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "maxItems": MAX_MAIN_SELECTIONS,
                    "description": "1-3 main genre names copied exactly from the supplied list"
                },
                "reasoning": {
                    "type": "string",
                    "description": "Brief explanation of the choice"
                }
            },
            "required": ["selectedMainGenres", "reasoning"]
        }),
    }
}

pub fn sub_genre_matching_schema(limit: usize) -> OutputSchema {
    OutputSchema {
        name: "sub_genre_matching",
        schema: json!({
            "type": "object",
            "properties": {
                "matches": {
                    "type": "array",
                    "maxItems": limit,
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {
                                "type": "string",
                                "description": "Genre name copied exactly from the supplied list"
                            },
                            "matchReason": {
                                "type": "string",
                                "description": "How the sound of this genre resonates with the scene, in one short sentence about instruments, timbre, rhythm and mood"
                            },
                            "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
                            "sceneVibe": {
                                "type": "string",
                                "description": "Purely sonic description of the music itself, without mentioning the scene or any listener"
                            }
                        },
                        "required": ["name", "matchReason", "confidence", "sceneVibe"]
                    }
                },
                "relatedTerms": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Related search terms for further exploration"
                },
                "summary": {
                    "type": "string",
                    "description": "One sentence on how the scene and the music fit together"
                }
            },
            "required": ["matches", "relatedTerms", "summary"]
        }),
    }
}
