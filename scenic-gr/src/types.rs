//! Core data types for genre resolution
//!
//! `GenreEntry` is the taxonomy node; `GenreMatch` and `ResolutionResult`
//! are the per-request output shapes returned to callers and cached.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Taxonomy granularity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Main,
    Sub,
    Detailed,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Main => "main",
            Tier::Sub => "sub",
            Tier::Detailed => "detailed",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Tier::Main => 0,
            Tier::Sub => 1,
            Tier::Detailed => 2,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "main" => Ok(Tier::Main),
            "sub" => Ok(Tier::Sub),
            "detailed" => Ok(Tier::Detailed),
            other => Err(format!("unknown tier '{}'", other)),
        }
    }
}

/// Lightweight genre reference embedded in a main genre (its sub-genre list)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreRef {
    pub name: String,
    pub description: String,
    pub reference_url: String,
}

/// Child summary attached by a detailed record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreSummary {
    pub name: String,
    pub description: String,
    pub tier: Tier,
}

/// A node in the genre taxonomy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreEntry {
    pub name: String,
    pub description: String,
    pub reference_url: String,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<GenreSummary>>,
    /// Only populated on main-tier entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_genres: Option<Vec<GenreRef>>,
}

/// Case-insensitive name key used by every taxonomy lookup
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A genre recommended for a query, enriched from the taxonomy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreMatch {
    pub name: String,
    pub description: String,
    pub reference_url: String,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub match_reason: String,
    /// 0.0-1.0
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_vibe: Option<String>,
}

impl GenreMatch {
    /// Build a match from a taxonomy entry plus the match-specific fields
    pub fn from_entry(
        entry: &GenreEntry,
        match_reason: impl Into<String>,
        confidence: f64,
        scene_vibe: Option<String>,
    ) -> Self {
        Self {
            name: entry.name.clone(),
            description: entry.description.clone(),
            reference_url: entry.reference_url.clone(),
            tier: entry.tier,
            parent: entry.parent.clone(),
            match_reason: match_reason.into(),
            confidence,
            scene_vibe,
        }
    }
}

/// Complete answer to a resolve call; cached verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub query: String,
    pub matches: Vec<GenreMatch>,
    pub related_terms: Vec<String>,
    pub summary: String,
}
