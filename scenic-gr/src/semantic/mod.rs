//! Hierarchical semantic resolver
//!
//! Stage 1 narrows the main-tier vocabulary to at most three categories.
//! Stage 2 matches the query against only the sub-genres of those
//! categories. Stage 2 names are then enriched from the taxonomy; names the
//! taxonomy does not know are dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::completion::{complete_structured, CompletionError, CompletionRequest, CompletionService};
use crate::error::{ResolveError, Stage};
use crate::lexicon::extract_hints;
use crate::taxonomy::Taxonomy;
use crate::types::{normalize_name, GenreMatch, GenreRef, ResolutionResult, Tier};

pub mod prompts;
pub mod schema;

pub use schema::{CandidateMatch, MainGenreSelection, SubGenreMatching, MAX_MAIN_SELECTIONS};

pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(30);

/// Two-stage resolver backed by a completion service
pub struct SemanticResolver {
    completion: Arc<dyn CompletionService>,
    timeout: Duration,
    /// Sub-genre lists keyed by normalized main-genre name; only validated names are inserted
    sub_genres: RwLock<HashMap<String, Arc<Vec<GenreRef>>>>,
}

impl SemanticResolver {
    pub fn new(completion: Arc<dyn CompletionService>, timeout: Duration) -> Self {
        Self {
            completion,
            timeout,
            sub_genres: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.completion.is_available()
    }

    /// Full semantic path for an already-trimmed query
    pub async fn resolve(
        &self,
        taxonomy: &Taxonomy,
        query: &str,
        limit: usize,
    ) -> Result<ResolutionResult, ResolveError> {
        let hints = extract_hints(query);
        tracing::debug!(query = %query, hints = ?hints, "Semantic resolution started");

        let mains = self.select_main_genres(taxonomy, query, &hints).await?;

        let mut groups = Vec::with_capacity(mains.len());
        for main in &mains {
            let subs = self.sub_genres_for(taxonomy, main).await;
            groups.push((main.clone(), subs));
        }

        let request = CompletionRequest {
            system: prompts::SYSTEM_ROLE.to_string(),
            prompt: prompts::sub_genre_prompt(query, &hints, &groups, limit),
            output: schema::sub_genre_matching_schema(limit),
        };
        let reply: SubGenreMatching = complete_structured(self.completion.as_ref(), request, self.timeout)
            .await
            .map_err(|source| failed(Stage::SubGenreMatching, source))?;
        reply
            .check_confidences()
            .map_err(|source| failed(Stage::SubGenreMatching, source))?;

        let matches = enrich(taxonomy, reply.matches, limit);
        tracing::debug!(query = %query, matches = matches.len(), "Semantic resolution finished");

        Ok(ResolutionResult {
            query: query.to_string(),
            matches,
            related_terms: reply.related_terms,
            summary: reply.summary,
        })
    }

    /// Stage 1, returning canonical main-tier names
    async fn select_main_genres(
        &self,
        taxonomy: &Taxonomy,
        query: &str,
        hints: &[&str],
    ) -> Result<Vec<String>, ResolveError> {
        let mains = taxonomy.list_by_tier(Tier::Main);
        let request = CompletionRequest {
            system: prompts::SYSTEM_ROLE.to_string(),
            prompt: prompts::main_selection_prompt(query, hints, &mains),
            output: schema::main_genre_selection_schema(),
        };

        let reply: MainGenreSelection = complete_structured(self.completion.as_ref(), request, self.timeout)
            .await
            .map_err(|source| failed(Stage::MainGenreSelection, source))?;

        let selected = validate_main_selection(taxonomy, reply)?;
        tracing::debug!(query = %query, selected = ?selected, "Main genres selected");
        Ok(selected)
    }

    async fn sub_genres_for(&self, taxonomy: &Taxonomy, main: &str) -> Arc<Vec<GenreRef>> {
        let key = normalize_name(main);
        if let Some(subs) = self.sub_genres.read().await.get(&key) {
            return Arc::clone(subs);
        }

        let mut cache = self.sub_genres.write().await;
        Arc::clone(
            cache
                .entry(key)
                .or_insert_with(|| Arc::new(taxonomy.sub_genres_of(main).to_vec())),
        )
    }

    /// Main genres whose sub-genre lists are currently cached
    pub async fn cached_main_genres(&self) -> usize {
        self.sub_genres.read().await.len()
    }
}

fn failed(stage: Stage, source: CompletionError) -> ResolveError {
    ResolveError::ResolutionFailed { stage, source }
}

/// Keep stage 1 names that exist in the main tier, at most three, without duplicates
fn validate_main_selection(
    taxonomy: &Taxonomy,
    reply: MainGenreSelection,
) -> Result<Vec<String>, ResolveError> {
    if reply.selected_main_genres.is_empty() {
        return Err(failed(
            Stage::MainGenreSelection,
            CompletionError::SchemaViolation("no main genre selected".to_string()),
        ));
    }

    let mut selected: Vec<String> = Vec::new();
    for name in reply.selected_main_genres {
        match taxonomy.get_by_name(&name) {
            Some(entry) if entry.tier == Tier::Main => {
                if !selected.contains(&entry.name) {
                    selected.push(entry.name.clone());
                }
            }
            _ => tracing::warn!(name = %name, "Dropping unknown main genre from selection"),
        }
        if selected.len() == MAX_MAIN_SELECTIONS {
            break;
        }
    }

    if selected.is_empty() {
        return Err(failed(
            Stage::MainGenreSelection,
            CompletionError::SchemaViolation(
                "none of the selected main genres exist in the taxonomy".to_string(),
            ),
        ));
    }
    Ok(selected)
}

/// Look up stage 2 names (first `limit` only), dropping names the taxonomy does not know
pub fn enrich(taxonomy: &Taxonomy, candidates: Vec<CandidateMatch>, limit: usize) -> Vec<GenreMatch> {
    candidates
        .into_iter()
        .take(limit)
        .filter_map(|candidate| match taxonomy.get_by_name(&candidate.name) {
            Some(entry) => Some(GenreMatch::from_entry(
                entry,
                candidate.match_reason,
                candidate.confidence,
                candidate.scene_vibe,
            )),
            None => {
                tracing::debug!(name = %candidate.name, "Dropping unknown genre from matches");
                None
            }
        })
        .collect()
}
