//! Resolve orchestrator
//!
//! Validates input, consults the response cache, then dispatches to the
//! keyword matcher or the semantic resolver depending on how the query
//! classifies. Successful uncached results are cached exactly once.

use std::sync::Arc;
use std::time::Instant;

use crate::cache::{CacheKey, ResponseCache};
use crate::classifier::{classify, QueryKind};
use crate::error::ResolveError;
use crate::keyword;
use crate::semantic::SemanticResolver;
use crate::taxonomy::{Taxonomy, TaxonomyError, TaxonomyStore};
use crate::types::ResolutionResult;

pub const DEFAULT_LIMIT: usize = 5;
pub const DEFAULT_MAX_LIMIT: usize = 20;

/// Shared resolution service; one per process, cloned behind `Arc`
pub struct GenreResolver {
    taxonomy: TaxonomyStore,
    cache: ResponseCache,
    semantic: SemanticResolver,
    max_limit: usize,
}

impl GenreResolver {
    pub fn new(taxonomy: TaxonomyStore, cache: ResponseCache, semantic: SemanticResolver) -> Self {
        Self {
            taxonomy,
            cache,
            semantic,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }

    pub fn with_max_limit(mut self, max_limit: usize) -> Self {
        self.max_limit = max_limit.max(1);
        self
    }

    pub fn max_limit(&self) -> usize {
        self.max_limit
    }

    pub fn taxonomy(&self) -> &TaxonomyStore {
        &self.taxonomy
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn semantic(&self) -> &SemanticResolver {
        &self.semantic
    }

    /// Resolve a scene description or genre name into ranked genre matches
    pub async fn resolve(&self, query: &str, limit: usize) -> Result<ResolutionResult, ResolveError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::InvalidQuery("query must not be blank".to_string()));
        }
        if limit == 0 || limit > self.max_limit {
            return Err(ResolveError::InvalidLimit {
                limit,
                max: self.max_limit,
            });
        }

        let key = CacheKey::new(query, limit);
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!(query = %query, limit, "Cache hit");
            return Ok(hit);
        }
        tracing::debug!(query = %query, limit, "Cache miss");

        let started = Instant::now();
        let taxonomy = self.taxonomy.taxonomy().await?;
        let kind = classify(query);
        let result = match kind {
            QueryKind::Simple => keyword::search(&taxonomy, query, limit),
            QueryKind::Complex => self.semantic.resolve(&taxonomy, query, limit).await?,
        };

        tracing::info!(
            query = %query,
            limit,
            kind = ?kind,
            matches = result.matches.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query resolved"
        );

        self.cache.set(key, result.clone()).await;
        Ok(result)
    }

    /// Loaded taxonomy, initializing on first use
    pub async fn loaded_taxonomy(&self) -> Result<Arc<Taxonomy>, TaxonomyError> {
        self.taxonomy.taxonomy().await
    }
}
