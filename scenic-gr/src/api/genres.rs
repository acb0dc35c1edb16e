//! Genre search and lookup endpoints
//!
//! - POST /api/genres/search  `{"query": "...", "limit": 5}`
//! - GET  /api/genres/search?q=...&limit=5
//! - GET  /api/genres?tier=main|sub|detailed
//! - GET  /api/genres/:name

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::ResolveError;
use crate::types::{GenreEntry, ResolutionResult, Tier};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub tier: Option<String>,
}

/// POST /api/genres/search
pub async fn search_genres(
    State(state): State<AppState>,
    request: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<ResolutionResult>> {
    let Json(request) = request?;
    run_search(&state, &request.query, request.limit).await
}

/// GET /api/genres/search
pub async fn search_genres_query(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<ResolutionResult>> {
    let Query(params) = params?;
    run_search(&state, &params.q, params.limit).await
}

async fn run_search(
    state: &AppState,
    query: &str,
    limit: Option<usize>,
) -> ApiResult<Json<ResolutionResult>> {
    let limit = limit.unwrap_or(state.default_limit);
    let result = state.resolver.resolve(query, limit).await?;
    Ok(Json(result))
}

/// GET /api/genres
pub async fn list_genres(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<GenreEntry>>> {
    let Query(params) = params?;
    let store = state.resolver.taxonomy();
    let entries = match params.tier.as_deref() {
        Some(raw) => {
            let tier: Tier = raw.parse().map_err(ApiError::BadRequest)?;
            store.list_by_tier(tier).await
        }
        None => store.list_all().await,
    }
    .map_err(ResolveError::from)?;

    Ok(Json(entries))
}

/// GET /api/genres/:name
pub async fn get_genre(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<GenreEntry>> {
    state
        .resolver
        .taxonomy()
        .get_by_name(&name)
        .await
        .map_err(ResolveError::from)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Genre '{}'", name)))
}

/// Build genre routes
pub fn genre_routes() -> Router<AppState> {
    Router::new()
        .route("/api/genres", get(list_genres))
        .route(
            "/api/genres/search",
            get(search_genres_query).post(search_genres),
        )
        .route("/api/genres/:name", get(get_genre))
}
