//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" once the taxonomy is loaded, "degraded" before that
    pub status: String,
    /// Module name ("scenic-gr")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Short git hash captured at build time
    pub git_hash: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    pub taxonomy_loaded: bool,
    /// Physically present response cache entries (expired ones included)
    pub cache_entries: usize,
    /// False when no completion API key is configured
    pub semantic_search: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let taxonomy_loaded = state.resolver.taxonomy().is_loaded();

    Json(HealthResponse {
        status: if taxonomy_loaded { "ok" } else { "degraded" }.to_string(),
        module: "scenic-gr".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
        taxonomy_loaded,
        cache_entries: state.resolver.cache().len().await,
        semantic_search: state.resolver.semantic().is_available(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
