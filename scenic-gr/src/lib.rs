//! scenic-gr library interface
//!
//! Resolves genre names and free-text scene descriptions into ranked genre
//! matches from a fixed taxonomy. `GenreResolver` is the service; the
//! `api` module exposes it over HTTP.

pub mod api;
pub mod cache;
pub mod classifier;
pub mod completion;
pub mod config;
pub mod error;
pub mod keyword;
pub mod lexicon;
pub mod resolver;
pub mod semantic;
pub mod taxonomy;
pub mod types;

pub use crate::error::{ApiError, ApiResult, ResolveError};
pub use crate::resolver::GenreResolver;

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<GenreResolver>,
    /// Limit applied when a search request omits one
    pub default_limit: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(resolver: Arc<GenreResolver>, default_limit: usize) -> Self {
        Self {
            resolver,
            default_limit,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::genre_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
