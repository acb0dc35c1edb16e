//! Error types for scenic-gr
//!
//! `ResolveError` is what the resolver hands back to callers; `ApiError`
//! maps it (and handler-level failures) onto HTTP responses.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

use crate::completion::CompletionError;
use crate::taxonomy::TaxonomyError;

/// Pipeline stage that talks to the completion service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    MainGenreSelection,
    SubGenreMatching,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::MainGenreSelection => f.write_str("main genre selection"),
            Stage::SubGenreMatching => f.write_str("sub-genre matching"),
        }
    }
}

/// Failures surfaced by `GenreResolver::resolve`
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Blank query after trimming
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid limit {limit}: must be between 1 and {max}")]
    InvalidLimit { limit: usize, max: usize },

    /// Taxonomy could not be loaded; the next call retries
    #[error("Taxonomy unavailable: {0}")]
    TaxonomyLoad(#[from] TaxonomyError),

    /// Completion service failed or broke its output contract
    #[error("Resolution failed during {stage}: {source}")]
    ResolutionFailed {
        stage: Stage,
        #[source]
        source: CompletionError,
    },
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resolver failure
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Resolve(err) => match err {
                ResolveError::InvalidQuery(_) | ResolveError::InvalidLimit { .. } => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
                }
                ResolveError::TaxonomyLoad(_) => {
                    tracing::error!(error = %err, "Genre taxonomy unavailable");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "TAXONOMY_UNAVAILABLE",
                        err.to_string(),
                    )
                }
                ResolveError::ResolutionFailed { .. } => {
                    tracing::error!(error = %err, "Genre search failed");
                    (StatusCode::BAD_GATEWAY, "SEARCH_FAILED", err.to_string())
                }
            },
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
