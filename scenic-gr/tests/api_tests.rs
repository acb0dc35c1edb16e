//! Integration tests for scenic-gr HTTP endpoints

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

use helpers::{fixture_detailed, fixture_mains, fixture_resolver, CountingSource, Reply, ScriptedCompletion};
use scenic_gr::taxonomy::InMemorySource;
use scenic_gr::{build_router, AppState};

/// Test helper: router over the fixture taxonomy with a scripted completion service
fn create_test_app(main: Reply, sub: Reply) -> (Router, Arc<ScriptedCompletion>) {
    let completion = Arc::new(ScriptedCompletion::new(main, sub));
    let resolver = fixture_resolver(
        Arc::new(InMemorySource::new(fixture_mains(), fixture_detailed())),
        completion.clone(),
    );
    let state = AppState::new(Arc::new(resolver), 5);
    (build_router(state), completion)
}

fn default_app() -> Router {
    create_test_app(
        Reply::Json(json!({"selectedMainGenres": ["Ambient"], "reasoning": "quiet"})),
        Reply::Json(json!({
            "matches": [
                {"name": "Space Ambient", "matchReason": "Slow synth washes", "confidence": 0.9, "sceneVibe": "Weightless"}
            ],
            "relatedTerms": ["stargazing"],
            "summary": "Slow washes under a dark sky"
        })),
    )
    .0
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, json) = send(default_app(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["module"], "scenic-gr");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["git_hash"], env!("GIT_HASH"));
    assert!(!json["git_hash"].as_str().unwrap().is_empty());
    // Nothing has touched the taxonomy yet
    assert_eq!(json["taxonomy_loaded"], false);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["cache_entries"], 0);
    assert_eq!(json["semantic_search"], true);
}

#[tokio::test]
async fn test_post_search_simple_query() {
    let (status, json) = send(
        default_app(),
        post_json("/api/genres/search", json!({"query": "Jazz", "limit": 2})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["query"], "Jazz");
    let matches = json["matches"].as_array().unwrap();
    assert!(matches.len() <= 2);
    assert_eq!(matches[0]["name"], "Jazz");
    assert_eq!(matches[0]["confidence"], 1.0);
    assert_eq!(matches[0]["referenceUrl"], "https://example.org/jazz");
    assert_eq!(matches[0]["matchReason"], "Name match: \"Jazz\"");
    assert_eq!(json["relatedTerms"], json!([]));
}

#[tokio::test]
async fn test_get_search_scene_query() {
    let (app, completion) = create_test_app(
        Reply::Json(json!({"selectedMainGenres": ["Ambient"], "reasoning": "quiet"})),
        Reply::Json(json!({
            "matches": [
                {"name": "Space Ambient", "matchReason": "Slow synth washes", "confidence": 0.9, "sceneVibe": "Weightless"}
            ],
            "relatedTerms": ["stargazing"],
            "summary": "Slow washes under a dark sky"
        })),
    );

    // "凌晨看星星" percent-encoded
    let uri = "/api/genres/search?q=%E5%87%8C%E6%99%A8%E7%9C%8B%E6%98%9F%E6%98%9F";
    let (status, json) = send(app.clone(), get(uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["query"], "凌晨看星星");
    assert_eq!(json["matches"][0]["name"], "Space Ambient");
    assert_eq!(json["matches"][0]["tier"], "sub");
    assert_eq!(json["matches"][0]["parent"], "Ambient");
    assert_eq!(json["matches"][0]["sceneVibe"], "Weightless");
    assert_eq!(completion.calls(), 2);

    // Same query, default limit: served from cache
    let (status, _) = send(app.clone(), get(uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completion.calls(), 2);

    let (_, health) = send(app, get("/health")).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["cache_entries"], 1);
}

#[tokio::test]
async fn test_blank_query_is_bad_request() {
    let (status, json) = send(
        default_app(),
        post_json("/api/genres/search", json!({"query": "   "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");

    let (status, _) = send(default_app(), get("/api/genres/search?q=Jazz&limit=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_query_field_is_bad_request() {
    let (app, completion) = create_test_app(Reply::Status(500), Reply::Status(500));
    let (status, json) = send(app, post_json("/api/genres/search", json!({"limit": 3}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
    assert!(json["error"]["message"].as_str().unwrap().contains("query"));
    assert_eq!(completion.calls(), 0);
}

#[tokio::test]
async fn test_malformed_request_bodies_use_error_envelope() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/genres/search")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(default_app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");

    let (status, json) = send(default_app(), get("/api/genres/search?q=Jazz&limit=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
    assert!(json["error"]["message"].is_string());
}

#[tokio::test]
async fn test_completion_failure_is_bad_gateway() {
    let (app, _) = create_test_app(Reply::Status(500), Reply::Status(500));
    let (status, json) = send(
        app,
        post_json("/api/genres/search", json!({"query": "雨天的咖啡馆"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["code"], "SEARCH_FAILED");
}

#[tokio::test]
async fn test_taxonomy_failure_is_service_unavailable() {
    let source = Arc::new(CountingSource::new(fixture_mains(), vec![]).failing_first(1));
    let completion = Arc::new(ScriptedCompletion::new(Reply::Status(500), Reply::Status(500)));
    let state = AppState::new(Arc::new(fixture_resolver(source, completion)), 5);
    let app = build_router(state);

    let (status, json) = send(app.clone(), get("/api/genres?tier=main")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "TAXONOMY_UNAVAILABLE");

    let (status, json) = send(app, get("/api/genres?tier=main")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_genres_by_tier() {
    let (status, json) = send(default_app(), get("/api/genres?tier=Main")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ambient", "Electronic", "Jazz"]);
    assert_eq!(json[0]["subGenres"][0]["name"], "Dark Ambient");

    let (status, json) = send(default_app(), get("/api/genres")).await;
    assert_eq!(status, StatusCode::OK);
    // 3 main + 8 sub (Synthwave upgraded in place) + Darksynth
    assert_eq!(json.as_array().unwrap().len(), 12);

    let (status, json) = send(default_app(), get("/api/genres?tier=genre")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_get_genre_by_name() {
    let (status, json) = send(default_app(), get("/api/genres/synthwave")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Synthwave");
    assert_eq!(json["tier"], "detailed");
    assert_eq!(json["children"][0]["name"], "Darksynth");

    let (status, json) = send(default_app(), get("/api/genres/Bossa%20Nova")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["parent"], "Jazz");

    let (status, json) = send(default_app(), get("/api/genres/Polka")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}
