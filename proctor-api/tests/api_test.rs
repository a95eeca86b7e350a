//! Integration tests for the Proctor API.
//!
//! Exercises the full HTTP surface against an isolated database with the
//! completion service unconfigured, so the deterministic fallbacks apply.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use proctor_api::build_router_with_db;
use proctor_common::Config;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

/// Test helper to create a router with an isolated database and no
/// completion provider.
fn create_test_app(temp_dir: &TempDir) -> axum::Router {
    let config = Config::default();
    let db_path = temp_dir.path().join("test-proctor.db");
    build_router_with_db(&config, Some(db_path)).unwrap()
}

/// Helper to make a request and get the JSON response.
async fn request_json(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);

    let request = if let Some(b) = body {
        request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap()
    } else {
        request.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };

    (status, json)
}

/// Create an interview and return its id.
async fn create_interview(app: &axum::Router, role: &str) -> String {
    let (status, body) = request_json(
        app,
        Method::POST,
        "/api/v1/interviews",
        Some(json!({ "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

/// Issue the start action and return the opening message.
async fn start_interview(app: &axum::Router, id: &str) -> String {
    let (status, body) = request_json(
        app,
        Method::POST,
        "/api/v1/interview-ai",
        Some(json!({ "interviewId": id, "action": "start" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["message"].as_str().unwrap().to_string()
}

/// Issue one respond action and return (message, completed).
async fn respond(app: &axum::Router, id: &str, answer: &str) -> (String, bool) {
    let (status, body) = request_json(
        app,
        Method::POST,
        "/api/v1/interview-ai",
        Some(json!({ "interviewId": id, "action": "respond", "userMessage": answer })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
        body["message"].as_str().unwrap().to_string(),
        body["completed"].as_bool().unwrap(),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Health and CORS
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_check() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, body) = request_json(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "proctor-api");
}

#[tokio::test]
async fn test_preflight_probe_succeeds_with_no_body() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/interview-ai")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_unopenable_database_path_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    // A regular file where a directory is needed makes the store unopenable.
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, b"x").unwrap();

    let config = Config::default();
    let result = build_router_with_db(&config, Some(blocker.join("nested").join("p.db")));
    assert!(result.is_err());
}

#[tokio::test]
async fn test_cors_headers_on_regular_responses() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

// ─────────────────────────────────────────────────────────────────────────────
// Interview Sessions
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_interview() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, body) = request_json(
        &app,
        Method::POST,
        "/api/v1/interviews",
        Some(json!({ "role": "Backend Developer" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "Backend Developer");
    assert_eq!(body["status"], "in_progress");
    assert!(body["score"].is_null());
    assert!(body["feedback"].is_null());
    assert!(body["completed_at"].is_null());
}

#[tokio::test]
async fn test_create_interview_rejects_empty_role() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, body) = request_json(
        &app,
        Method::POST,
        "/api/v1/interviews",
        Some(json!({ "role": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_get_unknown_interview_is_404() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, body) =
        request_json(&app, Method::GET, "/api/v1/interviews/no-such-id", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

// ─────────────────────────────────────────────────────────────────────────────
// Orchestrator Entry Point
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_emits_greeting_for_role() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let id = create_interview(&app, "Backend Developer").await;
    let message = start_interview(&app, &id).await;

    assert!(message.contains("Backend Developer"));
    assert!(message.contains("Question 1:"));

    let (status, messages) = request_json(
        &app,
        Method::GET,
        &format!("/api/v1/interviews/{id}/messages"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "ai");
}

#[tokio::test]
async fn test_start_unknown_interview_is_404() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, body) = request_json(
        &app,
        Method::POST,
        "/api/v1/interview-ai",
        Some(json!({ "interviewId": "ghost", "action": "start" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_invalid_action_is_400() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let id = create_interview(&app, "Data Scientist").await;
    let (status, body) = request_json(
        &app,
        Method::POST,
        "/api/v1/interview-ai",
        Some(json!({ "interviewId": id, "action": "restart" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("restart"));
}

#[tokio::test]
async fn test_respond_requires_user_message() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let id = create_interview(&app, "Data Scientist").await;
    start_interview(&app, &id).await;

    let (status, body) = request_json(
        &app,
        Method::POST,
        "/api/v1/interview-ai",
        Some(json!({ "interviewId": id, "action": "respond" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_full_interview_flow_with_fallbacks() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let id = create_interview(&app, "Backend Developer").await;
    start_interview(&app, &id).await;

    for n in 1..=5 {
        let (message, completed) = respond(&app, &id, &format!("answer {n}")).await;
        assert!(!completed, "turn {n} should not complete the interview");
        assert!(message.contains(&format!("Question {}", n + 1)));
    }

    let (message, completed) = respond(&app, &id, "final answer").await;
    assert!(completed);
    assert!(message.contains("SCORE: 75/100"));

    // Feedback read: interview finalized with the fallback score.
    let (status, interview) =
        request_json(&app, Method::GET, &format!("/api/v1/interviews/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(interview["status"], "completed");
    let score = interview["score"].as_i64().unwrap();
    assert_eq!(score, 75);
    assert!((0..=100).contains(&score));
    assert!(interview["feedback"].as_str().unwrap().contains("SCORE"));
    assert!(interview["completed_at"].is_string());

    // 7 AI turns (greeting, 5 follow-ups, assessment) and 6 user turns, in
    // creation order.
    let (_, messages) = request_json(
        &app,
        Method::GET,
        &format!("/api/v1/interviews/{id}/messages"),
        None,
    )
    .await;
    let messages = messages.as_array().unwrap().clone();
    assert_eq!(messages.len(), 13);
    let ai_count = messages.iter().filter(|m| m["role"] == "ai").count();
    assert_eq!(ai_count, 7);
    let timestamps: Vec<chrono::DateTime<chrono::Utc>> = messages
        .iter()
        .map(|m| {
            m["created_at"]
                .as_str()
                .unwrap()
                .parse()
                .expect("created_at is RFC 3339")
        })
        .collect();
    assert!(timestamps.windows(2).all(|pair| pair[0] <= pair[1]));

    // History shows the completed interview.
    let (status, history) =
        request_json(&app, Method::GET, "/api/v1/interviews?limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"].as_str().unwrap(), id);
}

#[tokio::test]
async fn test_respond_after_completion_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let id = create_interview(&app, "UX Designer").await;
    start_interview(&app, &id).await;
    for n in 1..=6 {
        respond(&app, &id, &format!("answer {n}")).await;
    }

    let (status, body) = request_json(
        &app,
        Method::POST,
        "/api/v1/interview-ai",
        Some(json!({ "interviewId": id, "action": "respond", "userMessage": "again" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_events_for_unknown_interview_is_404() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/interviews/no-such-id/events")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
