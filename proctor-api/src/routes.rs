//! Route definitions for the Proctor API.
//!
//! Provides the orchestrator entry point, interview session endpoints,
//! the message-event subscription stream, and health checks.

use crate::sse::events_handler;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use proctor_common::Error;
use proctor_engine::Orchestrator;
use proctor_store::{Interview, Message, SqliteStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub orchestrator: Arc<Orchestrator>,
}

/// Orchestrator entry-point request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorRequest {
    pub interview_id: String,
    pub action: String,
    #[serde(default)]
    pub user_message: Option<String>,
}

/// Orchestrator entry-point response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrchestratorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create-interview request body.
#[derive(Debug, Deserialize)]
pub struct CreateInterviewRequest {
    pub role: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
}

/// History listing query parameters.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: u32,
}

fn default_history_limit() -> u32 {
    20
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a domain error onto the wire contract.
pub(crate) fn error_response(e: &Error) -> ApiError {
    (
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// Build the API routes for the given state.
pub fn build_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/interview-ai", post(interview_ai_handler))
        .route(
            "/api/v1/interviews",
            post(create_interview_handler).get(list_interviews_handler),
        )
        .route("/api/v1/interviews/:id", get(get_interview_handler))
        .route(
            "/api/v1/interviews/:id/messages",
            get(list_messages_handler),
        )
        .route("/api/v1/interviews/:id/events", get(events_handler))
        .with_state(state)
        .merge(health_routes())
}

/// Build health check routes.
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/health", get(health_handler))
}

// ─────────────────────────────────────────────────────────────────────────────
// Orchestrator Entry Point
// ─────────────────────────────────────────────────────────────────────────────

/// The orchestrator wire contract: `{interviewId, action, userMessage?}` in,
/// `{message, completed?}` or `{error}` out.
async fn interview_ai_handler(
    State(state): State<AppState>,
    Json(request): Json<OrchestratorRequest>,
) -> Result<Json<OrchestratorResponse>, ApiError> {
    match request.action.as_str() {
        "start" => {
            let message = state
                .orchestrator
                .start(&request.interview_id)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, interview_id = %request.interview_id, "start failed");
                    error_response(&e)
                })?;

            Ok(Json(OrchestratorResponse {
                message,
                completed: None,
            }))
        }
        "respond" => {
            let user_message = request
                .user_message
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    error_response(&Error::InvalidInput(
                        "userMessage is required for respond".into(),
                    ))
                })?;

            let outcome = state
                .orchestrator
                .respond(&request.interview_id, user_message)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, interview_id = %request.interview_id, "respond failed");
                    error_response(&e)
                })?;

            Ok(Json(OrchestratorResponse {
                message: outcome.message,
                completed: Some(outcome.completed),
            }))
        }
        _ => Err(error_response(&Error::InvalidInput(format!(
            "invalid action '{}'",
            request.action
        )))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Interview Session Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Create a new in-progress interview for a role.
async fn create_interview_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<Interview>), ApiError> {
    let role = request.role.trim();
    if role.is_empty() {
        return Err(error_response(&Error::InvalidInput(
            "role must not be empty".into(),
        )));
    }

    let interview = state.store.create_interview(role).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to create interview");
        error_response(&e)
    })?;

    Ok((StatusCode::CREATED, Json(interview)))
}

/// Fetch one interview row (the feedback read once `completed` is signaled).
async fn get_interview_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Interview>, ApiError> {
    let interview = state
        .store
        .get_interview(&id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to get interview");
            error_response(&e)
        })?
        .ok_or_else(|| error_response(&Error::NotFound(format!("interview {id}"))))?;

    Ok(Json(interview))
}

/// List completed interviews, newest first.
async fn list_interviews_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Interview>>, ApiError> {
    let interviews = state
        .store
        .list_completed_interviews(query.limit)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list interviews");
            error_response(&e)
        })?;

    Ok(Json(interviews))
}

/// Full ordered message history for an interview.
async fn list_messages_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    state
        .store
        .get_interview(&id)
        .await
        .map_err(|e| error_response(&e))?
        .ok_or_else(|| error_response(&Error::NotFound(format!("interview {id}"))))?;

    let messages = state.store.list_messages(&id).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list messages");
        error_response(&e)
    })?;

    Ok(Json(messages))
}

// ─────────────────────────────────────────────────────────────────────────────
// Health Handler
// ─────────────────────────────────────────────────────────────────────────────

/// Health check handler.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        service: "proctor-api".into(),
    })
}
