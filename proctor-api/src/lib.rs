//! Proctor API - HTTP surface for the mock-interview service.
//!
//! Exposes the orchestrator entry point (`/api/v1/interview-ai`), interview
//! session endpoints, an SSE stream of newly inserted messages per interview,
//! and health checks. Every response carries permissive CORS headers; OPTIONS
//! preflight probes succeed with no body.

#![warn(clippy::all)]

pub mod routes;
pub mod sse;

pub use routes::{
    AppState, CreateInterviewRequest, ErrorResponse, HealthResponse, OrchestratorRequest,
    OrchestratorResponse,
};

use anyhow::Context;
use axum::Router;
use proctor_common::Config;
use proctor_engine::{provider::provider_from_config, Orchestrator};
use proctor_store::SqliteStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the API router with all routes and middleware.
pub fn build_router(config: &Config) -> anyhow::Result<Router> {
    let db_path = config.database.resolved_path();
    build_router_with_db(config, Some(db_path))
}

/// Build the API router using a custom database path.
/// This is useful for testing with isolated databases.
pub fn build_router_with_db(config: &Config, db_path: Option<PathBuf>) -> anyhow::Result<Router> {
    let db_path = db_path.unwrap_or_else(|| config.database.resolved_path());
    let store = Arc::new(
        SqliteStore::new(&db_path)
            .with_context(|| format!("initializing interview store at {}", db_path.display()))?,
    );

    let provider = provider_from_config(&config.completion);
    let orchestrator = Arc::new(Orchestrator::new(store.clone(), provider));

    let state = AppState {
        store,
        orchestrator,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(routes::build_routes(state).layer(cors))
}

/// Start the API server.
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let router = build_router(config)?;

    tracing::info!("Starting Proctor API on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
