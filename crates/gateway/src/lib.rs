//! HTTP API gateway for Pitwall.
//!
//! A thin JSON surface over the telemetry engine, the strategy simulator and
//! the session actors. Routing and request validation live here; all state
//! lives in the sessions crate.
//!
//! Built on Axum.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use pitwall_config::AppConfig;
use pitwall_core::store::SessionStore;
use pitwall_memory::{FileStore, InMemoryStore};
use pitwall_session::{ModelSettings, SessionRegistry};
use pitwall_strategy::StrategySimulator;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use api::{ApiState, SharedApiState};

/// Build the full router: `/health` plus everything under `/api`.
pub fn build_router(state: SharedApiState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api::api_router(state))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// The session store selected by `[storage]`.
pub fn build_store(config: &AppConfig) -> Arc<dyn SessionStore> {
    match config.storage.backend.as_str() {
        "memory" => Arc::new(InMemoryStore::new()),
        _ => Arc::new(FileStore::new(config.storage.resolved_path())),
    }
}

/// Wire the shared state from configuration.
pub fn build_state(config: &AppConfig) -> Result<SharedApiState, Box<dyn std::error::Error>> {
    let router = pitwall_providers::router::build_from_config(config);
    let provider = router.default().ok_or_else(|| {
        format!(
            "Default provider '{}' is not available",
            config.default_provider
        )
    })?;

    let store = build_store(config);
    info!(
        provider = provider.name(),
        store = store.name(),
        model = %config.default_model,
        "Gateway state ready"
    );

    Ok(Arc::new(ApiState {
        registry: SessionRegistry::new(store, config.session.clone()),
        provider,
        settings: ModelSettings::from_config(config),
        simulator: StrategySimulator::new(config.strategy.clone()),
    }))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = build_state(&config)?;
    let app = build_router(state, config.gateway.body_limit_bytes);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
