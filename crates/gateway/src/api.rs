//! `/api` routes: chat, history, context, telemetry analysis, strategy simulation.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use pitwall_core::error::Error;
use pitwall_core::message::{Message, SessionKey};
use pitwall_core::provider::Provider;
use pitwall_session::{ModelSettings, SessionContext, SessionRegistry, StrategyDigest, analyst};
use pitwall_strategy::{LapTrace, StrategyInput, StrategyResult, StrategySimulator};
use pitwall_telemetry::{TelemetryDigest, TelemetrySummary, summarize};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Everything the handlers share.
pub struct ApiState {
    pub registry: SessionRegistry,
    pub provider: Arc<dyn Provider>,
    pub settings: ModelSettings,
    pub simulator: StrategySimulator,
}

pub type SharedApiState = Arc<ApiState>;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

pub fn api_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/history", post(history_handler))
        .route("/context", post(context_handler))
        .route("/telemetry/analyze", post(analyze_handler))
        .route("/strategy/sim", post(simulate_handler))
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContextResponse {
    pub context: SessionContext,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub summary: TelemetrySummary,
    pub analysis: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(flatten)]
    pub input: StrategyInput,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimulateResponse {
    pub result: StrategyResult,
    pub trace: LapTrace,
    pub commentary: String,
}

// ── Errors ────────────────────────────────────────────────────────────────

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Client mistakes are 400, collaborator failures 502, the rest 500.
fn error_response(e: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if e.is_transient() {
        warn!(error = %e, "Collaborator failure");
        StatusCode::BAD_GATEWAY
    } else {
        error!(error = %e, "Request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

/// A required, non-blank session id.
fn required_session(id: Option<String>) -> Result<SessionKey, (StatusCode, Json<ErrorResponse>)> {
    optional_session(id).ok_or_else(|| bad_request("Missing sessionId"))
}

fn optional_session(id: Option<String>) -> Option<SessionKey> {
    id.filter(|s| !s.trim().is_empty()).map(SessionKey::new)
}

// ── Handlers ──────────────────────────────────────────────────────────────

/// `POST /api/chat`: one conversational turn.
async fn chat_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    let key = required_session(payload.session_id)?;
    let message = payload.message.unwrap_or_default();
    if message.trim().is_empty() {
        return Err(bad_request("Missing message"));
    }

    let actor = state.registry.actor(&key).await;
    let reply = actor
        .chat(state.provider.as_ref(), &state.settings, &message)
        .await
        .map_err(error_response)?;

    Ok(Json(ChatResponse { reply }))
}

/// `POST /api/history`: the session's bounded log.
async fn history_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<SessionRequest>,
) -> ApiResult<HistoryResponse> {
    let key = required_session(payload.session_id)?;
    let history = state
        .registry
        .actor(&key)
        .await
        .read_history()
        .await
        .map_err(error_response)?;
    Ok(Json(HistoryResponse { history }))
}

/// `POST /api/context`: the session's merged analysis context.
async fn context_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<SessionRequest>,
) -> ApiResult<ContextResponse> {
    let key = required_session(payload.session_id)?;
    let context = state
        .registry
        .actor(&key)
        .await
        .read_context()
        .await
        .map_err(error_response)?;
    Ok(Json(ContextResponse { context }))
}

/// `POST /api/telemetry/analyze`: stats, model analysis, optional merge.
async fn analyze_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<AnalyzeRequest>,
) -> ApiResult<AnalyzeResponse> {
    let csv = payload.csv.unwrap_or_default();
    if csv.trim().is_empty() {
        return Err(bad_request("Missing csv"));
    }

    let summary = summarize(&csv);
    info!(
        rows = summary.row_count,
        columns = summary.headers.len(),
        numeric = summary.stats.len(),
        "Telemetry summarized"
    );

    let analysis = analyst::analyze_telemetry(state.provider.as_ref(), &state.settings, &summary)
        .await
        .map_err(error_response)?;

    if let Some(key) = optional_session(payload.session_id) {
        let digest = TelemetryDigest::from_summary(
            &summary,
            analysis.clone(),
            state.registry.config().notable_columns,
        );
        state
            .registry
            .actor(&key)
            .await
            .merge_context(SessionContext::with_telemetry(digest))
            .await
            .map_err(error_response)?;
    }

    Ok(Json(AnalyzeResponse { summary, analysis }))
}

/// `POST /api/strategy/sim`: simulation, lap trace, commentary, optional merge.
async fn simulate_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<SimulateRequest>,
) -> ApiResult<SimulateResponse> {
    let assumptions = state.simulator.resolve(&payload.input);
    let max_laps = state.simulator.max_laps();
    if assumptions.laps > max_laps
        || assumptions.simulated_laps() > max_laps
        || assumptions.stint_plan.len() as i64 > max_laps
    {
        warn!(laps = assumptions.laps, max_laps, "Simulation request over lap limit");
        return Err(bad_request(&format!("Race longer than {max_laps} laps")));
    }

    let result = state.simulator.simulate(&payload.input);
    let trace = state.simulator.trace(&payload.input);

    let commentary = analyst::comment_strategy(
        state.provider.as_ref(),
        &state.settings,
        &payload.input,
        &result,
    )
    .await
    .map_err(error_response)?;

    if let Some(key) = optional_session(payload.session_id) {
        let digest = StrategyDigest {
            params: payload.input,
            result: result.clone(),
            commentary: commentary.clone(),
        };
        state
            .registry
            .actor(&key)
            .await
            .merge_context(SessionContext::with_strategy(digest))
            .await
            .map_err(error_response)?;
    }

    Ok(Json(SimulateResponse {
        result,
        trace,
        commentary,
    }))
}
