//! End-to-end integration tests for Pitwall.
//!
//! These tests exercise the full pipeline from raw input to model prompt:
//! telemetry summary → digest → session context → chat prompt, strategy
//! simulation → session context, persistence through the file store, and
//! the HTTP gateway on top of all of it.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use pitwall_config::SessionConfig;
use pitwall_core::error::ProviderError;
use pitwall_core::message::{Role, SessionKey};
use pitwall_core::provider::{Provider, ProviderRequest, ProviderResponse};
use pitwall_core::store::SessionStore;
use pitwall_gateway::{ApiState, build_router};
use pitwall_memory::{FileStore, InMemoryStore};
use pitwall_session::{
    ModelSettings, SessionContext, SessionRegistry, StrategyDigest, analyst, prompt,
};
use pitwall_strategy::{StrategyInput, StrategySimulator};
use pitwall_telemetry::{TelemetryDigest, summarize};
use serde_json::{Value, json};
use tower::ServiceExt;

// ── Mock Provider ────────────────────────────────────────────────────────

/// Returns scripted replies in order and records every request it saw.
struct ScriptedProvider {
    replies: Mutex<Vec<String>>,
    seen: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<ProviderRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.seen.lock().unwrap().push(request);
        let content = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| panic!("ScriptedProvider exhausted"));
        Ok(ProviderResponse {
            content,
            model: "mock".into(),
        })
    }
}

const LAPS_CSV: &str = "\
lap,lapTime,tyreTemp,driver\r\n\
1,91.2,88,HAM\r\n\
2,91.0,90,HAM\r\n\
3,90.9,91,HAM\r\n\
4,91.4,93,HAM\r\n\
5,98.7,95,HAM\r\n\
6,91.6,96,HAM\r\n";

fn settings() -> ModelSettings {
    ModelSettings::new("mock")
}

// ── E2E: analysis feeds the chat prompt ──────────────────────────────────

#[tokio::test]
async fn e2e_telemetry_and_strategy_reach_the_prompt() {
    let provider = ScriptedProvider::new(&[
        "- lap 5 is an outlier",
        "- one stop is fine",
        "Box on lap 20.",
    ]);
    let registry = SessionRegistry::new(Arc::new(InMemoryStore::new()), SessionConfig::default());
    let actor = registry.actor(&SessionKey::from("race-1")).await;

    // telemetry
    let summary = summarize(LAPS_CSV);
    assert_eq!(summary.row_count, 6);
    assert_eq!(summary.stats["lapTime"].outlier_count, 1);
    assert!(!summary.stats.contains_key("driver"));

    let analysis = analyst::analyze_telemetry(&provider, &settings(), &summary)
        .await
        .unwrap();
    actor
        .merge_context(SessionContext::with_telemetry(TelemetryDigest::from_summary(
            &summary, analysis, 5,
        )))
        .await
        .unwrap();

    // strategy
    let params = StrategyInput {
        laps: Some(40),
        stint_plan: Some(vec![20, 20]),
        tank_size: Some(3.0),
        ..StrategyInput::default()
    };
    let result = StrategySimulator::default().simulate(&params);
    assert!(result.feasible);
    let commentary = analyst::comment_strategy(&provider, &settings(), &params, &result)
        .await
        .unwrap();
    actor
        .merge_context(SessionContext::with_strategy(StrategyDigest {
            params,
            result,
            commentary,
        }))
        .await
        .unwrap();

    // chat
    let reply = actor
        .chat(&provider, &settings(), "When do we pit?")
        .await
        .unwrap();
    assert_eq!(reply, "Box on lap 20.");

    let chat_request = provider.seen().pop().unwrap();
    let digest = &chat_request.messages[1];
    assert_eq!(digest.role, Role::System);
    assert!(digest.content.starts_with(prompt::DIGEST_HEADER));
    assert!(digest.content.contains("Telemetry: 6 rows"));
    assert!(digest.content.contains("lapTime: trend +0.40, outliers 1"));
    assert!(digest.content.contains("Analyst notes: - lap 5 is an outlier"));
    assert!(digest.content.contains("Strategy: feasible yes"));
    assert!(digest.content.contains("stints=[20,20]"));
    assert!(digest.content.contains("Strategist notes: - one stop is fine"));
}

// ── E2E: sessions persist through the file store ─────────────────────────

#[tokio::test]
async fn e2e_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let key = SessionKey::from("driver/44");

    {
        let store: Arc<dyn SessionStore> = Arc::new(FileStore::new(dir.path().to_path_buf()));
        let registry = SessionRegistry::new(store, SessionConfig::default());
        let provider = ScriptedProvider::new(&["Copy."]);
        registry
            .actor(&key)
            .await
            .chat(&provider, &settings(), "Radio check")
            .await
            .unwrap();
    }

    let store: Arc<dyn SessionStore> = Arc::new(FileStore::new(dir.path().to_path_buf()));
    let registry = SessionRegistry::new(store, SessionConfig::default());
    let actor = registry.actor(&key).await;
    let history = actor.read_history().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content, "Copy.");

    // the restored log is spliced into the next prompt
    let provider = ScriptedProvider::new(&["Loud and clear."]);
    actor.chat(&provider, &settings(), "Again?").await.unwrap();
    let sent = &provider.seen()[0].messages;
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[1].content, "Radio check");
}

// ── E2E: window bound over a long conversation ───────────────────────────

#[tokio::test]
async fn e2e_long_conversation_stays_bounded() {
    let config = SessionConfig {
        max_turns: 3,
        ..SessionConfig::default()
    };
    let registry = SessionRegistry::new(Arc::new(InMemoryStore::new()), config);
    let actor = registry.actor(&SessionKey::from("long")).await;

    let replies: Vec<String> = (0..10).map(|i| format!("r{i}")).collect();
    let reply_refs: Vec<&str> = replies.iter().map(String::as_str).collect();
    let provider = ScriptedProvider::new(&reply_refs);

    for i in 0..10 {
        actor
            .chat(&provider, &settings(), &format!("m{i}"))
            .await
            .unwrap();
    }

    let history = actor.read_history().await.unwrap();
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["m7", "r7", "m8", "r8", "m9", "r9"]);

    // the last prompt carried the system line, six history entries, the new turn
    assert_eq!(provider.seen()[9].messages.len(), 8);
}

// ── E2E: HTTP gateway ────────────────────────────────────────────────────

async fn post(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn e2e_gateway_analyze_simulate_chat() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "- temps rising",
        "- plan ok",
        "Stay out.",
    ]));
    let state = Arc::new(ApiState {
        registry: SessionRegistry::new(Arc::new(InMemoryStore::new()), SessionConfig::default()),
        provider: provider.clone(),
        settings: settings(),
        simulator: StrategySimulator::default(),
    });
    let app = build_router(state, 2 * 1024 * 1024);

    let (status, body) = post(
        app.clone(),
        "/api/telemetry/analyze",
        json!({ "csv": LAPS_CSV, "sessionId": "pit-1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["headers"], json!(["lap", "lapTime", "tyreTemp", "driver"]));

    let (status, body) = post(
        app.clone(),
        "/api/strategy/sim",
        json!({ "laps": 6, "stintPlan": [3, 2], "sessionId": "pit-1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["feasible"], false);

    let (status, body) = post(
        app.clone(),
        "/api/chat",
        json!({ "sessionId": "pit-1", "message": "Tyres?" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Stay out.");

    let digest = &provider.seen()[2].messages[1].content;
    assert!(digest.contains("Analyst notes: - temps rising"));
    assert!(digest.contains("Strategy: feasible no"));

    let (_, body) = post(app, "/api/context", json!({ "sessionId": "pit-1" })).await;
    assert_eq!(body["context"]["strategy"]["commentary"], "- plan ok");
    assert_eq!(body["context"]["telemetry"]["analysis"], "- temps rising");
}
