//! Shared test doubles for session tests.

use async_trait::async_trait;
use pitwall_core::error::{ProviderError, StoreError};
use pitwall_core::message::SessionKey;
use pitwall_core::provider::{Provider, ProviderRequest, ProviderResponse};
use pitwall_core::store::SessionStore;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

/// A provider that answers with scripted replies and records every request.
///
/// Once the script runs out it echoes the last user message.
pub struct ScriptedProvider {
    replies: Mutex<Vec<String>>,
    requests: Mutex<Vec<ProviderRequest>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn echo() -> Self {
        Self::new(&[])
    }

    /// Sleep before answering, to widen race windows in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let last_user = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.requests.lock().unwrap().push(request);

        let content = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| format!("echo: {last_user}"));
        Ok(ProviderResponse {
            content,
            model: "mock-model".into(),
        })
    }
}

/// A provider whose every call fails.
pub struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Timeout("60s".into()))
    }
}

/// A store that refuses every write and reads nothing.
pub struct ReadOnlyStore;

#[async_trait]
impl SessionStore for ReadOnlyStore {
    fn name(&self) -> &str {
        "read_only"
    }

    async fn get(&self, _session: &SessionKey, _key: &str) -> Result<Option<Value>, StoreError> {
        Ok(None)
    }

    async fn put(&self, _session: &SessionKey, _key: &str, _value: Value) -> Result<(), StoreError> {
        Err(StoreError::Storage("read-only".into()))
    }
}
