//! In-memory backend: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use pitwall_core::error::StoreError;
use pitwall_core::message::SessionKey;
use pitwall_core::store::SessionStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A store that keeps every session's values in a map.
/// Useful for testing and runs where persistence isn't needed.
pub struct InMemoryStore {
    values: Arc<RwLock<HashMap<(SessionKey, String), Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            values: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of sessions that have written at least one key.
    pub async fn session_count(&self) -> usize {
        let values = self.values.read().await;
        let mut sessions: Vec<&SessionKey> = values.keys().map(|(s, _)| s).collect();
        sessions.sort();
        sessions.dedup();
        sessions.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, session: &SessionKey, key: &str) -> Result<Option<Value>, StoreError> {
        let values = self.values.read().await;
        Ok(values.get(&(session.clone(), key.to_string())).cloned())
    }

    async fn put(&self, session: &SessionKey, key: &str, value: Value) -> Result<(), StoreError> {
        self.values
            .write()
            .await
            .insert((session.clone(), key.to_string()), value);
        Ok(())
    }
}
