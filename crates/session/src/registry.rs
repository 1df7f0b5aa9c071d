//! Registry of session actors: exactly one actor per key.

use crate::actor::SessionActor;
use pitwall_config::SessionConfig;
use pitwall_core::message::SessionKey;
use pitwall_core::store::SessionStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Hands out the actor for a session key, creating it on first access.
///
/// Actors are never evicted; retention of the underlying data is up to the
/// store.
pub struct SessionRegistry {
    actors: RwLock<HashMap<SessionKey, Arc<SessionActor>>>,
    store: Arc<dyn SessionStore>,
    config: Arc<SessionConfig>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
        Self {
            actors: RwLock::new(HashMap::new()),
            store,
            config: Arc::new(config),
        }
    }

    /// The actor for `key`.
    pub async fn actor(&self, key: &SessionKey) -> Arc<SessionActor> {
        if let Some(actor) = self.actors.read().await.get(key) {
            return actor.clone();
        }

        let mut actors = self.actors.write().await;
        actors
            .entry(key.clone())
            .or_insert_with(|| {
                debug!(session = %key, store = self.store.name(), "Session actor created");
                Arc::new(SessionActor::new(
                    key.clone(),
                    self.store.clone(),
                    self.config.clone(),
                ))
            })
            .clone()
    }

    /// Number of actors created so far.
    pub async fn len(&self) -> usize {
        self.actors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.actors.read().await.is_empty()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
