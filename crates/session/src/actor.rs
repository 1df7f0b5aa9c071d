//! One session's serialized state.
//!
//! A [`SessionActor`] owns the bounded conversation log and the merged
//! analytical context of a single session key. Every operation takes the
//! actor's lock for its whole duration, including the awaits on the store
//! and on the provider, so operations against one session never interleave.
//! Different actors share nothing and run in parallel.
//!
//! State is loaded lazily from the [`SessionStore`] on first use and written
//! through on every mutation. The cached copy changes only after the store
//! accepted the new value, so a failed write leaves the session untouched.

use crate::context::SessionContext;
use crate::prompt;
use crate::settings::ModelSettings;
use pitwall_config::SessionConfig;
use pitwall_core::error::{Error, Result, StoreError};
use pitwall_core::message::{Message, SessionKey};
use pitwall_core::provider::Provider;
use pitwall_core::store::{CONTEXT_KEY, LOG_KEY, SessionStore};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct SessionState {
    log: Vec<Message>,
    context: SessionContext,
}

/// The single actor for one session key.
pub struct SessionActor {
    key: SessionKey,
    store: Arc<dyn SessionStore>,
    config: Arc<SessionConfig>,
    state: Mutex<Option<SessionState>>,
}

impl SessionActor {
    pub fn new(key: SessionKey, store: Arc<dyn SessionStore>, config: Arc<SessionConfig>) -> Self {
        Self {
            key,
            store,
            config,
            state: Mutex::new(None),
        }
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Build the outbound prompt for `user_text` without changing anything.
    pub async fn append_turn(&self, user_text: &str) -> Result<Vec<Message>> {
        let mut slot = self.state.lock().await;
        let state = self.loaded(&mut slot).await?;
        Ok(prompt::assemble(
            &self.config,
            &state.context,
            &state.log,
            user_text,
        ))
    }

    /// Append a user/assistant exchange and slide the window.
    pub async fn commit_turn(&self, user_text: &str, assistant_text: &str) -> Result<()> {
        let mut slot = self.state.lock().await;
        let state = self.loaded(&mut slot).await?;
        self.commit_locked(state, user_text, assistant_text).await
    }

    /// Run a whole chat turn: assemble, ask the provider, commit.
    ///
    /// The text is trimmed; blank text is rejected before any state is read.
    /// When the provider or the store fails, neither turn is recorded.
    pub async fn chat(
        &self,
        provider: &dyn Provider,
        settings: &ModelSettings,
        user_text: &str,
    ) -> Result<String> {
        let text = user_text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("message must not be empty".into()));
        }

        let mut slot = self.state.lock().await;
        let state = self.loaded(&mut slot).await?;
        let messages = prompt::assemble(&self.config, &state.context, &state.log, text);

        debug!(
            session = %self.key,
            provider = provider.name(),
            messages = messages.len(),
            "Sending chat turn"
        );

        let response = provider
            .complete(settings.request(messages))
            .await
            .map_err(|e| {
                warn!(session = %self.key, error = %e, "Chat turn failed, nothing recorded");
                Error::from(e)
            })?;

        self.commit_locked(state, text, &response.content).await?;
        info!(session = %self.key, log_len = state.log.len(), "Chat turn committed");
        Ok(response.content)
    }

    /// Shallow-merge `partial` into the stored context and return the result.
    pub async fn merge_context(&self, partial: SessionContext) -> Result<SessionContext> {
        let mut slot = self.state.lock().await;
        let state = self.loaded(&mut slot).await?;

        let mut merged = state.context.clone();
        merged.merge(partial);
        self.store
            .put(&self.key, CONTEXT_KEY, serde_json::to_value(&merged)?)
            .await?;
        state.context = merged.clone();

        debug!(
            session = %self.key,
            telemetry = state.context.telemetry.is_some(),
            strategy = state.context.strategy.is_some(),
            "Context merged"
        );
        Ok(merged)
    }

    pub async fn read_context(&self) -> Result<SessionContext> {
        let mut slot = self.state.lock().await;
        Ok(self.loaded(&mut slot).await?.context.clone())
    }

    pub async fn read_history(&self) -> Result<Vec<Message>> {
        let mut slot = self.state.lock().await;
        Ok(self.loaded(&mut slot).await?.log.clone())
    }

    async fn commit_locked(
        &self,
        state: &mut SessionState,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<()> {
        let mut log = Vec::with_capacity(state.log.len() + 2);
        log.extend_from_slice(&state.log);
        log.push(Message::user(user_text));
        log.push(Message::assistant(assistant_text));

        let window = self.config.window();
        if log.len() > window {
            log.drain(..log.len() - window);
        }

        self.store
            .put(&self.key, LOG_KEY, serde_json::to_value(&log)?)
            .await?;
        state.log = log;
        Ok(())
    }

    /// The cached state, reading it from the store on first use.
    async fn loaded<'s>(&self, slot: &'s mut Option<SessionState>) -> Result<&'s mut SessionState> {
        let state = match slot.take() {
            Some(state) => state,
            None => self.load().await?,
        };
        Ok(slot.insert(state))
    }

    async fn load(&self) -> Result<SessionState> {
        let log: Vec<Message> = self.read_key(LOG_KEY).await?.unwrap_or_default();
        let context: SessionContext = self.read_key(CONTEXT_KEY).await?.unwrap_or_default();
        debug!(session = %self.key, log_len = log.len(), "Session loaded");
        Ok(SessionState { log, context })
    }

    async fn read_key<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(&self.key, key).await? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                Error::Store(StoreError::Malformed {
                    key: format!("{}/{key}", self.key),
                    reason: e.to_string(),
                })
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingProvider, ReadOnlyStore, ScriptedProvider};
    use pitwall_core::message::Role;
    use pitwall_memory::InMemoryStore;
    use pitwall_telemetry::{TelemetryDigest, summarize};
    use serde_json::json;
    use std::time::Duration;

    fn actor_with(store: Arc<dyn SessionStore>) -> SessionActor {
        SessionActor::new(
            SessionKey::from("s1"),
            store,
            Arc::new(SessionConfig::default()),
        )
    }

    fn actor() -> SessionActor {
        actor_with(Arc::new(InMemoryStore::new()))
    }

    fn settings() -> ModelSettings {
        ModelSettings::new("mock-model")
    }

    #[tokio::test]
    async fn window_keeps_most_recent_turns_in_order() {
        let actor = actor();
        let window = SessionConfig::default().window();
        let commits = window + 5;

        for i in 0..commits {
            actor
                .commit_turn(&format!("q{i}"), &format!("a{i}"))
                .await
                .unwrap();
            assert!(actor.read_history().await.unwrap().len() <= window);
        }

        let history = actor.read_history().await.unwrap();
        assert_eq!(history.len(), window);
        // 2 * commits messages were appended; the last `window` survive
        let first_kept = commits - window / 2;
        assert_eq!(history[0], Message::user(format!("q{first_kept}")));
        assert_eq!(history[1], Message::assistant(format!("a{first_kept}")));
        assert_eq!(
            history.last().unwrap(),
            &Message::assistant(format!("a{}", commits - 1))
        );
    }

    #[tokio::test]
    async fn chat_records_both_turns() {
        let actor = actor();
        let provider = ScriptedProvider::new(&["Box this lap."]);

        let reply = actor.chat(&provider, &settings(), "  Tyres are gone  ").await.unwrap();
        assert_eq!(reply, "Box this lap.");

        let history = actor.read_history().await.unwrap();
        assert_eq!(
            history,
            vec![Message::user("Tyres are gone"), Message::assistant("Box this lap.")]
        );

        let sent = &provider.requests()[0];
        assert_eq!(sent.model, "mock-model");
        assert_eq!(sent.messages[0].role, Role::System);
        assert_eq!(sent.messages.last().unwrap(), &Message::user("Tyres are gone"));
    }

    #[tokio::test]
    async fn blank_message_is_rejected_without_calling_provider() {
        let actor = actor();
        let provider = ScriptedProvider::echo();
        let err = actor.chat(&provider, &settings(), " \n\t").await.unwrap_err();
        assert!(err.is_client_error());
        assert!(provider.requests().is_empty());
        assert!(actor.read_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_commits_nothing() {
        let actor = actor();
        actor.commit_turn("q", "a").await.unwrap();

        let err = actor.chat(&FailingProvider, &settings(), "hello").await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(actor.read_history().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn store_failure_commits_nothing() {
        let actor = actor_with(Arc::new(ReadOnlyStore));
        let provider = ScriptedProvider::new(&["reply"]);

        let err = actor.chat(&provider, &settings(), "hello").await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert!(actor.read_history().await.unwrap().is_empty());

        let digest = TelemetryDigest::from_summary(&summarize("a\n1\n"), "", 5);
        assert!(actor.merge_context(SessionContext::with_telemetry(digest)).await.is_err());
        assert!(actor.read_context().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn digest_is_rebuilt_from_current_context() {
        let actor = actor();
        let provider = ScriptedProvider::echo();

        actor.chat(&provider, &settings(), "first").await.unwrap();
        let digest = TelemetryDigest::from_summary(&summarize("speed\n300\n301\n"), "Fast", 5);
        actor
            .merge_context(SessionContext::with_telemetry(digest))
            .await
            .unwrap();
        actor.chat(&provider, &settings(), "second").await.unwrap();

        let requests = provider.requests();
        // no digest on the first turn
        assert_eq!(requests[0].messages.len(), 2);
        // system, digest, two history entries, user
        assert_eq!(requests[1].messages.len(), 5);
        assert!(requests[1].messages[1].content.contains("Analyst notes: Fast"));

        // the digest never lands in the log
        let history = actor.read_history().await.unwrap();
        assert!(history.iter().all(|m| m.role != Role::System));
    }

    #[tokio::test]
    async fn append_turn_does_not_mutate() {
        let actor = actor();
        let prompt = actor.append_turn("hi").await.unwrap();
        assert_eq!(prompt.len(), 2);
        assert!(actor.read_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn state_survives_a_new_actor() {
        let store: Arc<dyn SessionStore> = Arc::new(InMemoryStore::new());
        actor_with(store.clone()).commit_turn("q", "a").await.unwrap();

        let reopened = actor_with(store);
        assert_eq!(reopened.read_history().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_stored_log_is_a_store_error() {
        let store = Arc::new(InMemoryStore::new());
        store
            .put(&SessionKey::from("s1"), LOG_KEY, json!("not a list"))
            .await
            .unwrap();
        let err = actor_with(store).read_history().await.unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::Malformed { .. })));
    }

    #[tokio::test]
    async fn concurrent_chats_on_one_session_do_not_interleave() {
        let actor = Arc::new(actor());
        let provider = Arc::new(ScriptedProvider::echo().with_delay(Duration::from_millis(5)));

        let mut handles = Vec::new();
        for i in 0..8 {
            let actor = actor.clone();
            let provider = provider.clone();
            handles.push(tokio::spawn(async move {
                actor
                    .chat(provider.as_ref(), &settings(), &format!("m{i}"))
                    .await
                    .unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let history = actor.read_history().await.unwrap();
        assert_eq!(history.len(), 16);
        for pair in history.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].content, format!("echo: {}", pair[0].content));
        }

        // each turn saw every exchange committed before it
        let mut seen: Vec<usize> = provider
            .requests()
            .iter()
            .map(|r| r.messages.len())
            .collect();
        seen.sort();
        assert_eq!(seen, (0..8).map(|i| 2 + 2 * i).collect::<Vec<_>>());
    }
}
