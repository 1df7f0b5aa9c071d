//! SessionStore trait: durable key/value storage scoped per session.
//!
//! Each session owns a namespace; inside it a handful of fixed keys hold the
//! conversation log and the analytical context. Durability is "last write
//! wins": the store makes no promise beyond returning the latest `put`.

use crate::error::StoreError;
use crate::message::SessionKey;
use async_trait::async_trait;
use serde_json::Value;

/// Key under which a session's conversation log is stored.
pub const LOG_KEY: &str = "log";

/// Key under which a session's merged analytical context is stored.
pub const CONTEXT_KEY: &str = "context";

/// The durable store collaborator.
///
/// Implementations: in-memory (for testing and ephemeral runs), file-backed.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The backend name (e.g., "memory", "file").
    fn name(&self) -> &str;

    /// Read a value, `None` when the key was never written.
    async fn get(&self, session: &SessionKey, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write a value, replacing any previous one.
    async fn put(&self, session: &SessionKey, key: &str, value: Value) -> Result<(), StoreError>;
}
