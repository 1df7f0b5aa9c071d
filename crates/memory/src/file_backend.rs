//! File-based session store: one JSON document per session.
//!
//! Each session's keys live together in `<root>/<encoded-session>.json` as a
//! single JSON object. Documents are loaded lazily on first access, cached,
//! and rewritten in full on every `put` (temp file + rename, so a crash never
//! leaves a half-written document behind).
//!
//! Storage location: `~/.pitwall/sessions/` unless configured otherwise.

use async_trait::async_trait;
use pitwall_core::error::StoreError;
use pitwall_core::message::SessionKey;
use pitwall_core::store::SessionStore;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A directory of per-session JSON documents.
pub struct FileStore {
    root: PathBuf,
    cache: RwLock<HashMap<SessionKey, Map<String, Value>>>,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: PathBuf) -> Self {
        debug!(root = %root.display(), "File session store opened");
        Self {
            root,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Path of the document backing `session`.
    pub fn path_for(&self, session: &SessionKey) -> PathBuf {
        self.root.join(format!("{}.json", encode_file_stem(session.as_str())))
    }

    async fn load(&self, session: &SessionKey) -> Result<Map<String, Value>, StoreError> {
        let path = self.path_for(session);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(StoreError::Storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                warn!(path = %path.display(), "Session document is corrupted, starting empty");
                Ok(Map::new())
            }
        }
    }

    async fn flush(&self, session: &SessionKey, doc: &Map<String, Value>) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            StoreError::Storage(format!("Failed to create session directory: {e}"))
        })?;

        let body = serde_json::to_vec_pretty(doc).map_err(|e| StoreError::Malformed {
            key: session.to_string(),
            reason: e.to_string(),
        })?;

        let path = self.path_for(session);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to write session file: {e}")))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to replace session file: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, session: &SessionKey, key: &str) -> Result<Option<Value>, StoreError> {
        if let Some(doc) = self.cache.read().await.get(session) {
            return Ok(doc.get(key).cloned());
        }

        let doc = self.load(session).await?;
        let value = doc.get(key).cloned();
        self.cache.write().await.entry(session.clone()).or_insert(doc);
        Ok(value)
    }

    async fn put(&self, session: &SessionKey, key: &str, value: Value) -> Result<(), StoreError> {
        let mut cache = self.cache.write().await;
        let mut doc = match cache.get(session) {
            Some(doc) => doc.clone(),
            None => self.load(session).await?,
        };
        doc.insert(key.to_string(), value);

        // Only cache what reached disk.
        self.flush(session, &doc).await?;
        cache.insert(session.clone(), doc);
        Ok(())
    }
}

/// Make a session key safe as a file name without collisions.
///
/// ASCII alphanumerics, `-` and `_` pass through; every other byte becomes `~xx`.
fn encode_file_stem(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("~{b:02x}"));
        }
    }
    if out.is_empty() {
        out.push('~');
    }
    out
}
