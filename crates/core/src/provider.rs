//! Provider trait: the abstraction over text-completion backends.
//!
//! A Provider takes an ordered list of role-tagged messages and returns the
//! model's reply as text. Pitwall never retries a failed completion; the
//! error surfaces to the caller as a single failed operation.

use crate::error::ProviderError;
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reply text used when a backend answers with nothing usable.
pub const REPLY_PLACEHOLDER: &str = "(no reply from model)";

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "@cf/meta/llama-3.1-8b-instruct", "gpt-4o-mini")
    pub model: String,

    /// The conversation messages, in order
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.3
}

impl ProviderRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: default_temperature(),
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The reply text, already coerced to a string
    pub content: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// The core Provider trait.
///
/// Every inference backend implements this trait. Sessions call `complete()`
/// without knowing which backend is behind it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "workers_ai", "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError>;
}

/// Turn whatever a backend returned into reply text.
///
/// Looks for `response`, then `output_text`, then an OpenAI-style
/// `choices[0].message.content`. Any other shape is rendered as JSON.
/// Blank results become [`REPLY_PLACEHOLDER`].
pub fn coerce_reply(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other
            .get("response")
            .and_then(Value::as_str)
            .or_else(|| other.get("output_text").and_then(Value::as_str))
            .or_else(|| other.pointer("/choices/0/message/content").and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| {
                tracing::warn!("Provider reply had no text field, passing raw JSON through");
                other.to_string()
            }),
    };

    if text.trim().is_empty() {
        REPLY_PLACEHOLDER.to_string()
    } else {
        text
    }
}
