//! Cloudflare Workers AI provider.
//!
//! Calls the REST endpoint `accounts/{account}/ai/run/{model}` with a chat
//! message list. Replies arrive as `{"result": {"response": "..."}}`, but
//! some models answer with other shapes, so the result object goes through
//! `coerce_reply` rather than a fixed schema.

use async_trait::async_trait;
use pitwall_core::error::ProviderError;
use pitwall_core::provider::{Provider, ProviderRequest, ProviderResponse, coerce_reply};
use serde_json::Value;
use tracing::{debug, warn};

use crate::http;

const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Workers AI text generation over the Cloudflare REST API.
pub struct WorkersAiProvider {
    base_url: String,
    account_id: String,
    api_token: String,
    client: reqwest::Client,
}

impl WorkersAiProvider {
    pub fn new(account_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            account_id: account_id.into(),
            api_token: api_token.into(),
            client: http::client(),
        }
    }

    /// Override the API base URL (for gateways and proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn run_url(&self, model: &str) -> String {
        format!(
            "{}/accounts/{}/ai/run/{}",
            self.base_url, self.account_id, model
        )
    }
}

#[async_trait]
impl Provider for WorkersAiProvider {
    fn name(&self) -> &str {
        "workers_ai"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if self.account_id.is_empty() {
            return Err(ProviderError::NotConfigured(
                "workers_ai needs an account_id (set CLOUDFLARE_ACCOUNT_ID)".into(),
            ));
        }

        let mut body = serde_json::json!({
            "messages": request.messages,
            "temperature": request.temperature,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(model = %request.model, messages = request.messages.len(), "Sending Workers AI request");

        let response = self
            .client
            .post(self.run_url(&request.model))
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(&body)
            .send()
            .await
            .map_err(http::transport_error)?;

        let value = http::read_json(response).await?;

        if value["success"] == Value::Bool(false) {
            warn!(errors = %value["errors"], "Workers AI reported failure");
            return Err(ProviderError::ApiError {
                status_code: 200,
                message: value["errors"].to_string(),
            });
        }

        let result = value.get("result").unwrap_or(&value);
        Ok(ProviderResponse {
            content: coerce_reply(result),
            model: request.model,
        })
    }
}
