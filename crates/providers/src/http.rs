//! Shared HTTP plumbing for providers.

use pitwall_core::error::ProviderError;
use serde_json::Value;
use tracing::warn;

/// Seconds before an inference request is abandoned.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 60;

pub(crate) fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

pub(crate) fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(format!("no response within {REQUEST_TIMEOUT_SECS}s"))
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Map the status line to an error, or decode the JSON body.
pub(crate) async fn read_json(response: reqwest::Response) -> Result<Value, ProviderError> {
    let status = response.status().as_u16();

    if status == 429 {
        return Err(ProviderError::RateLimited {
            retry_after_secs: 5,
        });
    }

    if status == 401 || status == 403 {
        return Err(ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ));
    }

    if !(200..300).contains(&status) {
        let error_body = response.text().await.unwrap_or_default();
        warn!(status, body = %error_body, "Provider returned error");
        return Err(ProviderError::ApiError {
            status_code: status,
            message: error_body,
        });
    }

    response.json().await.map_err(|e| ProviderError::ApiError {
        status_code: status,
        message: format!("Failed to parse response: {e}"),
    })
}
