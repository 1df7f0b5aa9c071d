//! Error types for the Pitwall domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator has its own error variant.

use thiserror::Error;

/// The top-level error type for all Pitwall operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Client input ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Inference collaborator ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Durable store collaborator ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the failure came from a collaborator and may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Store(_))
    }

    /// Whether the caller sent something we refuse to process.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Collaborator errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Stored value for {key} is malformed: {reason}")]
    Malformed { key: String, reason: String },
}
