//! Errors raised while talking to a text-generation service.
//!
//! Providers return these wrapped in `anyhow::Error`; the evaluator never
//! lets them escape and folds them into a sentinel evaluation instead.

use thiserror::Error;

/// Failure modes of a single text-generation call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP 429 from the service.
    #[error("rate limited by provider, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The API key was rejected.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The configured model does not exist for this provider.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Any other non-success response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The call did not finish within the allotted time.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Connection-level failure.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The service answered successfully but produced no text.
    #[error("provider returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// Classify a non-success HTTP status returned by a provider.
    ///
    /// `retry_after_secs` comes from the `retry-after` header when present;
    /// 429 responses without one default to five seconds.
    pub fn from_status(
        status: u16,
        model: &str,
        message: String,
        retry_after_secs: Option<u64>,
    ) -> Self {
        match status {
            429 => ProviderError::RateLimited {
                retry_after_ms: retry_after_secs.unwrap_or(5) * 1000,
            },
            401 | 403 => ProviderError::AuthenticationFailed(message),
            404 => ProviderError::ModelNotFound(model.to_string()),
            _ => ProviderError::ApiError { status, message },
        }
    }
}
