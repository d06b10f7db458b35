//! Response handling shared by the HTTP providers.

use quizgrade_core::error::ProviderError;

/// Transport-level timeout applied to every provider client.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Build the reqwest client used by a provider.
pub(crate) fn build_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))
}

/// Classify a failed `send()`.
pub(crate) fn transport_error(err: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::NetworkError(err.to_string())
    }
}

/// Pass successful responses through; turn error statuses into `ProviderError`.
///
/// `extract_message` pulls a readable message out of a provider-specific
/// error body, falling back to the raw body.
pub(crate) async fn check_status(
    response: reqwest::Response,
    model: &str,
    extract_message: fn(&str) -> Option<String>,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body).unwrap_or(body);

    Err(ProviderError::from_status(status, model, message, retry_after))
}

/// Parse a JSON body into the provider's response type.
pub(crate) async fn parse_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    response.json().await.map_err(|e| ProviderError::ApiError {
        status: 0,
        message: format!("failed to parse response: {e}"),
    })
}
