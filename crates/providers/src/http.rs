//! Shared HTTP plumbing for provider adapters.

use std::time::Duration;

use inkloop_core::error::ProviderError;
use tracing::warn;

/// Build a client whose every request is bounded by `timeout`.
///
/// Retries are never configured here: a failed call is fatal for the run.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::NotConfigured(format!("Failed to create HTTP client: {e}")))
}

/// Map a transport failure onto the provider error taxonomy.
pub fn send_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else {
        ProviderError::Network(err.to_string())
    }
}

/// Turn a non-success status into an error, reading the body for context.
pub async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();

    match status {
        200..=299 => Ok(response),
        429 => {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(5);
            Err(ProviderError::RateLimited { retry_after_secs })
        }
        401 | 403 => Err(ProviderError::AuthenticationFailed(format!(
            "{provider} rejected the API key"
        ))),
        _ => {
            let body = response.text().await.unwrap_or_default();
            warn!(provider, status, body = %body, "Provider returned error");
            Err(ProviderError::ApiError {
                status_code: status,
                message: body,
            })
        }
    }
}

/// Error for a 2xx body that does not match the expected schema.
pub fn malformed(provider: &str, err: impl std::fmt::Display) -> ProviderError {
    ProviderError::ApiError {
        status_code: 200,
        message: format!("Failed to parse {provider} response: {err}"),
    }
}
