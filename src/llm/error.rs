//! Typed errors for LLM operations
//!
//! Provides structured error types so the HTTP layer can map failure modes
//! (bad credential, rate limiting, upstream outage) to status codes and
//! error kinds without string matching.

use thiserror::Error;

/// LLM operation errors with typed variants
///
/// - `Unauthorized` (401) - API key missing, invalid or revoked
/// - `RateLimited` (429) - quota exceeded
/// - `BadRequest` (400) - malformed request; caller error
/// - `ServiceError` (5xx) - server-side issue
/// - `Upstream` - any other non-success status from the provider
/// - `Network` - connection/timeout
/// - `InvalidResponse` - the provider answered with a body we cannot parse
/// - `Other` - catch-all for unhandled errors
#[derive(Debug, Error)]
pub enum LlmError {
    /// Authentication failed (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Malformed request (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Server-side error (HTTP 5xx)
    #[error("Service error: {0}")]
    ServiceError(String),

    /// Provider answered with another non-success status (403, 404, ...)
    #[error("HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Network connectivity issue (connection refused, timeout, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected schema
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Other errors not fitting the above categories
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl LlmError {
    /// Check if this error indicates a credential problem
    pub fn is_auth_error(&self) -> bool {
        matches!(self, LlmError::Unauthorized(_))
    }

    /// Check if this error indicates a rate limit
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::RateLimited(_))
    }

    /// Convert HTTP status code and error text into typed LlmError
    pub fn from_http_status(status: reqwest::StatusCode, error_text: String) -> Self {
        let message = extract_error_message(&error_text).unwrap_or(error_text);
        match status.as_u16() {
            401 => LlmError::Unauthorized(message),
            429 => LlmError::RateLimited(message),
            400 => LlmError::BadRequest(message),
            500..=599 => LlmError::ServiceError(message),
            code => LlmError::Upstream {
                status: code,
                message,
            },
        }
    }

    /// Convert network/connection errors into typed LlmError
    pub fn from_network_error(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Network(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            LlmError::Network(format!("Connection failed: {}", e))
        } else if let Some(status) = e.status() {
            let error_text = e.to_string();
            Self::from_http_status(status, error_text)
        } else if e.is_decode() {
            LlmError::InvalidResponse(e.to_string())
        } else {
            LlmError::Other(e.into())
        }
    }
}

/// Pull `error.message` out of an OpenAI-style error body
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}
