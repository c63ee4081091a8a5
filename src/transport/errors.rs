//! HTTP error type for the chat API

use super::protocol::{ErrorBody, ErrorKind};
use crate::llm::LlmError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Failure of a `/chat` request, rendered as `{detail, error_kind}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("OpenAI API key is required. Either provide it in the request or set {env_var} environment variable.")]
    MissingApiKey { env_var: String },

    #[error("Invalid OpenAI API key: {0}")]
    InvalidApiKey(String),

    #[error("Rate limited by OpenAI: {0}")]
    RateLimited(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Error processing request: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::MissingApiKey { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidApiKey(_) => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ApiError::MissingApiKey { .. } => ErrorKind::MissingApiKey,
            ApiError::InvalidApiKey(_) => ErrorKind::InvalidApiKey,
            ApiError::RateLimited(_) => ErrorKind::RateLimited,
            ApiError::Upstream(_) => ErrorKind::UpstreamError,
            ApiError::Internal(_) => ErrorKind::InternalError,
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Unauthorized(msg) => ApiError::InvalidApiKey(msg),
            LlmError::RateLimited(msg) => ApiError::RateLimited(msg),
            LlmError::BadRequest(_)
            | LlmError::ServiceError(_)
            | LlmError::Upstream { .. }
            | LlmError::Network(_)
            | LlmError::InvalidResponse(_) => ApiError::Upstream(err.to_string()),
            LlmError::Other(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Chat request failed: {}", self);
        } else {
            tracing::warn!("Chat request rejected ({}): {}", self.kind(), self);
        }

        let body = ErrorBody {
            detail: self.to_string(),
            error_kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}
