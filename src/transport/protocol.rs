//! Wire types shared by the HTTP server and the chat widget client

use crate::tools::ToolInfo;
use serde::{Deserialize, Serialize};

/// Body of `POST /chat`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    /// Accepted alias for `openai_api_key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.openai_api_key = key;
        self
    }

    /// The caller's API key, if any. `openai_api_key` wins over the alias and
    /// blank keys count as absent.
    pub fn supplied_key(&self) -> Option<&str> {
        [&self.openai_api_key, &self.api_key]
            .into_iter()
            .flatten()
            .map(|k| k.trim())
            .find(|k| !k.is_empty())
    }
}

/// Successful reply of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub tool_calls: Vec<String>,
}

/// Machine-readable failure category carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingApiKey,
    InvalidApiKey,
    InvalidRequest,
    RateLimited,
    UpstreamError,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingApiKey => "missing_api_key",
            ErrorKind::InvalidApiKey => "invalid_api_key",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::InternalError => "internal_error",
        }
    }

    /// Lenient parse used by clients; unknown kinds yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "missing_api_key" => Some(ErrorKind::MissingApiKey),
            "invalid_api_key" => Some(ErrorKind::InvalidApiKey),
            "invalid_request" => Some(ErrorKind::InvalidRequest),
            "rate_limited" => Some(ErrorKind::RateLimited),
            "upstream_error" => Some(ErrorKind::UpstreamError),
            "internal_error" => Some(ErrorKind::InternalError),
            _ => None,
        }
    }

    /// Whether the user can fix this by supplying a different API key
    pub fn is_credential(&self) -> bool {
        matches!(self, ErrorKind::MissingApiKey | ErrorKind::InvalidApiKey)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
    pub error_kind: ErrorKind,
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether an agent backed by the server-side key is ready
    pub agent_initialized: bool,
    pub environment_api_key: bool,
    pub tools_available: Vec<String>,
}

/// Body of `GET /tools`
#[derive(Debug, Clone, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolInfo>,
}
