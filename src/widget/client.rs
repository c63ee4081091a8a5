//! HTTP client the widget uses to reach the chat API

use crate::transport::protocol::{ChatRequest, ChatResponse, ErrorKind};
use anyhow::Context;
use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Client-side failure of a widget request
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response
    #[error("{detail}")]
    Api {
        status: u16,
        detail: String,
        kind: Option<ErrorKind>,
    },

    /// 2xx response whose body is not the expected JSON
    #[error("Malformed response: {0}")]
    MalformedBody(String),
}

impl ClientError {
    /// Whether a different API key could fix this failure
    ///
    /// Uses the server's `error_kind` when present and falls back to looking
    /// for "api key" in the detail text.
    pub fn is_credential(&self) -> bool {
        match self {
            ClientError::Api {
                kind: Some(kind), ..
            } => kind.is_credential(),
            ClientError::Api { detail, .. } => detail.to_lowercase().contains("api key"),
            _ => false,
        }
    }

    fn from_error_body(status: reqwest::StatusCode, body: &str) -> Self {
        let value: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let field = |name: &str| {
            value
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        ClientError::Api {
            status: status.as_u16(),
            detail: field("detail")
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16())),
            kind: field("error_kind").as_deref().and_then(ErrorKind::parse),
        }
    }
}

/// What the widget needs from the server
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError>;

    /// Returns the reported `status` field
    async fn health(&self) -> Result<String, ClientError>;
}

/// [`ChatBackend`] over HTTP
pub struct HttpChatClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpChatClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalized).with_context(|| format!("Invalid server URL: {}", base_url))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Transport(e.to_string()))
    }

    async fn read_body(response: reqwest::Response) -> Result<String, ClientError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::from_error_body(status, &body))
        }
    }
}

#[async_trait]
impl ChatBackend for HttpChatClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let response = self
            .client
            .post(self.endpoint("chat")?)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let body = Self::read_body(response).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::MalformedBody(e.to_string()))
    }

    async fn health(&self) -> Result<String, ClientError> {
        let response = self
            .client
            .get(self.endpoint("health")?)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let body = Self::read_body(response).await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ClientError::MalformedBody(e.to_string()))?;
        value
            .get("status")
            .and_then(|s| s.as_str())
            .map(str::to_string)
            .ok_or_else(|| ClientError::MalformedBody("missing status field".to_string()))
    }
}
