//! HTTP server for the chat API and the chat page

use super::errors::ApiError;
use super::protocol::{ChatRequest, ChatResponse, HealthResponse, ToolsResponse};
use crate::agent::ChatAgent;
use crate::config::Config;
use crate::llm::{LlmProvider, OpenAiProviderFactory, ProviderFactory};
use crate::tools::ToolRegistry;
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Instrument;
use uuid::Uuid;

/// Chat page bundled into the binary
pub const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Shared application state
///
/// Immutable after startup; handlers never hold a lock across a model call.
pub struct AppState {
    config: Config,
    tools: Arc<ToolRegistry>,
    providers: Arc<dyn ProviderFactory>,
    /// Agent backed by the server-side key, when one is configured
    default_agent: Option<Arc<ChatAgent>>,
    /// Whether a server-side key was present at startup
    env_key_present: bool,
}

impl AppState {
    /// Build the state, creating the default agent when `env_api_key` is set
    ///
    /// A key the provider rejects at construction leaves the server running
    /// without a default agent.
    pub fn new(
        config: Config,
        providers: Arc<dyn ProviderFactory>,
        env_api_key: Option<String>,
    ) -> Self {
        let tools = Arc::new(ToolRegistry::with_defaults(&config.tools));

        let mut state = Self {
            config,
            tools,
            providers,
            default_agent: None,
            env_key_present: env_api_key.is_some(),
        };

        if let Some(key) = env_api_key {
            match state.providers.create(&key) {
                Ok(provider) => {
                    tracing::info!("Agent initialized with {} provider", provider.name());
                    state.default_agent = Some(Arc::new(state.build_agent(provider)));
                }
                Err(e) => tracing::error!(
                    "Failed to create provider from {}: {}",
                    state.config.llm.api_key_env,
                    e
                ),
            }
        } else {
            tracing::warn!(
                "{} is not set; requests must supply their own API key",
                state.config.llm.api_key_env
            );
        }

        state
    }

    fn build_agent(&self, provider: Arc<dyn LlmProvider>) -> ChatAgent {
        ChatAgent::new(provider, self.tools.clone())
            .with_max_iterations(self.config.agent.max_iterations)
            .with_system_prompt(self.config.agent.system_prompt.clone())
    }

    /// Pick the agent for a request: a fresh one for a supplied key, the
    /// shared default otherwise
    fn agent_for(&self, req: &ChatRequest) -> Result<Arc<ChatAgent>, ApiError> {
        if let Some(key) = req.supplied_key() {
            let provider = self.providers.create(key)?;
            return Ok(Arc::new(self.build_agent(provider)));
        }

        self.default_agent
            .clone()
            .ok_or_else(|| ApiError::MissingApiKey {
                env_var: self.config.llm.api_key_env.clone(),
            })
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/tools", get(list_tools))
        .route("/chat", post(handle_chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the HTTP server until Ctrl+C
pub async fn run_http_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let env_api_key = config.llm.env_api_key();
    let providers = Arc::new(OpenAiProviderFactory::new(config.llm.clone()));
    let state = Arc::new(AppState::new(config, providers, env_api_key));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    if let Some(dir) = &state.config.server.static_dir {
        let path = dir.join("index.html");
        match tokio::fs::read_to_string(&path).await {
            Ok(html) => return Html(html),
            Err(e) => tracing::debug!("Serving embedded page, {:?} unreadable: {}", path, e),
        }
    }
    Html(INDEX_HTML.to_string())
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: format!(
            "{} ({})",
            env!("CARGO_PKG_VERSION"),
            env!("TOOLCHAT_GIT_HASH")
        ),
        agent_initialized: state.default_agent.is_some(),
        environment_api_key: state.env_key_present,
        tools_available: state.tools.infos().into_iter().map(|t| t.name).collect(),
    })
}

async fn list_tools(State(state): State<Arc<AppState>>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: state.tools.infos(),
    })
}

async fn handle_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let request_id = Uuid::new_v4();
    run_chat(&state, req)
        .instrument(tracing::info_span!("chat", %request_id))
        .await
        .map(Json)
}

async fn run_chat(state: &AppState, req: ChatRequest) -> Result<ChatResponse, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "Message must not be empty".to_string(),
        ));
    }

    let agent = state.agent_for(&req)?;
    tracing::info!(
        "Chat request ({} chars, provider {})",
        req.message.len(),
        agent.provider_name()
    );

    let result = agent.run(&req.message).await?;
    tracing::info!(
        "Chat completed in {} iterations, tools used: {:?}, tokens: {}",
        result.iterations,
        result.tool_calls,
        result.usage.total_tokens
    );

    Ok(ChatResponse {
        response: result.text,
        tool_calls: result.tool_calls,
    })
}
