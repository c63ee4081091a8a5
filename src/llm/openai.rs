//! OpenAI LLM provider implementation
//!
//! Talks to the chat-completions endpoint with function tools enabled.

use super::{
    ContentPart, LlmError, LlmProvider, LlmResponse, Message, MessageContent, ProviderFactory,
    Role, TokenUsage, ToolCall, ToolDefinition,
};
use crate::config::LlmConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: Option<usize>,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_key)
    }

    /// Create a provider using the settings from the `[llm]` config section
    pub fn from_config(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| LlmError::Other(e.into()))?;

        Ok(Self::with_client(client, api_key)
            .with_base_url(&config.base_url)
            .with_model(&config.model)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens))
    }

    fn with_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        let defaults = LlmConfig::default();
        Self {
            client,
            api_key: api_key.into(),
            base_url: defaults.base_url,
            model: defaults.model,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<usize>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn convert_messages(&self, messages: &[Message]) -> Vec<OpenAiMessage> {
        messages
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    Role::Tool => "tool",
                };

                match &msg.content {
                    MessageContent::Text(text) => OpenAiMessage {
                        role: role.to_string(),
                        content: Some(text.clone()),
                        tool_calls: None,
                        tool_call_id: msg.tool_call_id.clone(),
                    },
                    MessageContent::Parts(parts) => {
                        let tool_calls: Vec<OpenAiToolCall> = parts
                            .iter()
                            .filter_map(|p| match p {
                                ContentPart::ToolUse { id, name, input } => Some(OpenAiToolCall {
                                    id: id.clone(),
                                    call_type: "function".to_string(),
                                    function: OpenAiFunctionCall {
                                        name: name.clone(),
                                        arguments: input.to_string(),
                                    },
                                }),
                                ContentPart::Text { .. } => None,
                            })
                            .collect();

                        OpenAiMessage {
                            role: role.to_string(),
                            content: msg.content.as_text().map(|t| t.to_string()),
                            tool_calls: if tool_calls.is_empty() {
                                None
                            } else {
                                Some(tool_calls)
                            },
                            tool_call_id: msg.tool_call_id.clone(),
                        }
                    }
                }
            })
            .collect()
    }

    fn convert_tools(&self, tools: &[ToolDefinition]) -> Vec<OpenAiTool> {
        tools
            .iter()
            .map(|t| OpenAiTool {
                tool_type: "function".to_string(),
                function: OpenAiFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }

    async fn send_request(&self, request: &OpenAiRequest) -> Result<OpenAiResponse, LlmError> {
        tracing::debug!(
            "Sending {} messages to {} (model: {})",
            request.messages.len(),
            self.endpoint(),
            request.model
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(LlmError::from_network_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI API error ({}): {}", status, error_text);
            return Err(LlmError::from_http_status(status, error_text));
        }

        response
            .json::<OpenAiResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

impl OpenAiResponse {
    fn into_llm_response(self) -> Result<LlmResponse, LlmError> {
        let usage = self.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("response has no choices".to_string()))?;

        let text = choice.message.content.filter(|t| !t.is_empty());
        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::Null),
            })
            .collect();

        Ok(match (text, tool_calls.is_empty()) {
            (text, true) => LlmResponse::Text {
                text: text.unwrap_or_default(),
                usage,
            },
            (None, false) => LlmResponse::ToolCalls {
                calls: tool_calls,
                usage,
            },
            (text, false) => LlmResponse::Mixed {
                text,
                tool_calls,
                usage,
            },
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<LlmResponse, LlmError> {
        let mut request = OpenAiRequest {
            model: self.model.clone(),
            messages: self.convert_messages(messages),
            temperature: Some(self.temperature),
            max_tokens: self.max_tokens,
            tools: None,
            tool_choice: None,
        };

        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            request.tools = Some(self.convert_tools(tools));
            request.tool_choice = Some("auto".to_string());
        }

        self.send_request(&request).await?.into_llm_response()
    }
}

/// Factory producing [`OpenAiProvider`]s from the shared `[llm]` settings
pub struct OpenAiProviderFactory {
    config: LlmConfig,
}

impl OpenAiProviderFactory {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }
}

impl ProviderFactory for OpenAiProviderFactory {
    fn create(&self, api_key: &str) -> Result<Arc<dyn LlmProvider>, LlmError> {
        Ok(Arc::new(OpenAiProvider::from_config(&self.config, api_key)?))
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAiFunction,
}

#[derive(Debug, Serialize)]
struct OpenAiFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
