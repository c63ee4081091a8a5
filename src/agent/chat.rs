//! Chat agent: runs the model/tool loop for a single user message

use super::ConversationContext;
use crate::llm::{LlmError, LlmProvider, TokenUsage};
use crate::tools::ToolRegistry;
use futures::future::join_all;
use std::sync::Arc;

/// Reply used when the model never produced any text
pub const EMPTY_RESPONSE_FALLBACK: &str = "I apologize, but I couldn't generate a response.";

/// Reply used when the loop runs out of iterations
pub const MAX_ITERATIONS_REPLY: &str =
    "I've reached the maximum number of steps without a final answer.";

/// Outcome of one agent run
#[derive(Debug, Clone)]
pub struct AgentResponse {
    pub text: String,
    /// Tool names in first-invocation order, each listed once
    pub tool_calls: Vec<String>,
    /// Number of model calls made
    pub iterations: usize,
    pub usage: TokenUsage,
}

/// Tool-calling agent
///
/// Stateless between runs: every call to [`ChatAgent::run`] starts a fresh
/// conversation, so one agent can serve concurrent requests.
pub struct ChatAgent {
    llm: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    max_iterations: usize,
    system_prompt: Option<String>,
}

impl ChatAgent {
    pub fn new(llm: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            llm,
            tools,
            max_iterations: 10,
            system_prompt: None,
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.llm.name()
    }

    /// Run the agent loop for one user message
    ///
    /// The model is called until it answers without requesting tools. Each
    /// requested batch of tools runs concurrently and every result is fed
    /// back in request order. Model errors abort the run; tool failures are
    /// handed to the model as tool output.
    pub async fn run(&self, user_message: &str) -> Result<AgentResponse, LlmError> {
        let mut context = ConversationContext::with_system_prompt(self.system_prompt.as_deref());
        context.add_user(user_message);

        let tool_definitions = self.tools.definitions();
        let mut tool_calls: Vec<String> = Vec::new();
        let mut usage = TokenUsage::default();
        let mut last_text: Option<String> = None;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            let response = self
                .llm
                .chat(context.messages(), Some(&tool_definitions))
                .await?;
            iterations += 1;

            if let Some(u) = response.usage() {
                usage.accumulate(u);
            }
            if let Some(text) = response.text().map(str::trim).filter(|t| !t.is_empty()) {
                last_text = Some(text.to_string());
            }

            let calls = response.tool_calls();
            if calls.is_empty() {
                return Ok(AgentResponse {
                    text: last_text.unwrap_or_else(|| EMPTY_RESPONSE_FALLBACK.to_string()),
                    tool_calls,
                    iterations,
                    usage,
                });
            }

            context.add_assistant_tool_calls(response.text(), calls);

            for call in calls {
                tracing::debug!("Executing tool: {} with args: {}", call.name, call.arguments);
                if !tool_calls.contains(&call.name) {
                    tool_calls.push(call.name.clone());
                }
            }

            let results = join_all(
                calls
                    .iter()
                    .map(|call| self.tools.execute(&call.name, call.arguments.clone())),
            )
            .await;

            for (call, result) in calls.iter().zip(results) {
                if !result.success {
                    tracing::warn!("Tool '{}' failed: {}", call.name, result.output);
                }
                context.add_tool_result(&call.id, &result.output);
            }
        }

        tracing::warn!(
            "Agent stopped after {} iterations without a final answer",
            iterations
        );
        Ok(AgentResponse {
            text: MAX_ITERATIONS_REPLY.to_string(),
            tool_calls,
            iterations,
            usage,
        })
    }
}
