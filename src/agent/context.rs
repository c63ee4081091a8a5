//! Conversation context for a single agent run

use crate::llm::{Message, ToolCall};

/// Max characters kept from a single tool result
const MAX_TOOL_RESULT_CHARS: usize = 16_000;

/// Ordered message history sent to the model on every iteration
#[derive(Debug, Default)]
pub struct ConversationContext {
    messages: Vec<Message>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation with an optional system prompt
    pub fn with_system_prompt(prompt: Option<&str>) -> Self {
        let mut context = Self::new();
        if let Some(prompt) = prompt.filter(|p| !p.trim().is_empty()) {
            context.add_system(prompt);
        }
        context
    }

    pub fn add_system(&mut self, content: impl Into<String>) {
        self.messages.push(Message::system(content));
    }

    pub fn add_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Add an assistant message with tool calls (required before tool results for OpenAI)
    pub fn add_assistant_tool_calls(&mut self, text: Option<&str>, tool_calls: &[ToolCall]) {
        self.messages
            .push(Message::assistant_tool_calls(text, tool_calls));
    }

    /// Add a tool result (auto-truncates if too large)
    pub fn add_tool_result(&mut self, tool_call_id: impl Into<String>, result: &str) {
        let truncated = truncate_chars(result, MAX_TOOL_RESULT_CHARS);
        self.messages
            .push(Message::tool_result(tool_call_id, truncated));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}\n\n... [TRUNCATED]", &text[..cut]),
        None => text.to_string(),
    }
}
