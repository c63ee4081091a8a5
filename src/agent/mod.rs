//! Chat agent with tool execution

mod chat;
mod context;

pub use chat::{AgentResponse, ChatAgent, EMPTY_RESPONSE_FALLBACK, MAX_ITERATIONS_REPLY};
pub use context::ConversationContext;
