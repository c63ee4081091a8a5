//! LLM provider implementations

mod error;
mod openai;
mod types;

pub use error::LlmError;
pub use openai::{OpenAiProvider, OpenAiProviderFactory};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Send a chat completion request (non-streaming)
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<LlmResponse, LlmError>;
}

/// Builds providers bound to a specific API key
///
/// The HTTP layer holds one of these so a request carrying its own key gets a
/// provider for that key alone.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, api_key: &str) -> Result<Arc<dyn LlmProvider>, LlmError>;
}
