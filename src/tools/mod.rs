//! Agent tools
//!
//! Every tool implements [`Tool`] and is looked up by name through the
//! [`ToolRegistry`], which also enforces a per-call timeout and turns panics
//! and errors into failed [`ToolResult`]s the model can read.

pub mod builtin;

pub use builtin::{FunFactTool, RandomColorTool, WeatherTool, WikiSearchTool};

use crate::config::ToolsConfig;
use crate::llm::ToolDefinition;
use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Result of executing a tool
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

/// Trait for agent tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name
    fn name(&self) -> &str;

    /// Get the tool description
    fn description(&self) -> &str;

    /// Get the JSON schema for parameters
    fn parameters(&self) -> Value;

    /// Execute the tool with given parameters
    async fn execute(&self, params: Value) -> Result<ToolResult>;

    /// Convert to LLM tool definition
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Name and description pair exposed by `GET /tools`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Fetch a required string parameter
pub(crate) fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {}", key))
}

/// Registry of available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Registration order, used for stable listings
    order: Vec<String>,
    tool_timeout: Duration,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
            tool_timeout: Duration::from_secs(ToolsConfig::default().timeout_secs),
        }
    }

    /// Create a registry with the four demonstration tools
    pub fn with_defaults(config: &ToolsConfig) -> Self {
        let mut registry = Self::new();
        registry.set_tool_timeout(Duration::from_secs(config.timeout_secs));

        registry.register(Arc::new(WeatherTool));
        registry.register(Arc::new(WikiSearchTool::new(&config.wikipedia_base_url)));
        registry.register(Arc::new(FunFactTool));
        registry.register(Arc::new(RandomColorTool));

        tracing::debug!("Registered {} tools: {:?}", registry.len(), registry.order);
        registry
    }

    /// Register a tool; a tool with the same name is replaced in place
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    pub fn set_tool_timeout(&mut self, tool_timeout: Duration) {
        self.tool_timeout = tool_timeout;
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name with given parameters
    ///
    /// Never fails: unknown tools, tool errors, panics and timeouts all come
    /// back as an unsuccessful [`ToolResult`].
    pub async fn execute(&self, name: &str, params: Value) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            return ToolResult::error(format!("Unknown tool: {}", name));
        };

        match timeout(
            self.tool_timeout,
            AssertUnwindSafe(tool.execute(params)).catch_unwind(),
        )
        .await
        {
            Ok(Ok(Ok(result))) => result,
            Ok(Ok(Err(e))) => {
                tracing::warn!("Tool '{}' failed: {}", name, e);
                ToolResult::error(format!("Error: {}", e))
            }
            Ok(Err(panic_info)) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    (*s).to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                tracing::error!("Tool '{}' panicked: {}", name, panic_msg);
                ToolResult::error(format!("Tool '{}' crashed: {}", name, panic_msg))
            }
            Err(_) => ToolResult::error(format!(
                "Tool '{}' timed out after {} ms",
                name,
                self.tool_timeout.as_millis()
            )),
        }
    }

    /// Get all tool definitions for the LLM, in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.iter().map(|t| t.to_definition()).collect()
    }

    /// Names and descriptions, in registration order
    pub fn infos(&self) -> Vec<ToolInfo> {
        self.iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.order.iter().filter_map(|name| self.tools.get(name))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
