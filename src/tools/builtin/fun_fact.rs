use crate::tools::{required_str, Tool, ToolResult};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct FunFactTool;

#[async_trait]
impl Tool for FunFactTool {
    fn name(&self) -> &str {
        "fun_fact"
    }

    fn description(&self) -> &str {
        "Returns a fun fact about the given topic"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "Topic to share a fact about"
                }
            },
            "required": ["topic"]
        })
    }

    async fn execute(&self, params: Value) -> Result<ToolResult> {
        let topic = required_str(&params, "topic")?;
        Ok(ToolResult::success(format!(
            "Did you know that {} has a fascinating history?",
            topic
        )))
    }
}
