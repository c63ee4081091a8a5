use crate::tools::{Tool, ToolResult};
use anyhow::Result;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde_json::{json, Value};

/// Picks one color uniformly from the list the model supplies
pub struct RandomColorTool;

#[async_trait]
impl Tool for RandomColorTool {
    fn name(&self) -> &str {
        "random_color"
    }

    fn description(&self) -> &str {
        "Randomly selects a color from a given list of strings"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "colors": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Colors to choose from"
                }
            },
            "required": ["colors"]
        })
    }

    async fn execute(&self, params: Value) -> Result<ToolResult> {
        let colors: Vec<String> = match params.get("colors") {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| anyhow::anyhow!("Invalid parameter colors: {}", e))?,
            None => anyhow::bail!("Missing required parameter: colors"),
        };

        tracing::info!("[TOOL] Choosing from: {:?}", colors);

        let picked = colors.choose(&mut rand::thread_rng()).cloned();
        Ok(ToolResult::success(
            picked.unwrap_or_else(|| "No colors provided.".to_string()),
        ))
    }
}
