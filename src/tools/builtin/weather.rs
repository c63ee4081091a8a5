use crate::tools::{required_str, Tool, ToolResult};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Returns a dummy weather report for a city
pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Returns a dummy weather report for a given city"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "Name of the city"
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, params: Value) -> Result<ToolResult> {
        let city = required_str(&params, "city")?;
        Ok(ToolResult::success(format!("The weather in {} is sunny.", city)))
    }
}
