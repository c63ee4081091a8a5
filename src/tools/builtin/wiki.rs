use crate::tools::{required_str, Tool, ToolResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

const NO_SUMMARY: &str = "No summary available.";

/// Looks up the Wikipedia REST summary for a page title
pub struct WikiSearchTool {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(default)]
    extract: Option<String>,
}

impl WikiSearchTool {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Build `{base}/api/rest_v1/page/summary/{title}`; spaces in the query become underscores
    fn summary_url(&self, query: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid Wikipedia base URL: {}", self.base_url))?;
        let title = query.trim().replace(' ', "_");
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Wikipedia base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["api", "rest_v1", "page", "summary", title.as_str()]);
        Ok(url)
    }

    async fn fetch_summary(&self, query: &str) -> Result<String> {
        let url = self.summary_url(query)?;
        tracing::debug!("wiki_search GET {}", url);

        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::USER_AGENT,
                concat!("toolchat/", env!("CARGO_PKG_VERSION")),
            )
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(NO_SUMMARY.to_string());
        }
        let response = response.error_for_status()?;
        let summary: PageSummary = response.json().await?;

        Ok(summary
            .extract
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| NO_SUMMARY.to_string()))
    }
}

#[async_trait]
impl Tool for WikiSearchTool {
    fn name(&self) -> &str {
        "wiki_search"
    }

    fn description(&self) -> &str {
        "Searches Wikipedia for a summary of the given query"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Page title or topic to look up"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: Value) -> Result<ToolResult> {
        let query = required_str(&params, "query")?;
        match self.fetch_summary(query).await {
            Ok(summary) => Ok(ToolResult::success(summary)),
            Err(e) => {
                tracing::warn!("wiki_search failed for '{}': {}", query, e);
                Ok(ToolResult::error(format!("Wiki search failed: {}", e)))
            }
        }
    }
}
