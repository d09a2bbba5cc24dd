//! `web_search`: the structured tool offered to function-calling models.
//!
//! Wraps any [`SearchClient`]; the output is a JSON array of
//! `{url, content}` objects, best first.

use std::sync::Arc;

use inkloop_core::error::ToolError;
use inkloop_core::provider::ToolDefinition;
use inkloop_core::search::{SearchClient, SearchRequest};
use tracing::debug;

pub const WEB_SEARCH: &str = "web_search";

pub struct WebSearchTool {
    client: Arc<dyn SearchClient>,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(client: Arc<dyn SearchClient>, max_results: usize) -> Self {
        Self {
            client,
            max_results,
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: WEB_SEARCH.into(),
            description: "Search the web. Useful for current events and facts the model may not know. \
                          Input should be a search query."
                .into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    /// Run one search. A search failure is reported, not raised past the
    /// caller: the loop turns it into an observation.
    pub async fn call(&self, arguments: &serde_json::Value) -> Result<String, ToolError> {
        let query = arguments["query"]
            .as_str()
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        debug!(query, "web_search tool call");
        let response = self
            .client
            .search(SearchRequest::new(query, self.max_results))
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                action: WEB_SEARCH.into(),
                reason: e.to_string(),
            })?;

        let hits: Vec<serde_json::Value> = response
            .results
            .iter()
            .map(|h| serde_json::json!({"url": h.url, "content": h.content}))
            .collect();
        Ok(serde_json::Value::Array(hits).to_string())
    }
}
