//! Anthropic native provider implementation.
//!
//! Uses the Messages API directly:
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header
//! - System prompt as a top-level field
//! - Native tool use with `tool_use` / `tool_result` content blocks

use std::time::Duration;

use async_trait::async_trait;
use inkloop_core::error::ProviderError;
use inkloop_core::message::{Message, MessageToolCall, Role};
use inkloop_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
/// The Messages API requires `max_tokens`.
const DEFAULT_MAX_TOKENS: u32 = 4096;

pub struct AnthropicProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client: http::build_client(timeout)?,
        })
    }

    /// Point at a proxy or a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_body(request: &ProviderRequest) -> serde_json::Value {
        let system: Vec<&str> = request
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "temperature": request.temperature,
        });

        if !system.is_empty() {
            body["system"] = serde_json::json!(system.join("\n\n"));
        }

        if !request.tools.is_empty() {
            let tools: Vec<ApiTool> = request
                .tools
                .iter()
                .map(|t| ApiTool {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    input_schema: t.parameters.clone(),
                })
                .collect();
            body["tools"] = serde_json::json!(tools);
        }

        if !request.stop.is_empty() {
            body["stop_sequences"] = serde_json::json!(request.stop);
        }

        body
    }

    /// Convert messages to content blocks. System messages travel separately;
    /// tool results are user turns carrying a `tool_result` block.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .filter_map(|msg| match msg.role {
                Role::System => None,
                Role::User => Some(ApiMessage {
                    role: "user",
                    content: ApiContent::Text(msg.content.clone()),
                }),
                Role::Assistant if msg.tool_calls.is_empty() => Some(ApiMessage {
                    role: "assistant",
                    content: ApiContent::Text(msg.content.clone()),
                }),
                Role::Assistant => {
                    let mut blocks = Vec::with_capacity(msg.tool_calls.len() + 1);
                    if !msg.content.is_empty() {
                        blocks.push(ContentBlock::Text {
                            text: msg.content.clone(),
                        });
                    }
                    blocks.extend(msg.tool_calls.iter().map(|tc| ContentBlock::ToolUse {
                        id: tc.id.clone(),
                        name: tc.name.clone(),
                        input: serde_json::from_str(&tc.arguments).unwrap_or_default(),
                    }));
                    Some(ApiMessage {
                        role: "assistant",
                        content: ApiContent::Blocks(blocks),
                    })
                }
                Role::Tool => Some(ApiMessage {
                    role: "user",
                    content: ApiContent::Blocks(vec![ContentBlock::ToolResult {
                        tool_use_id: msg.tool_call_id.clone().unwrap_or_default(),
                        content: msg.content.clone(),
                    }]),
                }),
            })
            .collect()
    }

    fn from_api_response(api: ApiResponse) -> ProviderResponse {
        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in api.content {
            match block {
                ContentBlock::Text { text: t } => text.push_str(&t),
                ContentBlock::ToolUse { id, name, input } => tool_calls.push(MessageToolCall {
                    id,
                    name,
                    arguments: input.to_string(),
                }),
                ContentBlock::ToolResult { .. } => {}
            }
        }

        let mut message = Message::assistant(text);
        message.tool_calls = tool_calls;

        ProviderResponse {
            message,
            usage: api.usage.map(|u| Usage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
            }),
            model: api.model,
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = Self::request_body(&request);

        debug!(provider = "anthropic", model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(http::send_error)?;

        let response = http::check_status("anthropic", response).await?;
        let api: ApiResponse = response
            .json()
            .await
            .map_err(|e| http::malformed("anthropic", e))?;

        Ok(Self::from_api_response(api))
    }
}

// ── Messages API wire types ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: ApiContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

#[derive(Debug, Serialize)]
struct ApiTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    content: Vec<ContentBlock>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}
