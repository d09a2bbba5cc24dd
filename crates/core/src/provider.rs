//! Provider trait: the abstraction over hosted chat-completion APIs.
//!
//! A Provider takes an ordered message list plus inference parameters and
//! returns one completion. It is stateless per call; the loops own history.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "anthropic/claude-3-haiku")
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic)
    #[serde(default)]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Tools the model may call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Stop sequences
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

impl ProviderRequest {
    /// A deterministic request with no tools and no stop sequences.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: 0.0,
            max_tokens: None,
            tools: Vec::new(),
            stop: Vec::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop.push(stop.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated assistant message (text plus optional tool calls)
    pub message: Message,

    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// Every hosted backend implements this. The loops call `complete()`
/// without knowing which provider is behind it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openrouter").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_defaults_to_deterministic() {
        let req = ProviderRequest::new("m", vec![Message::user("q")]);
        assert_eq!(req.temperature, 0.0);
        assert!(req.stop.is_empty());
        assert!(req.tools.is_empty());
    }

    #[test]
    fn request_builder_collects_stop_sequences() {
        let req = ProviderRequest::new("m", vec![])
            .with_stop("<PAUSE>")
            .with_max_tokens(Some(256));
        assert_eq!(req.stop, vec!["<PAUSE>".to_string()]);
        assert_eq!(req.max_tokens, Some(256));
    }

    #[test]
    fn empty_fields_are_not_serialized() {
        let req = ProviderRequest::new("m", vec![]);
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("stop"));
        assert!(!json.contains("tools"));
    }
}
