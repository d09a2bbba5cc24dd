//! Tool invocation types shared by both tool-loop variants.
//!
//! A text-directive loop produces an [`ActionRequest`] from an
//! `Action: <name>: <argument>` line; a function-calling loop produces a
//! [`ToolCall`] from the model's structured output. Both end up as a
//! string observation fed back to the model.

use serde::{Deserialize, Serialize};

use crate::message::MessageToolCall;

/// Observation returned to the model when it names a tool that does not exist.
pub const BAD_TOOL_NAME: &str = "bad tool name, retry";

/// A named action with its raw, unparsed argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub name: String,
    pub argument: String,
}

impl ActionRequest {
    pub fn new(name: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument: argument.into(),
        }
    }
}

/// A structured tool call with decoded JSON arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the model's tool_call.id)
    pub id: String,

    pub name: String,

    pub arguments: serde_json::Value,
}

impl From<&MessageToolCall> for ToolCall {
    /// Arguments that are not valid JSON decode to `Value::Null`; the tool
    /// then reports missing arguments as an observation.
    fn from(call: &MessageToolCall) -> Self {
        Self {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: serde_json::from_str(&call.arguments).unwrap_or_default(),
        }
    }
}
