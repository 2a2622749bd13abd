//! Tool call models exchanged with the reasoning model.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A tool invocation requested by the model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct ToolCall {
    /// Name of the requested tool.
    pub name: String,

    /// Structured arguments, validated by the tool before execution.
    #[serde(default)]
    pub args: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Declaration of a tool the model may call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct ToolDefinition {
    pub name: String,

    /// Natural-language description the model uses to choose the tool.
    pub description: String,

    /// JSON-Schema-like description of the arguments.
    pub parameters: serde_json::Value,
}

/// Outcome of one tool call as reported back to the model.
///
/// Serializes as `{"result": ...}` or `{"error": "..."}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub enum ToolResultPayload {
    Result(serde_json::Value),
    Error(String),
}

impl ToolResultPayload {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolResultPayload::Error(_))
    }

    pub fn to_value(&self) -> serde_json::Value {
        match self {
            ToolResultPayload::Result(value) => serde_json::json!({ "result": value }),
            ToolResultPayload::Error(message) => serde_json::json!({ "error": message }),
        }
    }
}

/// A ticket filed in the external tracker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct Issue {
    /// Tracker-internal identifier.
    pub id: String,

    /// Human-facing identifier, e.g. `ENG-123`.
    pub identifier: String,

    pub title: String,

    pub url: String,
}
