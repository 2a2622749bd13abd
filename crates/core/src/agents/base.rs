//! Base VisionModel trait and conversation types.

use async_trait::async_trait;
use sb_protocol::{ToolCall, ToolDefinition};
use thiserror::Error;

/// Who authored a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

/// One piece of a conversation message.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Plain text.
    Text(String),
    /// Inline image, base64-encoded.
    InlineImage { mime_type: String, data: String },
    /// A tool call the model requested in an earlier turn.
    FunctionCall(ToolCall),
    /// The outcome of a tool call, keyed by the tool name.
    FunctionResponse {
        name: String,
        response: serde_json::Value,
    },
}

/// A single turn of the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![Part::Text(text.into())])
    }

    /// Record what the model said so the next request carries the full history.
    pub fn from_turn(turn: &ModelTurn) -> Self {
        let mut parts = Vec::new();
        if let Some(text) = &turn.text {
            parts.push(Part::Text(text.clone()));
        }
        parts.extend(turn.tool_calls.iter().cloned().map(Part::FunctionCall));
        Self {
            role: Role::Model,
            parts,
        }
    }
}

/// Everything the model needs to produce its next turn.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Optional system instruction, sent separately from the history.
    pub system: Option<String>,

    /// The conversation so far, oldest first.
    pub messages: Vec<Message>,

    /// Tools the model may call.
    pub tools: Vec<ToolDefinition>,
}

/// The model's reply to a request.
///
/// A reply carries zero or more tool calls; when it carries none the model
/// has produced only text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTurn {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl ModelTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            text: None,
            tool_calls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Model not available: {0}")]
    NotAvailable(String),
    #[error("API call failed: {0}")]
    ApiError(String),
    #[error("Response parsing error: {0}")]
    StreamParseError(String),
    #[error("Execution failed: {0}")]
    ExecutionError(String),
}

/// A vision-capable reasoning model that supports tool calling.
#[async_trait]
pub trait VisionModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, request: &ModelRequest) -> Result<ModelTurn, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoModel;

    #[async_trait]
    impl VisionModel for EchoModel {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: &ModelRequest) -> Result<ModelTurn, AgentError> {
            let last = request
                .messages
                .last()
                .ok_or_else(|| AgentError::ExecutionError("empty conversation".to_string()))?;
            match last.parts.first() {
                Some(Part::Text(text)) => Ok(ModelTurn::text(format!("echo: {text}"))),
                _ => Ok(ModelTurn::default()),
            }
        }
    }

    #[tokio::test]
    async fn test_model_generate_echo() {
        let request = ModelRequest {
            system: None,
            messages: vec![Message::user_text("hello")],
            tools: vec![],
        };

        let turn = EchoModel.generate(&request).await.unwrap();
        assert_eq!(turn.text.as_deref(), Some("echo: hello"));
        assert!(!turn.has_tool_calls());
    }

    #[tokio::test]
    async fn test_model_generate_empty_conversation() {
        let request = ModelRequest {
            system: None,
            messages: vec![],
            tools: vec![],
        };

        let result = EchoModel.generate(&request).await;
        assert!(matches!(result, Err(AgentError::ExecutionError(_))));
    }

    #[test]
    fn test_message_from_turn_keeps_text_and_calls() {
        let turn = ModelTurn {
            text: Some("Looking at the page".to_string()),
            tool_calls: vec![ToolCall::new(
                "explore_url",
                json!({ "url": "https://example.com" }),
            )],
        };

        let message = Message::from_turn(&turn);
        assert_eq!(message.role, Role::Model);
        assert_eq!(message.parts.len(), 2);
        assert!(matches!(message.parts[0], Part::Text(_)));
        assert!(matches!(message.parts[1], Part::FunctionCall(_)));
    }
}
