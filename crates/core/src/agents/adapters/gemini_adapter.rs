//! Gemini adapter implementation using the `generateContent` REST API.
//!
//! This adapter converts the conversation into Gemini `contents`, declares the
//! tool registry as `functionDeclarations`, and turns the first candidate of
//! the response back into a [`ModelTurn`].

use crate::agents::base::AgentError;
use crate::agents::base::Message;
use crate::agents::base::ModelRequest;
use crate::agents::base::ModelTurn;
use crate::agents::base::Part;
use crate::agents::base::Role;
use crate::agents::base::VisionModel;
use async_trait::async_trait;
use reqwest::Client;
use sb_protocol::ToolCall;
use sb_protocol::ToolDefinition;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini adapter for executing conversations against the Gemini API.
pub struct GeminiAdapter {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiAdapter {
    /// Create a new Gemini adapter.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, normally [`DEFAULT_GEMINI_BASE_URL`]
    /// * `model` - The Gemini model to use (e.g., "gemini-2.0-flash-exp")
    /// * `api_key` - The `GEMINI_API_KEY` credential
    pub fn new(base_url: String, model: String, api_key: String) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AgentError::NotAvailable(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            model,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl VisionModel for GeminiAdapter {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &ModelRequest) -> Result<ModelTurn, AgentError> {
        let body = GenerateContentRequest::from_request(request);

        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ApiError(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::ApiError(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(AgentError::ApiError(format!(
                "Gemini API error (HTTP {}): {}",
                status.as_u16(),
                truncate(&text, 512)
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text).map_err(|e| {
            AgentError::StreamParseError(format!(
                "Failed to parse Gemini response: {e} (body: {})",
                truncate(&text, 512)
            ))
        })?;

        convert_gemini_response(parsed)
    }
}

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSet>,
}

impl GenerateContentRequest {
    fn from_request(request: &ModelRequest) -> Self {
        let system_instruction = request.system.as_ref().map(|text| Content {
            role: None,
            parts: vec![GeminiPart::text(text.clone())],
        });

        let contents = request.messages.iter().map(Content::from_message).collect();

        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![ToolSet {
                function_declarations: request.tools.clone(),
            }]
        };

        Self {
            system_instruction,
            contents,
            tools,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl Content {
    fn from_message(message: &Message) -> Self {
        let role = match message.role {
            Role::User => "user",
            Role::Model => "model",
        };
        Self {
            role: Some(role.to_string()),
            parts: message.parts.iter().map(GeminiPart::from_part).collect(),
        }
    }
}

/// A Gemini content part. Exactly one field is set.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

impl GeminiPart {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    fn from_part(part: &Part) -> Self {
        match part {
            Part::Text(text) => Self::text(text.clone()),
            Part::InlineImage { mime_type, data } => Self {
                inline_data: Some(InlineData {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                }),
                ..Self::default()
            },
            Part::FunctionCall(call) => Self {
                function_call: Some(FunctionCall {
                    name: call.name.clone(),
                    args: call.args.clone(),
                }),
                ..Self::default()
            },
            Part::FunctionResponse { name, response } => Self {
                function_response: Some(FunctionResponse {
                    name: name.clone(),
                    response: response.clone(),
                }),
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSet {
    function_declarations: Vec<ToolDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Convert a Gemini response to a ModelTurn.
fn convert_gemini_response(response: GenerateContentResponse) -> Result<ModelTurn, AgentError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(AgentError::ApiError(format!("Gemini returned no answer: {reason}")));
    };

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    if parts.is_empty() {
        return Err(AgentError::StreamParseError(format!(
            "Gemini candidate has no content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();
    for part in parts {
        if let Some(text) = part.text {
            texts.push(text);
        }
        if let Some(call) = part.function_call {
            tool_calls.push(ToolCall::new(call.name, call.args));
        }
    }

    let text = if texts.is_empty() {
        None
    } else {
        Some(texts.join(""))
    };

    Ok(ModelTurn { text, tool_calls })
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
