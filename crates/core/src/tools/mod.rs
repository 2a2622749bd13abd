//! Tools the reasoning model may call.
//!
//! The set of tools is closed: [`Tool`] names every variant, and
//! [`ToolRegistry::dispatch`] maps a model-issued [`ToolCall`] onto one of
//! them or reports it as unknown.

pub mod explore;
pub mod format;
pub mod ticket;

pub use ticket::CreateTicketArgs;

use crate::sandbox::SandboxSession;
use crate::tracker::IssueTracker;
use sb_protocol::{BrowserContext, Issue, ToolCall, ToolDefinition, ToolResultPayload};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Per-job state shared by every tool call of one loop run.
#[derive(Debug, Clone)]
pub struct AgentContext {
    pub sandbox: SandboxSession,
    /// Public URL (or `data:` URL) of the uploaded screenshot.
    pub screenshot_url: Option<String>,
    /// Result of the most recent successful exploration, used in the ticket body.
    pub browser_context: Option<BrowserContext>,
}

impl AgentContext {
    pub fn new(sandbox: SandboxSession, screenshot_url: Option<String>) -> Self {
        Self {
            sandbox,
            screenshot_url,
            browser_context: None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Explored(BrowserContext),
    TicketFiled(Issue),
}

impl ToolOutput {
    pub fn to_json(&self) -> Value {
        let value = match self {
            ToolOutput::Explored(context) => serde_json::to_value(context),
            ToolOutput::TicketFiled(issue) => serde_json::to_value(issue),
        };
        value.unwrap_or(Value::Null)
    }
}

/// Converts a tool outcome into the payload sent back to the model.
pub fn result_payload(result: &Result<ToolOutput, ToolError>) -> ToolResultPayload {
    match result {
        Ok(output) => ToolResultPayload::Result(output.to_json()),
        Err(e) => ToolResultPayload::Error(e.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    ExploreUrl,
    CreateTicket,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Tool::ExploreUrl, Tool::CreateTicket];

    pub fn name(self) -> &'static str {
        match self {
            Tool::ExploreUrl => "explore_url",
            Tool::CreateTicket => "create_linear_ticket",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Tool::ExploreUrl => {
                "Use the sandbox to visit a URL and gather context (HTTP status, page title, \
                 network errors). Use this when you see a URL in the screenshot that needs \
                 investigation."
            }
            Tool::CreateTicket => {
                "Create a bug ticket in Linear. Call this when you have analyzed the screenshot \
                 and gathered enough context."
            }
        }
    }

    pub fn parameters_schema(self) -> Value {
        match self {
            Tool::ExploreUrl => serde_json::json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The URL to explore"
                    }
                },
                "required": ["url"]
            }),
            Tool::CreateTicket => serde_json::json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string", "description": "Concise bug title" },
                    "description": { "type": "string", "description": "Detailed bug description in Markdown" },
                    "priority": {
                        "type": "number",
                        "description": "Priority (0=No Priority, 1=Urgent, 2=High, 3=Normal, 4=Low)"
                    },
                    "severity": { "type": "string", "enum": ["low", "medium", "high", "critical"] },
                    "errorMessages": { "type": "array", "items": { "type": "string" } },
                    "urls": { "type": "array", "items": { "type": "string" } },
                    "suggestedLabels": { "type": "array", "items": { "type": "string" } },
                    "uiState": { "type": "string", "description": "Description of the UI state" }
                },
                "required": ["title", "description", "priority", "severity"]
            }),
        }
    }

    pub fn definition(self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Outcome of routing one model-issued call.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Executed(Tool, Result<ToolOutput, ToolError>),
    /// The model asked for a tool that does not exist; nothing was run.
    Unknown(String),
}

pub struct ToolRegistry {
    tracker: Arc<dyn IssueTracker>,
}

impl ToolRegistry {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self { tracker }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        Tool::ALL.into_iter().map(Tool::definition).collect()
    }

    pub async fn execute(
        &self,
        tool: Tool,
        args: &Value,
        ctx: &AgentContext,
    ) -> Result<ToolOutput, ToolError> {
        match tool {
            Tool::ExploreUrl => explore::explore_url(&ctx.sandbox, args)
                .await
                .map(ToolOutput::Explored),
            Tool::CreateTicket => ticket::create_ticket(self.tracker.as_ref(), args, ctx)
                .await
                .map(ToolOutput::TicketFiled),
        }
    }

    pub async fn dispatch(&self, call: &ToolCall, ctx: &AgentContext) -> Dispatch {
        match Tool::from_name(&call.name) {
            Some(tool) => Dispatch::Executed(tool, self.execute(tool, &call.args, ctx).await),
            None => Dispatch::Unknown(call.name.clone()),
        }
    }
}
