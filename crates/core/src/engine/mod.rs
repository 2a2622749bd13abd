//! Agent loop.
//!
//! The [`AgentEngine`] drives a bounded, multi-turn tool-calling conversation
//! with a [`VisionModel`]:
//!
//! 1. The opening turn carries the instruction frame and the screenshot.
//! 2. Every tool call of a reply is dispatched in order and its result (or
//!    error) is collected.
//! 3. The collected results are sent back as the next turn.
//!
//! A successful ticket filing ends the loop immediately. The loop never makes
//! more than `max_turns` model calls.

pub mod prompt;

use crate::agents::base::{AgentError, Message, ModelRequest, Part, VisionModel};
use crate::hosting::ScreenshotUpload;
use crate::state::store::JobStore;
use crate::tools::{self, AgentContext, CreateTicketArgs, Dispatch, Tool, ToolOutput, ToolRegistry};
use sb_protocol::{Issue, JobStatus, JobUpdate};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub use prompt::DEFAULT_INSTRUCTION;

pub const DEFAULT_MAX_TURNS: u32 = 5;

/// How a loop run ended without an error.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    /// A ticket was filed; the job record is already `completed`.
    TicketFiled(Issue),
    /// `turns` model calls were made without a ticket being filed.
    Exhausted { turns: u32 },
    /// The model kept replying with text after being told to file the ticket.
    NoTicket { last_text: Option<String> },
}

impl LoopOutcome {
    /// Failure message for outcomes that did not file a ticket.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            LoopOutcome::TicketFiled(_) => None,
            LoopOutcome::Exhausted { turns } => Some(format!(
                "Agent reached the limit of {turns} turns without creating a ticket"
            )),
            LoopOutcome::NoTicket { last_text } => Some(match last_text {
                Some(text) if !text.trim().is_empty() => format!(
                    "Agent stopped without creating a ticket: {}",
                    preview(text, 200)
                ),
                _ => "Agent stopped without creating a ticket".to_string(),
            }),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Model request failed: {0}")]
    Model(#[from] AgentError),
}

pub struct AgentEngine {
    model: Arc<dyn VisionModel>,
    tools: ToolRegistry,
    store: Arc<dyn JobStore>,
    max_turns: u32,
    instruction: String,
}

impl AgentEngine {
    pub fn new(model: Arc<dyn VisionModel>, tools: ToolRegistry, store: Arc<dyn JobStore>) -> Self {
        Self {
            model,
            tools,
            store,
            max_turns: DEFAULT_MAX_TURNS,
            instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Run the loop for one job until it files a ticket, gives up, or fails.
    pub async fn run(
        &self,
        job_id: Uuid,
        image: &ScreenshotUpload,
        ctx: &AgentContext,
    ) -> Result<LoopOutcome, EngineError> {
        self.update(
            job_id,
            JobUpdate::new()
                .progress(30)
                .step("Agent analyzing screenshot..."),
        )
        .await;
        self.log(job_id, "Agent is analyzing the screenshot...").await;

        let definitions = self.tools.definitions();
        let mut messages = vec![Message::user(vec![
            Part::Text(self.instruction.clone()),
            Part::InlineImage {
                mime_type: image.mime_type.clone(),
                data: image.base64(),
            },
        ])];
        let mut nudged = false;
        let mut ctx = ctx.clone();

        for turn in 0..self.max_turns {
            let request = ModelRequest {
                system: None,
                messages: messages.clone(),
                tools: definitions.clone(),
            };

            tracing::debug!(job_id = %job_id, turn, model = %self.model.model_name(), "Requesting model turn");
            let reply = self.model.generate(&request).await?;
            messages.push(Message::from_turn(&reply));

            if !reply.has_tool_calls() {
                let text = reply.text.unwrap_or_default();
                self.log(job_id, format!("Agent thought: {}", preview(&text, 100)))
                    .await;

                if nudged || turn + 1 == self.max_turns {
                    tracing::warn!(job_id = %job_id, turn, "Model stopped calling tools before filing a ticket");
                    return Ok(LoopOutcome::NoTicket {
                        last_text: Some(text).filter(|t| !t.is_empty()),
                    });
                }
                nudged = true;
                messages.push(Message::user_text(prompt::NUDGE));
                continue;
            }
            nudged = false;

            let mut responses = Vec::with_capacity(reply.tool_calls.len());
            for call in &reply.tool_calls {
                if let Some(tool) = Tool::from_name(&call.name) {
                    self.before_tool(job_id, turn, tool, &call.args).await;
                }

                let payload = match self.tools.dispatch(call, &ctx).await {
                    Dispatch::Unknown(name) => {
                        tracing::warn!(job_id = %job_id, tool = %name, "Model requested an unknown tool");
                        self.log(job_id, format!("Skipping unknown tool: {name}")).await;
                        sb_protocol::ToolResultPayload::Error(format!("Unknown tool: {name}"))
                    }
                    Dispatch::Executed(tool, result) => {
                        match &result {
                            Ok(ToolOutput::TicketFiled(issue)) => {
                                self.finish(job_id, issue).await;
                                return Ok(LoopOutcome::TicketFiled(issue.clone()));
                            }
                            Ok(ToolOutput::Explored(context)) => {
                                self.update(job_id, JobUpdate::new().browser_context(context.clone()))
                                    .await;
                                ctx.browser_context = Some(context.clone());
                                self.log(job_id, format!("Tool {} completed successfully.", tool.name()))
                                    .await;
                            }
                            Err(e) => {
                                tracing::warn!(job_id = %job_id, tool = tool.name(), error = %e, "Tool failed");
                                self.log(job_id, format!("Error executing tool {}: {e}", tool.name()))
                                    .await;
                            }
                        }
                        tools::result_payload(&result)
                    }
                };

                responses.push(Part::FunctionResponse {
                    name: call.name.clone(),
                    response: payload.to_value(),
                });
            }

            messages.push(Message::user(responses));
        }

        tracing::warn!(job_id = %job_id, turns = self.max_turns, "Agent loop exhausted");
        Ok(LoopOutcome::Exhausted {
            turns: self.max_turns,
        })
    }

    async fn before_tool(&self, job_id: Uuid, turn: u32, tool: Tool, args: &serde_json::Value) {
        let step = format!("Agent executing tool: {}", tool.name());
        let progress = (30 + 10 * turn).min(80) as u8;

        match tool {
            Tool::ExploreUrl => {
                self.update(
                    job_id,
                    JobUpdate::new()
                        .status(JobStatus::GatheringContext)
                        .progress(progress)
                        .step(step.clone()),
                )
                .await;
                self.log(job_id, step).await;
            }
            Tool::CreateTicket => {
                self.update(job_id, JobUpdate::new().progress(progress).step(step.clone()))
                    .await;
                self.log(job_id, step).await;

                let mut update = JobUpdate::new()
                    .status(JobStatus::CreatingTicket)
                    .progress(85)
                    .step("Creating Linear ticket...");
                if let Ok(parsed) = CreateTicketArgs::from_value(args) {
                    update = update.bug_analysis(parsed.analysis());
                }
                self.update(job_id, update).await;
                self.log(job_id, "Preparing to create Linear ticket...").await;
            }
        }
    }

    async fn finish(&self, job_id: Uuid, issue: &Issue) {
        self.log(job_id, format!("Tool {} completed successfully.", Tool::CreateTicket.name()))
            .await;
        self.log(job_id, format!("Ticket created: {}", issue.identifier))
            .await;
        self.update(
            job_id,
            JobUpdate::new()
                .status(JobStatus::Completed)
                .progress(100)
                .step("Done!")
                .ticket(issue.identifier.clone(), issue.url.clone()),
        )
        .await;
        tracing::info!(job_id = %job_id, ticket = %issue.identifier, "Ticket filed");
    }

    async fn update(&self, job_id: Uuid, update: JobUpdate) {
        if self.store.update(job_id, update).await.is_none() {
            tracing::debug!(job_id = %job_id, "Job record no longer exists");
        }
    }

    async fn log(&self, job_id: Uuid, line: impl Into<String>) {
        self.store.append_log(job_id, line.into()).await;
    }
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
