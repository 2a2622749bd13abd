//! Ticket filing.

use crate::tools::format::build_description;
use crate::tools::{AgentContext, ToolError};
use crate::tracker::{IssueTracker, TicketDraft};
use sb_protocol::{BrowserContext, BugAnalysis, Issue, Severity};
use serde::Deserialize;
use serde_json::Value;

/// Labels added to every filed ticket.
const DEFAULT_LABELS: [&str; 2] = ["bug", "automated"];

/// Arguments of the `create_linear_ticket` tool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketArgs {
    pub title: String,
    pub description: String,
    /// Models emit JSON numbers, which may arrive as floats.
    pub priority: f64,
    pub severity: Severity,
    #[serde(default)]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub suggested_labels: Vec<String>,
    #[serde(default)]
    pub ui_state: Option<String>,
}

impl CreateTicketArgs {
    pub fn from_value(args: &Value) -> Result<Self, ToolError> {
        let parsed = Self::deserialize(args)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;
        if parsed.title.trim().is_empty() {
            return Err(ToolError::InvalidParameters("title must not be empty".to_string()));
        }
        if parsed.description.trim().is_empty() {
            return Err(ToolError::InvalidParameters(
                "description must not be empty".to_string(),
            ));
        }
        Ok(parsed)
    }

    /// Priority on the tracker's 0..=4 scale, derived from severity when the
    /// model's value is out of range or not a whole number.
    pub fn priority(&self) -> u8 {
        let p = self.priority;
        if p.fract() == 0.0 && (0.0..=4.0).contains(&p) {
            p as u8
        } else {
            self.severity.default_priority()
        }
    }

    /// Suggested labels plus the defaults, de-duplicated in first-seen order.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        let candidates = self
            .suggested_labels
            .iter()
            .map(|label| label.trim())
            .chain(DEFAULT_LABELS);
        for label in candidates {
            if !label.is_empty() && !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
        labels
    }

    pub fn analysis(&self) -> BugAnalysis {
        BugAnalysis {
            title: self.title.clone(),
            description: self.description.clone(),
            error_messages: self.error_messages.clone(),
            urls: self.urls.clone(),
            severity: self.severity,
            suggested_labels: self.suggested_labels.clone(),
            ui_state: self.ui_state.clone().unwrap_or_default(),
        }
    }

    pub fn draft(&self, browser: Option<&BrowserContext>, screenshot_url: Option<&str>) -> TicketDraft {
        TicketDraft {
            title: self.title.trim().to_string(),
            description: build_description(&self.analysis(), browser, screenshot_url),
            priority: self.priority(),
            labels: self.labels(),
        }
    }
}

pub async fn create_ticket(
    tracker: &dyn IssueTracker,
    args: &Value,
    ctx: &AgentContext,
) -> Result<Issue, ToolError> {
    let args = CreateTicketArgs::from_value(args)?;
    let draft = args.draft(ctx.browser_context.as_ref(), ctx.screenshot_url.as_deref());
    tracing::info!(title = %draft.title, priority = draft.priority, "Filing ticket");

    tracker
        .create_issue(&draft)
        .await
        .map_err(|e| ToolError::ExecutionFailed(format!("Linear ticket creation failed: {e}")))
}
