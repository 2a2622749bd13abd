//! Runtime job state models.
//!
//! This module defines the record a client polls while a screenshot travels
//! through analysis, investigation and ticket creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::analysis_models::{BrowserContext, BugAnalysis};

/// Represents the current lifecycle status of a job.
///
/// The status progresses through these states during normal execution:
/// Pending -> Analyzing -> GatheringContext -> CreatingTicket -> Completed
///
/// `Failed` is reachable from any non-terminal state. `Completed` and
/// `Failed` are terminal and mutually exclusive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    /// Job has been created but processing has not started yet.
    Pending,

    /// The screenshot is being examined by the reasoning model.
    Analyzing,

    /// The model is investigating URLs inside the sandbox.
    GatheringContext,

    /// The ticket is being filed in the tracker.
    CreatingTicket,

    /// A ticket was filed; `ticket_url` and `ticket_id` are populated.
    Completed,

    /// Processing stopped; `error` is populated.
    Failed,
}

impl JobStatus {
    /// Whether no further mutation may follow this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Position in the forward progression. Higher ranks come later.
    pub fn rank(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Analyzing => 1,
            JobStatus::GatheringContext => 2,
            JobStatus::CreatingTicket => 3,
            JobStatus::Completed | JobStatus::Failed => 4,
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Staying in the same non-terminal status is allowed so that progress
    /// and step updates can be merged without a status change.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            JobStatus::Failed => true,
            _ => next.rank() >= self.rank(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Analyzing => "analyzing",
            JobStatus::GatheringContext => "gathering-context",
            JobStatus::CreatingTicket => "creating-ticket",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents one end-to-end screenshot processing request.
///
/// Each uploaded screenshot gets a new JobRecord with a unique ID. The
/// record is the single source of truth polled by clients.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    /// Unique identifier, assigned at creation and never changed.
    #[ts(type = "string")]
    pub id: Uuid,

    /// Current lifecycle status.
    pub status: JobStatus,

    /// Completion estimate between 0 and 100.
    pub progress: u8,

    /// Human-readable description of the active operation.
    pub current_step: String,

    /// Append-only record of the externally observable actions taken.
    pub logs: Vec<String>,

    /// Structured analysis of the bug, attached once the model files it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bug_analysis: Option<BugAnalysis>,

    /// Diagnostics gathered by the most recent URL exploration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_context: Option<BrowserContext>,

    /// URL of the filed ticket. Only set on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,

    /// Human-facing identifier of the filed ticket (e.g. `ENG-123`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,

    /// Failure message. Only set when `status` is `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation.
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    /// Create a new record in `Pending` state with zero progress.
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Pending,
            progress: 0,
            current_step: "Initializing...".to_string(),
            logs: Vec::new(),
            bug_analysis: None,
            browser_context: None,
            ticket_url: None,
            ticket_id: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// A partial set of fields to merge into an existing [`JobRecord`].
///
/// Every field is optional; `None` leaves the record untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bug_analysis: Option<BugAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_context: Option<BrowserContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn step(mut self, step: impl Into<String>) -> Self {
        self.current_step = Some(step.into());
        self
    }

    pub fn bug_analysis(mut self, analysis: BugAnalysis) -> Self {
        self.bug_analysis = Some(analysis);
        self
    }

    pub fn browser_context(mut self, context: BrowserContext) -> Self {
        self.browser_context = Some(context);
        self
    }

    pub fn ticket(mut self, id: impl Into<String>, url: impl Into<String>) -> Self {
        self.ticket_id = Some(id.into());
        self.ticket_url = Some(url.into());
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}
