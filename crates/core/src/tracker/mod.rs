//! Ticket tracker integration.

pub mod linear;

pub use linear::LinearClient;

use async_trait::async_trait;
use sb_protocol::Issue;
use thiserror::Error;

/// A ticket ready to be filed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub title: String,
    /// Markdown body.
    pub description: String,
    /// 0 = none, 1 = urgent, 2 = high, 3 = normal, 4 = low.
    pub priority: u8,
    pub labels: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Tracker request failed: {0}")]
    Request(String),

    #[error("Tracker API error: {0}")]
    Api(String),

    #[error("No teams found in tracker workspace")]
    NoTeam,

    #[error("Tracker rejected the issue")]
    Rejected,
}

#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn create_issue(&self, draft: &TicketDraft) -> Result<Issue, TrackerError>;
}
