//! Job event protocol.
//!
//! Clients normally poll the job record, but a subscriber may instead attach
//! to the job store and receive every state change as an `Event`.
//!
//! Uses tagged enum serialization for TypeScript compatibility:
//! ```json
//! {
//!   "type": "jobStatusUpdate",
//!   "payload": {
//!     "job_id": "uuid-here",
//!     "status": "analyzing",
//!     "progress": 10
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::job_models::JobStatus;

/// Events sent from the job store to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A new job record has been created.
    JobCreated {
        #[ts(type = "string")]
        job_id: Uuid,
    },

    /// A job's status or progress has changed.
    JobStatusUpdate {
        #[ts(type = "string")]
        job_id: Uuid,
        status: JobStatus,
        progress: u8,
    },

    /// A job appended a line to its log.
    JobLogLine {
        #[ts(type = "string")]
        job_id: Uuid,
        content: String,
    },

    /// A ticket was filed for the job.
    JobCompleted {
        #[ts(type = "string")]
        job_id: Uuid,
        ticket_id: String,
        ticket_url: String,
    },

    /// The job failed.
    JobFailed {
        #[ts(type = "string")]
        job_id: Uuid,
        error: String,
    },
}

impl Event {
    pub fn job_id(&self) -> Uuid {
        match self {
            Event::JobCreated { job_id }
            | Event::JobStatusUpdate { job_id, .. }
            | Event::JobLogLine { job_id, .. }
            | Event::JobCompleted { job_id, .. }
            | Event::JobFailed { job_id, .. } => *job_id,
        }
    }

    /// Whether this is the last event a job will produce.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::JobCompleted { .. } | Event::JobFailed { .. })
    }
}
