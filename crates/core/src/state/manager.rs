//! Job orchestration.
//!
//! The JobManager is the entry point for screenshot submissions. It owns the
//! sequence that turns an upload into a finished job record: sandbox
//! acquisition, screenshot hosting, the agent loop and the final
//! reconciliation of the loop's outcome into the record.

use crate::engine::{AgentEngine, LoopOutcome};
use crate::hosting::{host_or_embed, ImageHost, ScreenshotUpload};
use crate::sandbox::SandboxManager;
use crate::state::store::JobStore;
use crate::tools::AgentContext;
use sb_protocol::{JobRecord, JobStatus, JobUpdate};
use std::sync::Arc;
use uuid::Uuid;

/// Coordinates every job from submission to a terminal record.
///
/// Cloning is cheap; clones share the same store, sandbox manager and engine.
#[derive(Clone)]
pub struct JobManager {
    /// Source of truth polled by clients.
    store: Arc<dyn JobStore>,

    /// Acquires and releases one sandbox per job.
    sandboxes: SandboxManager,

    /// The agent loop.
    engine: Arc<AgentEngine>,

    /// Public image host. `None` embeds screenshots as data URLs.
    hosting: Option<Arc<dyn ImageHost>>,
}

impl JobManager {
    /// Create a new JobManager.
    ///
    /// # Arguments
    ///
    /// * `store` - The job record store, shared with the engine
    /// * `sandboxes` - Sandbox lifecycle manager
    /// * `engine` - The agent loop run for each job
    /// * `hosting` - Optional image host for screenshot URLs
    pub fn new(
        store: Arc<dyn JobStore>,
        sandboxes: SandboxManager,
        engine: Arc<AgentEngine>,
        hosting: Option<Arc<dyn ImageHost>>,
    ) -> Self {
        Self {
            store,
            sandboxes,
            engine,
            hosting,
        }
    }

    /// Accept a screenshot and process it in the background.
    ///
    /// The record exists in `pending` state when this returns, so the id can
    /// be polled immediately. A panic inside the job still ends it as `failed`.
    pub async fn submit(&self, image: ScreenshotUpload) -> Uuid {
        let job_id = Uuid::new_v4();
        self.store.create(job_id).await;
        tracing::info!(job_id = %job_id, mime_type = %image.mime_type, bytes = image.bytes.len(), "Job accepted");

        let manager = self.clone();
        tokio::spawn(async move {
            let worker = manager.clone();
            let run = tokio::spawn(async move { worker.process(job_id, image).await });
            if let Err(e) = run.await {
                let message = if e.is_panic() {
                    format!("Agent panicked: {}", panic_message(e.into_panic()))
                } else {
                    "Job task was cancelled".to_string()
                };
                manager.fail(job_id, message).await;
            }
        });

        job_id
    }

    /// Run one job to completion and return its final record.
    ///
    /// The sandbox is released exactly once, whatever the loop's outcome.
    /// Failures end up in the record's `error` field; nothing is returned as
    /// an error.
    pub async fn process(&self, job_id: Uuid, image: ScreenshotUpload) -> Option<JobRecord> {
        self.store
            .update(
                job_id,
                JobUpdate::new()
                    .status(JobStatus::Analyzing)
                    .progress(10)
                    .step("Initializing Agent & Sandbox..."),
            )
            .await;
        self.store
            .append_log(job_id, "Initializing agent and sandbox...".to_string())
            .await;

        let result = self
            .sandboxes
            .scoped(|session| async move {
                self.store
                    .update(job_id, JobUpdate::new().progress(20).step("Uploading screenshot..."))
                    .await;
                self.store
                    .append_log(job_id, "Uploading screenshot...".to_string())
                    .await;

                let screenshot_url = host_or_embed(self.hosting.as_deref(), &image).await;
                let ctx = AgentContext::new(session, Some(screenshot_url));
                self.engine.run(job_id, &image, &ctx).await
            })
            .await;

        let failure = match result {
            Err(e) => Some(e.to_string()),
            Ok(Err(e)) => Some(e.to_string()),
            Ok(Ok(LoopOutcome::TicketFiled(_))) => None,
            Ok(Ok(outcome)) => outcome.failure_message(),
        };

        if let Some(message) = failure {
            self.fail(job_id, message).await;
        }

        self.store.get(job_id).await
    }

    async fn fail(&self, job_id: Uuid, message: String) {
        let Some(current) = self.store.get(job_id).await else {
            tracing::warn!(job_id = %job_id, error = %message, "Job vanished before failure could be recorded");
            return;
        };
        if current.is_terminal() {
            tracing::debug!(job_id = %job_id, status = %current.status.as_str(), "Job already terminal, keeping outcome");
            return;
        }

        tracing::error!(job_id = %job_id, error = %message, "Job failed");
        self.store
            .append_log(job_id, format!("Job failed: {message}"))
            .await;
        self.store
            .update(
                job_id,
                JobUpdate::new()
                    .status(JobStatus::Failed)
                    .step("Agent failed")
                    .error(message),
            )
            .await;
    }

    /// Get the current record of a job, or `None` for unknown ids.
    pub async fn get_job(&self, job_id: Uuid) -> Option<JobRecord> {
        self.store.get(job_id).await
    }

    /// Remove a job record. A running loop keeps going but its writes become no-ops.
    pub async fn delete_job(&self, job_id: Uuid) -> bool {
        self.store.delete(job_id).await
    }

    /// All job records, oldest first.
    pub async fn list_jobs(&self) -> Vec<JobRecord> {
        self.store.list().await
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => (*message).to_string(),
            Err(_) => "unknown panic".to_string(),
        },
    }
}
