//! Test fixtures: screenshots, scripted tool calls and a fully wired harness.

#![allow(dead_code)]

use super::mock_services::{CountingSandbox, RecordingTracker};
use sb_core::agents::{MockModel, ModelTurn};
use sb_core::engine::AgentEngine;
use sb_core::hosting::{ImageHost, ScreenshotUpload};
use sb_core::sandbox::SandboxManager;
use sb_core::state::{InMemoryJobStore, JobManager, JobStore};
use sb_core::tools::ToolRegistry;
use sb_protocol::{Event, JobRecord, ToolCall};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Smallest valid PNG header; the mocks never decode it.
pub fn sample_screenshot() -> ScreenshotUpload {
    ScreenshotUpload::new(
        vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
        "image/png",
    )
}

pub fn ticket_call(title: &str, severity: &str, priority: u8) -> ToolCall {
    ToolCall::new(
        "create_linear_ticket",
        json!({
            "title": title,
            "description": format!("## Summary\n{title}\n\n## Steps to reproduce\n1. Open the page"),
            "priority": priority,
            "severity": severity,
            "errorMessages": ["Uncaught TypeError: handler is not a function"],
            "urls": ["https://acme.test/login"],
            "suggestedLabels": ["frontend"],
            "uiState": "Login form with filled credentials"
        }),
    )
}

pub fn explore_call(url: &str) -> ToolCall {
    ToolCall::new("explore_url", json!({ "url": url }))
}

pub fn ticket_turn(title: &str, severity: &str, priority: u8) -> ModelTurn {
    ModelTurn::calls(vec![ticket_call(title, severity, priority)])
}

/// Stdout of a successful in-sandbox fetch.
pub fn page_fetch(title: &str, status: u16) -> String {
    format!("<html><head><title>{title}</title></head></html>\n__SHOTBUG_HTTP_STATUS__:{status}")
}

/// Every collaborator of a [`JobManager`], with handles kept for inspection.
pub struct Harness {
    pub manager: JobManager,
    pub store: Arc<InMemoryJobStore>,
    pub model: MockModel,
    pub sandbox: Arc<CountingSandbox>,
    pub tracker: Arc<RecordingTracker>,
    pub events: mpsc::Receiver<Event>,
}

pub struct HarnessBuilder {
    model: MockModel,
    sandbox: CountingSandbox,
    tracker: RecordingTracker,
    host: Option<Arc<dyn ImageHost>>,
    max_turns: u32,
}

impl HarnessBuilder {
    pub fn new(model: MockModel) -> Self {
        Self {
            model,
            sandbox: CountingSandbox::serving(page_fetch("Acme Login", 200)),
            tracker: RecordingTracker::default(),
            host: None,
            max_turns: 5,
        }
    }

    pub fn sandbox(mut self, sandbox: CountingSandbox) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn tracker(mut self, tracker: RecordingTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn host(mut self, host: Arc<dyn ImageHost>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn build(self) -> Harness {
        let (events_tx, events) = mpsc::channel(1024);
        let store = Arc::new(InMemoryJobStore::with_events(events_tx));
        let sandbox = Arc::new(self.sandbox);
        let tracker = Arc::new(self.tracker);

        let engine = AgentEngine::new(
            Arc::new(self.model.clone()),
            ToolRegistry::new(tracker.clone()),
            store.clone(),
        )
        .with_max_turns(self.max_turns);

        let manager = JobManager::new(
            store.clone(),
            SandboxManager::new(sandbox.clone()),
            Arc::new(engine),
            self.host,
        );

        Harness {
            manager,
            store,
            model: self.model,
            sandbox,
            tracker,
            events,
        }
    }
}

impl Harness {
    /// Create a record and run the job to completion on the current task.
    pub async fn run_job(&self) -> JobRecord {
        let job_id = Uuid::new_v4();
        self.store.create(job_id).await;
        self.manager
            .process(job_id, sample_screenshot())
            .await
            .expect("job record should exist")
    }

    /// Every event published so far.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Poll the manager until the job is terminal or the timeout elapses.
pub async fn wait_for_terminal(manager: &JobManager, job_id: Uuid, timeout: Duration) -> JobRecord {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let job = manager.get_job(job_id).await.expect("job should exist");
        if job.is_terminal() {
            return job;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {job_id} still {:?} after {timeout:?}",
            job.status
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
