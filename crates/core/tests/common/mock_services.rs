//! In-process stand-ins for the external collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use sb_core::hosting::{HostingError, ImageHost, ScreenshotUpload};
use sb_core::sandbox::{CommandOutput, SandboxError, SandboxHandle, SandboxProvider};
use sb_core::tracker::{IssueTracker, TicketDraft, TrackerError};
use sb_protocol::Issue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Sandbox provider that counts lifecycle calls.
#[derive(Default)]
pub struct CountingSandbox {
    pub created: AtomicUsize,
    pub terminated: AtomicUsize,
    pub commands: Mutex<Vec<String>>,
    /// Refuse every `create` with a provisioning error.
    pub refuse: bool,
    /// Fail every command, as if the sandbox had died.
    pub fail_commands: bool,
    /// Fail every `terminate`.
    pub fail_terminate: bool,
    /// Stdout returned for every command.
    pub stdout: String,
}

impl CountingSandbox {
    pub fn serving(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Self::default()
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn terminated(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl SandboxProvider for CountingSandbox {
    async fn create(&self) -> Result<SandboxHandle, SandboxError> {
        if self.refuse {
            return Err(SandboxError::Provisioning("quota exceeded".to_string()));
        }
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(SandboxHandle::new(format!("sb-{n}"), "http://envd.test"))
    }

    async fn run_command(
        &self,
        handle: &SandboxHandle,
        command: &str,
        _timeout: Duration,
    ) -> Result<CommandOutput, SandboxError> {
        self.commands.lock().unwrap().push(command.to_string());
        if self.fail_commands {
            return Err(SandboxError::Command {
                sandbox_id: handle.id.clone(),
                reason: "sandbox is gone".to_string(),
            });
        }
        Ok(CommandOutput {
            stdout: self.stdout.clone(),
            ..CommandOutput::default()
        })
    }

    async fn terminate(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        self.terminated.fetch_add(1, Ordering::SeqCst);
        if self.fail_terminate {
            return Err(SandboxError::Teardown {
                sandbox_id: handle.id.clone(),
                reason: "already stopped".to_string(),
            });
        }
        Ok(())
    }
}

/// Issue tracker that records every draft it receives.
///
/// The first `failures` calls are rejected; later calls succeed. A
/// `crashes` tracker panics after recording the draft.
#[derive(Default)]
pub struct RecordingTracker {
    pub drafts: Mutex<Vec<TicketDraft>>,
    pub failures: AtomicUsize,
    pub crashes: bool,
}

impl RecordingTracker {
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            ..Self::default()
        }
    }

    pub fn crashing() -> Self {
        Self {
            crashes: true,
            ..Self::default()
        }
    }

    pub fn drafts(&self) -> Vec<TicketDraft> {
        self.drafts.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueTracker for RecordingTracker {
    async fn create_issue(&self, draft: &TicketDraft) -> Result<Issue, TrackerError> {
        let number = {
            let mut drafts = self.drafts.lock().unwrap();
            drafts.push(draft.clone());
            drafts.len()
        };
        if self.crashes {
            panic!("tracker client crashed");
        }

        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(TrackerError::Api("Entity not found: Team".to_string()));
        }

        Ok(Issue {
            id: format!("issue-{number}"),
            identifier: format!("ENG-{}", 100 + number),
            title: draft.title.clone(),
            url: format!("https://linear.app/acme/issue/ENG-{}", 100 + number),
        })
    }
}

/// Image host that returns a fixed URL.
pub struct StaticHost(pub String);

#[async_trait]
impl ImageHost for StaticHost {
    async fn upload(&self, _image: &ScreenshotUpload) -> Result<String, HostingError> {
        Ok(self.0.clone())
    }
}

/// Image host that always rejects the upload.
pub struct FailingHost;

#[async_trait]
impl ImageHost for FailingHost {
    async fn upload(&self, _image: &ScreenshotUpload) -> Result<String, HostingError> {
        Err(HostingError::Rejected("invalid API key".to_string()))
    }
}
