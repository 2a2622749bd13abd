//! Ephemeral sandbox lifecycle.
//!
//! One sandbox is acquired per job and torn down exactly once, whatever way
//! the job ends. The provider does the remote work; [`SandboxManager`] and
//! [`SandboxLease`] own the exactly-once guarantee.

pub mod e2b;
pub mod envelope;
pub mod lease;

pub use e2b::E2bSandboxProvider;
pub use lease::{SandboxLease, SandboxManager, SandboxSession};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// A live sandbox as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxHandle {
    pub id: String,
    /// Base URL of the in-sandbox daemon that runs commands.
    pub envd_url: String,
    pub access_token: Option<String>,
}

impl SandboxHandle {
    pub fn new(id: impl Into<String>, envd_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            envd_url: envd_url.into(),
            access_token: None,
        }
    }
}

/// Collected output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SandboxError {
    #[error("Failed to create sandbox: {0}")]
    Provisioning(String),

    #[error("Command failed in sandbox {sandbox_id}: {reason}")]
    Command { sandbox_id: String, reason: String },

    #[error("Failed to terminate sandbox {sandbox_id}: {reason}")]
    Teardown { sandbox_id: String, reason: String },

    #[error("Malformed process stream: {0}")]
    Protocol(String),
}

/// Acquisition failures surface to the job as this error.
pub type ProvisioningError = SandboxError;

/// Backing service that creates, drives and destroys sandboxes.
#[async_trait]
pub trait SandboxProvider: Send + Sync {
    async fn create(&self) -> Result<SandboxHandle, SandboxError>;

    async fn run_command(
        &self,
        handle: &SandboxHandle,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput, SandboxError>;

    async fn terminate(&self, handle: &SandboxHandle) -> Result<(), SandboxError>;
}
