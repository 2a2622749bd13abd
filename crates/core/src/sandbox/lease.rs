//! Scoped sandbox acquisition.
//!
//! [`SandboxManager::acquire`] hands out a [`SandboxLease`] that owns the
//! teardown of exactly one sandbox. Releasing consumes the lease; a lease
//! that is dropped without being released (panic, cancelled task) schedules
//! the teardown on the current runtime instead.

use crate::sandbox::{
    CommandOutput, ProvisioningError, SandboxError, SandboxHandle, SandboxProvider,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Acquires and releases sandboxes from a provider.
#[derive(Clone)]
pub struct SandboxManager {
    provider: Arc<dyn SandboxProvider>,
}

impl SandboxManager {
    pub fn new(provider: Arc<dyn SandboxProvider>) -> Self {
        Self { provider }
    }

    pub async fn acquire(&self) -> Result<SandboxLease, ProvisioningError> {
        let handle = self.provider.create().await.map_err(|e| match e {
            SandboxError::Provisioning(_) => e,
            other => SandboxError::Provisioning(other.to_string()),
        })?;

        Ok(SandboxLease {
            handle,
            provider: Arc::clone(&self.provider),
            armed: true,
        })
    }

    /// Terminate the leased sandbox. Failures are logged, never returned.
    pub async fn release(&self, lease: SandboxLease) {
        lease.release().await;
    }

    /// Acquire a sandbox, run `f` against it, and release it on every exit path.
    ///
    /// Only acquisition can fail; whatever `f` returns is passed through.
    pub async fn scoped<F, Fut, T>(&self, f: F) -> Result<T, ProvisioningError>
    where
        F: FnOnce(SandboxSession) -> Fut,
        Fut: Future<Output = T>,
    {
        let lease = self.acquire().await?;
        let output = f(lease.session()).await;
        lease.release().await;
        Ok(output)
    }
}

/// Exclusive ownership of one live sandbox.
pub struct SandboxLease {
    handle: SandboxHandle,
    provider: Arc<dyn SandboxProvider>,
    /// Cleared once teardown has been handed off.
    armed: bool,
}

impl SandboxLease {
    pub fn id(&self) -> &str {
        &self.handle.id
    }

    /// A non-owning view for tools; it can run commands but not terminate.
    pub fn session(&self) -> SandboxSession {
        SandboxSession::new(self.handle.clone(), Arc::clone(&self.provider))
    }

    pub async fn release(mut self) {
        self.armed = false;
        terminate_logged(self.provider.as_ref(), &self.handle).await;
    }
}

impl Drop for SandboxLease {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;
        let handle = self.handle.clone();

        tracing::warn!(sandbox_id = %handle.id, "Sandbox lease dropped without release");
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let provider = Arc::clone(&self.provider);
                runtime.spawn(async move {
                    terminate_logged(provider.as_ref(), &handle).await;
                });
            }
            Err(_) => {
                tracing::error!(
                    sandbox_id = %handle.id,
                    "No runtime available; sandbox will expire on its provider-side timeout"
                );
            }
        }
    }
}

async fn terminate_logged(provider: &dyn SandboxProvider, handle: &SandboxHandle) {
    match provider.terminate(handle).await {
        Ok(()) => tracing::info!(sandbox_id = %handle.id, "Sandbox closed"),
        Err(e) => tracing::warn!(sandbox_id = %handle.id, error = %e, "Failed to close sandbox"),
    }
}

/// Borrowed access to a leased sandbox, carried by the agent context.
#[derive(Clone)]
pub struct SandboxSession {
    handle: SandboxHandle,
    provider: Arc<dyn SandboxProvider>,
}

impl SandboxSession {
    pub fn new(handle: SandboxHandle, provider: Arc<dyn SandboxProvider>) -> Self {
        Self { handle, provider }
    }

    pub fn id(&self) -> &str {
        &self.handle.id
    }

    pub async fn run(&self, command: &str, timeout: Duration) -> Result<CommandOutput, SandboxError> {
        self.provider.run_command(&self.handle, command, timeout).await
    }
}

impl std::fmt::Debug for SandboxSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxSession")
            .field("sandbox_id", &self.handle.id)
            .finish_non_exhaustive()
    }
}
