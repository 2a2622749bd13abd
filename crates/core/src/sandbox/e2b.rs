//! E2B sandbox provider.
//!
//! Sandboxes are created and destroyed through the E2B REST API. Commands
//! run through the envd process service inside the sandbox, which speaks the
//! Connect streaming protocol (see [`crate::sandbox::envelope`]).

use crate::config::models::SandboxConfig;
use crate::sandbox::envelope;
use crate::sandbox::{CommandOutput, SandboxError, SandboxHandle, SandboxProvider};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ENVD_PORT: u16 = 49983;
const ENVD_USER: &str = "user";

pub struct E2bSandboxProvider {
    client: reqwest::Client,
    api_url: String,
    domain: String,
    api_key: String,
    template: String,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct CreateSandboxRequest<'a> {
    #[serde(rename = "templateID")]
    template_id: &'a str,
    timeout: u64,
}

#[derive(Debug, Deserialize)]
struct CreateSandboxResponse {
    #[serde(rename = "sandboxID")]
    sandbox_id: String,
    #[serde(rename = "envdAccessToken", default)]
    envd_access_token: Option<String>,
    #[serde(default)]
    domain: Option<String>,
}

impl E2bSandboxProvider {
    pub fn new(config: &SandboxConfig, api_key: impl Into<String>) -> Result<Self, SandboxError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| SandboxError::Provisioning(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            domain: config.domain.clone(),
            api_key: api_key.into(),
            template: config.template.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn envd_url(&self, sandbox_id: &str, domain: Option<&str>) -> String {
        format!(
            "https://{ENVD_PORT}-{sandbox_id}.{}",
            domain.unwrap_or(&self.domain)
        )
    }
}

#[async_trait]
impl SandboxProvider for E2bSandboxProvider {
    async fn create(&self) -> Result<SandboxHandle, SandboxError> {
        let response = self
            .client
            .post(format!("{}/sandboxes", self.api_url))
            .header("X-API-KEY", &self.api_key)
            .json(&CreateSandboxRequest {
                template_id: &self.template,
                timeout: self.timeout_secs,
            })
            .send()
            .await
            .map_err(|e| SandboxError::Provisioning(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SandboxError::Provisioning(format!(
                "E2B API returned HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let created: CreateSandboxResponse = response
            .json()
            .await
            .map_err(|e| SandboxError::Provisioning(format!("invalid create response: {e}")))?;

        let envd_url = self.envd_url(&created.sandbox_id, created.domain.as_deref());
        tracing::info!(sandbox_id = %created.sandbox_id, template = %self.template, "Sandbox created");

        Ok(SandboxHandle {
            id: created.sandbox_id,
            envd_url,
            access_token: created.envd_access_token,
        })
    }

    async fn run_command(
        &self,
        handle: &SandboxHandle,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput, SandboxError> {
        let command_error = |reason: String| SandboxError::Command {
            sandbox_id: handle.id.clone(),
            reason,
        };

        let request = serde_json::json!({
            "process": {
                "cmd": "/bin/bash",
                "args": ["-l", "-c", command],
                "envs": {},
            }
        });
        let payload = serde_json::to_vec(&request).map_err(|e| command_error(e.to_string()))?;

        let mut builder = self
            .client
            .post(format!("{}/process.Process/Start", handle.envd_url))
            .header(reqwest::header::CONTENT_TYPE, "application/connect+json")
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Basic {}", STANDARD.encode(format!("{ENVD_USER}:"))),
            )
            .header("Connect-Timeout-Ms", timeout.as_millis().to_string())
            .timeout(timeout + Duration::from_secs(5))
            .body(envelope::encode(&payload));
        if let Some(token) = &handle.access_token {
            builder = builder.header("X-Access-Token", token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| command_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(command_error(format!("envd returned HTTP {}", status.as_u16())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| command_error(e.to_string()))?;

        let frames = envelope::decode_all(&body)?;
        let output = envelope::collect_output(&frames)?;
        tracing::debug!(sandbox_id = %handle.id, exit_code = output.exit_code, "Sandbox command finished");
        Ok(output)
    }

    async fn terminate(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        let response = self
            .client
            .delete(format!("{}/sandboxes/{}", self.api_url, handle.id))
            .header("X-API-KEY", &self.api_key)
            .send()
            .await
            .map_err(|e| SandboxError::Teardown {
                sandbox_id: handle.id.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        // Already expired on the provider side.
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }

        Err(SandboxError::Teardown {
            sandbox_id: handle.id.clone(),
            reason: format!("E2B API returned HTTP {}", status.as_u16()),
        })
    }
}
