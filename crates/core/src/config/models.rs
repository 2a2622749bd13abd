//! Configuration models that aggregate all settings.
//!
//! `AppConfig` combines the optional `.shotbug/config.toml` file, the optional
//! `.shotbug/agent.md` instruction override and the API credentials read from
//! the environment into a single configuration object.

use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Unified application configuration.
///
/// # Example
///
/// ```toml
/// # .shotbug/config.toml
/// [model]
/// name = "gemini-2.0-flash-exp"
/// max_turns = 5
///
/// [sandbox]
/// timeout_secs = 600
///
/// [tracker]
/// team_id = "TEAM_UUID"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub sandbox: SandboxConfig,
    pub tracker: TrackerConfig,
    pub hosting: HostingConfig,

    /// Instruction frame override from `.shotbug/agent.md`.
    #[serde(skip)]
    pub agent: AgentPrompt,

    /// Credentials from the environment. Never read from or written to disk.
    #[serde(skip)]
    pub secrets: Secrets,
}

/// Reasoning model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub base_url: String,
    /// Upper bound on model calls per job.
    pub max_turns: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gemini-2.0-flash-exp".to_string(),
            base_url: crate::agents::adapters::DEFAULT_GEMINI_BASE_URL.to_string(),
            max_turns: 5,
        }
    }
}

/// Ephemeral sandbox settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub api_url: String,
    /// Domain hosting the per-sandbox envd endpoints.
    pub domain: String,
    pub template: String,
    /// Provider-side lifetime ceiling of each sandbox.
    pub timeout_secs: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.e2b.dev".to_string(),
            domain: "e2b.app".to_string(),
            template: "base".to_string(),
            timeout_secs: 600,
        }
    }
}

/// Ticket tracker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub api_url: String,
    /// Destination team. The first team of the workspace is used when unset.
    pub team_id: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.linear.app/graphql".to_string(),
            team_id: None,
        }
    }
}

/// Screenshot hosting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostingConfig {
    pub enabled: bool,
    pub api_url: String,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://api.imgbb.com/1/upload".to_string(),
        }
    }
}

/// Front matter of `.shotbug/agent.md`.
///
/// The markdown body replaces the built-in instruction frame; front matter
/// values override `[model]` settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentPrompt {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_turns: Option<u32>,
    #[serde(skip)]
    pub instruction: Option<String>,
}

/// API credentials.
#[derive(Clone, Default)]
pub struct Secrets {
    pub gemini_api_key: Option<String>,
    pub e2b_api_key: Option<String>,
    pub linear_api_key: Option<String>,
    pub imgbb_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn mask(value: &Option<String>) -> &'static str {
            if value.is_some() {
                "[REDACTED]"
            } else {
                "<unset>"
            }
        }
        f.debug_struct("Secrets")
            .field("gemini_api_key", &mask(&self.gemini_api_key))
            .field("e2b_api_key", &mask(&self.e2b_api_key))
            .field("linear_api_key", &mask(&self.linear_api_key))
            .field("imgbb_api_key", &mask(&self.imgbb_api_key))
            .finish()
    }
}

impl AppConfig {
    /// Check that every required credential is present and settings are sane.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.secrets.gemini_api_key.is_none() {
            return Err(ConfigError::MissingEnv("GEMINI_API_KEY"));
        }
        if self.secrets.e2b_api_key.is_none() {
            return Err(ConfigError::MissingEnv("E2B_API_KEY"));
        }
        if self.secrets.linear_api_key.is_none() {
            return Err(ConfigError::MissingEnv("LINEAR_API_KEY"));
        }
        if self.model.max_turns == 0 {
            return Err(ConfigError::InvalidConfig(
                "model.max_turns must be at least 1".to_string(),
            ));
        }
        if self.sandbox.timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "sandbox.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether screenshots are uploaded to a host instead of embedded.
    pub fn hosting_enabled(&self) -> bool {
        self.hosting.enabled && self.secrets.imgbb_api_key.is_some()
    }

    /// Model name after applying the `agent.md` override.
    pub fn effective_model(&self) -> &str {
        self.agent.model.as_deref().unwrap_or(&self.model.name)
    }

    /// Turn bound after applying the `agent.md` override.
    pub fn effective_max_turns(&self) -> u32 {
        self.agent.max_turns.unwrap_or(self.model.max_turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_secrets() -> AppConfig {
        AppConfig {
            secrets: Secrets {
                gemini_api_key: Some("g".to_string()),
                e2b_api_key: Some("e".to_string()),
                linear_api_key: Some("l".to_string()),
                imgbb_api_key: None,
            },
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_validate_requires_credentials() {
        let config = AppConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingEnv("GEMINI_API_KEY"))
        ));

        let mut config = with_secrets();
        config.secrets.linear_api_key = None;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingEnv("LINEAR_API_KEY"))
        ));

        assert!(with_secrets().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_turns() {
        let mut config = with_secrets();
        config.model.max_turns = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
        assert_eq!(err.to_string(), "Invalid configuration: model.max_turns must be at least 1");
    }

    #[test]
    fn test_hosting_requires_key() {
        let mut config = with_secrets();
        assert!(!config.hosting_enabled());
        config.secrets.imgbb_api_key = Some("i".to_string());
        assert!(config.hosting_enabled());
        config.hosting.enabled = false;
        assert!(!config.hosting_enabled());
    }

    #[test]
    fn test_agent_prompt_overrides() {
        let mut config = with_secrets();
        assert_eq!(config.effective_max_turns(), 5);
        config.agent.max_turns = Some(8);
        config.agent.model = Some("gemini-1.5-pro".to_string());
        assert_eq!(config.effective_max_turns(), 8);
        assert_eq!(config.effective_model(), "gemini-1.5-pro");
    }

    #[test]
    fn test_secrets_debug_is_redacted() {
        let printed = format!("{:?}", with_secrets().secrets);
        assert!(printed.contains("[REDACTED]"));
        assert!(printed.contains("<unset>"));
        assert!(!printed.contains("\"g\""));
    }
}
