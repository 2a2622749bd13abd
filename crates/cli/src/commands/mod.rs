//! Subcommand implementations.

pub mod check;
pub mod init;
pub mod submit;

use color_eyre::eyre::Result;
use sb_core::agents::ModelFactory;
use sb_core::config::models::ModelConfig;
use sb_core::config::{AppConfig, ConfigError};
use sb_core::engine::AgentEngine;
use sb_core::hosting::{ImageHost, ImgbbHost};
use sb_core::sandbox::{E2bSandboxProvider, SandboxManager};
use sb_core::state::{InMemoryJobStore, JobManager, JobStore};
use sb_core::tools::ToolRegistry;
use sb_core::tracker::LinearClient;
use std::sync::Arc;

fn secret<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, ConfigError> {
    value.ok_or(ConfigError::MissingEnv(name))
}

/// Wire the real collaborators described by `config` into a `JobManager`.
pub fn build_manager(config: &AppConfig) -> Result<JobManager> {
    config.validate()?;
    let secrets = &config.secrets;

    let model_config = ModelConfig {
        name: config.effective_model().to_string(),
        ..config.model.clone()
    };
    let model = ModelFactory::create(
        &model_config,
        secret(secrets.gemini_api_key.as_deref(), "GEMINI_API_KEY")?,
    )?;

    let tracker = LinearClient::new(
        &config.tracker,
        secret(secrets.linear_api_key.as_deref(), "LINEAR_API_KEY")?,
    )?;
    let provider = E2bSandboxProvider::new(
        &config.sandbox,
        secret(secrets.e2b_api_key.as_deref(), "E2B_API_KEY")?,
    )?;

    let hosting: Option<Arc<dyn ImageHost>> = match secrets.imgbb_api_key.as_deref() {
        Some(key) if config.hosting.enabled => {
            Some(Arc::new(ImgbbHost::new(config.hosting.api_url.clone(), key)?))
        }
        _ => None,
    };

    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    let mut engine = AgentEngine::new(model, ToolRegistry::new(Arc::new(tracker)), Arc::clone(&store))
        .with_max_turns(config.effective_max_turns());
    if let Some(instruction) = &config.agent.instruction {
        engine = engine.with_instruction(instruction.clone());
    }

    Ok(JobManager::new(
        store,
        SandboxManager::new(Arc::new(provider)),
        Arc::new(engine),
        hosting,
    ))
}
