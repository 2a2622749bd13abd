//! Model factory for creating model instances from configuration.

use crate::agents::adapters::GeminiAdapter;
use crate::agents::base::{AgentError, VisionModel};
use crate::config::models::ModelConfig;
use std::sync::Arc;

/// Creates the [`VisionModel`] selected by the configured model name.
///
/// Only Gemini models are supported; any other name is rejected.
pub struct ModelFactory;

impl ModelFactory {
    pub fn create(config: &ModelConfig, api_key: &str) -> Result<Arc<dyn VisionModel>, AgentError> {
        if !config.name.starts_with("gemini") {
            return Err(AgentError::NotAvailable(format!(
                "Unsupported model '{}': expected a gemini-* model",
                config.name
            )));
        }

        let adapter = GeminiAdapter::new(
            config.base_url.clone(),
            config.name.clone(),
            api_key.to_string(),
        )?;
        Ok(Arc::new(adapter))
    }
}
