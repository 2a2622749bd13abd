//! Configuration loading and management.
//!
//! This module provides functionality to load settings from the `.shotbug/`
//! directory and API credentials from the environment.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_with_env};
pub use models::AppConfig;
