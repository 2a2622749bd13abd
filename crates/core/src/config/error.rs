//! Errors raised while loading or validating the shotbug configuration.
//!
//! Loading covers `.shotbug/config.toml`, the `agent.md` instruction file and
//! the optional `.env` file. Validation covers the credentials and limits a
//! submission needs before any external service is contacted.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// `config.toml` or `agent.md` exists but could not be read.
    #[error("Could not read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `config.toml` is not valid TOML or has fields of the wrong type.
    #[error("Invalid shotbug settings in {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The front matter of `agent.md` could not be deserialized.
    #[error("Invalid agent front matter in {path}: {reason}")]
    MarkdownParse { path: PathBuf, reason: String },

    /// `.env` exists but is not a valid dotenv file.
    #[error("Could not load secrets from {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },

    /// A setting is present but unusable, such as a zero turn limit.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An API key for the model, sandbox or tracker is not set.
    #[error("Missing required environment variable: {0}")]
    MissingEnv(&'static str),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
