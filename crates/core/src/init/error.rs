//! Errors raised by `shotbug init`.

use std::path::PathBuf;
use thiserror::Error;

pub type InitResult<T> = Result<T, InitError>;

#[derive(Debug, Error)]
pub enum InitError {
    /// A `.shotbug` directory is already present and `--force` was not given.
    #[error("shotbug is already initialized at {0:?}. Use --force to overwrite.")]
    DirectoryExists(PathBuf),

    /// The binary was built without one of the starter files.
    #[error("Starter template missing from this build: {0}")]
    TemplateNotFound(String),

    /// The `.shotbug` directory or one of its parents could not be created.
    #[error("Could not create {path:?}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A starter file could not be written.
    #[error("Could not write starter file {path:?}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}
