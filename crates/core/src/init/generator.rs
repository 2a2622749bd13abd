//! File generation for `.shotbug` initialization.

use super::error::{InitError, InitResult};
use super::templates::{get_template, list_templates};
use crate::config::loader::CONFIG_DIR;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for initializing a .shotbug directory.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Directory in which `.shotbug/` is created.
    pub target_dir: PathBuf,

    /// Overwrite existing files if the directory already exists.
    pub force: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            force: false,
        }
    }
}

/// Generate the `.shotbug/` directory with every embedded template.
///
/// ```text
/// .shotbug/
/// ├── config.toml
/// └── agent.md
/// ```
///
/// Returns the paths of the written files.
///
/// # Errors
///
/// Returns an `InitError` if:
/// - The .shotbug directory already exists (without force flag)
/// - A template file cannot be found
/// - File system operations fail
pub async fn generate_shotbug_structure(options: InitOptions) -> InitResult<Vec<PathBuf>> {
    let sb_dir = options.target_dir.join(CONFIG_DIR);

    if sb_dir.exists() && !options.force {
        return Err(InitError::DirectoryExists(sb_dir));
    }

    fs::create_dir_all(&sb_dir).map_err(|source| InitError::DirectoryCreate {
        path: sb_dir.clone(),
        source,
    })?;

    let templates = list_templates("");
    if templates.is_empty() {
        return Err(InitError::TemplateNotFound("config.toml".to_string()));
    }

    let mut written = Vec::with_capacity(templates.len());
    for template_path in templates {
        written.push(write_template_file(&sb_dir, &template_path)?);
    }

    tracing::info!(dir = %sb_dir.display(), files = written.len(), "Initialized shotbug directory");
    Ok(written)
}

fn write_template_file(sb_dir: &Path, template_path: &str) -> InitResult<PathBuf> {
    let content = get_template(template_path)
        .ok_or_else(|| InitError::TemplateNotFound(template_path.to_string()))?;

    let target_path = sb_dir.join(template_path);

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|source| InitError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&target_path, content).map_err(|source| InitError::FileWrite {
        path: target_path.clone(),
        source,
    })?;

    Ok(target_path)
}
