//! Configuration loader for the `.shotbug/` directory.
//!
//! Two optional files are read:
//! - `config.toml`: model, sandbox, tracker and hosting settings
//! - `agent.md`: instruction frame override with YAML front matter
//!
//! Credentials always come from the environment.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::{AgentPrompt, AppConfig, Secrets};
use gray_matter::engine::YAML;
use gray_matter::Matter;
use std::path::Path;

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".shotbug";

/// Loads configuration from `.shotbug/`, `.env` and the process environment.
///
/// Missing files fall back to defaults; only malformed files are errors.
/// Call [`AppConfig::validate`] afterwards to check credentials.
///
/// # Example
///
/// ```rust,no_run
/// use sb_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// config.validate()?;
/// println!("Using model {}", config.effective_model());
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    load_env_file(root)?;
    load_config_with_env(root, |key| std::env::var(key).ok()).await
}

/// Loads `.env` into the process environment. Variables that are already set
/// take precedence; a missing file is not an error.
fn load_env_file(root: &Path) -> ConfigResult<()> {
    let path = root.join(".env");
    match dotenvy::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ConfigError::EnvFile { path, source }),
    }
}

/// Same as [`load_config`] with an explicit environment lookup.
pub async fn load_config_with_env<F>(root: &Path, env: F) -> ConfigResult<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let sb_dir = root.join(CONFIG_DIR);

    let mut config = if sb_dir.exists() {
        let mut config = load_file_config(&sb_dir)?;
        config.agent = load_agent_prompt(&sb_dir)?;
        config
    } else {
        AppConfig::default()
    };

    apply_env(&mut config, env);
    Ok(config)
}

/// Loads `config.toml`, or defaults when it does not exist.
fn load_file_config(sb_dir: &Path) -> ConfigResult<AppConfig> {
    let config_path = sb_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(AppConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path,
        source,
    })
}

/// Loads `agent.md`. Front matter is optional; the body is the instruction frame.
fn load_agent_prompt(sb_dir: &Path) -> ConfigResult<AgentPrompt> {
    let path = sb_dir.join("agent.md");

    if !path.exists() {
        return Ok(AgentPrompt::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::FileRead {
        path: path.clone(),
        source,
    })?;

    let matter = Matter::<YAML>::new();
    let parsed = matter.parse(&content);

    let mut prompt: AgentPrompt = match parsed.data {
        Some(data) => data.deserialize().map_err(|e| ConfigError::MarkdownParse {
            path: path.clone(),
            reason: format!("Failed to deserialize front matter: {e}"),
        })?,
        None => AgentPrompt::default(),
    };

    let body = parsed.content.trim();
    if !body.is_empty() {
        prompt.instruction = Some(body.to_string());
    }

    Ok(prompt)
}

fn apply_env<F>(config: &mut AppConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| env(key).filter(|value| !value.trim().is_empty());

    config.secrets = Secrets {
        gemini_api_key: read("GEMINI_API_KEY"),
        e2b_api_key: read("E2B_API_KEY"),
        linear_api_key: read("LINEAR_API_KEY"),
        imgbb_api_key: read("IMGBB_API_KEY"),
    };

    if let Some(team_id) = read("LINEAR_TEAM_ID") {
        config.tracker.team_id = Some(team_id);
    }
    if let Some(model) = read("SHOTBUG_MODEL") {
        config.model.name = model;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn test_load_config_full() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        let sb_dir = root.join(CONFIG_DIR);
        fs::create_dir_all(&sb_dir).expect("Failed to create .shotbug");

        let config_toml = r#"
[model]
max_turns = 7

[sandbox]
template = "browser"
timeout_secs = 300

[tracker]
team_id = "team-from-file"
"#;
        fs::write(sb_dir.join("config.toml"), config_toml).expect("Failed to write config.toml");

        let agent_md = r#"---
model: gemini-1.5-pro
---

You are a meticulous QA engineer."#;
        fs::write(sb_dir.join("agent.md"), agent_md).expect("Failed to write agent.md");

        let env = env_from(&[
            ("GEMINI_API_KEY", "g"),
            ("E2B_API_KEY", "e"),
            ("LINEAR_API_KEY", "l"),
        ]);
        let config = load_config_with_env(root, env)
            .await
            .expect("Failed to load config");

        assert_eq!(config.model.max_turns, 7);
        assert_eq!(config.model.name, "gemini-2.0-flash-exp");
        assert_eq!(config.sandbox.template, "browser");
        assert_eq!(config.sandbox.timeout_secs, 300);
        assert_eq!(config.sandbox.api_url, "https://api.e2b.dev");
        assert_eq!(config.tracker.team_id.as_deref(), Some("team-from-file"));
        assert_eq!(config.effective_model(), "gemini-1.5-pro");
        assert_eq!(
            config.agent.instruction.as_deref(),
            Some("You are a meticulous QA engineer.")
        );
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_config_empty_directory() {
        let dir = tempdir().expect("Failed to create temp dir");

        let config = load_config_with_env(dir.path(), env_from(&[]))
            .await
            .expect("Should handle missing .shotbug");

        assert_eq!(config.model.max_turns, 5);
        assert_eq!(config.sandbox.timeout_secs, 600);
        assert!(config.agent.instruction.is_none());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingEnv("GEMINI_API_KEY"))
        ));
    }

    #[tokio::test]
    async fn test_env_team_id_overrides_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let sb_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&sb_dir).expect("Failed to create .shotbug");
        fs::write(sb_dir.join("config.toml"), "[tracker]\nteam_id = \"file\"\n")
            .expect("Failed to write config.toml");

        let config = load_config_with_env(dir.path(), env_from(&[("LINEAR_TEAM_ID", "env")]))
            .await
            .expect("Failed to load config");

        assert_eq!(config.tracker.team_id.as_deref(), Some("env"));
    }

    #[tokio::test]
    async fn test_blank_env_values_are_ignored() {
        let dir = tempdir().expect("Failed to create temp dir");

        let config = load_config_with_env(dir.path(), env_from(&[("GEMINI_API_KEY", "  ")]))
            .await
            .expect("Failed to load config");

        assert!(config.secrets.gemini_api_key.is_none());
    }

    #[tokio::test]
    async fn test_load_config_invalid_toml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let sb_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&sb_dir).expect("Failed to create .shotbug");
        fs::write(sb_dir.join("config.toml"), "[model\nmax_turns = ")
            .expect("Failed to write config.toml");

        let result = load_config_with_env(dir.path(), env_from(&[])).await;

        if let Err(ConfigError::TomlParse { path, .. }) = result {
            assert!(path.ends_with("config.toml"));
        } else {
            panic!("Expected TomlParse error");
        }
    }

    #[tokio::test]
    async fn test_agent_md_without_front_matter() {
        let dir = tempdir().expect("Failed to create temp dir");
        let sb_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&sb_dir).expect("Failed to create .shotbug");
        fs::write(sb_dir.join("agent.md"), "Only a body.").expect("Failed to write agent.md");

        let config = load_config_with_env(dir.path(), env_from(&[]))
            .await
            .expect("Failed to load config");

        assert!(config.agent.model.is_none());
        assert_eq!(config.agent.instruction.as_deref(), Some("Only a body."));
    }

    #[test]
    fn test_missing_env_file_is_fine() {
        let dir = tempdir().expect("Failed to create temp dir");
        assert!(load_env_file(dir.path()).is_ok());
    }

    #[test]
    fn test_malformed_env_file_is_reported() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join(".env"), "THIS IS NOT A DOTENV LINE\n")
            .expect("Failed to write .env");

        let result = load_env_file(dir.path());

        match result {
            Err(ConfigError::EnvFile { path, .. }) => assert!(path.ends_with(".env")),
            other => panic!("Expected EnvFile error, got {other:?}"),
        }
    }
}
