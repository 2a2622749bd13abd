use crate::render;
use color_eyre::eyre::Result;
use colored::Colorize;
use sb_core::config::load_config;
use std::path::Path;

/// Print the resolved configuration and fail when it cannot run a job.
pub async fn run(dir: &Path) -> Result<()> {
    let config = load_config(dir).await?;
    let secrets = &config.secrets;

    println!("{}", "Services".bold());
    println!(
        "  {} model      {} (max {} turns)",
        render::mark(secrets.gemini_api_key.is_some()),
        config.effective_model(),
        config.effective_max_turns()
    );
    println!(
        "  {} sandbox    {} template '{}'",
        render::mark(secrets.e2b_api_key.is_some()),
        config.sandbox.api_url,
        config.sandbox.template
    );
    println!(
        "  {} tracker    {} team {}",
        render::mark(secrets.linear_api_key.is_some()),
        config.tracker.api_url,
        config.tracker.team_id.as_deref().unwrap_or("(first team)")
    );
    println!(
        "  {} hosting    {}",
        render::mark(config.hosting_enabled()),
        if config.hosting_enabled() {
            config.hosting.api_url.as_str()
        } else {
            "disabled, screenshots are embedded as data URLs"
        }
    );
    println!(
        "  {} prompt     {}",
        render::mark(true),
        if config.agent.instruction.is_some() {
            ".shotbug/agent.md"
        } else {
            "built-in"
        }
    );

    config.validate()?;
    println!();
    println!("{}", "Configuration OK".green().bold());
    Ok(())
}
