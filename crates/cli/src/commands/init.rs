use crate::render;
use clap::Args;
use color_eyre::eyre::Result;
use colored::Colorize;
use sb_core::init::{generate_shotbug_structure, InitOptions};
use std::path::Path;

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing `.shotbug/` directory
    #[arg(short, long)]
    pub force: bool,
}

pub async fn run(dir: &Path, args: InitArgs) -> Result<()> {
    let written = generate_shotbug_structure(InitOptions {
        target_dir: dir.to_path_buf(),
        force: args.force,
    })
    .await?;

    for path in &written {
        println!("  {} {}", "created".green(), path.display());
    }
    println!();
    println!("{}", "shotbug initialized.".bold());
    println!(
        "Set {} in the environment or in {}.",
        render::REQUIRED_ENV.join(", "),
        dir.join(".env").display()
    );
    Ok(())
}
