//! shotbug - screenshot to bug ticket CLI

mod commands;
mod render;

use clap::{Parser, Subcommand};
use commands::{check, init, submit};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "shotbug",
    version,
    about = "Turn a screenshot into a filed bug ticket"
)]
struct Cli {
    /// Project root containing `.shotbug/` and `.env`
    #[arg(short = 'C', long = "dir", global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create `.shotbug/` with default configuration and prompt
    Init(init::InitArgs),
    /// Validate configuration and show enabled services
    Check,
    /// Analyze a screenshot and file a bug ticket
    Submit(submit::SubmitArgs),
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => init::run(&cli.dir, args).await,
        Commands::Check => check::run(&cli.dir).await,
        Commands::Submit(args) => submit::run(&cli.dir, args).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shotbug=info,sb_core=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
