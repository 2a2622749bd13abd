//! Exports TypeScript bindings for the sb-protocol types.
//!
//! Front-end polling clients consume the generated `.ts` files so their view
//! of a job record stays in sync with the server.

use anyhow::{Context, Result};
use clap::Parser;
use sb_protocol::{Event, Issue, JobRecord, JobUpdate, ToolCall, ToolDefinition, ToolResultPayload};
use std::path::PathBuf;
use ts_rs::TS;

#[derive(Parser, Debug)]
#[command(name = "sb-protocol-ts", about = "Generate TypeScript bindings for sb-protocol")]
struct Args {
    /// Directory the bindings are written to.
    #[arg(short, long, default_value = "bindings")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    // Dependencies (status, analysis, browser context) are exported transitively.
    JobRecord::export_all_to(&args.out_dir).context("exporting JobRecord")?;
    JobUpdate::export_all_to(&args.out_dir).context("exporting JobUpdate")?;
    Event::export_all_to(&args.out_dir).context("exporting Event")?;
    ToolCall::export_all_to(&args.out_dir).context("exporting ToolCall")?;
    ToolDefinition::export_all_to(&args.out_dir).context("exporting ToolDefinition")?;
    ToolResultPayload::export_all_to(&args.out_dir).context("exporting ToolResultPayload")?;
    Issue::export_all_to(&args.out_dir).context("exporting Issue")?;

    println!("TypeScript bindings written to {}", args.out_dir.display());
    Ok(())
}
