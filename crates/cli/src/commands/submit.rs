use crate::commands::build_manager;
use crate::render;
use clap::Args;
use color_eyre::eyre::{bail, Result};
use colored::Colorize;
use sb_core::config::load_config;
use sb_core::hosting::ScreenshotUpload;
use sb_protocol::{JobRecord, JobStatus};
use std::path::{Path, PathBuf};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Args)]
pub struct SubmitArgs {
    /// Screenshot to analyze (png, jpeg, gif or webp)
    pub image: PathBuf,

    /// Give up waiting after this many seconds
    #[arg(long, default_value_t = 300)]
    pub timeout_secs: u64,

    /// Print the final job record as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(dir: &Path, args: SubmitArgs) -> Result<()> {
    let image = ScreenshotUpload::from_path(&args.image).await?;
    let config = load_config(dir).await?;
    let manager = build_manager(&config)?;

    let job_id = manager.submit(image).await;
    tracing::debug!(job_id = %job_id, image = %args.image.display(), "Job submitted");
    println!("{} {}", "Submitted job".bold(), job_id);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(args.timeout_secs);
    let mut printed_logs = 0;
    let mut last_seen: Option<(JobStatus, u8)> = None;

    let job = loop {
        let Some(job) = manager.get_job(job_id).await else {
            bail!("Job {job_id} no longer exists");
        };

        for line in job.logs.iter().skip(printed_logs) {
            println!("    {}", line.dimmed());
        }
        printed_logs = job.logs.len();

        if last_seen != Some((job.status, job.progress)) {
            println!("{}", render::status_line(&job));
            last_seen = Some((job.status, job.progress));
        }

        if job.is_terminal() {
            break job;
        }
        if tokio::time::Instant::now() >= deadline {
            bail!("Timed out after {}s waiting for job {job_id}", args.timeout_secs);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&job)?);
    }
    report(&job)
}

fn report(job: &JobRecord) -> Result<()> {
    println!();
    match (&job.ticket_id, &job.ticket_url, &job.error) {
        (Some(id), Some(url), _) => {
            println!("{} {} {}", "Ticket created:".green().bold(), id.bold(), url);
            Ok(())
        }
        (_, _, Some(error)) => bail!("Job failed: {error}"),
        _ => bail!("Job ended as {} without a ticket", job.status),
    }
}
