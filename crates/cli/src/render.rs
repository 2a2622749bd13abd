//! Terminal rendering of job progress.

use colored::{ColoredString, Colorize};
use sb_protocol::{JobRecord, JobStatus};

pub const REQUIRED_ENV: [&str; 3] = ["GEMINI_API_KEY", "E2B_API_KEY", "LINEAR_API_KEY"];

const BAR_WIDTH: usize = 20;

pub fn mark(ok: bool) -> ColoredString {
    if ok {
        "✓".green()
    } else {
        "✗".red()
    }
}

pub fn status_label(status: JobStatus) -> ColoredString {
    let label = format!("{:<17}", status.as_str());
    match status {
        JobStatus::Pending => label.normal(),
        JobStatus::Analyzing | JobStatus::GatheringContext => label.cyan(),
        JobStatus::CreatingTicket => label.yellow(),
        JobStatus::Completed => label.green().bold(),
        JobStatus::Failed => label.red().bold(),
    }
}

pub fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}] {progress:>3}%", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub fn status_line(job: &JobRecord) -> String {
    format!(
        "{} {} {}",
        progress_bar(job.progress),
        status_label(job.status),
        job.current_step
    )
}
