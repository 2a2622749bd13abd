//! Job record merge rules.
//!
//! Every mutation of a [`JobRecord`] goes through [`apply_update`], which
//! enforces the lifecycle invariants:
//! - status only moves forward, `Failed` is reachable from any non-terminal status
//! - progress never decreases and never exceeds 100
//! - ticket fields are only recorded together with `Completed`
//! - an error is only recorded together with `Failed`
//! - terminal records are frozen

use chrono::Utc;
use sb_protocol::{Event, JobRecord, JobStatus, JobUpdate};

/// Result of merging a [`JobUpdate`] into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The record changed (at least `updated_at` was refreshed).
    Applied,
    /// The record is terminal; nothing was touched.
    Frozen,
}

/// Merge `update` into `record`, refreshing `updated_at`.
///
/// A status that would move backward is ignored while the remaining fields
/// are still merged.
pub fn apply_update(record: &mut JobRecord, update: JobUpdate) -> MergeOutcome {
    if record.is_terminal() {
        return MergeOutcome::Frozen;
    }

    if let Some(next) = update.status {
        if record.status.can_transition_to(next) {
            record.status = next;
        } else {
            tracing::debug!(
                job_id = %record.id,
                from = %record.status,
                to = %next,
                "Ignoring backward status transition"
            );
        }
    }

    if let Some(progress) = update.progress {
        record.progress = record.progress.max(progress.min(100));
    }
    if let Some(step) = update.current_step {
        record.current_step = step;
    }
    if let Some(analysis) = update.bug_analysis {
        record.bug_analysis = Some(analysis);
    }
    if let Some(context) = update.browser_context {
        record.browser_context = Some(context);
    }

    match record.status {
        JobStatus::Completed => {
            record.progress = 100;
            if update.ticket_id.is_some() {
                record.ticket_id = update.ticket_id;
            }
            if update.ticket_url.is_some() {
                record.ticket_url = update.ticket_url;
            }
        }
        JobStatus::Failed => {
            record.error = Some(
                update
                    .error
                    .unwrap_or_else(|| "Job failed without an error message".to_string()),
            );
        }
        _ => {}
    }

    record.updated_at = Utc::now();
    MergeOutcome::Applied
}

/// Append a log line unless the record is terminal.
pub fn append_log(record: &mut JobRecord, line: String) -> MergeOutcome {
    if record.is_terminal() {
        return MergeOutcome::Frozen;
    }
    record.logs.push(line);
    record.updated_at = Utc::now();
    MergeOutcome::Applied
}

/// Events describing the difference between two snapshots of the same job.
pub fn transition_events(before: &JobRecord, after: &JobRecord) -> Vec<Event> {
    let mut events = Vec::new();

    if before.status != after.status || before.progress != after.progress {
        events.push(Event::JobStatusUpdate {
            job_id: after.id,
            status: after.status,
            progress: after.progress,
        });
    }

    if before.status != after.status {
        match after.status {
            JobStatus::Completed => events.push(Event::JobCompleted {
                job_id: after.id,
                ticket_id: after.ticket_id.clone().unwrap_or_default(),
                ticket_url: after.ticket_url.clone().unwrap_or_default(),
            }),
            JobStatus::Failed => events.push(Event::JobFailed {
                job_id: after.id,
                error: after.error.clone().unwrap_or_default(),
            }),
            _ => {}
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record() -> JobRecord {
        JobRecord::new(Uuid::new_v4())
    }

    #[test]
    fn test_forward_transition_applies() {
        let mut job = record();
        let outcome = apply_update(
            &mut job,
            JobUpdate::new()
                .status(JobStatus::Analyzing)
                .progress(10)
                .step("Initializing Agent & Sandbox..."),
        );

        assert_eq!(outcome, MergeOutcome::Applied);
        assert_eq!(job.status, JobStatus::Analyzing);
        assert_eq!(job.progress, 10);
        assert_eq!(job.current_step, "Initializing Agent & Sandbox...");
    }

    #[test]
    fn test_backward_status_and_progress_are_ignored() {
        let mut job = record();
        apply_update(
            &mut job,
            JobUpdate::new().status(JobStatus::CreatingTicket).progress(85),
        );
        apply_update(
            &mut job,
            JobUpdate::new()
                .status(JobStatus::GatheringContext)
                .progress(40)
                .step("late step"),
        );

        assert_eq!(job.status, JobStatus::CreatingTicket);
        assert_eq!(job.progress, 85);
        assert_eq!(job.current_step, "late step");
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut job = record();
        apply_update(&mut job, JobUpdate::new().progress(250));
        assert_eq!(job.progress, 100);
    }

    #[test]
    fn test_failed_from_any_non_terminal() {
        for status in [
            JobStatus::Pending,
            JobStatus::Analyzing,
            JobStatus::GatheringContext,
            JobStatus::CreatingTicket,
        ] {
            let mut job = record();
            job.status = status;
            apply_update(&mut job, JobUpdate::new().status(JobStatus::Failed).error("boom"));
            assert_eq!(job.status, JobStatus::Failed);
            assert_eq!(job.error.as_deref(), Some("boom"));
        }
    }

    #[test]
    fn test_terminal_record_is_frozen() {
        let mut job = record();
        apply_update(
            &mut job,
            JobUpdate::new()
                .status(JobStatus::Completed)
                .ticket("ENG-1", "https://linear.app/t/ENG-1"),
        );
        let snapshot = job.clone();

        let outcome = apply_update(&mut job, JobUpdate::new().status(JobStatus::Failed).error("late"));
        assert_eq!(outcome, MergeOutcome::Frozen);
        assert_eq!(append_log(&mut job, "late".to_string()), MergeOutcome::Frozen);
        assert_eq!(job, snapshot);
    }

    #[test]
    fn test_completed_never_carries_error() {
        let mut job = record();
        apply_update(
            &mut job,
            JobUpdate::new()
                .status(JobStatus::Completed)
                .ticket("ENG-2", "https://linear.app/t/ENG-2")
                .error("stray"),
        );

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert!(job.error.is_none());
        assert_eq!(job.ticket_id.as_deref(), Some("ENG-2"));
    }

    #[test]
    fn test_ticket_fields_require_completion() {
        let mut job = record();
        apply_update(&mut job, JobUpdate::new().ticket("ENG-3", "https://x.test"));
        assert!(job.ticket_id.is_none());
        assert!(job.ticket_url.is_none());
    }

    #[test]
    fn test_transition_events() {
        let before = record();
        let mut after = before.clone();
        apply_update(&mut after, JobUpdate::new().status(JobStatus::Failed).error("nope"));

        let events = transition_events(&before, &after);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::JobStatusUpdate { status: JobStatus::Failed, .. }));
        assert!(matches!(&events[1], Event::JobFailed { error, .. } if error == "nope"));

        let unchanged = transition_events(&after, &after);
        assert!(unchanged.is_empty());
    }
}
