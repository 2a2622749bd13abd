//! Custom assertion helpers over job records and events.

#![allow(dead_code)]

use sb_protocol::{Event, JobRecord, JobStatus};

/// Statuses reported by `JobStatusUpdate` events, in order.
pub fn status_trail(events: &[Event]) -> Vec<JobStatus> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::JobStatusUpdate { status, .. } => Some(*status),
            _ => None,
        })
        .collect()
}

/// Assert that statuses and progress only move forward.
pub fn assert_monotonic(events: &[Event]) {
    let mut last_rank = 0;
    let mut last_progress = 0;
    for event in events {
        if let Event::JobStatusUpdate {
            status, progress, ..
        } = event
        {
            assert!(
                status.rank() >= last_rank,
                "status moved backwards to {status:?} in {events:?}"
            );
            assert!(
                *progress >= last_progress,
                "progress moved backwards to {progress} in {events:?}"
            );
            last_rank = status.rank();
            last_progress = *progress;
        }
    }
}

/// Assert exactly one terminal event, and that it is the last one.
pub fn assert_single_terminal(events: &[Event]) {
    let terminal: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_terminal())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(terminal.len(), 1, "expected one terminal event in {events:?}");
    assert_eq!(terminal[0], events.len() - 1, "terminal event is not last in {events:?}");
}

/// Assert that `expected` lines appear in the log in this order.
pub fn assert_logs_in_order(job: &JobRecord, expected: &[&str]) {
    let mut lines = job.logs.iter();
    for wanted in expected {
        assert!(
            lines.any(|line| line.contains(wanted)),
            "log line containing {wanted:?} missing or out of order in {:#?}",
            job.logs
        );
    }
}

/// Assert the completed/failed exclusivity of a terminal record.
pub fn assert_terminal_shape(job: &JobRecord) {
    match job.status {
        JobStatus::Completed => {
            assert_eq!(job.progress, 100);
            assert!(job.ticket_id.is_some() && job.ticket_url.is_some());
            assert!(job.error.is_none());
        }
        JobStatus::Failed => {
            assert!(job.error.is_some());
            assert!(job.ticket_id.is_none() && job.ticket_url.is_none());
        }
        other => panic!("job is not terminal: {other:?}"),
    }
}
