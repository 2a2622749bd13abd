//! Job record store.
//!
//! The store is the single source of truth polled by clients. Writers go
//! through [`JobStore::update`] and [`JobStore::append_log`], which apply the
//! merge rules in [`crate::state::job`].

use crate::state::job::{self, MergeOutcome};
use async_trait::async_trait;
use sb_protocol::{Event, JobRecord, JobUpdate};
use std::collections::HashMap;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Keyed storage of job records.
///
/// Unknown ids yield `None` rather than an error: a job may be deleted while
/// its loop is still running.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a fresh `Pending` record, replacing any record with the same id.
    async fn create(&self, id: Uuid) -> JobRecord;

    async fn get(&self, id: Uuid) -> Option<JobRecord>;

    /// Merge `update` into the record and return the resulting snapshot.
    ///
    /// Terminal records are returned unchanged.
    async fn update(&self, id: Uuid, update: JobUpdate) -> Option<JobRecord>;

    async fn append_log(&self, id: Uuid, line: String) -> Option<JobRecord>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> bool;

    /// All records, oldest first.
    async fn list(&self) -> Vec<JobRecord>;
}

/// Process-lifetime store backed by a `HashMap`.
///
/// When constructed with [`InMemoryJobStore::with_events`], every state
/// change is also published as an [`Event`].
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<Uuid, JobRecord>>,
    events_tx: Option<mpsc::Sender<Event>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events_tx: mpsc::Sender<Event>) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            events_tx: Some(events_tx),
        }
    }

    /// Never waits on the subscriber. A full channel drops the event; a
    /// closed one is ignored.
    fn publish(&self, events: Vec<Event>) {
        let Some(tx) = &self.events_tx else {
            return;
        };
        for event in events {
            match tx.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(event)) => {
                    tracing::warn!(?event, "Event subscriber is not keeping up, dropping event");
                }
                Err(TrySendError::Closed(_)) => {}
            }
        }
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, id: Uuid) -> JobRecord {
        let record = JobRecord::new(id);
        self.jobs.write().await.insert(id, record.clone());
        tracing::debug!(job_id = %id, "Job created");
        self.publish(vec![Event::JobCreated { job_id: id }]);
        record
    }

    async fn get(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs.read().await.get(&id).cloned()
    }

    async fn update(&self, id: Uuid, update: JobUpdate) -> Option<JobRecord> {
        let (events, snapshot) = {
            let mut jobs = self.jobs.write().await;
            let record = jobs.get_mut(&id)?;
            let before = record.clone();
            if job::apply_update(record, update) == MergeOutcome::Frozen {
                tracing::debug!(job_id = %id, status = %record.status, "Update refused for terminal job");
                return Some(before);
            }
            (job::transition_events(&before, record), record.clone())
        };

        self.publish(events);
        Some(snapshot)
    }

    async fn append_log(&self, id: Uuid, line: String) -> Option<JobRecord> {
        let snapshot = {
            let mut jobs = self.jobs.write().await;
            let record = jobs.get_mut(&id)?;
            if job::append_log(record, line.clone()) == MergeOutcome::Frozen {
                return Some(record.clone());
            }
            record.clone()
        };

        tracing::info!(job_id = %id, "{line}");
        self.publish(vec![Event::JobLogLine {
            job_id: id,
            content: line,
        }]);
        Some(snapshot)
    }

    async fn delete(&self, id: Uuid) -> bool {
        self.jobs.write().await.remove(&id).is_some()
    }

    async fn list(&self) -> Vec<JobRecord> {
        let mut jobs: Vec<JobRecord> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by_key(|job| job.created_at);
        jobs
    }
}
