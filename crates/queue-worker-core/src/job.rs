use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a job
pub type JobId = Uuid;

/// Job payload (arbitrary JSON)
pub type JobPayload = serde_json::Value;

/// Sink for per-job progress updates, owned by the queue engine.
pub trait ProgressSink: Send + Sync {
    fn progress(&self, job_id: JobId, percent: u8);
}

/// A unit of work handed to a job handler.
///
/// Opaque to the worker: an identity plus a progress-reporting capability.
/// All queue-side job state (status, retries, leases) stays in the engine;
/// handlers only read the payload and report progress.
#[derive(Clone)]
pub struct Job {
    id: JobId,
    payload: JobPayload,
    created_at: DateTime<Utc>,
    progress: Arc<dyn ProgressSink>,
}

impl Job {
    pub fn new(
        id: JobId,
        payload: JobPayload,
        created_at: DateTime<Utc>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Job {
            id,
            payload,
            created_at,
            progress,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn payload(&self) -> &JobPayload {
        &self.payload
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Report handler progress as a percentage; values above 100 are clamped.
    pub fn report_progress(&self, percent: u8) {
        self.progress.progress(self.id, percent.min(100));
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .finish()
    }
}
