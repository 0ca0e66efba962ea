use crate::{HealthSnapshot, Job, QueueError};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;

/// Result type for job handlers
pub type JobResult = Result<(), String>;

/// Per-cycle callback registered with the queue's stalled-job check.
pub type StalledCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Trait for job handlers
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Handle one job to completion.
    async fn handle(&self, job: Job) -> JobResult;
}

/// Capability set the worker consumes from a queue engine.
///
/// Job storage, distribution, retry policy and stalled-job detection all
/// live behind this seam; the worker only supplies cadence, concurrency
/// and the handler.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Suspends until the queue connection is established. Fails with
    /// `QueueError::Connection` on unrecoverable setup failure.
    async fn ready(&self) -> Result<(), QueueError>;

    /// Registers a periodic stalled-job recovery cycle; `on_check` is
    /// invoked once per cycle. No return value is consumed.
    fn check_stalled_jobs(&self, interval: Duration, on_check: StalledCallback);

    /// Begins concurrent job dispatch to `handler`, bounded by
    /// `concurrency`. Dispatch runs until `close` is called.
    fn process(&self, concurrency: usize, handler: Arc<dyn JobHandler>);

    /// Current per-state job counts. May fail with a transient error.
    async fn check_health(&self) -> Result<HealthSnapshot, QueueError>;

    /// Stops intake and waits up to `timeout` for in-flight jobs to drain.
    /// Fails with `QueueError::ShutdownTimeout` if the bound elapses.
    async fn close(&self, timeout: Duration) -> Result<(), QueueError>;
}
