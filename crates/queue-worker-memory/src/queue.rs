use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use queue_worker_core::{
    HealthSnapshot, Job, JobHandler, JobId, JobPayload, JobQueue, ProgressSink, QueueError,
    StalledCallback,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};
use uuid::Uuid;

const DEFAULT_LEASE_TTL: Duration = Duration::from_secs(30);

/// How long the dispatch loop naps when the queue is empty.
const IDLE_POLL: Duration = Duration::from_millis(50);

#[derive(Clone)]
struct JobRecord {
    id: JobId,
    payload: JobPayload,
    created_at: DateTime<Utc>,
}

/// Held while a job is being handled; expiry marks the job as stalled.
struct Lease {
    record: JobRecord,
    expires_at: Instant,
    progress: u8,
}

struct Inner {
    waiting: Mutex<VecDeque<JobRecord>>,
    delayed: Mutex<Vec<(Instant, JobRecord)>>,
    active: DashMap<JobId, Lease>,
    succeeded: AtomicU64,
    failed: AtomicU64,
    closed: AtomicBool,
    lease_ttl: Duration,
    work_available: Notify,
    idle: Notify,
}

impl Inner {
    fn take_next(&self) -> Option<JobRecord> {
        self.promote_due();
        self.waiting.lock().pop_front()
    }

    fn promote_due(&self) {
        let now = Instant::now();
        let mut delayed = self.delayed.lock();
        let mut waiting = self.waiting.lock();
        let mut index = 0;
        while index < delayed.len() {
            if delayed[index].0 <= now {
                let (_, record) = delayed.remove(index);
                waiting.push_back(record);
            } else {
                index += 1;
            }
        }
    }

    fn lease(&self, record: &JobRecord) {
        self.active.insert(
            record.id,
            Lease {
                record: record.clone(),
                expires_at: Instant::now() + self.lease_ttl,
                progress: 0,
            },
        );
    }

    fn complete(&self, id: JobId, outcome: Result<(), String>) {
        if self.active.remove(&id).is_none() {
            // Lease was reclaimed as stalled while the handler finished.
            debug!("job {} completed after its lease was recovered", id);
        }
        match outcome {
            Ok(()) => {
                self.succeeded.fetch_add(1, Ordering::SeqCst);
            }
            Err(reason) => {
                self.failed.fetch_add(1, Ordering::SeqCst);
                warn!("job {} failed: {}", id, reason);
            }
        }
        if self.active.is_empty() {
            self.idle.notify_waiters();
        }
    }

    /// Return every job with an expired lease to the front of the waiting
    /// queue. Runs once per stalled-check cycle.
    fn recover(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<JobId> = self
            .active
            .iter()
            .filter(|entry| entry.value().expires_at <= now)
            .map(|entry| *entry.key())
            .collect();

        let mut recovered = 0;
        for id in expired {
            if let Some((_, lease)) = self.active.remove(&id) {
                self.waiting.lock().push_front(lease.record);
                recovered += 1;
            }
        }
        if recovered > 0 {
            self.work_available.notify_waiters();
        }
        recovered
    }

    async fn drained(&self) {
        loop {
            if self.active.is_empty() {
                return;
            }
            let notified = self.idle.notified();
            if self.active.is_empty() {
                return;
            }
            notified.await;
        }
    }
}

impl ProgressSink for Inner {
    fn progress(&self, job_id: JobId, percent: u8) {
        if let Some(mut lease) = self.active.get_mut(&job_id) {
            lease.progress = percent;
        }
        debug!("job {} progress: {}%", job_id, percent);
    }
}

/// In-process job queue with lease-based stalled-job recovery.
///
/// Backs the demo binary and the integration tests; it implements the full
/// `JobQueue` capability set without any external service.
pub struct MemoryQueue {
    inner: Arc<Inner>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        MemoryQueue::with_lease_ttl(DEFAULT_LEASE_TTL)
    }

    /// A lease that expires before its handler finishes makes the job
    /// stalled; shorten the TTL to exercise recovery.
    pub fn with_lease_ttl(lease_ttl: Duration) -> Self {
        MemoryQueue {
            inner: Arc::new(Inner {
                waiting: Mutex::new(VecDeque::new()),
                delayed: Mutex::new(Vec::new()),
                active: DashMap::new(),
                succeeded: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                lease_ttl,
                work_available: Notify::new(),
                idle: Notify::new(),
            }),
        }
    }

    /// Add a job for immediate dispatch.
    pub fn enqueue(&self, payload: JobPayload) -> Result<JobId, QueueError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(QueueError::Closed);
        }
        let record = JobRecord {
            id: Uuid::new_v4(),
            payload,
            created_at: Utc::now(),
        };
        let id = record.id;
        self.inner.waiting.lock().push_back(record);
        self.inner.work_available.notify_waiters();
        Ok(id)
    }

    /// Add a job that becomes dispatchable after `delay`.
    pub fn enqueue_delayed(&self, payload: JobPayload, delay: Duration) -> Result<JobId, QueueError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(QueueError::Closed);
        }
        let record = JobRecord {
            id: Uuid::new_v4(),
            payload,
            created_at: Utc::now(),
        };
        let id = record.id;
        self.inner
            .delayed
            .lock()
            .push((Instant::now() + delay, record));
        Ok(id)
    }

    /// Reclaim expired leases now, outside the periodic cycle.
    pub fn recover_stalled(&self) -> usize {
        self.inner.recover()
    }

    /// Latest reported progress for an active job.
    pub fn progress_of(&self, id: JobId) -> Option<u8> {
        self.inner.active.get(&id).map(|lease| lease.progress)
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        MemoryQueue::new()
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn ready(&self) -> Result<(), QueueError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(QueueError::Connection("queue is closed".to_string()));
        }
        Ok(())
    }

    fn check_stalled_jobs(&self, interval: Duration, on_check: StalledCallback) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so cycles run
            // one interval apart.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if inner.closed.load(Ordering::SeqCst) {
                    break;
                }
                let recovered = inner.recover();
                if recovered > 0 {
                    warn!("recovered {} stalled jobs", recovered);
                }
                on_check().await;
            }
        });
    }

    fn process(&self, concurrency: usize, handler: Arc<dyn JobHandler>) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
            loop {
                if inner.closed.load(Ordering::SeqCst) {
                    break;
                }
                let permit = match semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };
                // close() may have landed while we waited for capacity.
                if inner.closed.load(Ordering::SeqCst) {
                    break;
                }
                match inner.take_next() {
                    Some(record) => {
                        inner.lease(&record);
                        let inner = inner.clone();
                        let handler = handler.clone();
                        tokio::spawn(async move {
                            let sink: Arc<dyn ProgressSink> = inner.clone();
                            let job = Job::new(
                                record.id,
                                record.payload.clone(),
                                record.created_at,
                                sink,
                            );
                            let outcome = handler.handle(job).await;
                            inner.complete(record.id, outcome);
                            drop(permit);
                        });
                    }
                    None => {
                        drop(permit);
                        tokio::select! {
                            _ = inner.work_available.notified() => {}
                            _ = tokio::time::sleep(IDLE_POLL) => {}
                        }
                    }
                }
            }
        });
    }

    async fn check_health(&self) -> Result<HealthSnapshot, QueueError> {
        Ok(HealthSnapshot {
            waiting: self.inner.waiting.lock().len() as u64,
            active: self.inner.active.len() as u64,
            succeeded: self.inner.succeeded.load(Ordering::SeqCst),
            failed: self.inner.failed.load(Ordering::SeqCst),
            delayed: self.inner.delayed.lock().len() as u64,
        })
    }

    async fn close(&self, timeout: Duration) -> Result<(), QueueError> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Err(QueueError::Closed);
        }
        self.inner.work_available.notify_waiters();

        match tokio::time::timeout(timeout, self.inner.drained()).await {
            Ok(()) => Ok(()),
            Err(_) => Err(QueueError::ShutdownTimeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }
}
