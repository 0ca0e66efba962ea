//! End-to-end lifecycle tests driving `Worker` over the in-memory queue.

use queue_worker::{Logger, ProcessControl, SignalSource, StopFn, Worker, WorkerOptions};
use queue_worker_core::{Job, JobHandler, JobQueue, JobResult};
use queue_worker_memory::MemoryQueue;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct LineLogger {
    lines: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl LineLogger {
    fn new() -> Self {
        LineLogger {
            lines: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        }
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Logger for LineLogger {
    fn log(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str, _detail: Option<&str>) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

struct ExitRecorder {
    exits: Mutex<Vec<i32>>,
}

impl ExitRecorder {
    fn new() -> Self {
        ExitRecorder {
            exits: Mutex::new(Vec::new()),
        }
    }

    fn exits(&self) -> Vec<i32> {
        self.exits.lock().unwrap().clone()
    }
}

impl ProcessControl for ExitRecorder {
    fn uptime(&self) -> Duration {
        Duration::from_secs(1)
    }

    fn exit(&self, code: i32) {
        self.exits.lock().unwrap().push(code);
    }
}

struct NoSignals;

impl SignalSource for NoSignals {
    fn install(&self, _on_stop: StopFn) {}
}

struct SleepingHandler {
    work: Duration,
    handled: AtomicU64,
}

#[async_trait::async_trait]
impl JobHandler for SleepingHandler {
    async fn handle(&self, job: Job) -> JobResult {
        tokio::time::sleep(self.work).await;
        job.report_progress(100);
        self.handled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

async fn wait_until<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

fn build_worker(
    queue: Arc<MemoryQueue>,
    options: WorkerOptions,
) -> (Worker, Arc<ExitRecorder>) {
    let process = Arc::new(ExitRecorder::new());
    let worker =
        Worker::with_capabilities(queue, options, Arc::new(NoSignals), process.clone());
    (worker, process)
}

#[tokio::test]
async fn worker_runs_jobs_and_stops_cleanly() {
    let queue = Arc::new(MemoryQueue::new());
    for n in 0..5 {
        queue.enqueue(serde_json::json!({ "n": n })).unwrap();
    }

    let logger = Arc::new(LineLogger::new());
    let options = WorkerOptions {
        concurrency: Some(3),
        logger: Some(logger.clone()),
        ..Default::default()
    };
    let (worker, process) = build_worker(queue.clone(), options);

    let handler = Arc::new(SleepingHandler {
        work: Duration::from_millis(5),
        handled: AtomicU64::new(0),
    });
    worker.start(handler.clone()).await.unwrap();

    wait_until(|| handler.handled.load(Ordering::SeqCst) == 5).await;
    let health = queue.check_health().await.unwrap();
    assert_eq!(health.succeeded, 5);

    worker.stop(None).await;
    assert_eq!(process.exits(), vec![0]);

    let lines = logger.lines();
    assert!(lines.contains(&"Awaiting queue...".to_string()));
    assert!(lines.contains(&"Queue ready, awaiting jobs...".to_string()));
    assert!(lines.contains(&"Shutting down on signal".to_string()));
}

#[tokio::test]
async fn stalled_check_cadence_emits_health_lines() {
    let queue = Arc::new(MemoryQueue::new());
    let logger = Arc::new(LineLogger::new());
    let options = WorkerOptions {
        stalled_check_interval_ms: Some(20),
        logger: Some(logger.clone()),
        ..Default::default()
    };
    let (worker, _) = build_worker(queue, options);

    let handler = Arc::new(SleepingHandler {
        work: Duration::from_millis(1),
        handled: AtomicU64::new(0),
    });
    worker.start(handler).await.unwrap();

    wait_until(|| {
        logger
            .lines()
            .iter()
            .any(|line| line.starts_with("waiting: "))
    })
    .await;
}

#[tokio::test]
async fn hung_jobs_force_a_failed_shutdown() {
    let queue = Arc::new(MemoryQueue::new());
    queue.enqueue(serde_json::json!({ "n": 1 })).unwrap();

    let logger = Arc::new(LineLogger::new());
    let options = WorkerOptions {
        shutdown_timeout_ms: Some(20),
        logger: Some(logger.clone()),
        ..Default::default()
    };
    let (worker, process) = build_worker(queue.clone(), options);

    let handler = Arc::new(SleepingHandler {
        work: Duration::from_secs(60),
        handled: AtomicU64::new(0),
    });
    worker.start(handler).await.unwrap();

    // Wait until the hung job is actually in flight so close must drain it.
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if queue.check_health().await.unwrap().active == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("job never became active");

    worker.stop(None).await;
    assert_eq!(process.exits(), vec![8]);
    assert!(logger
        .errors()
        .contains(&"Failed to shut down gracefully".to_string()));
}
