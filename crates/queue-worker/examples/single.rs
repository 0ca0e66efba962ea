//! Embed the worker around an in-memory queue, the smallest useful setup.
//!
//! Run with: cargo run -p queue-worker --example single

use queue_worker::{Worker, WorkerOptions};
use queue_worker_core::{Job, JobHandler, JobResult};
use queue_worker_memory::MemoryQueue;
use std::sync::Arc;
use std::time::Duration;

struct SleepyHandler;

#[async_trait::async_trait]
impl JobHandler for SleepyHandler {
    async fn handle(&self, job: Job) -> JobResult {
        for step in 0..5u32 {
            tokio::time::sleep(Duration::from_millis(200)).await;
            job.report_progress((100 * step / 5) as u8);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let queue = Arc::new(MemoryQueue::new());
    for n in 0..10 {
        queue.enqueue(serde_json::json!({ "n": n }))?;
    }

    let worker = Worker::new(
        queue,
        WorkerOptions {
            concurrency: Some(10),
            ..Default::default()
        },
    );
    worker.start(Arc::new(SleepyHandler)).await?;

    // Ctrl-C (or SIGTERM) drives the graceful shutdown and process exit.
    std::future::pending::<()>().await;
    Ok(())
}
