//! Supply a custom logger and tighter timings through `WorkerOptions`.
//!
//! Run with: cargo run -p queue-worker --example custom_logger

use queue_worker::{Logger, Worker, WorkerOptions};
use queue_worker_core::{Job, JobHandler, JobResult};
use queue_worker_memory::MemoryQueue;
use std::sync::Arc;

struct PrefixedLogger {
    prefix: &'static str,
}

impl Logger for PrefixedLogger {
    fn log(&self, message: &str) {
        println!("[{}] {}", self.prefix, message);
    }

    fn error(&self, message: &str, detail: Option<&str>) {
        match detail {
            Some(detail) => eprintln!("[{}] {}: {}", self.prefix, message, detail),
            None => eprintln!("[{}] {}", self.prefix, message),
        }
    }
}

struct PrintHandler;

#[async_trait::async_trait]
impl JobHandler for PrintHandler {
    async fn handle(&self, job: Job) -> JobResult {
        println!("handling job {}", job.id());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let queue = Arc::new(MemoryQueue::new());
    for n in 0..3 {
        queue.enqueue(serde_json::json!({ "n": n }))?;
    }

    let worker = Worker::new(
        queue,
        WorkerOptions {
            stalled_check_interval_ms: Some(1_000),
            shutdown_timeout_ms: Some(2_000),
            logger: Some(Arc::new(PrefixedLogger { prefix: "w1" })),
            ..Default::default()
        },
    );
    worker.start(Arc::new(PrintHandler)).await?;

    std::future::pending::<()>().await;
    Ok(())
}
