use clap::Parser;
use queue_worker::{Worker, WorkerOptions};
use queue_worker_core::{Job, JobHandler, JobResult};
use queue_worker_memory::MemoryQueue;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "qworker")]
#[command(about = "Demo queue worker over the in-memory queue", long_about = None)]
struct Args {
    /// Number of concurrent jobs
    #[arg(short, long, default_value = "2")]
    concurrency: usize,

    /// Stalled-job check interval in milliseconds
    #[arg(long, default_value = "5000")]
    stalled_check_interval_ms: u64,

    /// Graceful shutdown bound in milliseconds
    #[arg(long, default_value = "10000")]
    shutdown_timeout_ms: u64,

    /// Number of demo jobs to enqueue
    #[arg(short, long, default_value = "10")]
    jobs: usize,

    /// Per-step delay inside the demo handler, in milliseconds
    #[arg(long, default_value = "1000")]
    step_ms: u64,

    /// Path to a YAML options file (CLI flags override it)
    #[arg(long)]
    config: Option<String>,
}

/// Sleeps through five steps and reports progress after each one.
struct DemoHandler {
    step: Duration,
}

#[async_trait::async_trait]
impl JobHandler for DemoHandler {
    async fn handle(&self, job: Job) -> JobResult {
        for step in 0..5u32 {
            tokio::time::sleep(self.step).await;
            job.report_progress((100 * step / 5) as u8);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut options = if let Some(path) = &args.config {
        WorkerOptions::from_file(path)?
    } else {
        WorkerOptions::default()
    };

    // CLI flags win over the file.
    options.concurrency = Some(args.concurrency);
    options.stalled_check_interval_ms = Some(args.stalled_check_interval_ms);
    options.shutdown_timeout_ms = Some(args.shutdown_timeout_ms);

    let queue = Arc::new(MemoryQueue::new());
    for n in 0..args.jobs {
        queue.enqueue(serde_json::json!({ "n": n }))?;
    }
    tracing::info!("Enqueued {} demo jobs", args.jobs);

    let worker = Worker::new(queue, options);
    worker
        .start(Arc::new(DemoHandler {
            step: Duration::from_millis(args.step_ms),
        }))
        .await?;

    // Termination only ever happens inside the shutdown coordinator
    // (signal, panic, or queue fault), so park this task.
    std::future::pending::<()>().await;
    Ok(())
}
