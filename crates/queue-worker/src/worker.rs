use crate::config::{WorkerConfig, WorkerOptions};
use crate::health::HealthReporter;
use crate::monitor::StalledJobMonitor;
use crate::process::{ProcessControl, SystemProcess};
use crate::shutdown::{ShutdownCoordinator, StateCell, WorkerState};
use crate::signal::{ProcessSignals, SignalSource, StopFn};
use queue_worker_core::{JobHandler, JobQueue, QueueError};
use std::sync::Arc;

/// Supervisory lifecycle manager for a queue-consuming worker process.
///
/// Wraps a raw job handler with queue readiness, bounded-concurrency
/// dispatch, stalled-job recovery, periodic health reporting and an
/// exactly-once bounded-time shutdown.
pub struct Worker {
    config: WorkerConfig,
    queue: Arc<dyn JobQueue>,
    signals: Arc<dyn SignalSource>,
    shutdown: Arc<ShutdownCoordinator>,
    reporter: Arc<HealthReporter>,
    monitor: StalledJobMonitor,
    state: Arc<StateCell>,
}

impl Worker {
    /// Pure data assembly: no connection is opened here and nothing fails.
    pub fn new(queue: Arc<dyn JobQueue>, options: WorkerOptions) -> Self {
        Worker::with_capabilities(
            queue,
            options,
            Arc::new(ProcessSignals::new()),
            Arc::new(SystemProcess::new()),
        )
    }

    /// Constructor with injected signal and process capabilities, for tests
    /// and embedders running several workers in one process.
    pub fn with_capabilities(
        queue: Arc<dyn JobQueue>,
        options: WorkerOptions,
        signals: Arc<dyn SignalSource>,
        process: Arc<dyn ProcessControl>,
    ) -> Self {
        let config = WorkerConfig::resolve(options);
        let state = Arc::new(StateCell::new());
        let shutdown = Arc::new(ShutdownCoordinator::new(
            queue.clone(),
            config.logger.clone(),
            process.clone(),
            config.shutdown_timeout,
            state.clone(),
        ));
        let reporter = Arc::new(HealthReporter::new(
            queue.clone(),
            config.logger.clone(),
            process,
        ));
        let monitor = StalledJobMonitor::new(queue.clone());

        Worker {
            config,
            queue,
            signals,
            shutdown,
            reporter,
            monitor,
            state,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn state(&self) -> WorkerState {
        self.state.get()
    }

    /// Start the worker: install fault/signal hooks, wait for the queue,
    /// start stalled-job checking, then hand the handler to the queue.
    ///
    /// The readiness wait is unbounded; a `ready` failure propagates to the
    /// caller. Once dispatch is registered this returns while jobs run.
    pub async fn start(&self, handler: Arc<dyn JobHandler>) -> Result<(), QueueError> {
        let shutdown = self.shutdown.clone();
        let on_stop: StopFn = Arc::new(move |fault| {
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                shutdown.stop(fault.map(anyhow::Error::msg)).await;
            });
        });
        self.signals.install(on_stop);

        self.state.advance(WorkerState::AwaitingQueue);
        self.config.logger.log("Awaiting queue...");
        self.queue.ready().await?;

        self.monitor
            .start(self.config.stalled_check_interval, self.reporter.clone());

        self.config.logger.log("Queue ready, awaiting jobs...");
        self.state.advance(WorkerState::Running);
        self.queue.process(self.config.concurrency, handler);

        Ok(())
    }

    /// Request shutdown. Idempotent under concurrent callers; terminates
    /// the process via the configured `ProcessControl`.
    pub async fn stop(&self, error: Option<anyhow::Error>) {
        self.shutdown.stop(error).await;
    }

    /// Log one health line now. The same report also runs on every
    /// stalled-check cycle.
    pub async fn report(&self) {
        self.reporter.report().await;
    }
}
