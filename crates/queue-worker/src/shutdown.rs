use crate::logger::Logger;
use crate::process::ProcessControl;
use queue_worker_core::JobQueue;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// Constructed, not started
    Idle = 0,
    /// Waiting for the queue connection
    AwaitingQueue = 1,
    /// Processing jobs
    Running = 2,
    /// Close sequence in flight
    ShuttingDown = 3,
    /// Close sequence finished (success or failure)
    Terminated = 4,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Idle => "idle",
            WorkerState::AwaitingQueue => "awaiting_queue",
            WorkerState::Running => "running",
            WorkerState::ShuttingDown => "shutting_down",
            WorkerState::Terminated => "terminated",
        }
    }

    fn from_u8(value: u8) -> WorkerState {
        match value {
            0 => WorkerState::Idle,
            1 => WorkerState::AwaitingQueue,
            2 => WorkerState::Running,
            3 => WorkerState::ShuttingDown,
            _ => WorkerState::Terminated,
        }
    }
}

/// Atomic cell holding the current worker state.
///
/// `ShuttingDown` and `Terminated` are absorbing: once reached, the only
/// transition still accepted is `ShuttingDown -> Terminated`.
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        StateCell(AtomicU8::new(WorkerState::Idle as u8))
    }

    pub fn get(&self) -> WorkerState {
        WorkerState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub fn advance(&self, next: WorkerState) {
        loop {
            let current = self.get();
            match current {
                WorkerState::Terminated => return,
                WorkerState::ShuttingDown if next != WorkerState::Terminated => return,
                _ => {}
            }
            if self
                .0
                .compare_exchange(
                    current as u8,
                    next as u8,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                )
                .is_ok()
            {
                return;
            }
        }
    }
}

/// The single path to process termination.
///
/// `stop` collapses however many concurrent triggers arrive (fault hook,
/// signal hooks, direct callers) into exactly one close-and-exit sequence.
pub struct ShutdownCoordinator {
    dying: AtomicBool,
    queue: Arc<dyn JobQueue>,
    logger: Arc<dyn Logger>,
    process: Arc<dyn ProcessControl>,
    shutdown_timeout: Duration,
    state: Arc<StateCell>,
}

impl ShutdownCoordinator {
    pub(crate) fn new(
        queue: Arc<dyn JobQueue>,
        logger: Arc<dyn Logger>,
        process: Arc<dyn ProcessControl>,
        shutdown_timeout: Duration,
        state: Arc<StateCell>,
    ) -> Self {
        ShutdownCoordinator {
            dying: AtomicBool::new(false),
            queue,
            logger,
            process,
            shutdown_timeout,
            state,
        }
    }

    pub fn is_dying(&self) -> bool {
        self.dying.load(Ordering::SeqCst)
    }

    /// Run the close sequence exactly once and terminate the process.
    ///
    /// Exit codes: 0 for a clean stop, 1 when a fault triggered the stop,
    /// 8 when the bounded-time close itself failed, whatever the trigger.
    pub async fn stop(&self, error: Option<anyhow::Error>) {
        // One-shot latch: swap is the atomic check-and-set, so two signals
        // arriving back-to-back still produce a single sequence.
        if self.dying.swap(true, Ordering::SeqCst) {
            return;
        }

        self.state.advance(WorkerState::ShuttingDown);

        match &error {
            Some(cause) => self
                .logger
                .error("Error, shutting down", Some(&cause.to_string())),
            None => self.logger.log("Shutting down on signal"),
        }

        let closed = self.queue.close(self.shutdown_timeout).await;
        self.state.advance(WorkerState::Terminated);

        match closed {
            Ok(()) => self.process.exit(if error.is_some() { 1 } else { 0 }),
            Err(cause) => {
                self.logger
                    .error("Failed to shut down gracefully", Some(&cause.to_string()));
                self.process.exit(8);
            }
        }
    }
}
