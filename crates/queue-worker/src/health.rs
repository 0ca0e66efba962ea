use crate::logger::Logger;
use crate::process::ProcessControl;
use queue_worker_core::JobQueue;
use std::sync::Arc;

/// Formats and logs one health line per invocation.
pub struct HealthReporter {
    queue: Arc<dyn JobQueue>,
    logger: Arc<dyn Logger>,
    process: Arc<dyn ProcessControl>,
}

impl HealthReporter {
    pub(crate) fn new(
        queue: Arc<dyn JobQueue>,
        logger: Arc<dyn Logger>,
        process: Arc<dyn ProcessControl>,
    ) -> Self {
        HealthReporter {
            queue,
            logger,
            process,
        }
    }

    /// Pull a snapshot and uptime, then log them in fixed order.
    ///
    /// A transient queue error is logged and swallowed; periodic cycles
    /// must never crash the worker.
    pub async fn report(&self) {
        let uptime = self.process.uptime().as_secs();
        match self.queue.check_health().await {
            Ok(health) => self.logger.log(&format!(
                "waiting: {}, active: {}, succeeded: {}, failed: {}, delayed: {}, uptime: {}",
                health.waiting,
                health.active,
                health.succeeded,
                health.failed,
                health.delayed,
                uptime,
            )),
            Err(cause) => self
                .logger
                .error("Health check failed", Some(&cause.to_string())),
        }
    }
}
