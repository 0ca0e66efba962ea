use crate::health::HealthReporter;
use queue_worker_core::{JobQueue, StalledCallback};
use std::sync::Arc;
use std::time::Duration;

/// Wires the stalled-job recovery cadence to the queue's own check
/// primitive, piggybacking health reporting onto the same cycle.
///
/// Stalled-job detection itself lives in the queue engine; this component
/// only supplies cadence and the per-cycle callback, so the two periodic
/// concerns share one timer.
pub struct StalledJobMonitor {
    queue: Arc<dyn JobQueue>,
}

impl StalledJobMonitor {
    pub(crate) fn new(queue: Arc<dyn JobQueue>) -> Self {
        StalledJobMonitor { queue }
    }

    pub fn start(&self, interval: Duration, reporter: Arc<HealthReporter>) {
        let on_check: StalledCallback = Arc::new(move || {
            let reporter = reporter.clone();
            Box::pin(async move {
                reporter.report().await;
            })
        });
        self.queue.check_stalled_jobs(interval, on_check);
    }
}
