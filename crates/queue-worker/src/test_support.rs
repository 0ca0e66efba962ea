//! Hand-rolled doubles shared by the unit tests.

use crate::process::ProcessControl;
use crate::signal::{SignalSource, StopFn};
use async_trait::async_trait;
use parking_lot::Mutex;
use queue_worker_core::{HealthSnapshot, JobHandler, JobQueue, QueueError, StalledCallback};
use std::sync::Arc;
use std::time::Duration;

/// Calls observed by the recording queue, in invocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueCall {
    Ready,
    CheckStalled { interval_ms: u64 },
    Process { concurrency: usize },
    CheckHealth,
    Close { timeout_ms: u64 },
}

/// A queue double that records every call and lets tests script results.
pub struct RecordingQueue {
    calls: Mutex<Vec<QueueCall>>,
    health: Mutex<HealthSnapshot>,
    health_error: Mutex<Option<QueueError>>,
    close_error: Mutex<Option<QueueError>>,
    stalled_callback: Mutex<Option<StalledCallback>>,
    handler: Mutex<Option<Arc<dyn JobHandler>>>,
}

impl RecordingQueue {
    pub fn new() -> Self {
        RecordingQueue {
            calls: Mutex::new(Vec::new()),
            health: Mutex::new(HealthSnapshot::default()),
            health_error: Mutex::new(None),
            close_error: Mutex::new(None),
            stalled_callback: Mutex::new(None),
            handler: Mutex::new(None),
        }
    }

    pub fn set_health(&self, health: HealthSnapshot) {
        *self.health.lock() = health;
    }

    pub fn fail_health(&self, error: QueueError) {
        *self.health_error.lock() = Some(error);
    }

    pub fn fail_close(&self, error: QueueError) {
        *self.close_error.lock() = Some(error);
    }

    pub fn calls(&self) -> Vec<QueueCall> {
        self.calls.lock().clone()
    }

    pub fn stalled_intervals(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                QueueCall::CheckStalled { interval_ms } => Some(interval_ms),
                _ => None,
            })
            .collect()
    }

    pub fn close_timeouts(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                QueueCall::Close { timeout_ms } => Some(timeout_ms),
                _ => None,
            })
            .collect()
    }

    pub fn handler(&self) -> Option<Arc<dyn JobHandler>> {
        self.handler.lock().clone()
    }

    /// Drive one stalled-check cycle by hand; the double owns no timer.
    pub async fn fire_stalled_check(&self) {
        let callback = self.stalled_callback.lock().clone();
        if let Some(callback) = callback {
            callback().await;
        }
    }
}

#[async_trait]
impl JobQueue for RecordingQueue {
    async fn ready(&self) -> Result<(), QueueError> {
        self.calls.lock().push(QueueCall::Ready);
        Ok(())
    }

    fn check_stalled_jobs(&self, interval: Duration, on_check: StalledCallback) {
        self.calls.lock().push(QueueCall::CheckStalled {
            interval_ms: interval.as_millis() as u64,
        });
        *self.stalled_callback.lock() = Some(on_check);
    }

    fn process(&self, concurrency: usize, handler: Arc<dyn JobHandler>) {
        self.calls.lock().push(QueueCall::Process { concurrency });
        *self.handler.lock() = Some(handler);
    }

    async fn check_health(&self) -> Result<HealthSnapshot, QueueError> {
        self.calls.lock().push(QueueCall::CheckHealth);
        if let Some(error) = self.health_error.lock().take() {
            return Err(error);
        }
        Ok(*self.health.lock())
    }

    async fn close(&self, timeout: Duration) -> Result<(), QueueError> {
        self.calls.lock().push(QueueCall::Close {
            timeout_ms: timeout.as_millis() as u64,
        });
        if let Some(error) = self.close_error.lock().take() {
            return Err(error);
        }
        Ok(())
    }
}

/// Logger double capturing plain lines and (message, detail) errors.
pub struct RecordingLogger {
    lines: Mutex<Vec<String>>,
    errors: Mutex<Vec<(String, Option<String>)>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        RecordingLogger {
            lines: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn errors(&self) -> Vec<(String, Option<String>)> {
        self.errors.lock().clone()
    }
}

impl crate::logger::Logger for RecordingLogger {
    fn log(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }

    fn error(&self, message: &str, detail: Option<&str>) {
        self.errors
            .lock()
            .push((message.to_string(), detail.map(str::to_string)));
    }
}

/// Process double with a pinned uptime and recorded exit codes.
pub struct FakeProcess {
    uptime_secs: u64,
    exits: Mutex<Vec<i32>>,
}

impl FakeProcess {
    pub fn new(uptime_secs: u64) -> Self {
        FakeProcess {
            uptime_secs,
            exits: Mutex::new(Vec::new()),
        }
    }

    pub fn exits(&self) -> Vec<i32> {
        self.exits.lock().clone()
    }
}

impl ProcessControl for FakeProcess {
    fn uptime(&self) -> Duration {
        Duration::from_secs(self.uptime_secs)
    }

    fn exit(&self, code: i32) {
        self.exits.lock().push(code);
    }
}

/// Signal double that captures the stop callback for manual triggering.
pub struct CapturedSignals {
    installs: Mutex<Vec<StopFn>>,
}

impl CapturedSignals {
    pub fn new() -> Self {
        CapturedSignals {
            installs: Mutex::new(Vec::new()),
        }
    }

    pub fn install_count(&self) -> usize {
        self.installs.lock().len()
    }

    pub fn trigger(&self, fault: Option<String>) {
        let hooks = self.installs.lock().clone();
        if let Some(on_stop) = hooks.first() {
            on_stop(fault);
        }
    }
}

impl SignalSource for CapturedSignals {
    fn install(&self, on_stop: StopFn) {
        self.installs.lock().push(on_stop);
    }
}
