use crate::logger::{Logger, TracingLogger};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_STALLED_CHECK_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Partial configuration overlay: every unset field falls back to its
/// documented default when the worker resolves it.
#[derive(Clone, Default, Deserialize)]
pub struct WorkerOptions {
    pub stalled_check_interval_ms: Option<u64>,
    pub shutdown_timeout_ms: Option<u64>,
    pub concurrency: Option<usize>,
    /// Logger is a capability, not data, so it never comes from a file.
    #[serde(skip)]
    pub logger: Option<Arc<dyn Logger>>,
}

impl WorkerOptions {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let options: WorkerOptions = serde_yaml::from_str(&contents)?;
        Ok(options)
    }
}

/// Resolved worker configuration. Built once at construction, never mutated.
#[derive(Clone)]
pub struct WorkerConfig {
    pub stalled_check_interval: Duration,
    pub shutdown_timeout: Duration,
    pub concurrency: usize,
    pub logger: Arc<dyn Logger>,
}

impl WorkerConfig {
    /// Overlay `options` onto the defaults.
    pub fn resolve(options: WorkerOptions) -> Self {
        WorkerConfig {
            stalled_check_interval: Duration::from_millis(
                options
                    .stalled_check_interval_ms
                    .unwrap_or(DEFAULT_STALLED_CHECK_INTERVAL_MS),
            ),
            shutdown_timeout: Duration::from_millis(
                options
                    .shutdown_timeout_ms
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_MS),
            ),
            concurrency: options.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            logger: options.logger.unwrap_or_else(|| Arc::new(TracingLogger)),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig::resolve(WorkerOptions::default())
    }
}
