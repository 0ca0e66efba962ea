pub mod config;
pub mod health;
pub mod logger;
pub mod monitor;
pub mod process;
pub mod shutdown;
pub mod signal;
pub mod worker;

pub use config::{WorkerConfig, WorkerOptions};
pub use health::HealthReporter;
pub use logger::{Logger, TracingLogger};
pub use monitor::StalledJobMonitor;
pub use process::{ProcessControl, SystemProcess};
pub use shutdown::{ShutdownCoordinator, WorkerState};
pub use signal::{ProcessSignals, SignalSource, StopFn};
pub use worker::Worker;

#[cfg(test)]
pub(crate) mod test_support;
