use std::time::{Duration, Instant};

/// Process-level capabilities the worker needs: uptime and termination.
///
/// Injected at construction so tests can assert on exit codes and pin the
/// uptime clock without touching the real process.
pub trait ProcessControl: Send + Sync {
    fn uptime(&self) -> Duration;
    fn exit(&self, code: i32);
}

/// The real process: uptime measured from construction, `exit` terminates.
pub struct SystemProcess {
    started: Instant,
}

impl SystemProcess {
    pub fn new() -> Self {
        SystemProcess {
            started: Instant::now(),
        }
    }
}

impl Default for SystemProcess {
    fn default() -> Self {
        SystemProcess::new()
    }
}

impl ProcessControl for SystemProcess {
    fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    fn exit(&self, code: i32) {
        std::process::exit(code);
    }
}
