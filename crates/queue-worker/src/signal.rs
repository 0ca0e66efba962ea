use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Callback invoked once per trigger: `Some(message)` for a captured fault,
/// `None` for a clean termination request.
pub type StopFn = Arc<dyn Fn(Option<String>) + Send + Sync>;

/// Source of termination triggers: uncaught faults and process signals.
///
/// Pure routing, no recovery or suppression logic. Injected so tests and
/// embedders can substitute doubles instead of process-wide hooks.
pub trait SignalSource: Send + Sync {
    /// Install the hooks, routing every trigger into `on_stop`.
    /// Repeated calls are no-ops.
    fn install(&self, on_stop: StopFn);
}

/// Process-backed triggers: a panic hook plus SIGINT and SIGTERM.
pub struct ProcessSignals {
    installed: AtomicBool,
}

impl ProcessSignals {
    pub fn new() -> Self {
        ProcessSignals {
            installed: AtomicBool::new(false),
        }
    }
}

impl Default for ProcessSignals {
    fn default() -> Self {
        ProcessSignals::new()
    }
}

impl SignalSource for ProcessSignals {
    fn install(&self, on_stop: StopFn) {
        if self.installed.swap(true, Ordering::SeqCst) {
            return;
        }

        // Uncaught fault: the panic hook runs in sync context, so it only
        // forwards the message over a channel; a listener task drives the
        // actual stop.
        let (fault_tx, mut fault_rx) = mpsc::unbounded_channel::<String>();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = fault_tx.send(info.to_string());
            previous(info);
        }));

        let stop = on_stop.clone();
        tokio::spawn(async move {
            if let Some(message) = fault_rx.recv().await {
                stop(Some(message));
            }
        });

        let stop = on_stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("SIGINT received");
                stop(None);
            }
        });

        #[cfg(unix)]
        {
            let stop = on_stop;
            tokio::spawn(async move {
                use tokio::signal::unix::{signal, SignalKind};
                match signal(SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        if sigterm.recv().await.is_some() {
                            debug!("SIGTERM received");
                            stop(None);
                        }
                    }
                    Err(e) => debug!("failed to install SIGTERM handler: {}", e),
                }
            });
        }
    }
}
