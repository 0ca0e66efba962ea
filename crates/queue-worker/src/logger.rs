/// Leveled, fire-and-forget logging collaborator.
///
/// Implementations must not block or fail the caller; the worker logs from
/// its periodic cycles and from the shutdown path.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
    fn error(&self, message: &str, detail: Option<&str>);
}

/// Default logger: forwards to the ambient `tracing` subscriber.
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn error(&self, message: &str, detail: Option<&str>) {
        match detail {
            Some(detail) => tracing::error!("{}: {}", message, detail),
            None => tracing::error!("{}", message),
        }
    }
}
