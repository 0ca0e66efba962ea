use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Graceful shutdown did not complete within {timeout_ms}ms")]
    ShutdownTimeout { timeout_ms: u64 },

    #[error("Transient queue error: {0}")]
    Transient(String),

    #[error("Queue is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, QueueError>;
