use serde::{Deserialize, Serialize};

/// Point-in-time counts of jobs in each lifecycle state.
///
/// Produced on demand by the queue engine; immutable once read. Uptime is
/// not part of the snapshot, the reporter obtains it from the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Jobs waiting to be dispatched
    pub waiting: u64,
    /// Jobs currently being handled
    pub active: u64,
    /// Jobs that completed successfully
    pub succeeded: u64,
    /// Jobs whose handler reported failure
    pub failed: u64,
    /// Jobs scheduled for a later time
    pub delayed: u64,
}
