mod error;
mod health;
mod job;
mod queue;

pub use error::{QueueError, Result};
pub use health::HealthSnapshot;
pub use job::{Job, JobId, JobPayload, ProgressSink};
pub use queue::{JobHandler, JobQueue, JobResult, StalledCallback};
