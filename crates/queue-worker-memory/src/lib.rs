mod queue;

pub use queue::MemoryQueue;
