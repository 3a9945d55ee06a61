//! A Tokio-based bounded task pool: submit labeled work without waiting, run
//! up to `capacity` tasks at once, and reap completed results whenever
//! convenient.

mod error;
mod manager;
mod running;
mod scheduler;
mod task;
mod task_queue;

pub use error::PoolError;
pub use manager::{TaskPool, DEFAULT_DRAIN_POLL_INTERVAL};
pub use task::{BlockingTask, CompletedTask, TaskLabel, TaskToExecute};
