use thiserror::Error;

/// Errors that can occur within the `futures_taskpool` pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
  #[error("No results to reap: the done queue is empty")]
  NothingToReap,

  #[error("No results to reap: timed out waiting for a task to complete")]
  ReapTimedOut,

  #[error("Submitted task panicked")]
  TaskPanicked,

  #[error("Submitted task was aborted by the runtime before completing")]
  TaskAborted,
}
