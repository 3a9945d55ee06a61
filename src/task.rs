use crate::error::PoolError;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// A descriptive label for a task, typically a `String`.
pub type TaskLabel = String;

/// The type of future that the pool executes.
/// It must be `Send` and `'static`, and produce a result of type `R`.
pub type TaskToExecute<R> = Pin<Box<dyn Future<Output = R> + Send + 'static>>;

/// A synchronous unit of work, run on the runtime's blocking thread pool.
pub type BlockingTask<R> = Box<dyn FnOnce() -> R + Send + 'static>;

/// The work carried by a queued task.
pub(crate) enum TaskWork<R: Send + 'static> {
  Future(TaskToExecute<R>),
  Blocking(BlockingTask<R>),
}

/// Internal representation of a task sitting in the wait queue.
pub(crate) struct PendingTask<R: Send + 'static> {
  pub(crate) task_id: u64,
  pub(crate) label: Option<TaskLabel>,
  pub(crate) work: TaskWork<R>,
}

impl<R: Send + 'static> fmt::Debug for PendingTask<R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let kind = match self.work {
      TaskWork::Future(_) => "future",
      TaskWork::Blocking(_) => "blocking",
    };
    f.debug_struct("PendingTask")
      .field("task_id", &self.task_id)
      .field("label", &self.label)
      .field("kind", &kind)
      .finish()
  }
}

/// A finished task waiting in the done queue to be reaped.
///
/// `outcome` is `Err(PoolError::TaskPanicked)` when the task's work panicked;
/// otherwise it holds the value the work returned.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTask<R> {
  pub task_id: u64,
  pub label: Option<TaskLabel>,
  pub outcome: Result<R, PoolError>,
}

impl<R> CompletedTask<R> {
  /// Splits the completion into its `(label, outcome)` pair.
  pub fn into_parts(self) -> (Option<TaskLabel>, Result<R, PoolError>) {
    (self.label, self.outcome)
  }
}
