use crate::error::PoolError;
use crate::scheduler::PoolShared;
use crate::task::{BlockingTask, CompletedTask, PendingTask, TaskLabel, TaskToExecute, TaskWork};

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle as TokioHandle;
use tracing::{debug, info, trace};

lazy_static::lazy_static! {
  static ref NEXT_POOL_TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(0);
}

/// Interval `drain` sleeps between checks of the running set, unless told otherwise.
pub const DEFAULT_DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A bounded pool of concurrently executing tasks.
///
/// Tasks are added to a wait queue and admitted as execution units while the
/// pool is enabled and fewer than `capacity` units are live. Each admitted task
/// gets its own freshly spawned Tokio task. Whatever the task returns is pushed
/// onto a done queue, from which callers reap `CompletedTask`s at their
/// convenience. Running tasks are never interrupted: disabling, draining and
/// shrinking the capacity only affect future admissions.
///
/// Dropping the pool disables it. Units already running finish on their own.
pub struct TaskPool<R: Send + 'static> {
  shared: Arc<PoolShared<R>>,
}

impl<R: Send + 'static> TaskPool<R> {
  /// Creates an enabled pool that runs at most `capacity` tasks at once, spawning
  /// them on `tokio_handle`.
  pub fn new(capacity: usize, tokio_handle: TokioHandle, pool_name: &str) -> Self {
    info!(pool_name = %pool_name, %capacity, "Creating task pool.");
    Self {
      shared: Arc::new(PoolShared::new(capacity, tokio_handle, pool_name)),
    }
  }

  pub fn name(&self) -> &str {
    &self.shared.pool_name
  }

  /// Queues an async task and triggers scheduling. Returns the task's id without
  /// waiting for it to be admitted or to complete.
  pub fn add(&self, label: Option<TaskLabel>, task_future: TaskToExecute<R>) -> u64 {
    self.enqueue(label, TaskWork::Future(task_future))
  }

  /// Queues a synchronous function, run on the runtime's blocking threads once
  /// admitted. Suited to work that blocks, such as waiting on a child process.
  pub fn add_blocking<F>(&self, label: Option<TaskLabel>, function: F) -> u64
  where
    F: FnOnce() -> R + Send + 'static,
  {
    let function: BlockingTask<R> = Box::new(function);
    self.enqueue(label, TaskWork::Blocking(function))
  }

  fn enqueue(&self, label: Option<TaskLabel>, work: TaskWork<R>) -> u64 {
    let task_id = NEXT_POOL_TASK_ID_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
    debug!(pool_name = %self.shared.pool_name, %task_id, label = ?label, "Adding task to wait queue.");

    self.shared.wait_queue.push(PendingTask { task_id, label, work });
    self.shared.try_schedule();
    task_id
  }

  /// Waits for the next completed task and removes it from the done queue.
  ///
  /// With `timeout` set, gives up with `PoolError::ReapTimedOut` once it elapses.
  /// With `None`, waits for as long as it takes.
  pub async fn reap(&self, timeout: Option<Duration>) -> Result<CompletedTask<R>, PoolError> {
    match self.shared.done_queue.pop(timeout).await {
      Some(completed) => {
        trace!(pool_name = %self.shared.pool_name, task_id = completed.task_id, "Reaped task.");
        Ok(completed)
      }
      None => Err(PoolError::ReapTimedOut),
    }
  }

  /// Removes the next completed task without waiting.
  ///
  /// # Errors
  /// Returns `PoolError::NothingToReap` if the done queue is empty.
  pub fn try_reap(&self) -> Result<CompletedTask<R>, PoolError> {
    self.shared.done_queue.try_pop().ok_or(PoolError::NothingToReap)
  }

  /// Enables scheduling and immediately admits any tasks that queued up while
  /// the pool was disabled, up to capacity.
  pub fn enable(&self) {
    self.shared.enabled.store(true, AtomicOrdering::SeqCst);
    info!(pool_name = %self.shared.pool_name, waiting = self.waiting_count(), "Pool enabled.");
    self.shared.try_schedule();
  }

  /// Stops further admissions. Running tasks are unaffected.
  pub fn disable(&self) {
    self.shared.enabled.store(false, AtomicOrdering::SeqCst);
    info!(pool_name = %self.shared.pool_name, running = self.running_count(), "Pool disabled.");
  }

  /// Disables the pool, discards every waiting task without running it, then
  /// waits for the running set to empty, checking every `poll_interval`.
  ///
  /// The pool stays disabled afterwards; call `enable` to resume scheduling.
  pub async fn drain(&self, poll_interval: Duration) {
    self.disable();

    let discarded = self.shared.discard_waiting();
    info!(
      pool_name = %self.shared.pool_name,
      discarded = discarded.len(),
      running = self.running_count(),
      "Draining pool: waiting tasks discarded."
    );
    for task in &discarded {
      trace!(pool_name = %self.shared.pool_name, task_id = task.task_id, label = ?task.label, "Discarded waiting task.");
    }
    drop(discarded);

    while !self.shared.running.is_empty() {
      tokio::time::sleep(poll_interval).await;
    }
    info!(pool_name = %self.shared.pool_name, done = self.done_count(), "Pool drained.");
  }

  /// Replaces the capacity and triggers scheduling. A larger capacity admits
  /// waiting tasks right away; a smaller one takes effect only as running tasks
  /// finish.
  pub fn set_capacity(&self, capacity: usize) {
    let previous = self.shared.capacity.swap(capacity, AtomicOrdering::SeqCst);
    info!(pool_name = %self.shared.pool_name, %previous, %capacity, "Pool capacity changed.");
    self.shared.try_schedule();
  }

  pub fn capacity(&self) -> usize {
    self.shared.capacity.load(AtomicOrdering::SeqCst)
  }

  pub fn is_enabled(&self) -> bool {
    self.shared.enabled.load(AtomicOrdering::SeqCst)
  }

  /// Number of tasks waiting to be admitted.
  pub fn waiting_count(&self) -> usize {
    self.shared.wait_queue.len()
  }

  /// Number of live execution units.
  pub fn running_count(&self) -> usize {
    self.shared.running.len()
  }

  /// Number of completed tasks waiting to be reaped.
  pub fn done_count(&self) -> usize {
    self.shared.done_queue.len()
  }

  pub fn has_waiting(&self) -> bool {
    !self.shared.wait_queue.is_empty()
  }

  pub fn has_running(&self) -> bool {
    !self.shared.running.is_empty()
  }

  pub fn has_done(&self) -> bool {
    !self.shared.done_queue.is_empty()
  }

  /// Returns `true` if no task is waiting, running or done.
  pub fn is_empty(&self) -> bool {
    self.shared.is_idle()
  }
}

impl<R: Send + 'static> Drop for TaskPool<R> {
  fn drop(&mut self) {
    // Stop admissions only. Units still running hold their own reference to the
    // shared state and finish on their own; nothing is awaited or drained here.
    self.shared.enabled.store(false, AtomicOrdering::SeqCst);
    info!(
      pool_name = %*self.shared.pool_name,
      waiting = self.shared.wait_queue.len(),
      running = self.shared.running.len(),
      "TaskPool dropped. Scheduling disabled."
    );
  }
}
