use crate::error::PoolError;
use crate::running::RunningSet;
use crate::task::{CompletedTask, PendingTask, TaskLabel, TaskWork};
use crate::task_queue::TaskQueue;

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle as TokioHandle;
use tracing::{debug, error, info_span, trace, warn, Instrument};

/// State shared between the pool handle and every execution unit it spawns.
///
/// The wait queue, done queue and running set are each safe for concurrent
/// access on their own. `schedule_lock` only serializes admission decisions and
/// is never held while a task's work runs.
pub(crate) struct PoolShared<R: Send + 'static> {
  pub(crate) pool_name: Arc<String>,
  pub(crate) capacity: AtomicUsize,
  pub(crate) enabled: AtomicBool,
  pub(crate) wait_queue: TaskQueue<PendingTask<R>>,
  pub(crate) done_queue: TaskQueue<CompletedTask<R>>,
  pub(crate) running: RunningSet,
  schedule_lock: Mutex<()>,
  tokio_handle: TokioHandle,
}

impl<R: Send + 'static> PoolShared<R> {
  pub(crate) fn new(capacity: usize, tokio_handle: TokioHandle, pool_name: &str) -> Self {
    Self {
      pool_name: Arc::new(pool_name.to_string()),
      capacity: AtomicUsize::new(capacity),
      enabled: AtomicBool::new(true),
      wait_queue: TaskQueue::new(),
      done_queue: TaskQueue::new(),
      running: RunningSet::new(),
      schedule_lock: Mutex::new(()),
      tokio_handle,
    }
  }

  /// Admits waiting tasks while the pool is enabled and below capacity.
  ///
  /// Called by submitters, by lifecycle operations and by every execution unit
  /// as it finishes, so freed capacity goes straight to the next waiting task.
  pub(crate) fn try_schedule(self: &Arc<Self>) {
    let _schedule_guard = self.schedule_lock.lock();

    if !self.enabled.load(Ordering::SeqCst) {
      trace!(pool_name = %*self.pool_name, waiting = self.wait_queue.len(), "Schedule: pool disabled, no admissions.");
      return;
    }

    while self.running.len() < self.capacity.load(Ordering::SeqCst) {
      let Some(task) = self.wait_queue.try_pop() else {
        break;
      };
      self.admit(task);
    }
  }

  /// Empties the wait queue under the scheduling lock, so no admission can be
  /// halfway between popping a task and counting it as running.
  pub(crate) fn discard_waiting(&self) -> Vec<PendingTask<R>> {
    let _schedule_guard = self.schedule_lock.lock();
    self.wait_queue.take_all()
  }

  /// Returns `true` if no task is waiting, running or done.
  ///
  /// Holds the scheduling lock so that no task is between the wait queue and
  /// the running set. Stages are read in lifecycle order; a unit publishes its
  /// result before leaving the running set, so no task can slip past unseen.
  pub(crate) fn is_idle(&self) -> bool {
    let _schedule_guard = self.schedule_lock.lock();
    self.wait_queue.is_empty() && self.running.is_empty() && self.done_queue.is_empty()
  }

  /// Must be called with `schedule_lock` held.
  fn admit(self: &Arc<Self>, task: PendingTask<R>) {
    let PendingTask { task_id, label, work } = task;

    // The handle goes in before the unit starts, so a fast unit cannot
    // remove itself before it was ever counted.
    self.running.add(task_id, label.clone());
    debug!(
      pool_name = %*self.pool_name,
      %task_id,
      label = ?label,
      running = self.running.len(),
      capacity = self.capacity.load(Ordering::SeqCst),
      "Admitted task. Spawning execution unit."
    );

    let span = info_span!("pool_task", pool_name = %*self.pool_name, %task_id, label = ?label);
    let shared = self.clone();
    self
      .tokio_handle
      .spawn(async move { shared.run_unit(task_id, label, work).await }.instrument(span));
  }

  async fn run_unit(self: Arc<Self>, task_id: u64, label: Option<TaskLabel>, work: TaskWork<R>) {
    let outcome = match work {
      TaskWork::Future(future) => match AssertUnwindSafe(future).catch_unwind().await {
        Ok(value) => Ok(value),
        Err(_panic_payload) => {
          error!(pool_name = %*self.pool_name, %task_id, "Task panicked during execution.");
          Err(PoolError::TaskPanicked)
        }
      },
      TaskWork::Blocking(function) => match self.tokio_handle.spawn_blocking(function).await {
        Ok(value) => Ok(value),
        Err(join_error) if join_error.is_panic() => {
          error!(pool_name = %*self.pool_name, %task_id, "Blocking task panicked during execution.");
          Err(PoolError::TaskPanicked)
        }
        Err(join_error) => {
          warn!(pool_name = %*self.pool_name, %task_id, "Blocking task did not run to completion: {}", join_error);
          Err(PoolError::TaskAborted)
        }
      },
    };

    // Publish the result before giving up the running slot, so the pool never
    // looks empty while this task's result is in flight.
    self.done_queue.push(CompletedTask {
      task_id,
      label,
      outcome,
    });

    match self.running.remove(task_id) {
      Some(entry) => debug!(
        pool_name = %*self.pool_name,
        %task_id,
        label = ?entry.label,
        elapsed_ms = entry.started_at.elapsed().as_millis() as u64,
        "Execution unit finished, result queued."
      ),
      None => warn!(pool_name = %*self.pool_name, %task_id, "Execution unit finished but was not in the running set."),
    }

    self.try_schedule();
  }
}
