use std::fmt;
use std::time::Duration;

use tracing::error;

/// An unbounded, multi-producer, multi-consumer FIFO queue over a `kanal` channel.
///
/// Backs both the wait queue and the done queue. The queue owns both halves, so
/// the channel never closes while it is alive. `push` never blocks. Consumers
/// either take an item right away with `try_pop` or wait for one with `pop`,
/// optionally bounded by a timeout. Items come out in push order; which of
/// several racing consumers receives a given item is unspecified.
pub(crate) struct TaskQueue<T> {
  tx: kanal::AsyncSender<T>,
  rx: kanal::AsyncReceiver<T>,
}

impl<T> fmt::Debug for TaskQueue<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TaskQueue")
      .field("len", &self.len())
      .finish_non_exhaustive()
  }
}

impl<T> TaskQueue<T> {
  pub(crate) fn new() -> Self {
    let (tx, rx) = kanal::unbounded_async();
    Self { tx, rx }
  }

  /// Appends an item at the back of the queue.
  pub(crate) fn push(&self, item: T) {
    // An unbounded channel with a live receiver always has room.
    match self.tx.try_send(item) {
      Ok(true) => {}
      Ok(false) => error!("Unbounded queue refused an item; it was dropped."),
      Err(send_error) => error!("Queue channel closed unexpectedly: {:?}", send_error),
    }
  }

  /// Takes the oldest item without waiting.
  pub(crate) fn try_pop(&self) -> Option<T> {
    self.rx.try_recv().ok().flatten()
  }

  /// Waits until an item is available and takes it.
  ///
  /// Returns `None` only if `timeout` is given and elapses first.
  pub(crate) async fn pop(&self, timeout: Option<Duration>) -> Option<T> {
    match timeout {
      Some(limit) => tokio::time::timeout(limit, self.rx.recv()).await.ok()?.ok(),
      None => self.rx.recv().await.ok(),
    }
  }

  /// Removes every queued item at once, returning them in FIFO order.
  pub(crate) fn take_all(&self) -> Vec<T> {
    std::iter::from_fn(|| self.try_pop()).collect()
  }

  pub(crate) fn len(&self) -> usize {
    self.rx.len()
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.rx.is_empty()
  }
}
