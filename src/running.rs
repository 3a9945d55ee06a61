use crate::task::TaskLabel;

use std::time::Instant;

use dashmap::DashMap;

/// Bookkeeping kept for one live execution unit.
#[derive(Debug, Clone)]
pub(crate) struct RunningEntry {
  pub(crate) label: Option<TaskLabel>,
  pub(crate) started_at: Instant,
}

/// The set of live execution units, keyed by task id.
///
/// Its size is the pool's live concurrency. It records nothing about what the
/// tasks are doing; membership is the only signal the scheduler reads.
#[derive(Debug, Default)]
pub(crate) struct RunningSet {
  entries: DashMap<u64, RunningEntry>,
}

impl RunningSet {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub(crate) fn add(&self, task_id: u64, label: Option<TaskLabel>) {
    self.entries.insert(
      task_id,
      RunningEntry {
        label,
        started_at: Instant::now(),
      },
    );
  }

  /// Removes a unit's handle, returning its entry if it was present.
  pub(crate) fn remove(&self, task_id: u64) -> Option<RunningEntry> {
    self.entries.remove(&task_id).map(|(_, entry)| entry)
  }

  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
