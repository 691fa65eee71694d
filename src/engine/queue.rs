// src/engine/queue.rs

use std::collections::VecDeque;

use tracing::debug;

use super::TaskName;

/// Rebuilds waiting for the active run to finish.
///
/// Semantics:
/// - Each task is queued at most once. Further triggers for a task that is
///   already waiting are absorbed, so a burst of saves costs one rebuild.
/// - Tasks leave the queue in the order they were first triggered.
#[derive(Debug, Default)]
pub struct TriggerQueue {
    pending: VecDeque<TaskName>,
}

impl TriggerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are no queued triggers.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn contains(&self, task: &str) -> bool {
        self.pending.iter().any(|t| t == task)
    }

    /// Record a trigger. Returns false if the task was already pending.
    pub fn record_trigger(&mut self, task: &str) -> bool {
        if self.contains(task) {
            debug!(task, "coalesced trigger into pending rebuild");
            return false;
        }
        self.pending.push_back(task.to_string());
        debug!(task, pending = self.pending.len(), "queued rebuild");
        true
    }

    /// Take the next pending task, if any.
    pub fn pop_next(&mut self) -> Option<TaskName> {
        let next = self.pending.pop_front();
        if let Some(task) = &next {
            debug!(task = %task, remaining = self.pending.len(), "dequeued rebuild");
        }
        next
    }

    /// Snapshot of pending tasks in dequeue order.
    pub fn pending(&self) -> Vec<TaskName> {
        self.pending.iter().cloned().collect()
    }
}
