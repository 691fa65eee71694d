// src/watch/event_handler.rs

//! Turns raw `notify` events into debounced task triggers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Event, EventKind};
use tracing::{debug, trace};

use crate::engine::TaskName;
use crate::fs::FileSystem;
use crate::watch::binding::{tasks_for_path, WatchBinding};
use crate::watch::cache::{ContentCache, ContentChange};
use crate::watch::path_utils::under_root;

/// Pure (apart from reading files through [`FileSystem`]) event filter.
///
/// For each event path it:
/// 1. finds the bound tasks, ignoring paths no binding covers,
/// 2. drops the path if its content hash is unchanged,
/// 3. adds the tasks to the pending set and pushes the deadline out by the
///    debounce window.
///
/// When the deadline passes with no further events the caller
/// [`flush`](ChangeFilter::flush)es the pending tasks.
#[derive(Debug)]
pub struct ChangeFilter {
    root: PathBuf,
    bindings: Vec<WatchBinding>,
    fs: Arc<dyn FileSystem>,
    cache: ContentCache,
    window: Duration,
    pending: Vec<TaskName>,
    deadline: Option<Instant>,
}

impl ChangeFilter {
    pub fn new(
        root: impl Into<PathBuf>,
        bindings: Vec<WatchBinding>,
        fs: Arc<dyn FileSystem>,
        window: Duration,
    ) -> Self {
        let root = root.into();
        let mut cache = ContentCache::new();
        cache.prime(fs.as_ref(), &root, &bindings);
        Self {
            root,
            bindings,
            fs,
            cache,
            window,
            pending: Vec::new(),
            deadline: None,
        }
    }

    pub fn bindings(&self) -> &[WatchBinding] {
        &self.bindings
    }

    /// When pending triggers become due, if any are pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn pending(&self) -> &[TaskName] {
        &self.pending
    }

    /// Feed one event. Returns true if it added to the pending set or moved
    /// the deadline.
    pub fn record_event(&mut self, event: &Event, now: Instant) -> bool {
        if matches!(event.kind, EventKind::Access(_)) {
            trace!(?event, "ignoring access event");
            return false;
        }

        let mut relevant = false;
        for raw in &event.paths {
            let Some(path) = under_root(&self.root, raw) else {
                trace!(path = ?raw, "event outside project root");
                continue;
            };

            let tasks = tasks_for_path(&self.bindings, &self.root, &path);
            if tasks.is_empty() {
                continue;
            }

            match self.cache.observe(self.fs.as_ref(), &path) {
                ContentChange::Unchanged => {
                    debug!(path = ?path, "content unchanged; suppressing trigger");
                    continue;
                }
                change => debug!(path = ?path, ?change, ?tasks, "source changed"),
            }

            for task in tasks {
                if !self.pending.contains(&task) {
                    self.pending.push(task);
                }
            }
            relevant = true;
        }

        if relevant {
            self.deadline = Some(now + self.window);
        }
        relevant
    }

    /// Take every pending task and clear the deadline.
    pub fn flush(&mut self) -> Vec<TaskName> {
        self.deadline = None;
        std::mem::take(&mut self.pending)
    }
}
