// src/watch/binding.rs

use std::path::{Path, PathBuf};

use crate::engine::TaskName;
use crate::matcher::GlobPattern;

/// Glob patterns bound to the task that rebuilds them.
///
/// Bindings are independent: two bindings may watch overlapping patterns
/// and each fires its own task.
#[derive(Debug, Clone)]
pub struct WatchBinding {
    task: TaskName,
    patterns: Vec<GlobPattern>,
}

impl WatchBinding {
    pub fn new(task: impl Into<TaskName>, patterns: Vec<GlobPattern>) -> Self {
        Self {
            task: task.into(),
            patterns,
        }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn patterns(&self) -> &[GlobPattern] {
        &self.patterns
    }

    pub fn matches(&self, root: &Path, path: &Path) -> bool {
        self.patterns.iter().any(|p| p.matches_path(root, path))
    }

    /// Directories that must be watched to see every matching file.
    pub fn base_dirs(&self, root: &Path) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.patterns.iter().map(|p| p.base_dir(root)).collect();
        dirs.sort();
        dirs.dedup();
        dirs
    }
}

/// Tasks bound to `path`, in binding order, each listed once.
pub fn tasks_for_path(bindings: &[WatchBinding], root: &Path, path: &Path) -> Vec<TaskName> {
    let mut tasks: Vec<TaskName> = Vec::new();
    for binding in bindings {
        if binding.matches(root, path) && !tasks.iter().any(|t| t == binding.task()) {
            tasks.push(binding.task().to_string());
        }
    }
    tasks
}
