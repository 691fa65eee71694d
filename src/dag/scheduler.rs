// src/dag/scheduler.rs

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::dag::registry::TaskRegistry;
use crate::engine::TaskName;
use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: u64,
    pub target: TaskName,
    /// Tasks in the order they were executed (composites included).
    pub executed: Vec<TaskName>,
    pub elapsed: Duration,
}

/// Runs tasks from a [`TaskRegistry`] against a [`FileSystem`].
///
/// Tasks run one at a time, dependencies before dependents, each task at
/// most once per run. The first failing task aborts the run.
#[derive(Debug)]
pub struct Scheduler {
    registry: Arc<TaskRegistry>,
    fs: Arc<dyn FileSystem>,
    /// Monotonically increasing run ID.
    run_counter: AtomicU64,
}

impl Scheduler {
    pub fn new(registry: Arc<TaskRegistry>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            registry,
            fs,
            run_counter: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Execution order for `target`: a depth-first post-order walk that
    /// visits dependencies in declared order and lists each task once.
    pub fn plan(&self, target: &str) -> Result<Vec<TaskName>> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        self.visit(target, None, &mut visited, &mut order)?;
        Ok(order)
    }

    fn visit(
        &self,
        name: &str,
        required_by: Option<&str>,
        visited: &mut HashSet<TaskName>,
        order: &mut Vec<TaskName>,
    ) -> Result<()> {
        if visited.contains(name) {
            return Ok(());
        }
        let Some(spec) = self.registry.get(name) else {
            return Err(BuildError::TaskNotFound(match required_by {
                Some(parent) => format!("{name} (required by '{parent}')"),
                None => name.to_string(),
            }));
        };

        // The registry guarantees acyclicity, so marking on entry is enough.
        visited.insert(name.to_string());
        for dep in &spec.deps {
            self.visit(dep, Some(name), visited, order)?;
        }
        order.push(name.to_string());
        Ok(())
    }

    /// Run `target` and everything it depends on.
    pub fn run(&self, target: &str) -> Result<RunReport> {
        let plan = self.plan(target)?;
        let run_id = self.run_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let started = Instant::now();
        info!(run_id, target, tasks = ?plan, "starting run");

        let mut executed = Vec::with_capacity(plan.len());
        for name in plan {
            let Some(spec) = self.registry.get(&name) else {
                return Err(BuildError::TaskNotFound(name));
            };

            if let Some(action) = &spec.action {
                let task_started = Instant::now();
                info!(run_id, task = %name, "starting task");
                if let Err(err) = action.run(self.fs.as_ref()) {
                    error!(run_id, task = %name, error = %err, "task failed");
                    return Err(BuildError::TaskFailed {
                        task: name,
                        source: Box::new(err),
                    });
                }
                info!(
                    run_id,
                    task = %name,
                    elapsed_ms = task_started.elapsed().as_millis() as u64,
                    "finished task"
                );
            } else {
                debug!(run_id, task = %name, "composite task complete");
            }
            executed.push(name);
        }

        let elapsed = started.elapsed();
        info!(
            run_id,
            target,
            elapsed_ms = elapsed.as_millis() as u64,
            "run finished"
        );
        Ok(RunReport {
            run_id,
            target: target.to_string(),
            executed,
            elapsed,
        })
    }
}
