// src/dag/registry.rs

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::dag::graph::DagGraph;
use crate::dag::TaskAction;
use crate::engine::TaskName;
use crate::errors::{BuildError, Result};

/// A registered task: its dependencies in declared order plus an optional
/// action. Tasks without an action are composite and only aggregate deps.
pub struct TaskSpec {
    pub name: TaskName,
    pub deps: Vec<TaskName>,
    pub action: Option<Box<dyn TaskAction>>,
}

impl TaskSpec {
    pub fn is_composite(&self) -> bool {
        self.action.is_none()
    }
}

impl fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("composite", &self.is_composite())
            .finish()
    }
}

/// All defined tasks.
///
/// Dependencies may name tasks that are registered later; unknown names are
/// only reported when a plan is resolved. Registration is rejected if the
/// name is taken or the new edges would close a cycle, and a rejected
/// registration leaves the registry untouched.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: HashMap<TaskName, TaskSpec>,
    order: Vec<TaskName>,
    graph: DagGraph,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task that runs `action` after `deps`.
    pub fn register<A>(&mut self, name: &str, deps: &[&str], action: A) -> Result<()>
    where
        A: TaskAction + 'static,
    {
        self.insert(name, deps, Some(Box::new(action)))
    }

    /// Register a task that only depends on other tasks.
    pub fn register_composite(&mut self, name: &str, deps: &[&str]) -> Result<()> {
        self.insert(name, deps, None)
    }

    fn insert(
        &mut self,
        name: &str,
        deps: &[&str],
        action: Option<Box<dyn TaskAction>>,
    ) -> Result<()> {
        if self.tasks.contains_key(name) {
            return Err(BuildError::DuplicateTask(name.to_string()));
        }

        let deps: Vec<TaskName> = deps.iter().map(|d| d.to_string()).collect();
        self.graph.add_task(name, &deps)?;

        debug!(task = name, ?deps, composite = action.is_none(), "registered task");
        self.order.push(name.to_string());
        self.tasks.insert(
            name.to_string(),
            TaskSpec {
                name: name.to_string(),
                deps,
                action,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TaskSpec> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Task names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
