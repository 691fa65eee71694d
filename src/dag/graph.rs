// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::engine::TaskName;
use crate::errors::{BuildError, Result};

/// Directed acyclic graph of task names.
///
/// Edge direction: dep -> task. For `default = [css, libs]` we add
/// `css -> default` and `libs -> default`.
///
/// Nodes may exist for names that are only referenced as dependencies and
/// not (yet) registered; the registry decides which names are defined.
#[derive(Debug, Clone, Default)]
pub struct DagGraph {
    graph: DiGraph<TaskName, ()>,
    index: HashMap<TaskName, NodeIndex>,
}

impl DagGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Add `name` with edges from each of `deps`.
    ///
    /// Fails without modifying the graph if any edge would close a cycle.
    pub fn add_task(&mut self, name: &str, deps: &[TaskName]) -> Result<()> {
        for dep in deps {
            if dep == name {
                return Err(BuildError::DagCycle(format!(
                    "task '{name}' cannot depend on itself"
                )));
            }
            // The graph is acyclic, so a new cycle must pass through `name`:
            // it exists iff `dep` is already reachable from `name`.
            if let (Some(&from), Some(&to)) = (self.index.get(name), self.index.get(dep.as_str())) {
                if has_path_connecting(&self.graph, from, to, None) {
                    return Err(BuildError::DagCycle(format!(
                        "task '{name}' depends on '{dep}', but '{dep}' already depends on '{name}'"
                    )));
                }
            }
        }

        let task = self.node(name);
        for dep in deps {
            let dep = self.node(dep);
            self.graph.update_edge(dep, task, ());
        }
        Ok(())
    }
}
