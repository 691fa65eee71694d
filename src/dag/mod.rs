// src/dag/mod.rs

//! Named tasks, their dependencies and how they are run.
//!
//! - [`graph`] holds the directed acyclic graph of task names.
//! - [`registry`] owns task definitions and rejects duplicates and cycles.
//! - [`scheduler`] expands a target into an execution plan and runs it.

pub mod graph;
pub mod registry;
pub mod scheduler;

use crate::errors::Result;
use crate::fs::FileSystem;

pub use graph::DagGraph;
pub use registry::{TaskRegistry, TaskSpec};
pub use scheduler::{RunReport, Scheduler};

/// The work a task performs once its dependencies have completed.
pub trait TaskAction: Send + Sync {
    fn run(&self, fs: &dyn FileSystem) -> Result<()>;
}

impl<F> TaskAction for F
where
    F: Fn(&dyn FileSystem) -> Result<()> + Send + Sync,
{
    fn run(&self, fs: &dyn FileSystem) -> Result<()> {
        self(fs)
    }
}
