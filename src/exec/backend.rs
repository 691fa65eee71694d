// src/exec/backend.rs

//! Pluggable run backend abstraction.
//!
//! The runtime talks to a `RunBackend` instead of calling the scheduler
//! directly. Production uses [`SchedulerBackend`]; tests swap in a fake that
//! records runs and reports completion without touching the filesystem.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::dag::Scheduler;
use crate::engine::{RunOutcome, RuntimeEvent, TaskName};

/// Trait abstracting how a run is executed.
///
/// Implementations must eventually send exactly one
/// `RuntimeEvent::RunCompleted` for every `start_run` call; the runtime will
/// not start another run until they do.
pub trait RunBackend: Send {
    fn start_run(&mut self, task: TaskName) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Runs [`Scheduler::run`] on Tokio's blocking pool.
///
/// `start_run` returns as soon as the run is spawned so the runtime keeps
/// draining triggers (which queue up) while files are being processed.
pub struct SchedulerBackend {
    scheduler: Arc<Scheduler>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl SchedulerBackend {
    pub fn new(scheduler: Arc<Scheduler>, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            scheduler,
            runtime_tx,
        }
    }
}

impl RunBackend for SchedulerBackend {
    fn start_run(&mut self, task: TaskName) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let scheduler = Arc::clone(&self.scheduler);
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            tokio::spawn(async move {
                let name = task.clone();
                let outcome = match tokio::task::spawn_blocking(move || scheduler.run(&name)).await {
                    Ok(Ok(report)) => {
                        debug!(task = %task, executed = ?report.executed, "run report");
                        RunOutcome::Success
                    }
                    Ok(Err(err)) => RunOutcome::Failed(err.to_string()),
                    Err(join_err) => {
                        error!(task = %task, error = %join_err, "run panicked");
                        RunOutcome::Failed(format!("run panicked: {join_err}"))
                    }
                };

                if tx
                    .send(RuntimeEvent::RunCompleted { task, outcome })
                    .await
                    .is_err()
                {
                    debug!("runtime gone before run completion could be reported");
                }
            });
            Ok(())
        })
    }
}
