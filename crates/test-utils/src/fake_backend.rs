use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use tokio::sync::mpsc;
use assetdag::engine::{RunOutcome, RuntimeEvent, TaskName};
use assetdag::exec::RunBackend;

use crate::recorder::Recorder;

/// A fake run backend that:
/// - records which tasks were run
/// - immediately reports RunCompleted for each run, failing the tasks
///   configured with [`FakeBackend::failing`].
pub struct FakeBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    runs: Recorder,
    failing: HashSet<TaskName>,
}

impl FakeBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, runs: Recorder) -> Self {
        Self {
            runtime_tx,
            runs,
            failing: HashSet::new(),
        }
    }

    pub fn failing(mut self, task: &str) -> Self {
        self.failing.insert(task.to_string());
        self
    }
}

impl RunBackend for FakeBackend {
    fn start_run(&mut self, task: TaskName) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let runs = self.runs.clone();
        let outcome = if self.failing.contains(&task) {
            RunOutcome::Failed(format!("{task} failed (fake)"))
        } else {
            RunOutcome::Success
        };

        Box::pin(async move {
            runs.record(&task);
            tx.send(RuntimeEvent::RunCompleted { task, outcome }).await?;
            Ok(())
        })
    }
}
