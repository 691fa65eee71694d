// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{debug, error, info, warn};

use crate::engine::queue::TriggerQueue;
use crate::engine::{RunOutcome, RuntimeOptions, TaskName};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start a scheduler run for this task.
    StartRun(TaskName),
    /// Request that the process exits (only when `exit_when_idle` is set).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn keep_running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a task trigger event.
///
/// - If nothing is running, the run starts immediately.
/// - Otherwise the task is queued (once), including when it is the task that
///   is running right now: the change may have landed after its inputs were
///   read.
pub fn handle_task_trigger(
    active: &mut Option<TaskName>,
    queue: &mut TriggerQueue,
    task: TaskName,
) -> CoreStep {
    match active {
        None => {
            info!(task = %task, "starting run");
            *active = Some(task.clone());
            CoreStep::keep_running(vec![CoreCommand::StartRun(task)])
        }
        Some(running) => {
            debug!(task = %task, running = %running, "run in progress; queueing trigger");
            queue.record_trigger(&task);
            CoreStep::keep_running(Vec::new())
        }
    }
}

/// Handle a run completion event.
///
/// A failed run is logged and does not stop the loop. The next queued task,
/// if any, starts straight away.
pub fn handle_run_completion(
    active: &mut Option<TaskName>,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    task: TaskName,
    outcome: RunOutcome,
) -> CoreStep {
    if active.as_deref() != Some(task.as_str()) {
        warn!(task = %task, active = ?active, "completion for a run that is not active; ignoring");
        return CoreStep::keep_running(Vec::new());
    }
    *active = None;

    match &outcome {
        RunOutcome::Success => info!(task = %task, "run succeeded"),
        RunOutcome::Failed(message) => {
            error!(task = %task, error = %message, "run failed; waiting for further changes")
        }
    }

    if let Some(next) = queue.pop_next() {
        info!(task = %next, "starting queued run");
        *active = Some(next.clone());
        return CoreStep::keep_running(vec![CoreCommand::StartRun(next)]);
    }

    if options.exit_when_idle {
        return CoreStep {
            commands: vec![CoreCommand::RequestExit],
            keep_running: false,
        };
    }

    CoreStep::keep_running(Vec::new())
}
