// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) reads events from channels,
//! hands `StartRun` commands to the run backend and handles shutdown. The
//! core itself has no channels, no Tokio types and performs no IO.

use crate::engine::event_handlers::{handle_run_completion, handle_task_trigger, CoreStep};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions, TaskName};

/// Pure core runtime state.
///
/// Owns the name of the task whose run is in flight (at most one) and the
/// queue of rebuilds waiting behind it.
#[derive(Debug, Default)]
pub struct CoreRuntime {
    active: Option<TaskName>,
    queue: TriggerQueue,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            active: None,
            queue: TriggerQueue::new(),
            options,
        }
    }

    /// True if no run is in flight.
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn active_task(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending(&self) -> Vec<TaskName> {
        self.queue.pending()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskTriggered { task } => {
                handle_task_trigger(&mut self.active, &mut self.queue, task)
            }
            RuntimeEvent::RunCompleted { task, outcome } => handle_run_completion(
                &mut self.active,
                &mut self.queue,
                &self.options,
                task,
                outcome,
            ),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CoreCommand, RunOutcome};

    fn trigger(task: &str) -> RuntimeEvent {
        RuntimeEvent::TaskTriggered {
            task: task.to_string(),
        }
    }

    fn done(task: &str, outcome: RunOutcome) -> RuntimeEvent {
        RuntimeEvent::RunCompleted {
            task: task.to_string(),
            outcome,
        }
    }

    #[test]
    fn idle_trigger_starts_run() {
        let mut core = CoreRuntime::new(RuntimeOptions::default());
        let step = core.step(trigger("css"));
        assert_eq!(step.commands, vec![CoreCommand::StartRun("css".into())]);
        assert!(step.keep_running);
        assert_eq!(core.active_task(), Some("css"));
    }

    #[test]
    fn burst_during_run_coalesces_into_one_rebuild() {
        let mut core = CoreRuntime::new(RuntimeOptions::default());
        core.step(trigger("css"));
        for _ in 0..5 {
            assert!(core.step(trigger("css")).commands.is_empty());
        }
        assert_eq!(core.pending(), ["css"]);

        let step = core.step(done("css", RunOutcome::Success));
        assert_eq!(step.commands, vec![CoreCommand::StartRun("css".into())]);
        assert!(core.queue_is_empty());

        let step = core.step(done("css", RunOutcome::Success));
        assert!(step.commands.is_empty());
        assert!(core.is_idle());
    }

    #[test]
    fn failed_run_keeps_loop_alive() {
        let mut core = CoreRuntime::new(RuntimeOptions::default());
        core.step(trigger("css"));
        let step = core.step(done("css", RunOutcome::Failed("boom".into())));
        assert!(step.keep_running);
        assert!(core.is_idle());

        let step = core.step(trigger("css"));
        assert_eq!(step.commands, vec![CoreCommand::StartRun("css".into())]);
    }

    #[test]
    fn stray_completion_is_ignored() {
        let mut core = CoreRuntime::new(RuntimeOptions::default());
        core.step(trigger("css"));
        let step = core.step(done("libs", RunOutcome::Success));
        assert!(step.commands.is_empty());
        assert_eq!(core.active_task(), Some("css"));
    }

    #[test]
    fn exit_when_idle_requests_exit() {
        let mut core = CoreRuntime::new(RuntimeOptions {
            exit_when_idle: true,
        });
        core.step(trigger("css"));
        let step = core.step(done("css", RunOutcome::Success));
        assert_eq!(step.commands, vec![CoreCommand::RequestExit]);
        assert!(!step.keep_running);
    }

    #[test]
    fn shutdown_stops_loop() {
        let mut core = CoreRuntime::new(RuntimeOptions::default());
        assert!(!core.step(RuntimeEvent::ShutdownRequested).keep_running);
    }
}
