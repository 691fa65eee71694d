// src/engine/mod.rs

//! Watch-mode orchestration.
//!
//! This module ties together:
//! - the trigger queue (what happens when triggers arrive while a run is active)
//! - the main runtime event loop that reacts to:
//!   - file-watch triggers
//!   - run completion events
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`]. Runs never overlap: a trigger that arrives
//! while a run is active waits in the queue.

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Outcome of a scheduler run as seen by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    /// The run failed; the message is the rendered error chain.
    Failed(String),
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once no run is active and the queue is
    /// empty. Watch mode leaves this off and stops on Ctrl-C only.
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the watcher, the run backend and
/// the signal handler.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Watched sources of a task changed; it should be rebuilt.
    TaskTriggered { task: TaskName },
    /// A scheduler run finished.
    RunCompleted {
        task: TaskName,
        outcome: RunOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
