// src/engine/runtime.rs

use std::fmt;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::exec::RunBackend;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Drains `RuntimeEvent`s serially and hands runs to a [`RunBackend`].
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics.
pub struct Runtime<B: RunBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
}

impl<B: RunBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: RunBackend> Runtime<B> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, backend: B) -> Self {
        Self {
            core,
            event_rx,
            backend,
        }
    }

    /// Main event loop. Returns when the core asks to stop or every sender
    /// has been dropped.
    pub async fn run(mut self) -> Result<()> {
        info!("assetdag runtime started");

        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "runtime received event");

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                return Ok(());
            }
        }

        info!("runtime event channel closed; exiting");
        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::StartRun(task) => {
                debug!(task = %task, "dispatching run to backend");
                self.backend.start_run(task).await
            }
            CoreCommand::RequestExit => {
                info!("core issued RequestExit command");
                Ok(())
            }
        }
    }
}
