// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Binding glob patterns to the task that rebuilds them.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Suppressing triggers for files whose content did not change.
//! - Debouncing bursts of events into one trigger per task.
//!
//! It does **not** run anything; it only turns filesystem changes into
//! `RuntimeEvent::TaskTriggered` for the engine.

pub mod binding;
pub mod cache;
pub mod event_handler;
pub mod path_utils;
pub mod watcher;

pub use binding::{tasks_for_path, WatchBinding};
pub use cache::{ContentCache, ContentChange};
pub use event_handler::ChangeFilter;
pub use watcher::{spawn_watcher, WatcherHandle};
