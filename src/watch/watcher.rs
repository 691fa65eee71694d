// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::RuntimeEvent;
use crate::fs::FileSystem;
use crate::watch::binding::WatchBinding;
use crate::watch::event_handler::ChangeFilter;
use crate::watch::path_utils::existing_ancestor;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    dirs: Vec<PathBuf>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("dirs", &self.dirs)
            .finish_non_exhaustive()
    }
}

/// Watch the base directory of every binding and send
/// `RuntimeEvent::TaskTriggered` once changes settle for `debounce`.
///
/// - `root` is the project root against which all glob patterns are evaluated.
/// - `fs` is used to hash changed files for the content filter.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    bindings: Vec<WatchBinding>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    debounce: Duration,
    fs: Arc<dyn FileSystem>,
) -> Result<WatcherHandle> {
    let root = root.into();

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("assetdag: failed to forward notify event: {err}");
                }
            }
            Err(err) => eprintln!("assetdag: file watch error: {err}"),
        },
        Config::default(),
    )?;

    let mut dirs: Vec<PathBuf> = Vec::new();
    for binding in &bindings {
        for dir in binding.base_dirs(&root) {
            // A source directory that does not exist yet is covered by
            // watching its closest existing parent.
            let Some(dir) = existing_ancestor(&dir) else {
                warn!(dir = ?dir, task = binding.task(), "no existing directory to watch");
                continue;
            };
            if dirs.iter().any(|d| dir.starts_with(d)) {
                continue;
            }
            dirs.retain(|d| !d.starts_with(&dir));
            dirs.push(dir);
        }
    }
    for dir in &dirs {
        watcher.watch(dir, RecursiveMode::Recursive)?;
        info!(dir = ?dir, "watching for changes");
    }

    tokio::spawn(async move {
        // Priming and content checks read files, so they run on the
        // blocking pool with the filter moved in and back out.
        let primed =
            tokio::task::spawn_blocking(move || ChangeFilter::new(root, bindings, fs, debounce))
                .await;
        let mut filter = match primed {
            Ok(filter) => filter,
            Err(err) => {
                error!(error = %err, "failed to prime content cache; watcher stopped");
                return;
            }
        };

        loop {
            let next = match filter.deadline() {
                Some(deadline) => {
                    let deadline = tokio::time::Instant::from_std(deadline);
                    match tokio::time::timeout_at(deadline, event_rx.recv()).await {
                        Ok(next) => next,
                        Err(_elapsed) => {
                            if !forward(&mut filter, &runtime_tx).await {
                                break;
                            }
                            continue;
                        }
                    }
                }
                None => event_rx.recv().await,
            };

            let Some(event) = next else {
                break;
            };
            debug!(?event, "received notify event");
            let now = Instant::now();
            let checked = tokio::task::spawn_blocking(move || {
                filter.record_event(&event, now);
                filter
            })
            .await;
            filter = match checked {
                Ok(filter) => filter,
                Err(err) => {
                    error!(error = %err, "content check failed; watcher stopped");
                    break;
                }
            };
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        dirs,
    })
}

/// Send due triggers to the runtime. Returns false once the runtime is gone.
async fn forward(filter: &mut ChangeFilter, runtime_tx: &mpsc::Sender<RuntimeEvent>) -> bool {
    for task in filter.flush() {
        info!(task = %task, "sources changed; triggering rebuild");
        let event = RuntimeEvent::TaskTriggered { task };
        if runtime_tx.send(event).await.is_err() {
            debug!("runtime channel closed; stopping watcher");
            return false;
        }
    }
    true
}
