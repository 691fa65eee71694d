// src/lib.rs

pub mod cli;
pub mod config;
pub mod copy;
pub mod css;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod matcher;
pub mod pipeline;
pub mod tasks;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::BuildPaths;
use crate::dag::{RunReport, Scheduler};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use crate::exec::SchedulerBackend;
use crate::fs::{FileSystem, RealFileSystem};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - path resolution (environment + optional layout file)
/// - the task registry and scheduler
/// - in watch mode: file watcher, runtime and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let paths = BuildPaths::from_env(&args.root, args.config.as_deref())?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let scheduler = Arc::new(Scheduler::new(
        Arc::new(tasks::build_registry(&paths)?),
        Arc::clone(&fs),
    ));
    let target = args.target().to_string();

    if args.dry_run {
        print_dry_run(&paths, &scheduler, &target)?;
        return Ok(());
    }

    // The initial build runs the full plan; in watch mode a failure here
    // still exits non-zero.
    let report = run_blocking(Arc::clone(&scheduler), target).await?;
    info!(
        executed = ?report.executed,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "build finished"
    );

    if !args.watch_mode() {
        return Ok(());
    }
    run_watch(&paths, scheduler, fs).await
}

/// Resolve the plan for `target` and run it synchronously.
pub fn run_task(
    paths: &BuildPaths,
    fs: Arc<dyn FileSystem>,
    target: &str,
) -> errors::Result<RunReport> {
    let registry = tasks::build_registry(paths)?;
    Scheduler::new(Arc::new(registry), fs).run(target)
}

async fn run_blocking(scheduler: Arc<Scheduler>, target: String) -> Result<RunReport> {
    let report = tokio::task::spawn_blocking(move || scheduler.run(&target)).await??;
    Ok(report)
}

/// Rebuild on source changes until Ctrl-C.
async fn run_watch(paths: &BuildPaths, scheduler: Arc<Scheduler>, fs: Arc<dyn FileSystem>) -> Result<()> {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let backend = SchedulerBackend::new(scheduler, rt_tx.clone());

    let _watcher_handle = watch::spawn_watcher(
        paths.root.clone(),
        tasks::watch_bindings(paths),
        rt_tx.clone(),
        paths.debounce,
        fs,
    )?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let core = CoreRuntime::new(RuntimeOptions::default());
    let runtime = Runtime::new(core, rt_rx, backend);
    runtime.run().await
}

/// Print the resolved paths and the plan for `target`.
fn print_dry_run(paths: &BuildPaths, scheduler: &Scheduler, target: &str) -> errors::Result<()> {
    let plan = scheduler.plan(target)?;

    println!("assetdag dry-run");
    println!("  root           = {}", paths.root.display());
    println!("  docs root      = {}", paths.docs_root.display());
    println!("  man pages      = {}", paths.man_pages_dir.display());
    println!("  templates      = {}", paths.templates_dir.display());
    println!("  css sources    = {}", paths.css_sources);
    println!("  css output     = {}", paths.css_output_dir.display());
    for lib in &paths.libs {
        let dest: Vec<_> = lib.dest.iter().map(|d| d.display().to_string()).collect();
        println!("  lib            = {} -> {}", lib.pattern, dest.join(", "));
    }
    println!("  debounce       = {}ms", paths.debounce.as_millis());
    println!();

    println!("plan for '{target}' ({} tasks):", plan.len());
    for (i, name) in plan.iter().enumerate() {
        let deps = scheduler
            .registry()
            .get(name)
            .map(|spec| spec.deps.clone())
            .unwrap_or_default();
        if deps.is_empty() {
            println!("  {}. {name}", i + 1);
        } else {
            println!("  {}. {name} (after {})", i + 1, deps.join(", "));
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
