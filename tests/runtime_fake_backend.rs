// tests/runtime_fake_backend.rs

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::event::{DataChange, ModifyKind};
use notify::{Event, EventKind};
use tokio::sync::mpsc;

use assetdag::config::{BuildPaths, ConfigFile};
use assetdag::dag::Scheduler;
use assetdag::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use assetdag::exec::SchedulerBackend;
use assetdag::fs::mock::MockFileSystem;
use assetdag::tasks;
use assetdag::matcher::GlobPattern;
use assetdag::watch::{ChangeFilter, WatchBinding};
use assetdag_test_utils::{init_tracing, with_timeout, FakeBackend, Recorder};

type TestResult = Result<(), Box<dyn Error>>;

fn trigger(task: &str) -> RuntimeEvent {
    RuntimeEvent::TaskTriggered {
        task: task.to_string(),
    }
}

fn exiting_core() -> CoreRuntime {
    CoreRuntime::new(RuntimeOptions {
        exit_when_idle: true,
    })
}

#[tokio::test]
async fn burst_of_triggers_runs_at_most_twice() -> TestResult {
    init_tracing();
    let (tx, rx) = mpsc::channel(32);
    let runs = Recorder::new();

    // Queue everything before the runtime starts so the burst lands while
    // the first run is still in flight.
    for _ in 0..6 {
        tx.send(trigger("css")).await?;
    }

    let backend = FakeBackend::new(tx.clone(), runs.clone());
    let runtime = Runtime::new(exiting_core(), rx, backend);
    with_timeout(runtime.run()).await?;

    assert_eq!(runs.entries(), ["css", "css"]);
    Ok(())
}

#[tokio::test]
async fn failed_run_does_not_stop_the_loop() -> TestResult {
    init_tracing();
    let (tx, rx) = mpsc::channel(32);
    let runs = Recorder::new();

    tx.send(trigger("css")).await?;
    tx.send(trigger("libs")).await?;

    let backend = FakeBackend::new(tx.clone(), runs.clone()).failing("css");
    let runtime = Runtime::new(exiting_core(), rx, backend);
    with_timeout(runtime.run()).await?;

    assert_eq!(runs.entries(), ["css", "libs"]);
    Ok(())
}

#[tokio::test]
async fn shutdown_stops_without_running_anything() -> TestResult {
    let (tx, rx) = mpsc::channel(8);
    let runs = Recorder::new();
    tx.send(RuntimeEvent::ShutdownRequested).await?;
    tx.send(trigger("css")).await?;

    let backend = FakeBackend::new(tx.clone(), runs.clone());
    let runtime = Runtime::new(CoreRuntime::new(RuntimeOptions::default()), rx, backend);
    with_timeout(runtime.run()).await?;

    assert!(runs.entries().is_empty());
    Ok(())
}

#[tokio::test]
async fn closed_channel_ends_the_runtime() -> TestResult {
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(8);
    let runs = Recorder::new();
    let backend = FakeBackend::new(mpsc::channel(1).0, runs.clone());
    drop(tx);

    let runtime = Runtime::new(CoreRuntime::new(RuntimeOptions::default()), rx, backend);
    with_timeout(runtime.run()).await?;
    assert!(runs.entries().is_empty());
    Ok(())
}

/// Source edits flow through the change filter into the runtime; library
/// edits never reach it.
#[tokio::test]
async fn source_edit_reaches_runtime_but_library_edit_does_not() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/site/less/site.less", "a { color: red; }");
    fs.add_file("/site/node_modules/jquery/dist/jquery.js", "v1");

    let bindings = vec![WatchBinding::new(
        "css",
        vec![GlobPattern::new("less/*.less")?],
    )];
    let mut filter = ChangeFilter::new(
        "/site",
        bindings,
        Arc::new(fs.clone()),
        Duration::from_millis(50),
    );

    let modify = |path: &str| {
        Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from(path))
    };

    let now = Instant::now();
    fs.add_file("/site/node_modules/jquery/dist/jquery.js", "v2");
    assert!(!filter.record_event(&modify("/site/node_modules/jquery/dist/jquery.js"), now));
    fs.add_file("/site/less/site.less", "a { color: blue; }");
    assert!(filter.record_event(&modify("/site/less/site.less"), now));
    fs.add_file("/site/less/site.less", "a { color: green; }");
    assert!(filter.record_event(&modify("/site/less/site.less"), now));

    let (tx, rx) = mpsc::channel(8);
    for task in filter.flush() {
        tx.send(trigger(&task)).await?;
    }

    let runs = Recorder::new();
    let backend = FakeBackend::new(tx.clone(), runs.clone());
    with_timeout(Runtime::new(exiting_core(), rx, backend).run()).await?;

    assert_eq!(runs.entries(), ["css"]);
    Ok(())
}

/// The same flow with real tasks behind the runtime: a LESS edit rebuilds
/// the stylesheet and leaves the library copies alone.
#[tokio::test]
async fn css_change_rebuilds_css_only() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/site/less/site.less", "@c: red;\n.a { color: @c; }");
    fs.add_file("/site/node_modules/jquery/dist/jquery.js", "js");

    let paths = BuildPaths::from_layout(Path::new("/site"), Path::new("/go"), &ConfigFile::default())?;
    let scheduler = Scheduler::new(Arc::new(tasks::build_registry(&paths)?), Arc::new(fs.clone()));

    let mut filter = ChangeFilter::new(
        "/site",
        tasks::watch_bindings(&paths),
        Arc::new(fs.clone()),
        Duration::from_millis(50),
    );
    fs.add_file("/site/less/site.less", "@c: blue;\n.a { color: @c; }");
    let edit = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
        .add_path(PathBuf::from("/site/less/site.less"));
    assert!(filter.record_event(&edit, Instant::now()));

    let (tx, rx) = mpsc::channel(8);
    for task in filter.flush() {
        tx.send(trigger(&task)).await?;
    }
    let backend = SchedulerBackend::new(Arc::new(scheduler), tx.clone());
    with_timeout(Runtime::new(exiting_core(), rx, backend).run()).await?;

    assert_eq!(fs.contents("/site/www/css/site.css"), Some(b".a{color:blue}".to_vec()));
    let written = fs.snapshot();
    assert!(written.keys().all(|p| !p.starts_with("/site/www/js")));
    assert!(written.keys().all(|p| !p.starts_with("/site/www/fonts")));
    Ok(())
}
