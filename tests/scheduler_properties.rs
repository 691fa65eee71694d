// tests/scheduler_properties.rs

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use assetdag::dag::{Scheduler, TaskRegistry};
use assetdag::errors::BuildError;
use assetdag::fs::mock::MockFileSystem;
use assetdag_test_utils::Recorder;

/// Dependency lists for a random DAG. Acyclicity is ensured by only letting
/// task N depend on tasks 0..N-1.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..4),
            num_tasks,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    let mut deps: Vec<usize> = Vec::new();
                    if i > 0 {
                        for d in potential {
                            let d = d % i;
                            if !deps.contains(&d) {
                                deps.push(d);
                            }
                        }
                    }
                    deps
                })
                .collect()
        })
    })
}

fn name(i: usize) -> String {
    format!("task_{i}")
}

/// Register tasks in reverse order so every dependency is a forward
/// reference at registration time.
fn build(deps: &[Vec<usize>], recorder: &Recorder) -> Scheduler {
    let mut registry = TaskRegistry::new();
    for i in (0..deps.len()).rev() {
        let dep_names: Vec<String> = deps[i].iter().map(|d| name(*d)).collect();
        let dep_refs: Vec<&str> = dep_names.iter().map(|s| s.as_str()).collect();
        registry
            .register(&name(i), &dep_refs, recorder.action(&name(i)))
            .unwrap();
    }
    Scheduler::new(Arc::new(registry), Arc::new(MockFileSystem::new()))
}

fn reachable(deps: &[Vec<usize>], target: usize) -> HashSet<usize> {
    let mut seen = HashSet::new();
    let mut stack = vec![target];
    while let Some(t) = stack.pop() {
        if seen.insert(t) {
            stack.extend(deps[t].iter().copied());
        }
    }
    seen
}

proptest! {
    #[test]
    fn every_reachable_task_runs_once_after_its_deps(
        deps in dag_strategy(12),
        target_seed in any::<usize>(),
    ) {
        let target = target_seed % deps.len();
        let recorder = Recorder::new();
        let scheduler = build(&deps, &recorder);

        let report = scheduler.run(&name(target)).unwrap();
        let ran = recorder.entries();
        prop_assert_eq!(&ran, &report.executed);

        let expected: HashSet<String> = reachable(&deps, target).into_iter().map(name).collect();
        let ran_set: HashSet<String> = ran.iter().cloned().collect();
        prop_assert_eq!(ran_set.len(), ran.len(), "a task ran twice: {:?}", ran);
        prop_assert_eq!(ran_set, expected);

        for (pos, task) in ran.iter().enumerate() {
            let idx: usize = task.trim_start_matches("task_").parse().unwrap();
            for dep in &deps[idx] {
                let dep_pos = ran.iter().position(|t| *t == name(*dep)).unwrap();
                prop_assert!(dep_pos < pos, "{} ran before its dependency {}", task, name(*dep));
            }
        }
    }

    #[test]
    fn closing_any_back_edge_is_rejected(
        deps in dag_strategy(8),
        target_seed in any::<usize>(),
    ) {
        // Pick a task with at least one transitive dependency and try to make
        // that dependency depend back on it.
        let target = target_seed % deps.len();
        let below: Vec<usize> = reachable(&deps, target).into_iter().filter(|t| *t != target).collect();
        prop_assume!(!below.is_empty());

        let victim = below[0];
        let mut registry = TaskRegistry::new();
        for (i, task_deps) in deps.iter().enumerate() {
            if i == victim {
                continue;
            }
            let names: Vec<String> = task_deps.iter().map(|d| name(*d)).collect();
            let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
            registry.register_composite(&name(i), &refs).unwrap();
        }

        let target_name = name(target);
        let err = registry
            .register_composite(&name(victim), &[target_name.as_str()])
            .unwrap_err();
        prop_assert!(matches!(err, BuildError::DagCycle(_)));
        prop_assert!(!registry.contains(&name(victim)));
    }
}

#[test]
fn registry_rejects_duplicates_and_unknown_targets() {
    let recorder = Recorder::new();
    let mut registry = TaskRegistry::new();
    registry.register("css", &[], recorder.action("css")).unwrap();
    assert!(matches!(
        registry.register("css", &[], recorder.action("css")),
        Err(BuildError::DuplicateTask(_))
    ));

    let scheduler = Scheduler::new(Arc::new(registry), Arc::new(MockFileSystem::new()));
    assert!(matches!(
        scheduler.run("nope"),
        Err(BuildError::TaskNotFound(_))
    ));
    assert!(recorder.entries().is_empty());
}

#[test]
fn composite_without_deps_is_a_noop() {
    let mut registry = TaskRegistry::new();
    registry.register_composite("empty", &[]).unwrap();
    let scheduler = Scheduler::new(Arc::new(registry), Arc::new(MockFileSystem::new()));
    assert_eq!(scheduler.run("empty").unwrap().executed, ["empty"]);
}

#[test]
fn failure_stops_the_run_and_keeps_earlier_work() {
    let recorder = Recorder::new();
    let mut registry = TaskRegistry::new();
    registry.register("css", &[], recorder.action("css")).unwrap();
    registry.register("libs", &[], recorder.failing_action("libs")).unwrap();
    registry.register("after", &["libs"], recorder.action("after")).unwrap();
    registry.register_composite("default", &["css", "libs", "after"]).unwrap();
    let scheduler = Scheduler::new(Arc::new(registry), Arc::new(MockFileSystem::new()));

    let err = scheduler.run("default").unwrap_err();
    assert_eq!(err.failed_task(), Some("libs"));
    assert!(err.to_string().contains("libs exploded"));
    assert_eq!(recorder.entries(), ["css", "libs"]);
}
