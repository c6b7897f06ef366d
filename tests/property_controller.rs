// tests/property_controller.rs

mod common;
use crate::common::builders::graph_from_edges;
use crate::common::{assert_partition, assert_started_when_ready, run_fake};

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use proptest::prelude::*;

use maestro::dag::JobGraph;
use maestro::engine::{ControllerCore, JobEvent, JobExit, JobOutcome};

// Random DAG as `(id, deps)` pairs; job i only depends on jobs < i.
fn dag_strategy(max_jobs: usize) -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    (1..=max_jobs).prop_flat_map(|num_jobs| {
        proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..num_jobs), num_jobs)
            .prop_map(|raw_deps| {
                raw_deps
                    .into_iter()
                    .enumerate()
                    .map(|(i, potential)| {
                        let deps: BTreeSet<String> = if i == 0 {
                            BTreeSet::new()
                        } else {
                            potential.into_iter().map(|d| format!("job_{}", d % i)).collect()
                        };
                        (format!("job_{i}"), deps.into_iter().collect())
                    })
                    .collect()
            })
    })
}

fn build(edges: &[(String, Vec<String>)]) -> JobGraph {
    let dep_refs: Vec<Vec<&str>> = edges
        .iter()
        .map(|(_, deps)| deps.iter().map(String::as_str).collect())
        .collect();
    let pairs: Vec<(&str, &[&str])> = edges
        .iter()
        .zip(dep_refs.iter())
        .map(|((id, _), deps)| (id.as_str(), deps.as_slice()))
        .collect();
    graph_from_edges(&pairs)
}

proptest! {
    #[test]
    fn every_run_ends_in_a_valid_partition(
        edges in dag_strategy(12),
        worker_limit in 1i64..5,
        failing_indices in proptest::collection::vec(0..12usize, 0..4),
        picks in proptest::collection::vec(any::<usize>(), 64),
    ) {
        let graph = build(&edges);
        let all: BTreeSet<String> = graph.job_ids().map(str::to_string).collect();
        let failing: HashSet<String> = failing_indices
            .iter()
            .map(|i| format!("job_{i}"))
            .filter(|id| all.contains(id))
            .collect();

        let mut core = ControllerCore::new(graph.clone(), worker_limit);
        let mut running: Vec<String> = Vec::new();
        let mut launched: HashSet<String> = HashSet::new();
        let mut failed_seen: HashSet<String> = HashSet::new();
        let mut picks = picks.into_iter().cycle();
        let mut steps = 0;

        while !core.is_done() {
            steps += 1;
            prop_assert!(steps < 1000, "controller did not terminate");

            let step = core.launch_ready().unwrap();
            for job in &step.dispatch {
                // Readiness: every dependency has finished at launch time.
                for dep in graph.dependencies_of(&job.id) {
                    prop_assert!(
                        core.state().finished().contains(dep),
                        "{} launched before {} finished", job.id, dep
                    );
                }
                prop_assert!(launched.insert(job.id.clone()), "{} launched twice", job.id);
                running.push(job.id.clone());
            }
            prop_assert!(core.state().running_len() as i64 <= worker_limit);
            prop_assert!(core.state().is_partition());

            prop_assert!(core.stalled().is_none());
            if running.is_empty() {
                break;
            }

            let idx = picks.next().unwrap_or(0) % running.len();
            let job = running.swap_remove(idx);
            let outcome = if failing.contains(&job) {
                JobOutcome::Failed(1)
            } else {
                JobOutcome::Success
            };
            let step = core.handle_exit(JobExit { job, outcome }).unwrap();
            for event in step.events {
                if let JobEvent::Failed { job, .. } = event {
                    failed_seen.insert(job);
                }
            }
            prop_assert!(core.state().is_partition());
        }

        prop_assert!(core.is_done());
        let report = core.into_report();
        assert_partition(&report, &all);
        prop_assert!(report.queued.is_empty());

        // Failed jobs are exactly the launched failing jobs.
        let expected_failed: BTreeSet<String> =
            failing.intersection(&launched).cloned().collect();
        prop_assert_eq!(&report.failed, &expected_failed);
        prop_assert_eq!(failed_seen.len(), report.failed.len());

        // Ignored jobs were never launched and have a failed or ignored dependency.
        for id in &report.ignored {
            prop_assert!(!launched.contains(id));
            prop_assert!(graph
                .dependencies_of(id)
                .iter()
                .any(|d| report.failed.contains(d) || report.ignored.contains(d)));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn fake_executor_runs_end_in_a_valid_partition(
        edges in dag_strategy(10),
        worker_limit in 1i64..4,
        failing_indices in proptest::collection::vec(0..10usize, 0..3),
    ) {
        let graph = build(&edges);
        let all: BTreeSet<String> = graph.job_ids().map(str::to_string).collect();
        let failing: Vec<String> = failing_indices.iter().map(|i| format!("job_{i}")).collect();
        let failing_refs: Vec<&str> = failing.iter().map(String::as_str).collect();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let run = rt.block_on(run_fake(graph.clone(), worker_limit, &failing_refs, Duration::ZERO));
        let report = run.report.unwrap();

        assert_partition(&report, &all);
        prop_assert!(report.queued.is_empty());
        assert_started_when_ready(&graph, &run.events);

        for id in &report.failed {
            prop_assert!(failing.contains(id));
        }
        for id in &report.ignored {
            prop_assert!(!run.launched.contains(id));
        }
    }
}
