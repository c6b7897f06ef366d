#![allow(dead_code, unused_imports)]

pub use maestro_test_utils::builders;
pub use maestro_test_utils::{FakeRun, init_tracing, run_fake, with_timeout};

use std::collections::{BTreeSet, HashSet};

use maestro::dag::JobGraph;
use maestro::engine::{JobEvent, RunReport};

pub fn ids(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Largest number of jobs simultaneously running according to the event
/// stream (a `Started` opens a slot, `Succeeded`/`Failed` closes it).
pub fn max_running(events: &[JobEvent]) -> usize {
    let mut running: HashSet<&str> = HashSet::new();
    let mut max = 0;
    for event in events {
        match event {
            JobEvent::Started { job } => {
                running.insert(job);
                max = max.max(running.len());
            }
            JobEvent::Succeeded { job } | JobEvent::Failed { job, .. } => {
                running.remove(job.as_str());
            }
            JobEvent::Ignored { .. } => {}
        }
    }
    max
}

/// Assert the final report partitions exactly `all`.
pub fn assert_partition(report: &RunReport, all: &BTreeSet<String>) {
    let sets = [&report.finished, &report.failed, &report.ignored, &report.queued];
    let total: usize = sets.iter().map(|s| s.len()).sum();
    let union: BTreeSet<&String> = sets.iter().flat_map(|s| s.iter()).collect();
    assert_eq!(total, union.len(), "report sets overlap: {report:?}");
    assert_eq!(
        union.into_iter().cloned().collect::<BTreeSet<_>>(),
        *all,
        "report does not cover every job"
    );
}

/// Assert that every `Started` event comes after a `Succeeded` event for
/// each of the job's dependencies.
pub fn assert_started_when_ready(graph: &JobGraph, events: &[JobEvent]) {
    let mut succeeded: HashSet<&str> = HashSet::new();
    for event in events {
        match event {
            JobEvent::Started { job } => {
                for dep in graph.dependencies_of(job) {
                    assert!(
                        succeeded.contains(dep.as_str()),
                        "{job} started before {dep} succeeded"
                    );
                }
            }
            JobEvent::Succeeded { job } => {
                succeeded.insert(job);
            }
            _ => {}
        }
    }
}
