// src/dag/readiness.rs

//! Which queued jobs can start right now.

use std::collections::HashSet;

use tracing::warn;

use crate::dag::graph::JobGraph;
use crate::dag::job::JobId;

/// Every id in `queued` whose dependencies are all in `finished`.
///
/// Jobs without dependencies are always ready. A failed or ignored
/// dependency never counts as satisfied.
pub fn compute_ready(
    graph: &JobGraph,
    queued: &HashSet<JobId>,
    finished: &HashSet<JobId>,
) -> HashSet<JobId> {
    queued
        .iter()
        .filter(|id| deps_satisfied(graph, id, finished))
        .cloned()
        .collect()
}

/// Whether all dependencies of `id` are in `finished`.
///
/// Unknown ids are never satisfied.
pub fn deps_satisfied(graph: &JobGraph, id: &str, finished: &HashSet<JobId>) -> bool {
    if !graph.contains(id) {
        warn!(job = %id, "readiness check for a job missing from the graph");
        return false;
    }

    graph
        .dependencies_of(id)
        .iter()
        .all(|dep| finished.contains(dep))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::job::{JobCommand, JobDescription, JobSpec};

    fn set(ids: &[&str]) -> HashSet<JobId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn graph() -> JobGraph {
        let mut desc = JobDescription::new();
        desc.insert("A".into(), JobSpec::new(JobCommand::new("true")));
        desc.insert("B".into(), JobSpec::new(JobCommand::new("true")).requires("A"));
        desc.insert(
            "C".into(),
            JobSpec::new(JobCommand::new("true")).requires("A").requires("B"),
        );
        JobGraph::build(&desc).unwrap()
    }

    #[test]
    fn roots_are_ready_immediately() {
        let g = graph();
        let ready = compute_ready(&g, &set(&["A", "B", "C"]), &set(&[]));
        assert_eq!(ready, set(&["A"]));
    }

    #[test]
    fn partial_dependencies_are_not_enough() {
        let g = graph();
        let ready = compute_ready(&g, &set(&["B", "C"]), &set(&["A"]));
        assert_eq!(ready, set(&["B"]));

        let ready = compute_ready(&g, &set(&["C"]), &set(&["A", "B"]));
        assert_eq!(ready, set(&["C"]));
    }

    #[test]
    fn only_queued_jobs_are_reported() {
        let g = graph();
        let ready = compute_ready(&g, &set(&["C"]), &set(&["A"]));
        assert!(ready.is_empty());
    }

    #[test]
    fn unknown_job_is_never_ready() {
        let g = graph();
        assert!(!deps_satisfied(&g, "ghost", &set(&[])));
    }
}
