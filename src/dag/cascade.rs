// src/dag/cascade.rs

//! Failure propagation: a failed job takes its queued descendants with it.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::dag::graph::JobGraph;
use crate::dag::job::JobId;

/// Result of [`cascade_failure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// The queue with every ignored job removed.
    pub queued: HashSet<JobId>,
    /// Newly ignored job -> the job whose failure (or ignoring) reached it.
    pub newly_ignored: BTreeMap<JobId, JobId>,
}

/// Remove every queued job that transitively depends on `failed` from the
/// queue and report it as ignored.
///
/// Only jobs still in `queued` are touched and traversed through; a job is
/// ignored at most once even when it is reachable along several paths.
pub fn cascade_failure(graph: &JobGraph, queued: &HashSet<JobId>, failed: &str) -> CascadeOutcome {
    let mut remaining = queued.clone();
    let mut newly_ignored = BTreeMap::new();
    let mut frontier: Vec<JobId> = vec![failed.to_string()];

    while let Some(cause) = frontier.pop() {
        for dependent in graph.dependents_of(&cause) {
            if remaining.remove(dependent) {
                debug!(job = %dependent, cause = %cause, "ignoring job after upstream failure");
                newly_ignored.insert(dependent.clone(), cause.clone());
                frontier.push(dependent.clone());
            }
        }
    }

    CascadeOutcome {
        queued: remaining,
        newly_ignored,
    }
}
