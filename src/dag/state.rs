// src/dag/state.rs

//! Per-run partition of job ids and the transitions between its sets.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::dag::cascade::cascade_failure;
use crate::dag::graph::JobGraph;
use crate::dag::job::JobId;
use crate::dag::readiness::compute_ready;
use crate::engine::{JobOutcome, RunReport};
use crate::errors::{MaestroError, Result};

/// Where a job currently sits in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// Not started yet.
    Queued,
    /// Launched and not yet observed to exit.
    Running,
    /// Exited successfully.
    Finished,
    /// Exited with an error (or could not be launched).
    Failed,
    /// Skipped because a dependency failed.
    Ignored,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Finished | JobStatus::Failed | JobStatus::Ignored
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Finished => "finished",
            JobStatus::Failed => "failed",
            JobStatus::Ignored => "ignored",
        };
        f.write_str(s)
    }
}

/// Bookkeeping for a launched job. The process itself is owned by the
/// executor.
#[derive(Debug, Clone, Copy)]
pub struct RunningJob {
    pub started_at: Instant,
}

/// What a completion changed besides the completed job itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Time between launch and observed exit.
    pub elapsed: Duration,
    /// Jobs moved from queued to ignored: ignored job -> cause.
    pub newly_ignored: BTreeMap<JobId, JobId>,
}

/// The five disjoint sets that together always cover every job id.
///
/// Nothing outside this type mutates the sets; every move goes through
/// [`RunState::start`] or [`RunState::complete`], which reject transitions
/// the lifecycle does not allow.
#[derive(Debug, Clone)]
pub struct RunState {
    queued: HashSet<JobId>,
    running: HashMap<JobId, RunningJob>,
    finished: HashSet<JobId>,
    failed: HashSet<JobId>,
    ignored: HashSet<JobId>,
    total: usize,
}

impl RunState {
    /// Every job of the graph starts queued.
    pub fn new(graph: &JobGraph) -> Self {
        let queued: HashSet<JobId> = graph.job_ids().map(str::to_string).collect();
        let total = queued.len();
        Self {
            queued,
            running: HashMap::new(),
            finished: HashSet::new(),
            failed: HashSet::new(),
            ignored: HashSet::new(),
            total,
        }
    }

    pub fn queued(&self) -> &HashSet<JobId> {
        &self.queued
    }

    pub fn running(&self) -> impl Iterator<Item = &str> {
        self.running.keys().map(|s| s.as_str())
    }

    pub fn running_len(&self) -> usize {
        self.running.len()
    }

    pub fn finished(&self) -> &HashSet<JobId> {
        &self.finished
    }

    pub fn failed(&self) -> &HashSet<JobId> {
        &self.failed
    }

    pub fn ignored(&self) -> &HashSet<JobId> {
        &self.ignored
    }

    pub fn status_of(&self, id: &str) -> Option<JobStatus> {
        if self.queued.contains(id) {
            Some(JobStatus::Queued)
        } else if self.running.contains_key(id) {
            Some(JobStatus::Running)
        } else if self.finished.contains(id) {
            Some(JobStatus::Finished)
        } else if self.failed.contains(id) {
            Some(JobStatus::Failed)
        } else if self.ignored.contains(id) {
            Some(JobStatus::Ignored)
        } else {
            None
        }
    }

    /// No job is queued or running.
    pub fn is_done(&self) -> bool {
        self.queued.is_empty() && self.running.is_empty()
    }

    /// Queued jobs whose dependencies have all finished.
    pub fn ready(&self, graph: &JobGraph) -> HashSet<JobId> {
        compute_ready(graph, &self.queued, &self.finished)
    }

    /// `Queued -> Running`.
    pub fn start(&mut self, id: &str) -> Result<()> {
        if !self.queued.remove(id) {
            return Err(self.invalid(id, JobStatus::Running));
        }
        self.running.insert(
            id.to_string(),
            RunningJob {
                started_at: Instant::now(),
            },
        );
        debug_assert!(self.is_partition());
        Ok(())
    }

    /// `Running -> Finished` or `Running -> Failed`; a failure also moves
    /// every queued descendant to ignored.
    pub fn complete(&mut self, graph: &JobGraph, id: &str, outcome: JobOutcome) -> Result<Completion> {
        let target = if outcome.is_success() {
            JobStatus::Finished
        } else {
            JobStatus::Failed
        };
        let Some((id, running)) = self.running.remove_entry(id) else {
            return Err(self.invalid(id, target));
        };
        let elapsed = running.started_at.elapsed();

        let newly_ignored = match outcome {
            JobOutcome::Success => {
                self.finished.insert(id);
                BTreeMap::new()
            }
            JobOutcome::Failed(_) => {
                let cascade = cascade_failure(graph, &self.queued, &id);
                self.failed.insert(id);
                self.queued = cascade.queued;
                self.ignored
                    .extend(cascade.newly_ignored.keys().cloned());
                cascade.newly_ignored
            }
        };

        debug_assert!(self.is_partition());
        Ok(Completion {
            elapsed,
            newly_ignored,
        })
    }

    /// The five sets are pairwise disjoint and together hold every job.
    pub fn is_partition(&self) -> bool {
        let sizes = self.queued.len()
            + self.running.len()
            + self.finished.len()
            + self.failed.len()
            + self.ignored.len();
        if sizes != self.total {
            return false;
        }

        let union: HashSet<&str> = self
            .queued
            .iter()
            .chain(self.running.keys())
            .chain(self.finished.iter())
            .chain(self.failed.iter())
            .chain(self.ignored.iter())
            .map(String::as_str)
            .collect();
        union.len() == self.total
    }

    /// Final partition. Running jobs, if any, are reported as queued.
    pub fn into_report(self) -> RunReport {
        RunReport {
            finished: self.finished.into_iter().collect(),
            failed: self.failed.into_iter().collect(),
            ignored: self.ignored.into_iter().collect(),
            queued: self
                .queued
                .into_iter()
                .chain(self.running.into_keys())
                .collect(),
        }
    }

    fn invalid(&self, id: &str, to: JobStatus) -> MaestroError {
        match self.status_of(id) {
            Some(from) => {
                debug!(job = %id, %from, %to, "rejecting invalid transition");
                MaestroError::InvalidTransition {
                    job: id.to_string(),
                    from,
                    to,
                }
            }
            None => MaestroError::UnknownJob(id.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::job::{JobCommand, JobDescription, JobSpec};

    fn graph() -> JobGraph {
        let mut desc = JobDescription::new();
        desc.insert("A".into(), JobSpec::new(JobCommand::new("true")));
        desc.insert("B".into(), JobSpec::new(JobCommand::new("true")).requires("A"));
        desc.insert("C".into(), JobSpec::new(JobCommand::new("true")).requires("A"));
        desc.insert("D".into(), JobSpec::new(JobCommand::new("true")));
        JobGraph::build(&desc).unwrap()
    }

    #[test]
    fn new_state_has_everything_queued() {
        let g = graph();
        let state = RunState::new(&g);
        assert_eq!(state.queued().len(), 4);
        assert!(state.is_partition());
        assert!(!state.is_done());
        assert_eq!(state.status_of("A"), Some(JobStatus::Queued));
        assert_eq!(state.status_of("ghost"), None);
    }

    #[test]
    fn success_moves_to_finished() {
        let g = graph();
        let mut state = RunState::new(&g);

        state.start("A").unwrap();
        assert_eq!(state.status_of("A"), Some(JobStatus::Running));

        let done = state.complete(&g, "A", JobOutcome::Success).unwrap();
        assert!(done.newly_ignored.is_empty());
        assert_eq!(state.status_of("A"), Some(JobStatus::Finished));

        let mut ready: Vec<_> = state.ready(&g).into_iter().collect();
        ready.sort();
        assert_eq!(ready, vec!["B", "C", "D"]);
    }

    #[test]
    fn failure_ignores_dependents() {
        let g = graph();
        let mut state = RunState::new(&g);

        state.start("A").unwrap();
        let done = state.complete(&g, "A", JobOutcome::Failed(3)).unwrap();

        assert_eq!(done.newly_ignored.len(), 2);
        assert_eq!(state.status_of("A"), Some(JobStatus::Failed));
        assert_eq!(state.status_of("B"), Some(JobStatus::Ignored));
        assert_eq!(state.status_of("C"), Some(JobStatus::Ignored));
        assert_eq!(state.status_of("D"), Some(JobStatus::Queued));
        assert!(state.status_of("B").is_some_and(JobStatus::is_terminal));
        assert!(!JobStatus::Queued.is_terminal());
        assert!(state.is_partition());
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let g = graph();
        let mut state = RunState::new(&g);

        let err = state.complete(&g, "A", JobOutcome::Success).unwrap_err();
        assert!(matches!(
            err,
            MaestroError::InvalidTransition {
                from: JobStatus::Queued,
                to: JobStatus::Finished,
                ..
            }
        ));

        state.start("A").unwrap();
        state.complete(&g, "A", JobOutcome::Success).unwrap();
        let err = state.start("A").unwrap_err();
        assert!(matches!(
            err,
            MaestroError::InvalidTransition {
                from: JobStatus::Finished,
                ..
            }
        ));

        assert!(matches!(
            state.start("ghost").unwrap_err(),
            MaestroError::UnknownJob(_)
        ));
        assert!(state.is_partition());
    }

    #[test]
    fn report_lists_every_set() {
        let g = graph();
        let mut state = RunState::new(&g);
        state.start("A").unwrap();
        state.complete(&g, "A", JobOutcome::Failed(1)).unwrap();
        state.start("D").unwrap();
        state.complete(&g, "D", JobOutcome::Success).unwrap();
        assert!(state.is_done());
        assert_eq!(state.running().count(), 0);
        assert_eq!(state.failed().len(), 1);
        assert_eq!(state.ignored().len(), 2);

        let report = state.into_report();
        assert_eq!(report.finished.into_iter().collect::<Vec<_>>(), vec!["D"]);
        assert_eq!(report.failed.into_iter().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(report.ignored.into_iter().collect::<Vec<_>>(), vec!["B", "C"]);
        assert!(report.queued.is_empty());
    }
}
