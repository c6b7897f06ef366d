// src/engine/core.rs

//! Pure core of the worker pool controller.
//!
//! `ControllerCore` owns the validated graph, the run state and the worker
//! limit. It consumes job exits and produces the jobs to launch next plus
//! the transition events, without touching channels, timers or processes.

use tracing::{debug, info, warn};

use crate::dag::{JobGraph, JobId, RunState, ScheduledJob};
use crate::engine::{JobEvent, JobExit, JobOutcome, RunReport};
use crate::errors::{MaestroError, Result};

/// What the IO shell should do after a core step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreStep {
    /// Jobs to hand to the executor, already marked running.
    pub dispatch: Vec<ScheduledJob>,
    /// Transition events produced by this step, in order.
    pub events: Vec<JobEvent>,
}

impl CoreStep {
    pub fn is_empty(&self) -> bool {
        self.dispatch.is_empty() && self.events.is_empty()
    }
}

#[derive(Debug)]
pub struct ControllerCore {
    graph: JobGraph,
    state: RunState,
    worker_limit: usize,
}

impl ControllerCore {
    /// A worker limit of zero or less is kept as zero: the core then never
    /// dispatches anything.
    pub fn new(graph: JobGraph, worker_limit: i64) -> Self {
        let state = RunState::new(&graph);
        Self {
            graph,
            state,
            worker_limit: usize::try_from(worker_limit).unwrap_or(0),
        }
    }

    pub fn graph(&self) -> &JobGraph {
        &self.graph
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn worker_limit(&self) -> usize {
        self.worker_limit
    }

    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }

    /// Record a job exit: finished on success, failed plus cascade otherwise.
    pub fn handle_exit(&mut self, exit: JobExit) -> Result<CoreStep> {
        let JobExit { job, outcome } = exit;
        let completion = self.state.complete(&self.graph, &job, outcome)?;
        let elapsed_ms = completion.elapsed.as_millis() as u64;

        let mut events = Vec::with_capacity(1 + completion.newly_ignored.len());
        match outcome {
            JobOutcome::Success => {
                info!(job = %job, elapsed_ms, "job finished with SUCCESS");
                events.push(JobEvent::Succeeded { job });
            }
            JobOutcome::Failed(code) => {
                warn!(
                    job = %job,
                    exit_code = code,
                    elapsed_ms,
                    ignored = completion.newly_ignored.len(),
                    "job finished with FAILURE; ignoring its dependents"
                );
                events.push(JobEvent::Failed {
                    job,
                    exit_code: code,
                });
                for (ignored, cause) in completion.newly_ignored {
                    info!(job = %ignored, cause = %cause, "job ignored");
                    events.push(JobEvent::Ignored { job: ignored, cause });
                }
            }
        }

        Ok(CoreStep {
            dispatch: Vec::new(),
            events,
        })
    }

    /// Move ready jobs to running until the worker limit is reached.
    ///
    /// Which of several equally ready jobs goes first is unspecified.
    pub fn launch_ready(&mut self) -> Result<CoreStep> {
        let free = self.worker_limit.saturating_sub(self.state.running_len());
        if free == 0 {
            return Ok(CoreStep::default());
        }

        let ready = self.state.ready(&self.graph);
        let mut step = CoreStep::default();

        for id in ready.into_iter().take(free) {
            let job = self
                .graph
                .job(&id)
                .ok_or_else(|| MaestroError::UnknownJob(id.clone()))?;
            self.state.start(&id)?;
            info!(job = %id, cmd = %job.command, "starting job");
            step.dispatch.push(ScheduledJob::from_job(job));
            step.events.push(JobEvent::Started { job: id });
        }

        if !step.dispatch.is_empty() {
            debug!(
                launched = step.dispatch.len(),
                running = self.state.running_len(),
                queued = self.state.queued().len(),
                "dispatching ready jobs"
            );
        }
        Ok(step)
    }

    /// Queued jobs that can never start: nothing is running and none of
    /// them is ready. Always `None` for a validated graph.
    pub fn stalled(&self) -> Option<Vec<JobId>> {
        if self.state.running_len() > 0 || self.state.queued().is_empty() {
            return None;
        }
        if !self.state.ready(&self.graph).is_empty() {
            return None;
        }
        let mut stuck: Vec<JobId> = self.state.queued().iter().cloned().collect();
        stuck.sort();
        Some(stuck)
    }

    pub fn into_report(self) -> RunReport {
        self.state.into_report()
    }
}
