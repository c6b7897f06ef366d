// src/engine/mod.rs

//! Worker pool controller.
//!
//! The controller drives one run of a [`crate::dag::JobGraph`] to
//! completion: it launches ready jobs up to the worker limit, reacts to job
//! exits, and cascades failures.
//!
//! The pure, synchronous state machine lives in [`core`]; the async shell
//! that talks to the executor and waits for exits is [`controller`].

use std::time::Duration;

use crate::dag::JobId;

/// How a job process ended, as far as the controller cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    /// Non-zero exit code, or `-1` if the process could not be spawned,
    /// waited on, or was killed by a signal.
    Failed(i32),
}

impl JobOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, JobOutcome::Success)
    }
}

/// Exit notification sent by an executor when a launched job ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobExit {
    pub job: JobId,
    pub outcome: JobOutcome,
}

/// Per-job transition events, emitted as they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    /// The job was handed to the executor.
    Started { job: JobId },
    /// The job exited successfully.
    Succeeded { job: JobId },
    /// The job exited with an error.
    Failed { job: JobId, exit_code: i32 },
    /// The job will never run because `cause` failed or was ignored.
    Ignored { job: JobId, cause: JobId },
}

impl JobEvent {
    pub fn job(&self) -> &str {
        match self {
            JobEvent::Started { job }
            | JobEvent::Succeeded { job }
            | JobEvent::Failed { job, .. }
            | JobEvent::Ignored { job, .. } => job,
        }
    }
}

/// Controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Maximum number of jobs running at once. Zero or negative means no job
    /// is ever started and the run returns immediately.
    pub worker_limit: i64,
    /// Upper bound on how long the controller sleeps when nothing happened
    /// in an iteration. A job exit wakes it early.
    pub idle_wait: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            worker_limit: 1,
            idle_wait: Duration::from_secs(1),
        }
    }
}

pub mod controller;
pub mod core;
pub mod report;

pub use controller::Controller;
pub use core::{ControllerCore, CoreStep};
pub use report::RunReport;
