// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The controller talks to an `ExecutorBackend` instead of spawning
//! processes itself. Production code uses [`ProcessExecutor`]; tests can
//! provide a fake that records launches and reports exits directly.
//!
//! Contract for implementations:
//! - `spawn_ready_jobs` must not wait for the jobs to finish;
//! - every job handed over must eventually produce exactly one
//!   [`JobExit`] on the channel the controller reads from, including jobs
//!   that could not be launched at all.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::debug;

use crate::dag::ScheduledJob;
use crate::engine::JobExit;
use crate::errors::Result;

use super::job_runner::launch_job;

/// Trait abstracting how dispatched jobs are executed.
pub trait ExecutorBackend: Send {
    /// Launch the given jobs and return without waiting for them.
    fn spawn_ready_jobs(
        &mut self,
        jobs: Vec<ScheduledJob>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real executor backend: one OS process per job.
///
/// Each child is awaited on its own Tokio task, which reports the exit on
/// `exit_tx`. Children are never killed by the executor; a launched job
/// always runs to completion.
pub struct ProcessExecutor {
    exit_tx: mpsc::Sender<JobExit>,
}

impl ProcessExecutor {
    pub fn new(exit_tx: mpsc::Sender<JobExit>) -> Self {
        Self { exit_tx }
    }
}

impl ExecutorBackend for ProcessExecutor {
    fn spawn_ready_jobs(
        &mut self,
        jobs: Vec<ScheduledJob>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.exit_tx.clone();

        Box::pin(async move {
            for job in jobs {
                debug!(job = %job.id, "handing job to process executor");
                launch_job(job, tx.clone());
            }
            Ok(())
        })
    }
}
