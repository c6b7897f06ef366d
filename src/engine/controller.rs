// src/engine/controller.rs

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::dag::JobGraph;
use crate::errors::{MaestroError, Result};
use crate::exec::ExecutorBackend;

use super::core::{ControllerCore, CoreStep};
use super::{ControllerOptions, JobEvent, JobExit, RunReport};

/// Async shell around [`ControllerCore`].
///
/// Hands dispatched jobs to an [`ExecutorBackend`], picks up
/// [`JobExit`]s from `exit_rx`, and forwards [`JobEvent`]s to an optional
/// observer. All state changes happen on the task running
/// [`Controller::run`].
pub struct Controller<E: ExecutorBackend> {
    core: ControllerCore,
    exit_rx: mpsc::Receiver<JobExit>,
    executor: E,
    idle_wait: Duration,
    observer: Option<mpsc::UnboundedSender<JobEvent>>,
}

impl<E: ExecutorBackend> fmt::Debug for Controller<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("core", &self.core)
            .field("idle_wait", &self.idle_wait)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Controller<E> {
    /// `exit_rx` must be the receiving end of the channel `executor` reports
    /// exits on.
    pub fn new(
        graph: JobGraph,
        options: ControllerOptions,
        exit_rx: mpsc::Receiver<JobExit>,
        executor: E,
    ) -> Self {
        Self {
            core: ControllerCore::new(graph, options.worker_limit),
            exit_rx,
            executor,
            idle_wait: options.idle_wait,
            observer: None,
        }
    }

    /// Send every [`JobEvent`] to `observer` as it happens.
    pub fn with_observer(mut self, observer: mpsc::UnboundedSender<JobEvent>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run every job to a terminal state and return the final partition.
    ///
    /// Each iteration drains the exits already reported, launches ready jobs
    /// up to the worker limit, and, if neither produced anything, waits for
    /// the next exit for at most `idle_wait`.
    ///
    /// With a worker limit of zero or less this returns immediately and
    /// every job is reported as not started.
    pub async fn run(mut self) -> Result<RunReport> {
        if self.core.worker_limit() == 0 {
            warn!(
                jobs = self.core.graph().len(),
                "no job can be done with no workers; returning without starting anything"
            );
            return Ok(self.core.into_report());
        }

        info!(
            jobs = self.core.graph().len(),
            worker_limit = self.core.worker_limit(),
            idle_wait_ms = self.idle_wait.as_millis() as u64,
            "controller started"
        );

        while !self.core.is_done() {
            let mut changed = self.poll_exits()?;

            let step = self.core.launch_ready()?;
            if !step.dispatch.is_empty() {
                changed = true;
                self.dispatch(step).await?;
            }

            if self.core.is_done() {
                break;
            }

            if let Some(stuck) = self.core.stalled() {
                error!(?stuck, "no running job and nothing ready; giving up");
                return Err(MaestroError::Stalled(stuck));
            }

            if !changed {
                self.idle().await?;
            }
        }

        let report = self.core.into_report();
        info!(
            finished = report.finished.len(),
            failed = report.failed.len(),
            ignored = report.ignored.len(),
            "controller finished"
        );
        Ok(report)
    }

    /// Apply every exit already waiting in the channel without blocking.
    ///
    /// Returns `true` if at least one exit was applied.
    fn poll_exits(&mut self) -> Result<bool> {
        let mut applied = false;
        loop {
            match self.exit_rx.try_recv() {
                Ok(exit) => {
                    self.apply_exit(exit)?;
                    applied = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    let running = self.core.state().running_len();
                    if running > 0 {
                        return Err(MaestroError::ExecutorClosed(running));
                    }
                    break;
                }
            }
        }
        Ok(applied)
    }

    /// Wait for the next exit, bounded by `idle_wait`.
    async fn idle(&mut self) -> Result<()> {
        match timeout(self.idle_wait, self.exit_rx.recv()).await {
            Ok(Some(exit)) => self.apply_exit(exit),
            Ok(None) => Err(MaestroError::ExecutorClosed(
                self.core.state().running_len(),
            )),
            Err(_elapsed) => {
                debug!(
                    running = self.core.state().running_len(),
                    "idle wait elapsed without a job exit"
                );
                Ok(())
            }
        }
    }

    fn apply_exit(&mut self, exit: JobExit) -> Result<()> {
        debug!(?exit, "controller received job exit");
        let step = self.core.handle_exit(exit)?;
        self.emit(step.events);
        Ok(())
    }

    async fn dispatch(&mut self, step: CoreStep) -> Result<()> {
        let CoreStep { dispatch, events } = step;
        self.executor.spawn_ready_jobs(dispatch).await?;
        self.emit(events);
        Ok(())
    }

    fn emit(&self, events: Vec<JobEvent>) {
        for event in &events {
            debug!(job = %event.job(), ?event, "job event");
        }
        let Some(observer) = &self.observer else {
            return;
        };
        for event in events {
            if observer.send(event).is_err() {
                debug!("job event observer dropped; events are no longer delivered");
                return;
            }
        }
    }
}
