// src/exec/job_runner.rs

//! Individual job process runner.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::dag::ScheduledJob;
use crate::engine::{JobExit, JobOutcome};

/// Spawn the job's process now and watch it on a background task.
///
/// Never blocks on the process. Exactly one [`JobExit`] is sent for the job;
/// if the process cannot be spawned, that exit is `Failed(-1)`.
///
/// Must be called from within a Tokio runtime.
pub fn launch_job(job: ScheduledJob, exit_tx: mpsc::Sender<JobExit>) {
    match spawn_child(&job) {
        Ok(child) => {
            tokio::spawn(watch_child(job, child, exit_tx));
        }
        Err(err) => {
            error!(job = %job.id, error = %format!("{err:#}"), "failed to launch job");
            tokio::spawn(async move {
                report_exit(&exit_tx, job.id, JobOutcome::Failed(-1)).await;
            });
        }
    }
}

fn spawn_child(job: &ScheduledJob) -> Result<Child> {
    let mut cmd = Command::new(&job.command.program);
    cmd.args(&job.command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = cmd
        .spawn()
        .with_context(|| format!("spawning process for job '{}' ({})", job.id, job.command))?;

    debug!(job = %job.id, pid = ?child.id(), "job process spawned");
    Ok(child)
}

async fn watch_child(job: ScheduledJob, mut child: Child, exit_tx: mpsc::Sender<JobExit>) {
    // Always consume output so pipe buffers don't fill; log at debug.
    if let Some(stdout) = child.stdout.take() {
        drain_lines(job.id.clone(), "stdout", stdout);
    }
    if let Some(stderr) = child.stderr.take() {
        drain_lines(job.id.clone(), "stderr", stderr);
    }

    let outcome = match child
        .wait()
        .await
        .with_context(|| format!("waiting for process of job '{}'", job.id))
    {
        Ok(status) => {
            let code = status.code().unwrap_or(-1);
            info!(
                job = %job.id,
                exit_code = code,
                success = status.success(),
                "job process exited"
            );
            if status.success() {
                JobOutcome::Success
            } else {
                JobOutcome::Failed(code)
            }
        }
        Err(err) => {
            error!(job = %job.id, error = %format!("{err:#}"), "job process could not be waited on");
            JobOutcome::Failed(-1)
        }
    };

    report_exit(&exit_tx, job.id, outcome).await;
}

fn drain_lines<R>(job: String, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(job = %job, stream, "{}", line);
        }
    });
}

async fn report_exit(exit_tx: &mpsc::Sender<JobExit>, job: String, outcome: JobOutcome) {
    if exit_tx
        .send(JobExit {
            job: job.clone(),
            outcome,
        })
        .await
        .is_err()
    {
        warn!(job = %job, "controller is gone; job exit not delivered");
    }
}
