use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use maestro::dag::{JobId, ScheduledJob};
use maestro::engine::{JobExit, JobOutcome};
use maestro::exec::ExecutorBackend;
use maestro::errors::Result;

/// A fake executor that:
/// - records which jobs were "launched", in launch order
/// - reports `Failed(1)` for jobs in its failing set, `Success` otherwise
/// - delivers each exit from a spawned task, optionally after a delay.
pub struct FakeExecutor {
    exit_tx: mpsc::Sender<JobExit>,
    failing: HashSet<JobId>,
    delay: Duration,
    launched: Arc<Mutex<Vec<JobId>>>,
}

impl FakeExecutor {
    pub fn new(exit_tx: mpsc::Sender<JobExit>) -> Self {
        Self {
            exit_tx,
            failing: HashSet::new(),
            delay: Duration::ZERO,
            launched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(mut self, jobs: &[&str]) -> Self {
        self.failing.extend(jobs.iter().map(|j| j.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared handle to the launch log; stays readable after the executor
    /// has been moved into a controller.
    pub fn launched(&self) -> Arc<Mutex<Vec<JobId>>> {
        Arc::clone(&self.launched)
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_jobs(
        &mut self,
        jobs: Vec<ScheduledJob>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.exit_tx.clone();
        let launched = Arc::clone(&self.launched);
        let delay = self.delay;

        let exits: Vec<JobExit> = jobs
            .into_iter()
            .map(|job| {
                let outcome = if self.failing.contains(&job.id) {
                    JobOutcome::Failed(1)
                } else {
                    JobOutcome::Success
                };
                JobExit {
                    job: job.id,
                    outcome,
                }
            })
            .collect();

        Box::pin(async move {
            for exit in exits {
                {
                    let mut guard = launched.lock().unwrap();
                    guard.push(exit.job.clone());
                }

                let tx = tx.clone();
                tokio::spawn(async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let _ = tx.send(exit).await;
                });
            }
            Ok(())
        })
    }
}
