pub mod builders;
pub mod fake_executor;

use std::sync::Once;
use std::time::Duration;

use maestro::dag::{JobGraph, JobId};
use maestro::engine::{Controller, ControllerOptions, JobEvent, JobExit, RunReport};
use maestro::errors::Result;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

use crate::fake_executor::FakeExecutor;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Everything observable about a run driven by a [`FakeExecutor`].
#[derive(Debug)]
pub struct FakeRun {
    pub report: Result<RunReport>,
    /// Events in the order the controller emitted them.
    pub events: Vec<JobEvent>,
    /// Jobs in the order they were handed to the executor.
    pub launched: Vec<JobId>,
}

/// Drive `graph` to completion with a fake executor.
///
/// `failing` jobs exit with code 1; each exit is delivered after `delay`.
pub async fn run_fake(graph: JobGraph, worker_limit: i64, failing: &[&str], delay: Duration) -> FakeRun {
    let (exit_tx, exit_rx) = mpsc::channel::<JobExit>(64);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<JobEvent>();

    let executor = FakeExecutor::new(exit_tx).failing(failing).with_delay(delay);
    let launched = executor.launched();

    let options = ControllerOptions {
        worker_limit,
        idle_wait: Duration::from_millis(10),
    };
    let controller = Controller::new(graph, options, exit_rx, executor).with_observer(event_tx);
    let report = with_timeout(controller.run()).await;

    let mut events = Vec::new();
    while let Ok(event) = event_rx.try_recv() {
        events.push(event);
    }
    let launched = launched.lock().unwrap().clone();

    FakeRun {
        report,
        events,
        launched,
    }
}
