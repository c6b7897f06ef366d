// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_job_file;
use crate::config::model::JobFile;
use crate::dag::JobGraph;
use crate::engine::{Controller, ControllerOptions, JobEvent, JobExit, RunReport};
use crate::exec::ProcessExecutor;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - job file loading
/// - CLI overrides of the controller options
/// - graph validation (before any process is started)
/// - the controller with the real process executor
///
/// Returns `None` for `--dry-run`, otherwise the final report, which is
/// also printed to stdout.
pub async fn run(args: CliArgs) -> Result<Option<RunReport>> {
    let file = load_job_file(&args.jobs)
        .with_context(|| format!("loading job file '{}'", args.jobs))?;
    let options = resolve_options(file.options, &args);

    let graph = JobGraph::build(&file.jobs).context("validating job graph")?;
    info!(jobs = graph.len(), path = %args.jobs, "job graph validated");

    if args.dry_run {
        print_dry_run(&file, &graph, &options);
        return Ok(None);
    }

    let report = run_graph(graph, options, None).await?;
    println!("{report}");
    Ok(Some(report))
}

/// Run a validated graph with real processes and return the final report.
///
/// If `observer` is given, every [`JobEvent`] is sent to it as it happens.
pub async fn run_graph(
    graph: JobGraph,
    options: ControllerOptions,
    observer: Option<mpsc::UnboundedSender<JobEvent>>,
) -> errors::Result<RunReport> {
    let (exit_tx, exit_rx) = mpsc::channel::<JobExit>(64);
    let executor = ProcessExecutor::new(exit_tx);

    let mut controller = Controller::new(graph, options, exit_rx, executor);
    if let Some(observer) = observer {
        controller = controller.with_observer(observer);
    }
    controller.run().await
}

/// CLI flags win over `[controller]` values from the job file.
pub fn resolve_options(file: ControllerOptions, args: &CliArgs) -> ControllerOptions {
    ControllerOptions {
        worker_limit: args.workers.unwrap_or(file.worker_limit),
        idle_wait: args.idle_wait.unwrap_or(file.idle_wait),
    }
}

/// Dry-run output: options, launch layers, and per-job commands.
fn print_dry_run(file: &JobFile, graph: &JobGraph, options: &ControllerOptions) {
    println!("maestro dry-run");
    println!("  controller.workers = {}", options.worker_limit);
    println!("  controller.idle_wait = {:?}", options.idle_wait);
    println!();

    println!("launch layers:");
    for (depth, layer) in graph.topological_layers().iter().enumerate() {
        println!("  {depth}: {}", layer.join(", "));
    }
    println!();

    println!("jobs ({}):", file.jobs.len());
    for (id, spec) in file.jobs.iter() {
        println!("  - {id}");
        println!("      cmd: {}", spec.command);
        if !spec.require.is_empty() {
            println!("      require: {:?}", spec.require);
        }
    }

    debug!("dry-run complete (no execution)");
}
