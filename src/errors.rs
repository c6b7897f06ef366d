// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::dag::{CyclicGraph, JobId, JobStatus};

#[derive(Error, Debug)]
pub enum MaestroError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Malformed job description: job '{job}' requires unknown job '{missing}'")]
    MalformedInput { job: JobId, missing: JobId },

    #[error("Cycle detected in job graph: {0}")]
    CyclicGraph(CyclicGraph),

    #[error("Job not found: {0}")]
    UnknownJob(JobId),

    #[error("Invalid transition for job '{job}': {from} -> {to}")]
    InvalidTransition {
        job: JobId,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Scheduler stalled; nothing running and no queued job is ready: {0:?}")]
    Stalled(Vec<JobId>),

    #[error("Executor closed the exit channel with {0} job(s) still running")]
    ExecutorClosed(usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MaestroError>;
