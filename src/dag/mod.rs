// src/dag/mod.rs

//! Job graph representation, validation and per-run state.
//!
//! - [`job`] holds the job description types.
//! - [`cycle`] is a standalone cycle detector over adjacency maps.
//! - [`graph`] builds and validates the [`JobGraph`].
//! - [`readiness`] decides which queued jobs can start.
//! - [`cascade`] propagates a failure to queued descendants.
//! - [`state`] owns the queued/running/finished/failed/ignored partition.

pub mod cascade;
pub mod cycle;
pub mod graph;
pub mod job;
pub mod readiness;
pub mod state;

pub use cascade::{CascadeOutcome, cascade_failure};
pub use cycle::has_cycle;
pub use graph::{CyclicGraph, JobGraph};
pub use job::{Job, JobCommand, JobDescription, JobId, JobSpec, ScheduledJob};
pub use readiness::compute_ready;
pub use state::{Completion, JobStatus, RunState};
