// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs job commands with `tokio::process::Command` and reports each exit
//! back to the controller as a [`crate::engine::JobExit`].
//!
//! - [`backend`] provides the `ExecutorBackend` trait and the production
//!   `ProcessExecutor`; tests can replace it with a fake implementation.
//! - [`job_runner`] launches and watches an individual job process.

pub mod backend;
pub mod job_runner;

pub use backend::{ExecutorBackend, ProcessExecutor};
