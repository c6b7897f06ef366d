// src/dag/job.rs

//! Job definitions: what the controller schedules.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Canonical job identifier type used throughout the crate.
pub type JobId = String;

/// Unvalidated job description: job id -> what to run and what it requires.
///
/// This is the in-memory form the graph builder consumes. It can come from
/// [`crate::config::load_job_file`] or be assembled directly in code.
pub type JobDescription = BTreeMap<JobId, JobSpec>;

/// Executable plus arguments.
///
/// The command is run directly (no shell), so `program` is looked up on
/// `PATH` and `args` are passed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl JobCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Build a command from an argv vector (`["prog", "arg1", ...]`).
    ///
    /// Returns `None` for an empty vector.
    pub fn from_argv<I, S>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = argv.into_iter().map(Into::into);
        let program = iter.next()?;
        Some(Self {
            program,
            args: iter.collect(),
        })
    }
}

impl fmt::Display for JobCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// One entry of a [`JobDescription`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub command: JobCommand,
    /// Ids of the jobs that must finish successfully before this one starts.
    pub require: BTreeSet<JobId>,
}

impl JobSpec {
    pub fn new(command: JobCommand) -> Self {
        Self {
            command,
            require: BTreeSet::new(),
        }
    }

    pub fn requires(mut self, job: impl Into<JobId>) -> Self {
        self.require.insert(job.into());
        self
    }
}

/// A validated job inside a [`crate::dag::JobGraph`]. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub command: JobCommand,
    /// Direct dependencies exactly as declared.
    pub requires: BTreeSet<JobId>,
}

/// A job the controller wants the executor to launch now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledJob {
    pub id: JobId,
    pub command: JobCommand,
}

impl ScheduledJob {
    pub fn from_job(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            command: job.command.clone(),
        }
    }
}
