// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{JobFile, RawJobFile};
use crate::errors::Result;

/// Read and deserialize a job file without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawJobFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawJobFile = toml::from_str(&contents)?;
    debug!(path = %path.display(), jobs = raw.job.len(), "job file parsed");

    Ok(raw)
}

/// Load a job file and run the file-level checks.
///
/// This is the entry point the CLI uses:
///
/// - Reads TOML.
/// - Applies `[controller]` defaults.
/// - Checks that there is at least one job, every `cmd` is non-empty and
///   `idle_wait` parses.
///
/// Graph-level validation (unknown `require` ids, cycles) is left to
/// [`crate::dag::JobGraph::build`], so it applies equally to descriptions
/// built in code.
pub fn load_job_file(path: impl AsRef<Path>) -> Result<JobFile> {
    let raw = load_from_path(&path)?;
    JobFile::try_from(raw)
}

