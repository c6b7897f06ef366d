// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::dag::JobDescription;
use crate::engine::ControllerOptions;

/// Job file as read from TOML, before validation.
///
/// ```toml
/// [controller]
/// workers = 2
/// idle_wait = "500ms"
///
/// [job.build]
/// cmd = ["make", "all"]
///
/// [job.test]
/// cmd = ["make", "test"]
/// require = ["build"]
/// ```
///
/// `[controller]` is optional and has defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawJobFile {
    #[serde(default)]
    pub controller: ControllerSection,

    /// All jobs from `[job.<id>]`, keyed by job id.
    #[serde(default)]
    pub job: BTreeMap<String, JobConfig>,
}

/// `[controller]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerSection {
    /// Worker limit. Zero or negative means nothing is run.
    #[serde(default = "default_workers")]
    pub workers: i64,

    /// Upper bound on the idle wait between polls, e.g. `"1s"` or `"250ms"`.
    #[serde(default = "default_idle_wait")]
    pub idle_wait: String,
}

fn default_workers() -> i64 {
    1
}

fn default_idle_wait() -> String {
    "1s".to_string()
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            idle_wait: default_idle_wait(),
        }
    }
}

/// `[job.<id>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Executable followed by its arguments.
    pub cmd: Vec<String>,

    /// Jobs that must finish successfully first.
    #[serde(default)]
    pub require: Vec<String>,
}

/// A loaded and validated job file.
///
/// Dependency references and cycles are not checked here; that happens
/// when the description is turned into a [`crate::dag::JobGraph`].
#[derive(Debug, Clone)]
pub struct JobFile {
    pub options: ControllerOptions,
    pub jobs: JobDescription,
}
