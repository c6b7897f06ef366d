// src/config/validate.rs

use tracing::warn;

use crate::config::duration::parse_duration;
use crate::config::model::{JobFile, RawJobFile};
use crate::dag::{JobCommand, JobDescription, JobSpec};
use crate::engine::ControllerOptions;
use crate::errors::{MaestroError, Result};

impl TryFrom<RawJobFile> for JobFile {
    type Error = MaestroError;

    fn try_from(raw: RawJobFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_jobs(&raw)?;
        let options = controller_options(&raw)?;
        let jobs = job_description(raw)?;
        Ok(JobFile { options, jobs })
    }
}

fn ensure_has_jobs(raw: &RawJobFile) -> Result<()> {
    if raw.job.is_empty() {
        return Err(MaestroError::ConfigError(
            "job file must contain at least one [job.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn controller_options(raw: &RawJobFile) -> Result<ControllerOptions> {
    let idle_wait = parse_duration(&raw.controller.idle_wait).map_err(|e| {
        MaestroError::ConfigError(format!("[controller].idle_wait: {e}"))
    })?;

    if raw.controller.workers <= 0 {
        warn!(
            workers = raw.controller.workers,
            "[controller].workers is not positive; no job will be run"
        );
    }

    Ok(ControllerOptions {
        worker_limit: raw.controller.workers,
        idle_wait,
    })
}

fn job_description(raw: RawJobFile) -> Result<JobDescription> {
    let mut jobs = JobDescription::new();
    for (id, job) in raw.job {
        if job.cmd.first().is_none_or(|program| program.trim().is_empty()) {
            return Err(MaestroError::ConfigError(format!(
                "job '{id}' has an empty `cmd`; expected [\"program\", \"arg\", ...]"
            )));
        }
        let Some(command) = JobCommand::from_argv(job.cmd) else {
            continue;
        };
        let spec = job
            .require
            .into_iter()
            .fold(JobSpec::new(command), JobSpec::requires);
        jobs.insert(id, spec);
    }
    Ok(jobs)
}
