// src/engine/report.rs

use std::collections::BTreeSet;
use std::fmt;

use crate::dag::JobId;

/// Final partition of a run.
///
/// `finished`, `failed` and `ignored` are kept apart so an operator can tell
/// a broken job from one that was skipped because an ancestor broke.
/// `queued` is only non-empty when the run never started (worker limit of
/// zero or less).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub finished: BTreeSet<JobId>,
    pub failed: BTreeSet<JobId>,
    pub ignored: BTreeSet<JobId>,
    pub queued: BTreeSet<JobId>,
}

impl RunReport {
    /// Every job finished successfully.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.ignored.is_empty() && self.queued.is_empty()
    }

    pub fn total(&self) -> usize {
        self.finished.len() + self.failed.len() + self.ignored.len() + self.queued.len()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FINISHED = {:?}", self.finished)?;
        writeln!(f, "FAILED = {:?}", self.failed)?;
        writeln!(f, "IGNORED = {:?}", self.ignored)?;
        if !self.queued.is_empty() {
            writeln!(f, "NOT STARTED = {:?}", self.queued)?;
        }
        write!(f, "---")
    }
}
