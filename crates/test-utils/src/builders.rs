#![allow(dead_code)]

use maestro::dag::{JobCommand, JobDescription, JobGraph, JobSpec};

/// Builder for `JobDescription` to simplify test setup.
pub struct DescriptionBuilder {
    jobs: JobDescription,
}

impl DescriptionBuilder {
    pub fn new() -> Self {
        Self {
            jobs: JobDescription::new(),
        }
    }

    pub fn with_job(mut self, id: &str, spec: JobSpec) -> Self {
        self.jobs.insert(id.to_string(), spec);
        self
    }

    /// Shorthand: a job running `true` that requires `deps`.
    pub fn with_noop(self, id: &str, deps: &[&str]) -> Self {
        let spec = deps
            .iter()
            .fold(JobSpecBuilder::new(&["true"]), |b, d| b.requires(d))
            .build();
        self.with_job(id, spec)
    }

    pub fn build(self) -> JobDescription {
        self.jobs
    }

    pub fn build_graph(self) -> JobGraph {
        JobGraph::build(&self.jobs).expect("Failed to build valid graph from builder")
    }
}

impl Default for DescriptionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `JobSpec`.
pub struct JobSpecBuilder {
    spec: JobSpec,
}

impl JobSpecBuilder {
    /// `argv[0]` is the program, the rest are its arguments.
    pub fn new(argv: &[&str]) -> Self {
        let command = JobCommand::from_argv(argv.iter().copied()).expect("argv must not be empty");
        Self {
            spec: JobSpec::new(command),
        }
    }

    /// A job running `sh -c <script>`.
    pub fn shell(script: &str) -> Self {
        Self::new(&["sh", "-c", script])
    }

    pub fn requires(mut self, dep: &str) -> Self {
        self.spec.require.insert(dep.to_string());
        self
    }

    pub fn build(self) -> JobSpec {
        self.spec
    }
}

/// Graph from `(id, deps)` pairs where every job runs `true`.
pub fn graph_from_edges(edges: &[(&str, &[&str])]) -> JobGraph {
    edges
        .iter()
        .fold(DescriptionBuilder::new(), |b, (id, deps)| b.with_noop(id, deps))
        .build_graph()
}
