// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, warn};

use crate::dag::cycle::has_cycle;
use crate::dag::job::{Job, JobDescription, JobId};
use crate::errors::{MaestroError, Result};

/// Internal node structure: the job plus immediate deps and dependents.
#[derive(Debug, Clone)]
struct JobNode {
    job: Job,
    /// Direct dependencies with any self-dependency removed.
    deps: Vec<JobId>,
    /// Direct dependents: jobs that require this one.
    dependents: Vec<JobId>,
}

/// Validated dependency graph keyed by job id.
///
/// A `JobGraph` can only be obtained through [`JobGraph::build`], so every
/// dependency refers to a declared job and the graph is acyclic.
#[derive(Debug, Clone)]
pub struct JobGraph {
    nodes: HashMap<JobId, JobNode>,
}

impl JobGraph {
    /// Build and validate a graph from a job description.
    ///
    /// Fails with [`MaestroError::MalformedInput`] if a job requires an
    /// undeclared job, and with [`MaestroError::CyclicGraph`] if any job
    /// transitively requires itself (including `A requires A`).
    pub fn build(desc: &JobDescription) -> Result<Self> {
        validate_references(desc)?;

        // First pass: create nodes with their dependency lists.
        let mut nodes: HashMap<JobId, JobNode> = desc
            .iter()
            .map(|(id, spec)| {
                let deps = spec.require.iter().filter(|dep| *dep != id).cloned().collect();
                let job = Job {
                    id: id.clone(),
                    command: spec.command.clone(),
                    requires: spec.require.clone(),
                };
                (
                    id.clone(),
                    JobNode {
                        job,
                        deps,
                        dependents: Vec::new(),
                    },
                )
            })
            .collect();

        // Second pass: populate dependents based on deps.
        for (id, spec) in desc.iter() {
            for dep in spec.require.iter().filter(|dep| *dep != id) {
                if let Some(dep_node) = nodes.get_mut(dep) {
                    dep_node.dependents.push(id.clone());
                }
            }
        }

        let graph = Self { nodes };
        {
            let adjacency = graph.adjacency();
            if has_cycle(&adjacency) {
                let cyclic = CyclicGraph::from_adjacency(&adjacency);
                warn!(jobs = %cyclic, "job graph contains a cycle");
                return Err(MaestroError::CyclicGraph(cyclic));
            }
        }

        debug!(jobs = graph.len(), "job graph built");
        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn job(&self, id: &str) -> Option<&Job> {
        self.nodes.get(id).map(|n| &n.job)
    }

    /// All job ids, in no particular order.
    pub fn job_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    /// Immediate dependencies of a job, self-dependency excluded.
    pub fn dependencies_of(&self, id: &str) -> &[JobId] {
        self.nodes
            .get(id)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a job (jobs that list it in `require`).
    pub fn dependents_of(&self, id: &str) -> &[JobId] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Vertex -> "depends on" neighbours, as consumed by [`has_cycle`].
    pub fn adjacency(&self) -> HashMap<&str, Vec<&str>> {
        self.nodes
            .iter()
            .map(|(id, node)| {
                (
                    id.as_str(),
                    node.job.requires.iter().map(String::as_str).collect(),
                )
            })
            .collect()
    }

    /// Group jobs by depth: layer `n` holds the jobs whose longest chain of
    /// dependencies has length `n`. Each layer is sorted.
    pub fn topological_layers(&self) -> Vec<Vec<JobId>> {
        // Edge direction: dep -> job.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for id in self.nodes.keys() {
            graph.add_node(id.as_str());
        }
        for (id, node) in self.nodes.iter() {
            for dep in node.deps.iter() {
                graph.add_edge(dep.as_str(), id.as_str(), ());
            }
        }

        // Acyclicity was checked in `build`, so the sort cannot fail.
        let order = toposort(&graph, None).unwrap_or_default();

        let mut depth: HashMap<&str, usize> = HashMap::with_capacity(order.len());
        for id in order {
            let d = self
                .dependencies_of(id)
                .iter()
                .filter_map(|dep| depth.get(dep.as_str()))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);
            depth.insert(id, d);
        }

        let mut layers: BTreeMap<usize, Vec<JobId>> = BTreeMap::new();
        for (id, d) in depth {
            layers.entry(d).or_default().push(id.to_string());
        }
        layers
            .into_values()
            .map(|mut layer| {
                layer.sort();
                layer
            })
            .collect()
    }
}

fn validate_references(desc: &JobDescription) -> Result<()> {
    for (id, spec) in desc.iter() {
        if let Some(missing) = spec.require.iter().find(|dep| !desc.contains_key(*dep)) {
            warn!(job = %id, missing = %missing, "job requires an undeclared job");
            return Err(MaestroError::MalformedInput {
                job: id.clone(),
                missing: missing.clone(),
            });
        }
    }
    Ok(())
}

/// The cyclic part of a rejected job graph, kept for diagnostics.
///
/// Holds every job that sits on some cycle (members of a strongly connected
/// component with more than one job, plus self-dependent jobs) together
/// with its dependencies restricted to that set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicGraph {
    edges: BTreeMap<JobId, BTreeSet<JobId>>,
}

impl CyclicGraph {
    fn from_adjacency(adjacency: &HashMap<&str, Vec<&str>>) -> Self {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for (&id, deps) in adjacency.iter() {
            graph.add_node(id);
            for &dep in deps.iter() {
                graph.add_edge(id, dep, ());
            }
        }

        let mut members: BTreeSet<&str> = BTreeSet::new();
        for component in tarjan_scc(&graph) {
            if component.len() > 1 || component.iter().any(|&n| graph.contains_edge(n, n)) {
                members.extend(component);
            }
        }

        let edges = members
            .iter()
            .map(|&id| {
                let deps = adjacency
                    .get(id)
                    .into_iter()
                    .flatten()
                    .filter(|dep| members.contains(**dep))
                    .map(|dep| dep.to_string())
                    .collect();
                (id.to_string(), deps)
            })
            .collect();

        Self { edges }
    }

    /// Jobs that take part in a cycle, sorted.
    pub fn jobs(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(|s| s.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    /// Dependencies between cyclic jobs: job -> jobs it requires.
    pub fn edges(&self) -> &BTreeMap<JobId, BTreeSet<JobId>> {
        &self.edges
    }
}

impl fmt::Display for CyclicGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (id, deps) in self.edges.iter() {
            for dep in deps {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{id} -> {dep}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::job::{JobCommand, JobSpec};

    fn desc(edges: &[(&str, &[&str])]) -> JobDescription {
        edges
            .iter()
            .map(|(id, deps)| {
                let spec = deps
                    .iter()
                    .fold(JobSpec::new(JobCommand::new("true")), |s, d| s.requires(*d));
                (id.to_string(), spec)
            })
            .collect()
    }

    #[test]
    fn builds_dependents_from_requires() {
        let g = JobGraph::build(&desc(&[("A", &[]), ("B", &["A"]), ("C", &["A"])])).unwrap();

        assert_eq!(g.len(), 3);
        let mut dependents = g.dependents_of("A").to_vec();
        dependents.sort();
        assert_eq!(dependents, vec!["B", "C"]);
        assert_eq!(g.dependencies_of("B"), ["A".to_string()]);
        assert!(g.dependencies_of("unknown").is_empty());
    }

    #[test]
    fn unknown_dependency_is_malformed() {
        let err = JobGraph::build(&desc(&[("A", &["ghost"])])).unwrap_err();
        match err {
            MaestroError::MalformedInput { job, missing } => {
                assert_eq!(job, "A");
                assert_eq!(missing, "ghost");
            }
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn two_cycle_carries_both_jobs() {
        let err = JobGraph::build(&desc(&[("A", &["B"]), ("B", &["A"]), ("C", &[])])).unwrap_err();
        let MaestroError::CyclicGraph(cyclic) = err else {
            panic!("expected CyclicGraph");
        };
        assert_eq!(cyclic.jobs().collect::<Vec<_>>(), vec!["A", "B"]);
        assert!(!cyclic.contains("C"));
        assert_eq!(cyclic.to_string(), "A -> B, B -> A");
    }

    #[test]
    fn self_dependency_is_rejected() {
        let err = JobGraph::build(&desc(&[("A", &["A"]), ("B", &["A"])])).unwrap_err();
        let MaestroError::CyclicGraph(cyclic) = err else {
            panic!("expected CyclicGraph");
        };
        assert_eq!(cyclic.jobs().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn adjacency_keeps_declared_requirements() {
        let g = JobGraph::build(&desc(&[("A", &[]), ("B", &["A"]), ("C", &["A", "B"])])).unwrap();
        let adj = g.adjacency();
        assert_eq!(adj.len(), 3);
        assert!(adj["A"].is_empty());
        let mut c = adj["C"].clone();
        c.sort();
        assert_eq!(c, vec!["A", "B"]);
        assert!(!has_cycle(&adj));
    }

    #[test]
    fn layers_follow_longest_chain() {
        let g = JobGraph::build(&desc(&[
            ("A", &[]),
            ("B", &["A"]),
            ("C", &["A", "B"]),
            ("D", &[]),
        ]))
        .unwrap();

        assert_eq!(
            g.topological_layers(),
            vec![
                vec!["A".to_string(), "D".to_string()],
                vec!["B".to_string()],
                vec!["C".to_string()],
            ]
        );
    }
}
