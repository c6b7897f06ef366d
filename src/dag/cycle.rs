// src/dag/cycle.rs

//! Cycle detection over a plain adjacency map.

use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasher, Hash};

/// Returns `true` if the directed graph contains a cycle.
///
/// `graph` maps every vertex to an iterable of its neighbours (for job graphs
/// the edge means "depends on"). Self-loops count as cycles. Neighbours that
/// are not keys of the map are treated as vertices without outgoing edges.
///
/// The traversal is a depth-first search with an explicit stack, so very
/// deep graphs do not grow the call stack. Every vertex becomes a root at
/// most once; vertices reached from an earlier root are skipped.
///
/// ```
/// use std::collections::HashMap;
/// use maestro::dag::has_cycle;
///
/// let cyclic = HashMap::from([(0, vec![2]), (1, vec![0]), (2, vec![1])]);
/// assert!(has_cycle(&cyclic));
///
/// let acyclic = HashMap::from([(0, vec![]), (1, vec![0]), (2, vec![1])]);
/// assert!(!has_cycle(&acyclic));
/// ```
pub fn has_cycle<V, N, S>(graph: &HashMap<V, N, S>) -> bool
where
    V: Eq + Hash,
    S: BuildHasher,
    for<'a> &'a N: IntoIterator<Item = &'a V>,
{
    let mut visited: HashSet<&V> = HashSet::with_capacity(graph.len());
    let mut on_path: HashSet<&V> = HashSet::new();

    for (root, root_neighbours) in graph.iter() {
        if !visited.insert(root) {
            continue;
        }
        on_path.insert(root);
        let mut stack = vec![(root, root_neighbours.into_iter())];

        while let Some((vertex, neighbours)) = stack.last_mut() {
            let vertex: &V = *vertex;
            match neighbours.next() {
                Some(next) => {
                    if on_path.contains(&next) {
                        return true;
                    }
                    if !visited.insert(next) {
                        continue;
                    }
                    if let Some(next_neighbours) = graph.get(next) {
                        on_path.insert(next);
                        stack.push((next, next_neighbours.into_iter()));
                    }
                }
                None => {
                    on_path.remove(&vertex);
                    stack.pop();
                }
            }
        }
    }

    false
}
