//! Read-only adjacency shared by the graph, its masked views, and contracted graphs.
//!
//! Traversals are written once here against [`Topology`] so that rules can run
//! the same algorithm over the whole graph or over a partition of it.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::graph::{ElementId, ElementSet, ScopeId};

/// The vertex set left over when a topological sort stalls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cycle among {} elements starting at {}", .0.len(), first(.0))]
pub struct CycleError(pub ElementSet);

fn first(set: &ElementSet) -> String {
    set.first().map_or_else(|| "?".to_owned(), ToString::to_string)
}

pub trait Topology {
    /// Live vertices in ascending id order.
    fn vertices(&self) -> Vec<ElementId>;

    fn contains_vertex(&self, vertex: ElementId) -> bool;

    /// Outgoing edges of `vertex` as `(scope, target)`, every parallel edge included.
    fn edges_out(&self, vertex: ElementId) -> Vec<(ScopeId, ElementId)>;

    /// Incoming edges of `vertex` as `(scope, origin)`.
    fn edges_in(&self, vertex: ElementId) -> Vec<(ScopeId, ElementId)>;

    fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    fn in_degree(&self, vertex: ElementId) -> usize {
        self.edges_in(vertex).len()
    }

    fn out_degree(&self, vertex: ElementId) -> usize {
        self.edges_out(vertex).len()
    }

    /// Distinct successors, ascending.
    fn successors(&self, vertex: ElementId) -> Vec<ElementId> {
        let set: BTreeSet<_> = self.edges_out(vertex).into_iter().map(|(_, t)| t).collect();
        set.into_iter().collect()
    }

    /// Distinct predecessors, ascending.
    fn predecessors(&self, vertex: ElementId) -> Vec<ElementId> {
        let set: BTreeSet<_> = self.edges_in(vertex).into_iter().map(|(_, o)| o).collect();
        set.into_iter().collect()
    }

    /// Vertices with no incoming edge.
    fn roots(&self) -> Vec<ElementId> {
        self.vertices()
            .into_iter()
            .filter(|v| self.in_degree(*v) == 0)
            .collect()
    }

    /// Vertices with no outgoing edge.
    fn leaves(&self) -> Vec<ElementId> {
        self.vertices()
            .into_iter()
            .filter(|v| self.out_degree(*v) == 0)
            .collect()
    }

    /// Kahn's algorithm, always releasing the smallest ready id first.
    fn topological_order(&self) -> Result<Vec<ElementId>, CycleError> {
        let vertices = self.vertices();
        let mut pending: BTreeMap<ElementId, usize> = vertices
            .iter()
            .map(|v| (*v, self.in_degree(*v)))
            .collect();
        let mut ready: BTreeSet<ElementId> = pending
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(v, _)| *v)
            .collect();
        let mut order = Vec::with_capacity(vertices.len());

        while let Some(v) = ready.pop_first() {
            pending.remove(&v);
            order.push(v);
            for (_, target) in self.edges_out(v) {
                if let Some(d) = pending.get_mut(&target) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(target);
                    }
                }
            }
        }

        if pending.is_empty() {
            Ok(order)
        } else {
            Err(CycleError(pending.into_keys().collect()))
        }
    }

    /// Every vertex reachable from `vertex`, excluding itself unless on a cycle.
    fn descendants(&self, vertex: ElementId) -> ElementSet {
        walk(vertex, |v| self.successors(v))
    }

    /// Every vertex that reaches `vertex`.
    fn ancestors(&self, vertex: ElementId) -> ElementSet {
        walk(vertex, |v| self.predecessors(v))
    }

    fn is_reachable(&self, from: ElementId, to: ElementId) -> bool {
        from == to || self.descendants(from).contains(&to)
    }

    /// Every simple path from `from` to `to`, shortest first, ties broken by ids.
    ///
    /// The number of paths grows exponentially with the number of diamonds
    /// between the two vertices; callers keep the searched view small.
    fn paths_between(&self, from: ElementId, to: ElementId) -> Vec<Vec<ElementId>> {
        if !self.contains_vertex(from) || !self.contains_vertex(to) {
            return Vec::new();
        }
        let mut paths = Vec::new();
        let mut stack = vec![from];
        let mut on_path = ElementSet::from([from]);
        collect_paths(self, to, &mut stack, &mut on_path, &mut paths);
        paths.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        paths
    }

    /// The paths of minimal length between two vertices.
    fn shortest_paths(&self, from: ElementId, to: ElementId) -> Vec<Vec<ElementId>> {
        let mut paths = self.paths_between(from, to);
        if let Some(min) = paths.first().map(Vec::len) {
            paths.retain(|p| p.len() == min);
        }
        paths
    }

    /// Number of distinct paths from `from` to `to`, counting parallel edges once.
    fn path_count(&self, from: ElementId, to: ElementId) -> usize {
        let Ok(order) = self.topological_order() else {
            return 0;
        };
        let mut counts: BTreeMap<ElementId, usize> = BTreeMap::new();
        counts.insert(from, 1);
        for v in order {
            let Some(&n) = counts.get(&v) else { continue };
            if v == to {
                continue;
            }
            for s in self.successors(v) {
                *counts.entry(s).or_default() += n;
            }
        }
        counts.get(&to).copied().unwrap_or(0)
    }
}

fn walk<F>(start: ElementId, mut next: F) -> ElementSet
where
    F: FnMut(ElementId) -> Vec<ElementId>,
{
    let mut seen = ElementSet::new();
    let mut queue = VecDeque::from([start]);
    while let Some(v) = queue.pop_front() {
        for n in next(v) {
            if seen.insert(n) {
                queue.push_back(n);
            }
        }
    }
    seen
}

fn collect_paths<T: Topology + ?Sized>(
    topology: &T,
    to: ElementId,
    stack: &mut Vec<ElementId>,
    on_path: &mut ElementSet,
    paths: &mut Vec<Vec<ElementId>>,
) {
    let Some(&current) = stack.last() else {
        return;
    };
    if current == to {
        paths.push(stack.clone());
        return;
    }
    for next in topology.successors(current) {
        if !on_path.insert(next) {
            continue;
        }
        stack.push(next);
        collect_paths(topology, to, stack, on_path, paths);
        stack.pop();
        on_path.remove(&next);
    }
}
