use std::collections::VecDeque;

use flowplan_core::{ElementGraph, ElementId, ScopeSet, SubGraph, Topology};

use super::{IteratorError, SubGraphIterator};

/// Splits every subgraph of the wrapped iterator into its source-to-sink paths.
///
/// Each wrapped subgraph must have exactly one source and one sink. Paths are
/// yielded shortest first (ties by element ids), or longest first when asked,
/// so a long chain can be peeled off whole before its shortcuts.
#[derive(Debug)]
pub struct PathIterator<I> {
    inner: I,
    longest_first: bool,
    queue: VecDeque<SubGraph>,
    pairs: Vec<(ElementId, ElementId)>,
}

impl<'g, I: SubGraphIterator<'g>> PathIterator<I> {
    pub fn new(inner: I, longest_first: bool) -> Self {
        Self {
            inner,
            longest_first,
            queue: VecDeque::new(),
            pairs: Vec::new(),
        }
    }

    fn fill(&mut self) -> Result<(), IteratorError> {
        while self.queue.is_empty() && self.inner.has_next() {
            let sub = self.inner.next()?;
            self.decompose(&sub)?;
        }
        Ok(())
    }

    fn decompose(&mut self, sub: &SubGraph) -> Result<(), IteratorError> {
        let graph = self.inner.graph();
        let view = sub.view(graph);
        let (roots, leaves) = (view.roots(), view.leaves());
        let (&[source], &[sink]) = (roots.as_slice(), leaves.as_slice()) else {
            return Err(IteratorError::NotSingleSourceSink {
                sources: roots.len(),
                sinks: leaves.len(),
            });
        };

        let mut paths = view.paths_between(source, sink);
        if self.longest_first {
            paths.reverse();
        }
        for path in paths {
            let scopes: ScopeSet = path
                .windows(2)
                .flat_map(|pair| graph.scopes_between(pair[0], pair[1]))
                .filter(|s| sub.contains_scope(*s))
                .collect();
            self.queue
                .push_back(SubGraph::new(path.into_iter().collect(), scopes));
        }
        self.pairs.push((source, sink));
        Ok(())
    }
}

impl<'g, I: SubGraphIterator<'g>> SubGraphIterator<'g> for PathIterator<I> {
    fn graph(&self) -> &'g ElementGraph {
        self.inner.graph()
    }

    fn domain(&self) -> &SubGraph {
        self.inner.domain()
    }

    fn has_next(&mut self) -> bool {
        !self.queue.is_empty() || self.inner.has_next()
    }

    fn next(&mut self) -> Result<SubGraph, IteratorError> {
        self.fill()?;
        self.queue.pop_front().ok_or(IteratorError::Exhausted)
    }

    fn decomposed_pairs(&self) -> &[(ElementId, ElementId)] {
        &self.pairs
    }
}
