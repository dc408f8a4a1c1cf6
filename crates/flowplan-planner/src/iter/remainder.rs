use std::collections::BTreeMap;

use flowplan_core::{ElementGraph, ElementId, ElementSet, ScopeId, SubGraph, Topology};

use super::{IteratorError, SubGraphIterator};
use crate::pattern::Capture;

/// Passes the wrapped partitions through, then yields what they left behind.
///
/// The remainder starts as every element of the domain (extents aside) that no
/// partition claimed. Then, for each root and leaf of that leftover, every
/// element and scope on a domain path from the root to the leaf is added
/// back, so that pieces separated by claimed runs stay connected. Pairs the
/// wrapped iterator already decomposed into paths are skipped.
///
/// With `multi_edge`, a claimed element joined to a single remainder element
/// by parallel scopes is added back as well.
#[derive(Debug)]
pub struct RemainderIterator<I> {
    inner: I,
    multi_edge: bool,
    mask: SubGraph,
    remainder: Option<SubGraph>,
    computed: bool,
}

impl<'g, I: SubGraphIterator<'g>> RemainderIterator<I> {
    pub fn new(inner: I, multi_edge: bool) -> Self {
        Self {
            inner,
            multi_edge,
            mask: SubGraph::default(),
            remainder: None,
            computed: false,
        }
    }

    /// Everything yielded by the wrapped iterator so far.
    pub fn mask(&self) -> &SubGraph {
        &self.mask
    }

    /// Whether the wrapped iterator is spent, so that the next subgraph, if
    /// any, is the remainder.
    pub fn at_remainder(&mut self) -> bool {
        !self.inner.has_next()
    }

    fn compute(&mut self) {
        if self.computed {
            return;
        }
        self.computed = true;

        let graph = self.inner.graph();
        let domain = self.inner.domain().clone().without_extents(graph);
        let base: ElementSet = domain
            .elements
            .difference(&self.mask.elements)
            .copied()
            .collect();
        if base.is_empty() {
            return;
        }

        let mut remainder = SubGraph::new(base.clone(), Default::default());
        let mut links: BTreeMap<ElementId, Vec<(ScopeId, ElementId)>> = BTreeMap::new();
        for s in domain.scopes.difference(&self.mask.scopes) {
            let scope = graph.scope(*s);
            match (base.contains(&scope.from), base.contains(&scope.to)) {
                (true, true) => {
                    remainder.scopes.insert(*s);
                }
                (false, true) => links.entry(scope.from).or_default().push((*s, scope.to)),
                (true, false) => links.entry(scope.to).or_default().push((*s, scope.from)),
                (false, false) => {}
            }
        }

        self.reconnect(&domain, &mut remainder);

        if self.multi_edge {
            for (claimed, edges) in links {
                let neighbours: ElementSet = edges.iter().map(|(_, v)| *v).collect();
                if edges.len() > neighbours.len() {
                    remainder.elements.insert(claimed);
                    remainder.scopes.extend(edges.iter().map(|(s, _)| *s));
                }
            }
        }

        self.remainder = Some(remainder);
    }

    /// Add back every domain path between a root and a leaf of `remainder`.
    fn reconnect(&self, domain: &SubGraph, remainder: &mut SubGraph) {
        let graph = self.inner.graph();
        let leftover = remainder.view(graph);
        let (roots, leaves) = (leftover.roots(), leftover.leaves());
        let pairs = self.inner.decomposed_pairs();
        let paired =
            |a: ElementId, b: ElementId| pairs.contains(&(a, b)) || pairs.contains(&(b, a));

        let full = domain.view(graph);
        let mut restored = SubGraph::default();
        for root in &roots {
            for leaf in &leaves {
                if root == leaf || paired(*root, *leaf) {
                    continue;
                }
                for path in full.paths_between(*root, *leaf) {
                    restored.elements.extend(path.iter().copied());
                    for hop in path.windows(2) {
                        restored.scopes.extend(
                            full.edges_out(hop[0])
                                .into_iter()
                                .filter(|(_, to)| *to == hop[1])
                                .map(|(s, _)| s),
                        );
                    }
                }
            }
        }
        remainder.union_with(&restored);
    }
}

impl<'g, I: SubGraphIterator<'g>> SubGraphIterator<'g> for RemainderIterator<I> {
    fn graph(&self) -> &'g ElementGraph {
        self.inner.graph()
    }

    fn domain(&self) -> &SubGraph {
        self.inner.domain()
    }

    fn has_next(&mut self) -> bool {
        if self.inner.has_next() {
            return true;
        }
        self.compute();
        self.remainder.is_some()
    }

    fn next(&mut self) -> Result<SubGraph, IteratorError> {
        if self.inner.has_next() {
            let sub = self.inner.next()?;
            self.mask.union_with(&sub);
            return Ok(sub);
        }
        self.compute();
        self.remainder.take().ok_or(IteratorError::Exhausted)
    }

    fn annotations_for(&self, capture: Capture) -> ElementSet {
        self.inner.annotations_for(capture)
    }

    fn decomposed_pairs(&self) -> &[(ElementId, ElementId)] {
        self.inner.decomposed_pairs()
    }
}
