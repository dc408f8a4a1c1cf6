//! Element/scope masks over an [`ElementGraph`].

use crate::graph::{ElementGraph, ElementId, ElementSet, ScopeId, ScopeSet};
use crate::topology::Topology;

/// An owned selection of elements and scopes.
///
/// Not necessarily induced: a partition may keep two elements while dropping
/// one of several parallel scopes between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubGraph {
    pub elements: ElementSet,
    pub scopes: ScopeSet,
}

impl SubGraph {
    pub fn new(elements: ElementSet, scopes: ScopeSet) -> Self {
        Self { elements, scopes }
    }

    /// Every live element and scope of `graph`.
    pub fn whole(graph: &ElementGraph) -> Self {
        Self {
            elements: graph.element_ids().collect(),
            scopes: graph.scope_ids().collect(),
        }
    }

    /// `elements` plus every scope of `graph` with both ends among them.
    pub fn induced(graph: &ElementGraph, elements: ElementSet) -> Self {
        let scopes = elements
            .iter()
            .flat_map(|e| graph.outgoing(*e).iter().copied())
            .filter(|s| elements.contains(&graph.scope(*s).to))
            .collect();
        Self { elements, scopes }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains(&id)
    }

    pub fn contains_scope(&self, id: ScopeId) -> bool {
        self.scopes.contains(&id)
    }

    pub fn union_with(&mut self, other: &SubGraph) {
        self.elements.extend(other.elements.iter().copied());
        self.scopes.extend(other.scopes.iter().copied());
    }

    /// Elements and scopes of `self` not in `other`.
    pub fn difference(&self, other: &SubGraph) -> SubGraph {
        SubGraph {
            elements: self.elements.difference(&other.elements).copied().collect(),
            scopes: self.scopes.difference(&other.scopes).copied().collect(),
        }
    }

    /// Drop the extents and every scope touching them.
    pub fn without_extents(mut self, graph: &ElementGraph) -> Self {
        self.elements.retain(|e| !e.is_extent());
        self.scopes.retain(|s| {
            let scope = graph.scope(*s);
            !scope.from.is_extent() && !scope.to.is_extent()
        });
        self
    }

    pub fn view<'g>(&self, graph: &'g ElementGraph) -> SubGraphView<'g> {
        SubGraphView::new(graph, self.clone())
    }
}

/// A [`SubGraph`] read through its graph.
#[derive(Debug, Clone)]
pub struct SubGraphView<'g> {
    graph: &'g ElementGraph,
    mask: SubGraph,
}

impl<'g> SubGraphView<'g> {
    pub fn new(graph: &'g ElementGraph, mask: SubGraph) -> Self {
        Self { graph, mask }
    }

    pub fn whole(graph: &'g ElementGraph) -> Self {
        Self::new(graph, SubGraph::whole(graph))
    }

    pub fn graph(&self) -> &'g ElementGraph {
        self.graph
    }

    pub fn sub_graph(&self) -> &SubGraph {
        &self.mask
    }

    pub fn into_sub_graph(self) -> SubGraph {
        self.mask
    }

    fn keeps(&self, scope: ScopeId) -> bool {
        self.mask.scopes.contains(&scope)
    }
}

impl Topology for SubGraphView<'_> {
    fn vertices(&self) -> Vec<ElementId> {
        self.mask
            .elements
            .iter()
            .copied()
            .filter(|e| self.graph.contains(*e))
            .collect()
    }

    fn contains_vertex(&self, vertex: ElementId) -> bool {
        self.mask.elements.contains(&vertex) && self.graph.contains(vertex)
    }

    fn edges_out(&self, vertex: ElementId) -> Vec<(ScopeId, ElementId)> {
        if !self.contains_vertex(vertex) {
            return Vec::new();
        }
        self.graph
            .edges_out(vertex)
            .into_iter()
            .filter(|(s, t)| self.keeps(*s) && self.mask.elements.contains(t))
            .collect()
    }

    fn edges_in(&self, vertex: ElementId) -> Vec<(ScopeId, ElementId)> {
        if !self.contains_vertex(vertex) {
            return Vec::new();
        }
        self.graph
            .edges_in(vertex)
            .into_iter()
            .filter(|(s, o)| self.keeps(*s) && self.mask.elements.contains(o))
            .collect()
    }
}
