//! Motif matching over element graphs.
//!
//! A motif ([`ExpressionGraph`]) is a small graph of vertex and scope
//! predicates. The [`Matcher`] anchors it at every vertex satisfying the
//! primary predicate and grows the assignment outwards along motif edges.
//!
//! Matching runs against any [`PatternTarget`]: a plain view, or a
//! [`ContractedGraph`] whose vertices stand for several elements each.

mod contract;
mod expression;
mod graph;
mod matcher;


use flowplan_core::{ElementGraph, ElementId, ElementSet, SubGraphView, Topology};

pub use contract::ContractedGraph;
pub use expression::{Cmp, ElementExpression, KindClass, ScopeExpression};
pub use graph::{Capture, ExpressionGraph, PatternEdge, PatternError, PatternNode, PatternVertex};
pub use matcher::{Match, Matcher};

/// A topology whose vertices stand for one or more elements.
pub trait PatternTarget: Topology {
    fn element_graph(&self) -> &ElementGraph;

    /// Elements represented by `vertex`; empty if it is not a vertex.
    fn members(&self, vertex: ElementId) -> ElementSet;
}

impl PatternTarget for SubGraphView<'_> {
    fn element_graph(&self) -> &ElementGraph {
        self.graph()
    }

    fn members(&self, vertex: ElementId) -> ElementSet {
        if self.contains_vertex(vertex) {
            ElementSet::from([vertex])
        } else {
            ElementSet::new()
        }
    }
}

impl PatternTarget for ElementGraph {
    fn element_graph(&self) -> &ElementGraph {
        self
    }

    fn members(&self, vertex: ElementId) -> ElementSet {
        if self.contains(vertex) {
            ElementSet::from([vertex])
        } else {
            ElementSet::new()
        }
    }
}
