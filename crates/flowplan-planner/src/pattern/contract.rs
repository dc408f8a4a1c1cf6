//! Contraction: merging adjacent elements into single representative vertices.

use std::collections::BTreeMap;

use flowplan_core::{
    ElementGraph, ElementId, ElementSet, ScopeId, SubGraph, SubGraphView, Topology,
};

use super::PatternTarget;
use super::expression::ElementExpression;

/// A view whose vertices are groups of adjacent elements.
///
/// Every group is connected, and its representative is its smallest element id,
/// so a contracted vertex is addressed with an ordinary [`ElementId`].
///
/// Groups are formed from adjacency alone, so the contracted graph can hold a
/// cycle even when the underlying view is acyclic: with `a → b → c` and
/// `a → c`, contracting `a` and `c` but not `b` leaves `{a, c}` and `b` feeding
/// each other. Orderings on a contracted graph then fail with a cycle error;
/// matching does not depend on one.
#[derive(Debug, Clone)]
pub struct ContractedGraph<'g> {
    view: SubGraphView<'g>,
    representative: BTreeMap<ElementId, ElementId>,
    members: BTreeMap<ElementId, ElementSet>,
}

impl<'g> ContractedGraph<'g> {
    /// Every element is its own vertex.
    pub fn identity(view: SubGraphView<'g>) -> Self {
        let representative: BTreeMap<_, _> = view.vertices().into_iter().map(|v| (v, v)).collect();
        let members = representative
            .keys()
            .map(|v| (*v, ElementSet::from([*v])))
            .collect();
        Self {
            view,
            representative,
            members,
        }
    }

    /// Merge every pair of adjacent elements that both satisfy `contraction`.
    pub fn new(view: SubGraphView<'g>, contraction: &ElementExpression) -> Self {
        let vertices = view.vertices();
        let candidates: ElementSet = vertices
            .iter()
            .copied()
            .filter(|v| contraction.matches(&view, *v))
            .collect();

        let mut parent: BTreeMap<ElementId, ElementId> = vertices.iter().map(|v| (*v, *v)).collect();
        for v in &candidates {
            for (_, target) in view.edges_out(*v) {
                if candidates.contains(&target) {
                    union(&mut parent, *v, target);
                }
            }
        }

        let mut representative = BTreeMap::new();
        let mut members: BTreeMap<ElementId, ElementSet> = BTreeMap::new();
        for v in vertices {
            let root = find(&mut parent, v);
            representative.insert(v, root);
            members.entry(root).or_default().insert(v);
        }

        Self {
            view,
            representative,
            members,
        }
    }

    pub fn view(&self) -> &SubGraphView<'g> {
        &self.view
    }

    pub fn representative(&self, element: ElementId) -> Option<ElementId> {
        self.representative.get(&element).copied()
    }

    /// Every element behind `vertices`.
    pub fn expand(&self, vertices: &ElementSet) -> ElementSet {
        vertices
            .iter()
            .filter_map(|v| self.members.get(v))
            .flatten()
            .copied()
            .collect()
    }

    /// The subgraph of the underlying view induced by the members of `vertices`.
    pub fn as_sub_graph(&self, vertices: &ElementSet) -> SubGraph {
        let elements = self.expand(vertices);
        let graph = self.view.graph();
        let scopes = self
            .view
            .sub_graph()
            .scopes
            .iter()
            .copied()
            .filter(|s| {
                let scope = graph.scope(*s);
                elements.contains(&scope.from) && elements.contains(&scope.to)
            })
            .collect();
        SubGraph::new(elements, scopes)
    }

    fn lift(&self, edges: Vec<(ScopeId, ElementId)>, vertex: ElementId) -> Vec<(ScopeId, ElementId)> {
        edges
            .into_iter()
            .filter_map(|(s, e)| self.representative(e).map(|r| (s, r)))
            .filter(|(_, r)| *r != vertex)
            .collect()
    }
}

fn find(parent: &mut BTreeMap<ElementId, ElementId>, v: ElementId) -> ElementId {
    let mut root = v;
    while let Some(&p) = parent.get(&root) {
        if p == root {
            break;
        }
        root = p;
    }
    let mut current = v;
    while current != root {
        let next = parent.insert(current, root).unwrap_or(root);
        current = next;
    }
    root
}

fn union(parent: &mut BTreeMap<ElementId, ElementId>, a: ElementId, b: ElementId) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent.insert(high, low);
    }
}

impl Topology for ContractedGraph<'_> {
    fn vertices(&self) -> Vec<ElementId> {
        self.members.keys().copied().collect()
    }

    fn contains_vertex(&self, vertex: ElementId) -> bool {
        self.members.contains_key(&vertex)
    }

    fn edges_out(&self, vertex: ElementId) -> Vec<(ScopeId, ElementId)> {
        let Some(members) = self.members.get(&vertex) else {
            return Vec::new();
        };
        let edges = members.iter().flat_map(|m| self.view.edges_out(*m)).collect();
        self.lift(edges, vertex)
    }

    fn edges_in(&self, vertex: ElementId) -> Vec<(ScopeId, ElementId)> {
        let Some(members) = self.members.get(&vertex) else {
            return Vec::new();
        };
        let edges = members.iter().flat_map(|m| self.view.edges_in(*m)).collect();
        self.lift(edges, vertex)
    }
}

impl PatternTarget for ContractedGraph<'_> {
    fn element_graph(&self) -> &ElementGraph {
        self.view.graph()
    }

    fn members(&self, vertex: ElementId) -> ElementSet {
        self.members.get(&vertex).cloned().unwrap_or_default()
    }
}
