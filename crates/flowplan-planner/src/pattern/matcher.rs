//! Motif search by backtracking from the primary vertex outwards.

use std::collections::BTreeMap;

use flowplan_core::{ElementId, ElementSet, ScopeId, ScopeSet};

use super::PatternTarget;
use super::expression::ScopeExpression;
use super::graph::{Capture, ExpressionGraph, PatternError, PatternVertex};

/// One anchor's worth of matched vertices, scopes and captures.
///
/// Vertices are in the target's space: representatives when the target is a
/// contracted graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    anchor: Option<ElementId>,
    vertices: ElementSet,
    scopes: ScopeSet,
    captures: BTreeMap<Capture, ElementSet>,
}

impl Match {
    pub fn found_match(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<ElementId> {
        self.anchor
    }

    pub fn vertices(&self) -> &ElementSet {
        &self.vertices
    }

    pub fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    pub fn captured(&self, capture: Capture) -> ElementSet {
        self.captures.get(&capture).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct Matcher {
    pattern: ExpressionGraph,
    primary: PatternVertex,
    order: Vec<PatternVertex>,
}

impl Matcher {
    pub fn new(pattern: ExpressionGraph) -> Result<Self, PatternError> {
        let primary = pattern.validate()?;
        let order = pattern.search_order(primary);
        Ok(Self {
            pattern,
            primary,
            order,
        })
    }

    pub fn pattern(&self) -> &ExpressionGraph {
        &self.pattern
    }

    /// One match per anchor, skipping anchors with an excluded member.
    ///
    /// With `first_only` each anchor stops at its first complete assignment;
    /// otherwise every assignment around the anchor is merged into its match.
    pub fn find_matches_on_primary<T: PatternTarget + ?Sized>(
        &self,
        target: &T,
        exclusions: &ElementSet,
        first_only: bool,
    ) -> Vec<Match> {
        self.anchors(target, exclusions)
            .into_iter()
            .filter_map(|anchor| self.match_at(target, anchor, first_only))
            .collect()
    }

    /// The match at the smallest anchor that completes, or an empty match.
    pub fn find_first_match<T: PatternTarget + ?Sized>(
        &self,
        target: &T,
        exclusions: &ElementSet,
        first_only: bool,
    ) -> Match {
        self.anchors(target, exclusions)
            .into_iter()
            .find_map(|anchor| self.match_at(target, anchor, first_only))
            .unwrap_or_default()
    }

    fn anchors<T: PatternTarget + ?Sized>(
        &self,
        target: &T,
        exclusions: &ElementSet,
    ) -> Vec<ElementId> {
        let expression = &self.pattern.node(self.primary).expression;
        target
            .vertices()
            .into_iter()
            .filter(|v| target.members(*v).is_disjoint(exclusions))
            .filter(|v| expression.matches(target, *v))
            .collect()
    }

    fn match_at<T: PatternTarget + ?Sized>(
        &self,
        target: &T,
        anchor: ElementId,
        first_only: bool,
    ) -> Option<Match> {
        let mut assignment = vec![None; self.pattern.nodes().len()];
        if !self.edges_hold(target, &assignment, self.primary, anchor) {
            return None;
        }
        assignment[self.primary] = Some(anchor);
        let mut result = Match::default();
        self.extend(target, &mut assignment, 1, first_only, &mut result);
        result.found_match().then_some(result)
    }

    /// Returns `true` once the search should stop.
    fn extend<T: PatternTarget + ?Sized>(
        &self,
        target: &T,
        assignment: &mut Vec<Option<ElementId>>,
        depth: usize,
        first_only: bool,
        result: &mut Match,
    ) -> bool {
        let Some(&p) = self.order.get(depth) else {
            self.record(target, assignment, result);
            return first_only;
        };

        let expression = &self.pattern.node(p).expression;
        for candidate in self.candidates(target, assignment, p) {
            if assignment.contains(&Some(candidate))
                || !expression.matches(target, candidate)
                || !self.edges_hold(target, assignment, p, candidate)
            {
                continue;
            }
            assignment[p] = Some(candidate);
            let stop = self.extend(target, assignment, depth + 1, first_only, result);
            assignment[p] = None;
            if stop {
                return true;
            }
        }
        false
    }

    /// Neighbours of an already-assigned vertex across some edge touching `p`.
    fn candidates<T: PatternTarget + ?Sized>(
        &self,
        target: &T,
        assignment: &[Option<ElementId>],
        p: PatternVertex,
    ) -> Vec<ElementId> {
        for edge in self.pattern.incident(p) {
            if edge.to == p
                && let Some(from) = assignment[edge.from]
            {
                return target.successors(from);
            }
            if edge.from == p
                && let Some(to) = assignment[edge.to]
            {
                return target.predecessors(to);
            }
        }
        Vec::new()
    }

    /// Every motif edge between `p` and an assigned vertex has a counterpart.
    fn edges_hold<T: PatternTarget + ?Sized>(
        &self,
        target: &T,
        assignment: &[Option<ElementId>],
        p: PatternVertex,
        candidate: ElementId,
    ) -> bool {
        let mapped = |v: PatternVertex| if v == p { Some(candidate) } else { assignment[v] };
        self.pattern.incident(p).all(|edge| {
            match (mapped(edge.from), mapped(edge.to)) {
                (Some(from), Some(to)) => {
                    !scopes_between(target, from, to, edge.expression).is_empty()
                }
                _ => true,
            }
        })
    }

    fn record<T: PatternTarget + ?Sized>(
        &self,
        target: &T,
        assignment: &[Option<ElementId>],
        result: &mut Match,
    ) {
        result.anchor = assignment[self.primary];
        for (p, vertex) in assignment.iter().enumerate() {
            let Some(vertex) = *vertex else { continue };
            result.vertices.insert(vertex);
            if let Some(capture) = self.pattern.node(p).capture {
                result.captures.entry(capture).or_default().insert(vertex);
            }
        }
        for edge in self.pattern.edges() {
            if let (Some(from), Some(to)) = (assignment[edge.from], assignment[edge.to]) {
                result
                    .scopes
                    .extend(scopes_between(target, from, to, edge.expression));
            }
        }
    }
}

/// Target edges `from → to` satisfying `expression`, parallel edges included.
fn scopes_between<T: PatternTarget + ?Sized>(
    target: &T,
    from: ElementId,
    to: ElementId,
    expression: ScopeExpression,
) -> Vec<ScopeId> {
    let graph = target.element_graph();
    target
        .edges_out(from)
        .into_iter()
        .filter(|(s, t)| *t == to && expression.matches(graph.scope(*s)))
        .map(|(s, _)| s)
        .collect()
}
