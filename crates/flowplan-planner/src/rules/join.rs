use std::collections::VecDeque;

use flowplan_core::{ElementGraph, ElementId, ElementKind, ElementSet, ScopeId};
use tracing::trace;

use super::{RewriteRule, boundary};
use crate::PlanErrorKind;

/// Gives hash-join accumulated inputs a tap of their own.
///
/// The accumulated sides of a hash join are read into memory before the
/// streamed side flows through. An accumulated input is cut with a boundary
/// when the region upstream of it (back to the nearest taps) reaches a
/// grouping, or overlaps the upstream region of another input of the join.
#[derive(Debug, Clone)]
pub struct JoinCompatibilityRule {
    temp_scheme: String,
}

impl JoinCompatibilityRule {
    pub fn new(temp_scheme: impl Into<String>) -> Self {
        Self {
            temp_scheme: temp_scheme.into(),
        }
    }

    /// The first accumulated input that needs its own tap.
    pub fn incompatible_input(graph: &ElementGraph) -> Option<ScopeId> {
        graph
            .element_ids()
            .filter(|id| matches!(graph.kind(*id), ElementKind::HashJoin(_)))
            .find_map(|join| incompatible_input_of(graph, join))
    }
}

impl RewriteRule for JoinCompatibilityRule {
    fn name(&self) -> &'static str {
        "join-compatibility"
    }

    fn apply(&self, graph: &mut ElementGraph) -> Result<bool, PlanErrorKind> {
        let Some(scope) = Self::incompatible_input(graph) else {
            return Ok(false);
        };
        let join = graph.scope(scope).to;
        let element = boundary(graph, &self.temp_scheme);
        let inserted = graph.insert_on_scope(scope, element);
        trace!(
            join = %graph.element(join).name,
            boundary = %graph.element(inserted).name,
            "isolated accumulated join input"
        );
        Ok(true)
    }
}

fn incompatible_input_of(graph: &ElementGraph, join: ElementId) -> Option<ScopeId> {
    let inputs: Vec<(ScopeId, ElementSet)> = graph
        .incoming(join)
        .into_iter()
        .map(|s| (s, upstream_region(graph, graph.scope(s).from)))
        .collect();

    inputs.iter().find_map(|(scope, region)| {
        if graph.scope(*scope).is_streamed() {
            return None;
        }
        let grouped = region.iter().any(|e| graph.kind(*e).is_grouping());
        let shared = inputs
            .iter()
            .any(|(other, theirs)| other != scope && !region.is_disjoint(theirs));
        (grouped || shared).then_some(*scope)
    })
}

/// `from` and every element upstream of it, stopping at (and keeping) taps.
fn upstream_region(graph: &ElementGraph, from: ElementId) -> ElementSet {
    let mut region = ElementSet::from([from]);
    let mut queue = VecDeque::from([from]);
    while let Some(v) = queue.pop_front() {
        if graph.kind(v).is_tap() || v.is_extent() {
            continue;
        }
        for s in graph.incoming(v) {
            let p = graph.scope(s).from;
            if !p.is_extent() && region.insert(p) {
                queue.push_back(p);
            }
        }
    }
    region
}
