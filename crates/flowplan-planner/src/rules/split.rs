use std::collections::BTreeMap;

use flowplan_core::{ElementGraph, ElementId, ElementKind, Topology};
use tracing::trace;

use super::{RewriteRule, boundary};
use crate::PlanErrorKind;

/// Writes a split out to a boundary when its branches meet again at a grouping.
///
/// A processing element with more than one outgoing scope, whose branches
/// reconverge at a grouping reachable along more than one route, gets a
/// boundary directly after it. Elements fed only by boundaries or groupings
/// are left alone. Each insertion leaves the split with a single outgoing
/// scope, so the number of split points strictly drops.
#[derive(Debug, Clone)]
pub struct SplitInsertionRule {
    temp_scheme: String,
}

impl SplitInsertionRule {
    pub fn new(temp_scheme: impl Into<String>) -> Self {
        Self {
            temp_scheme: temp_scheme.into(),
        }
    }

    /// Splits that need a boundary, in topological order.
    pub fn split_points(graph: &ElementGraph) -> Result<Vec<ElementId>, PlanErrorKind> {
        let order = graph.topological_order()?;
        Ok(order
            .iter()
            .copied()
            .filter(|id| is_split(graph, *id))
            .filter(|id| !follows_boundary(graph, *id))
            .filter(|id| reconverges(graph, &order, *id))
            .collect())
    }
}

impl RewriteRule for SplitInsertionRule {
    fn name(&self) -> &'static str {
        "split-insertion"
    }

    fn apply(&self, graph: &mut ElementGraph) -> Result<bool, PlanErrorKind> {
        let Some(&split) = Self::split_points(graph)?.first() else {
            return Ok(false);
        };
        let element = boundary(graph, &self.temp_scheme);
        let inserted = graph.insert_after(split, element);
        trace!(
            split = %graph.element(split).name,
            boundary = %graph.element(inserted).name,
            "inserted boundary after split"
        );
        Ok(true)
    }
}

fn is_split(graph: &ElementGraph, id: ElementId) -> bool {
    graph.kind(id).is_processing() && graph.outgoing(id).len() > 1
}

fn follows_boundary(graph: &ElementGraph, id: ElementId) -> bool {
    let inputs = graph.predecessors(id);
    !inputs.is_empty()
        && inputs
            .iter()
            .all(|p| matches!(graph.kind(*p), ElementKind::Boundary(_) | ElementKind::Group(_)))
}

/// Some grouping downstream of `id` is reached along more than one route.
///
/// Routes are counted per scope, so parallel scopes into a self-join count
/// as separate routes. Routes end at taps.
fn reconverges(graph: &ElementGraph, order: &[ElementId], id: ElementId) -> bool {
    let mut routes: BTreeMap<ElementId, usize> = BTreeMap::from([(id, 1)]);
    for &v in order.iter().skip_while(|v| **v != id) {
        let Some(&count) = routes.get(&v) else {
            continue;
        };
        if v != id && graph.kind(v).is_grouping() && count > 1 {
            return true;
        }
        if v != id && graph.kind(v).is_tap() {
            continue;
        }
        for scope in graph.outgoing(v) {
            *routes.entry(graph.scope(*scope).to).or_default() += count;
        }
    }
    false
}
