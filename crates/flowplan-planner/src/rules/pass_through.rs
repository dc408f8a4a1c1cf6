use flowplan_core::{ElementGraph, ElementId, ElementKind, Topology};
use tracing::trace;

use super::RewriteRule;
use crate::PlanErrorKind;

/// Splices out named pipes that do no work.
///
/// A pipe between a tap and taps only is kept: it is the whole of a copy step.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughRule;

impl PassThroughRule {
    pub fn removable(graph: &ElementGraph) -> Option<ElementId> {
        graph
            .element_ids()
            .filter(|id| matches!(graph.kind(*id), ElementKind::Pipe))
            .filter(|id| graph.incoming(*id).len() == 1)
            .find(|id| !between_taps(graph, *id))
    }
}

impl RewriteRule for PassThroughRule {
    fn name(&self) -> &'static str {
        "pass-through"
    }

    fn apply(&self, graph: &mut ElementGraph) -> Result<bool, PlanErrorKind> {
        let Some(pipe) = Self::removable(graph) else {
            return Ok(false);
        };
        let name = graph.element(pipe).name.clone();
        let removed = graph.remove_pass_through(pipe);
        trace!(pipe = %name, removed, "spliced out pass-through");
        Ok(removed)
    }
}

fn between_taps(graph: &ElementGraph, id: ElementId) -> bool {
    let is_tap = |e: &ElementId| graph.kind(*e).is_tap();
    graph.predecessors(id).iter().all(is_tap) && graph.successors(id).iter().all(is_tap)
}
