use flowplan_core::{ElementGraph, ElementId, ElementKind, Fields, TapRules, Topology};
use tracing::trace;

use super::RewriteRule;
use crate::PlanErrorKind;

/// Lets a tap right after a boundary stand in for it.
///
/// A boundary followed by a sink or another boundary is replaced by that tap
/// when the boundary is its only writer, the tap is symmetrical (so steps
/// downstream can read it back) and it accepts the boundary's fields. Fields
/// must be resolved first.
#[derive(Debug, Clone)]
pub struct BoundaryCollapseRule<R> {
    rules: R,
}

impl<R: TapRules> BoundaryCollapseRule<R> {
    pub fn new(rules: R) -> Self {
        Self { rules }
    }

    /// The first `(boundary, replacement)` pair.
    pub fn collapsible(&self, graph: &ElementGraph) -> Option<(ElementId, ElementId)> {
        graph
            .element_ids()
            .filter(|id| graph.kind(*id).is_boundary())
            .find_map(|b| {
                graph
                    .successors(b)
                    .into_iter()
                    .find(|t| self.can_replace(graph, b, *t))
                    .map(|t| (b, t))
            })
    }

    fn can_replace(&self, graph: &ElementGraph, boundary: ElementId, tap: ElementId) -> bool {
        let ElementKind::Boundary(written) = graph.kind(boundary) else {
            return false;
        };
        let (ElementKind::Sink(target) | ElementKind::Boundary(target)) = graph.kind(tap) else {
            return false;
        };
        let sole_writer = graph.predecessors(tap) == [boundary];
        sole_writer && self.rules.is_symmetrical(target) && accepts(&target.fields, &written.fields)
    }
}

/// Unknown declared fields accept anything; known ones need the same layout.
fn accepts(declared: &Fields, written: &Fields) -> bool {
    !declared.is_known() || declared.same_layout(written)
}

impl<R: TapRules> RewriteRule for BoundaryCollapseRule<R> {
    fn name(&self) -> &'static str {
        "boundary-collapse"
    }

    fn apply(&self, graph: &mut ElementGraph) -> Result<bool, PlanErrorKind> {
        let Some((boundary, tap)) = self.collapsible(graph) else {
            return Ok(false);
        };
        let name = graph.element(boundary).name.clone();
        graph.replace_element(boundary, tap);
        trace!(
            boundary = %name,
            tap = %graph.element(tap).name,
            "collapsed boundary into tap"
        );
        Ok(true)
    }
}
