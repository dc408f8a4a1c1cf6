//! Verification and rewrite rules.
//!
//! Rewrite rules mutate the graph in place and report whether anything
//! changed. The planner reapplies each one until it reports no change, within
//! the budget of [`apply_to_fixpoint`]. Every change must strictly shrink a
//! finite quantity (split points, shared-step groupings, incompatible taps,
//! boundaries), otherwise the budget trips.

mod collapse;
mod fields;
mod heterogeneous;
mod join;
mod partition;
mod pass_through;
mod split;
mod verify;

#[cfg(test)]
mod partition_tests;
#[cfg(test)]
mod split_tests;

use flowplan_core::{Element, ElementGraph, ElementKind, Tap};
use tracing::{debug, trace};

use crate::PlanErrorKind;

pub use collapse::BoundaryCollapseRule;
pub use fields::{FieldError, resolve_fields};
pub use heterogeneous::HeterogeneousSourceRule;
pub use join::JoinCompatibilityRule;
pub use partition::JobPartitionRule;
pub use pass_through::PassThroughRule;
pub use split::SplitInsertionRule;
pub use verify::{check_every_chains, verify};

/// A named graph rewrite.
pub trait RewriteRule {
    fn name(&self) -> &'static str;

    /// Apply one rewrite. Returns `true` if the graph changed.
    fn apply(&self, graph: &mut ElementGraph) -> Result<bool, PlanErrorKind>;
}

/// Apply `rule` until it reports no change. Returns the number of changes.
pub fn apply_to_fixpoint<R: RewriteRule + ?Sized>(
    rule: &R,
    graph: &mut ElementGraph,
    limit: usize,
) -> Result<usize, PlanErrorKind> {
    for changes in 0..limit {
        if !rule.apply(graph)? {
            debug!(rule = rule.name(), changes, "fixed point reached");
            return Ok(changes);
        }
        trace!(rule = rule.name(), iteration = changes + 1, "graph changed");
    }
    debug!(rule = rule.name(), limit, "rule exhausted its iteration budget");
    Err(PlanErrorKind::NonTermination {
        rule: rule.name(),
        limit,
    })
}

/// A fresh boundary element writing to an intermediate tap of `scheme`.
pub(crate) fn boundary(graph: &mut ElementGraph, scheme: &str) -> Element {
    let name = graph.next_boundary_name();
    let identifier = format!("{}/{}", graph.name(), name);
    Element::new(name, ElementKind::Boundary(Tap::temporary(scheme, identifier)))
}
