//! Keeps groupings in separate steps.
//!
//! A step runs at most one grouping. Over the graph contracted by processing
//! elements, four shapes put two groupings in reach of one step:
//!
//! ```text
//! grouping → grouping
//! grouping → processing → grouping
//! processing → { grouping, grouping }
//! { grouping, grouping } → processing
//! ```
//!
//! The grouping captured as secondary is cut away with a boundary on each
//! matched scope touching it.

use flowplan_core::{ElementGraph, ElementKind, ScopeId, ScopeSet, SubGraphView};
use tracing::trace;

use super::{RewriteRule, boundary};
use crate::PlanErrorKind;
use crate::iter::{MotifIterator, SubGraphIterator};
use crate::pattern::{Capture, ElementExpression, ExpressionGraph, KindClass};

#[derive(Debug, Clone)]
pub struct JobPartitionRule {
    temp_scheme: String,
}

impl JobPartitionRule {
    pub fn new(temp_scheme: impl Into<String>) -> Self {
        Self {
            temp_scheme: temp_scheme.into(),
        }
    }

    /// The motifs, in the order they are tried.
    pub fn motifs() -> Vec<ExpressionGraph> {
        let grouping = || ElementExpression::kind(KindClass::Grouping);
        let processing = || ElementExpression::kind(KindClass::Processing);

        let mut adjacent = ExpressionGraph::new();
        let first = adjacent.capture(grouping(), Capture::Primary);
        let second = adjacent.capture(grouping(), Capture::Secondary);
        adjacent.arc(first, second);

        let mut through = ExpressionGraph::new();
        let first = through.capture(grouping(), Capture::Primary);
        let middle = through.add(processing());
        let second = through.capture(grouping(), Capture::Secondary);
        through.arc(first, middle).arc(middle, second);

        let mut fan_out = ExpressionGraph::new();
        let region = fan_out.capture(processing(), Capture::Primary);
        let kept = fan_out.capture(grouping(), Capture::Include);
        let cut = fan_out.capture(grouping(), Capture::Secondary);
        fan_out.arc(region, kept).arc(region, cut);

        let mut fan_in = ExpressionGraph::new();
        let region = fan_in.capture(processing(), Capture::Primary);
        let kept = fan_in.capture(grouping(), Capture::Include);
        let cut = fan_in.capture(grouping(), Capture::Secondary);
        fan_in.arc(kept, region).arc(cut, region);

        vec![adjacent, through, fan_out, fan_in]
    }

    /// Scopes to cut for the first motif occurrence, if any.
    fn find_cut(graph: &ElementGraph) -> Result<Option<ScopeSet>, PlanErrorKind> {
        let contraction = ElementExpression::kind(KindClass::Processing);
        for motif in Self::motifs() {
            let view = SubGraphView::whole(graph);
            let mut motifs = MotifIterator::new(view, Some(&contraction), motif, true)?;
            if !motifs.has_next() {
                continue;
            }
            motifs.next()?;
            let secondary = motifs.annotations_for(Capture::Secondary);
            let Some(found) = motifs.last_match() else {
                continue;
            };
            let cut: ScopeSet = found
                .scopes()
                .iter()
                .copied()
                .filter(|s| {
                    let scope = graph.scope(*s);
                    secondary.contains(&scope.from) || secondary.contains(&scope.to)
                })
                .flat_map(|s| past_every_chain(graph, s))
                .collect();
            if !cut.is_empty() {
                return Ok(Some(cut));
            }
        }
        Ok(None)
    }
}

impl RewriteRule for JobPartitionRule {
    fn name(&self) -> &'static str {
        "job-partitioning"
    }

    fn apply(&self, graph: &mut ElementGraph) -> Result<bool, PlanErrorKind> {
        let Some(cut) = Self::find_cut(graph)? else {
            return Ok(false);
        };
        for scope in cut {
            let element = boundary(graph, &self.temp_scheme);
            let inserted = graph.insert_on_scope(scope, element);
            trace!(
                boundary = %graph.element(inserted).name,
                "cut shared step between groupings"
            );
        }
        Ok(true)
    }
}

/// A grouping's every chain stays with it: a cut entering the chain moves to
/// every scope leaving it.
fn past_every_chain(graph: &ElementGraph, scope: ScopeId) -> Vec<ScopeId> {
    let to = graph.scope(scope).to;
    let leaving = graph.outgoing(to);
    if !matches!(graph.kind(to), ElementKind::Every(_)) || leaving.is_empty() {
        return vec![scope];
    }
    leaving
        .iter()
        .flat_map(|s| past_every_chain(graph, *s))
        .collect()
}
