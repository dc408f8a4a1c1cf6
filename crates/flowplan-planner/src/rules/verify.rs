//! Structural checks run before any rewrite, and one run after.
//!
//! Nothing here is retried: an error means the pipeline itself is wrong.

use flowplan_core::{
    ElementGraph, ElementId, ElementKind, ElementSet, GroupKind, Join, Joiner, TapRules,
    Topology,
};
use tracing::debug;

use crate::PlanErrorKind;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Collect every structural problem of `graph`.
///
/// A cycle stops verification early; the remaining checks assume a DAG.
pub fn verify<R: TapRules>(graph: &ElementGraph, rules: &R) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    if let Err(cycle) = graph.topological_order() {
        let mut members = cycle.0.iter().copied().filter(|e| !e.is_extent());
        if let Some(first) = members.next() {
            let mut report = diagnostics.report(DiagnosticKind::Cycle, first);
            for other in members {
                report = report.related_to("cannot be ordered", other);
            }
            report.emit();
        }
        return diagnostics;
    }

    let reached = graph.descendants(ElementId::HEAD);
    let reaching = graph.ancestors(ElementId::TAIL);

    for id in graph.element_ids().filter(|id| !id.is_extent()) {
        if !reached.contains(&id) || !reaching.contains(&id) {
            diagnostics.report(DiagnosticKind::NotOnPath, id).emit();
            continue;
        }

        match graph.kind(id) {
            ElementKind::Every(_) => {
                check_every(graph, id, &mut diagnostics);
                if graph.kind(id).is_buffer() {
                    check_buffer(graph, id, &mut diagnostics);
                }
            }
            ElementKind::Group(group) => {
                if group.kind == GroupKind::CoGroup {
                    check_join_arity(graph, id, &mut diagnostics);
                    check_deferred(id, &group.join, &mut diagnostics);
                }
            }
            ElementKind::HashJoin(join) => {
                check_join_arity(graph, id, &mut diagnostics);
                check_deferred(id, join, &mut diagnostics);
            }
            ElementKind::Sink(tap) => {
                let read_back = graph.successors(id).iter().any(|s| !s.is_extent());
                if read_back && !rules.is_symmetrical(tap) {
                    diagnostics
                        .report(DiagnosticKind::AsymmetricReadBack, id)
                        .message(format!("scheme `{}` is not symmetrical", tap.scheme))
                        .emit();
                }
            }
            ElementKind::Boundary(_) => check_split_after_boundary(graph, id, &mut diagnostics),
            ElementKind::Extent(_)
            | ElementKind::Source(_)
            | ElementKind::Pipe
            | ElementKind::Each(_)
            | ElementKind::Merge => {}
        }
    }

    debug!(
        pipeline = graph.name(),
        errors = diagnostics.error_count(),
        warnings = diagnostics.warning_count(),
        "verified"
    );
    diagnostics
}

fn check_every(graph: &ElementGraph, id: ElementId, diagnostics: &mut Diagnostics) {
    let misplaced: Vec<ElementId> = graph
        .predecessors(id)
        .into_iter()
        .filter(|p| !feeds_every(graph.kind(*p)))
        .collect();
    if misplaced.is_empty() {
        return;
    }
    let mut report = diagnostics.report(DiagnosticKind::EveryWithoutGrouping, id);
    for p in misplaced {
        report = report.related_to(format!("fed by {}", graph.kind(p).label()), p);
    }
    report.emit();
}

fn feeds_every(kind: &ElementKind) -> bool {
    matches!(kind, ElementKind::Group(_) | ElementKind::Every(_))
}

/// Check that rewriting left every `every` directly behind its grouping.
pub fn check_every_chains(graph: &ElementGraph) -> Result<(), PlanErrorKind> {
    for id in graph.element_ids() {
        if !matches!(graph.kind(id), ElementKind::Every(_)) {
            continue;
        }
        if let Some(fed_by) = graph
            .predecessors(id)
            .into_iter()
            .find(|p| !feeds_every(graph.kind(*p)))
        {
            return Err(PlanErrorKind::DetachedEvery {
                every: graph.element(id).name.clone(),
                fed_by: graph.element(fed_by).name.clone(),
            });
        }
    }
    Ok(())
}

fn check_buffer(graph: &ElementGraph, id: ElementId, diagnostics: &mut Diagnostics) {
    let before = graph
        .predecessors(id)
        .into_iter()
        .filter(|p| matches!(graph.kind(*p), ElementKind::Every(_)))
        .map(|p| (p, "runs before it"));
    let after = graph
        .successors(id)
        .into_iter()
        .filter(|s| matches!(graph.kind(*s), ElementKind::Every(_)))
        .map(|s| (s, "runs after it"));
    let others: Vec<_> = before.chain(after).collect();
    if others.is_empty() {
        return;
    }
    let mut report = diagnostics.report(DiagnosticKind::BufferNotAlone, id);
    for (other, note) in others {
        report = report.related_to(note, other);
    }
    report.emit();
}

fn check_split_after_boundary(
    graph: &ElementGraph,
    id: ElementId,
    diagnostics: &mut Diagnostics,
) {
    for split in graph.successors(id) {
        if !graph.kind(split).is_processing() || graph.outgoing(split).len() < 2 {
            continue;
        }
        let groupings = groupings_reached(graph, split);
        if groupings.len() < 2 {
            continue;
        }
        let mut report = diagnostics
            .report(DiagnosticKind::SplitAfterBoundary, split)
            .related_to("feeds it directly", id);
        for grouping in groupings {
            report = report.related_to("reached from the split", grouping);
        }
        report.emit();
    }
}

/// Groupings downstream of `split` with no tap in between.
fn groupings_reached(graph: &ElementGraph, split: ElementId) -> ElementSet {
    let mut found = ElementSet::new();
    let mut seen = ElementSet::new();
    let mut stack = graph.successors(split);
    while let Some(v) = stack.pop() {
        if v.is_extent() || !seen.insert(v) {
            continue;
        }
        let kind = graph.kind(v);
        if kind.is_grouping() {
            found.insert(v);
        } else if !kind.is_tap() {
            stack.extend(graph.successors(v));
        }
    }
    found
}

fn check_join_arity(graph: &ElementGraph, id: ElementId, diagnostics: &mut Diagnostics) {
    let inputs = graph.incoming(id).len();
    if inputs < 2 {
        diagnostics
            .report(DiagnosticKind::JoinArity, id)
            .message(inputs.to_string())
            .emit();
    }
}

fn check_deferred(id: ElementId, join: &Join, diagnostics: &mut Diagnostics) {
    if !join.defers_to_joiner() {
        return;
    }
    let Joiner::Custom(name) = &join.joiner else {
        return;
    };
    diagnostics
        .report(DiagnosticKind::DeferredJoinFields, id)
        .message(name.as_str())
        .emit();
}
