use flowplan_core::{ElementGraph, ElementKind, Fields, Tap};

use super::*;

fn graph() -> (ElementGraph, ElementId, ElementId) {
    let mut g = ElementGraph::new("p");
    let src = g.add_source("docs", Tap::new("text", "in", Fields::Unknown));
    let pipe = g.add_stage("tidy", ElementKind::Pipe, &[src]);
    (g, src, pipe)
}

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
}

#[test]
fn report_with_default_message() {
    let (_, _, pipe) = graph();
    let mut diagnostics = Diagnostics::new();
    diagnostics.report(DiagnosticKind::NotOnPath, pipe).emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    assert!(!diagnostics.has_warnings());
}

#[test]
fn warnings_are_not_errors() {
    let (_, _, pipe) = graph();
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::DeferredJoinFields, pipe)
        .message("Mixed")
        .emit();

    assert_eq!(diagnostics.error_count(), 0);
    assert_eq!(diagnostics.warning_count(), 1);
}

#[test]
fn iterates_in_priority_order() {
    let (_, src, pipe) = graph();
    let mut diagnostics = Diagnostics::new();
    diagnostics.report(DiagnosticKind::JoinArity, pipe).emit();
    diagnostics.report(DiagnosticKind::NotOnPath, pipe).emit();
    diagnostics.report(DiagnosticKind::NotOnPath, src).emit();

    assert_eq!(
        diagnostics.iter().map(|d| d.element()).collect::<Vec<_>>(),
        vec![src, pipe, pipe]
    );
    assert_eq!(
        diagnostics.kinds(),
        vec![
            DiagnosticKind::NotOnPath,
            DiagnosticKind::NotOnPath,
            DiagnosticKind::JoinArity
        ]
    );
}

#[test]
fn render_with_related_and_hints() {
    let (g, src, pipe) = graph();
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::EveryWithoutGrouping, pipe)
        .related_to("feeds it", src)
        .emit();
    diagnostics
        .report(DiagnosticKind::JoinArity, pipe)
        .message("1")
        .emit();

    insta::assert_snapshot!(diagnostics.render(&g), @r"
    error: `tidy`: every must directly follow a grouping or another every
      note: `docs`: feeds it
      hint: add a group_by or co_group in front of it
    error: `tidy`: join needs at least two inputs, found 1
    ");
}

#[test]
fn render_without_hints() {
    let (g, _, pipe) = graph();
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::EveryWithoutGrouping, pipe)
        .emit();

    let out = diagnostics.printer(&g).show_hints(false).render();

    assert_eq!(
        out,
        "error: `tidy`: every must directly follow a grouping or another every\n"
    );
}
