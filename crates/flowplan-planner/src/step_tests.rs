use flowplan_core::{Element, ElementGraph, ElementId, ElementKind, ElementSet, Fields, Operation};

use crate::rules::boundary;
use crate::test_utils::*;
use crate::{NodeKind, PlanErrorKind, StepEdge, StepGraph};

fn build(g: &ElementGraph) -> StepGraph {
    StepGraph::build(g, false).unwrap()
}

fn word_count(g: &mut ElementGraph) -> [ElementId; 3] {
    let docs = source(g, "docs");
    let tokenize = each(g, "tokenize", docs);
    let by_word = group_by(g, "by-word", &[tokenize]);
    let count = every(g, "count", by_word);
    [tokenize, by_word, count]
}

#[test]
fn single_step() {
    let mut g = ElementGraph::new("wc");
    let [_, _, count] = word_count(&mut g);
    sink(&mut g, "out", count);

    insta::assert_snapshot!(build(&g).dump(), @r"
    step 0: (1/1) wc
      sources: docs (text:docs)
      sinks: out (text:out)
      grouping: group-by by-word
      map: tokenize
      reduce: by-word, count
    ");
}

#[test]
fn boundary_cuts_steps() {
    let mut g = ElementGraph::new("wc");
    let [_, _, count] = word_count(&mut g);
    let by_count = group_by(&mut g, "by-count", &[count]);
    let top = every(&mut g, "top", by_count);
    sink(&mut g, "out", top);
    let scope = g.scopes_between(count, by_count)[0];
    let element = boundary(&mut g, "sequence");
    g.insert_on_scope(scope, element);

    let steps = build(&g);
    insta::assert_snapshot!(steps.dump(), @r"
    step 0: (1/2) wc
      sources: docs (text:docs)
      sinks: boundary-1 (sequence:wc/boundary-1)
      grouping: group-by by-word
      map: tokenize
      reduce: by-word, count
    step 1: (2/2) wc
      sources: boundary-1 (sequence:wc/boundary-1)
      sinks: out (text:out)
      grouping: group-by by-count
      reduce: by-count, top
    edge 0 → 1 via boundary-1
    ");
    assert_eq!(steps.dependencies(1), [0]);
    assert_eq!(steps.dependents(0), [1]);
    assert!(steps.dependencies(0).is_empty());
}

#[test]
fn steps_follow_tap_order() {
    let mut g = ElementGraph::new("p");
    let op = Operation::function("down", Fields::Unknown);
    let down = g.add_stage("down", ElementKind::Each(op), &[]);
    let src = source(&mut g, "src");
    let up = each(&mut g, "up", src);
    let element = boundary(&mut g, "sequence");
    let bd = g.add_element(element);
    g.connect(up, bd);
    g.connect(bd, down);
    sink(&mut g, "out", down);

    let steps = build(&g);
    assert_eq!(steps.len(), 2);
    assert_eq!(steps.steps[0].nodes[0].elements, ["up"]);
    assert_eq!(steps.steps[1].nodes[0].elements, ["down"]);
    assert_eq!(
        steps.edges,
        [StepEdge {
            from: 0,
            to: 1,
            tap: "boundary-1".into(),
        }]
    );
}

#[test]
fn source_straight_into_sink() {
    let mut g = ElementGraph::new("copy");
    let src = source(&mut g, "src");
    sink(&mut g, "out", src);

    let steps = build(&g);
    assert!(steps.steps[0].is_copy());
    insta::assert_snapshot!(steps.dump(), @r"
    step 0: (1/1) copy
      sources: src (text:src)
      sinks: out (text:out)
    ");
}

#[test]
fn boundary_read_by_copy_step() {
    let mut g = ElementGraph::new("p");
    let src = source(&mut g, "src");
    let a = each(&mut g, "a", src);
    let b = each(&mut g, "b", a);
    sink(&mut g, "kept", b);
    sink(&mut g, "copied", a);
    let element = boundary(&mut g, "sequence");
    g.insert_after(a, element);

    let steps = build(&g);
    assert_eq!(steps.len(), 3);
    assert!(steps.steps[2].is_copy());
    assert_eq!(steps.steps[2].sinks[0].name, "copied");
    assert_eq!(steps.dependents(0), [1, 2]);
}

#[test]
fn co_group_records_joiner() {
    let mut g = ElementGraph::new("p");
    let a = source(&mut g, "a");
    let b = source(&mut g, "b");
    let join = custom_co_group(&mut g, "join", &[a, b]);
    sink(&mut g, "out", join);

    let steps = build(&g);
    let grouping = steps.steps[0].grouping.as_ref().unwrap();
    assert!(grouping.defers_to_joiner);
    assert_eq!(steps.steps[0].nodes[0].kind, NodeKind::Reduce);
    insta::assert_snapshot!(steps.dump(), @r"
    step 0: (1/1) p
      sources: a (text:a), b (text:b)
      sinks: out (text:out)
      grouping: co-group join (custom Mixed)
      reduce: join
    ");
}

#[test]
fn two_groupings_in_one_region() {
    let mut g = ElementGraph::new("p");
    let src = source(&mut g, "src");
    let first = group_by(&mut g, "first", &[src]);
    let second = group_by(&mut g, "second", &[first]);
    sink(&mut g, "out", second);

    let err = StepGraph::build(&g, false).unwrap_err();
    assert!(matches!(
        err,
        PlanErrorKind::Unschedulable { ref step, groupings: 2 } if step == "(1/1) p"
    ));
}

#[test]
fn every_element_lands_in_a_step() {
    let mut g = ElementGraph::new("wc");
    let [tokenize, _, count] = word_count(&mut g);
    let by_count = group_by(&mut g, "by-count", &[count]);
    let top = every(&mut g, "top", by_count);
    let out = sink(&mut g, "out", top);
    let archive = sink(&mut g, "archive", tokenize);
    sink(&mut g, "mirror", out);
    sink(&mut g, "copy", archive);
    let scope = g.scopes_between(count, by_count)[0];
    let element = boundary(&mut g, "sequence");
    g.insert_on_scope(scope, element);

    let steps = build(&g);

    let covered: ElementSet = steps
        .steps
        .iter()
        .flat_map(|s| s.elements.iter().copied())
        .collect();
    let all: ElementSet = g.element_ids().filter(|e| !e.is_extent()).collect();
    assert_eq!(covered, all);
}

#[test]
fn element_outside_every_step() {
    let mut g = ElementGraph::new("wc");
    let [_, _, count] = word_count(&mut g);
    sink(&mut g, "out", count);
    g.add_element(Element::new("orphan", ElementKind::Source(text("orphan"))));

    let err = StepGraph::build(&g, false).unwrap_err();
    assert!(matches!(
        err,
        PlanErrorKind::Unplaced { ref element } if element == "orphan"
    ));
    assert_eq!(err.to_string(), "`orphan` is not part of any step");
}

#[test]
fn serializes_step_graph() {
    let mut g = ElementGraph::new("wc");
    let [_, _, count] = word_count(&mut g);
    sink(&mut g, "out", count);

    let json: serde_json::Value = serde_json::from_str(&build(&g).to_json().unwrap()).unwrap();
    let step = &json["steps"][0];
    assert_eq!(json["pipeline"], "wc");
    assert_eq!(step["name"], "(1/1) wc");
    assert_eq!(step["grouping"]["kind"], "group-by");
    assert_eq!(step["nodes"][1]["kind"], "reduce");
    assert_eq!(step["sources"][0]["identifier"], "docs");
}
