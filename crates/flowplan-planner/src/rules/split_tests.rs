use flowplan_core::ElementGraph;

use super::{RewriteRule, SplitInsertionRule, apply_to_fixpoint};
use crate::test_utils::*;

fn rule() -> SplitInsertionRule {
    SplitInsertionRule::new("sequence")
}

#[test]
fn linear_chain_is_unchanged() {
    let mut g = ElementGraph::new("p");
    let src = source(&mut g, "src");
    let a = each(&mut g, "a", src);
    let b = each(&mut g, "b", a);
    sink(&mut g, "out", b);

    assert!(!rule().apply(&mut g).unwrap());
}

#[test]
fn diamond_into_grouping() {
    let mut g = ElementGraph::new("p");
    let src = source(&mut g, "src");
    let a = each(&mut g, "a", src);
    let b = each(&mut g, "b", a);
    let c = each(&mut g, "c", a);
    let d = co_group(&mut g, "d", &[b, c]);
    sink(&mut g, "out", d);

    let changes = apply_to_fixpoint(&rule(), &mut g, 10).unwrap();

    assert_eq!(changes, 1);
    insta::assert_snapshot!(g.dump(), @r"
    e0: head → e2
    e1: tail → ∅
    e2: source src (text:src) → e3
    e3: each a → e8
    e4: each b → e6
    e5: each c → e6#1
    e6: co-group d → e7
    e7: sink out (text:out) → e1
    e8: boundary boundary-1 (sequence:p/boundary-1) → e4, e5
    ");
}

#[test]
fn fixpoint_is_stable() {
    let mut g = ElementGraph::new("p");
    let src = source(&mut g, "src");
    let a = each(&mut g, "a", src);
    let b = each(&mut g, "b", a);
    let c = each(&mut g, "c", a);
    let d = co_group(&mut g, "d", &[b, c]);
    sink(&mut g, "out", d);

    apply_to_fixpoint(&rule(), &mut g, 10).unwrap();

    assert!(!rule().apply(&mut g).unwrap());
    assert!(SplitInsertionRule::split_points(&g).unwrap().is_empty());
}

#[test]
fn split_into_sinks_is_unchanged() {
    let mut g = ElementGraph::new("p");
    let src = source(&mut g, "src");
    let a = each(&mut g, "a", src);
    sink(&mut g, "left", a);
    sink(&mut g, "right", a);

    assert!(!rule().apply(&mut g).unwrap());
}

#[test]
fn split_into_merge_is_unchanged() {
    let mut g = ElementGraph::new("p");
    let src = source(&mut g, "src");
    let a = each(&mut g, "a", src);
    let b = each(&mut g, "b", a);
    let c = each(&mut g, "c", a);
    let m = merge(&mut g, "m", &[b, c]);
    sink(&mut g, "out", m);

    assert!(!rule().apply(&mut g).unwrap());
}

#[test]
fn split_after_grouping_is_exempt() {
    let mut g = ElementGraph::new("p");
    let src = source(&mut g, "src");
    let group = group_by(&mut g, "g", &[src]);
    let e = every(&mut g, "e", group);
    let b = each(&mut g, "b", e);
    let c = each(&mut g, "c", e);
    let d = co_group(&mut g, "d", &[b, c]);
    sink(&mut g, "out", d);

    assert!(!rule().apply(&mut g).unwrap());
}

#[test]
fn self_join_counts_parallel_scopes() {
    let mut g = ElementGraph::new("p");
    let src = source(&mut g, "src");
    let a = each(&mut g, "a", src);
    let j = co_group(&mut g, "j", &[a, a]);
    sink(&mut g, "out", j);

    assert_eq!(apply_to_fixpoint(&rule(), &mut g, 10).unwrap(), 1);
    assert_eq!(labelled(&g, "boundary"), ["boundary-1"]);
}
