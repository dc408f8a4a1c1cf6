use flowplan_core::{ElementGraph, ElementId, Topology};

use super::{JobPartitionRule, RewriteRule, apply_to_fixpoint};
use crate::test_utils::*;

fn rule() -> JobPartitionRule {
    JobPartitionRule::new("sequence")
}

#[test]
fn single_grouping_is_unchanged() {
    let mut g = ElementGraph::new("wc");
    let src = source(&mut g, "docs");
    let split = each(&mut g, "split", src);
    let group = group_by(&mut g, "by-word", &[split]);
    let count = every(&mut g, "count", group);
    sink(&mut g, "counts", count);

    assert!(!rule().apply(&mut g).unwrap());
}

#[test]
fn adjacent_groupings() {
    let mut g = ElementGraph::new("p");
    let src = source(&mut g, "src");
    let g1 = group_by(&mut g, "g1", &[src]);
    let g2 = group_by(&mut g, "g2", &[g1]);
    sink(&mut g, "out", g2);

    assert_eq!(apply_to_fixpoint(&rule(), &mut g, 10).unwrap(), 1);
    insta::assert_snapshot!(g.dump(), @r"
    e0: head → e2
    e1: tail → ∅
    e2: source src (text:src) → e3
    e3: group-by g1 → e6
    e4: group-by g2 → e5
    e5: sink out (text:out) → e1
    e6: boundary boundary-1 (sequence:p/boundary-1) → e4
    ");
}

#[test]
fn groupings_through_processing() {
    let mut g = ElementGraph::new("p");
    let src = source(&mut g, "src");
    let g1 = group_by(&mut g, "g1", &[src]);
    let first = every(&mut g, "first", g1);
    let g2 = group_by(&mut g, "g2", &[first]);
    let second = every(&mut g, "second", g2);
    sink(&mut g, "out", second);

    assert_eq!(apply_to_fixpoint(&rule(), &mut g, 10).unwrap(), 1);
    assert_eq!(names(&g, &g.predecessors(g2)), ["boundary-1"]);
    assert_eq!(names(&g, &g.successors(first)), ["boundary-1"]);
}

#[test]
fn processing_feeding_two_groupings() {
    let mut g = ElementGraph::new("p");
    let src = source(&mut g, "src");
    let a = each(&mut g, "a", src);
    let g1 = group_by(&mut g, "g1", &[a]);
    let g2 = group_by(&mut g, "g2", &[a]);
    let e1 = every(&mut g, "e1", g1);
    let e2 = every(&mut g, "e2", g2);
    sink(&mut g, "out1", e1);
    sink(&mut g, "out2", e2);

    assert_eq!(apply_to_fixpoint(&rule(), &mut g, 10).unwrap(), 1);
    assert_eq!(names(&g, &g.predecessors(g1)), ["a"]);
    assert_eq!(names(&g, &g.predecessors(g2)), ["boundary-1"]);
}

#[test]
fn two_groupings_merged() {
    let mut g = ElementGraph::new("p");
    let left = source(&mut g, "left");
    let right = source(&mut g, "right");
    let g1 = group_by(&mut g, "g1", &[left]);
    let g2 = group_by(&mut g, "g2", &[right]);
    let sum1 = every(&mut g, "sum1", g1);
    let sum2 = every(&mut g, "sum2", g2);
    let m = merge(&mut g, "m", &[sum1, sum2]);
    sink(&mut g, "out", m);

    assert_eq!(apply_to_fixpoint(&rule(), &mut g, 10).unwrap(), 1);
    insta::assert_snapshot!(g.dump(), @r"
    e0: head → e2, e3
    e1: tail → ∅
    e2: source left (text:left) → e4
    e3: source right (text:right) → e5
    e4: group-by g1 → e6
    e5: group-by g2 → e7
    e6: every sum1 → e8
    e7: every sum2 → e10
    e8: merge m → e9
    e9: sink out (text:out) → e1
    e10: boundary boundary-1 (sequence:p/boundary-1) → e8#1
    ");
}

/// Two groupings meet at a merge; one of them also feeds a sink directly.
fn groupings_meeting_at_merge(g: &mut ElementGraph) -> [ElementId; 4] {
    let s1 = source(g, "s1");
    let e1 = each(g, "e1", s1);
    let g1 = group_by(g, "g1", &[e1]);
    let v1 = every(g, "v1", g1);
    let s2 = source(g, "s2");
    let e2 = each(g, "e2", s2);
    let g2 = group_by(g, "g2", &[e2]);
    let v2 = every(g, "v2", g2);
    let m = merge(g, "m", &[v1, v2]);
    sink(g, "out", m);
    sink(g, "o2", v2);
    [g1, v1, g2, v2]
}

#[test]
fn cut_stays_behind_every_chain() {
    let mut g = ElementGraph::new("p");
    let [g1, v1, g2, v2] = groupings_meeting_at_merge(&mut g);

    apply_to_fixpoint(&rule(), &mut g, 10).unwrap();

    assert!(!labelled(&g, "boundary").is_empty());
    assert_eq!(names(&g, &g.predecessors(v1)), ["g1"]);
    assert_eq!(names(&g, &g.predecessors(v2)), ["g2"]);
    assert_eq!(names(&g, &g.successors(g1)), ["v1"]);
    assert_eq!(names(&g, &g.successors(g2)), ["v2"]);
    assert!(super::check_every_chains(&g).is_ok());
}

#[test]
fn fixpoint_is_stable() {
    let mut g = ElementGraph::new("p");
    let src = source(&mut g, "src");
    let g1 = group_by(&mut g, "g1", &[src]);
    let first = every(&mut g, "first", g1);
    let g2 = group_by(&mut g, "g2", &[first]);
    let g3 = group_by(&mut g, "g3", &[first]);
    sink(&mut g, "out2", g2);
    sink(&mut g, "out3", g3);

    let changes = apply_to_fixpoint(&rule(), &mut g, 10).unwrap();

    assert_eq!(changes, 2);
    assert!(!rule().apply(&mut g).unwrap());
}

#[test]
fn motifs_are_valid() {
    for motif in JobPartitionRule::motifs() {
        assert!(motif.validate().is_ok());
    }
}
