use flowplan_core::{ElementGraph, ElementId, ElementSet, SubGraph, SubGraphView, Topology};

use super::*;
use crate::pattern::{Cmp, ElementExpression, ExpressionGraph, KindClass};
use crate::test_utils::*;

fn single(class: KindClass) -> ExpressionGraph {
    let mut pattern = ExpressionGraph::new();
    pattern.capture(ElementExpression::kind(class), Capture::Primary);
    pattern
}

fn each_then_grouping() -> ExpressionGraph {
    let mut pattern = ExpressionGraph::new();
    let each = pattern.capture(ElementExpression::kind(KindClass::Each), Capture::Primary);
    let group = pattern.capture(
        ElementExpression::kind(KindClass::Grouping),
        Capture::Secondary,
    );
    pattern.arc(each, group);
    pattern
}

fn motifs<'g>(g: &'g ElementGraph, pattern: ExpressionGraph) -> MotifIterator<'g> {
    MotifIterator::new(SubGraphView::whole(g), None, pattern, true).unwrap()
}

#[test]
fn motif_iterator_claims_one_occurrence_per_call() {
    let mut g = ElementGraph::new("chains");
    for i in 0..3 {
        let s = source(&mut g, &format!("s{i}"));
        let e = each(&mut g, &format!("e{i}"), s);
        let gb = group_by(&mut g, &format!("g{i}"), &[e]);
        sink(&mut g, &format!("o{i}"), gb);
    }
    let mut iter = motifs(&g, each_then_grouping());

    let first = iter.next().unwrap();
    assert_eq!(names(&g, &first.elements), vec!["e0", "g0"]);
    assert_eq!(first.scopes.len(), 1);
    assert!(iter.has_next());

    let rest = iter.drain().unwrap();
    assert_eq!(rest.len(), 2);
    assert_eq!(names(&g, &rest[1].elements), vec!["e2", "g2"]);
    assert!(!iter.has_next());
    assert_eq!(iter.next(), Err(IteratorError::Exhausted));
}

#[test]
fn motif_iterator_excludes_only_primary_captures() {
    let mut g = ElementGraph::new("merge-group");
    let s1 = source(&mut g, "s1");
    let s2 = source(&mut g, "s2");
    let e1 = each(&mut g, "e1", s1);
    let e2 = each(&mut g, "e2", s2);
    let gb = group_by(&mut g, "g", &[e1, e2]);
    sink(&mut g, "o", gb);
    let mut iter = motifs(&g, each_then_grouping());

    let partitions = iter.drain().unwrap();

    assert_eq!(partitions.len(), 2);
    assert!(partitions.iter().all(|p| p.contains(gb)));
    assert_eq!(iter.exclusions(), &ElementSet::from([e1, e2]));
    assert_eq!(iter.annotations_for(Capture::Secondary), ElementSet::from([gb]));
    assert_eq!(iter.annotations_for(Capture::Primary), ElementSet::from([e2]));
}

#[test]
fn motif_iterator_expands_contracted_matches() {
    let mut g = ElementGraph::new("chain");
    let s = source(&mut g, "s");
    let a = pipe(&mut g, "a", s);
    let b = each(&mut g, "b", a);
    let o = sink(&mut g, "o", b);

    let mut pattern = ExpressionGraph::new();
    let input = pattern.capture(ElementExpression::kind(KindClass::Tap), Capture::Include);
    let region = pattern.capture(
        ElementExpression::not_kind(KindClass::Tap),
        Capture::Primary,
    );
    let output = pattern.capture(ElementExpression::kind(KindClass::Tap), Capture::Include);
    pattern.arc(input, region).arc(region, output);
    let contraction = ElementExpression::kind(KindClass::Processing);
    let mut iter =
        MotifIterator::new(SubGraphView::whole(&g), Some(&contraction), pattern, false).unwrap();

    let step = iter.next().unwrap();

    assert_eq!(step.elements, ElementSet::from([s, a, b, o]));
    assert_eq!(step.scopes.len(), 3);
    assert_eq!(iter.annotations_for(Capture::Primary), ElementSet::from([a, b]));
    assert!(!iter.has_next());
}

/// `s → a → {b, c} → m → o`, without the extents.
fn diamond(g: &mut ElementGraph) -> [ElementId; 6] {
    let s = source(g, "s");
    let a = pipe(g, "a", s);
    let b = pipe(g, "b", a);
    let c = pipe(g, "c", a);
    let m = merge(g, "m", &[b, c]);
    let o = sink(g, "o", m);
    [s, a, b, c, m, o]
}

#[test]
fn path_iterator_yields_one_subgraph_per_path() {
    let mut g = ElementGraph::new("diamond");
    let [s, a, b, c, m, o] = diamond(&mut g);
    let body = SubGraph::whole(&g).without_extents(&g);
    let mut iter = PathIterator::new(OnceIterator::new(&g, body), false);

    let paths = iter.drain().unwrap();

    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0].elements, ElementSet::from([s, a, b, m, o]));
    assert_eq!(paths[1].elements, ElementSet::from([s, a, c, m, o]));
    assert_eq!(paths[0].scopes.len(), 4);
    assert_eq!(iter.decomposed_pairs(), &[(s, o)]);
}

#[test]
fn path_iterator_longest_first() {
    let mut g = ElementGraph::new("shortcut");
    let s = source(&mut g, "s");
    let a = pipe(&mut g, "a", s);
    let b = pipe(&mut g, "b", a);
    let m = merge(&mut g, "m", &[b, a]);
    let o = sink(&mut g, "o", m);
    let body = SubGraph::whole(&g).without_extents(&g);

    let shortest = PathIterator::new(OnceIterator::new(&g, body.clone()), false)
        .drain()
        .unwrap();
    let longest = PathIterator::new(OnceIterator::new(&g, body), true)
        .drain()
        .unwrap();

    assert_eq!(shortest[0].elements, ElementSet::from([s, a, m, o]));
    assert_eq!(longest[0].elements, ElementSet::from([s, a, b, m, o]));
}

#[test]
fn path_iterator_rejects_multiple_sinks() {
    let mut g = ElementGraph::new("fan-out");
    let s = source(&mut g, "s");
    let a = pipe(&mut g, "a", s);
    sink(&mut g, "o1", a);
    sink(&mut g, "o2", a);
    let body = SubGraph::whole(&g).without_extents(&g);
    let mut iter = PathIterator::new(OnceIterator::new(&g, body), false);

    assert!(iter.has_next());
    let err = iter.next().unwrap_err();

    assert_eq!(
        err,
        IteratorError::NotSingleSourceSink {
            sources: 1,
            sinks: 2
        }
    );
    assert!(err.to_string().starts_with(
        "path decomposition only supports single source and single sink graphs"
    ));
}

#[test]
fn remainder_covers_the_graph() {
    let mut g = ElementGraph::new("two-groups");
    let s = source(&mut g, "s");
    let a = each(&mut g, "a", s);
    let g1 = group_by(&mut g, "g1", &[a]);
    let b = every(&mut g, "b", g1);
    let g2 = group_by(&mut g, "g2", &[b]);
    let c = every(&mut g, "c", g2);
    sink(&mut g, "o", c);
    let mut iter = RemainderIterator::new(motifs(&g, single(KindClass::Grouping)), false);

    let parts = iter.drain().unwrap();

    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0].elements, ElementSet::from([g1]));
    assert_eq!(parts[1].elements, ElementSet::from([g2]));
    let covered: ElementSet = parts.iter().flat_map(|p| p.elements.iter().copied()).collect();
    let all: ElementSet = g.element_ids().filter(|e| !e.is_extent()).collect();
    assert_eq!(covered, all);
    assert!(parts[0].elements.is_disjoint(&parts[1].elements));
    assert!(parts[2].contains(g1) && parts[2].contains(g2));
    assert!(!parts[2].contains(ElementId::HEAD));
    assert!(!parts[2].contains(ElementId::TAIL));
}

#[test]
fn remainder_keeps_common_ancestors() {
    let mut g = ElementGraph::new("split");
    let s = source(&mut g, "s");
    let a = pipe(&mut g, "a", s);
    let b = pipe(&mut g, "b", a);
    let c = pipe(&mut g, "c", a);
    sink(&mut g, "o1", b);
    sink(&mut g, "o2", c);
    let mut split = ExpressionGraph::new();
    split.capture(
        ElementExpression::kind(KindClass::Pipe).and(ElementExpression::OutDegree(Cmp::Gt, 1)),
        Capture::Primary,
    );
    let mut iter = RemainderIterator::new(motifs(&g, split), false);

    let claimed = iter.next().unwrap();
    let remainder = iter.next().unwrap();

    assert_eq!(claimed.elements, ElementSet::from([a]));
    assert!(remainder.contains(a));
    assert!(remainder.contains(b) && remainder.contains(c));
    assert_eq!(remainder.scopes.len(), 5);
    assert!(!iter.has_next());
}

#[test]
fn remainder_drops_single_links() {
    let mut g = ElementGraph::new("chain");
    let s = source(&mut g, "s");
    let a = pipe(&mut g, "a", s);
    let o = sink(&mut g, "o", a);
    let mut iter = RemainderIterator::new(motifs(&g, single(KindClass::Sink)), false);

    let parts = iter.drain().unwrap();

    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].elements, ElementSet::from([o]));
    assert_eq!(parts[1].elements, ElementSet::from([s, a]));
    assert_eq!(parts[1].scopes.len(), 1);
}

#[test]
fn remainder_reconnects_claimed_runs() {
    let mut g = ElementGraph::new("run");
    let s = source(&mut g, "s");
    let p1 = pipe(&mut g, "p1", s);
    let e1 = each(&mut g, "e1", p1);
    let e2 = each(&mut g, "e2", e1);
    let p2 = pipe(&mut g, "p2", e2);
    let o = sink(&mut g, "o", p2);
    let mut iter = RemainderIterator::new(motifs(&g, single(KindClass::Each)), false);

    let parts = iter.drain().unwrap();

    assert_eq!(parts.len(), 3);
    let remainder = &parts[2];
    assert_eq!(remainder.elements, ElementSet::from([s, p1, e1, e2, p2, o]));
    assert_eq!(remainder.scopes.len(), 5);
    assert_eq!(remainder.view(&g).roots(), vec![s]);
    assert_eq!(remainder.view(&g).leaves(), vec![o]);
}

#[test]
fn multi_edge_remainder_keeps_parallel_links() {
    let mut g = ElementGraph::new("self-merge");
    let s = source(&mut g, "s");
    let m = merge(&mut g, "m", &[s, s]);
    sink(&mut g, "o", m);

    let plain = RemainderIterator::new(motifs(&g, single(KindClass::Source)), false)
        .drain()
        .unwrap();
    let multi = RemainderIterator::new(motifs(&g, single(KindClass::Source)), true)
        .drain()
        .unwrap();

    assert!(!plain[1].contains(s));
    assert!(multi[1].contains(s));
    assert_eq!(multi[1].scopes.len(), 3);
}

#[test]
fn remainder_is_skipped_when_nothing_is_left() {
    let mut g = ElementGraph::new("one");
    let s = source(&mut g, "s");
    sink(&mut g, "o", s);
    let mut any = ExpressionGraph::new();
    any.capture(ElementExpression::not_kind(KindClass::Extent), Capture::Primary);
    let mut iter = RemainderIterator::new(motifs(&g, any), false);

    assert_eq!(iter.drain().unwrap().len(), 2);
    assert_eq!(iter.next(), Err(IteratorError::Exhausted));
}

#[test]
fn once_iterator_yields_once() {
    let g = ElementGraph::new("empty");
    let mut iter = OnceIterator::new(&g, SubGraph::default());

    assert!(iter.has_next());
    assert_eq!(iter.next(), Ok(SubGraph::default()));
    assert!(!iter.has_next());
    assert_eq!(iter.next(), Err(IteratorError::Exhausted));
}
