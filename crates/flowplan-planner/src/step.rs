//! Step graph: the rewritten element graph cut into units of work.
//!
//! Over the graph contracted by every element that is neither a tap nor an
//! extent, each contracted vertex is one region of processing. A step is a
//! region together with the taps it reads and writes:
//!
//! ```text
//! Tap → Region → Tap
//! ```
//!
//! Every tap written directly by another tap adds a copy step moving one into
//! the other.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use flowplan_core::{
    CycleError, ElementGraph, ElementId, ElementKind, ElementSet, Group, GroupKind, Joiner,
    SubGraph, SubGraphView, Topology,
};
use serde::Serialize;
use tracing::{debug, trace};

use crate::PlanErrorKind;
use crate::iter::{MotifIterator, RemainderIterator, SubGraphIterator};
use crate::pattern::{Capture, ElementExpression, ExpressionGraph, KindClass};

/// A tap read or written by a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapRef {
    pub element: ElementId,
    pub name: String,
    pub scheme: String,
    pub identifier: String,
}

/// The grouping a step runs, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupingInfo {
    pub element: ElementId,
    pub name: String,
    pub kind: GroupKind,
    /// Join strategy of a co-group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joiner: Option<Joiner>,
    /// Output fields are left to a custom joiner.
    pub defers_to_joiner: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Map,
    Reduce,
}

/// Element names of one side of a step, in topological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepNode {
    pub kind: NodeKind,
    pub elements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub id: usize,
    pub name: String,
    pub elements: ElementSet,
    pub sources: Vec<TapRef>,
    pub sinks: Vec<TapRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping: Option<GroupingInfo>,
    pub nodes: Vec<StepNode>,
}

impl Step {
    /// A step moving one tap into another, with no processing of its own.
    pub fn is_copy(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// `to` reads the tap `from` writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepEdge {
    pub from: usize,
    pub to: usize,
    pub tap: String,
}

/// Steps in an order every edge respects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepGraph {
    pub pipeline: String,
    pub steps: Vec<Step>,
    pub edges: Vec<StepEdge>,
}

impl StepGraph {
    /// Partition `graph`, which must already be rewritten.
    pub fn build(graph: &ElementGraph, multi_edge: bool) -> Result<Self, PlanErrorKind> {
        let order = graph.topological_order()?;
        let drafts = drafts(graph, multi_edge)?;
        let edges = draft_edges(&drafts);
        let sorted = sort_drafts(&drafts, &edges)?;

        let total = sorted.len();
        let position: BTreeMap<usize, usize> =
            sorted.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let mut steps = Vec::with_capacity(total);
        for (id, index) in sorted.iter().enumerate() {
            let draft = &drafts[*index];
            let step = draft.finish(graph, &order, id, total)?;
            trace!(
                step = %step.name,
                elements = step.elements.len(),
                grouping = step.grouping.is_some(),
                "planned step"
            );
            steps.push(step);
        }

        let mut edges: Vec<StepEdge> = edges
            .into_iter()
            .map(|(from, to, tap)| StepEdge {
                from: position[&from],
                to: position[&to],
                tap: graph.element(tap).name.clone(),
            })
            .collect();
        edges.sort_by(|a, b| (a.from, a.to, &a.tap).cmp(&(b.from, b.to, &b.tap)));

        debug!(
            pipeline = graph.name(),
            steps = steps.len(),
            edges = edges.len(),
            "built step graph"
        );
        Ok(Self {
            pipeline: graph.name().to_string(),
            steps,
            edges,
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, id: usize) -> Option<&Step> {
        self.steps.get(id)
    }

    /// Steps that must complete before `id` starts.
    pub fn dependencies(&self, id: usize) -> Vec<usize> {
        let set: BTreeSet<usize> = self
            .edges
            .iter()
            .filter(|e| e.to == id)
            .map(|e| e.from)
            .collect();
        set.into_iter().collect()
    }

    /// Steps waiting on `id`.
    pub fn dependents(&self, id: usize) -> Vec<usize> {
        let set: BTreeSet<usize> = self
            .edges
            .iter()
            .filter(|e| e.from == id)
            .map(|e| e.to)
            .collect();
        set.into_iter().collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    fn format(&self, w: &mut String) -> std::fmt::Result {
        for step in &self.steps {
            writeln!(w, "step {}: {}", step.id, step.name)?;
            writeln!(w, "  sources: {}", taps(&step.sources))?;
            writeln!(w, "  sinks: {}", taps(&step.sinks))?;
            if let Some(grouping) = &step.grouping {
                write!(w, "  grouping: {} {}", grouping.kind.label(), grouping.name)?;
                if let Some(joiner) = &grouping.joiner {
                    write!(w, " ({})", joiner_label(joiner))?;
                }
                writeln!(w)?;
            }
            for node in &step.nodes {
                let kind = match node.kind {
                    NodeKind::Map => "map",
                    NodeKind::Reduce => "reduce",
                };
                writeln!(w, "  {kind}: {}", node.elements.join(", "))?;
            }
        }
        for edge in &self.edges {
            writeln!(w, "edge {} → {} via {}", edge.from, edge.to, edge.tap)?;
        }
        Ok(())
    }
}

fn taps(taps: &[TapRef]) -> String {
    if taps.is_empty() {
        return "∅".to_string();
    }
    taps.iter()
        .map(|t| format!("{} ({}:{})", t.name, t.scheme, t.identifier))
        .collect::<Vec<_>>()
        .join(", ")
}

fn joiner_label(joiner: &Joiner) -> String {
    match joiner {
        Joiner::Inner => "inner".to_string(),
        Joiner::Outer => "outer".to_string(),
        Joiner::Left => "left".to_string(),
        Joiner::Right => "right".to_string(),
        Joiner::Custom(name) => format!("custom {name}"),
    }
}

/// A step before it has its place in the order.
#[derive(Debug)]
struct Draft {
    elements: ElementSet,
    /// Non-tap members. Empty for a copy step.
    region: ElementSet,
    sources: Vec<ElementId>,
    sinks: Vec<ElementId>,
}

fn region_expression() -> ElementExpression {
    ElementExpression::not_kind(KindClass::Tap).and(ElementExpression::not_kind(KindClass::Extent))
}

fn step_motif() -> ExpressionGraph {
    let mut motif = ExpressionGraph::new();
    let input = motif.capture(ElementExpression::kind(KindClass::Tap), Capture::Include);
    let region = motif.capture(region_expression(), Capture::Primary);
    let output = motif.capture(ElementExpression::kind(KindClass::Tap), Capture::Include);
    motif.arc(input, region).arc(region, output);
    motif
}

fn drafts(graph: &ElementGraph, multi_edge: bool) -> Result<Vec<Draft>, PlanErrorKind> {
    let view = SubGraphView::whole(graph);
    let contraction = region_expression();
    let motifs = MotifIterator::new(view, Some(&contraction), step_motif(), false)?;
    let mut partitions = RemainderIterator::new(motifs, multi_edge);

    let mut drafts = Vec::new();
    let mut unclaimed = ElementSet::new();
    while partitions.has_next() {
        let remainder = partitions.at_remainder();
        let sub = partitions.next()?;
        if remainder {
            unclaimed = sub.elements;
        } else {
            let region = partitions.annotations_for(Capture::Primary);
            drafts.push(region_draft(graph, sub, region));
        }
    }

    drafts.extend(copy_drafts(graph));
    if let Some(left) = unclaimed
        .iter()
        .find(|e| !drafts.iter().any(|d| d.elements.contains(*e)))
    {
        return Err(PlanErrorKind::Unplaced {
            element: graph.element(*left).name.clone(),
        });
    }
    Ok(drafts)
}

fn region_draft(graph: &ElementGraph, sub: SubGraph, region: ElementSet) -> Draft {
    let mut sources = Vec::new();
    let mut sinks = Vec::new();
    for id in sub.elements.iter().copied() {
        if !graph.kind(id).is_tap() {
            continue;
        }
        let reads = graph
            .outgoing(id)
            .iter()
            .any(|s| region.contains(&graph.scope(*s).to));
        let writes = graph
            .incoming(id)
            .iter()
            .any(|s| region.contains(&graph.scope(*s).from));
        if reads {
            sources.push(id);
        }
        if writes {
            sinks.push(id);
        }
    }
    Draft {
        elements: sub.elements,
        region,
        sources,
        sinks,
    }
}

/// One copy step per tap written directly by another tap.
///
/// No region covers such a link, whether or not the taps at either end are
/// claimed by a region.
fn copy_drafts(graph: &ElementGraph) -> Vec<Draft> {
    let is_tap = |e: ElementId| !e.is_extent() && graph.kind(e).is_tap();
    let links: BTreeSet<(ElementId, ElementId)> = graph
        .scope_ids()
        .map(|s| graph.scope(s))
        .filter(|scope| is_tap(scope.from) && is_tap(scope.to))
        .map(|scope| (scope.from, scope.to))
        .collect();

    links
        .into_iter()
        .map(|(from, to)| Draft {
            elements: ElementSet::from([from, to]),
            region: ElementSet::new(),
            sources: vec![from],
            sinks: vec![to],
        })
        .collect()
}

/// `(producer, consumer, tap)` for every tap one draft writes and another reads.
fn draft_edges(drafts: &[Draft]) -> Vec<(usize, usize, ElementId)> {
    let mut edges = Vec::new();
    for (from, producer) in drafts.iter().enumerate() {
        for (to, consumer) in drafts.iter().enumerate() {
            if from == to {
                continue;
            }
            for tap in &producer.sinks {
                if consumer.sources.contains(tap) {
                    edges.push((from, to, *tap));
                }
            }
        }
    }
    edges
}

/// Kahn's algorithm over drafts, releasing the earliest found draft first.
fn sort_drafts(
    drafts: &[Draft],
    edges: &[(usize, usize, ElementId)],
) -> Result<Vec<usize>, PlanErrorKind> {
    let mut pending = vec![0usize; drafts.len()];
    for (_, to, _) in edges {
        pending[*to] += 1;
    }
    let mut ready: BTreeSet<usize> = (0..drafts.len()).filter(|d| pending[*d] == 0).collect();
    let mut order = Vec::with_capacity(drafts.len());

    while let Some(next) = ready.pop_first() {
        order.push(next);
        for (from, to, _) in edges {
            if *from != next {
                continue;
            }
            pending[*to] -= 1;
            if pending[*to] == 0 {
                ready.insert(*to);
            }
        }
    }

    if order.len() < drafts.len() {
        let stuck: ElementSet = (0..drafts.len())
            .filter(|d| !order.contains(d))
            .flat_map(|d| drafts[d].elements.iter().copied())
            .collect();
        return Err(CycleError(stuck).into());
    }
    Ok(order)
}

impl Draft {
    fn finish(
        &self,
        graph: &ElementGraph,
        order: &[ElementId],
        id: usize,
        total: usize,
    ) -> Result<Step, PlanErrorKind> {
        let name = format!("({}/{}) {}", id + 1, total, graph.name());
        let groupings: Vec<(ElementId, &Group)> = self
            .region
            .iter()
            .filter_map(|e| match graph.kind(*e) {
                ElementKind::Group(group) => Some((*e, group)),
                _ => None,
            })
            .collect();
        if groupings.len() > 1 {
            return Err(PlanErrorKind::Unschedulable {
                step: name,
                groupings: groupings.len(),
            });
        }

        let grouping = groupings.first().map(|(e, group)| GroupingInfo {
            element: *e,
            name: graph.element(*e).name.clone(),
            kind: group.kind,
            joiner: (group.kind == GroupKind::CoGroup).then(|| group.join.joiner.clone()),
            defers_to_joiner: group.kind == GroupKind::CoGroup && group.join.defers_to_joiner(),
        });
        let nodes = self.nodes(graph, order, grouping.as_ref().map(|g| g.element));
        let to_ref = |e: &ElementId| tap_ref(graph, *e);

        Ok(Step {
            id,
            name,
            elements: self.elements.clone(),
            sources: self.sources.iter().filter_map(to_ref).collect(),
            sinks: self.sinks.iter().filter_map(to_ref).collect(),
            grouping,
            nodes,
        })
    }

    /// `Map` holds the region up to the grouping, `Reduce` the grouping and
    /// what follows it. Empty sides are left out.
    fn nodes(
        &self,
        graph: &ElementGraph,
        order: &[ElementId],
        grouping: Option<ElementId>,
    ) -> Vec<StepNode> {
        let downstream = grouping.map(|g| graph.descendants(g)).unwrap_or_default();
        let reduces = |e: ElementId| grouping == Some(e) || downstream.contains(&e);

        let mut map = StepNode {
            kind: NodeKind::Map,
            elements: Vec::new(),
        };
        let mut reduce = StepNode {
            kind: NodeKind::Reduce,
            elements: Vec::new(),
        };
        for e in order.iter().copied().filter(|e| self.region.contains(e)) {
            let node = if reduces(e) { &mut reduce } else { &mut map };
            node.elements.push(graph.element(e).name.clone());
        }

        [map, reduce]
            .into_iter()
            .filter(|node| !node.elements.is_empty())
            .collect()
    }
}

fn tap_ref(graph: &ElementGraph, id: ElementId) -> Option<TapRef> {
    let element = graph.element(id);
    let tap = element.kind.tap()?;
    Some(TapRef {
        element: id,
        name: element.name.clone(),
        scheme: tap.scheme.clone(),
        identifier: tap.identifier.clone(),
    })
}
