//! Graph-building shorthands shared by the planner tests.

use flowplan_core::{
    ElementGraph, ElementId, ElementKind, Fields, Group, Join, Joiner, Operation, Tap,
};

pub fn text(identifier: &str) -> Tap {
    Tap::new("text", identifier, Fields::Unknown)
}

pub fn source(g: &mut ElementGraph, name: &str) -> ElementId {
    g.add_source(name, text(name))
}

pub fn source_in(g: &mut ElementGraph, name: &str, scheme: &str) -> ElementId {
    g.add_source(name, Tap::new(scheme, name, Fields::Unknown))
}

pub fn sink(g: &mut ElementGraph, name: &str, input: ElementId) -> ElementId {
    g.add_sink(name, text(name), input)
}

pub fn pipe(g: &mut ElementGraph, name: &str, input: ElementId) -> ElementId {
    g.add_stage(name, ElementKind::Pipe, &[input])
}

pub fn each(g: &mut ElementGraph, name: &str, input: ElementId) -> ElementId {
    let op = Operation::function(name, Fields::Unknown);
    g.add_stage(name, ElementKind::Each(op), &[input])
}

pub fn every(g: &mut ElementGraph, name: &str, input: ElementId) -> ElementId {
    let op = Operation::aggregator(name, Fields::Unknown);
    g.add_stage(name, ElementKind::Every(op), &[input])
}

pub fn buffer(g: &mut ElementGraph, name: &str, input: ElementId) -> ElementId {
    let op = Operation::buffer(name, Fields::Unknown);
    g.add_stage(name, ElementKind::Every(op), &[input])
}

pub fn merge(g: &mut ElementGraph, name: &str, inputs: &[ElementId]) -> ElementId {
    g.add_stage(name, ElementKind::Merge, inputs)
}

pub fn group_by(g: &mut ElementGraph, name: &str, inputs: &[ElementId]) -> ElementId {
    let group = Group::group_by(Fields::Unknown);
    g.add_stage(name, ElementKind::Group(group), inputs)
}

pub fn co_group(g: &mut ElementGraph, name: &str, inputs: &[ElementId]) -> ElementId {
    let group = Group::co_group(Join::on(Fields::Unknown).with_declared(Fields::Unknown));
    g.add_stage(name, ElementKind::Group(group), inputs)
}

pub fn custom_co_group(g: &mut ElementGraph, name: &str, inputs: &[ElementId]) -> ElementId {
    let join = Join::on(Fields::Unknown).with_joiner(Joiner::Custom("Mixed".into()));
    g.add_stage(name, ElementKind::Group(Group::co_group(join)), inputs)
}

pub fn hash_join(g: &mut ElementGraph, name: &str, inputs: &[ElementId]) -> ElementId {
    let join = Join::on(Fields::Unknown).with_declared(Fields::Unknown);
    g.add_stage(name, ElementKind::HashJoin(join), inputs)
}

/// Names of `ids` in id order, extents included.
pub fn names<'a>(g: &ElementGraph, ids: impl IntoIterator<Item = &'a ElementId>) -> Vec<String> {
    let mut ids: Vec<ElementId> = ids.into_iter().copied().collect();
    ids.sort();
    ids.into_iter().map(|id| g.element(id).name.clone()).collect()
}

/// Names of every element of the given kind label.
pub fn labelled(g: &ElementGraph, label: &str) -> Vec<String> {
    g.element_ids()
        .filter(|id| g.kind(*id).label() == label)
        .map(|id| g.element(id).name.clone())
        .collect()
}
