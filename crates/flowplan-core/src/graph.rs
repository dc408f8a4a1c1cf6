//! Arena-backed element graph.
//!
//! Elements and scopes live in flat vectors addressed by [`ElementId`] and
//! [`ScopeId`]. Removal leaves a hole, so ids held by rules, iterators and
//! exclusion sets stay valid for everything that was not removed.
//!
//! Every graph owns the two extents: `head` is always [`ElementId::HEAD`] and
//! `tail` is always [`ElementId::TAIL`].

use std::collections::BTreeSet;
use std::fmt;

use crate::element::{Element, ElementKind, Extent};
use crate::fields::Fields;
use crate::tap::Tap;
use crate::topology::Topology;

/// Index into `ElementGraph::elements`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl ElementId {
    pub const HEAD: Self = Self(0);
    pub const TAIL: Self = Self(1);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_extent(self) -> bool {
        self == Self::HEAD || self == Self::TAIL
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Index into `ElementGraph::scopes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Identity-keyed element set. Ordered so that every traversal is deterministic.
pub type ElementSet = BTreeSet<ElementId>;
pub type ScopeSet = BTreeSet<ScopeId>;

/// A directed edge and the field contract flowing along it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub from: ElementId,
    pub to: ElementId,
    /// Input position at `to`. Zero is the streamed side of a join.
    pub ordinal: u32,
    /// Filled in by field resolution.
    pub fields: Option<Fields>,
}

impl Scope {
    pub fn is_streamed(&self) -> bool {
        self.ordinal == 0
    }
}

#[derive(Debug, Clone)]
pub struct ElementGraph {
    name: String,
    elements: Vec<Option<Element>>,
    scopes: Vec<Option<Scope>>,
    outgoing: Vec<Vec<ScopeId>>,
    incoming: Vec<Vec<ScopeId>>,
    boundary_counter: u32,
}

impl ElementGraph {
    pub fn new(name: impl Into<String>) -> Self {
        let mut graph = Self {
            name: name.into(),
            elements: Vec::new(),
            scopes: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            boundary_counter: 0,
        };
        graph.add_element(Element::new("head", ElementKind::Extent(Extent::Head)));
        graph.add_element(Element::new("tail", ElementKind::Extent(Extent::Tail)));
        graph
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.get(id.index()).is_some_and(Option::is_some)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index()).and_then(Option::as_ref)
    }

    /// Panics if `id` was removed.
    pub fn element(&self, id: ElementId) -> &Element {
        match self.get(id) {
            Some(element) => element,
            None => panic!("element {id} is not in graph `{}`", self.name),
        }
    }

    /// Panics if `id` was removed.
    pub fn element_mut(&mut self, id: ElementId) -> &mut Element {
        let name = &self.name;
        match self.elements.get_mut(id.index()).and_then(Option::as_mut) {
            Some(element) => element,
            None => panic!("element {id} is not in graph `{name}`"),
        }
    }

    pub fn kind(&self, id: ElementId) -> &ElementKind {
        &self.element(id).kind
    }

    pub fn contains_scope(&self, id: ScopeId) -> bool {
        self.scopes.get(id.index()).is_some_and(Option::is_some)
    }

    /// Panics if `id` was removed.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        match self.scopes.get(id.index()).and_then(Option::as_ref) {
            Some(scope) => scope,
            None => panic!("scope {id} is not in graph `{}`", self.name),
        }
    }

    /// Panics if `id` was removed.
    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        let name = &self.name;
        match self.scopes.get_mut(id.index()).and_then(Option::as_mut) {
            Some(scope) => scope,
            None => panic!("scope {id} is not in graph `{name}`"),
        }
    }

    /// Live element ids, ascending.
    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_some())
            .map(|(i, _)| ElementId(i as u32))
    }

    /// Live scope ids, ascending.
    pub fn scope_ids(&self) -> impl Iterator<Item = ScopeId> + '_ {
        self.scopes
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| ScopeId(i as u32))
    }

    /// Live elements excluding the extents.
    pub fn element_count(&self) -> usize {
        self.element_ids().filter(|id| !id.is_extent()).count()
    }

    pub fn scope_count(&self) -> usize {
        self.scope_ids().count()
    }

    pub fn find(&self, name: &str) -> Option<ElementId> {
        self.element_ids()
            .find(|id| !id.is_extent() && self.element(*id).name == name)
    }

    /// Outgoing scopes of `id` in insertion order.
    pub fn outgoing(&self, id: ElementId) -> &[ScopeId] {
        self.outgoing.get(id.index()).map_or(&[], Vec::as_slice)
    }

    /// Incoming scopes of `id` ordered by ordinal.
    pub fn incoming(&self, id: ElementId) -> Vec<ScopeId> {
        let mut scopes = self
            .incoming
            .get(id.index())
            .cloned()
            .unwrap_or_default();
        scopes.sort_by_key(|s| (self.scope(*s).ordinal, *s));
        scopes
    }

    /// Every scope between `from` and `to`, parallel edges included.
    pub fn scopes_between(&self, from: ElementId, to: ElementId) -> Vec<ScopeId> {
        self.outgoing(from)
            .iter()
            .copied()
            .filter(|s| self.scope(*s).to == to)
            .collect()
    }

    /// Elements reading from `head`.
    pub fn sources(&self) -> Vec<ElementId> {
        self.successors(ElementId::HEAD)
    }

    /// Elements writing into `tail`.
    pub fn sinks(&self) -> Vec<ElementId> {
        self.predecessors(ElementId::TAIL)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(Some(element));
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    pub fn add_scope(&mut self, from: ElementId, to: ElementId, ordinal: u32) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Some(Scope {
            from,
            to,
            ordinal,
            fields: None,
        }));
        self.outgoing[from.index()].push(id);
        self.incoming[to.index()].push(id);
        id
    }

    /// Link `from` to `to` as the next input position of `to`.
    pub fn connect(&mut self, from: ElementId, to: ElementId) -> ScopeId {
        let ordinal = self
            .incoming(to)
            .last()
            .map_or(0, |s| self.scope(*s).ordinal + 1);
        self.add_scope(from, to, ordinal)
    }

    /// Add a source reading from `head`.
    pub fn add_source(&mut self, name: impl Into<String>, tap: Tap) -> ElementId {
        let id = self.add_element(Element::new(name, ElementKind::Source(tap)));
        self.add_scope(ElementId::HEAD, id, 0);
        id
    }

    /// Add a sink fed by `input` and writing into `tail`.
    pub fn add_sink(&mut self, name: impl Into<String>, tap: Tap, input: ElementId) -> ElementId {
        let id = self.add_element(Element::new(name, ElementKind::Sink(tap)));
        self.add_scope(input, id, 0);
        self.add_scope(id, ElementId::TAIL, 0);
        id
    }

    /// Add a stage fed by `inputs`, ordinals following the slice order.
    pub fn add_stage(
        &mut self,
        name: impl Into<String>,
        kind: ElementKind,
        inputs: &[ElementId],
    ) -> ElementId {
        let id = self.add_element(Element::new(name, kind));
        for (ordinal, input) in inputs.iter().enumerate() {
            self.add_scope(*input, id, ordinal as u32);
        }
        id
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────

    pub fn remove_scope(&mut self, id: ScopeId) -> Option<Scope> {
        let scope = self.scopes.get_mut(id.index())?.take()?;
        self.outgoing[scope.from.index()].retain(|s| *s != id);
        self.incoming[scope.to.index()].retain(|s| *s != id);
        Some(scope)
    }

    /// Remove an element together with every scope touching it.
    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        if !self.contains(id) {
            return None;
        }
        let touching: Vec<ScopeId> = self.outgoing[id.index()]
            .iter()
            .chain(self.incoming[id.index()].iter())
            .copied()
            .collect();
        for scope in touching {
            self.remove_scope(scope);
        }
        self.elements[id.index()].take()
    }

    fn retarget(&mut self, scope: ScopeId, to: ElementId, ordinal: u32) {
        let old = self.scope(scope).to;
        self.incoming[old.index()].retain(|s| *s != scope);
        self.incoming[to.index()].push(scope);
        let s = self.scope_mut(scope);
        s.to = to;
        s.ordinal = ordinal;
        s.fields = None;
    }

    fn reorigin(&mut self, scope: ScopeId, from: ElementId) {
        let old = self.scope(scope).from;
        self.outgoing[old.index()].retain(|s| *s != scope);
        self.outgoing[from.index()].push(scope);
        let s = self.scope_mut(scope);
        s.from = from;
        s.fields = None;
    }

    /// Insert `element` directly after `id`: every outgoing scope of `id` now
    /// leaves the new element, which is fed by `id` alone.
    pub fn insert_after(&mut self, id: ElementId, element: Element) -> ElementId {
        let inserted = self.add_element(element);
        let moved: Vec<ScopeId> = self.outgoing[id.index()].clone();
        for scope in moved {
            self.reorigin(scope, inserted);
        }
        self.add_scope(id, inserted, 0);
        inserted
    }

    /// Split `scope` with `element`. The scope now ends at the new element and
    /// a fresh scope carries the original ordinal on to the old target.
    pub fn insert_on_scope(&mut self, scope: ScopeId, element: Element) -> ElementId {
        let (to, ordinal) = {
            let s = self.scope(scope);
            (s.to, s.ordinal)
        };
        let inserted = self.add_element(element);
        self.retarget(scope, inserted, 0);
        self.add_scope(inserted, to, ordinal);
        inserted
    }

    /// Splice every scope of `old` onto `with`, then remove `old`.
    ///
    /// Scopes between `old` and `with` would become self loops and are dropped.
    pub fn replace_element(&mut self, old: ElementId, with: ElementId) {
        for scope in self.incoming[old.index()].clone() {
            if self.scope(scope).from == with {
                self.remove_scope(scope);
            } else {
                let ordinal = self.scope(scope).ordinal;
                self.retarget(scope, with, ordinal);
            }
        }
        for scope in self.outgoing[old.index()].clone() {
            if self.scope(scope).to == with {
                self.remove_scope(scope);
            } else {
                self.reorigin(scope, with);
            }
        }
        self.remove_element(old);
    }

    /// Splice out an element with a single input, wiring its input to every
    /// output in its place. Returns `false` when `id` has more than one input.
    pub fn remove_pass_through(&mut self, id: ElementId) -> bool {
        let &[input] = self.incoming[id.index()].as_slice() else {
            return false;
        };
        let from = self.scope(input).from;
        for scope in self.outgoing[id.index()].clone() {
            self.reorigin(scope, from);
        }
        self.remove_element(id);
        true
    }

    /// A fresh element name for a planner-inserted boundary.
    pub fn next_boundary_name(&mut self) -> String {
        loop {
            self.boundary_counter += 1;
            let name = format!("boundary-{}", self.boundary_counter);
            if self.find(&name).is_none() {
                return name;
            }
        }
    }

    /// Clear every resolved field contract.
    pub fn clear_fields(&mut self) {
        for scope in self.scopes.iter_mut().flatten() {
            scope.fields = None;
        }
    }
}

impl Topology for ElementGraph {
    fn vertices(&self) -> Vec<ElementId> {
        self.element_ids().collect()
    }

    fn contains_vertex(&self, vertex: ElementId) -> bool {
        self.contains(vertex)
    }

    fn edges_out(&self, vertex: ElementId) -> Vec<(ScopeId, ElementId)> {
        self.outgoing(vertex)
            .iter()
            .map(|s| (*s, self.scope(*s).to))
            .collect()
    }

    fn edges_in(&self, vertex: ElementId) -> Vec<(ScopeId, ElementId)> {
        self.incoming(vertex)
            .into_iter()
            .map(|s| (s, self.scope(s).from))
            .collect()
    }
}
