//! Dump helpers for graph inspection and testing.
//!
//! One line per live element, in id order:
//!
//! ```text
//! e2: source docs (text:in/docs) → e3
//! e4: group-by by-word → e5, e6#1
//! e1: tail → ∅
//! ```
//!
//! `#n` marks a scope arriving at input position `n > 0`.

use std::fmt::Write;

use crate::element::ElementKind;
use crate::graph::{ElementGraph, ElementId};

/// Printer for `ElementGraph` with configurable output options.
pub struct GraphPrinter<'a> {
    graph: &'a ElementGraph,
    show_fields: bool,
    show_header: bool,
}

impl<'a> GraphPrinter<'a> {
    pub fn new(graph: &'a ElementGraph) -> Self {
        Self {
            graph,
            show_fields: false,
            show_header: false,
        }
    }

    /// Append resolved scope fields to each successor.
    pub fn show_fields(mut self, show: bool) -> Self {
        self.show_fields = show;
        self
    }

    /// Start with a `pipeline <name>` line.
    pub fn show_header(mut self, show: bool) -> Self {
        self.show_header = show;
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    fn format(&self, w: &mut String) -> std::fmt::Result {
        if self.show_header {
            writeln!(w, "pipeline {}", self.graph.name())?;
        }
        for id in self.graph.element_ids() {
            write!(w, "{id}: ")?;
            self.format_element(w, id)?;
            self.format_successors(w, id)?;
            writeln!(w)?;
        }
        Ok(())
    }

    fn format_element(&self, w: &mut String, id: ElementId) -> std::fmt::Result {
        let element = self.graph.element(id);
        let label = element.kind.label();
        match &element.kind {
            ElementKind::Extent(_) => write!(w, "{label}"),
            ElementKind::Source(tap) | ElementKind::Sink(tap) | ElementKind::Boundary(tap) => {
                write!(w, "{label} {} ({}:{})", element.name, tap.scheme, tap.identifier)
            }
            _ => write!(w, "{label} {}", element.name),
        }
    }

    fn format_successors(&self, w: &mut String, id: ElementId) -> std::fmt::Result {
        let mut scopes: Vec<_> = self.graph.outgoing(id).to_vec();
        scopes.sort_by_key(|s| {
            let scope = self.graph.scope(*s);
            (scope.to, scope.ordinal, *s)
        });

        if scopes.is_empty() {
            return write!(w, " → ∅");
        }

        write!(w, " →")?;
        for (i, s) in scopes.iter().enumerate() {
            let scope = self.graph.scope(*s);
            write!(w, "{} {}", if i == 0 { "" } else { "," }, scope.to)?;
            if scope.ordinal > 0 {
                write!(w, "#{}", scope.ordinal)?;
            }
            if self.show_fields {
                match &scope.fields {
                    Some(fields) => write!(w, " {fields}")?,
                    None => write!(w, " [-]")?,
                }
            }
        }
        Ok(())
    }
}

impl ElementGraph {
    pub fn printer(&self) -> GraphPrinter<'_> {
        GraphPrinter::new(self)
    }

    pub fn dump(&self) -> String {
        self.printer().dump()
    }
}
