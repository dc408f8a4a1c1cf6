//! Builder-pattern printer for rendering diagnostics against the graph they describe.

use std::fmt::Write;

use flowplan_core::{ElementGraph, ElementId};

use super::Diagnostics;

pub struct DiagnosticsPrinter<'d> {
    diagnostics: &'d Diagnostics,
    graph: &'d ElementGraph,
    show_hints: bool,
}

impl<'d> DiagnosticsPrinter<'d> {
    pub fn new(diagnostics: &'d Diagnostics, graph: &'d ElementGraph) -> Self {
        Self {
            diagnostics,
            graph,
            show_hints: true,
        }
    }

    pub fn show_hints(mut self, value: bool) -> Self {
        self.show_hints = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        for diag in self.diagnostics.iter() {
            writeln!(
                w,
                "{}: {}: {}",
                diag.severity(),
                self.name(diag.element),
                diag.message
            )?;
            for related in &diag.related {
                writeln!(w, "  note: {}: {}", self.name(related.element), related.message)?;
            }
            if self.show_hints {
                for hint in &diag.hints {
                    writeln!(w, "  hint: {hint}")?;
                }
            }
        }
        Ok(())
    }

    fn name(&self, id: ElementId) -> String {
        match self.graph.get(id) {
            Some(element) => format!("`{}`", element.name),
            None => format!("{id}"),
        }
    }
}
