//! Stderr reporting shared by the commands.

use std::fmt::Display;

use flowplan_core::ElementGraph;
use flowplan_planner::{Diagnostics, Error};

/// Print `msg` as an error and exit with status 1.
pub fn fail(msg: impl Display) -> ! {
    eprintln!("error: {}", msg);
    std::process::exit(1)
}

/// Print a planner error with whatever it carries and exit with status 1.
pub fn fail_plan(err: &Error) -> ! {
    eprint!("{}", render_error(err));
    std::process::exit(1)
}

/// Print non-fatal diagnostics, if any.
pub fn warnings(diagnostics: &Diagnostics, graph: &ElementGraph) {
    if !diagnostics.is_empty() {
        eprint!("{}", diagnostics.render(graph));
    }
}

/// The error line, then verification diagnostics or the graph as it stood
/// when the phase failed.
pub fn render_error(err: &Error) -> String {
    let mut out = format!("error: {err}\n");
    let (Some(phase), Some(graph)) = (err.phase(), err.graph()) else {
        return out;
    };
    match err.diagnostics() {
        Some(diagnostics) => out.push_str(&diagnostics.render(graph)),
        None => {
            out.push_str(&format!("\ngraph when {phase} failed:\n"));
            out.push_str(&graph.printer().show_fields(true).dump());
        }
    }
    out
}
