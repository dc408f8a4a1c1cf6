use std::path::PathBuf;

use flowplan_core::{ElementGraph, SchemeTapRules};
use flowplan_planner::rules;
use tracing::debug;

use super::loader::load_pipeline;
use super::report::fail;

pub struct CheckArgs {
    pub pipeline_path: Option<PathBuf>,
    pub pipeline_text: Option<String>,
    pub strict: bool,
}

pub fn run(args: CheckArgs) {
    let def = load_pipeline(args.pipeline_path.as_deref(), args.pipeline_text.as_deref())
        .unwrap_or_else(|e| fail(e));
    let graph = ElementGraph::from_definition(&def).unwrap_or_else(|e| fail(e));

    let diagnostics = rules::verify(&graph, &SchemeTapRules);
    debug!(elements = graph.element_count(), strict = args.strict, "checked");
    let valid = if args.strict {
        !diagnostics.has_errors() && !diagnostics.has_warnings()
    } else {
        !diagnostics.has_errors()
    };

    if !diagnostics.is_empty() {
        eprint!("{}", diagnostics.render(&graph));
    }
    if !valid {
        std::process::exit(1);
    }

    // Silent on success
}
