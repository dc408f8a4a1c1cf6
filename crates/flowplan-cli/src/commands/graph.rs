use std::path::PathBuf;

use flowplan_core::ElementGraph;
use flowplan_planner::Planner;

use super::loader::{load_config, load_pipeline};
use super::report::{fail, fail_plan, warnings};

pub struct GraphArgs {
    pub pipeline_path: Option<PathBuf>,
    pub pipeline_text: Option<String>,
    pub config: Option<PathBuf>,
    pub planned: bool,
    pub fields: bool,
}

pub fn run(args: GraphArgs) {
    let def = load_pipeline(args.pipeline_path.as_deref(), args.pipeline_text.as_deref())
        .unwrap_or_else(|e| fail(e));
    let config = load_config(args.config.as_deref()).unwrap_or_else(|e| fail(e));
    let mut graph = ElementGraph::from_definition(&def).unwrap_or_else(|e| fail(e));

    if args.planned {
        let (planned, diagnostics) = Planner::new(config)
            .rewrite(graph)
            .unwrap_or_else(|e| fail_plan(&e));
        warnings(&diagnostics, &planned);
        graph = planned;
    }

    print!(
        "{}",
        graph
            .printer()
            .show_header(true)
            .show_fields(args.fields)
            .dump()
    );
}
