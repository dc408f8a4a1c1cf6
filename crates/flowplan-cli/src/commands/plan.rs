use std::path::PathBuf;

use flowplan_planner::Planner;
use tracing::debug;

use super::loader::{load_config, load_pipeline};
use super::report::{fail, fail_plan, warnings};

pub struct PlanArgs {
    pub pipeline_path: Option<PathBuf>,
    pub pipeline_text: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

pub fn run(args: PlanArgs) {
    let def = load_pipeline(args.pipeline_path.as_deref(), args.pipeline_text.as_deref())
        .unwrap_or_else(|e| fail(e));
    let config = load_config(args.config.as_deref()).unwrap_or_else(|e| fail(e));

    let plan = Planner::new(config)
        .compile(&def)
        .unwrap_or_else(|e| fail_plan(&e));
    warnings(&plan.warnings, &plan.graph);
    debug!(
        pipeline = plan.graph.name(),
        steps = plan.steps.len(),
        edges = plan.steps.edges.len(),
        "planned"
    );

    if args.json {
        let json = plan.steps.to_json().unwrap_or_else(|e| fail(e));
        println!("{}", json);
    } else {
        print!("{}", plan.steps.dump());
    }
}
