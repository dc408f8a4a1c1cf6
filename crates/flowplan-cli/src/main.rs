mod cli;
mod commands;
mod logging;

use cli::{CheckParams, GraphParams, PlanParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            logging::init(params.verbose);
            commands::check::run(params.into());
        }
        Some(("graph", m)) => {
            let params = GraphParams::from_matches(m);
            logging::init(params.verbose);
            commands::graph::run(params.into());
        }
        Some(("plan", m)) => {
            let params = PlanParams::from_matches(m);
            logging::init(params.verbose);
            commands::plan::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
