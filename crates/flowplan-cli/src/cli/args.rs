//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Pipeline definition file (positional). `-` reads stdin.
pub fn pipeline_path_arg() -> Arg {
    Arg::new("pipeline_path")
        .value_name("PIPELINE")
        .value_parser(value_parser!(PathBuf))
        .help("Pipeline definition (JSON), or - for stdin")
}

/// Inline pipeline JSON (-p/--pipeline).
pub fn pipeline_text_arg() -> Arg {
    Arg::new("pipeline_text")
        .short('p')
        .long("pipeline")
        .value_name("JSON")
        .conflicts_with("pipeline_path")
        .help("Inline pipeline definition")
}

/// Planner configuration file (-c/--config).
pub fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Planner configuration (JSON)")
}

/// Emit JSON instead of text (--json).
pub fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print the step graph as JSON")
}

/// Show the rewritten graph (--planned).
pub fn planned_arg() -> Arg {
    Arg::new("planned")
        .long("planned")
        .action(ArgAction::SetTrue)
        .help("Show the graph after every rewrite")
}

/// Show resolved scope fields (--fields).
pub fn fields_arg() -> Arg {
    Arg::new("fields")
        .long("fields")
        .action(ArgAction::SetTrue)
        .help("Show the fields carried by each scope")
}

/// Treat warnings as errors (--strict).
pub fn strict_arg() -> Arg {
    Arg::new("strict")
        .long("strict")
        .action(ArgAction::SetTrue)
        .help("Treat warnings as errors")
}

/// Verbosity level (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("Log planner phases to stderr (-v for debug, -vv for trace)")
}
