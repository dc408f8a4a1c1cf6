//! Command builders for the CLI.
//!
//! Each command is built using the shared arg builders from `args.rs`.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("flowplan")
        .about("Physical planner for dataflow pipelines")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(check_command())
        .subcommand(graph_command())
        .subcommand(plan_command())
}

/// Build and verify a pipeline without planning it.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Verify a pipeline definition")
        .override_usage(
            "\
  flowplan check <PIPELINE>
  flowplan check -p <JSON>",
        )
        .after_help(
            r#"EXAMPLES:
  flowplan check wordcount.json           # report errors and warnings
  flowplan check wordcount.json --strict  # fail on warnings too
  cat wordcount.json | flowplan check -   # read stdin"#,
        )
        .arg(pipeline_path_arg())
        .arg(pipeline_text_arg())
        .arg(strict_arg())
        .arg(verbose_arg())
}

/// Print the element graph.
pub fn graph_command() -> Command {
    Command::new("graph")
        .about("Show the element graph of a pipeline")
        .override_usage(
            "\
  flowplan graph <PIPELINE> [--planned] [--fields]
  flowplan graph -p <JSON> [--planned] [--fields]",
        )
        .after_help(
            r#"EXAMPLES:
  flowplan graph wordcount.json                     # as defined
  flowplan graph wordcount.json --planned           # after rewriting
  flowplan graph wordcount.json --planned --fields  # with resolved fields
  flowplan graph wordcount.json --planned -c planner.json"#,
        )
        .arg(pipeline_path_arg())
        .arg(pipeline_text_arg())
        .arg(config_arg())
        .arg(planned_arg())
        .arg(fields_arg())
        .arg(verbose_arg())
}

/// Plan a pipeline into steps.
pub fn plan_command() -> Command {
    Command::new("plan")
        .about("Partition a pipeline into steps")
        .override_usage(
            "\
  flowplan plan <PIPELINE> [-c <FILE>] [--json]
  flowplan plan -p <JSON> [-c <FILE>] [--json]",
        )
        .after_help(
            r#"EXAMPLES:
  flowplan plan wordcount.json                 # step graph as text
  flowplan plan wordcount.json --json          # step graph as JSON
  flowplan plan wordcount.json -c planner.json # custom planner config
  flowplan plan wordcount.json -vv             # trace every rewrite"#,
        )
        .arg(pipeline_path_arg())
        .arg(pipeline_text_arg())
        .arg(config_arg())
        .arg(json_arg())
        .arg(verbose_arg())
}
