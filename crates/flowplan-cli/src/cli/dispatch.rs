//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use crate::commands::check::CheckArgs;
use crate::commands::graph::GraphArgs;
use crate::commands::plan::PlanArgs;

pub struct CheckParams {
    pub pipeline_path: Option<PathBuf>,
    pub pipeline_text: Option<String>,
    pub strict: bool,
    pub verbose: u8,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            pipeline_path: m.get_one::<PathBuf>("pipeline_path").cloned(),
            pipeline_text: m.get_one::<String>("pipeline_text").cloned(),
            strict: m.get_flag("strict"),
            verbose: m.get_count("verbose"),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            pipeline_path: p.pipeline_path,
            pipeline_text: p.pipeline_text,
            strict: p.strict,
        }
    }
}

pub struct GraphParams {
    pub pipeline_path: Option<PathBuf>,
    pub pipeline_text: Option<String>,
    pub config: Option<PathBuf>,
    pub planned: bool,
    pub fields: bool,
    pub verbose: u8,
}

impl GraphParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            pipeline_path: m.get_one::<PathBuf>("pipeline_path").cloned(),
            pipeline_text: m.get_one::<String>("pipeline_text").cloned(),
            config: m.get_one::<PathBuf>("config").cloned(),
            planned: m.get_flag("planned"),
            fields: m.get_flag("fields"),
            verbose: m.get_count("verbose"),
        }
    }
}

impl From<GraphParams> for GraphArgs {
    fn from(p: GraphParams) -> Self {
        Self {
            pipeline_path: p.pipeline_path,
            pipeline_text: p.pipeline_text,
            config: p.config,
            planned: p.planned,
            fields: p.fields,
        }
    }
}

pub struct PlanParams {
    pub pipeline_path: Option<PathBuf>,
    pub pipeline_text: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub verbose: u8,
}

impl PlanParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            pipeline_path: m.get_one::<PathBuf>("pipeline_path").cloned(),
            pipeline_text: m.get_one::<String>("pipeline_text").cloned(),
            config: m.get_one::<PathBuf>("config").cloned(),
            json: m.get_flag("json"),
            verbose: m.get_count("verbose"),
        }
    }
}

impl From<PlanParams> for PlanArgs {
    fn from(p: PlanParams) -> Self {
        Self {
            pipeline_path: p.pipeline_path,
            pipeline_text: p.pipeline_text,
            config: p.config,
            json: p.json,
        }
    }
}
