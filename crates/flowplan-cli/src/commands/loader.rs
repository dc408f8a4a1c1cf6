use std::fs;
use std::io::{self, Read};
use std::path::Path;

use flowplan_core::{DefinitionError, PipelineDef};
use flowplan_planner::PlannerConfig;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("pipeline is required: use a positional argument or -p/--pipeline")]
    Missing,
    #[error("failed to read '{path}': {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to read stdin: {0}")]
    Stdin(io::Error),
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error("invalid planner config '{path}': {source}")]
    Config {
        path: String,
        source: serde_json::Error,
    },
}

pub fn load_pipeline(
    pipeline_path: Option<&Path>,
    pipeline_text: Option<&str>,
) -> Result<PipelineDef, LoadError> {
    if let Some(text) = pipeline_text {
        return Ok(PipelineDef::from_json(text)?);
    }

    let Some(path) = pipeline_path else {
        return Err(LoadError::Missing);
    };
    let text = if path.as_os_str() == "-" {
        load_stdin()?
    } else {
        load_file(path)?
    };
    Ok(PipelineDef::from_json(&text)?)
}

/// The planner config at `path`, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<PlannerConfig, LoadError> {
    let Some(path) = path else {
        return Ok(PlannerConfig::default());
    };
    let text = load_file(path)?;
    PlannerConfig::from_json(&text).map_err(|source| LoadError::Config {
        path: path.display().to_string(),
        source,
    })
}

fn load_stdin() -> Result<String, LoadError> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(LoadError::Stdin)?;
    Ok(buf)
}

fn load_file(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_text_wins() {
        let text = r#"{ "name": "p", "stages": [] }"#;
        let def = load_pipeline(Some(Path::new("ignored.json")), Some(text)).unwrap();
        assert_eq!(def.name, "p");
    }

    #[test]
    fn pipeline_is_required() {
        let err = load_pipeline(None, None).unwrap_err();
        assert!(matches!(err, LoadError::Missing));
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let err = load_pipeline(Some(Path::new("/nonexistent/pipeline.json")), None).unwrap_err();
        assert!(
            err.to_string()
                .starts_with("failed to read '/nonexistent/pipeline.json'"),
            "{err}"
        );
    }

    #[test]
    fn malformed_json_is_a_definition_error() {
        let err = load_pipeline(None, Some("{")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Definition(DefinitionError::Malformed(_))
        ));
    }

    #[test]
    fn missing_config_means_defaults() {
        assert_eq!(load_config(None).unwrap(), PlannerConfig::default());
    }
}
