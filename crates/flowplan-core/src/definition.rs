//! Logical pipeline definitions and their translation into an [`ElementGraph`].
//!
//! A definition is a flat list of named stages, each naming the stages it
//! reads from. Stages may be listed in any order.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::element::{
    Element, ElementKind, Group, Join, Joiner, Operation, OperationRole, OutputSelector,
};
use crate::fields::{DuplicateFields, Fields};
use crate::graph::{ElementGraph, ElementId};
use crate::tap::Tap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("malformed pipeline definition: {0}")]
    Malformed(String),
    #[error("pipeline `{0}` has no stages")]
    Empty(String),
    #[error("stage `{0}` is defined more than once")]
    DuplicateStage(String),
    #[error("stage `{stage}` reads from unknown stage `{input}`")]
    UnknownInput { stage: String, input: String },
    #[error("source `{0}` cannot read from other stages")]
    SourceWithInputs(String),
    #[error("stage `{0}` has no inputs")]
    MissingInputs(String),
    #[error("sink `{stage}` must have exactly one input, found {count}")]
    SinkArity { stage: String, count: usize },
    #[error("stage `{stage}` cannot use role `{role:?}`")]
    InvalidRole { stage: String, role: OperationRole },
    #[error("stage `{stage}`: {source}")]
    Fields {
        stage: String,
        source: DuplicateFields,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineDef {
    pub name: String,
    pub stages: Vec<StageDef>,
}

impl PipelineDef {
    pub fn from_json(text: &str) -> Result<Self, DefinitionError> {
        serde_json::from_str(text).map_err(|e| DefinitionError::Malformed(e.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StageDef {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(flatten)]
    pub kind: StageKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageKind {
    Source(TapDef),
    Sink(TapDef),
    Pipe,
    Each(OperationDef),
    Every(OperationDef),
    Merge,
    GroupBy { keys: Vec<String> },
    CoGroup(JoinDef),
    HashJoin(JoinDef),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TapDef {
    pub scheme: String,
    pub identifier: String,
    /// Absent means the tap does not declare its fields.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default = "symmetrical_by_default")]
    pub symmetrical: bool,
}

fn symmetrical_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationDef {
    pub operation: String,
    #[serde(default)]
    pub role: Option<OperationRole>,
    /// Absent selects every incoming field.
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
    #[serde(default)]
    pub declared: Vec<String>,
    #[serde(default)]
    pub output: OutputSelector,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinDef {
    pub keys: Vec<String>,
    #[serde(default)]
    pub joiner: Joiner,
    #[serde(default)]
    pub declared: Option<Vec<String>>,
}

impl ElementGraph {
    pub fn from_json(text: &str) -> Result<Self, DefinitionError> {
        Self::from_definition(&PipelineDef::from_json(text)?)
    }

    /// Build `head → sources`, `input → stage` and `sinks → tail` scopes.
    pub fn from_definition(def: &PipelineDef) -> Result<Self, DefinitionError> {
        if def.stages.is_empty() {
            return Err(DefinitionError::Empty(def.name.clone()));
        }

        let mut graph = ElementGraph::new(def.name.clone());
        let mut ids: IndexMap<&str, ElementId> = IndexMap::new();

        for stage in &def.stages {
            if ids.contains_key(stage.name.as_str()) {
                return Err(DefinitionError::DuplicateStage(stage.name.clone()));
            }
            check_arity(stage)?;
            let kind = element_kind(stage)?;
            let id = graph.add_element(Element::new(stage.name.clone(), kind));
            ids.insert(stage.name.as_str(), id);
        }

        for stage in &def.stages {
            let id = ids[stage.name.as_str()];
            match stage.kind {
                StageKind::Source(_) => {
                    graph.add_scope(ElementId::HEAD, id, 0);
                }
                StageKind::Sink(_) => {
                    graph.add_scope(id, ElementId::TAIL, 0);
                }
                _ => {}
            }
            for (ordinal, input) in stage.inputs.iter().enumerate() {
                let Some(&from) = ids.get(input.as_str()) else {
                    return Err(DefinitionError::UnknownInput {
                        stage: stage.name.clone(),
                        input: input.clone(),
                    });
                };
                graph.add_scope(from, id, ordinal as u32);
            }
        }

        Ok(graph)
    }
}

fn check_arity(stage: &StageDef) -> Result<(), DefinitionError> {
    let count = stage.inputs.len();
    match stage.kind {
        StageKind::Source(_) if count > 0 => {
            Err(DefinitionError::SourceWithInputs(stage.name.clone()))
        }
        StageKind::Source(_) => Ok(()),
        StageKind::Sink(_) if count != 1 => Err(DefinitionError::SinkArity {
            stage: stage.name.clone(),
            count,
        }),
        _ if count == 0 => Err(DefinitionError::MissingInputs(stage.name.clone())),
        _ => Ok(()),
    }
}

fn element_kind(stage: &StageDef) -> Result<ElementKind, DefinitionError> {
    let fields = |names: &[String]| {
        Fields::try_from_names(names.to_vec()).map_err(|source| DefinitionError::Fields {
            stage: stage.name.clone(),
            source,
        })
    };
    let optional = |names: &Option<Vec<String>>| match names {
        Some(names) => fields(names),
        None => Ok(Fields::Unknown),
    };

    let tap = |def: &TapDef| -> Result<Tap, DefinitionError> {
        Ok(Tap::new(def.scheme.clone(), def.identifier.clone(), optional(&def.fields)?)
            .with_symmetrical(def.symmetrical))
    };

    let operation = |def: &OperationDef, default: OperationRole, allowed: &[OperationRole]| {
        let role = def.role.unwrap_or(default);
        if !allowed.contains(&role) {
            return Err(DefinitionError::InvalidRole {
                stage: stage.name.clone(),
                role,
            });
        }
        let mut op = Operation::new(def.operation.clone(), role, fields(&def.declared)?)
            .with_output(def.output);
        if let Some(arguments) = &def.arguments {
            op = op.with_arguments(fields(arguments)?);
        }
        Ok(op)
    };

    let join = |def: &JoinDef| -> Result<Join, DefinitionError> {
        let mut join = Join::on(fields(&def.keys)?).with_joiner(def.joiner.clone());
        if let Some(declared) = &def.declared {
            join = join.with_declared(fields(declared)?);
        }
        Ok(join)
    };

    use OperationRole::*;
    Ok(match &stage.kind {
        StageKind::Source(def) => ElementKind::Source(tap(def)?),
        StageKind::Sink(def) => ElementKind::Sink(tap(def)?),
        StageKind::Pipe => ElementKind::Pipe,
        StageKind::Each(def) => {
            ElementKind::Each(operation(def, Function, &[Function, Filter, Assertion])?)
        }
        StageKind::Every(def) => {
            ElementKind::Every(operation(def, Aggregator, &[Aggregator, Buffer, Assertion])?)
        }
        StageKind::Merge => ElementKind::Merge,
        StageKind::GroupBy { keys } => ElementKind::Group(Group::group_by(fields(keys)?)),
        StageKind::CoGroup(def) => ElementKind::Group(Group::co_group(join(def)?)),
        StageKind::HashJoin(def) => ElementKind::HashJoin(join(def)?),
    })
}
