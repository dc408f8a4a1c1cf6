//! Field resolution: the fields carried by every scope.
//!
//! Runs in topological order, so every input of an element is resolved
//! before the element itself. `Unknown` propagates: a check that needs both
//! sides known is skipped when either is not.

use flowplan_core::{
    DuplicateFields, ElementGraph, ElementKind, Fields, GroupKind, Join, Operation,
    OperationRole, OutputSelector, Topology,
};
use tracing::debug;

use crate::PlanErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("`{element}` selects {} missing from its input", list(.missing))]
    MissingArguments { element: String, missing: Vec<String> },

    #[error("`{element}` groups on {} missing from its input", list(.missing))]
    MissingKeys { element: String, missing: Vec<String> },

    #[error("`{element}` produces {source}")]
    DuplicateOutput {
        element: String,
        source: DuplicateFields,
    },

    #[error("`{element}` receives {found} on input {input}, expected {expected}")]
    InputMismatch {
        element: String,
        input: usize,
        expected: Fields,
        found: Fields,
    },

    #[error("`{element}` declares {declared} fields but its inputs carry {found}")]
    DeclaredWidth {
        element: String,
        declared: usize,
        found: usize,
    },

    #[error("sink `{element}` writes {} missing from its input", list(.missing))]
    SinkFields { element: String, missing: Vec<String> },
}

fn list(names: &[String]) -> String {
    format!("[{}]", names.join(", "))
}

/// Fill in the fields of every scope, and of every boundary tap.
pub fn resolve_fields(graph: &mut ElementGraph) -> Result<(), PlanErrorKind> {
    let order = graph.topological_order()?;
    graph.clear_fields();

    for id in order {
        let inputs: Vec<Fields> = graph
            .incoming(id)
            .into_iter()
            .map(|s| graph.scope(s).fields.clone().unwrap_or_default())
            .collect();
        let element = graph.element(id);
        let output = output_fields(&element.name, &element.kind, &inputs)?;

        if let ElementKind::Boundary(tap) = &mut graph.element_mut(id).kind {
            tap.fields = output.clone();
        }
        for scope in graph.outgoing(id).to_vec() {
            graph.scope_mut(scope).fields = Some(output.clone());
        }
    }

    debug!(pipeline = graph.name(), scopes = graph.scope_count(), "resolved fields");
    Ok(())
}

fn output_fields(name: &str, kind: &ElementKind, inputs: &[Fields]) -> Result<Fields, FieldError> {
    let first = inputs.first().cloned().unwrap_or_default();
    match kind {
        ElementKind::Extent(_) => Ok(Fields::Unknown),
        ElementKind::Source(tap) => Ok(tap.fields.clone()),
        ElementKind::Sink(tap) => {
            let missing = first.missing(&tap.fields);
            if !missing.is_empty() {
                return Err(FieldError::SinkFields {
                    element: name.to_string(),
                    missing,
                });
            }
            Ok(if tap.fields.is_known() {
                tap.fields.clone()
            } else {
                first
            })
        }
        ElementKind::Boundary(_) | ElementKind::Pipe => Ok(first),
        ElementKind::Each(op) | ElementKind::Every(op) => operation_output(name, op, &first),
        ElementKind::Merge => agreed(name, inputs),
        ElementKind::Group(group) => match group.kind {
            GroupKind::GroupBy => {
                check_keys(name, &group.join.keys, inputs)?;
                agreed(name, inputs)
            }
            GroupKind::CoGroup => join_output(name, &group.join, inputs),
        },
        ElementKind::HashJoin(join) => join_output(name, join, inputs),
    }
}

fn operation_output(name: &str, op: &Operation, input: &Fields) -> Result<Fields, FieldError> {
    if let Some(arguments) = &op.arguments {
        let missing = input.missing(arguments);
        if !missing.is_empty() {
            return Err(FieldError::MissingArguments {
                element: name.to_string(),
                missing,
            });
        }
    }

    if matches!(op.role, OperationRole::Filter | OperationRole::Assertion) {
        return Ok(input.clone());
    }

    let duplicate = |source| FieldError::DuplicateOutput {
        element: name.to_string(),
        source,
    };
    match op.output {
        OutputSelector::Results => Ok(op.declared.clone()),
        OutputSelector::All => input.append(&op.declared).map_err(duplicate),
        OutputSelector::Swap => {
            let rest = match &op.arguments {
                Some(arguments) => input.subtract(arguments),
                None => Fields::none(),
            };
            rest.append(&op.declared).map_err(duplicate)
        }
    }
}

/// Inputs that must share one layout. The first known layout wins.
fn agreed(name: &str, inputs: &[Fields]) -> Result<Fields, FieldError> {
    let mut expected: Option<&Fields> = None;
    for (input, fields) in inputs.iter().enumerate() {
        if !fields.is_known() {
            continue;
        }
        match expected {
            None => expected = Some(fields),
            Some(layout) if layout.same_layout(fields) => {}
            Some(layout) => {
                return Err(FieldError::InputMismatch {
                    element: name.to_string(),
                    input,
                    expected: layout.clone(),
                    found: fields.clone(),
                });
            }
        }
    }
    Ok(expected.cloned().unwrap_or_default())
}

fn check_keys(name: &str, keys: &Fields, inputs: &[Fields]) -> Result<(), FieldError> {
    for input in inputs {
        let missing = input.missing(keys);
        if !missing.is_empty() {
            return Err(FieldError::MissingKeys {
                element: name.to_string(),
                missing,
            });
        }
    }
    Ok(())
}

/// Joins concatenate their inputs in input order, unless they declare the
/// result or leave it to a custom joiner.
fn join_output(name: &str, join: &Join, inputs: &[Fields]) -> Result<Fields, FieldError> {
    check_keys(name, &join.keys, inputs)?;

    if join.defers_to_joiner() {
        return Ok(Fields::Unknown);
    }

    match &join.declared {
        Some(declared) => {
            let found: Option<usize> = inputs.iter().map(Fields::len).sum();
            if let (Some(found), Some(width)) = (found, declared.len())
                && found != width
            {
                return Err(FieldError::DeclaredWidth {
                    element: name.to_string(),
                    declared: width,
                    found,
                });
            }
            Ok(declared.clone())
        }
        None => inputs
            .iter()
            .try_fold(Fields::none(), |joined, fields| joined.append(fields))
            .map_err(|source| FieldError::DuplicateOutput {
                element: name.to_string(),
                source,
            }),
    }
}
