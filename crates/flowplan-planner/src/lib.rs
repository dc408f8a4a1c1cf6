#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Physical planning for flowplan pipelines.
//!
//! The [`Planner`] takes a logical [`ElementGraph`] through a fixed sequence
//! of phases:
//!
//! 1. verification ([`rules::verify`]), failing fast with [`Diagnostics`]
//! 2. rewrite rules applied to a fixed point ([`rules`])
//! 3. field resolution along every scope
//! 4. partitioning into a [`StepGraph`]
//!
//! Rules locate the shapes they act on with motifs ([`pattern`]) driven by
//! subgraph cursors ([`iter`]).

pub mod config;
pub mod diagnostics;
pub mod iter;
pub mod pattern;
pub mod planner;
pub mod rules;
pub mod step;

#[cfg(test)]
mod step_tests;
#[cfg(test)]
pub(crate) mod test_utils;

use std::fmt;

use flowplan_core::{CycleError, DefinitionError, ElementGraph};

pub use config::PlannerConfig;
pub use diagnostics::{DiagnosticKind, Diagnostics, Severity};
pub use iter::IteratorError;
pub use pattern::PatternError;
pub use planner::{Plan, Planner};
pub use rules::{FieldError, RewriteRule};
pub use step::{GroupingInfo, NodeKind, Step, StepEdge, StepGraph, StepNode, TapRef};

/// Planning phases, in the order the planner runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Verify,
    SplitInsertion,
    JobPartitioning,
    JoinCompatibility,
    HeterogeneousSources,
    PassThrough,
    FieldResolution,
    BoundaryCollapse,
    EveryChains,
    StepPartitioning,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Verify => "verify",
            Self::SplitInsertion => "split-insertion",
            Self::JobPartitioning => "job-partitioning",
            Self::JoinCompatibility => "join-compatibility",
            Self::HeterogeneousSources => "heterogeneous-sources",
            Self::PassThrough => "pass-through",
            Self::FieldResolution => "field-resolution",
            Self::BoundaryCollapse => "boundary-collapse",
            Self::EveryChains => "every-chains",
            Self::StepPartitioning => "step-partitioning",
        };
        f.write_str(name)
    }
}

/// What went wrong inside a phase.
#[derive(Debug, thiserror::Error)]
pub enum PlanErrorKind {
    #[error("pipeline failed verification with {} error(s)", .0.error_count())]
    Verification(Diagnostics),

    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error("rule `{rule}` did not reach a fixed point within {limit} iterations")]
    NonTermination { rule: &'static str, limit: usize },

    #[error(transparent)]
    Fields(#[from] FieldError),

    #[error("invalid motif: {0}")]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Iterator(#[from] IteratorError),

    #[error("`{every}` is fed by `{fed_by}` instead of a grouping")]
    DetachedEvery { every: String, fed_by: String },

    #[error("taps feeding `{grouping}` stay incompatible after normalization")]
    IncompatibleFeeds { grouping: String },

    #[error("`{element}` is not part of any step")]
    Unplaced { element: String },

    #[error("step `{step}` holds {groupings} groupings, at most one can run per step")]
    Unschedulable { step: String, groupings: usize },
}

/// Errors returned by the planner.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// A phase failed. `graph` is the element graph as it stood at that point.
    #[error("{phase} failed: {kind}")]
    Plan {
        phase: Phase,
        kind: PlanErrorKind,
        graph: Box<ElementGraph>,
    },
}

impl Error {
    pub(crate) fn plan(phase: Phase, kind: PlanErrorKind, graph: &ElementGraph) -> Self {
        Self::Plan {
            phase,
            kind,
            graph: Box::new(graph.clone()),
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Definition(_) => None,
            Self::Plan { phase, .. } => Some(*phase),
        }
    }

    /// The graph snapshot taken when a phase failed.
    pub fn graph(&self) -> Option<&ElementGraph> {
        match self {
            Self::Definition(_) => None,
            Self::Plan { graph, .. } => Some(graph),
        }
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::Plan {
                kind: PlanErrorKind::Verification(diagnostics),
                ..
            } => Some(diagnostics),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
