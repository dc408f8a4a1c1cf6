#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Logical dataflow graphs for the flowplan planner.
//!
//! - [`graph`]: the element arena, with stable ids and in-place rewiring
//! - [`element`]: the closed set of element kinds
//! - [`tap`]: sources, sinks, boundaries and the [`TapRules`] questions
//! - [`fields`]: field sets flowing along scopes
//! - [`topology`]: traversals shared by every graph-like view
//! - [`subgraph`]: element/scope masks and views over them
//! - [`definition`]: JSON pipeline definitions

pub mod definition;
pub mod dump;
pub mod element;
pub mod fields;
pub mod graph;
pub mod subgraph;
pub mod tap;
pub mod topology;


pub use definition::{DefinitionError, PipelineDef, StageDef, StageKind};
pub use dump::GraphPrinter;
pub use element::{
    Element, ElementKind, Extent, Group, GroupKind, Join, Joiner, Operation, OperationRole,
    OutputSelector,
};
pub use fields::{DuplicateFields, Fields};
pub use graph::{ElementGraph, ElementId, ElementSet, Scope, ScopeId, ScopeSet};
pub use subgraph::{SubGraph, SubGraphView};
pub use tap::{SchemeTapRules, Tap, TapRules};
pub use topology::{CycleError, Topology};
