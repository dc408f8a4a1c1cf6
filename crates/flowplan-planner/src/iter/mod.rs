//! Stateful cursors that carve an element graph into subgraphs.
//!
//! - [`MotifIterator`]: one partition per motif match, claiming the primary capture
//! - [`PathIterator`]: splits each wrapped subgraph into its source-to-sink paths
//! - [`RemainderIterator`]: passes partitions through, then yields what is left
//! - [`OnceIterator`]: yields a single given subgraph
//!
//! The cursors never mutate the graph; rules rebuild them after every change.

mod motif;
mod once;
mod paths;
mod remainder;

#[cfg(test)]
mod tests;

use flowplan_core::{ElementGraph, ElementId, ElementSet, SubGraph};

use crate::pattern::Capture;

pub use motif::MotifIterator;
pub use once::OnceIterator;
pub use paths::PathIterator;
pub use remainder::RemainderIterator;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IteratorError {
    #[error("no more subgraphs")]
    Exhausted,
    #[error(
        "path decomposition only supports single source and single sink graphs, found {sources} sources and {sinks} sinks"
    )]
    NotSingleSourceSink { sources: usize, sinks: usize },
}

pub trait SubGraphIterator<'g> {
    fn graph(&self) -> &'g ElementGraph;

    /// The part of the graph being partitioned.
    fn domain(&self) -> &SubGraph;

    fn has_next(&mut self) -> bool;

    /// Fails with [`IteratorError::Exhausted`] once `has_next` is false.
    fn next(&mut self) -> Result<SubGraph, IteratorError>;

    /// Elements captured under `capture` by the most recent partition.
    fn annotations_for(&self, _capture: Capture) -> ElementSet {
        ElementSet::new()
    }

    /// Source/sink pairs already split into paths, in decomposition order.
    fn decomposed_pairs(&self) -> &[(ElementId, ElementId)] {
        &[]
    }

    /// Every remaining subgraph, in order.
    fn drain(&mut self) -> Result<Vec<SubGraph>, IteratorError> {
        let mut out = Vec::new();
        while self.has_next() {
            out.push(self.next()?);
        }
        Ok(out)
    }
}

impl<'g, I: SubGraphIterator<'g> + ?Sized> SubGraphIterator<'g> for Box<I> {
    fn graph(&self) -> &'g ElementGraph {
        (**self).graph()
    }

    fn domain(&self) -> &SubGraph {
        (**self).domain()
    }

    fn has_next(&mut self) -> bool {
        (**self).has_next()
    }

    fn next(&mut self) -> Result<SubGraph, IteratorError> {
        (**self).next()
    }

    fn annotations_for(&self, capture: Capture) -> ElementSet {
        (**self).annotations_for(capture)
    }

    fn decomposed_pairs(&self) -> &[(ElementId, ElementId)] {
        (**self).decomposed_pairs()
    }
}
