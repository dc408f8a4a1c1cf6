use flowplan_core::{ElementGraph, SubGraph};

use super::{IteratorError, SubGraphIterator};

/// Yields one given subgraph, typically to seed a [`super::PathIterator`].
#[derive(Debug, Clone)]
pub struct OnceIterator<'g> {
    graph: &'g ElementGraph,
    domain: SubGraph,
    yielded: bool,
}

impl<'g> OnceIterator<'g> {
    pub fn new(graph: &'g ElementGraph, sub_graph: SubGraph) -> Self {
        Self {
            graph,
            domain: sub_graph,
            yielded: false,
        }
    }
}

impl<'g> SubGraphIterator<'g> for OnceIterator<'g> {
    fn graph(&self) -> &'g ElementGraph {
        self.graph
    }

    fn domain(&self) -> &SubGraph {
        &self.domain
    }

    fn has_next(&mut self) -> bool {
        !self.yielded
    }

    fn next(&mut self) -> Result<SubGraph, IteratorError> {
        if self.yielded {
            return Err(IteratorError::Exhausted);
        }
        self.yielded = true;
        Ok(self.domain.clone())
    }
}
