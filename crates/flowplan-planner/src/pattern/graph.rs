//! Motifs: small graphs of predicates with capture labels.

use std::collections::VecDeque;

use super::expression::{ElementExpression, ScopeExpression};

/// Labels naming which matched elements a caller cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capture {
    /// The anchor. Exactly one vertex per motif carries it.
    Primary,
    Secondary,
    /// Context that belongs to the result without being claimed by it.
    Include,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern has no vertices")]
    Empty,
    #[error("pattern has no primary capture")]
    NoPrimary,
    #[error("pattern has {0} primary captures, expected one")]
    MultiplePrimary(usize),
    #[error("pattern vertex {0} is not connected to the primary")]
    Disconnected(usize),
    #[error("pattern edge refers to missing vertex {0}")]
    DanglingEdge(usize),
}

/// Index of a predicate vertex in its [`ExpressionGraph`].
pub type PatternVertex = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternNode {
    pub expression: ElementExpression,
    pub capture: Option<Capture>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEdge {
    pub from: PatternVertex,
    pub to: PatternVertex,
    pub expression: ScopeExpression,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionGraph {
    nodes: Vec<PatternNode>,
    edges: Vec<PatternEdge>,
}

impl ExpressionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, expression: ElementExpression) -> PatternVertex {
        self.nodes.push(PatternNode {
            expression,
            capture: None,
        });
        self.nodes.len() - 1
    }

    pub fn capture(&mut self, expression: ElementExpression, capture: Capture) -> PatternVertex {
        self.nodes.push(PatternNode {
            expression,
            capture: Some(capture),
        });
        self.nodes.len() - 1
    }

    pub fn arc(&mut self, from: PatternVertex, to: PatternVertex) -> &mut Self {
        self.arc_with(from, to, ScopeExpression::Any)
    }

    pub fn arc_with(
        &mut self,
        from: PatternVertex,
        to: PatternVertex,
        expression: ScopeExpression,
    ) -> &mut Self {
        self.edges.push(PatternEdge {
            from,
            to,
            expression,
        });
        self
    }

    pub fn nodes(&self) -> &[PatternNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[PatternEdge] {
        &self.edges
    }

    pub fn node(&self, vertex: PatternVertex) -> &PatternNode {
        &self.nodes[vertex]
    }

    /// Edges touching `vertex`, in either direction.
    pub fn incident(&self, vertex: PatternVertex) -> impl Iterator<Item = &PatternEdge> {
        self.edges
            .iter()
            .filter(move |e| e.from == vertex || e.to == vertex)
    }

    /// Check the motif is usable and return its primary vertex.
    pub fn validate(&self) -> Result<PatternVertex, PatternError> {
        if self.nodes.is_empty() {
            return Err(PatternError::Empty);
        }
        if let Some(edge) = self
            .edges
            .iter()
            .find(|e| e.from >= self.nodes.len() || e.to >= self.nodes.len())
        {
            return Err(PatternError::DanglingEdge(edge.from.max(edge.to)));
        }

        let primaries: Vec<_> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.capture == Some(Capture::Primary))
            .map(|(i, _)| i)
            .collect();
        let primary = match primaries.as_slice() {
            [] => return Err(PatternError::NoPrimary),
            [p] => *p,
            _ => return Err(PatternError::MultiplePrimary(primaries.len())),
        };

        let order = self.search_order(primary);
        if order.len() < self.nodes.len() {
            let missing = (0..self.nodes.len())
                .find(|v| !order.contains(v))
                .unwrap_or_default();
            return Err(PatternError::Disconnected(missing));
        }
        Ok(primary)
    }

    /// Breadth-first order over the undirected motif, starting at `primary`.
    pub(crate) fn search_order(&self, primary: PatternVertex) -> Vec<PatternVertex> {
        let mut order = vec![primary];
        let mut queue = VecDeque::from([primary]);
        while let Some(v) = queue.pop_front() {
            for edge in self.incident(v) {
                let other = if edge.from == v { edge.to } else { edge.from };
                if !order.contains(&other) {
                    order.push(other);
                    queue.push_back(other);
                }
            }
        }
        order
    }
}
