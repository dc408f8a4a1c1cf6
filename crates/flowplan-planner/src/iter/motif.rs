use flowplan_core::{ElementGraph, ElementSet, SubGraph, SubGraphView};

use super::{IteratorError, SubGraphIterator};
use crate::pattern::{
    Capture, ContractedGraph, ElementExpression, ExpressionGraph, Match, Matcher, PatternError,
};

/// One partition per motif match.
///
/// Each partition is the subgraph induced by the members of the matched
/// vertices. The members of the primary capture are then excluded, so no later
/// match anchors on them; other captures may be shared between partitions.
#[derive(Debug)]
pub struct MotifIterator<'g> {
    contracted: ContractedGraph<'g>,
    matcher: Matcher,
    first_only: bool,
    domain: SubGraph,
    exclusions: ElementSet,
    pending: Option<Match>,
    last: Option<Match>,
}

impl<'g> MotifIterator<'g> {
    pub fn new(
        view: SubGraphView<'g>,
        contraction: Option<&ElementExpression>,
        pattern: ExpressionGraph,
        first_only: bool,
    ) -> Result<Self, PatternError> {
        let matcher = Matcher::new(pattern)?;
        let domain = view.sub_graph().clone();
        let contracted = match contraction {
            Some(expression) => ContractedGraph::new(view, expression),
            None => ContractedGraph::identity(view),
        };
        Ok(Self {
            contracted,
            matcher,
            first_only,
            domain,
            exclusions: ElementSet::new(),
            pending: None,
            last: None,
        })
    }

    pub fn contracted(&self) -> &ContractedGraph<'g> {
        &self.contracted
    }

    /// Elements no later match may anchor on.
    pub fn exclusions(&self) -> &ElementSet {
        &self.exclusions
    }

    /// The most recent match, in contracted space.
    pub fn last_match(&self) -> Option<&Match> {
        self.last.as_ref()
    }

    fn advance(&mut self) -> Option<&Match> {
        if self.pending.is_none() {
            let found =
                self.matcher
                    .find_first_match(&self.contracted, &self.exclusions, self.first_only);
            self.pending = found.found_match().then_some(found);
        }
        self.pending.as_ref()
    }
}

impl<'g> SubGraphIterator<'g> for MotifIterator<'g> {
    fn graph(&self) -> &'g ElementGraph {
        self.contracted.view().graph()
    }

    fn domain(&self) -> &SubGraph {
        &self.domain
    }

    fn has_next(&mut self) -> bool {
        self.advance().is_some()
    }

    fn next(&mut self) -> Result<SubGraph, IteratorError> {
        self.advance();
        let found = self.pending.take().ok_or(IteratorError::Exhausted)?;
        let partition = self.contracted.as_sub_graph(found.vertices());
        let claimed = self.contracted.expand(&found.captured(Capture::Primary));
        self.exclusions.extend(claimed);
        self.last = Some(found);
        Ok(partition)
    }

    fn annotations_for(&self, capture: Capture) -> ElementSet {
        self.last
            .as_ref()
            .map(|m| self.contracted.expand(&m.captured(capture)))
            .unwrap_or_default()
    }
}
