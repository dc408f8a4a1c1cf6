use flowplan_core::{
    ElementGraph, ElementId, ElementKind, ElementSet, ScopeSet, SubGraph, Tap, TapRules,
    Topology,
};
use tracing::trace;

use super::{RewriteRule, boundary};
use crate::PlanErrorKind;
use crate::iter::{OnceIterator, PathIterator, SubGraphIterator};

/// Normalizes the taps feeding one grouping to a single compatible kind.
///
/// For a grouping reached along more than one path from `head`, the nearest
/// tap on each path must be compatible with every other one. If not, every
/// one of those taps that is incompatible with the intermediate scheme gets a
/// boundary on the path's scope leaving it. When all of them are compatible
/// with the intermediate scheme but not with each other, every one that is not
/// already a boundary gets one. Feeds left incompatible after that are an
/// error.
#[derive(Debug, Clone)]
pub struct HeterogeneousSourceRule<R> {
    temp_scheme: String,
    rules: R,
}

/// The nearest tap on one path into a grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Feed {
    tap: ElementId,
    leaving: ElementId,
}

impl<R: TapRules> HeterogeneousSourceRule<R> {
    pub fn new(temp_scheme: impl Into<String>, rules: R) -> Self {
        Self {
            temp_scheme: temp_scheme.into(),
            rules,
        }
    }

    fn tap<'g>(graph: &'g ElementGraph, id: ElementId) -> Option<&'g Tap> {
        graph.kind(id).tap()
    }

    /// Scopes to cut for the first grouping with incompatible feeds.
    fn find_cut(&self, graph: &ElementGraph) -> Result<Option<ScopeSet>, PlanErrorKind> {
        let groupings: Vec<ElementId> = graph
            .element_ids()
            .filter(|id| graph.kind(*id).is_grouping())
            .collect();

        for grouping in groupings {
            let feeds = feeds_of(graph, grouping)?;
            if feeds.len() < 2 || self.compatible(graph, &feeds) {
                continue;
            }

            let temporary = Tap::temporary(self.temp_scheme.as_str(), "");
            let mut cut = self.cut_where(graph, &feeds, |tap| {
                !self.rules.are_compatible(tap, &temporary)
            });
            if cut.is_empty() {
                cut = self.cut_where(graph, &feeds, |_| true);
            }
            if cut.is_empty() {
                return Err(PlanErrorKind::IncompatibleFeeds {
                    grouping: graph.element(grouping).name.clone(),
                });
            }
            return Ok(Some(cut));
        }
        Ok(None)
    }

    /// Scopes leaving each feed tap selected by `select`. Boundaries are never
    /// cut again.
    fn cut_where(
        &self,
        graph: &ElementGraph,
        feeds: &[Feed],
        select: impl Fn(&Tap) -> bool,
    ) -> ScopeSet {
        let mut cut = ScopeSet::new();
        for feed in feeds {
            if matches!(graph.kind(feed.tap), ElementKind::Boundary(_)) {
                continue;
            }
            let Some(tap) = Self::tap(graph, feed.tap) else {
                continue;
            };
            if select(tap) {
                cut.extend(graph.scopes_between(feed.tap, feed.leaving));
            }
        }
        cut
    }

    fn compatible(&self, graph: &ElementGraph, feeds: &[Feed]) -> bool {
        let taps: ElementSet = feeds.iter().map(|f| f.tap).collect();
        let taps: Vec<&Tap> = taps.iter().filter_map(|t| Self::tap(graph, *t)).collect();
        taps.iter().enumerate().all(|(i, a)| {
            taps[i + 1..]
                .iter()
                .all(|b| self.rules.are_compatible(a, b))
        })
    }
}

impl<R: TapRules> RewriteRule for HeterogeneousSourceRule<R> {
    fn name(&self) -> &'static str {
        "heterogeneous-sources"
    }

    fn apply(&self, graph: &mut ElementGraph) -> Result<bool, PlanErrorKind> {
        let Some(cut) = self.find_cut(graph)? else {
            return Ok(false);
        };
        for scope in cut {
            let from = graph.scope(scope).from;
            let element = boundary(graph, &self.temp_scheme);
            let inserted = graph.insert_on_scope(scope, element);
            trace!(
                tap = %graph.element(from).name,
                boundary = %graph.element(inserted).name,
                "normalized heterogeneous source"
            );
        }
        Ok(true)
    }
}

/// The nearest tap on every `head → grouping` path, one entry per path.
///
/// Empty when the grouping is reached along a single path.
fn feeds_of(graph: &ElementGraph, grouping: ElementId) -> Result<Vec<Feed>, PlanErrorKind> {
    let mut reach = graph.ancestors(grouping);
    reach.insert(grouping);
    let domain = SubGraph::induced(graph, reach);

    let mut paths = PathIterator::new(OnceIterator::new(graph, domain), false);
    let paths = paths.drain()?;
    if paths.len() < 2 {
        return Ok(Vec::new());
    }

    let mut feeds = Vec::new();
    for path in paths {
        let view = path.view(graph);
        let mut current = grouping;
        while let Some(&previous) = view.predecessors(current).first() {
            if graph.kind(previous).is_tap() {
                feeds.push(Feed {
                    tap: previous,
                    leaving: current,
                });
                break;
            }
            current = previous;
        }
    }
    Ok(feeds)
}
