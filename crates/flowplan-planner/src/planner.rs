//! The planning pipeline: verify, rewrite to fixed points, resolve, partition.

use flowplan_core::{ElementGraph, PipelineDef, SchemeTapRules, TapRules};
use tracing::{debug, info_span};

use crate::rules::{
    self, BoundaryCollapseRule, HeterogeneousSourceRule, JobPartitionRule, JoinCompatibilityRule,
    PassThroughRule, RewriteRule, SplitInsertionRule,
};
use crate::{Diagnostics, Error, Phase, PlanErrorKind, PlannerConfig, Result, StepGraph};

/// A compiled pipeline.
#[derive(Debug, Clone)]
pub struct Plan {
    /// The element graph after every rewrite, fields resolved.
    pub graph: ElementGraph,
    pub steps: StepGraph,
    /// Verification warnings. Planning went ahead regardless.
    pub warnings: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct Planner<R = SchemeTapRules> {
    config: PlannerConfig,
    tap_rules: R,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            tap_rules: SchemeTapRules,
        }
    }
}

impl<R: TapRules> Planner<R> {
    /// Answer the tap questions with `tap_rules` instead.
    pub fn with_tap_rules<T: TapRules>(self, tap_rules: T) -> Planner<T> {
        Planner {
            config: self.config,
            tap_rules,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Build the element graph for `def` and plan it.
    pub fn compile(&self, def: &PipelineDef) -> Result<Plan> {
        let graph = ElementGraph::from_definition(def)?;
        self.plan(graph)
    }

    pub fn plan(&self, graph: ElementGraph) -> Result<Plan> {
        let (graph, warnings) = self.rewrite(graph)?;
        let _span = info_span!("partition", pipeline = graph.name()).entered();
        let steps = StepGraph::build(&graph, self.config.multi_edge_remainder)
            .map_err(|kind| Error::plan(Phase::StepPartitioning, kind, &graph))?;
        Ok(Plan {
            graph,
            steps,
            warnings,
        })
    }

    /// Verify `graph`, then run every rewrite phase. Returns the rewritten
    /// graph with its fields resolved, and the verification warnings.
    pub fn rewrite(&self, mut graph: ElementGraph) -> Result<(ElementGraph, Diagnostics)> {
        let _span = info_span!("rewrite", pipeline = graph.name()).entered();

        let diagnostics = rules::verify(&graph, &self.tap_rules);
        if diagnostics.has_errors() {
            debug!(errors = diagnostics.error_count(), "verification failed");
            return Err(Error::plan(
                Phase::Verify,
                PlanErrorKind::Verification(diagnostics),
                &graph,
            ));
        }

        let scheme = self.config.temp_scheme.as_str();
        self.fixpoint(&mut graph, Phase::SplitInsertion, &SplitInsertionRule::new(scheme))?;
        self.fixpoint(&mut graph, Phase::JobPartitioning, &JobPartitionRule::new(scheme))?;
        self.fixpoint(
            &mut graph,
            Phase::JoinCompatibility,
            &JoinCompatibilityRule::new(scheme),
        )?;
        if self.config.normalize_heterogeneous_sources {
            let rule = HeterogeneousSourceRule::new(scheme, &self.tap_rules);
            self.fixpoint(&mut graph, Phase::HeterogeneousSources, &rule)?;
        }
        self.fixpoint(&mut graph, Phase::PassThrough, &PassThroughRule)?;

        phase(&mut graph, Phase::FieldResolution, rules::resolve_fields)?;
        if self.config.collapse_adjacent_boundaries {
            let rule = BoundaryCollapseRule::new(&self.tap_rules);
            let changes = self.fixpoint(&mut graph, Phase::BoundaryCollapse, &rule)?;
            if changes > 0 {
                phase(&mut graph, Phase::FieldResolution, rules::resolve_fields)?;
            }
        }
        phase(&mut graph, Phase::EveryChains, |graph| {
            rules::check_every_chains(graph)
        })?;

        debug!(
            elements = graph.element_count(),
            scopes = graph.scope_count(),
            "rewrite complete"
        );
        Ok((graph, diagnostics))
    }

    fn fixpoint(
        &self,
        graph: &mut ElementGraph,
        at: Phase,
        rule: &dyn RewriteRule,
    ) -> Result<usize> {
        let limit = self.config.max_rule_iterations;
        phase(graph, at, |graph| rules::apply_to_fixpoint(rule, graph, limit))
    }
}

/// Run one phase, attaching the graph as it stands to any failure.
fn phase<T>(
    graph: &mut ElementGraph,
    at: Phase,
    run: impl FnOnce(&mut ElementGraph) -> std::result::Result<T, PlanErrorKind>,
) -> Result<T> {
    debug!(phase = %at, "running phase");
    run(graph).map_err(|kind| Error::plan(at, kind, graph))
}
