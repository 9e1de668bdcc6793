//! The plan-route facade.

use std::sync::Arc;

use fr_core::{SensorId, TimePoint};
use fr_flow::{FlowAdapter, FlowOracle};
use fr_network::{DijkstraRouter, EdgeRecord, NodeRecord, PathResult, Router, SensorGraph, WeightedGraph};

use crate::config::check_alpha;
use crate::report::RouteReport;
use crate::scorer::score_edges;
use crate::{PlanResult, PlannerConfig};

// ── PlanOutcome ───────────────────────────────────────────────────────────────

/// A successful planning call: either a route or a definite "no route".
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    Found(PathResult),
    /// `target` lies in a different component from `source`.
    NoPath { source: SensorId, target: SensorId },
}

impl PlanOutcome {
    pub fn path(&self) -> Option<&PathResult> {
        match self {
            PlanOutcome::Found(p) => Some(p),
            PlanOutcome::NoPath { .. } => None,
        }
    }

    pub fn into_path(self) -> Option<PathResult> {
        match self {
            PlanOutcome::Found(p) => Some(p),
            PlanOutcome::NoPath { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PlanOutcome::Found(_))
    }
}

// ── Planner ───────────────────────────────────────────────────────────────────

/// Everything one call produced, kept together so a report can be built
/// from the same weights and cached flows the search used.
struct Run<'g> {
    weighted: WeightedGraph<'g>,
    flows:    FlowAdapter,
    alpha:    f64,
    outcome:  PlanOutcome,
}

/// Plans congestion-weighted routes against one flow oracle.
///
/// The planner holds no per-call state: each call builds its own graph (or
/// borrows the caller's) and its own flow cache, so one `Planner` can serve
/// concurrent calls from several threads.
///
/// # Example
///
/// ```rust,ignore
/// let planner = Planner::new(config, Arc::new(TableOracle::from_wide_csv(path)?));
/// match planner.plan_route(&nodes, &edges, SensorId(15), SensorId(20), TimePoint(100), None)? {
///     PlanOutcome::Found(p)      => println!("{}", serde_json::to_string(&p)?),
///     PlanOutcome::NoPath { .. } => println!("no route"),
/// }
/// ```
pub struct Planner<R: Router = DijkstraRouter> {
    config: PlannerConfig,
    oracle: Arc<dyn FlowOracle>,
    router: R,
}

impl Planner<DijkstraRouter> {
    pub fn new(config: PlannerConfig, oracle: Arc<dyn FlowOracle>) -> Self {
        Self { config, oracle, router: DijkstraRouter }
    }
}

impl<R: Router> Planner<R> {
    /// Replace the shortest-path engine.
    pub fn with_router<R2: Router>(self, router: R2) -> Planner<R2> {
        Planner { config: self.config, oracle: self.oracle, router }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    /// Build the graph from records and plan `source → target`.
    ///
    /// `alpha` overrides the configured sensitivity for this call only.
    ///
    /// # Errors
    ///
    /// - `InvalidInput`: bad config or α, malformed records, or unknown
    ///   source/target.  Raised before any oracle query.
    /// - `OracleUnavailable`: any oracle failure, timeout, or invalid
    ///   value.  No partially scored graph is searched.
    pub fn plan_route(
        &self,
        nodes:  &[NodeRecord],
        edges:  &[EdgeRecord],
        source: SensorId,
        target: SensorId,
        time:   TimePoint,
        alpha:  Option<f64>,
    ) -> PlanResult<PlanOutcome> {
        let graph = self.build_graph(nodes, edges)?;
        self.plan_on_graph(&graph, source, target, time, alpha)
    }

    /// Like [`plan_route`](Self::plan_route), over a graph the caller has
    /// already built.  Flow is still fetched fresh for this call.
    pub fn plan_on_graph(
        &self,
        graph:  &SensorGraph,
        source: SensorId,
        target: SensorId,
        time:   TimePoint,
        alpha:  Option<f64>,
    ) -> PlanResult<PlanOutcome> {
        Ok(self.run(graph, source, target, time, alpha)?.outcome)
    }

    /// Plan as [`plan_route`](Self::plan_route) and, when a route is found,
    /// break it down leg by leg.
    pub fn plan_route_with_report(
        &self,
        nodes:  &[NodeRecord],
        edges:  &[EdgeRecord],
        source: SensorId,
        target: SensorId,
        time:   TimePoint,
        alpha:  Option<f64>,
    ) -> PlanResult<(PlanOutcome, Option<RouteReport>)> {
        let graph = self.build_graph(nodes, edges)?;
        let run = self.run(&graph, source, target, time, alpha)?;
        let report = match &run.outcome {
            PlanOutcome::Found(path) => Some(RouteReport::build(&run.weighted, &run.flows, time, run.alpha, path)?),
            PlanOutcome::NoPath { .. } => None,
        };
        Ok((run.outcome, report))
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn build_graph(&self, nodes: &[NodeRecord], edges: &[EdgeRecord]) -> PlanResult<SensorGraph> {
        let graph = SensorGraph::from_records(nodes, edges)?;
        log::info!("built sensor graph: {} sensors, {} edges", graph.node_count(), graph.edge_count());
        Ok(graph)
    }

    fn run<'g>(
        &self,
        graph:  &'g SensorGraph,
        source: SensorId,
        target: SensorId,
        time:   TimePoint,
        alpha:  Option<f64>,
    ) -> PlanResult<Run<'g>> {
        // ── Validate before touching the oracle ───────────────────────────
        self.config.validate()?;
        let alpha = alpha.unwrap_or(self.config.alpha);
        check_alpha(alpha)?;
        graph.require_node(source)?;
        graph.require_node(target)?;

        // ── Score ─────────────────────────────────────────────────────────
        let flows = FlowAdapter::new(Arc::clone(&self.oracle)).with_timeout(self.config.oracle_timeout());
        flows.prefetch(&graph.incident_sensors(), time, self.config.batch_size)?;
        let weights = score_edges(graph, &flows, time, alpha)?;
        log::info!(
            "scored {} edges at {time} (alpha = {alpha}, {} oracle queries)",
            weights.len(),
            flows.oracle_queries()
        );
        let weighted = WeightedGraph::new(graph, weights)?;

        // ── Search ────────────────────────────────────────────────────────
        let outcome = match self.router.shortest_path(&weighted, source, target)? {
            Some(path) => {
                log::info!(
                    "route {source} → {target}: {} hops, cost {:.4}",
                    path.hop_count(),
                    path.total_cost
                );
                PlanOutcome::Found(path)
            }
            None => {
                log::info!("no route from {source} to {target}");
                PlanOutcome::NoPath { source, target }
            }
        };

        Ok(Run { weighted, flows, alpha, outcome })
    }
}

/// One-shot planning with default settings and the given α.
///
/// Equivalent to `Planner::new(PlannerConfig { alpha, ..Default::default() },
/// oracle).plan_route(nodes, edges, source, target, time, None)`.
pub fn plan_route(
    oracle: Arc<dyn FlowOracle>,
    nodes:  &[NodeRecord],
    edges:  &[EdgeRecord],
    source: SensorId,
    target: SensorId,
    time:   TimePoint,
    alpha:  f64,
) -> PlanResult<PlanOutcome> {
    let config = PlannerConfig { alpha, reference_time: time, ..PlannerConfig::default() };
    Planner::new(config, oracle).plan_route(nodes, edges, source, target, time, None)
}
