//! Bidirectional edge-based A* over a Contraction Hierarchy, no stall-on-demand

use crate::approx::{BeelineApproximator, WeightApproximator};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::graph::{EdgeId, NodeId, RoutingChGraph};
use crate::weighting::Weighting;

use super::bidirectional::{BidirectionalChSearch, QueryContext, SearchLimits};
use super::path::ChPath;
use super::strategy::AStarStrategy;

/// [`BidirectionalChSearch`] with the A* strategy.
///
/// The default approximator is the straight-line distance on the plane
/// scaled by the weighting's minimum weight per meter.
pub struct AStarBidirectionEdgeCh<'a, G, W> {
    search: BidirectionalChSearch<'a, G, W, AStarStrategy<'a>>,
}

impl<'a, G, W> AStarBidirectionEdgeCh<'a, G, W>
where
    G: RoutingChGraph,
    W: Weighting,
{
    pub fn new(graph: &'a G, weighting: &'a W) -> Self {
        let approx =
            BeelineApproximator::new(graph.coordinates(), weighting.min_weight_per_distance());
        let strategy = AStarStrategy::new(Box::new(approx));
        Self {
            search: BidirectionalChSearch::new(graph, weighting, strategy),
        }
    }

    /// Build from a [`SearchConfig`]: distance calculation, epsilon,
    /// heuristic ordering and limits
    pub fn with_config(graph: &'a G, weighting: &'a W, config: &SearchConfig) -> Self {
        let approx =
            BeelineApproximator::new(graph.coordinates(), weighting.min_weight_per_distance())
                .with_distance_calc(config.distance_calc)
                .with_epsilon(config.epsilon);
        let strategy = AStarStrategy::new(Box::new(approx))
            .with_heuristic_for_node_order(config.use_heuristic_for_node_order);
        Self {
            search: BidirectionalChSearch::new(graph, weighting, strategy)
                .with_limits(config.limits()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.search.name()
    }

    pub fn approximation(&self) -> &dyn WeightApproximator {
        self.search.strategy().approximation()
    }

    /// Swap the approximator. The next `init` anchors it.
    pub fn set_approximation(&mut self, approx: Box<dyn WeightApproximator + 'a>) -> &mut Self {
        self.search.strategy_mut().set_approximation(approx);
        self
    }

    pub fn use_heuristic_for_node_order(&self) -> bool {
        self.search.strategy().use_heuristic_for_node_order()
    }

    pub fn set_use_heuristic_for_node_order(&mut self, enabled: bool) -> &mut Self {
        self.search
            .strategy_mut()
            .set_use_heuristic_for_node_order(enabled);
        self
    }

    pub fn set_limits(&mut self, limits: SearchLimits) -> &mut Self {
        self.search.set_limits(limits);
        self
    }

    pub fn strategy(&self) -> &AStarStrategy<'a> {
        self.search.strategy()
    }

    pub fn init(
        &mut self,
        from: NodeId,
        from_weight: f64,
        to: NodeId,
        to_weight: f64,
    ) -> Result<QueryContext, SearchError> {
        self.search.init(from, from_weight, to, to_weight)
    }

    pub fn init_edge_to_edge(
        &mut self,
        from: NodeId,
        source_out_edge: EdgeId,
        to: NodeId,
        target_in_edge: EdgeId,
    ) -> Result<QueryContext, SearchError> {
        self.search
            .init_edge_to_edge(from, source_out_edge, to, target_in_edge)
    }

    pub fn run(&mut self, ctx: &mut QueryContext) -> Result<(), SearchError> {
        self.search.run(ctx)
    }

    pub fn extract_path(&self, ctx: &QueryContext) -> ChPath {
        self.search.extract_path(ctx)
    }

    pub fn calc_path(&mut self, from: NodeId, to: NodeId) -> Result<ChPath, SearchError> {
        self.search.calc_path(from, to)
    }

    pub fn calc_path_edge_to_edge(
        &mut self,
        from: NodeId,
        source_out_edge: EdgeId,
        to: NodeId,
        target_in_edge: EdgeId,
    ) -> Result<ChPath, SearchError> {
        self.search
            .calc_path_edge_to_edge(from, source_out_edge, to, target_in_edge)
    }
}
