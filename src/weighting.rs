//! Weighting collaborator: edge weights and turn costs
//!
//! Hierarchy edges carry their own precomputed weight; the weighting adds the
//! turn cost at the junction where the edge is entered (forward) or left
//! (backward). A turn cost of `f64::INFINITY` forbids the turn.

use rustc_hash::FxHashMap;

use crate::error::GraphError;
use crate::graph::{ChEdge, Direction, EdgeId, NodeId, RoadGraph, NO_EDGE};

pub trait Weighting {
    /// Cost of turning from `in_edge` into `out_edge` at `via`
    fn turn_weight(&self, in_edge: EdgeId, via: NodeId, out_edge: EdgeId) -> f64;

    /// Lower bound on weight per meter, used to scale straight-line distances
    fn min_weight_per_distance(&self) -> f64;

    /// Weight of relaxing `edge` in `dir` coming from `prev_or_next`.
    ///
    /// Forward, `prev_or_next` is the original edge we arrived on at `edge.base`;
    /// backward, it is the original edge we continue on after `edge.adj`.
    /// [`NO_EDGE`] means there is no junction to pay for.
    fn calc_edge_weight(&self, edge: &ChEdge, prev_or_next: EdgeId, dir: Direction) -> f64 {
        if prev_or_next == NO_EDGE {
            return edge.weight;
        }
        let turn = match dir {
            Direction::Forward => self.turn_weight(prev_or_next, edge.base, edge.orig_first),
            Direction::Backward => self.turn_weight(edge.orig_last, edge.adj, prev_or_next),
        };
        edge.weight + turn
    }
}

/// Turn-cost table over the original edges.
///
/// Turns missing from the table cost nothing, except u-turns (leaving a node
/// on the reverse of the edge we arrived on) which are forbidden unless a
/// u-turn cost is configured.
#[derive(Debug, Clone)]
pub struct TurnCostWeighting {
    costs: FxHashMap<(EdgeId, NodeId, EdgeId), f64>,
    /// (base, adj) of every original edge, for u-turn detection
    endpoints: Vec<(NodeId, NodeId)>,
    u_turn_cost: f64,
    min_weight_per_distance: f64,
}

impl TurnCostWeighting {
    pub fn new(road: &RoadGraph) -> Self {
        Self {
            costs: FxHashMap::default(),
            endpoints: road.edges().iter().map(|e| (e.base, e.adj)).collect(),
            u_turn_cost: f64::INFINITY,
            min_weight_per_distance: road.min_weight_per_distance(),
        }
    }

    /// Allow u-turns at `cost`
    pub fn with_u_turn_cost(mut self, cost: f64) -> Self {
        self.u_turn_cost = cost;
        self
    }

    pub fn u_turn_cost(&self) -> f64 {
        self.u_turn_cost
    }

    /// Set the cost of one turn; `f64::INFINITY` forbids it
    pub fn set_turn_cost(
        &mut self,
        from_edge: EdgeId,
        via: NodeId,
        to_edge: EdgeId,
        cost: f64,
    ) -> Result<(), GraphError> {
        let edge_count = self.endpoints.len();
        for edge in [from_edge, to_edge] {
            if edge as usize >= edge_count {
                return Err(GraphError::UnknownTurnEdge { edge, edge_count });
            }
        }
        if self.endpoints[from_edge as usize].1 != via || self.endpoints[to_edge as usize].0 != via
        {
            return Err(GraphError::TurnNotAtNode {
                from_edge,
                via,
                to_edge,
            });
        }
        if cost.is_nan() || cost < 0.0 {
            return Err(GraphError::InvalidTurnCost {
                from_edge,
                to_edge,
                value: cost,
            });
        }

        self.costs.insert((from_edge, via, to_edge), cost);
        Ok(())
    }

    /// Forbid one turn
    pub fn restrict_turn(
        &mut self,
        from_edge: EdgeId,
        via: NodeId,
        to_edge: EdgeId,
    ) -> Result<(), GraphError> {
        self.set_turn_cost(from_edge, via, to_edge, f64::INFINITY)
    }

    pub fn turn_cost_count(&self) -> usize {
        self.costs.len()
    }

    fn is_u_turn(&self, in_edge: EdgeId, out_edge: EdgeId) -> bool {
        let (in_base, in_adj) = self.endpoints[in_edge as usize];
        let (out_base, out_adj) = self.endpoints[out_edge as usize];
        in_adj == out_base && out_adj == in_base
    }
}

impl Weighting for TurnCostWeighting {
    fn turn_weight(&self, in_edge: EdgeId, via: NodeId, out_edge: EdgeId) -> f64 {
        if in_edge == NO_EDGE || out_edge == NO_EDGE {
            return 0.0;
        }
        if let Some(&cost) = self.costs.get(&(in_edge, via, out_edge)) {
            return cost;
        }
        if self.is_u_turn(in_edge, out_edge) {
            return self.u_turn_cost;
        }
        0.0
    }

    fn min_weight_per_distance(&self) -> f64 {
        self.min_weight_per_distance
    }
}
