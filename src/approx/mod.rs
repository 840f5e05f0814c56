//! Weight approximators: lower bounds on the remaining cost between nodes
//!
//! An approximator must never overestimate the cost of the cheapest path
//! from `node` to `target`. Overestimating silently produces suboptimal
//! routes; debug builds assert admissibility along every extracted path.

mod balanced;

pub use balanced::BalancedApproximator;

use crate::geo::{Coord, DistanceCalc};
use crate::graph::NodeId;

pub trait WeightApproximator {
    /// Lower bound of the cost of any path from `node` to `target`
    fn approximate(&self, node: NodeId, target: NodeId) -> f64;

    fn name(&self) -> &'static str;
}

/// Straight-line distance scaled by the cheapest weight per meter
#[derive(Debug, Clone)]
pub struct BeelineApproximator<'a> {
    coords: &'a [Coord],
    min_weight_per_distance: f64,
    distance_calc: DistanceCalc,
    epsilon: f64,
}

impl<'a> BeelineApproximator<'a> {
    pub fn new(coords: &'a [Coord], min_weight_per_distance: f64) -> Self {
        Self {
            coords,
            min_weight_per_distance,
            distance_calc: DistanceCalc::Plane,
            epsilon: 1.0,
        }
    }

    pub fn with_distance_calc(mut self, distance_calc: DistanceCalc) -> Self {
        self.distance_calc = distance_calc;
        self
    }

    /// Scale factor on the estimate. Values above 1 trade optimality for speed.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn distance_calc(&self) -> DistanceCalc {
        self.distance_calc
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl WeightApproximator for BeelineApproximator<'_> {
    fn approximate(&self, node: NodeId, target: NodeId) -> f64 {
        let dist = self.distance_calc.distance(
            self.coords[node as usize],
            self.coords[target as usize],
        );
        dist * self.min_weight_per_distance * self.epsilon
    }

    fn name(&self) -> &'static str {
        "beeline"
    }
}

/// Always zero: turns A* into plain Dijkstra
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroApproximator;

impl WeightApproximator for ZeroApproximator {
    fn approximate(&self, _node: NodeId, _target: NodeId) -> f64 {
        0.0
    }

    fn name(&self) -> &'static str {
        "zero"
    }
}
