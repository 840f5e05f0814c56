//! Search strategies plugged into the bidirectional driver
//!
//! A strategy decides entry priorities and when a direction may stop. The
//! driver owns everything else: frontiers, relaxation, meeting detection.

use crate::approx::{BalancedApproximator, WeightApproximator};
use crate::graph::{ChEdge, Direction, EdgeId, NodeId, NO_EDGE};

use super::entry::{Entry, EntryId};

pub trait SearchStrategy {
    /// Anchor per-query state on the two endpoints
    fn init(&mut self, from: NodeId, to: NodeId);

    /// Open-set priority of an entry at `node` with accumulated `weight`
    fn heap_weight(&self, node: NodeId, dir: Direction, weight: f64) -> f64;

    /// Lower bound of the remaining cost from `node` toward the other endpoint
    fn approximate(&self, _node: NodeId, _dir: Direction) -> f64 {
        0.0
    }

    fn name(&self) -> &'static str;

    fn create_start_entry(&self, node: NodeId, weight: f64, dir: Direction) -> Entry {
        Entry {
            node,
            edge: NO_EDGE,
            incoming_edge: NO_EDGE,
            weight,
            heap_weight: self.heap_weight(node, dir, weight),
            parent: None,
        }
    }

    fn create_entry(
        &self,
        edge: &ChEdge,
        incoming_edge: EdgeId,
        weight: f64,
        parent: EntryId,
        dir: Direction,
    ) -> Entry {
        let node = edge.adj_node(dir);
        Entry {
            node,
            edge: edge.id,
            incoming_edge,
            weight,
            heap_weight: self.heap_weight(node, dir, weight),
            parent: Some(parent),
        }
    }

    /// Decrease-key: overwrite `entry` in place, keeping its identity
    fn update_entry(
        &self,
        entry: &mut Entry,
        edge: &ChEdge,
        incoming_edge: EdgeId,
        weight: f64,
        parent: EntryId,
        dir: Direction,
    ) {
        debug_assert!(
            weight <= entry.weight,
            "entry weight increased from {} to {}",
            entry.weight,
            weight
        );
        entry.edge = edge.id;
        entry.incoming_edge = incoming_edge;
        entry.weight = weight;
        entry.heap_weight = self.heap_weight(entry.node, dir, weight);
        entry.parent = Some(parent);
    }

    /// Whether a direction whose cheapest open entry has priority
    /// `lower_bound` can still improve `best_weight`
    fn can_stop(&self, lower_bound: f64, best_weight: f64) -> bool {
        lower_bound > best_weight
    }
}

/// Plain bidirectional CH Dijkstra: priority is the accumulated weight
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraStrategy;

impl SearchStrategy for DijkstraStrategy {
    fn init(&mut self, _from: NodeId, _to: NodeId) {}

    fn heap_weight(&self, _node: NodeId, _dir: Direction, weight: f64) -> f64 {
        weight
    }

    fn name(&self) -> &'static str {
        "dijkstrabi|ch|edge_based|no_sod"
    }
}

/// A* over the hierarchy with a balanced approximator.
///
/// With `use_heuristic_for_node_order` off (default) entries are ordered by
/// their weight alone and the level order does the pruning; the approximator
/// then only feeds admissibility checks.
#[derive(Debug)]
pub struct AStarStrategy<'a> {
    balanced: BalancedApproximator<'a>,
    use_heuristic_for_node_order: bool,
}

impl<'a> AStarStrategy<'a> {
    pub fn new(approx: Box<dyn WeightApproximator + 'a>) -> Self {
        Self {
            balanced: BalancedApproximator::new(approx),
            use_heuristic_for_node_order: false,
        }
    }

    pub fn with_heuristic_for_node_order(mut self, enabled: bool) -> Self {
        self.use_heuristic_for_node_order = enabled;
        self
    }

    pub fn use_heuristic_for_node_order(&self) -> bool {
        self.use_heuristic_for_node_order
    }

    pub fn set_use_heuristic_for_node_order(&mut self, enabled: bool) {
        self.use_heuristic_for_node_order = enabled;
    }

    pub fn approximation(&self) -> &dyn WeightApproximator {
        self.balanced.approximation()
    }

    /// Replace the approximator. Anchors are reset; the next `init` sets them.
    pub fn set_approximation(&mut self, approx: Box<dyn WeightApproximator + 'a>) {
        self.balanced = BalancedApproximator::new(approx);
    }

    pub fn balanced(&self) -> &BalancedApproximator<'a> {
        &self.balanced
    }
}

impl SearchStrategy for AStarStrategy<'_> {
    fn init(&mut self, from: NodeId, to: NodeId) {
        self.balanced.set_from_to(from, to);
    }

    fn heap_weight(&self, node: NodeId, dir: Direction, weight: f64) -> f64 {
        if self.use_heuristic_for_node_order {
            weight + self.balanced.approximate(node, dir)
        } else {
            weight
        }
    }

    fn approximate(&self, node: NodeId, dir: Direction) -> f64 {
        self.balanced.approximate(node, dir)
    }

    fn name(&self) -> &'static str {
        "astarbi|ch|edge_based|no_sod"
    }
}
