use serde::Serialize;

use crate::graph::{EdgeId, NodeId, RoutingChGraph};

/// Result of one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChPath {
    pub found: bool,
    pub from: NodeId,
    pub to: NodeId,
    /// `f64::INFINITY` when no path exists
    pub weight: f64,
    /// Hierarchy edges from source to target, shortcuts packed
    pub ch_edges: Vec<EdgeId>,
    /// Original edges from source to target
    pub edges: Vec<EdgeId>,
    pub nodes: Vec<NodeId>,
    pub visited_fwd: usize,
    pub visited_bwd: usize,
}

impl ChPath {
    pub fn not_found(from: NodeId, to: NodeId) -> Self {
        Self {
            found: false,
            from,
            to,
            weight: f64::INFINITY,
            ch_edges: Vec::new(),
            edges: Vec::new(),
            nodes: Vec::new(),
            visited_fwd: 0,
            visited_bwd: 0,
        }
    }

    pub fn visited_nodes(&self) -> usize {
        self.visited_fwd + self.visited_bwd
    }

    /// Length in meters of the original edges
    pub fn distance<G: RoutingChGraph>(&self, graph: &G) -> f64 {
        self.edges
            .iter()
            .map(|&e| graph.original_edge(e).distance)
            .sum()
    }
}
