//! Original (uncontracted) road graph

use crate::error::GraphError;
use crate::geo::Coord;

use super::{EdgeId, NodeId};

/// A directed road edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginalEdge {
    pub id: EdgeId,
    pub base: NodeId,
    pub adj: NodeId,
    /// Length in meters
    pub distance: f64,
    /// Traversal cost
    pub weight: f64,
}

/// Directed road graph with node coordinates and hierarchy levels.
///
/// Levels default to the node order (`level(v) == v`).
#[derive(Debug, Clone)]
pub struct RoadGraph {
    coords: Vec<Coord>,
    levels: Vec<u32>,
    edges: Vec<OriginalEdge>,
    out_adj: Vec<Vec<EdgeId>>,
    in_adj: Vec<Vec<EdgeId>>,
}

impl RoadGraph {
    pub fn new(coords: Vec<Coord>) -> Self {
        let n = coords.len();
        Self {
            levels: (0..n as u32).collect(),
            coords,
            edges: Vec::new(),
            out_adj: vec![Vec::new(); n],
            in_adj: vec![Vec::new(); n],
        }
    }

    pub fn add_edge(
        &mut self,
        base: NodeId,
        adj: NodeId,
        distance: f64,
        weight: f64,
    ) -> Result<EdgeId, GraphError> {
        let idx = self.edges.len();
        let node_count = self.node_count();
        for node in [base, adj] {
            if node as usize >= node_count {
                return Err(GraphError::UnknownNode {
                    edge: idx,
                    node,
                    node_count,
                });
            }
        }
        if !(distance.is_finite() && distance >= 0.0) {
            return Err(GraphError::InvalidEdgeValue {
                edge: idx,
                field: "distance",
                value: distance,
            });
        }
        if !(weight.is_finite() && weight >= 0.0) {
            return Err(GraphError::InvalidEdgeValue {
                edge: idx,
                field: "weight",
                value: weight,
            });
        }

        let id = idx as EdgeId;
        self.edges.push(OriginalEdge {
            id,
            base,
            adj,
            distance,
            weight,
        });
        self.out_adj[base as usize].push(id);
        self.in_adj[adj as usize].push(id);
        Ok(id)
    }

    /// Add `a → b` and `b → a` with the same length and weight
    pub fn add_two_way(
        &mut self,
        a: NodeId,
        b: NodeId,
        distance: f64,
        weight: f64,
    ) -> Result<(EdgeId, EdgeId), GraphError> {
        let fwd = self.add_edge(a, b, distance, weight)?;
        let bwd = self.add_edge(b, a, distance, weight)?;
        Ok((fwd, bwd))
    }

    pub fn set_levels(&mut self, levels: Vec<u32>) -> Result<(), GraphError> {
        if levels.len() != self.node_count() {
            return Err(GraphError::LevelCountMismatch {
                levels: levels.len(),
                node_count: self.node_count(),
            });
        }
        self.levels = levels;
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.coords.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    pub fn levels(&self) -> &[u32] {
        &self.levels
    }

    pub fn edge(&self, id: EdgeId) -> &OriginalEdge {
        &self.edges[id as usize]
    }

    pub fn edges(&self) -> &[OriginalEdge] {
        &self.edges
    }

    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = &OriginalEdge> + '_ {
        self.out_adj[node as usize]
            .iter()
            .map(move |&e| &self.edges[e as usize])
    }

    pub fn in_edges(&self, node: NodeId) -> impl Iterator<Item = &OriginalEdge> + '_ {
        self.in_adj[node as usize]
            .iter()
            .map(move |&e| &self.edges[e as usize])
    }

    /// Smallest weight per meter over all edges with a positive length.
    ///
    /// Scales straight-line distances into admissible weight estimates.
    /// Zero when no edge has a length.
    pub fn min_weight_per_distance(&self) -> f64 {
        self.edges
            .iter()
            .filter(|e| e.distance > 0.0)
            .map(|e| e.weight / e.distance)
            .fold(None, |acc: Option<f64>, r| Some(acc.map_or(r, |a| a.min(r))))
            .unwrap_or(0.0)
    }
}
