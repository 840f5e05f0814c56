//! Graph collaborators: the original road graph, the contracted hierarchy
//! and the JSON graph file they are loaded from.
//!
//! # Edge ID Convention
//!
//! - Original edges are numbered `0..E` and keep their ID inside the hierarchy
//! - Shortcuts are numbered `E..` in creation order
//! - [`NO_EDGE`] marks "no edge" (start labels, unrestricted endpoints)

mod ch_graph;
mod contract;
mod file;
mod road;

pub use ch_graph::{ChGraph, ChGraphStats};
pub use contract::contract;
pub use file::{EdgeRecord, GraphFile, LoadedGraph, NodeRecord, TurnCostRecord};
pub use road::{OriginalEdge, RoadGraph};

use crate::geo::Coord;

pub type NodeId = u32;
pub type EdgeId = u32;

/// Sentinel for "no edge"
pub const NO_EDGE: EdgeId = u32::MAX;

/// Search direction. Each frontier is created with exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From the source, along edge direction
    Forward,
    /// From the target, against edge direction
    Backward,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// A directed edge of the hierarchy: an original edge or a shortcut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChEdge {
    pub id: EdgeId,
    pub base: NodeId,
    pub adj: NodeId,
    /// Original edge weights plus the turn costs inside the shortcut
    pub weight: f64,
    /// First original edge covered (turn cost at `base`)
    pub orig_first: EdgeId,
    /// Last original edge covered (turn cost at `adj`)
    pub orig_last: EdgeId,
    /// The two hierarchy edges a shortcut replaces
    pub skip: Option<(EdgeId, EdgeId)>,
}

impl ChEdge {
    pub fn is_shortcut(&self) -> bool {
        self.skip.is_some()
    }

    /// Node reached when relaxing this edge in `dir`
    #[inline(always)]
    pub fn adj_node(&self, dir: Direction) -> NodeId {
        match dir {
            Direction::Forward => self.adj,
            Direction::Backward => self.base,
        }
    }

    /// Original edge at the far end when relaxing this edge in `dir`
    #[inline(always)]
    pub fn traversal_edge(&self, dir: Direction) -> EdgeId {
        match dir {
            Direction::Forward => self.orig_last,
            Direction::Backward => self.orig_first,
        }
    }

    /// Original edge at the near end when relaxing this edge in `dir`
    #[inline(always)]
    pub fn junction_edge(&self, dir: Direction) -> EdgeId {
        match dir {
            Direction::Forward => self.orig_first,
            Direction::Backward => self.orig_last,
        }
    }
}

/// Read-only view of a contracted hierarchy as the search consumes it.
///
/// Adjacency lists are already filtered by level: `out_edges(v)` only holds
/// edges `v → w` with `level(w) >= level(v)`, `in_edges(v)` only holds edges
/// `u → v` with `level(u) >= level(v)`.
pub trait RoutingChGraph {
    fn node_count(&self) -> usize;

    fn original_edge_count(&self) -> usize;

    fn level(&self, node: NodeId) -> u32;

    fn coordinates(&self) -> &[Coord];

    fn edge(&self, id: EdgeId) -> &ChEdge;

    fn original_edge(&self, id: EdgeId) -> &OriginalEdge;

    /// Upward edges leaving `node`
    fn out_edges(&self, node: NodeId) -> &[ChEdge];

    /// Upward edges entering `node` (stored in their original orientation)
    fn in_edges(&self, node: NodeId) -> &[ChEdge];

    fn edges(&self, node: NodeId, dir: Direction) -> &[ChEdge] {
        match dir {
            Direction::Forward => self.out_edges(node),
            Direction::Backward => self.in_edges(node),
        }
    }

    fn coordinate(&self, node: NodeId) -> Coord {
        self.coordinates()[node as usize]
    }

    /// Expand a hierarchy edge into the original edges it covers
    fn unpack(&self, id: EdgeId, out: &mut Vec<EdgeId>) {
        match self.edge(id).skip {
            None => out.push(id),
            Some((first, second)) => {
                self.unpack(first, out);
                self.unpack(second, out);
            }
        }
    }
}
