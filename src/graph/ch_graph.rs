//! In-memory contracted hierarchy
//!
//! Upward adjacency is stored in two flat CSR arrays (forward and backward)
//! holding copies of the edges, so a relaxation touches one contiguous slice.

use crate::geo::Coord;

use super::{ChEdge, EdgeId, NodeId, OriginalEdge, RoadGraph, RoutingChGraph};

#[derive(Debug, Clone)]
pub struct ChGraph {
    coords: Vec<Coord>,
    levels: Vec<u32>,
    original_edges: Vec<OriginalEdge>,
    /// All hierarchy edges indexed by ID (originals first, then shortcuts)
    edges: Vec<ChEdge>,

    // Forward upward graph: edges v → w with level(w) >= level(v), grouped by v
    out_offsets: Vec<usize>,
    out_edges: Vec<ChEdge>,

    // Backward upward graph: edges u → v with level(u) >= level(v), grouped by v
    in_offsets: Vec<usize>,
    in_edges: Vec<ChEdge>,
}

/// Statistics about a hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChGraphStats {
    pub n_nodes: usize,
    pub n_original_edges: usize,
    pub n_shortcuts: usize,
    pub n_up_edges: usize,
    pub n_down_edges: usize,
    pub max_level: u32,
}

impl ChGraph {
    /// Assemble a hierarchy from the road graph and the full edge list.
    ///
    /// `edges[i].id` must equal `i` and the first `road.edge_count()` entries
    /// must be the original edges.
    pub fn new(road: &RoadGraph, edges: Vec<ChEdge>) -> Self {
        debug_assert!(edges.iter().enumerate().all(|(i, e)| e.id as usize == i));
        debug_assert!(edges
            .iter()
            .take(road.edge_count())
            .all(|e| !e.is_shortcut()));

        let levels = road.levels().to_vec();
        let n = road.node_count();

        let (out_offsets, out_edges) = build_csr(n, &edges, |e| {
            (levels[e.adj as usize] >= levels[e.base as usize]).then_some(e.base)
        });
        let (in_offsets, in_edges) = build_csr(n, &edges, |e| {
            (levels[e.base as usize] >= levels[e.adj as usize]).then_some(e.adj)
        });

        Self {
            coords: road.coords().to_vec(),
            levels,
            original_edges: road.edges().to_vec(),
            edges,
            out_offsets,
            out_edges,
            in_offsets,
            in_edges,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn stats(&self) -> ChGraphStats {
        ChGraphStats {
            n_nodes: self.levels.len(),
            n_original_edges: self.original_edges.len(),
            n_shortcuts: self.edges.len() - self.original_edges.len(),
            n_up_edges: self.out_edges.len(),
            n_down_edges: self.in_edges.len(),
            max_level: self.levels.iter().copied().max().unwrap_or(0),
        }
    }
}

/// Group edges by the node `key` assigns them to (or drop them on `None`)
fn build_csr<F>(n_nodes: usize, edges: &[ChEdge], key: F) -> (Vec<usize>, Vec<ChEdge>)
where
    F: Fn(&ChEdge) -> Option<NodeId>,
{
    let mut offsets = vec![0usize; n_nodes + 1];
    for e in edges {
        if let Some(node) = key(e) {
            offsets[node as usize + 1] += 1;
        }
    }
    for i in 0..n_nodes {
        offsets[i + 1] += offsets[i];
    }

    let mut cursor = offsets.clone();
    let mut flat = vec![
        ChEdge {
            id: 0,
            base: 0,
            adj: 0,
            weight: 0.0,
            orig_first: 0,
            orig_last: 0,
            skip: None,
        };
        offsets[n_nodes]
    ];
    for e in edges {
        if let Some(node) = key(e) {
            let slot = &mut cursor[node as usize];
            flat[*slot] = *e;
            *slot += 1;
        }
    }

    (offsets, flat)
}

impl RoutingChGraph for ChGraph {
    fn node_count(&self) -> usize {
        self.levels.len()
    }

    fn original_edge_count(&self) -> usize {
        self.original_edges.len()
    }

    #[inline(always)]
    fn level(&self, node: NodeId) -> u32 {
        self.levels[node as usize]
    }

    fn coordinates(&self) -> &[Coord] {
        &self.coords
    }

    #[inline(always)]
    fn edge(&self, id: EdgeId) -> &ChEdge {
        &self.edges[id as usize]
    }

    fn original_edge(&self, id: EdgeId) -> &OriginalEdge {
        &self.original_edges[id as usize]
    }

    #[inline(always)]
    fn out_edges(&self, node: NodeId) -> &[ChEdge] {
        let start = self.out_offsets[node as usize];
        let end = self.out_offsets[node as usize + 1];
        &self.out_edges[start..end]
    }

    #[inline(always)]
    fn in_edges(&self, node: NodeId) -> &[ChEdge] {
        let start = self.in_offsets[node as usize];
        let end = self.in_offsets[node as usize + 1];
        &self.in_edges[start..end]
    }
}
