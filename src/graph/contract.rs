//! Reference contraction in level order
//!
//! Contracts nodes by ascending `(level, id)` and inserts a shortcut for every
//! (incoming, outgoing) pair of uncontracted neighbors whose turn at the
//! contracted node is allowed. There is no witness search, so the hierarchy is
//! larger than necessary but always complete.
//!
//! Edge-based details:
//! - Shortcuts remember their first/last original edge for turn costs at
//!   their endpoints and include the turn cost at the contracted node
//! - `u → v → u` produces a loop shortcut at `u`
//! - Loops already at `v` are folded into the incoming edges first, so paths
//!   that circle `v` (to dodge a forbidden turn) survive its contraction
//! - Parallel shortcuts with different first/last edges are all kept

use rustc_hash::FxHashMap;

use crate::weighting::Weighting;

use super::{ChEdge, ChGraph, EdgeId, NodeId, RoadGraph};

/// Key of a shortcut candidate: (base, adj, orig_first, orig_last)
type ShortcutKey = (NodeId, NodeId, EdgeId, EdgeId);

struct Contractor<'a, W: Weighting> {
    weighting: &'a W,
    edges: Vec<ChEdge>,
    /// Best edge per key, used to drop dominated candidates
    best: FxHashMap<ShortcutKey, EdgeId>,
    out_live: Vec<Vec<EdgeId>>,
    in_live: Vec<Vec<EdgeId>>,
    contracted: Vec<bool>,
}

impl<'a, W: Weighting> Contractor<'a, W> {
    fn new(road: &RoadGraph, weighting: &'a W) -> Self {
        let n = road.node_count();
        let mut c = Self {
            weighting,
            edges: Vec::with_capacity(road.edge_count() * 2),
            best: FxHashMap::default(),
            out_live: vec![Vec::new(); n],
            in_live: vec![Vec::new(); n],
            contracted: vec![false; n],
        };
        for e in road.edges() {
            c.push_edge(e.base, e.adj, e.weight, e.id, e.id, None);
        }
        c
    }

    fn push_edge(
        &mut self,
        base: NodeId,
        adj: NodeId,
        weight: f64,
        orig_first: EdgeId,
        orig_last: EdgeId,
        skip: Option<(EdgeId, EdgeId)>,
    ) -> EdgeId {
        let id = self.edges.len() as EdgeId;
        self.edges.push(ChEdge {
            id,
            base,
            adj,
            weight,
            orig_first,
            orig_last,
            skip,
        });
        self.out_live[base as usize].push(id);
        self.in_live[adj as usize].push(id);

        let key = (base, adj, orig_first, orig_last);
        let replace = match self.best.get(&key) {
            Some(&prev) => self.edges[prev as usize].weight > weight,
            None => true,
        };
        if replace {
            self.best.insert(key, id);
        }
        id
    }

    /// Concatenate `first` and `second` at their shared node.
    ///
    /// Returns the new edge, or `None` if the turn is forbidden or an
    /// equivalent edge is at least as cheap.
    fn try_shortcut(&mut self, first: EdgeId, second: EdgeId) -> Option<EdgeId> {
        let a = self.edges[first as usize];
        let b = self.edges[second as usize];
        debug_assert_eq!(a.adj, b.base);

        let turn = self.weighting.turn_weight(a.orig_last, a.adj, b.orig_first);
        if !turn.is_finite() {
            return None;
        }
        let weight = a.weight + turn + b.weight;

        let key = (a.base, b.adj, a.orig_first, b.orig_last);
        if let Some(&prev) = self.best.get(&key) {
            if self.edges[prev as usize].weight <= weight {
                return None;
            }
        }
        Some(self.push_edge(
            a.base,
            b.adj,
            weight,
            a.orig_first,
            b.orig_last,
            Some((first, second)),
        ))
    }

    fn contract_node(&mut self, v: NodeId) {
        let vi = v as usize;
        let loops: Vec<EdgeId> = self.out_live[vi]
            .iter()
            .copied()
            .filter(|&e| self.edges[e as usize].adj == v)
            .collect();
        let mut incoming: Vec<EdgeId> = self.in_live[vi]
            .iter()
            .copied()
            .filter(|&e| {
                let base = self.edges[e as usize].base;
                base != v && !self.contracted[base as usize]
            })
            .collect();

        // Extend incoming edges by loops at v until nothing improves
        if !loops.is_empty() {
            let mut queue = incoming.clone();
            while let Some(e_in) = queue.pop() {
                for &l in &loops {
                    if let Some(id) = self.try_shortcut(e_in, l) {
                        incoming.push(id);
                        queue.push(id);
                    }
                }
            }
        }

        let outgoing: Vec<EdgeId> = self.out_live[vi]
            .iter()
            .copied()
            .filter(|&e| {
                let adj = self.edges[e as usize].adj;
                adj != v && !self.contracted[adj as usize]
            })
            .collect();

        for &e_in in &incoming {
            for &e_out in &outgoing {
                self.try_shortcut(e_in, e_out);
            }
        }

        self.contracted[vi] = true;
    }
}

/// Contract `road` in level order and return the resulting hierarchy.
pub fn contract<W: Weighting>(road: &RoadGraph, weighting: &W) -> ChGraph {
    let mut order: Vec<NodeId> = (0..road.node_count() as NodeId).collect();
    let levels = road.levels();
    order.sort_by_key(|&v| (levels[v as usize], v));

    let mut contractor = Contractor::new(road, weighting);
    for &v in &order {
        contractor.contract_node(v);
    }

    let n_shortcuts = contractor.edges.len() - road.edge_count();
    tracing::debug!(
        nodes = road.node_count(),
        original_edges = road.edge_count(),
        shortcuts = n_shortcuts,
        "contracted hierarchy"
    );

    ChGraph::new(road, contractor.edges)
}
