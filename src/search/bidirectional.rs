//! Bidirectional edge-based search over a Contraction Hierarchy
//!
//! Both directions only climb the hierarchy: forward relaxes `out_edges`,
//! backward relaxes `in_edges` against their orientation. Labels are keyed by
//! (node, incoming original edge) so turn costs apply at every junction,
//! including the meeting node.
//!
//! # Stepping
//!
//! While both directions are active the one whose cheapest open entry has
//! the smaller priority steps (forward on ties). A step peeks at that entry:
//! an empty open set or a priority above the best weight stops the direction,
//! otherwise the entry is popped and its edges relaxed. The query ends when
//! both directions are stopped. No stall-on-demand: it is unsound with turn
//! costs.

use std::time::{Duration, Instant};

use crate::error::SearchError;
use crate::graph::{ChEdge, Direction, EdgeId, NodeId, RoutingChGraph, NO_EDGE};
use crate::weighting::Weighting;

use super::entry::{Entry, EntryId};
use super::frontier::Frontier;
use super::path::ChPath;
use super::strategy::SearchStrategy;

/// Per-query abort conditions, probed before every pop
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchLimits {
    /// Maximum number of pops over both directions
    pub max_visited_nodes: Option<usize>,
    pub timeout: Option<Duration>,
}

/// Everything one query mutates. Dropped (or replaced by the next `init`)
/// when the query is over.
#[derive(Debug, Clone)]
pub struct QueryContext {
    from: NodeId,
    to: NodeId,
    fwd: Frontier,
    bwd: Frontier,
    best_weight: f64,
    best: Option<(EntryId, EntryId)>,
    seq: u64,
    started: Instant,
}

impl QueryContext {
    fn new(from: NodeId, source_out_edge: EdgeId, to: NodeId, target_in_edge: EdgeId) -> Self {
        Self {
            from,
            to,
            fwd: Frontier::new(Direction::Forward, source_out_edge),
            bwd: Frontier::new(Direction::Backward, target_in_edge),
            best_weight: f64::INFINITY,
            best: None,
            seq: 0,
            started: Instant::now(),
        }
    }

    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    pub fn best_weight(&self) -> f64 {
        self.best_weight
    }

    /// Meeting pair (forward entry, backward entry) of the best path
    pub fn best_entries(&self) -> Option<(EntryId, EntryId)> {
        self.best
    }

    pub fn frontier(&self, dir: Direction) -> &Frontier {
        match dir {
            Direction::Forward => &self.fwd,
            Direction::Backward => &self.bwd,
        }
    }

    fn frontier_mut(&mut self, dir: Direction) -> &mut Frontier {
        match dir {
            Direction::Forward => &mut self.fwd,
            Direction::Backward => &mut self.bwd,
        }
    }

    pub fn visited_nodes(&self) -> usize {
        self.fwd.settled() + self.bwd.settled()
    }

    pub fn is_finished(&self) -> bool {
        !self.fwd.is_active() && !self.bwd.is_active()
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

/// Bidirectional CH search parameterized by a [`SearchStrategy`].
///
/// Usage: [`init`](Self::init) → [`run`](Self::run) →
/// [`extract_path`](Self::extract_path), or [`calc_path`](Self::calc_path).
pub struct BidirectionalChSearch<'a, G, W, S> {
    graph: &'a G,
    weighting: &'a W,
    strategy: S,
    limits: SearchLimits,
}

impl<'a, G, W, S> BidirectionalChSearch<'a, G, W, S>
where
    G: RoutingChGraph,
    W: Weighting,
    S: SearchStrategy,
{
    pub fn new(graph: &'a G, weighting: &'a W, strategy: S) -> Self {
        Self {
            graph,
            weighting,
            strategy,
            limits: SearchLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn set_limits(&mut self, limits: SearchLimits) {
        self.limits = limits;
    }

    pub fn limits(&self) -> SearchLimits {
        self.limits
    }

    pub fn graph(&self) -> &'a G {
        self.graph
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    pub fn name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Start a node-to-node query. `from_weight` and `to_weight` are the
    /// initial weights of the two start entries.
    pub fn init(
        &mut self,
        from: NodeId,
        from_weight: f64,
        to: NodeId,
        to_weight: f64,
    ) -> Result<QueryContext, SearchError> {
        self.init_anchored(from, from_weight, NO_EDGE, to, to_weight, NO_EDGE)
    }

    /// Start a query that must leave `from` on `source_out_edge` and reach
    /// `to` on `target_in_edge` (original edges, `NO_EDGE` for either end
    /// leaves it free).
    pub fn init_edge_to_edge(
        &mut self,
        from: NodeId,
        source_out_edge: EdgeId,
        to: NodeId,
        target_in_edge: EdgeId,
    ) -> Result<QueryContext, SearchError> {
        self.init_anchored(from, 0.0, source_out_edge, to, 0.0, target_in_edge)
    }

    fn init_anchored(
        &mut self,
        from: NodeId,
        from_weight: f64,
        source_out_edge: EdgeId,
        to: NodeId,
        to_weight: f64,
        target_in_edge: EdgeId,
    ) -> Result<QueryContext, SearchError> {
        self.check_node(from)?;
        self.check_node(to)?;
        self.check_anchor(source_out_edge, from, Direction::Forward)?;
        self.check_anchor(target_in_edge, to, Direction::Backward)?;

        self.strategy.init(from, to);

        let mut ctx = QueryContext::new(from, source_out_edge, to, target_in_edge);
        for (node, weight, dir) in [
            (from, from_weight, Direction::Forward),
            (to, to_weight, Direction::Backward),
        ] {
            let entry = self.strategy.create_start_entry(node, weight, dir);
            let seq = ctx.next_seq();
            let id = ctx.frontier_mut(dir).insert(entry, seq);
            self.check_meeting(&mut ctx, dir, id);
        }

        tracing::debug!(
            algorithm = self.name(),
            from,
            to,
            source_out_edge = (source_out_edge != NO_EDGE).then_some(source_out_edge),
            target_in_edge = (target_in_edge != NO_EDGE).then_some(target_in_edge),
            "query initialized"
        );
        Ok(ctx)
    }

    fn check_node(&self, node: NodeId) -> Result<(), SearchError> {
        let node_count = self.graph.node_count();
        if node as usize >= node_count {
            return Err(SearchError::NodeOutOfRange { node, node_count });
        }
        Ok(())
    }

    fn check_anchor(&self, edge: EdgeId, node: NodeId, dir: Direction) -> Result<(), SearchError> {
        if edge == NO_EDGE {
            return Ok(());
        }
        let edge_count = self.graph.original_edge_count();
        if edge as usize >= edge_count {
            return Err(SearchError::InvalidEdge { edge, edge_count });
        }
        let orig = self.graph.original_edge(edge);
        let (end, role) = match dir {
            Direction::Forward => (orig.base, "start at"),
            Direction::Backward => (orig.adj, "end at"),
        };
        if end != node {
            return Err(SearchError::EdgeNotIncident { edge, node, role });
        }
        Ok(())
    }

    /// Step both directions until both are stopped
    pub fn run(&mut self, ctx: &mut QueryContext) -> Result<(), SearchError> {
        while let Some(dir) = Self::next_direction(ctx) {
            self.step(ctx, dir)?;
        }

        tracing::debug!(
            algorithm = self.name(),
            from = ctx.from,
            to = ctx.to,
            weight = ctx.best_weight,
            visited_fwd = ctx.fwd.settled(),
            visited_bwd = ctx.bwd.settled(),
            entries_fwd = ctx.fwd.arena().len(),
            entries_bwd = ctx.bwd.arena().len(),
            "query finished"
        );
        Ok(())
    }

    fn next_direction(ctx: &QueryContext) -> Option<Direction> {
        match (ctx.fwd.is_active(), ctx.bwd.is_active()) {
            (false, false) => None,
            (true, false) => Some(Direction::Forward),
            (false, true) => Some(Direction::Backward),
            (true, true) => {
                // An empty side goes first so it gets stopped
                let fwd = ctx.fwd.peek().map_or(f64::NEG_INFINITY, |(_, w)| w);
                let bwd = ctx.bwd.peek().map_or(f64::NEG_INFINITY, |(_, w)| w);
                if fwd <= bwd {
                    Some(Direction::Forward)
                } else {
                    Some(Direction::Backward)
                }
            }
        }
    }

    fn step(&self, ctx: &mut QueryContext, dir: Direction) -> Result<(), SearchError> {
        let best_weight = ctx.best_weight;
        let frontier = ctx.frontier_mut(dir);
        let Some((_, lower_bound)) = frontier.peek() else {
            frontier.stop();
            tracing::trace!(?dir, "open set exhausted");
            return Ok(());
        };
        if self.strategy.can_stop(lower_bound, best_weight) {
            frontier.stop();
            tracing::trace!(?dir, lower_bound, best_weight, "direction stopped");
            return Ok(());
        }

        self.check_limits(ctx)?;

        let Some(id) = ctx.frontier_mut(dir).pop() else {
            return Ok(());
        };
        self.expand(ctx, dir, id);
        Ok(())
    }

    fn check_limits(&self, ctx: &QueryContext) -> Result<(), SearchError> {
        if let Some(limit) = self.limits.max_visited_nodes {
            let visited = ctx.visited_nodes();
            if visited >= limit {
                return Err(SearchError::VisitedNodesExceeded { visited, limit });
            }
        }
        if let Some(timeout) = self.limits.timeout {
            let elapsed = ctx.started.elapsed();
            if elapsed > timeout {
                return Err(SearchError::Timeout {
                    elapsed_ms: elapsed.as_millis() as u64,
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
        }
        Ok(())
    }

    /// Relax every upward edge of the entry just popped
    fn expand(&self, ctx: &mut QueryContext, dir: Direction, id: EntryId) {
        let current = *ctx.frontier(dir).entry(id);
        let anchor = ctx.frontier(dir).anchor_edge();
        let graph = self.graph;

        for edge in graph.edges(current.node, dir) {
            // The first edge out of an anchored endpoint must start (or end)
            // with the required original edge
            if current.is_start() && anchor != NO_EDGE && edge.junction_edge(dir) != anchor {
                continue;
            }
            let edge_weight = self
                .weighting
                .calc_edge_weight(edge, current.incoming_edge, dir);
            if !edge_weight.is_finite() {
                continue;
            }
            let weight = current.weight + edge_weight;
            self.relax(ctx, dir, id, edge, weight);
        }
    }

    fn relax(
        &self,
        ctx: &mut QueryContext,
        dir: Direction,
        parent: EntryId,
        edge: &ChEdge,
        weight: f64,
    ) {
        let node = edge.adj_node(dir);
        let incoming_edge = edge.traversal_edge(dir);

        let touched = match ctx.frontier(dir).lookup(node, incoming_edge) {
            None => {
                let entry = self
                    .strategy
                    .create_entry(edge, incoming_edge, weight, parent, dir);
                let seq = ctx.next_seq();
                ctx.frontier_mut(dir).insert(entry, seq)
            }
            Some(existing) if weight < ctx.frontier(dir).entry(existing).weight => {
                let seq = ctx.next_seq();
                let frontier = ctx.frontier_mut(dir);
                self.strategy.update_entry(
                    frontier.entry_mut(existing),
                    edge,
                    incoming_edge,
                    weight,
                    parent,
                    dir,
                );
                frontier.reopen(existing, seq);
                existing
            }
            Some(_) => return,
        };

        self.check_meeting(ctx, dir, touched);
    }

    /// Join a new or improved entry with every opposite entry at its node
    fn check_meeting(&self, ctx: &mut QueryContext, dir: Direction, id: EntryId) {
        let this = ctx.frontier(dir);
        let other = ctx.frontier(dir.opposite());
        let entry = this.entry(id);

        let mut improved: Option<(f64, EntryId, EntryId)> = None;
        for &other_id in other.entries_at(entry.node) {
            let other_entry = other.entry(other_id);
            let (fwd, fwd_id, bwd, bwd_id) = match dir {
                Direction::Forward => (entry, id, other_entry, other_id),
                Direction::Backward => (other_entry, other_id, entry, id),
            };
            let join = self.join_weight(ctx, fwd, bwd);
            if !join.is_finite() {
                continue;
            }
            let total = fwd.weight + join + bwd.weight;
            let best = improved.map_or(ctx.best_weight, |(w, _, _)| w);
            if total < best {
                improved = Some((total, fwd_id, bwd_id));
            }
        }

        if let Some((weight, fwd_id, bwd_id)) = improved {
            tracing::trace!(
                node = entry.node,
                old = ctx.best_weight,
                new = weight,
                "better meeting"
            );
            ctx.best_weight = weight;
            ctx.best = Some((fwd_id, bwd_id));
        }
    }

    /// Cost of continuing from the forward label into the backward label at
    /// their shared node
    fn join_weight(&self, ctx: &QueryContext, fwd: &Entry, bwd: &Entry) -> f64 {
        let source_out_edge = ctx.fwd.anchor_edge();
        let target_in_edge = ctx.bwd.anchor_edge();
        let allowed = |anchor: EdgeId, edge: EdgeId| anchor == NO_EDGE || anchor == edge;

        match (fwd.incoming_edge, bwd.incoming_edge) {
            (NO_EDGE, NO_EDGE) => {
                if source_out_edge == NO_EDGE && target_in_edge == NO_EDGE {
                    0.0
                } else {
                    f64::INFINITY
                }
            }
            (NO_EDGE, out_edge) => {
                if allowed(source_out_edge, out_edge) {
                    0.0
                } else {
                    f64::INFINITY
                }
            }
            (in_edge, NO_EDGE) => {
                if allowed(target_in_edge, in_edge) {
                    0.0
                } else {
                    f64::INFINITY
                }
            }
            (in_edge, out_edge) => self.weighting.turn_weight(in_edge, fwd.node, out_edge),
        }
    }

    /// Assemble the best path found by [`run`](Self::run)
    pub fn extract_path(&self, ctx: &QueryContext) -> ChPath {
        let mut path = ChPath::not_found(ctx.from, ctx.to);
        path.visited_fwd = ctx.fwd.settled();
        path.visited_bwd = ctx.bwd.settled();

        let Some((fwd_id, bwd_id)) = ctx.best else {
            return path;
        };
        if !ctx.best_weight.is_finite() {
            return path;
        }

        let fwd_chain: Vec<&Entry> = ctx.fwd.arena().chain(fwd_id).collect();
        let bwd_chain: Vec<&Entry> = ctx.bwd.arena().chain(bwd_id).collect();

        if cfg!(debug_assertions) {
            self.assert_admissible(&fwd_chain, Direction::Forward, ctx.best_weight);
            self.assert_admissible(&bwd_chain, Direction::Backward, ctx.best_weight);
        }

        // Forward chain runs meeting -> source, backward chain meeting -> target
        let ch_edges: Vec<EdgeId> = fwd_chain
            .iter()
            .rev()
            .chain(bwd_chain.iter())
            .filter(|e| !e.is_start())
            .map(|e| e.edge)
            .collect();

        let mut edges = Vec::with_capacity(ch_edges.len());
        for &id in &ch_edges {
            self.graph.unpack(id, &mut edges);
        }

        let mut nodes = Vec::with_capacity(edges.len() + 1);
        match edges.first() {
            None => nodes.push(ctx.from),
            Some(&first) => {
                nodes.push(self.graph.original_edge(first).base);
                nodes.extend(edges.iter().map(|&e| self.graph.original_edge(e).adj));
            }
        }

        path.found = true;
        path.weight = ctx.best_weight;
        path.ch_edges = ch_edges;
        path.edges = edges;
        path.nodes = nodes;
        path
    }

    /// Entries on the best path never have a priority above the best weight
    /// unless the approximator overestimates
    fn assert_admissible(&self, chain: &[&Entry], dir: Direction, best_weight: f64) {
        let eps = 1e-6 * best_weight.abs().max(1.0);
        for entry in chain {
            let bound = entry.weight + self.strategy.approximate(entry.node, dir);
            debug_assert!(
                bound <= best_weight + eps,
                "inadmissible approximation at node {} ({:?}): {} > {}",
                entry.node,
                dir,
                bound,
                best_weight
            );
        }
    }

    /// Shortest path from `from` to `to`
    pub fn calc_path(&mut self, from: NodeId, to: NodeId) -> Result<ChPath, SearchError> {
        let mut ctx = self.init(from, 0.0, to, 0.0)?;
        self.run(&mut ctx)?;
        Ok(self.extract_path(&ctx))
    }

    /// Shortest path leaving `from` on `source_out_edge` and entering `to`
    /// on `target_in_edge`
    pub fn calc_path_edge_to_edge(
        &mut self,
        from: NodeId,
        source_out_edge: EdgeId,
        to: NodeId,
        target_in_edge: EdgeId,
    ) -> Result<ChPath, SearchError> {
        let mut ctx = self.init_edge_to_edge(from, source_out_edge, to, target_in_edge)?;
        self.run(&mut ctx)?;
        Ok(self.extract_path(&ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coord;
    use crate::graph::{contract, ChGraph, RoadGraph};
    use crate::search::strategy::DijkstraStrategy;
    use crate::weighting::TurnCostWeighting;
    use std::cell::RefCell;

    fn coords(n: usize) -> Vec<Coord> {
        (0..n).map(|i| Coord::new(0.0, i as f64 * 0.001)).collect()
    }

    /// 0 - 1 - 2 - 3 - 4, two-way unit edges, levels in node order
    fn line() -> (ChGraph, TurnCostWeighting) {
        let mut road = RoadGraph::new(coords(5));
        for i in 0..4 {
            road.add_two_way(i, i + 1, 120.0, 1.0).unwrap();
        }
        let weighting = TurnCostWeighting::new(&road);
        let ch = contract(&road, &weighting);
        (ch, weighting)
    }

    #[test]
    fn line_query_stops_both_directions() {
        let (ch, w) = line();
        let mut search = BidirectionalChSearch::new(&ch, &w, DijkstraStrategy);
        let mut ctx = search.init(0, 0.0, 4, 0.0).unwrap();
        assert!(!ctx.is_finished());

        search.run(&mut ctx).unwrap();
        assert!(ctx.is_finished());
        assert_eq!(ctx.best_weight(), 4.0);
        assert!(ctx.best_entries().is_some());

        let path = search.extract_path(&ctx);
        assert!(path.found);
        assert_eq!(path.nodes, vec![0, 1, 2, 3, 4]);
        assert!(path.visited_nodes() > 0);
    }

    #[test]
    fn start_weights_are_added() {
        let (ch, w) = line();
        let mut search = BidirectionalChSearch::new(&ch, &w, DijkstraStrategy);
        let mut ctx = search.init(1, 0.5, 3, 0.25).unwrap();
        search.run(&mut ctx).unwrap();
        assert_eq!(ctx.best_weight(), 2.75);
    }

    #[test]
    fn same_source_and_target() {
        let (ch, w) = line();
        let mut search = BidirectionalChSearch::new(&ch, &w, DijkstraStrategy);
        let path = search.calc_path(2, 2).unwrap();
        assert!(path.found);
        assert_eq!(path.weight, 0.0);
        assert_eq!(path.nodes, vec![2]);
        assert!(path.edges.is_empty());
    }

    #[test]
    fn rejects_bad_input() {
        let (ch, w) = line();
        let mut search = BidirectionalChSearch::new(&ch, &w, DijkstraStrategy);

        assert_eq!(
            search.calc_path(0, 9).unwrap_err(),
            SearchError::NodeOutOfRange {
                node: 9,
                node_count: 5
            }
        );
        assert!(matches!(
            search.calc_path_edge_to_edge(0, 100, 4, NO_EDGE),
            Err(SearchError::InvalidEdge { edge: 100, .. })
        ));
        // Edge 0 is 0 -> 1: it starts at 0 but does not end at 4
        assert!(matches!(
            search.calc_path_edge_to_edge(0, 0, 4, 0),
            Err(SearchError::EdgeNotIncident { edge: 0, node: 4, role: "end at" })
        ));
        assert!(matches!(
            search.calc_path_edge_to_edge(1, 0, 4, NO_EDGE),
            Err(SearchError::EdgeNotIncident { edge: 0, node: 1, role: "start at" })
        ));
    }

    #[test]
    fn visited_budget_aborts() {
        let (ch, w) = line();
        let mut search = BidirectionalChSearch::new(&ch, &w, DijkstraStrategy).with_limits(
            SearchLimits {
                max_visited_nodes: Some(2),
                timeout: None,
            },
        );
        assert!(matches!(
            search.calc_path(0, 4),
            Err(SearchError::VisitedNodesExceeded { limit: 2, .. })
        ));

        search.set_limits(SearchLimits::default());
        assert!(search.calc_path(0, 4).unwrap().found);
    }

    #[test]
    fn zero_timeout_aborts() {
        let (ch, w) = line();
        let mut search = BidirectionalChSearch::new(&ch, &w, DijkstraStrategy).with_limits(
            SearchLimits {
                max_visited_nodes: None,
                timeout: Some(Duration::ZERO),
            },
        );
        let mut ctx = search.init(0, 0.0, 4, 0.0).unwrap();
        std::thread::sleep(Duration::from_millis(2));
        assert!(matches!(
            search.run(&mut ctx),
            Err(SearchError::Timeout { timeout_ms: 0, .. })
        ));
    }

    /// Records (old weight, new weight, old heap weight, new heap weight) of
    /// every decrease-key
    #[derive(Default)]
    struct Recording {
        updates: RefCell<Vec<(f64, f64, f64, f64)>>,
    }

    impl SearchStrategy for Recording {
        fn init(&mut self, _from: NodeId, _to: NodeId) {}

        fn heap_weight(&self, _node: NodeId, _dir: Direction, weight: f64) -> f64 {
            weight
        }

        fn name(&self) -> &'static str {
            "recording"
        }

        fn update_entry(
            &self,
            entry: &mut Entry,
            edge: &ChEdge,
            incoming_edge: EdgeId,
            weight: f64,
            parent: EntryId,
            dir: Direction,
        ) {
            let (old, old_heap) = (entry.weight, entry.heap_weight);
            DijkstraStrategy.update_entry(entry, edge, incoming_edge, weight, parent, dir);
            self.updates
                .borrow_mut()
                .push((old, entry.weight, old_heap, entry.heap_weight));
        }
    }

    #[test]
    fn decrease_key_never_increases_weights() {
        // 2 is contracted first, leaving shortcuts 0 -> 3 (weight 6) and
        // 1 -> 3 (weight 2) that both end on edge 2 -> 3. Forward finds the
        // expensive one first and improves the same label through node 1.
        let mut road = RoadGraph::new(coords(4));
        road.add_edge(0, 1, 100.0, 1.0).unwrap();
        road.add_edge(0, 2, 100.0, 5.0).unwrap();
        road.add_edge(1, 2, 100.0, 1.0).unwrap();
        road.add_edge(2, 3, 100.0, 1.0).unwrap();
        road.set_levels(vec![1, 2, 0, 3]).unwrap();
        let w = TurnCostWeighting::new(&road);
        let ch = contract(&road, &w);

        let mut search = BidirectionalChSearch::new(&ch, &w, Recording::default());
        let path = search.calc_path(0, 3).unwrap();
        assert_eq!(path.weight, 3.0);
        assert_eq!(path.nodes, vec![0, 1, 2, 3]);
        assert_eq!(path.edges, vec![0, 2, 3]);

        let updates = search.strategy().updates.borrow();
        assert!(!updates.is_empty());
        for &(old, new, old_heap, new_heap) in updates.iter() {
            assert!(new <= old);
            assert!(new_heap <= old_heap || new < old);
        }
    }
}
