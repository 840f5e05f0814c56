//! One direction of the bidirectional search

use priority_queue::PriorityQueue;
use rustc_hash::FxHashMap;

use crate::graph::{Direction, EdgeId, NodeId, NO_EDGE};

use super::entry::{Entry, EntryArena, EntryId, HeapKey};

/// ACTIVE until its stop predicate holds or its open set runs dry, then
/// STOPPED for the rest of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontierState {
    Active,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct Frontier {
    dir: Direction,
    arena: EntryArena,
    open: PriorityQueue<EntryId, HeapKey>,
    /// (node, incoming original edge) -> entry
    by_key: FxHashMap<(NodeId, EdgeId), EntryId>,
    /// All entries at a node, for meeting detection by the other direction
    by_node: FxHashMap<NodeId, Vec<EntryId>>,
    current: Option<EntryId>,
    /// Required first (forward) or last (backward) original edge
    anchor_edge: EdgeId,
    state: FrontierState,
    settled: usize,
}

impl Frontier {
    pub fn new(dir: Direction, anchor_edge: EdgeId) -> Self {
        Self {
            dir,
            arena: EntryArena::default(),
            open: PriorityQueue::new(),
            by_key: FxHashMap::default(),
            by_node: FxHashMap::default(),
            current: None,
            anchor_edge,
            state: FrontierState::Active,
            settled: 0,
        }
    }

    pub fn direction(&self) -> Direction {
        self.dir
    }

    pub fn state(&self) -> FrontierState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == FrontierState::Active
    }

    pub fn stop(&mut self) {
        self.state = FrontierState::Stopped;
    }

    pub fn anchor_edge(&self) -> EdgeId {
        self.anchor_edge
    }

    pub fn is_anchored(&self) -> bool {
        self.anchor_edge != NO_EDGE
    }

    /// Last entry popped for expansion
    pub fn current(&self) -> Option<EntryId> {
        self.current
    }

    /// Number of pops, re-opened entries counted again
    pub fn settled(&self) -> usize {
        self.settled
    }

    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    pub fn arena(&self) -> &EntryArena {
        &self.arena
    }

    #[inline(always)]
    pub fn entry(&self, id: EntryId) -> &Entry {
        self.arena.get(id)
    }

    pub(crate) fn entry_mut(&mut self, id: EntryId) -> &mut Entry {
        self.arena.get_mut(id)
    }

    pub fn lookup(&self, node: NodeId, incoming_edge: EdgeId) -> Option<EntryId> {
        self.by_key.get(&(node, incoming_edge)).copied()
    }

    pub fn entries_at(&self, node: NodeId) -> &[EntryId] {
        self.by_node.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Store a new entry and open it
    pub fn insert(&mut self, entry: Entry, seq: u64) -> EntryId {
        let key = (entry.node, entry.incoming_edge);
        debug_assert!(!self.by_key.contains_key(&key), "duplicate entry {:?}", key);
        let heap = HeapKey {
            weight: entry.heap_weight,
            seq,
        };
        let id = self.arena.push(entry);
        self.by_key.insert(key, id);
        self.by_node.entry(key.0).or_default().push(id);
        self.open.push(id, heap);
        id
    }

    /// Re-queue an entry after its weight decreased. Settled entries are
    /// opened again.
    pub fn reopen(&mut self, id: EntryId, seq: u64) {
        let heap = HeapKey {
            weight: self.arena.get(id).heap_weight,
            seq,
        };
        self.open.push(id, heap);
    }

    /// Smallest open entry and its heap weight
    pub fn peek(&self) -> Option<(EntryId, f64)> {
        self.open.peek().map(|(&id, key)| (id, key.weight))
    }

    pub fn pop(&mut self) -> Option<EntryId> {
        let (id, _) = self.open.pop()?;
        self.current = Some(id);
        self.settled += 1;
        Some(id)
    }
}
