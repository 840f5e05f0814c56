//! Search labels and their per-direction arena

use std::cmp::Ordering;

use crate::graph::{EdgeId, NodeId};

/// Handle of an entry inside one direction's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u32);

impl EntryId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One (node, incoming edge) state discovered by a direction.
///
/// `incoming_edge` is the original edge at the junction: the last original
/// edge of `edge` forward, the first one backward. Start entries have
/// `edge == incoming_edge == NO_EDGE` and no parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub node: NodeId,
    pub edge: EdgeId,
    pub incoming_edge: EdgeId,
    pub weight: f64,
    pub heap_weight: f64,
    pub parent: Option<EntryId>,
}

impl Entry {
    pub fn is_start(&self) -> bool {
        self.parent.is_none()
    }
}

/// Append-only entry storage. Entries are updated in place and dropped with
/// the arena.
#[derive(Debug, Default, Clone)]
pub struct EntryArena {
    entries: Vec<Entry>,
}

impl EntryArena {
    pub fn push(&mut self, entry: Entry) -> EntryId {
        let id = EntryId(self.entries.len() as u32);
        self.entries.push(entry);
        id
    }

    #[inline(always)]
    pub fn get(&self, id: EntryId) -> &Entry {
        &self.entries[id.index()]
    }

    #[inline(always)]
    pub fn get_mut(&mut self, id: EntryId) -> &mut Entry {
        &mut self.entries[id.index()]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (EntryId(i as u32), e))
    }

    /// Walk parent links from `id` back to the start entry (inclusive)
    pub fn chain(&self, id: EntryId) -> Chain<'_> {
        Chain {
            arena: self,
            next: Some(id),
            remaining: self.entries.len(),
        }
    }
}

pub struct Chain<'a> {
    arena: &'a EntryArena,
    next: Option<EntryId>,
    remaining: usize,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        // A chain longer than the arena means a parent cycle
        assert!(self.remaining > 0, "parent cycle through entry {:?}", id);
        self.remaining -= 1;
        let entry = self.arena.get(id);
        self.next = entry.parent;
        Some(entry)
    }
}

/// Priority of an open entry.
///
/// `PriorityQueue` pops the greatest priority, so the order is reversed:
/// lower weight first, then lower sequence number (FIFO among ties).
#[derive(Debug, Clone, Copy)]
pub struct HeapKey {
    pub weight: f64,
    pub seq: u64,
}

impl Ord for HeapKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for HeapKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapKey {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NO_EDGE;
    use priority_queue::PriorityQueue;

    fn entry(node: NodeId, weight: f64, parent: Option<EntryId>) -> Entry {
        Entry {
            node,
            edge: NO_EDGE,
            incoming_edge: NO_EDGE,
            weight,
            heap_weight: weight,
            parent,
        }
    }

    #[test]
    fn heap_key_orders_by_weight_then_fifo() {
        let mut pq: PriorityQueue<u32, HeapKey> = PriorityQueue::new();
        pq.push(0, HeapKey { weight: 2.0, seq: 0 });
        pq.push(1, HeapKey { weight: 1.0, seq: 1 });
        pq.push(2, HeapKey { weight: 1.0, seq: 2 });
        pq.push(3, HeapKey { weight: 0.5, seq: 3 });

        let order: Vec<u32> = std::iter::from_fn(|| pq.pop().map(|(i, _)| i)).collect();
        assert_eq!(order, vec![3, 1, 2, 0]);
    }

    #[test]
    fn pushing_existing_item_changes_its_priority() {
        let mut pq: PriorityQueue<u32, HeapKey> = PriorityQueue::new();
        pq.push(0, HeapKey { weight: 5.0, seq: 0 });
        pq.push(1, HeapKey { weight: 3.0, seq: 1 });
        pq.push(0, HeapKey { weight: 1.0, seq: 2 });

        assert_eq!(pq.len(), 2);
        assert_eq!(pq.pop().map(|(i, k)| (i, k.weight)), Some((0, 1.0)));
    }

    #[test]
    fn chain_walks_back_to_start() {
        let mut arena = EntryArena::default();
        let a = arena.push(entry(0, 0.0, None));
        let b = arena.push(entry(1, 1.0, Some(a)));
        let c = arena.push(entry(2, 2.0, Some(b)));

        let nodes: Vec<NodeId> = arena.chain(c).map(|e| e.node).collect();
        assert_eq!(nodes, vec![2, 1, 0]);
        assert!(arena.get(a).is_start());
        assert_eq!(arena.len(), 3);
    }

    #[test]
    #[should_panic(expected = "parent cycle")]
    fn chain_detects_cycles() {
        let mut arena = EntryArena::default();
        let a = arena.push(entry(0, 0.0, None));
        let b = arena.push(entry(1, 1.0, Some(a)));
        arena.get_mut(a).parent = Some(b);
        let _ = arena.chain(b).count();
    }
}
