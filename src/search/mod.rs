//! Bidirectional edge-based search over a Contraction Hierarchy
//!
//! [`BidirectionalChSearch`] is the driver; a [`SearchStrategy`] decides
//! entry priorities and stop conditions. [`AStarBidirectionEdgeCh`] is the
//! driver with the A* strategy and a beeline approximator.

mod astar;
mod bidirectional;
mod entry;
mod frontier;
mod path;
mod strategy;

pub use astar::AStarBidirectionEdgeCh;
pub use bidirectional::{BidirectionalChSearch, QueryContext, SearchLimits};
pub use entry::{Entry, EntryArena, EntryId, HeapKey};
pub use frontier::{Frontier, FrontierState};
pub use path::ChPath;
pub use strategy::{AStarStrategy, DijkstraStrategy, SearchStrategy};

pub use crate::graph::Direction;
