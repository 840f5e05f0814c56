//! Butterfly-chsearch - shortest paths on Contraction Hierarchies
//!
//! Bidirectional, edge-based (turn-aware) A* search over a precomputed
//! Contraction Hierarchy. The search itself lives in [`search`]; the graph,
//! weighting and heuristic collaborators it consumes live in [`graph`],
//! [`weighting`] and [`approx`].
//!
//! ```no_run
//! use butterfly_chsearch::graph::GraphFile;
//! use butterfly_chsearch::search::AStarBidirectionEdgeCh;
//!
//! # fn main() -> anyhow::Result<()> {
//! let loaded = GraphFile::load("graph.json")?.build()?;
//! let mut search = AStarBidirectionEdgeCh::new(&loaded.ch, &loaded.weighting);
//! let path = search.calc_path(0, 4)?;
//! println!("{} via {:?}", path.weight, path.nodes);
//! # Ok(())
//! # }
//! ```

pub mod approx;
pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod graph;
pub mod search;
pub mod validate;
pub mod weighting;

pub use config::SearchConfig;
pub use error::{GraphError, SearchError};
pub use graph::{ChEdge, ChGraph, EdgeId, NodeId, RoadGraph, RoutingChGraph, NO_EDGE};
pub use search::{AStarBidirectionEdgeCh, BidirectionalChSearch, ChPath, Direction};
pub use weighting::{TurnCostWeighting, Weighting};
