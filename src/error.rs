//! Error types for butterfly-chsearch
//!
//! "No path" is not an error: it is reported through [`crate::ChPath::found`].

use thiserror::Error;

use crate::graph::{EdgeId, NodeId};

/// Errors raised by a shortest-path query.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchError {
    /// Source or target node is not part of the graph
    #[error("node {node} out of range (graph has {node_count} nodes)")]
    NodeOutOfRange { node: NodeId, node_count: usize },

    /// Edge restriction does not name an original edge
    #[error("edge {edge} is not an original edge (graph has {edge_count} original edges)")]
    InvalidEdge { edge: EdgeId, edge_count: usize },

    /// Edge restriction is not incident to the node it is attached to
    #[error("edge {edge} does not {role} node {node}")]
    EdgeNotIncident {
        edge: EdgeId,
        node: NodeId,
        role: &'static str,
    },

    /// Visited-node budget exhausted before the search finished
    #[error("search aborted after visiting {visited} nodes (limit {limit})")]
    VisitedNodesExceeded { visited: usize, limit: usize },

    /// Deadline passed before the search finished
    #[error("search aborted after {elapsed_ms}ms (timeout {timeout_ms}ms)")]
    Timeout { elapsed_ms: u64, timeout_ms: u64 },
}

/// Errors raised while building or loading a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("edge {edge} references node {node} but the graph has {node_count} nodes")]
    UnknownNode {
        edge: usize,
        node: NodeId,
        node_count: usize,
    },

    #[error("edge {edge} has invalid {field} {value}")]
    InvalidEdgeValue {
        edge: usize,
        field: &'static str,
        value: f64,
    },

    #[error("turn cost references edge {edge} but the graph has {edge_count} edges")]
    UnknownTurnEdge { edge: EdgeId, edge_count: usize },

    #[error("turn cost {from_edge} -> {to_edge} does not pass through node {via}")]
    TurnNotAtNode {
        from_edge: EdgeId,
        via: NodeId,
        to_edge: EdgeId,
    },

    #[error("invalid turn cost {value} for {from_edge} -> {to_edge}")]
    InvalidTurnCost {
        from_edge: EdgeId,
        to_edge: EdgeId,
        value: f64,
    },

    #[error("invalid u-turn cost {0}")]
    InvalidUTurnCost(f64),

    #[error("level table has {levels} entries but the graph has {node_count} nodes")]
    LevelCountMismatch { levels: usize, node_count: usize },

    #[error("graph file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("graph file parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
