//! JSON graph file
//!
//! ```json
//! {
//!   "nodes": [{ "lat": 43.73, "lon": 7.42, "level": 0 }, ...],
//!   "edges": [{ "from": 0, "to": 1, "distance": 120.0, "weight": 9.5 }, ...],
//!   "turn_costs": [{ "from_edge": 0, "via": 1, "to_edge": 3, "cost": null }],
//!   "u_turn_cost": 30.0
//! }
//! ```
//!
//! A `null` turn cost forbids the turn. Without `u_turn_cost` u-turns are
//! forbidden. Missing levels default to the node order.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::GraphError;
use crate::geo::Coord;
use crate::weighting::TurnCostWeighting;

use super::{contract, ChGraph, EdgeId, NodeId, RoadGraph};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: NodeId,
    pub to: NodeId,
    pub distance: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnCostRecord {
    pub from_edge: EdgeId,
    pub via: NodeId,
    pub to_edge: EdgeId,
    /// `None` forbids the turn
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphFile {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    #[serde(default)]
    pub turn_costs: Vec<TurnCostRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub u_turn_cost: Option<f64>,
}

/// Everything a query needs, built from one graph file
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    pub road: RoadGraph,
    pub weighting: TurnCostWeighting,
    pub ch: ChGraph,
}

impl GraphFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn road_graph(&self) -> Result<RoadGraph, GraphError> {
        let coords = self
            .nodes
            .iter()
            .map(|n| Coord::new(n.lat, n.lon))
            .collect();
        let mut road = RoadGraph::new(coords);
        for e in &self.edges {
            road.add_edge(e.from, e.to, e.distance, e.weight)?;
        }
        if self.nodes.iter().any(|n| n.level.is_some()) {
            let levels = self
                .nodes
                .iter()
                .enumerate()
                .map(|(i, n)| n.level.unwrap_or(i as u32))
                .collect();
            road.set_levels(levels)?;
        }
        Ok(road)
    }

    pub fn weighting(&self, road: &RoadGraph) -> Result<TurnCostWeighting, GraphError> {
        let mut weighting = TurnCostWeighting::new(road);
        if let Some(cost) = self.u_turn_cost {
            if cost.is_nan() || cost < 0.0 {
                return Err(GraphError::InvalidUTurnCost(cost));
            }
            weighting = weighting.with_u_turn_cost(cost);
        }
        for t in &self.turn_costs {
            weighting.set_turn_cost(
                t.from_edge,
                t.via,
                t.to_edge,
                t.cost.unwrap_or(f64::INFINITY),
            )?;
        }
        Ok(weighting)
    }

    /// Validate, build the road graph and weighting, and contract
    pub fn build(&self) -> Result<LoadedGraph, GraphError> {
        let road = self.road_graph()?;
        let weighting = self.weighting(&road)?;
        let ch = contract(&road, &weighting);
        Ok(LoadedGraph { road, weighting, ch })
    }
}
