//! Graph builders shared by the integration tests
#![allow(dead_code)]

use butterfly_chsearch::geo::{Coord, DistanceCalc};
use butterfly_chsearch::graph::{contract, LoadedGraph, NodeId, RoadGraph};
use butterfly_chsearch::TurnCostWeighting;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub fn finish(road: RoadGraph, weighting: TurnCostWeighting) -> LoadedGraph {
    let ch = contract(&road, &weighting);
    LoadedGraph { road, weighting, ch }
}

/// Edge length: the straight line plus a margin, so beeline estimates stay
/// admissible
pub fn length(coords: &[Coord], a: NodeId, b: NodeId) -> f64 {
    DistanceCalc::Plane.distance(coords[a as usize], coords[b as usize]) * 1.2 + 1.0
}

/// 0 - 1 - 2 - 3 - 4 along the equator, two-way unit edges, levels in node order
pub fn line() -> LoadedGraph {
    let coords: Vec<Coord> = (0..5).map(|i| Coord::new(0.0, i as f64 * 0.001)).collect();
    let mut road = RoadGraph::new(coords);
    for i in 0..4 {
        road.add_two_way(i, i + 1, 120.0, 1.0).unwrap();
    }
    road.set_levels(vec![0, 1, 2, 3, 4]).unwrap();
    let weighting = TurnCostWeighting::new(&road);
    finish(road, weighting)
}

/// Triangles 0-1-2 and 3-4-5 with no edge between them
pub fn two_triangles() -> LoadedGraph {
    let coords = vec![
        Coord::new(0.0, 0.0),
        Coord::new(0.0, 0.001),
        Coord::new(0.001, 0.0005),
        Coord::new(0.01, 0.0),
        Coord::new(0.01, 0.001),
        Coord::new(0.011, 0.0005),
    ];
    let mut road = RoadGraph::new(coords.clone());
    for (a, b) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)] {
        road.add_two_way(a, b, length(&coords, a, b), 1.0).unwrap();
    }
    road.set_levels(vec![2, 0, 1, 5, 3, 4]).unwrap();
    let weighting = TurnCostWeighting::new(&road);
    finish(road, weighting)
}

/// Diamond 0 -> {1, 2} -> 3, both branches of weight 3
pub fn diamond() -> LoadedGraph {
    let coords = vec![
        Coord::new(0.0, 0.0),
        Coord::new(0.001, 0.001),
        Coord::new(-0.001, 0.001),
        Coord::new(0.0, 0.002),
    ];
    let mut road = RoadGraph::new(coords.clone());
    road.add_two_way(0, 1, length(&coords, 0, 1), 1.0).unwrap();
    road.add_two_way(1, 3, length(&coords, 1, 3), 2.0).unwrap();
    road.add_two_way(0, 2, length(&coords, 0, 2), 2.0).unwrap();
    road.add_two_way(2, 3, length(&coords, 2, 3), 1.0).unwrap();
    road.set_levels(vec![1, 0, 2, 3]).unwrap();
    let weighting = TurnCostWeighting::new(&road);
    finish(road, weighting)
}

/// Random road graph on a small grid of jittered points.
///
/// Two-way streets between near neighbors plus some one-way streets, weights
/// from random speeds, random turn costs and forbidden turns, random levels.
pub fn random_graph(seed: u64, n: usize) -> LoadedGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let side = (n as f64).sqrt().ceil() as usize;
    let coords: Vec<Coord> = (0..n)
        .map(|i| {
            let (row, col) = (i / side, i % side);
            Coord::new(
                row as f64 * 0.001 + rng.random_range(0.0..0.0004),
                col as f64 * 0.001 + rng.random_range(0.0..0.0004),
            )
        })
        .collect();

    let mut road = RoadGraph::new(coords.clone());
    let add = |road: &mut RoadGraph, rng: &mut StdRng, a: usize, b: usize| {
        let (a, b) = (a as NodeId, b as NodeId);
        let distance = length(&coords, a, b);
        let speed = rng.random_range(5.0..30.0);
        if rng.random_bool(0.8) {
            road.add_two_way(a, b, distance, distance / speed).unwrap();
        } else {
            road.add_edge(a, b, distance, distance / speed).unwrap();
        }
    };
    for i in 0..n {
        let (row, col) = (i / side, i % side);
        if col + 1 < side && i + 1 < n && rng.random_bool(0.85) {
            add(&mut road, &mut rng, i, i + 1);
        }
        if row + 1 < side && i + side < n && rng.random_bool(0.85) {
            add(&mut road, &mut rng, i, i + side);
        }
        if col + 1 < side && i + side + 1 < n && rng.random_bool(0.15) {
            add(&mut road, &mut rng, i, i + side + 1);
        }
    }

    let mut levels: Vec<u32> = (0..n as u32).collect();
    levels.shuffle(&mut rng);
    road.set_levels(levels).unwrap();

    let u_turn_cost = if rng.random_bool(0.5) {
        f64::INFINITY
    } else {
        rng.random_range(0.0..20.0)
    };
    let mut weighting = TurnCostWeighting::new(&road).with_u_turn_cost(u_turn_cost);
    for via in 0..n as NodeId {
        let ins: Vec<_> = road.in_edges(via).map(|e| e.id).collect();
        let outs: Vec<_> = road.out_edges(via).map(|e| e.id).collect();
        for &i in &ins {
            for &o in &outs {
                if rng.random_bool(0.1) {
                    weighting.restrict_turn(i, via, o).unwrap();
                } else if rng.random_bool(0.2) {
                    weighting
                        .set_turn_cost(i, via, o, rng.random_range(0.0..15.0))
                        .unwrap();
                }
            }
        }
    }

    finish(road, weighting)
}
