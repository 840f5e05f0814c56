//! Validation of hierarchy queries
//!
//! Compares query weights against an edge-based Dijkstra on the original
//! road graph, which sees the same turn costs but no hierarchy.

use priority_queue::PriorityQueue;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::graph::{ChGraph, EdgeId, NodeId, RoadGraph, NO_EDGE};
use crate::search::{AStarBidirectionEdgeCh, ChPath, HeapKey};
use crate::weighting::Weighting;

/// Ground truth: Dijkstra over original edges.
///
/// The path must leave `from` on `source_out_edge` and reach `to` on
/// `target_in_edge` when those are not [`NO_EDGE`]. Returns `f64::INFINITY`
/// when no such path exists.
pub fn reference_dijkstra<W: Weighting>(
    road: &RoadGraph,
    weighting: &W,
    from: NodeId,
    source_out_edge: EdgeId,
    to: NodeId,
    target_in_edge: EdgeId,
) -> f64 {
    if from == to && source_out_edge == NO_EDGE && target_in_edge == NO_EDGE {
        return 0.0;
    }

    // Label per original edge: cheapest cost of a path ending with it
    let mut dist = vec![f64::INFINITY; road.edge_count()];
    let mut heap: PriorityQueue<EdgeId, HeapKey> = PriorityQueue::new();
    let mut seq = 0u64;

    for e in road.out_edges(from) {
        if source_out_edge != NO_EDGE && e.id != source_out_edge {
            continue;
        }
        if e.weight < dist[e.id as usize] {
            dist[e.id as usize] = e.weight;
            seq += 1;
            heap.push(
                e.id,
                HeapKey {
                    weight: e.weight,
                    seq,
                },
            );
        }
    }

    while let Some((id, key)) = heap.pop() {
        let edge = road.edge(id);
        if edge.adj == to && (target_in_edge == NO_EDGE || id == target_in_edge) {
            return key.weight;
        }

        for next in road.out_edges(edge.adj) {
            let turn = weighting.turn_weight(id, edge.adj, next.id);
            if !turn.is_finite() {
                continue;
            }
            let d = key.weight + turn + next.weight;
            if d < dist[next.id as usize] {
                dist[next.id as usize] = d;
                seq += 1;
                heap.push(next.id, HeapKey { weight: d, seq });
            }
        }
    }

    f64::INFINITY
}

/// Weight of a path recomputed from its original edges and the turns
/// between them
pub fn path_weight<W: Weighting>(road: &RoadGraph, weighting: &W, path: &ChPath) -> f64 {
    let mut weight = 0.0;
    let mut prev: Option<EdgeId> = None;
    for &id in &path.edges {
        let edge = road.edge(id);
        if let Some(p) = prev {
            weight += weighting.turn_weight(p, edge.base, id);
        }
        weight += edge.weight;
        prev = Some(id);
    }
    weight
}

fn same_weight(a: f64, b: f64) -> bool {
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    (a - b).abs() <= 1e-6 * a.abs().max(1.0)
}

/// Run `n_tests` random node-to-node queries and compare each against
/// [`reference_dijkstra`]. Queries run in parallel, one search per worker.
pub fn validate_random_queries<W: Weighting + Sync>(
    road: &RoadGraph,
    weighting: &W,
    ch: &ChGraph,
    config: &SearchConfig,
    n_tests: usize,
    seed: u64,
) -> ValidationResult {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let n_nodes = road.node_count() as NodeId;
    let queries: Vec<(NodeId, NodeId)> = if n_nodes == 0 {
        Vec::new()
    } else {
        (0..n_tests)
            .map(|_| (rng.random_range(0..n_nodes), rng.random_range(0..n_nodes)))
            .collect()
    };

    tracing::info!(queries = queries.len(), seed, "validating random queries");

    let outcomes: Vec<QueryOutcome> = queries
        .par_iter()
        .map_init(
            || AStarBidirectionEdgeCh::with_config(ch, weighting, config),
            |search, &(source, target)| {
                let expected = reference_dijkstra(road, weighting, source, NO_EDGE, target, NO_EDGE);
                let result = search.calc_path(source, target);
                check_query(road, weighting, source, target, expected, result)
            },
        )
        .collect();

    let mut result = ValidationResult {
        n_tests: outcomes.len(),
        ..ValidationResult::default()
    };
    for outcome in outcomes {
        match outcome {
            QueryOutcome::Correct { reachable } => {
                result.correct += 1;
                if !reachable {
                    result.unreachable_both += 1;
                }
            }
            QueryOutcome::Incorrect(err) => {
                result.incorrect += 1;
                if result.errors.len() < 10 {
                    result.errors.push(err);
                }
            }
        }
    }
    result
}

enum QueryOutcome {
    Correct { reachable: bool },
    Incorrect(ValidationError),
}

fn check_query<W: Weighting>(
    road: &RoadGraph,
    weighting: &W,
    source: NodeId,
    target: NodeId,
    dijkstra_weight: f64,
    result: Result<ChPath, SearchError>,
) -> QueryOutcome {
    let incorrect = |ch_weight: f64, error: Option<String>| {
        QueryOutcome::Incorrect(ValidationError {
            source,
            target,
            dijkstra_weight,
            ch_weight,
            error,
        })
    };

    let path = match result {
        Ok(path) => path,
        Err(e) => return incorrect(f64::NAN, Some(e.to_string())),
    };
    if !same_weight(dijkstra_weight, path.weight) {
        return incorrect(path.weight, None);
    }
    if path.found {
        let recomputed = path_weight(road, weighting, &path);
        if !same_weight(recomputed, path.weight) {
            return incorrect(
                path.weight,
                Some(format!("unpacked path weighs {}", recomputed)),
            );
        }
    }
    QueryOutcome::Correct {
        reachable: path.found,
    }
}

#[derive(Debug, Default)]
pub struct ValidationResult {
    pub n_tests: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unreachable_both: usize,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn print(&self) {
        let pct = |n: usize| {
            if self.n_tests == 0 {
                0.0
            } else {
                n as f64 * 100.0 / self.n_tests as f64
            }
        };
        println!("\n=== VALIDATION RESULTS ===");
        println!("  Total tests:     {}", self.n_tests);
        println!("  Correct:         {} ({:.2}%)", self.correct, pct(self.correct));
        println!("  Incorrect:       {} ({:.2}%)", self.incorrect, pct(self.incorrect));
        println!("  Unreachable:     {}", self.unreachable_both);

        if !self.errors.is_empty() {
            println!("\n  Sample errors:");
            for err in &self.errors {
                match &err.error {
                    Some(msg) => println!(
                        "    {} → {}: Dijkstra={}, CH={} ({})",
                        err.source, err.target, err.dijkstra_weight, err.ch_weight, msg
                    ),
                    None => println!(
                        "    {} → {}: Dijkstra={}, CH={}",
                        err.source, err.target, err.dijkstra_weight, err.ch_weight
                    ),
                }
            }
        }

        if self.is_valid() {
            println!("\n  ✅ ALL TESTS PASSED!");
        } else {
            println!("\n  ❌ VALIDATION FAILED!");
        }
    }

    pub fn is_valid(&self) -> bool {
        self.incorrect == 0
    }
}

#[derive(Debug)]
pub struct ValidationError {
    pub source: NodeId,
    pub target: NodeId,
    pub dijkstra_weight: f64,
    pub ch_weight: f64,
    pub error: Option<String>,
}
