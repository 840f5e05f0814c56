//! Randomized checks against Dijkstra on the uncontracted graph

mod common;

use butterfly_chsearch::approx::{BalancedApproximator, BeelineApproximator, WeightApproximator};
use butterfly_chsearch::graph::{EdgeId, NodeId, RoadGraph, RoutingChGraph};
use butterfly_chsearch::search::{
    AStarBidirectionEdgeCh, BidirectionalChSearch, DijkstraStrategy, SearchLimits,
};
use butterfly_chsearch::validate::{path_weight, reference_dijkstra, validate_random_queries};
use butterfly_chsearch::{Direction, SearchConfig, SearchError, Weighting, NO_EDGE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn close(a: f64, b: f64) -> bool {
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    (a - b).abs() <= 1e-6 * a.abs().max(1.0)
}

fn random_pairs(rng: &mut StdRng, n: usize, count: usize) -> Vec<(NodeId, NodeId)> {
    (0..count)
        .map(|_| {
            (
                rng.random_range(0..n as NodeId),
                rng.random_range(0..n as NodeId),
            )
        })
        .collect()
}

#[test]
fn matches_reference_dijkstra_on_random_graphs() {
    for seed in 0..8 {
        let g = common::random_graph(seed, 36);
        let mut rng = StdRng::seed_from_u64(seed + 100);
        let mut astar = AStarBidirectionEdgeCh::new(&g.ch, &g.weighting);
        let mut dijkstra = BidirectionalChSearch::new(&g.ch, &g.weighting, DijkstraStrategy);

        for (s, t) in random_pairs(&mut rng, 36, 40) {
            let expected = reference_dijkstra(&g.road, &g.weighting, s, NO_EDGE, t, NO_EDGE);
            let a = astar.calc_path(s, t).unwrap();
            let d = dijkstra.calc_path(s, t).unwrap();
            assert!(close(a.weight, expected), "seed {} {} -> {}: {} vs {}", seed, s, t, a.weight, expected);
            assert!(close(d.weight, expected), "seed {} {} -> {}: {} vs {}", seed, s, t, d.weight, expected);
            assert_eq!(a.found, expected.is_finite());
        }
    }
}

#[test]
fn heuristic_toggle_keeps_weights() {
    for seed in 10..14 {
        let g = common::random_graph(seed, 49);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut plain = AStarBidirectionEdgeCh::new(&g.ch, &g.weighting);
        let mut guided = AStarBidirectionEdgeCh::new(&g.ch, &g.weighting);
        guided.set_use_heuristic_for_node_order(true);

        for (s, t) in random_pairs(&mut rng, 49, 30) {
            let p = plain.calc_path(s, t).unwrap();
            let q = guided.calc_path(s, t).unwrap();
            assert!(close(p.weight, q.weight), "seed {} {} -> {}: {} vs {}", seed, s, t, p.weight, q.weight);
        }
    }
}

#[test]
fn unpacked_paths_are_consistent() {
    let g = common::random_graph(21, 64);
    let mut rng = StdRng::seed_from_u64(21);
    let mut search = AStarBidirectionEdgeCh::new(&g.ch, &g.weighting);

    for (s, t) in random_pairs(&mut rng, 64, 60) {
        let path = search.calc_path(s, t).unwrap();
        if !path.found {
            continue;
        }
        assert_eq!(path.nodes.first(), Some(&s));
        assert_eq!(path.nodes.last(), Some(&t));
        assert_eq!(path.nodes.len(), path.edges.len() + 1);
        for (i, &e) in path.edges.iter().enumerate() {
            let edge = g.road.edge(e);
            assert_eq!(edge.base, path.nodes[i]);
            assert_eq!(edge.adj, path.nodes[i + 1]);
        }
        let recomputed = path_weight(&g.road, &g.weighting, &path);
        assert!(close(recomputed, path.weight), "{} -> {}: {} vs {}", s, t, recomputed, path.weight);
    }
}

fn random_out_edge(road: &RoadGraph, rng: &mut StdRng, node: NodeId) -> EdgeId {
    let outs: Vec<EdgeId> = road.out_edges(node).map(|e| e.id).collect();
    if outs.is_empty() || rng.random_bool(0.2) {
        NO_EDGE
    } else {
        outs[rng.random_range(0..outs.len())]
    }
}

fn random_in_edge(road: &RoadGraph, rng: &mut StdRng, node: NodeId) -> EdgeId {
    let ins: Vec<EdgeId> = road.in_edges(node).map(|e| e.id).collect();
    if ins.is_empty() || rng.random_bool(0.2) {
        NO_EDGE
    } else {
        ins[rng.random_range(0..ins.len())]
    }
}

#[test]
fn edge_to_edge_matches_reference() {
    for seed in 30..36 {
        let g = common::random_graph(seed, 36);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut search = AStarBidirectionEdgeCh::new(&g.ch, &g.weighting);

        for (s, t) in random_pairs(&mut rng, 36, 40) {
            let out_edge = random_out_edge(&g.road, &mut rng, s);
            let in_edge = random_in_edge(&g.road, &mut rng, t);
            let expected = reference_dijkstra(&g.road, &g.weighting, s, out_edge, t, in_edge);
            let path = search.calc_path_edge_to_edge(s, out_edge, t, in_edge).unwrap();
            assert!(
                close(path.weight, expected),
                "seed {} {}[{}] -> {}[{}]: {} vs {}",
                seed, s, out_edge, t, in_edge, path.weight, expected
            );
            if path.found && out_edge != NO_EDGE {
                assert_eq!(path.edges.first(), Some(&out_edge));
            }
            if path.found && in_edge != NO_EDGE {
                assert_eq!(path.edges.last(), Some(&in_edge));
            }
        }
    }
}

/// Reference distance from `from` to every node and from every node to `to`
fn all_distances(road: &RoadGraph, w: &impl Weighting, from: NodeId, to: NodeId) -> Vec<(f64, f64)> {
    (0..road.node_count() as NodeId)
        .map(|n| {
            (
                reference_dijkstra(road, w, from, NO_EDGE, n, NO_EDGE),
                reference_dijkstra(road, w, n, NO_EDGE, to, NO_EDGE),
            )
        })
        .collect()
}

#[test]
fn balanced_approximation_is_admissible() {
    let g = common::random_graph(5, 25);
    let mut rng = StdRng::seed_from_u64(5);

    for (s, t) in random_pairs(&mut rng, 25, 10) {
        let beeline = BeelineApproximator::new(g.ch.coordinates(), g.weighting.min_weight_per_distance());
        let mut balanced = BalancedApproximator::new(Box::new(beeline.clone()));
        balanced.set_from_to(s, t);

        for (n, (d_sn, d_nt)) in all_distances(&g.road, &g.weighting, s, t).into_iter().enumerate() {
            let n = n as NodeId;
            let h_fwd = balanced.approximate(n, Direction::Forward);
            let h_bwd = balanced.approximate(n, Direction::Backward);
            let eps = 1e-9;
            assert!(h_fwd <= d_nt + eps, "forward estimate {} > {} at {}", h_fwd, d_nt, n);
            assert!(h_bwd <= d_sn + eps, "backward estimate {} > {} at {}", h_bwd, d_sn, n);
            assert!(h_fwd + h_bwd <= d_sn + d_nt + eps);
            assert!(beeline.approximate(n, t) <= d_nt + eps);
        }
    }
}

#[test]
fn visited_budget_is_enforced() {
    let g = common::random_graph(3, 100);
    let mut search = AStarBidirectionEdgeCh::new(&g.ch, &g.weighting);

    let mut found = None;
    for (s, t) in (0..100).map(|s| (s, 99 - s)) {
        let path = search.calc_path(s, t).unwrap();
        if path.visited_nodes() > 3 {
            found = Some((s, t));
            break;
        }
    }
    let (s, t) = found.expect("a query visiting more than three nodes");

    search.set_limits(SearchLimits {
        max_visited_nodes: Some(3),
        timeout: None,
    });
    assert!(matches!(
        search.calc_path(s, t),
        Err(SearchError::VisitedNodesExceeded { limit: 3, .. })
    ));
}

#[test]
fn validation_harness_passes() {
    let g = common::random_graph(77, 49);
    let config = SearchConfig {
        use_heuristic_for_node_order: true,
        ..SearchConfig::default()
    };
    let result = validate_random_queries(&g.road, &g.weighting, &g.ch, &config, 200, 7);
    assert_eq!(result.n_tests, 200);
    assert!(result.is_valid(), "{:?}", result.errors);
}
