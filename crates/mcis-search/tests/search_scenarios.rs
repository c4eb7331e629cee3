//! End-to-end scenarios for the search dispatcher and both solvers,
//! driven through the public API with graphs built by hand and by the
//! workload factories.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use mcis_core::DataflowGraph;
use mcis_search::{Algorithm, McisSearch, SearchConfig, SearchError};
use mcis_workloads::mvm_graph;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn triangle(ids: [&str; 3]) -> DataflowGraph {
    let mut g = DataflowGraph::new();
    g.add_node_set(ids).unwrap();
    g.add_edge(ids[0], ids[1], 1).unwrap();
    g.add_edge(ids[1], ids[2], 1).unwrap();
    g.add_edge(ids[0], ids[2], 1).unwrap();
    g
}

fn star(leaves: usize) -> DataflowGraph {
    let mut g = DataflowGraph::new();
    g.add_node("center").unwrap();
    for i in 1..=leaves {
        let leaf = format!("leaf{}", i);
        g.add_node(&leaf).unwrap();
        g.add_edge("center", &leaf, 1).unwrap();
    }
    g
}

/// Splits an output node id back into its per-input components. Input
/// ids in these tests never contain underscores.
fn components(joined: &str, k: usize) -> Vec<&str> {
    let parts: Vec<&str> = joined.split('_').collect();
    assert_eq!(parts.len(), k, "output id {} should have {} parts", joined, k);
    parts
}

/// Directed BFS reachability over the public adjacency API.
fn reachable(g: &DataflowGraph, from: &str, to: &str) -> bool {
    if from == to {
        return true;
    }
    let mut queue = VecDeque::from([from.to_string()]);
    let mut seen = HashSet::from([from.to_string()]);
    while let Some(current) = queue.pop_front() {
        for (child, _) in g.children(&current).unwrap() {
            if child == to {
                return true;
            }
            if seen.insert(child.to_string()) {
                queue.push_back(child.to_string());
            }
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Bron-Kerbosch scenarios
// ---------------------------------------------------------------------------

#[test]
fn identical_triangles_yield_three_node_results() {
    let g1 = triangle(["A", "B", "C"]);
    let g2 = triangle(["A", "B", "C"]);
    let search = McisSearch::new();

    let results = search
        .run(&[&g1, &g2], Algorithm::BronKerboschSerial, None)
        .unwrap();
    assert!(!results.is_empty());
    for result in &results {
        assert_eq!(result.num_nodes(), 3, "MCIS of identical triangles");
    }
}

#[test]
fn empty_inputs_return_empty_graph_error() {
    let empty1 = DataflowGraph::new();
    let empty2 = DataflowGraph::new();
    let search = McisSearch::new();
    assert_eq!(
        search.run(&[&empty1, &empty2], Algorithm::BronKerboschSerial, None),
        Err(SearchError::EmptyGraph)
    );
}

#[test]
fn single_node_graphs_match_on_one_node() {
    let mut g1 = DataflowGraph::new();
    g1.add_node("A").unwrap();
    let mut g2 = DataflowGraph::new();
    g2.add_node("B").unwrap();

    let search = McisSearch::new();
    let results = search
        .run(&[&g1, &g2], Algorithm::BronKerboschSerial, None)
        .unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0].num_nodes(), 1);
    assert!(results[0].contains_node("A_B"));
}

#[test]
fn star_graphs_share_center_plus_three_leaves() {
    let star3 = star(3);
    let star5 = star(5);
    let search = McisSearch::new();

    let results = search
        .run(&[&star3, &star5], Algorithm::BronKerboschSerial, None)
        .unwrap();
    assert!(!results.is_empty());
    assert!(
        results[0].num_nodes() >= 4,
        "expected at least center + 3 leaves, got {}",
        results[0].num_nodes()
    );
}

#[test]
fn all_results_have_the_same_maximum_size() {
    let g1 = triangle(["A", "B", "C"]);
    let g2 = triangle(["X", "Y", "Z"]);
    let search = McisSearch::new();

    let results = search
        .run(&[&g1, &g2], Algorithm::BronKerboschSerial, None)
        .unwrap();
    assert!(!results.is_empty());
    let size = results[0].num_nodes();
    assert!(results.iter().all(|r| r.num_nodes() == size));
}

#[test]
fn output_edges_exist_in_every_input() {
    let g1 = triangle(["A", "B", "C"]);
    let mut g2 = triangle(["A", "B", "C"]);
    g2.add_node("D").unwrap();
    g2.add_edge("C", "D", 1).unwrap();
    let search = McisSearch::new();

    let results = search
        .run(&[&g1, &g2], Algorithm::BronKerboschSerial, None)
        .unwrap();
    for result in &results {
        let ids: Vec<String> = result.node_ids().map(str::to_string).collect();
        for from in &ids {
            for (to, _) in result.children(from).unwrap() {
                let from_parts = components(from, 2);
                let to_parts = components(to, 2);
                assert!(g1.has_edge(from_parts[0], to_parts[0]));
                assert!(g2.has_edge(from_parts[1], to_parts[1]));
            }
        }
    }
}

#[test]
fn clique_projection_is_uniform_across_coordinates() {
    let g1 = star(3);
    let g2 = star(5);
    let search = McisSearch::new();

    let results = search
        .run(&[&g1, &g2], Algorithm::BronKerboschSerial, None)
        .unwrap();
    let graphs = [&g1, &g2];
    for result in &results {
        let ids: Vec<String> = result.node_ids().map(str::to_string).collect();
        for a in &ids {
            for b in &ids {
                if a == b {
                    continue;
                }
                let pa = components(a, 2);
                let pb = components(b, 2);
                let per_coordinate: Vec<bool> = graphs
                    .iter()
                    .enumerate()
                    .map(|(i, g)| {
                        pa[i] != pb[i]
                            && (g.has_edge(pa[i], pb[i]) || g.has_edge(pb[i], pa[i]))
                    })
                    .collect();
                assert!(
                    per_coordinate.iter().all(|&e| e) || per_coordinate.iter().all(|&e| !e),
                    "clique pair {} / {} is not modular",
                    a,
                    b
                );
            }
        }
    }
}

#[test]
fn three_way_search_works() {
    let g1 = triangle(["A", "B", "C"]);
    let g2 = triangle(["P", "Q", "R"]);
    let g3 = triangle(["X", "Y", "Z"]);
    let search = McisSearch::new();

    let results = search
        .run(&[&g1, &g2, &g3], Algorithm::BronKerboschSerial, None)
        .unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0].num_nodes(), 3);
    let id: Vec<String> = results[0].node_ids().map(str::to_string).collect();
    assert_eq!(components(&id[0], 3).len(), 3);
}

#[test]
fn workload_graphs_share_structure() {
    let mvm_2x2 = mvm_graph(2, 2).unwrap();
    let mvm_3x2 = mvm_graph(3, 2).unwrap();
    // 12 * 17 = 204 product vertices, within the default budget.
    let search = McisSearch::new();

    let results = search
        .run(&[&mvm_2x2, &mvm_3x2], Algorithm::BronKerboschSerial, None)
        .unwrap();
    assert!(!results.is_empty());
    assert!(results[0].num_nodes() >= 2);
}

#[test]
fn search_is_deterministic() {
    let g1 = triangle(["A", "B", "C"]);
    let g2 = star(3);
    let search = McisSearch::new();

    let first = search
        .run(&[&g1, &g2], Algorithm::BronKerboschSerial, None)
        .unwrap();
    let second = search
        .run(&[&g1, &g2], Algorithm::BronKerboschSerial, None)
        .unwrap();
    assert_eq!(first, second);
    let first_ids: Vec<Vec<String>> = first
        .iter()
        .map(|g| g.node_ids().map(str::to_string).collect())
        .collect();
    let second_ids: Vec<Vec<String>> = second
        .iter()
        .map(|g| g.node_ids().map(str::to_string).collect())
        .collect();
    assert_eq!(first_ids, second_ids);
}

// ---------------------------------------------------------------------------
// Oversize fallback
// ---------------------------------------------------------------------------

#[test]
fn over_budget_inputs_fall_back_to_a_heuristic_result() {
    let g1 = star(9); // 10 nodes
    let g2 = star(9);
    let config = SearchConfig {
        node_budget: 50, // 100 product vertices exceed this
        ..SearchConfig::default()
    };
    let search = McisSearch::with_config(config);

    let results = search
        .run(&[&g1, &g2], Algorithm::BronKerboschSerial, None)
        .unwrap();
    assert_eq!(results.len(), 1);
    // Best-effort only: assert non-emptiness, never the contents.
    assert!(results[0].num_nodes() > 0);
}

#[test]
fn timeout_still_produces_a_result() {
    let g1 = star(5);
    let g2 = star(5);
    let config = SearchConfig {
        timeout: Duration::from_millis(0),
        ..SearchConfig::default()
    };
    let search = McisSearch::with_config(config);

    let results = search
        .run(&[&g1, &g2], Algorithm::BronKerboschSerial, None)
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].num_nodes(), 1, "singleton fallback");
}

// ---------------------------------------------------------------------------
// KPT scenarios
// ---------------------------------------------------------------------------

#[test]
fn kpt_respects_reachability_conflicts() {
    // G1 = A1 -> B1, G2 = {A2, B2} with no edge: every pairing of A1
    // and B1 conflicts through G1, so the matching stays small.
    let mut g1 = DataflowGraph::new();
    g1.add_node_set(["A1", "B1"]).unwrap();
    g1.add_edge("A1", "B1", 1).unwrap();
    let mut g2 = DataflowGraph::new();
    g2.add_node_set(["A2", "B2"]).unwrap();

    let search = McisSearch::new();
    let results = search.run(&[&g1, &g2], Algorithm::Kpt, None).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].num_nodes() <= 2);
    assert!(results[0].num_nodes() >= 1);
}

#[test]
fn kpt_matching_is_conflict_free() {
    let mut g1 = DataflowGraph::new();
    g1.add_node_set(["A", "B", "C", "D"]).unwrap();
    g1.add_edge("A", "B", 1).unwrap();
    g1.add_edge("C", "D", 1).unwrap();
    let mut g2 = DataflowGraph::new();
    g2.add_node_set(["W", "X", "Y", "Z"]).unwrap();
    g2.add_edge("W", "X", 1).unwrap();

    let search = McisSearch::new();
    let results = search.run(&[&g1, &g2], Algorithm::Kpt, None).unwrap();
    assert_eq!(results.len(), 1);

    let matched: Vec<String> = results[0].node_ids().map(str::to_string).collect();
    let graphs = [&g1, &g2];
    for a in &matched {
        for b in &matched {
            if a == b {
                continue;
            }
            let pa = components(a, 2);
            let pb = components(b, 2);
            for (i, g) in graphs.iter().enumerate() {
                assert!(
                    !reachable(g, pa[i], pb[i]) && !reachable(g, pb[i], pa[i]),
                    "matched hyperedges {} and {} conflict in graph {}",
                    a,
                    b,
                    i
                );
            }
        }
    }
}

#[test]
fn kpt_emits_node_only_output() {
    let mut g1 = DataflowGraph::new();
    g1.add_node_set(["A", "B"]).unwrap();
    let mut g2 = DataflowGraph::new();
    g2.add_node_set(["X", "Y"]).unwrap();

    let search = McisSearch::new();
    let results = search.run(&[&g1, &g2], Algorithm::Kpt, None).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].num_edges(), 0);
}

// ---------------------------------------------------------------------------
// Dispatcher behavior
// ---------------------------------------------------------------------------

#[test]
fn tag_projection_limits_the_search() {
    let mut g1 = triangle(["A", "B", "C"]);
    g1.set_node_tag("A", "core").unwrap();
    g1.set_node_tag("B", "core").unwrap();
    let mut g2 = triangle(["X", "Y", "Z"]);
    g2.set_node_tag("X", "core").unwrap();
    g2.set_node_tag("Y", "core").unwrap();

    let search = McisSearch::new();
    let results = search
        .run(&[&g1, &g2], Algorithm::BronKerboschSerial, Some("core"))
        .unwrap();
    assert!(!results.is_empty());
    // Only the two tagged nodes per graph can participate.
    assert!(results[0].num_nodes() <= 2);
    for id in results[0].node_ids() {
        for part in components(id, 2) {
            assert!(["A", "B", "X", "Y"].contains(&part));
        }
    }
}

#[test]
fn run_many_returns_per_algorithm_results() {
    let g1 = triangle(["A", "B", "C"]);
    let g2 = triangle(["X", "Y", "Z"]);
    let search = McisSearch::new();

    let all = search
        .run_many(
            &[&g1, &g2],
            &[Algorithm::BronKerboschSerial, Algorithm::Kpt],
            None,
        )
        .unwrap();
    assert_eq!(all.len(), 2);
    assert!(!all[0].is_empty());
    assert!(!all[1].is_empty());
}

#[test]
fn run_many_short_circuits_on_error() {
    let empty = DataflowGraph::new();
    let search = McisSearch::new();
    assert_eq!(
        search.run_many(
            &[&empty],
            &[Algorithm::BronKerboschSerial, Algorithm::Kpt],
            None
        ),
        Err(SearchError::EmptyGraph)
    );
}
