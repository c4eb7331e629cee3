//! Local-ratio hypergraph matching (KPT) -- the alternative solver.
//!
//! Candidate hyperedges are the Cartesian product of the (optionally
//! tag-filtered) node sets, one node per input graph. Two hyperedges
//! conflict when they are equal or when, in some coordinate, one
//! endpoint can reach the other along directed edges. The recursive
//! local-ratio procedure peels weight off conflicting hyperedges until
//! a conflict-free matching remains.
//!
//! The "optimal fractional solution" of the underlying LP is
//! approximated by uniform normalization of the current weights; with
//! the conflict-sum threshold `alpha = 2k` this always admits the first
//! hyperedge, which keeps the procedure deterministic and is an
//! intentional approximation.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use mcis_core::DataflowGraph;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::finder::McisFinder;
use crate::product::{cartesian_tuples, selected_ids, ProductVertex};

/// The k-partite conflict-hypergraph matcher.
#[derive(Debug, Clone, Default)]
pub struct Kpt {
    config: SearchConfig,
}

impl Kpt {
    pub fn new(config: SearchConfig) -> Self {
        Kpt { config }
    }
}

impl McisFinder for Kpt {
    fn find(
        &self,
        graphs: &[&DataflowGraph],
        tag: Option<&str>,
    ) -> Result<Vec<DataflowGraph>, SearchError> {
        if graphs.is_empty() {
            return Err(SearchError::EmptyGraph);
        }

        let lists: Vec<Vec<String>> = graphs.iter().map(|g| selected_ids(g, tag)).collect();
        let hyperedges = cartesian_tuples(&lists);
        if hyperedges.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(hyperedges = hyperedges.len(), "built KPT hyperedge set");

        let conflicts = conflict_sets(&hyperedges, graphs);
        let weights = vec![1.0; hyperedges.len()];
        let all: BTreeSet<usize> = (0..hyperedges.len()).collect();
        let alpha = 2.0 * graphs.len() as f64;

        let matching = self.local_ratio_match(&all, &weights, alpha, &conflicts);
        tracing::debug!(matched = matching.len(), "KPT matching complete");
        if matching.is_empty() {
            return Ok(Vec::new());
        }

        let mut out = DataflowGraph::new();
        out.reserve_nodes(matching.len());
        for &e in &matching {
            out.add_node(&hyperedges[e].joined_id())?;
        }
        Ok(vec![out])
    }
}

impl Kpt {
    /// Recursive local-ratio step over the active hyperedge set `f` and
    /// the current weights.
    fn local_ratio_match(
        &self,
        f: &BTreeSet<usize>,
        w: &[f64],
        alpha: f64,
        conflicts: &[BTreeSet<usize>],
    ) -> BTreeSet<usize> {
        let Some(&first) = f.iter().next() else {
            return BTreeSet::new();
        };
        let total: f64 = f.iter().map(|&e| w[e]).sum();
        if total <= 0.0 {
            return BTreeSet::new();
        }

        // Drop hyperedges whose fractional weight has fallen to zero.
        let nonzero: BTreeSet<usize> = f
            .iter()
            .copied()
            .filter(|&e| w[e] / total > self.config.kpt_epsilon)
            .collect();
        if nonzero.len() < f.len() {
            return self.local_ratio_match(&nonzero, w, alpha, conflicts);
        }

        // Pick a hyperedge whose conflicting fractional mass is within
        // alpha, falling back to the first one.
        let selected = f
            .iter()
            .copied()
            .find(|&e| {
                let conflict_sum: f64 = f
                    .iter()
                    .filter(|&&q| conflicts[e].contains(&q))
                    .map(|&q| w[q] / total)
                    .sum();
                conflict_sum <= alpha
            })
            .unwrap_or(first);

        // Local-ratio update: peel min(w(f), w(e)) off everything that
        // conflicts with the selection (including itself).
        let peel = w[selected];
        let mut reduced = w.to_vec();
        for &q in f {
            if conflicts[selected].contains(&q) {
                reduced[q] -= w[q].min(peel);
            }
        }

        let mut matching = self.local_ratio_match(f, &reduced, alpha, conflicts);
        if matching.iter().all(|&m| !conflicts[selected].contains(&m)) {
            matching.insert(selected);
        }
        matching
    }
}

/// Precomputes, for every hyperedge, the set of hyperedges it conflicts
/// with (itself included). Reachability queries are memoized per input
/// graph.
fn conflict_sets(
    hyperedges: &[ProductVertex],
    graphs: &[&DataflowGraph],
) -> Vec<BTreeSet<usize>> {
    let mut oracle = ReachabilityOracle::new(graphs);
    let mut conflicts = vec![BTreeSet::new(); hyperedges.len()];
    for i in 0..hyperedges.len() {
        conflicts[i].insert(i);
        for j in (i + 1)..hyperedges.len() {
            if oracle.conflicting(&hyperedges[i], &hyperedges[j]) {
                conflicts[i].insert(j);
                conflicts[j].insert(i);
            }
        }
    }
    conflicts
}

/// Memoized directed reachability across the input graphs.
struct ReachabilityOracle<'a> {
    graphs: &'a [&'a DataflowGraph],
    memo: Vec<HashMap<(String, String), bool>>,
}

impl<'a> ReachabilityOracle<'a> {
    fn new(graphs: &'a [&'a DataflowGraph]) -> Self {
        ReachabilityOracle {
            graphs,
            memo: vec![HashMap::new(); graphs.len()],
        }
    }

    /// Two hyperedges conflict when some coordinate pair is mutually
    /// reachable in its graph (equality counts as reachable).
    fn conflicting(&mut self, p: &ProductVertex, q: &ProductVertex) -> bool {
        if p == q {
            return true;
        }
        for i in 0..self.graphs.len() {
            if self.reachable(i, p.component(i), q.component(i))
                || self.reachable(i, q.component(i), p.component(i))
            {
                return true;
            }
        }
        false
    }

    fn reachable(&mut self, graph_idx: usize, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        let key = (from.to_string(), to.to_string());
        if let Some(&known) = self.memo[graph_idx].get(&key) {
            return known;
        }

        let graph = self.graphs[graph_idx];
        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        queue.push_back(from.to_string());
        visited.insert(from.to_string());

        let mut found = false;
        'bfs: while let Some(current) = queue.pop_front() {
            let Ok(children) = graph.children(&current) else {
                continue;
            };
            for (child, _) in children {
                if child == to {
                    found = true;
                    break 'bfs;
                }
                if visited.insert(child.to_string()) {
                    queue.push_back(child.to_string());
                }
            }
        }

        self.memo[graph_idx].insert(key, found);
        found
    }
}
