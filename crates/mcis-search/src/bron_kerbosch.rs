//! Pivoted Bron-Kerbosch maximal-clique enumeration over the modular
//! product graph, with the cost controls that make it usable on real
//! workload DAGs: a wall-clock deadline checked at every recursive
//! entry, and a clique-size cutoff that prunes the search once any
//! emitted clique exceeds it.
//!
//! Each recursive call carries the classic `(R, P, X)` sets -- the
//! growing clique, the candidates, and the exclusion set -- all ordered,
//! so the emission order of tied maximum cliques is reproducible.

use std::collections::BTreeSet;
use std::time::Instant;

use mcis_core::DataflowGraph;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::finder::McisFinder;
use crate::heuristic::oversize_fallback;
use crate::materialize::clique_to_graph;
use crate::product::{product_vertex_count, ProductGraph};

/// Serial pivoted Bron-Kerbosch solver.
#[derive(Debug, Clone, Default)]
pub struct BronKerbosch {
    config: SearchConfig,
}

impl BronKerbosch {
    pub fn new(config: SearchConfig) -> Self {
        BronKerbosch { config }
    }
}

impl McisFinder for BronKerbosch {
    fn find(
        &self,
        graphs: &[&DataflowGraph],
        tag: Option<&str>,
    ) -> Result<Vec<DataflowGraph>, SearchError> {
        if graphs.is_empty() {
            return Err(SearchError::EmptyGraph);
        }

        let vertex_count = product_vertex_count(graphs, tag);
        if vertex_count == 0 {
            return Ok(Vec::new());
        }
        if vertex_count > self.config.node_budget {
            tracing::warn!(
                vertex_count,
                budget = self.config.node_budget,
                "product graph exceeds node budget"
            );
            return Ok(vec![oversize_fallback(graphs, tag)?]);
        }

        let product = ProductGraph::build(graphs, tag);
        let mut search = CliqueSearch {
            adjacency: &product.adjacency,
            deadline: Instant::now() + self.config.timeout,
            size_cutoff: self.config.clique_size_cutoff,
            longest: 0,
            cliques: Vec::new(),
            deadline_hit: false,
        };
        search.run(product.vertices.len());

        if search.deadline_hit {
            tracing::warn!("clique search hit the wall-clock deadline");
        }
        let mut cliques = search.cliques;
        if cliques.is_empty() {
            // Deadline expired before anything was emitted; a singleton
            // on the first product vertex keeps the output non-empty.
            cliques.push(vec![0]);
        }

        let best = cliques.iter().map(Vec::len).max().unwrap_or(0);
        cliques.retain(|clique| clique.len() == best);
        tracing::debug!(
            max_clique = best,
            tied = cliques.len(),
            "clique enumeration finished"
        );

        cliques
            .iter()
            .map(|clique| {
                clique_to_graph(clique, &product.vertices, graphs).map_err(SearchError::from)
            })
            .collect()
    }
}

/// Recursion state. One instance per `find` call.
struct CliqueSearch<'a> {
    adjacency: &'a [BTreeSet<usize>],
    deadline: Instant,
    size_cutoff: usize,
    /// Size of the largest clique emitted so far.
    longest: usize,
    /// Emitted maximal cliques, vertex indices in ascending order.
    cliques: Vec<Vec<usize>>,
    deadline_hit: bool,
}

impl CliqueSearch<'_> {
    fn run(&mut self, vertex_count: usize) {
        let mut r = BTreeSet::new();
        let p: BTreeSet<usize> = (0..vertex_count).collect();
        self.explore(&mut r, p, BTreeSet::new());
    }

    fn explore(&mut self, r: &mut BTreeSet<usize>, mut p: BTreeSet<usize>, mut x: BTreeSet<usize>) {
        if Instant::now() >= self.deadline {
            self.deadline_hit = true;
            return;
        }
        if self.longest > self.size_cutoff {
            return;
        }
        if p.is_empty() && x.is_empty() {
            if !r.is_empty() {
                self.longest = self.longest.max(r.len());
                self.cliques.push(r.iter().copied().collect());
            }
            return;
        }

        // Pivot on the highest-degree vertex of P ∪ X; only candidates
        // outside its neighborhood need to branch.
        let pivot = p
            .iter()
            .chain(x.iter())
            .copied()
            .fold(None::<usize>, |best, u| match best {
                Some(b) if self.adjacency[u].len() <= self.adjacency[b].len() => Some(b),
                _ => Some(u),
            });
        let candidates: Vec<usize> = match pivot {
            Some(u) => p.difference(&self.adjacency[u]).copied().collect(),
            None => p.iter().copied().collect(),
        };

        for v in candidates {
            let neighbors = &self.adjacency[v];
            r.insert(v);
            let next_p = p.intersection(neighbors).copied().collect();
            let next_x = x.intersection(neighbors).copied().collect();
            self.explore(r, next_p, next_x);
            r.remove(&v);
            p.remove(&v);
            x.insert(v);
        }
    }
}
