//! Cost-control configuration for the solvers.

use std::time::Duration;

/// Knobs bounding the search. The defaults are tuned to the workload
/// DAGs this crate targets; the clique-size cutoff in particular is
/// load-bearing on large inputs.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Product graphs larger than this switch to the oversize heuristic
    /// instead of exact search.
    pub node_budget: usize,
    /// Wall-clock bound on the Bron-Kerbosch recursion.
    pub timeout: Duration,
    /// Once an emitted clique exceeds this size, further recursion is
    /// pruned.
    pub clique_size_cutoff: usize,
    /// Fractional-weight floor below which KPT drops a hyperedge.
    pub kpt_epsilon: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            node_budget: 1000,
            timeout: Duration::from_millis(5000),
            clique_size_cutoff: 10,
            kpt_epsilon: 1e-9,
        }
    }
}
