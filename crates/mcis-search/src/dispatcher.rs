//! Solver selection and the uniform entry point.
//!
//! [`McisSearch`] owns one instance of every solver, validates inputs,
//! applies the optional tag projection, and dispatches. Callers receive
//! freshly-built output graphs and become their sole owners.

use std::fmt;
use std::str::FromStr;

use mcis_core::DataflowGraph;
use serde::{Deserialize, Serialize};

use crate::bron_kerbosch::BronKerbosch;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::finder::McisFinder;
use crate::kpt::Kpt;

/// Selector for the available solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Pivoted Bron-Kerbosch over the modular product graph.
    BronKerboschSerial,
    /// Local-ratio hypergraph matching.
    Kpt,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::BronKerboschSerial => write!(f, "bron-kerbosch-serial"),
            Algorithm::Kpt => write!(f, "kpt"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bron-kerbosch-serial" | "bron-kerbosch" | "bk" => Ok(Algorithm::BronKerboschSerial),
            "kpt" => Ok(Algorithm::Kpt),
            other => Err(SearchError::InvalidAlgorithm {
                name: other.to_string(),
            }),
        }
    }
}

/// The search dispatcher.
#[derive(Debug, Clone, Default)]
pub struct McisSearch {
    bron_kerbosch: BronKerbosch,
    kpt: Kpt,
}

impl McisSearch {
    /// A dispatcher with default cost controls.
    pub fn new() -> Self {
        McisSearch::with_config(SearchConfig::default())
    }

    /// A dispatcher with caller-supplied cost controls, shared by every
    /// solver.
    pub fn with_config(config: SearchConfig) -> Self {
        McisSearch {
            bron_kerbosch: BronKerbosch::new(config.clone()),
            kpt: Kpt::new(config),
        }
    }

    fn solver(&self, algorithm: Algorithm) -> &dyn McisFinder {
        match algorithm {
            Algorithm::BronKerboschSerial => &self.bron_kerbosch,
            Algorithm::Kpt => &self.kpt,
        }
    }

    /// Runs one solver over the inputs.
    ///
    /// With a tag, each input is first projected onto its tag-matching
    /// induced subgraph. Inputs that are empty *before* projection are
    /// rejected with `EmptyGraph`; projections that come up empty simply
    /// produce no results.
    pub fn run(
        &self,
        graphs: &[&DataflowGraph],
        algorithm: Algorithm,
        tag: Option<&str>,
    ) -> Result<Vec<DataflowGraph>, SearchError> {
        validate_inputs(graphs)?;
        tracing::info!(%algorithm, k = graphs.len(), ?tag, "dispatching MCIS search");

        match tag {
            Some(t) => {
                let projected: Vec<DataflowGraph> =
                    graphs.iter().map(|g| g.subgraph_with_tag(t)).collect();
                let refs: Vec<&DataflowGraph> = projected.iter().collect();
                self.solver(algorithm).find(&refs, Some(t))
            }
            None => self.solver(algorithm).find(graphs, None),
        }
    }

    /// Runs several solvers in order, short-circuiting on the first
    /// error. Results are returned per algorithm, in call order.
    pub fn run_many(
        &self,
        graphs: &[&DataflowGraph],
        algorithms: &[Algorithm],
        tag: Option<&str>,
    ) -> Result<Vec<Vec<DataflowGraph>>, SearchError> {
        algorithms
            .iter()
            .map(|&algorithm| self.run(graphs, algorithm, tag))
            .collect()
    }
}

fn validate_inputs(graphs: &[&DataflowGraph]) -> Result<(), SearchError> {
    if graphs.is_empty() || graphs.iter().any(|g| g.num_nodes() == 0) {
        return Err(SearchError::EmptyGraph);
    }
    Ok(())
}
