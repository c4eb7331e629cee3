//! Error types for the search crate.

use mcis_core::GraphError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the search dispatcher and solvers.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SearchError {
    /// The input set is empty, or an input graph has no nodes.
    #[error("no input graphs, or an input graph has no nodes")]
    EmptyGraph,

    /// An algorithm name failed to parse.
    #[error("invalid algorithm: '{name}'")]
    InvalidAlgorithm { name: String },

    /// A graph mutation failed while assembling a result.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
