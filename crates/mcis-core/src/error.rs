//! Core error types for mcis-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! all anticipated failure modes in the graph data model and the
//! workload factories built on top of it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by [`DataflowGraph`](crate::graph::DataflowGraph)
/// mutations and by the workload factories.
///
/// Mutation errors are detected before any bookkeeping change occurs, so
/// a failed operation never leaves the graph in a partially-updated state.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GraphError {
    /// Attempting to add a node whose id is already present.
    #[error("node already exists: '{id}'")]
    NodeAlreadyExists { id: String },

    /// The named node is not in the graph.
    #[error("node not found: '{id}'")]
    NodeNotFound { id: String },

    /// The directed edge already exists with a different weight.
    /// Re-adding an identical edge is a no-op, not an error.
    #[error("edge already exists: '{from}' -> '{to}'")]
    EdgeAlreadyExists { from: String, to: String },

    /// The directed edge is not in the graph.
    #[error("edge not found: '{from}' -> '{to}'")]
    EdgeNotFound { from: String, to: String },

    /// Self-loops are rejected at insertion time.
    #[error("self-loops are not allowed: '{id}'")]
    SelfLoop { id: String },

    /// A factory was called with parameters outside its domain.
    #[error("invalid parameters: {reason}")]
    InvalidParameters { reason: String },

    /// Factory inputs disagree on shape (e.g. a ragged matrix).
    #[error("inconsistent dimensions: {reason}")]
    InconsistentDimensions { reason: String },
}
