//! Node payload for the dataflow graph.
//!
//! Nodes are identified by caller-supplied strings (workload factories
//! encode operator positions into the id, e.g. `v^2_3` or `a^1_0`) and
//! carry a free-form tag used to partition graphs into subgraphs that the
//! search dispatcher can consider in isolation.

use serde::{Deserialize, Serialize};

/// A single operator node in a [`DataflowGraph`](crate::graph::DataflowGraph).
///
/// Adjacency lives in the owning graph; the payload is just identity plus
/// the grouping tag. Degree information is exposed through graph queries
/// (`in_degree`, `out_degree`, `is_source`, `is_sink`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpNode {
    /// Unique identifier within the owning graph. Never empty.
    pub id: String,
    /// Free-form grouping tag, compared by equality. Empty by default.
    pub tag: String,
}

impl OpNode {
    /// Creates a node with the given id and an empty tag.
    pub fn new(id: impl Into<String>) -> Self {
        OpNode {
            id: id.into(),
            tag: String::new(),
        }
    }
}
