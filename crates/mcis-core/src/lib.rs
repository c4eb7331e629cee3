//! mcis-core: the labeled directed graph substrate for common-subgraph
//! discovery across compute DAGs.
//!
//! Provides [`DataflowGraph`], a string-addressed directed graph with
//! integer edge weights and free-form node tags, plus the [`GraphError`]
//! taxonomy shared with the workload factories. Search algorithms live in
//! the `mcis-search` crate; workload DAG construction in `mcis-workloads`.

pub mod error;
pub mod graph;
pub mod node;

pub use error::GraphError;
pub use graph::DataflowGraph;
pub use node::OpNode;
