//! The solver abstraction the dispatcher is polymorphic over.

use mcis_core::DataflowGraph;

use crate::error::SearchError;

/// A maximum-common-induced-subgraph solver.
///
/// Implementations receive the input graphs in caller order plus an
/// optional tag restricting which nodes participate, and return the
/// discovered common subgraphs as fresh graphs owned by the caller.
pub trait McisFinder {
    /// Runs the solver over `graphs`.
    ///
    /// # Errors
    ///
    /// `EmptyGraph` when no graphs are supplied; graph errors only if
    /// result assembly fails (which indicates an internal invariant
    /// violation, not bad input).
    fn find(
        &self,
        graphs: &[&DataflowGraph],
        tag: Option<&str>,
    ) -> Result<Vec<DataflowGraph>, SearchError>;
}
