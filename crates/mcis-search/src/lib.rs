//! mcis-search: maximum common induced subgraph discovery across k >= 2
//! compute DAGs.
//!
//! Two solvers sit behind the [`McisSearch`] dispatcher:
//!
//! - [`BronKerbosch`]: builds the k-ary modular product graph, whose
//!   maximal cliques correspond to common induced subgraphs, and
//!   enumerates them with a pivoted, deadline-bounded recursion;
//! - [`Kpt`]: forms the k-partite conflict hypergraph (conflict =
//!   directed reachability in any coordinate) and extracts a
//!   conflict-free matching by recursive local-ratio approximation.
//!
//! Oversized product graphs degrade to a best-effort heuristic rather
//! than running unbounded; see [`SearchConfig`] for the knobs.

pub mod bron_kerbosch;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod finder;
mod heuristic;
pub mod kpt;
mod materialize;
pub mod product;

pub use bron_kerbosch::BronKerbosch;
pub use config::SearchConfig;
pub use dispatcher::{Algorithm, McisSearch};
pub use error::SearchError;
pub use finder::McisFinder;
pub use kpt::Kpt;
pub use product::ProductVertex;
