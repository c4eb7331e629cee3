//! mcis-workloads: factories for the compute DAGs the subgraph search is
//! run against.
//!
//! Three workload families are modeled, each as a [`DataflowGraph`]
//! whose node identifiers encode operator positions:
//!
//! - matrix-vector multiplication ([`mvm_graph`], [`mvm_graph_from_ids`])
//! - Cooley-Tukey FFT butterflies ([`fft_graph`])
//! - Haar discrete wavelet transform ([`haar_dwt_graph`],
//!   [`haar_dwt_graph_from_signal`])

pub mod dwt;
pub mod fft;
pub mod mvm;

pub use dwt::{haar_dwt_graph, haar_dwt_graph_from_signal, HaarDwtKind};
pub use fft::fft_graph;
pub use mvm::{mvm_graph, mvm_graph_from_ids};

// Re-exported so workload callers don't need a direct mcis-core
// dependency for the common case.
pub use mcis_core::{DataflowGraph, GraphError};
