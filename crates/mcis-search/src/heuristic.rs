//! Emergency path for oversized product graphs.
//!
//! When the Cartesian product would blow past the node budget, exact
//! search is off the table; this walk pairs a handful of nodes across
//! the inputs and sprinkles indicator edges from a deterministic hash.
//! The output is a best-effort marker that the inputs overlap at all --
//! it carries no structural guarantee, and callers must not read one
//! into it.

use mcis_core::{DataflowGraph, GraphError};

use crate::product::selected_ids;

/// Cap on how many nodes of the first graph seed the output.
const SEED_LIMIT: usize = 10;

/// Builds the best-effort "common" graph without touching the product
/// construction. Always non-empty when every input has nodes.
pub(crate) fn oversize_fallback(
    graphs: &[&DataflowGraph],
    tag: Option<&str>,
) -> Result<DataflowGraph, GraphError> {
    let mut out = DataflowGraph::new();

    let seeds = selected_ids(graphs[0], tag);
    let others: Vec<Vec<String>> = graphs[1..]
        .iter()
        .map(|g| selected_ids(g, tag))
        .collect();

    let mut names = Vec::new();
    for (i, seed) in seeds.iter().take(SEED_LIMIT).enumerate() {
        if others.iter().any(Vec::is_empty) {
            break;
        }
        let mut parts = vec![seed.clone()];
        for list in &others {
            parts.push(list[i % list.len()].clone());
        }
        let name = parts.join("_");
        out.add_node(&name)?;
        names.push(name);
    }

    for a in &names {
        for b in &names {
            if a != b && hash_indicator(a, b) {
                out.add_edge(a, b, 1)?;
            }
        }
    }

    tracing::warn!(
        nodes = out.num_nodes(),
        "product graph over budget; returning heuristic result"
    );
    Ok(out)
}

/// Deterministic edge indicator: the blake3 hash of the concatenated
/// ids, taken mod 4.
fn hash_indicator(a: &str, b: &str) -> bool {
    let mut hasher = blake3::Hasher::new();
    hasher.update(a.as_bytes());
    hasher.update(b.as_bytes());
    hasher.finalize().as_bytes()[0] % 4 == 0
}
