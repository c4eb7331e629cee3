//! The k-ary modular product graph.
//!
//! Vertices are k-tuples of node ids, one per input graph; two tuples
//! are adjacent iff the symmetric edge-existence predicate agrees in
//! every coordinate (all edges, or all non-edges). Maximal cliques of
//! this graph correspond one-to-one with common induced subgraphs of
//! the inputs, which is what makes the Bron-Kerbosch pass below it
//! meaningful.
//!
//! Vertices are kept sorted lexicographically and adjacency is stored
//! over vertex indices in ordered sets, so every traversal downstream is
//! deterministic.

use std::collections::BTreeSet;
use std::fmt;

use mcis_core::DataflowGraph;
use serde::{Deserialize, Serialize};

/// An ordered k-tuple of node identifiers, one drawn from each input
/// graph. Ordering and equality are lexicographic over the components.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductVertex(pub Vec<String>);

impl ProductVertex {
    /// The component drawn from the `i`-th input graph.
    pub fn component(&self, i: usize) -> &str {
        &self.0[i]
    }

    /// Underscore-joined composite identifier used for output nodes.
    pub fn joined_id(&self) -> String {
        self.0.join("_")
    }
}

impl fmt::Display for ProductVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

/// The modular product of the input graphs, undirected, with adjacency
/// stored symmetrically over indices into the sorted vertex list.
pub(crate) struct ProductGraph {
    pub vertices: Vec<ProductVertex>,
    pub adjacency: Vec<BTreeSet<usize>>,
}

/// Node ids of `graph` in insertion order, keeping only nodes whose tag
/// matches when a tag is given.
pub(crate) fn selected_ids(graph: &DataflowGraph, tag: Option<&str>) -> Vec<String> {
    graph
        .node_ids()
        .filter(|id| match tag {
            Some(t) => graph.node(id).map(|n| n.tag == t).unwrap_or(false),
            None => true,
        })
        .map(str::to_string)
        .collect()
}

/// How many product vertices the inputs would generate, saturating on
/// overflow. Cheap to compute before committing to a full build.
pub(crate) fn product_vertex_count(graphs: &[&DataflowGraph], tag: Option<&str>) -> usize {
    graphs
        .iter()
        .map(|g| selected_ids(g, tag).len())
        .fold(1usize, |acc, len| acc.saturating_mul(len))
}

/// Full Cartesian product of the id lists, one list per input graph,
/// sorted lexicographically.
pub(crate) fn cartesian_tuples(lists: &[Vec<String>]) -> Vec<ProductVertex> {
    if lists.iter().any(|list| list.is_empty()) {
        return Vec::new();
    }
    let mut tuples = Vec::new();
    let mut odometer = vec![0usize; lists.len()];
    loop {
        tuples.push(ProductVertex(
            odometer
                .iter()
                .enumerate()
                .map(|(i, &pos)| lists[i][pos].clone())
                .collect(),
        ));
        // Advance the rightmost wheel, carrying left.
        let mut wheel = lists.len();
        loop {
            if wheel == 0 {
                tuples.sort_unstable();
                return tuples;
            }
            wheel -= 1;
            odometer[wheel] += 1;
            if odometer[wheel] < lists[wheel].len() {
                break;
            }
            odometer[wheel] = 0;
        }
    }
}

impl ProductGraph {
    /// Builds the modular product of `graphs`, optionally restricted to
    /// tag-matching nodes.
    pub fn build(graphs: &[&DataflowGraph], tag: Option<&str>) -> ProductGraph {
        let lists: Vec<Vec<String>> = graphs.iter().map(|g| selected_ids(g, tag)).collect();
        let vertices = cartesian_tuples(&lists);

        let mut adjacency = vec![BTreeSet::new(); vertices.len()];
        for i in 0..vertices.len() {
            for j in (i + 1)..vertices.len() {
                if modular_adjacent(&vertices[i], &vertices[j], graphs) {
                    adjacency[i].insert(j);
                    adjacency[j].insert(i);
                }
            }
        }

        tracing::debug!(
            vertices = vertices.len(),
            edges = adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2,
            "built modular product graph"
        );
        ProductGraph {
            vertices,
            adjacency,
        }
    }
}

/// The modular-product edge rule.
///
/// The per-coordinate predicate is symmetric edge existence (an edge in
/// either direction); a coordinate where both tuples pick the same node
/// counts as edge-absent. Two vertices are adjacent iff the predicate is
/// uniform across all coordinates.
fn modular_adjacent(p: &ProductVertex, q: &ProductVertex, graphs: &[&DataflowGraph]) -> bool {
    let mut uniform: Option<bool> = None;
    for (i, graph) in graphs.iter().enumerate() {
        let u = p.component(i);
        let v = q.component(i);
        let connected = u != v && (graph.has_edge(u, v) || graph.has_edge(v, u));
        match uniform {
            None => uniform = Some(connected),
            Some(previous) if previous != connected => return false,
            Some(_) => {}
        }
    }
    uniform.unwrap_or(false)
}
