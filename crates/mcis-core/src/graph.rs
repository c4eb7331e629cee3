//! The labeled directed graph container shared by the workload factories
//! and the subgraph-search algorithms.
//!
//! [`DataflowGraph`] wraps a petgraph [`StableGraph`] with a string-id
//! index so callers address nodes by identifier rather than by index. All
//! mutations go through `DataflowGraph` methods, which validate before
//! touching the underlying graph -- a failed mutation never leaves the
//! adjacency in a partially-updated state.
//!
//! A version counter is bumped on every mutation and stamps the cached
//! `is_dag` answer, so derived results are invalidated exactly when the
//! structure changes.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use petgraph::algo::is_cyclic_directed;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::node::OpNode;

/// A directed graph of operator nodes with integer edge weights.
///
/// Nodes are owned by the graph and addressed by their string id. Edges
/// are directed; self-loops are rejected, and re-adding an existing edge
/// is a no-op when the weight matches and an error when it differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataflowGraph {
    /// The adjacency structure. Edge weights are plain integers.
    graph: StableGraph<OpNode, i64, Directed, u32>,
    /// Id index into the stable graph.
    ids: HashMap<String, NodeIndex<u32>>,
    /// Bumped on every mutation; stamps derived caches.
    version: u64,
    /// Cached acyclicity answer, valid while the stamp matches `version`.
    #[serde(skip)]
    dag_cache: Option<(u64, bool)>,
}

impl Default for DataflowGraph {
    fn default() -> Self {
        DataflowGraph::new()
    }
}

impl DataflowGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        DataflowGraph {
            graph: StableGraph::default(),
            ids: HashMap::new(),
            version: 0,
            dag_cache: None,
        }
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
        self.dag_cache = None;
    }

    fn index(&self, id: &str) -> Result<NodeIndex<u32>, GraphError> {
        self.ids
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound { id: id.to_string() })
    }

    // -----------------------------------------------------------------------
    // Node mutations
    // -----------------------------------------------------------------------

    /// Adds a node with the given id and an empty tag.
    pub fn add_node(&mut self, id: &str) -> Result<(), GraphError> {
        if self.ids.contains_key(id) {
            return Err(GraphError::NodeAlreadyExists { id: id.to_string() });
        }
        let idx = self.graph.add_node(OpNode::new(id));
        self.ids.insert(id.to_string(), idx);
        self.bump();
        Ok(())
    }

    /// Adds every id in `ids`, stopping at the first duplicate.
    pub fn add_node_set<I, S>(&mut self, ids: I) -> Result<(), GraphError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.add_node(id.as_ref())?;
        }
        Ok(())
    }

    /// Removes a node and every edge incident on it, in both directions.
    pub fn remove_node(&mut self, id: &str) -> Result<(), GraphError> {
        let idx = self.index(id)?;
        self.graph.remove_node(idx);
        self.ids.remove(id);
        self.bump();
        Ok(())
    }

    /// Removes every listed node that exists, returning how many were
    /// removed. Missing ids are skipped rather than reported.
    pub fn remove_nodes_bulk<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = 0;
        for id in ids {
            if self.remove_node(id.as_ref()).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    /// Capacity hint for the id index when the caller knows how many
    /// nodes are coming.
    pub fn reserve_nodes(&mut self, additional: usize) {
        self.ids.reserve(additional);
    }

    /// Sets the tag of an existing node.
    pub fn set_node_tag(&mut self, id: &str, tag: &str) -> Result<(), GraphError> {
        let idx = self.index(id)?;
        if let Some(node) = self.graph.node_weight_mut(idx) {
            node.tag = tag.to_string();
        }
        self.bump();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Edge mutations
    // -----------------------------------------------------------------------

    /// Adds a directed edge `from -> to` with the given weight.
    ///
    /// Both endpoints must exist and must differ. Adding an edge that is
    /// already present with the identical weight succeeds without change;
    /// a differing weight is rejected.
    pub fn add_edge(&mut self, from: &str, to: &str, weight: i64) -> Result<(), GraphError> {
        if from == to {
            return Err(GraphError::SelfLoop {
                id: from.to_string(),
            });
        }
        let from_idx = self.index(from)?;
        let to_idx = self.index(to)?;
        if let Some(edge) = self.graph.find_edge(from_idx, to_idx) {
            let existing = self.graph[edge];
            if existing == weight {
                return Ok(());
            }
            return Err(GraphError::EdgeAlreadyExists {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.graph.add_edge(from_idx, to_idx, weight);
        self.bump();
        Ok(())
    }

    /// Adds edges from one node to each listed target.
    ///
    /// An empty or length-mismatched weight slice means every edge gets
    /// weight zero.
    pub fn add_edge_set(
        &mut self,
        from: &str,
        to_ids: &[&str],
        weights: &[i64],
    ) -> Result<(), GraphError> {
        let use_zero = weights.len() != to_ids.len();
        for (i, to) in to_ids.iter().enumerate() {
            let weight = if use_zero { 0 } else { weights[i] };
            self.add_edge(from, to, weight)?;
        }
        Ok(())
    }

    /// Removes the directed edge `from -> to`.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> Result<(), GraphError> {
        let from_idx = self.index(from)?;
        let to_idx = self.index(to)?;
        let edge = self
            .graph
            .find_edge(from_idx, to_idx)
            .ok_or_else(|| GraphError::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        self.graph.remove_edge(edge);
        self.bump();
        Ok(())
    }

    /// Replaces the weight of an existing edge.
    pub fn change_edge_weight(
        &mut self,
        from: &str,
        to: &str,
        new_weight: i64,
    ) -> Result<(), GraphError> {
        let from_idx = self.index(from)?;
        let to_idx = self.index(to)?;
        let edge = self
            .graph
            .find_edge(from_idx, to_idx)
            .ok_or_else(|| GraphError::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        self.graph[edge] = new_weight;
        self.bump();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read-only queries
    // -----------------------------------------------------------------------

    /// Returns the node payload, if present.
    pub fn node(&self, id: &str) -> Option<&OpNode> {
        self.ids.get(id).and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Returns `true` if the id names a node in this graph.
    pub fn contains_node(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// Returns a node's tag.
    pub fn tag(&self, id: &str) -> Result<&str, GraphError> {
        let idx = self.index(id)?;
        Ok(self.graph[idx].tag.as_str())
    }

    /// Node ids in insertion order. Stable for a given graph snapshot,
    /// which makes downstream product-vertex generation reproducible.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph
            .node_indices()
            .map(move |idx| self.graph[idx].id.as_str())
    }

    /// Node payloads in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &OpNode> + '_ {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns `true` if the directed edge `from -> to` exists. Missing
    /// endpoints count as "no edge".
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.ids.get(from), self.ids.get(to)) {
            (Some(&f), Some(&t)) => self.graph.find_edge(f, t).is_some(),
            _ => false,
        }
    }

    /// The weight of `from -> to`, if the edge exists.
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<i64> {
        let f = *self.ids.get(from)?;
        let t = *self.ids.get(to)?;
        let edge = self.graph.find_edge(f, t)?;
        Some(self.graph[edge])
    }

    /// Outgoing neighbors as `(id, weight)` pairs, sorted by id.
    pub fn children(&self, id: &str) -> Result<Vec<(&str, i64)>, GraphError> {
        let idx = self.index(id)?;
        let mut out: Vec<(&str, i64)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (self.graph[e.target()].id.as_str(), *e.weight()))
            .collect();
        out.sort_unstable();
        Ok(out)
    }

    /// Incoming neighbors as `(id, weight)` pairs, sorted by id.
    pub fn parents(&self, id: &str) -> Result<Vec<(&str, i64)>, GraphError> {
        let idx = self.index(id)?;
        let mut out: Vec<(&str, i64)> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (self.graph[e.source()].id.as_str(), *e.weight()))
            .collect();
        out.sort_unstable();
        Ok(out)
    }

    /// Number of incoming edges.
    pub fn in_degree(&self, id: &str) -> Result<usize, GraphError> {
        let idx = self.index(id)?;
        Ok(self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .count())
    }

    /// Number of outgoing edges.
    pub fn out_degree(&self, id: &str) -> Result<usize, GraphError> {
        let idx = self.index(id)?;
        Ok(self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .count())
    }

    /// A source has no incoming edges.
    pub fn is_source(&self, id: &str) -> Result<bool, GraphError> {
        Ok(self.in_degree(id)? == 0)
    }

    /// A sink has no outgoing edges.
    pub fn is_sink(&self, id: &str) -> Result<bool, GraphError> {
        Ok(self.out_degree(id)? == 0)
    }

    /// The mutation version. Any structural change bumps it.
    pub fn version(&self) -> u64 {
        self.version
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    /// Whether the graph is acyclic.
    ///
    /// The answer is cached and revalidated against the version counter,
    /// so repeated calls between mutations are O(1).
    pub fn is_dag(&mut self) -> bool {
        if let Some((stamp, cached)) = self.dag_cache {
            if stamp == self.version {
                return cached;
            }
        }
        let result = !is_cyclic_directed(&self.graph);
        self.dag_cache = Some((self.version, result));
        result
    }

    /// The induced subgraph on nodes whose tag equals `tag`.
    ///
    /// Node ids, tags, and edge weights are preserved; only edges with
    /// both endpoints carrying the tag survive.
    pub fn subgraph_with_tag(&self, tag: &str) -> DataflowGraph {
        let mut sub = DataflowGraph::new();
        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            if node.tag == tag {
                // Ids are unique in `self`, so these cannot fail.
                let _ = sub.add_node(&node.id);
                let _ = sub.set_node_tag(&node.id, &node.tag);
            }
        }
        for edge in self.graph.edge_references() {
            let from = &self.graph[edge.source()];
            let to = &self.graph[edge.target()];
            if from.tag == tag && to.tag == tag {
                let _ = sub.add_edge(&from.id, &to.id, *edge.weight());
            }
        }
        sub
    }

    /// Renders the graph as Graphviz DOT text. The caller owns writing it
    /// to disk or piping it to `dot`.
    pub fn to_dot(&self) -> String {
        let mut edges: Vec<(&str, &str, i64)> = self
            .graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].id.as_str(),
                    self.graph[e.target()].id.as_str(),
                    *e.weight(),
                )
            })
            .collect();
        edges.sort_unstable();

        let mut isolated: Vec<&str> = self
            .graph
            .node_indices()
            .filter(|&idx| self.graph.edges_directed(idx, Direction::Outgoing).count() == 0)
            .filter(|&idx| self.graph.edges_directed(idx, Direction::Incoming).count() == 0)
            .map(|idx| self.graph[idx].id.as_str())
            .collect();
        isolated.sort_unstable();

        let mut out = String::from("digraph G {\n");
        for id in isolated {
            out.push_str(&format!("    \"{}\";\n", id));
        }
        for (from, to, weight) in edges {
            out.push_str(&format!(
                "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                from, to, weight
            ));
        }
        out.push_str("}\n");
        out
    }

    fn children_map(&self, idx: NodeIndex<u32>) -> BTreeMap<&str, i64> {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (self.graph[e.target()].id.as_str(), *e.weight()))
            .collect()
    }
}

/// Two graphs are equal when their id sets match and every node has the
/// same weighted adjacency in both. Tags are grouping metadata and do not
/// participate in equality.
impl PartialEq for DataflowGraph {
    fn eq(&self, other: &Self) -> bool {
        if self.ids.len() != other.ids.len() {
            return false;
        }
        for (id, &idx) in &self.ids {
            let Some(&other_idx) = other.ids.get(id) else {
                return false;
            };
            if self.children_map(idx) != other.children_map(other_idx) {
                return false;
            }
        }
        true
    }
}

impl Eq for DataflowGraph {}

/// Prints `id: [child(weight), ...]` lines sorted by id.
impl fmt::Display for DataflowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.node_ids().collect();
        ids.sort_unstable();
        for id in ids {
            let children = self.children(id).map_err(|_| fmt::Error)?;
            write!(f, "{}: [", id)?;
            for (i, (child, weight)) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}({})", child, weight)?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> DataflowGraph {
        let mut g = DataflowGraph::new();
        g.add_node_set(["A", "B", "C"]).unwrap();
        g.add_edge("A", "B", 1).unwrap();
        g.add_edge("B", "C", 1).unwrap();
        g.add_edge("A", "C", 1).unwrap();
        g
    }

    #[test]
    fn add_node_rejects_duplicates() {
        let mut g = DataflowGraph::new();
        g.add_node("A").unwrap();
        assert_eq!(
            g.add_node("A"),
            Err(GraphError::NodeAlreadyExists { id: "A".into() })
        );
        assert_eq!(g.num_nodes(), 1);
    }

    #[test]
    fn add_edge_validates_endpoints_and_self_loops() {
        let mut g = DataflowGraph::new();
        g.add_node("A").unwrap();
        assert_eq!(
            g.add_edge("A", "A", 1),
            Err(GraphError::SelfLoop { id: "A".into() })
        );
        assert_eq!(
            g.add_edge("A", "missing", 1),
            Err(GraphError::NodeNotFound {
                id: "missing".into()
            })
        );
    }

    #[test]
    fn add_edge_is_idempotent_for_identical_weight() {
        let mut g = DataflowGraph::new();
        g.add_node_set(["A", "B"]).unwrap();
        g.add_edge("A", "B", 3).unwrap();
        let version = g.version();
        assert_eq!(g.add_edge("A", "B", 3), Ok(()));
        assert_eq!(g.version(), version, "idempotent re-add must not mutate");
        assert_eq!(
            g.add_edge("A", "B", 4),
            Err(GraphError::EdgeAlreadyExists {
                from: "A".into(),
                to: "B".into()
            })
        );
        assert_eq!(g.edge_weight("A", "B"), Some(3));
    }

    #[test]
    fn add_edge_set_defaults_to_zero_weights() {
        let mut g = DataflowGraph::new();
        g.add_node_set(["A", "B", "C", "D"]).unwrap();

        // Empty weight slice: every edge gets weight zero.
        g.add_edge_set("A", &["B", "C"], &[]).unwrap();
        assert_eq!(g.edge_weight("A", "B"), Some(0));
        assert_eq!(g.edge_weight("A", "C"), Some(0));

        // Matching lengths: weights are applied positionally.
        g.add_edge_set("B", &["C", "D"], &[3, 7]).unwrap();
        assert_eq!(g.edge_weight("B", "C"), Some(3));
        assert_eq!(g.edge_weight("B", "D"), Some(7));

        // Length mismatch falls back to all-zero weights.
        g.add_edge_set("C", &["D"], &[5, 9]).unwrap();
        assert_eq!(g.edge_weight("C", "D"), Some(0));

        assert_eq!(
            g.add_edge_set("A", &["missing"], &[]),
            Err(GraphError::NodeNotFound {
                id: "missing".into()
            })
        );
    }

    #[test]
    fn remove_node_clears_incident_edges() {
        let mut g = triangle();
        g.remove_node("B").unwrap();
        assert!(!g.contains_node("B"));
        assert!(!g.has_edge("A", "B"));
        assert!(!g.has_edge("B", "C"));
        assert!(g.has_edge("A", "C"));
        assert_eq!(g.out_degree("A").unwrap(), 1);
        assert_eq!(g.in_degree("C").unwrap(), 1);
    }

    #[test]
    fn remove_and_change_edge_error_surface() {
        let mut g = DataflowGraph::new();
        g.add_node_set(["A", "B"]).unwrap();
        assert_eq!(
            g.remove_edge("A", "B"),
            Err(GraphError::EdgeNotFound {
                from: "A".into(),
                to: "B".into()
            })
        );
        g.add_edge("A", "B", 1).unwrap();
        g.change_edge_weight("A", "B", 9).unwrap();
        assert_eq!(g.edge_weight("A", "B"), Some(9));
        g.remove_edge("A", "B").unwrap();
        assert!(!g.has_edge("A", "B"));
    }

    #[test]
    fn adjacency_is_symmetric_across_directions() {
        let g = triangle();
        for id in ["A", "B", "C"] {
            for (child, weight) in g.children(id).unwrap() {
                let parents = g.parents(child).unwrap();
                assert!(
                    parents.contains(&(id, weight)),
                    "child edge {}->{} missing from parents view",
                    id,
                    child
                );
            }
        }
    }

    #[test]
    fn degrees_match_adjacency_sizes() {
        let g = triangle();
        assert_eq!(g.out_degree("A").unwrap(), 2);
        assert_eq!(g.in_degree("A").unwrap(), 0);
        assert_eq!(g.in_degree("C").unwrap(), 2);
        assert!(g.is_source("A").unwrap());
        assert!(g.is_sink("C").unwrap());
    }

    #[test]
    fn tags_and_subgraph_projection() {
        let mut g = triangle();
        g.add_node("D").unwrap();
        g.add_edge("C", "D", 2).unwrap();
        g.set_node_tag("A", "hot").unwrap();
        g.set_node_tag("B", "hot").unwrap();
        g.set_node_tag("C", "cold").unwrap();

        let sub = g.subgraph_with_tag("hot");
        assert_eq!(sub.num_nodes(), 2);
        assert!(sub.contains_node("A"));
        assert!(sub.contains_node("B"));
        assert!(sub.has_edge("A", "B"));
        assert!(!sub.has_edge("B", "C"));
        assert_eq!(sub.tag("A").unwrap(), "hot");

        // Untagged node D projects into the empty-tag subgraph.
        let untagged = g.subgraph_with_tag("");
        assert!(untagged.contains_node("D"));
        assert_eq!(untagged.num_nodes(), 1);
    }

    #[test]
    fn is_dag_caches_until_mutation() {
        let mut g = triangle();
        assert!(g.is_dag());
        let version = g.version();
        assert!(g.is_dag());
        assert_eq!(g.version(), version);

        g.add_edge("C", "A", 1).unwrap();
        assert!(!g.is_dag(), "closing the cycle must invalidate the cache");
        g.remove_edge("C", "A").unwrap();
        assert!(g.is_dag());
    }

    #[test]
    fn equality_compares_ids_and_weighted_adjacency() {
        let a = triangle();
        let b = triangle();
        assert_eq!(a, b);

        let mut c = triangle();
        c.change_edge_weight("A", "B", 7).unwrap();
        assert_ne!(a, c);

        let mut d = triangle();
        d.add_node("X").unwrap();
        assert_ne!(a, d);
    }

    #[test]
    fn display_and_dot_are_sorted_and_stable() {
        let g = triangle();
        let text = g.to_string();
        assert_eq!(text, "A: [B(1), C(1)]\nB: [C(1)]\nC: []\n");

        let dot = g.to_dot();
        assert!(dot.starts_with("digraph G {"));
        assert!(dot.contains("\"A\" -> \"B\" [label=\"1\"];"));
        assert_eq!(dot, g.to_dot());
    }

    #[test]
    fn bulk_removal_reports_count() {
        let mut g = triangle();
        let removed = g.remove_nodes_bulk(["A", "missing", "C"]);
        assert_eq!(removed, 2);
        assert_eq!(g.num_nodes(), 1);
    }

    #[test]
    fn serde_roundtrip_preserves_structure() {
        let g = triangle();
        let json = serde_json::to_string(&g).unwrap();
        let back: DataflowGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(g, back);
        assert_eq!(back.edge_weight("A", "C"), Some(1));
    }
}
