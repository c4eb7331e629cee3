//! Turning cliques back into concrete subgraphs.
//!
//! A clique's vertices become output nodes named by their underscore-
//! joined components. Output edges are stricter than clique adjacency:
//! the clique rule accepts an edge in either direction per coordinate,
//! but an output edge is only recorded when the *directed* edge exists
//! in every input graph, so only unambiguous dataflow survives.

use mcis_core::{DataflowGraph, GraphError};

use crate::product::ProductVertex;

/// Materializes one clique (given as indices into `vertices`) as a
/// fresh graph. Edges carry weight 1.
pub(crate) fn clique_to_graph(
    clique: &[usize],
    vertices: &[ProductVertex],
    graphs: &[&DataflowGraph],
) -> Result<DataflowGraph, GraphError> {
    let mut out = DataflowGraph::new();
    out.reserve_nodes(clique.len());
    for &v in clique {
        out.add_node(&vertices[v].joined_id())?;
    }

    for &p in clique {
        for &q in clique {
            if p == q {
                continue;
            }
            let pv = &vertices[p];
            let qv = &vertices[q];
            let everywhere = graphs
                .iter()
                .enumerate()
                .all(|(i, g)| g.has_edge(pv.component(i), qv.component(i)));
            if everywhere {
                out.add_edge(&pv.joined_id(), &qv.joined_id(), 1)?;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(ids: [&str; 3]) -> DataflowGraph {
        let mut g = DataflowGraph::new();
        g.add_node_set(ids).unwrap();
        g.add_edge(ids[0], ids[1], 1).unwrap();
        g.add_edge(ids[1], ids[2], 1).unwrap();
        g.add_edge(ids[0], ids[2], 1).unwrap();
        g
    }

    #[test]
    fn directional_intersection_only() {
        let g1 = triangle(["A", "B", "C"]);
        let mut g2 = triangle(["X", "Y", "Z"]);
        // Reverse one edge in g2: B->C maps to Z->Y there.
        g2.remove_edge("Y", "Z").unwrap();
        g2.add_edge("Z", "Y", 1).unwrap();

        let vertices = vec![
            ProductVertex(vec!["A".into(), "X".into()]),
            ProductVertex(vec!["B".into(), "Y".into()]),
            ProductVertex(vec!["C".into(), "Z".into()]),
        ];
        let out = clique_to_graph(&[0, 1, 2], &vertices, &[&g1, &g2]).unwrap();

        assert_eq!(out.num_nodes(), 3);
        assert!(out.has_edge("A_X", "B_Y"));
        assert!(out.has_edge("A_X", "C_Z"));
        // B->C exists in g1 but Y->Z does not in g2: no output edge in
        // either direction for that pair.
        assert!(!out.has_edge("B_Y", "C_Z"));
        assert!(!out.has_edge("C_Z", "B_Y"));
        assert_eq!(out.edge_weight("A_X", "B_Y"), Some(1));
    }
}
