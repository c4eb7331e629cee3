//! Matrix-vector multiplication dataflow DAG.
//!
//! The MVM compute DAG has three layers: input nodes (`v^1_z`, holding
//! the matrix entries and vector elements), elementwise products
//! (`v^2_i`, one per matrix entry), and per-row accumulation chains
//! (`v^s_r` for stages `s` in `3..=n+1`). Column `c`'s products carry
//! indices `c*m+1 ..= c*m+m`; the first column doubles as the head of
//! each row's accumulation chain.

use mcis_core::{DataflowGraph, GraphError};

/// Builds the MVM dataflow DAG for an `m x n` matrix times an
/// `n`-vector, generating input identifiers.
///
/// Inputs are numbered `v^1_1 ..= v^1_{(m+1)n}`, interleaved per column:
/// the vector element for column `c` takes `z = (m+1)c + 1`, followed by
/// that column's matrix entries `z+1 ..= z+m`.
pub fn mvm_graph(m: usize, n: usize) -> Result<DataflowGraph, GraphError> {
    if m == 0 || n == 0 {
        return Err(GraphError::InvalidParameters {
            reason: format!("matrix dimensions must be positive, got {}x{}", m, n),
        });
    }

    let mut mat = vec![vec![String::new(); n]; m];
    let mut vector = vec![String::new(); n];
    for col in 0..n {
        let z = (m + 1) * col + 1;
        vector[col] = format!("v^1_{}", z);
        for row in 0..m {
            mat[row][col] = format!("v^1_{}", z + row + 1);
        }
    }

    mvm_graph_from_ids(&mat, &vector)
}

/// Builds the MVM dataflow DAG over caller-supplied matrix and vector
/// identifiers.
///
/// `mat` is row-major (`mat[row][col]`). Every row must have the same
/// length as `vec`.
pub fn mvm_graph_from_ids(
    mat: &[Vec<String>],
    vector: &[String],
) -> Result<DataflowGraph, GraphError> {
    let m = mat.len();
    let n = vector.len();
    if m == 0 || n == 0 {
        return Err(GraphError::InvalidParameters {
            reason: "matrix and vector must be non-empty".to_string(),
        });
    }
    if let Some(row) = mat.iter().find(|row| row.len() != n) {
        return Err(GraphError::InconsistentDimensions {
            reason: format!(
                "matrix row has {} columns but the vector has {} elements",
                row.len(),
                n
            ),
        });
    }

    let mut graph = DataflowGraph::new();
    graph.reserve_nodes(m * n + n + m * n + m * (n - 1));

    for row in mat {
        for id in row {
            graph.add_node(id)?;
        }
    }
    for id in vector {
        graph.add_node(id)?;
    }

    for i in 1..=m * n {
        graph.add_node(&format!("v^2_{}", i))?;
    }
    for stage in 3..=n + 1 {
        for row in 1..=m {
            graph.add_node(&format!("v^{}_{}", stage, row))?;
        }
    }

    // Each product consumes its column's vector element and its matrix
    // entry. Products are numbered column-major; the vector element is
    // batch-wired to its whole column.
    for col in 0..n {
        let products: Vec<String> = (0..m)
            .map(|row| format!("v^2_{}", col * m + row + 1))
            .collect();
        let product_refs: Vec<&str> = products.iter().map(String::as_str).collect();
        graph.add_edge_set(&vector[col], &product_refs, &[])?;
        for row in 0..m {
            graph.add_edge(&mat[row][col], &products[row], 0)?;
        }
    }

    // Per-row accumulation chain across stages. Stage 2 is the first
    // column of products.
    for stage in 2..=n {
        for row in 1..=m {
            graph.add_edge(
                &format!("v^{}_{}", stage, row),
                &format!("v^{}_{}", stage + 1, row),
                0,
            )?;
        }
    }

    // Products from column c (c >= 1) feed accumulation stage c + 2.
    for p in (m + 1)..=(m * n) {
        let col = (p - 1) / m;
        let row = (p - 1) % m + 1;
        graph.add_edge(
            &format!("v^2_{}", p),
            &format!("v^{}_{}", col + 2, row),
            0,
        )?;
    }

    tracing::debug!(m, n, nodes = graph.num_nodes(), "built MVM graph");
    Ok(graph)
}
