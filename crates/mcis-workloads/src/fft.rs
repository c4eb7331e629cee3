//! Fast Fourier Transform dataflow DAG.
//!
//! Cooley-Tukey decimation-in-time: `log2(n)` butterfly stages between
//! the input layer `x_i` and the output layer `X_i`. Stage `s` nodes are
//! named `s<s>_<idx>`; each butterfly pair wires both of its inputs to
//! both of its outputs.

use mcis_core::{DataflowGraph, GraphError};

/// Builds the FFT butterfly DAG for a transform of size `n`.
///
/// `n` must be a positive power of two.
pub fn fft_graph(n: usize) -> Result<DataflowGraph, GraphError> {
    if n == 0 || !n.is_power_of_two() {
        return Err(GraphError::InvalidParameters {
            reason: format!("FFT size must be a positive power of two, got {}", n),
        });
    }

    let stages = n.trailing_zeros() as usize;
    let mut graph = DataflowGraph::new();
    graph.reserve_nodes(n * (stages + 2));

    for i in 0..n {
        graph.add_node(&format!("x_{}", i))?;
    }

    for stage in 1..=stages {
        let num_butterflies = 1usize << (stage - 1);
        let butterfly_size = n / num_butterflies;
        let half = butterfly_size / 2;

        for b in 0..num_butterflies {
            for j in 0..half {
                let top = b * butterfly_size + j;
                let bottom = top + half;

                let top_in = stage_node(stage - 1, top);
                let bottom_in = stage_node(stage - 1, bottom);
                let top_out = format!("s{}_{}", stage, top);
                let bottom_out = format!("s{}_{}", stage, bottom);

                graph.add_node(&top_out)?;
                graph.add_node(&bottom_out)?;

                graph.add_edge(&top_in, &top_out, 0)?;
                graph.add_edge(&bottom_in, &top_out, 0)?;
                graph.add_edge(&top_in, &bottom_out, 0)?;
                graph.add_edge(&bottom_in, &bottom_out, 0)?;
            }
        }
    }

    for i in 0..n {
        let output = format!("X_{}", i);
        graph.add_node(&output)?;
        graph.add_edge(&stage_node(stages, i), &output, 0)?;
    }

    tracing::debug!(n, stages, nodes = graph.num_nodes(), "built FFT graph");
    Ok(graph)
}

/// Node id at a given stage; stage 0 is the input layer.
fn stage_node(stage: usize, idx: usize) -> String {
    if stage == 0 {
        format!("x_{}", idx)
    } else {
        format!("s{}_{}", stage, idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fft_4_has_two_stages() {
        let g = fft_graph(4).unwrap();
        // 4 inputs + 2 stages of 4 + 4 outputs.
        assert_eq!(g.num_nodes(), 16);

        // Stage 1: one butterfly of size 4, halves {0,1} and {2,3}.
        for (input, output) in [
            ("x_0", "s1_0"),
            ("x_2", "s1_0"),
            ("x_0", "s1_2"),
            ("x_2", "s1_2"),
            ("x_1", "s1_1"),
            ("x_3", "s1_1"),
        ] {
            assert!(g.has_edge(input, output), "missing {} -> {}", input, output);
        }
        // Stage 2: two butterflies of size 2.
        assert!(g.has_edge("s1_0", "s2_0"));
        assert!(g.has_edge("s1_1", "s2_0"));
        assert!(g.has_edge("s1_2", "s2_2"));
        assert!(g.has_edge("s1_3", "s2_3"));
        // Output layer.
        assert!(g.has_edge("s2_0", "X_0"));
        assert!(g.has_edge("s2_3", "X_3"));
    }

    #[test]
    fn fft_graph_is_a_dag() {
        let mut g = fft_graph(8).unwrap();
        assert!(g.is_dag());
        assert_eq!(g.num_nodes(), 8 * 5);
    }

    #[test]
    fn fft_rejects_non_power_of_two() {
        for n in [0usize, 3, 6, 12] {
            assert!(
                matches!(fft_graph(n), Err(GraphError::InvalidParameters { .. })),
                "size {} should be rejected",
                n
            );
        }
    }
}
