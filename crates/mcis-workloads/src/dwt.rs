//! Haar discrete wavelet transform dataflow DAG.
//!
//! The Haar DWT halves the signal at each level: level `i` averages
//! `a^i_j = (prev_{2j} + prev_{2j+1}) / sqrt(2)` and detail coefficients
//! `d^i_j = (prev_{2j} - prev_{2j+1}) / sqrt(2)`, where level 0 is the
//! signal itself (`s_j` nodes).
//!
//! Two pruned projections of the full transform are exposed:
//!
//! - the *average* graph keeps the signal and every averaging level
//!   `a^1 ..= a^d` (its sink is the final average);
//! - the *coefficient* graph keeps the signal, the averaging levels
//!   `a^1 ..= a^{d-1}` needed as inputs, and the deepest detail level
//!   `d^d` (its sink is the final coefficient).
//!
//! Levels are 1-based (`a^1_0` is the first average of the signal);
//! within a level, `j` indexes nodes globally across the `k` independent
//! segment transforms, in segment order.

use mcis_core::{DataflowGraph, GraphError};
use serde::{Deserialize, Serialize};

/// Which pruned projection(s) of the Haar DWT to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaarDwtKind {
    /// Only the averaging chain.
    PrunedAverage,
    /// Only the deepest-coefficient chain.
    PrunedCoefficient,
    /// Both graphs, `[average, coefficient]`.
    Both,
}

/// Per-node values computed from a concrete signal, attached as tags.
struct DwtValues {
    signal: Vec<f64>,
    averages: Vec<Vec<f64>>,
    coefficients: Vec<Vec<f64>>,
}

/// Builds Haar DWT graph(s) from dimensions alone (no tags).
///
/// `n` is the total signal length, `d` the transform depth, and `k` the
/// number of independent contiguous segments the signal is split into.
/// Requires `n > 0`, `d > 0`, `k > 0`, and `n % (k * 2^d) == 0` so every
/// segment halves cleanly `d` times.
pub fn haar_dwt_graph(
    n: usize,
    d: u32,
    k: usize,
    kind: HaarDwtKind,
) -> Result<Vec<DataflowGraph>, GraphError> {
    validate_dimensions(n, d, k)?;
    build_graphs(n, d, k, kind, None)
}

/// Builds Haar DWT graph(s) from a concrete signal, tagging every node
/// with its computed value.
///
/// The signal length must be a power of two and at least 2; the depth is
/// `log2(len)` and the transform runs as a single segment.
pub fn haar_dwt_graph_from_signal(
    signal: &[f64],
    kind: HaarDwtKind,
) -> Result<Vec<DataflowGraph>, GraphError> {
    let n = signal.len();
    if n < 2 || !n.is_power_of_two() {
        return Err(GraphError::InvalidParameters {
            reason: format!(
                "signal length must be a power of two and at least 2, got {}",
                n
            ),
        });
    }
    let d = n.trailing_zeros();

    let mut averages: Vec<Vec<f64>> = Vec::with_capacity(d as usize);
    let mut coefficients: Vec<Vec<f64>> = Vec::with_capacity(d as usize);
    let mut current = signal.to_vec();
    for _ in 0..d {
        let len = current.len() / 2;
        let mut avg = Vec::with_capacity(len);
        let mut coef = Vec::with_capacity(len);
        for j in 0..len {
            avg.push((current[2 * j] + current[2 * j + 1]) / std::f64::consts::SQRT_2);
            coef.push((current[2 * j] - current[2 * j + 1]) / std::f64::consts::SQRT_2);
        }
        coefficients.push(coef);
        averages.push(avg.clone());
        current = avg;
    }

    let values = DwtValues {
        signal: signal.to_vec(),
        averages,
        coefficients,
    };
    build_graphs(n, d, 1, kind, Some(&values))
}

fn validate_dimensions(n: usize, d: u32, k: usize) -> Result<(), GraphError> {
    let stride = if d > 0 && d < usize::BITS {
        k.checked_mul(1usize << d)
    } else {
        None
    };
    let divisible = matches!(stride, Some(s) if s > 0 && n % s == 0);
    if n == 0 || d == 0 || k == 0 || !divisible {
        return Err(GraphError::InvalidParameters {
            reason: format!(
                "require n > 0, d > 0, k > 0 and n divisible by k*2^d, got n={} d={} k={}",
                n, d, k
            ),
        });
    }
    Ok(())
}

fn build_graphs(
    n: usize,
    d: u32,
    k: usize,
    kind: HaarDwtKind,
    values: Option<&DwtValues>,
) -> Result<Vec<DataflowGraph>, GraphError> {
    let graphs = match kind {
        HaarDwtKind::PrunedAverage => vec![average_graph(n, d, k, values)?],
        HaarDwtKind::PrunedCoefficient => vec![coefficient_graph(n, d, k, values)?],
        HaarDwtKind::Both => vec![
            average_graph(n, d, k, values)?,
            coefficient_graph(n, d, k, values)?,
        ],
    };
    tracing::debug!(n, d, k, count = graphs.len(), "built Haar DWT graphs");
    Ok(graphs)
}

/// Signal nodes plus every averaging level.
fn average_graph(
    n: usize,
    d: u32,
    k: usize,
    values: Option<&DwtValues>,
) -> Result<DataflowGraph, GraphError> {
    let mut graph = DataflowGraph::new();
    add_signal_nodes(&mut graph, n, values)?;
    for level in 1..=d {
        add_level(&mut graph, n, k, level, LevelRole::Average, values)?;
    }
    Ok(graph)
}

/// Signal nodes, averaging levels `1..d`, and the deepest detail level.
fn coefficient_graph(
    n: usize,
    d: u32,
    k: usize,
    values: Option<&DwtValues>,
) -> Result<DataflowGraph, GraphError> {
    let mut graph = DataflowGraph::new();
    add_signal_nodes(&mut graph, n, values)?;
    for level in 1..d {
        add_level(&mut graph, n, k, level, LevelRole::Average, values)?;
    }
    add_level(&mut graph, n, k, d, LevelRole::Coefficient, values)?;
    Ok(graph)
}

#[derive(Clone, Copy)]
enum LevelRole {
    Average,
    Coefficient,
}

fn add_signal_nodes(
    graph: &mut DataflowGraph,
    n: usize,
    values: Option<&DwtValues>,
) -> Result<(), GraphError> {
    graph.reserve_nodes(2 * n);
    for j in 0..n {
        let id = format!("s_{}", j);
        graph.add_node(&id)?;
        if let Some(v) = values {
            graph.set_node_tag(&id, &v.signal[j].to_string())?;
        }
    }
    Ok(())
}

/// Adds one transform level and wires it to the level below.
///
/// Each segment of the signal transforms independently; `j` indexes the
/// level's nodes globally with the segments concatenated in order.
fn add_level(
    graph: &mut DataflowGraph,
    n: usize,
    k: usize,
    level: u32,
    role: LevelRole,
    values: Option<&DwtValues>,
) -> Result<(), GraphError> {
    let segment = n / k;
    let per_segment = segment >> level;
    let prev_per_segment = segment >> (level - 1);

    for seg in 0..k {
        for l in 0..per_segment {
            let j = seg * per_segment + l;
            let id = match role {
                LevelRole::Average => format!("a^{}_{}", level, j),
                LevelRole::Coefficient => format!("d^{}_{}", level, j),
            };
            graph.add_node(&id)?;
            if let Some(v) = values {
                let value = match role {
                    LevelRole::Average => v.averages[level as usize - 1][j],
                    LevelRole::Coefficient => v.coefficients[level as usize - 1][j],
                };
                graph.set_node_tag(&id, &value.to_string())?;
            }

            let prev_base = seg * prev_per_segment;
            let left = below_node(level, prev_base + 2 * l);
            let right = below_node(level, prev_base + 2 * l + 1);
            graph.add_edge(&left, &id, 0)?;
            graph.add_edge(&right, &id, 0)?;
        }
    }
    Ok(())
}

/// Id of a node in the level below `level`; level 1 reads the signal.
fn below_node(level: u32, prev_idx: usize) -> String {
    if level == 1 {
        format!("s_{}", prev_idx)
    } else {
        format!("a^{}_{}", level - 1, prev_idx)
    }
}
