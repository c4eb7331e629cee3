//! MCIS workbench CLI.
//!
//! Provides the `mcis` binary with subcommands for building workload
//! DAGs (MVM, FFT, Haar DWT) and running the common-subgraph solvers
//! across them. Workloads are addressed by compact specs:
//!
//! - `mvm:<rows>,<cols>`
//! - `fft:<size>`
//! - `dwt:<len>,<depth>[,<segments>[,<avg|coef|both>]]`
//!
//! Uses the same `mcis_search::McisSearch` entry point as library
//! callers, so results are identical from both.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use mcis_core::DataflowGraph;
use mcis_search::{Algorithm, McisSearch, SearchConfig};
use mcis_workloads::{fft_graph, haar_dwt_graph, mvm_graph, HaarDwtKind};

/// Common-subgraph discovery across compute DAGs.
#[derive(Parser)]
#[command(name = "mcis", about = "Common-subgraph discovery across compute DAGs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Build a workload DAG and print it.
    Generate {
        /// Workload spec, e.g. `mvm:2,2`, `fft:8`, `dwt:8,3,1,both`.
        workload: String,

        /// Emit Graphviz DOT instead of the adjacency listing.
        #[arg(long)]
        dot: bool,

        /// Emit the serialized graph as JSON.
        #[arg(long, conflicts_with = "dot")]
        json: bool,

        /// Write to a file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run an MCIS search across two or more workload DAGs.
    Search {
        /// Workload specs (two or more).
        #[arg(required = true, num_args = 2..)]
        workloads: Vec<String>,

        /// Solver: bron-kerbosch-serial (bk) or kpt.
        #[arg(short, long, default_value = "bron-kerbosch-serial")]
        algorithm: String,

        /// Restrict the search to nodes carrying this tag.
        #[arg(long)]
        tag: Option<String>,

        /// Wall-clock bound on the clique search, in milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Product-graph size above which the heuristic fallback runs.
        #[arg(long)]
        node_budget: Option<usize>,

        /// Print each result as Graphviz DOT as well.
        #[arg(long)]
        dot: bool,
    },
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Generate {
            workload,
            dot,
            json,
            out,
        } => run_generate(&workload, dot, json, out),
        Commands::Search {
            workloads,
            algorithm,
            tag,
            timeout_ms,
            node_budget,
            dot,
        } => run_search(
            &workloads,
            &algorithm,
            tag.as_deref(),
            timeout_ms,
            node_budget,
            dot,
        ),
    };
    process::exit(exit_code);
}

/// Execute the generate subcommand. Returns the process exit code.
fn run_generate(spec: &str, dot: bool, json: bool, out: Option<PathBuf>) -> i32 {
    let graphs = match parse_workload(spec) {
        Ok(graphs) => graphs,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 1;
        }
    };

    if json {
        return match serde_json::to_string_pretty(&graphs) {
            Ok(text) => write_output(text, out),
            Err(e) => {
                eprintln!("Error: failed to serialize graphs: {}", e);
                2
            }
        };
    }

    let mut rendered = String::new();
    for graph in &graphs {
        if dot {
            rendered.push_str(&graph.to_dot());
        } else {
            rendered.push_str(&graph.to_string());
        }
        rendered.push('\n');
    }

    write_output(rendered, out)
}

/// Writes rendered output to a file or stdout. Returns the exit code.
fn write_output(rendered: String, out: Option<PathBuf>) -> i32 {
    match out {
        Some(path) => {
            if let Err(e) = fs::write(&path, rendered) {
                eprintln!("Error: failed to write '{}': {}", path.display(), e);
                return 2;
            }
            0
        }
        None => {
            print!("{}", rendered);
            0
        }
    }
}

/// Execute the search subcommand. Returns the process exit code.
fn run_search(
    specs: &[String],
    algorithm: &str,
    tag: Option<&str>,
    timeout_ms: Option<u64>,
    node_budget: Option<usize>,
    dot: bool,
) -> i32 {
    let algorithm: Algorithm = match algorithm.parse() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let mut graphs = Vec::new();
    for spec in specs {
        match parse_workload(spec) {
            Ok(parsed) => graphs.extend(parsed),
            Err(msg) => {
                eprintln!("Error: {}", msg);
                return 1;
            }
        }
    }

    let mut config = SearchConfig::default();
    if let Some(ms) = timeout_ms {
        config.timeout = std::time::Duration::from_millis(ms);
    }
    if let Some(budget) = node_budget {
        config.node_budget = budget;
    }

    let search = McisSearch::with_config(config);
    let refs: Vec<&DataflowGraph> = graphs.iter().collect();
    let results = match search.run(&refs, algorithm, tag) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    println!("Found {} result(s)", results.len());
    for (i, result) in results.iter().enumerate() {
        println!("\nResult {} ({} nodes):", i + 1, result.num_nodes());
        print!("{}", result);
        if dot {
            print!("{}", result.to_dot());
        }
    }
    0
}

/// Parses a `kind:args` workload spec into its graph(s).
fn parse_workload(spec: &str) -> Result<Vec<DataflowGraph>, String> {
    let (kind, args) = spec
        .split_once(':')
        .ok_or_else(|| format!("workload spec '{}' must look like kind:args", spec))?;
    let numbers: Vec<&str> = args.split(',').collect();

    match kind {
        "mvm" => {
            let [rows, cols] = numbers[..] else {
                return Err(format!("mvm expects rows,cols, got '{}'", args));
            };
            let m = parse_number(rows)?;
            let n = parse_number(cols)?;
            mvm_graph(m, n).map(|g| vec![g]).map_err(|e| e.to_string())
        }
        "fft" => {
            let [size] = numbers[..] else {
                return Err(format!("fft expects a single size, got '{}'", args));
            };
            let n = parse_number(size)?;
            fft_graph(n).map(|g| vec![g]).map_err(|e| e.to_string())
        }
        "dwt" => {
            if numbers.len() < 2 || numbers.len() > 4 {
                return Err(format!(
                    "dwt expects len,depth[,segments[,kind]], got '{}'",
                    args
                ));
            }
            let n = parse_number(numbers[0])?;
            let d = parse_number(numbers[1])? as u32;
            let k = if numbers.len() > 2 {
                parse_number(numbers[2])?
            } else {
                1
            };
            let dwt_kind = if numbers.len() > 3 {
                parse_dwt_kind(numbers[3])?
            } else {
                HaarDwtKind::Both
            };
            haar_dwt_graph(n, d, k, dwt_kind).map_err(|e| e.to_string())
        }
        other => Err(format!(
            "unknown workload kind '{}'; expected mvm, fft, or dwt",
            other
        )),
    }
}

fn parse_number(text: &str) -> Result<usize, String> {
    text.parse()
        .map_err(|_| format!("'{}' is not a valid positive integer", text))
}

fn parse_dwt_kind(text: &str) -> Result<HaarDwtKind, String> {
    match text {
        "avg" | "average" => Ok(HaarDwtKind::PrunedAverage),
        "coef" | "coefficient" => Ok(HaarDwtKind::PrunedCoefficient),
        "both" => Ok(HaarDwtKind::Both),
        other => Err(format!(
            "unknown DWT kind '{}'; expected avg, coef, or both",
            other
        )),
    }
}
