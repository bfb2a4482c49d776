//! Canonical configuration keys and their documented defaults.

/// Engine master endpoint (`local[*]`, `yarn`, `spark://host:port`, ...)
pub const MASTER_ENDPOINT: &str = "engine.master";
/// Application name reported to the engine
pub const APP_NAME: &str = "engine.app_name";
/// Memory per executor, in the engine's size syntax
pub const WORKER_MEMORY: &str = "engine.worker_memory";
/// Number of workers (executors)
pub const NUM_WORKERS: &str = "engine.num_workers";
/// Compute threads per worker
pub const NUM_COMPUTE_THREADS: &str = "engine.num_compute_threads";

/// Master-level computation strategy
pub const MASTER_COMPUTATION_CLASS: &str = "motif.master_computation.class";
/// Per-step computation strategy
pub const COMPUTATION_CLASS: &str = "motif.computation.class";
/// Input graph location
pub const GRAPH_PATH: &str = "motif.graph.location";
/// Whether the input graph lives on the local filesystem
pub const GRAPH_LOCAL: &str = "motif.graph.local";
/// Whether the engine produces final embeddings
pub const OUTPUT_ACTIVE: &str = "motif.output.active";
/// Where the engine writes final embeddings
pub const OUTPUT_PATH: &str = "motif.output.path";
/// Graph loader strategy
pub const GRAPH_LOADER_CLASS: &str = "motif.graph.loader.class";
/// Pattern representation strategy
pub const PATTERN_CLASS: &str = "motif.pattern.class";

pub const DEFAULT_MASTER_ENDPOINT: &str = "local[*]";
pub const DEFAULT_APP_NAME: &str = "motif";
pub const DEFAULT_WORKER_MEMORY: &str = "1g";
pub const DEFAULT_NUM_WORKERS: u32 = 1;
pub const DEFAULT_NUM_COMPUTE_THREADS: u32 = 1;
pub const DEFAULT_GRAPH_LOCAL: bool = false;
pub const DEFAULT_OUTPUT_ACTIVE: bool = true;
pub const DEFAULT_OUTPUT_PATH: &str = "Output";
pub const DEFAULT_GRAPH_LOADER: &str = "adjacency_list";
pub const DEFAULT_PATTERN: &str = "adjacency";
pub const DEFAULT_MASTER_COMPUTATION: &str = "noop";
