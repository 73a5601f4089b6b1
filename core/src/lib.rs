//! graph-growth-core: growth/aging engine for evolving complete graphs.
//!
//! Starts from K_k and adds one vertex per step, attaching it to existing
//! vertices, pruning edges by age or at random, and rolling the step back
//! when the resulting graph breaks the arboricity ceiling (and optionally
//! the initial chromatic number). Each committed graph is measured for
//! chromatic number, arboricity estimate, planarity, and a DFS-numbering
//! "thickness" proxy.
//!
//! No I/O beyond the reporter; the `graph-growth` binary wires up the CLI,
//! logging, and interrupt handling.

mod aging;
mod driver;
mod engine;
mod error;
mod graph;
mod oracle;
mod planarity;
mod removal;
mod report;
mod thickness;

pub use aging::{EdgeAgingStore, EdgeRecord};
pub use driver::{
    CountSpec, RunSummary, Schedule, Simulation, SimulationConfig, StopReason,
    DEFAULT_ARBORICITY_ALERT, DEFAULT_CLIQUE_SIZE, DEFAULT_EXHAUSTIVE_LIMIT,
    DEFAULT_MAX_CONSECUTIVE_REJECTIONS, EXHAUSTIVE_STEP_LIMIT,
};
pub use engine::{
    EngineConfig, GrowthEngine, StepCounts, StepMetrics, StepPhase, StepSnapshot,
    DEFAULT_ARBORICITY_CEILING,
};
pub use error::{ConfigError, Rejection, ReportError, SimulationError, SimulationResult};
pub use graph::{Edge, Graph, VertexId};
pub use oracle::{arboricity_estimate, greedy_coloring, ConstraintOracle, HeuristicOracle};
pub use planarity::{biconnected_blocks, is_planar};
pub use removal::RemovalPolicy;
pub use report::{
    format_table, summary_stem, to_dot, MemoryReporter, ReportOutputs, Reporter, StepRecord,
    SummaryReporter,
};
pub use thickness::{classify, thickness_proxy, Classification};
