//! Error types for graph-growth-core.

use std::path::PathBuf;

use thiserror::Error;

/// Malformed run configuration, rejected before the loop starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("initial clique size must be at least 2, got {0}")]
    CliqueTooSmall(usize),

    #[error("unknown removal policy '{0}', use 'old' or 'random'")]
    UnknownPolicy(String),

    #[error("invalid count '{0}', use 'all', N, or LO..HI")]
    InvalidCount(String),

    #[error("count range {lo}..{hi} is empty")]
    EmptyRange { lo: usize, hi: usize },

    #[error("removal count cannot be 'all'")]
    RemoveAll,

    #[error("exhaustive search limit must be positive")]
    ZeroExhaustiveLimit,

    #[error("arboricity ceiling must be positive")]
    ZeroCeiling,

    #[error("rejection budget must be positive")]
    ZeroRejectionBudget,
}

/// A step rolled back by the constraint check.
///
/// Not a fault: the engine restores the snapshot and the driver retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("arboricity estimate {found} exceeds ceiling {ceiling} at step {step}")]
    ArboricityCeiling {
        step: usize,
        found: usize,
        ceiling: usize,
    },

    #[error("chromatic number {found} differs from initial {initial} at step {step}")]
    ChromaticDrift {
        step: usize,
        found: usize,
        initial: usize,
    },
}

impl Rejection {
    pub fn step(&self) -> usize {
        match self {
            Rejection::ArboricityCeiling { step, .. } | Rejection::ChromaticDrift { step, .. } => *step,
        }
    }
}

/// Failure while persisting or rendering results.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything that stops a simulation run before finalization.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("report error: {0}")]
    Report(#[from] ReportError),
}

pub type SimulationResult<T> = Result<T, SimulationError>;
