//! The simulation loop: step the engine, measure, report, decide whether to
//! go on.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::engine::{EngineConfig, GrowthEngine, StepCounts};
use crate::error::{ConfigError, SimulationResult};
use crate::graph::{Edge, Graph};
use crate::oracle::{ConstraintOracle, HeuristicOracle};
use crate::report::{ReportOutputs, Reporter, StepRecord};
use crate::thickness::thickness_proxy;

pub const DEFAULT_CLIQUE_SIZE: usize = 10;
/// Step budget used by exhaustive search when none is configured.
pub const EXHAUSTIVE_STEP_LIMIT: usize = 10_000;
pub const DEFAULT_EXHAUSTIVE_LIMIT: usize = 1_000;
pub const DEFAULT_ARBORICITY_ALERT: usize = 7;
pub const DEFAULT_MAX_CONSECUTIVE_REJECTIONS: usize = 100;

/// How many edges to add or remove in one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountSpec {
    /// Every existing vertex (add only).
    All,
    Exactly(usize),
    /// Uniform in `lo..=hi`, drawn per attempt.
    Between(usize, usize),
}

impl CountSpec {
    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            CountSpec::Between(lo, hi) if lo > hi => Err(ConfigError::EmptyRange { lo, hi }),
            _ => Ok(()),
        }
    }

    /// Resolve to a concrete count; None means "all".
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        match *self {
            CountSpec::All => None,
            CountSpec::Exactly(n) => Some(n),
            CountSpec::Between(lo, hi) => Some(rng.gen_range(lo..=hi)),
        }
    }
}

impl FromStr for CountSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(CountSpec::All);
        }
        let invalid = || ConfigError::InvalidCount(s.to_string());
        if let Some((lo, hi)) = s.split_once("..") {
            let hi = hi.strip_prefix('=').unwrap_or(hi);
            let lo = lo.trim().parse().map_err(|_| invalid())?;
            let hi = hi.trim().parse().map_err(|_| invalid())?;
            return Ok(CountSpec::Between(lo, hi));
        }
        s.parse().map(CountSpec::Exactly).map_err(|_| invalid())
    }
}

impl fmt::Display for CountSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountSpec::All => f.write_str("all"),
            CountSpec::Exactly(n) => write!(f, "{}", n),
            CountSpec::Between(lo, hi) => write!(f, "{}..{}", lo, hi),
        }
    }
}

/// Where each attempt's add/remove counts come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Draw counts per attempt; a rejected step is retried under the same
    /// index with fresh counts.
    Fixed { add: CountSpec, remove: CountSpec },
    /// Try every `(add, remove)` in `1..=limit` squared, shuffled, one pair
    /// per attempt. Rejections still advance the step index.
    Exhaustive { limit: usize },
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::Fixed {
            add: CountSpec::All,
            remove: CountSpec::Exactly(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Initial clique size.
    pub k: usize,
    pub engine: EngineConfig,
    pub schedule: Schedule,
    /// Stop once this many step indices have been used. Exhaustive search
    /// falls back to `EXHAUSTIVE_STEP_LIMIT`.
    pub max_steps: Option<usize>,
    pub stop_on_planar: bool,
    pub arboricity_alert: usize,
    pub stop_on_arboricity_alert: bool,
    pub stop_on_chromatic_change: bool,
    pub max_consecutive_rejections: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_CLIQUE_SIZE,
            engine: EngineConfig::default(),
            schedule: Schedule::default(),
            max_steps: None,
            stop_on_planar: false,
            arboricity_alert: DEFAULT_ARBORICITY_ALERT,
            stop_on_arboricity_alert: false,
            stop_on_chromatic_change: true,
            max_consecutive_rejections: DEFAULT_MAX_CONSECUTIVE_REJECTIONS,
        }
    }
}

impl SimulationConfig {
    /// Reject configurations that could only fail mid-loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k < 2 {
            return Err(ConfigError::CliqueTooSmall(self.k));
        }
        if self.engine.arboricity_ceiling == 0 {
            return Err(ConfigError::ZeroCeiling);
        }
        if self.max_consecutive_rejections == 0 {
            return Err(ConfigError::ZeroRejectionBudget);
        }
        match self.schedule {
            Schedule::Fixed { add, remove } => {
                add.validate()?;
                remove.validate()?;
                if remove == CountSpec::All {
                    return Err(ConfigError::RemoveAll);
                }
            }
            Schedule::Exhaustive { limit } => {
                if limit == 0 {
                    return Err(ConfigError::ZeroExhaustiveLimit);
                }
            }
        }
        Ok(())
    }

    fn step_budget(&self) -> Option<usize> {
        match self.schedule {
            Schedule::Exhaustive { .. } => self.max_steps.or(Some(EXHAUSTIVE_STEP_LIMIT)),
            Schedule::Fixed { .. } => self.max_steps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupted,
    StepBudget,
    ChromaticChanged,
    PlanarFound,
    ArboricityAlert,
    ParametersExhausted,
    RejectionBudget,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Step index reached; also the step count in the summary file name.
    pub steps: usize,
    pub records: Vec<StepRecord>,
    pub rejections: usize,
    pub stop: StopReason,
    /// Unused `(add, remove)` pairs, exhaustive search only.
    pub remaining_pairs: Option<usize>,
    pub outputs: ReportOutputs,
}

impl RunSummary {
    pub fn interrupted(&self) -> bool {
        self.stop == StopReason::Interrupted
    }
}

pub struct Simulation<O = HeuristicOracle> {
    config: SimulationConfig,
    engine: GrowthEngine<O>,
}

impl Simulation<HeuristicOracle> {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        Self::with_oracle(config, HeuristicOracle)
    }
}

impl<O: ConstraintOracle> Simulation<O> {
    pub fn with_oracle(config: SimulationConfig, oracle: O) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            engine: GrowthEngine::with_oracle(config.k, config.engine, oracle),
            config,
        })
    }

    /// Run from an arbitrary starting graph instead of K_k; `config.k` is
    /// only validated and logged.
    pub fn from_graph(config: SimulationConfig, graph: Graph, oracle: O) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            engine: GrowthEngine::from_graph(graph, config.engine, oracle),
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn engine(&self) -> &GrowthEngine<O> {
        &self.engine
    }

    /// Drive the loop until a stop condition, then finalize the reporter.
    ///
    /// `interrupt` is polled between steps. A step that was in flight when
    /// it was raised is rolled back, and every committed record is still
    /// finalized.
    pub fn run<R: Reporter + ?Sized>(
        &mut self,
        reporter: &mut R,
        interrupt: &AtomicBool,
    ) -> SimulationResult<RunSummary> {
        let initial_chromatic = self.engine.initial_chromatic();
        let budget = self.config.step_budget();
        let mut pairs = self.exhaustive_pairs();
        let mut previous_edges: BTreeSet<Edge> = self.engine.graph().edge_set().clone();
        let mut rejections = 0usize;
        let mut consecutive_rejections = 0usize;
        let mut step = 0usize;

        info!(
            k = self.config.k,
            policy = %self.config.engine.removal,
            initial_chromatic,
            "starting simulation"
        );

        let stop = loop {
            if interrupt.load(Ordering::Relaxed) {
                warn!(step, "computation stopped by user");
                break StopReason::Interrupted;
            }
            if budget.is_some_and(|limit| step >= limit) {
                break StopReason::StepBudget;
            }

            if step > 0 {
                let counts = match pairs.as_mut() {
                    Some(remaining) => match remaining.pop() {
                        Some((add, remove)) => StepCounts::new(Some(add), remove),
                        None => break StopReason::ParametersExhausted,
                    },
                    None => self.draw_counts(),
                };

                let snapshot = self.engine.snapshot();
                let outcome = self.engine.step(step, counts);
                if interrupt.load(Ordering::Relaxed) {
                    self.engine.restore(snapshot);
                    warn!(step, "computation stopped by user, step abandoned");
                    break StopReason::Interrupted;
                }

                if let Err(rejection) = outcome {
                    rejections += 1;
                    info!(
                        add = ?counts.add,
                        remove = counts.remove,
                        "{}",
                        rejection
                    );
                    if pairs.is_some() {
                        step += 1;
                    } else {
                        consecutive_rejections += 1;
                        if consecutive_rejections >= self.config.max_consecutive_rejections {
                            warn!(
                                step,
                                attempts = consecutive_rejections,
                                "giving up after consecutive rejections"
                            );
                            break StopReason::RejectionBudget;
                        }
                    }
                    continue;
                }
                consecutive_rejections = 0;

                if pairs.is_some() {
                    let current = self.engine.graph().edge_set();
                    if *current == previous_edges {
                        debug!(step, "skipping duplicate graph");
                        continue;
                    }
                    previous_edges = current.clone();
                }
            }

            let record = self.measure(step);
            reporter.record(record);
            reporter.render(self.engine.graph(), step)?;
            info!(
                step,
                nodes = record.nodes,
                edges = record.edges,
                chromatic = record.chromatic_number,
                planar = record.is_planar,
                arboricity = record.arboricity,
                thickness = record.thickness,
                "step recorded"
            );

            if self.config.stop_on_chromatic_change && record.chromatic_number != initial_chromatic {
                warn!(step, "chromatic number no longer {}", initial_chromatic);
                break StopReason::ChromaticChanged;
            }
            if record.is_planar {
                info!(step, "found planar graph");
                if self.config.stop_on_planar {
                    break StopReason::PlanarFound;
                }
            }
            if record.arboricity >= self.config.arboricity_alert {
                warn!(step, arboricity = record.arboricity, "arboricity reached {}", self.config.arboricity_alert);
                if self.config.stop_on_arboricity_alert {
                    break StopReason::ArboricityAlert;
                }
            }

            step += 1;
        };

        let outputs = reporter.finalize(self.config.engine.removal, step)?;
        let remaining_pairs = pairs.as_ref().map(Vec::len);
        if let Some(remaining) = remaining_pairs {
            info!(remaining, "unused add/remove combinations");
        }

        Ok(RunSummary {
            steps: step,
            records: reporter.records().to_vec(),
            rejections,
            stop,
            remaining_pairs,
            outputs,
        })
    }

    fn draw_counts(&mut self) -> StepCounts {
        let Schedule::Fixed { add, remove } = self.config.schedule else {
            return StepCounts::new(None, 0);
        };
        let rng = self.engine.rng();
        let add = add.draw(rng);
        let remove = remove.draw(rng).unwrap_or(0);
        StepCounts::new(add, remove)
    }

    /// Shuffled `(add, remove)` pairs; consumed from the back.
    fn exhaustive_pairs(&mut self) -> Option<Vec<(usize, usize)>> {
        let Schedule::Exhaustive { limit } = self.config.schedule else {
            return None;
        };
        let mut pairs: Vec<(usize, usize)> = (1..=limit)
            .flat_map(|add| (1..=limit).map(move |remove| (add, remove)))
            .collect();
        pairs.shuffle(self.engine.rng());
        Some(pairs)
    }

    fn measure(&self, step: usize) -> StepRecord {
        let graph = self.engine.graph();
        let oracle = self.engine.oracle();
        StepRecord {
            step,
            nodes: graph.vertex_count(),
            edges: graph.edge_count(),
            chromatic_number: oracle.chromatic_number(graph),
            arboricity: oracle.arboricity_estimate(graph),
            thickness: thickness_proxy(graph),
            is_planar: oracle.is_planar(graph),
        }
    }
}
