//! One evolutionary step: grow, prune, validate, then commit or roll back.
//!
//! Step state machine:
//!
//! ```text
//! Idle -> Mutating -> Validating -> Committed
//!                               \-> RolledBack
//! ```
//!
//! The snapshot taken on entry is a deep copy of the graph and the aging
//! store (which carries the timestamp counter). A rejected step restores it
//! wholesale, so nothing of a failed step survives.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use tracing::debug;

use crate::aging::EdgeAgingStore;
use crate::error::Rejection;
use crate::graph::{Graph, VertexId};
use crate::oracle::{ConstraintOracle, HeuristicOracle};
use crate::removal::RemovalPolicy;

/// Default arboricity ceiling a committed step may not exceed.
pub const DEFAULT_ARBORICITY_CEILING: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub removal: RemovalPolicy,
    pub arboricity_ceiling: usize,
    /// Also reject steps whose chromatic number differs from the initial one.
    pub enforce_chromatic: bool,
    /// RNG seed; None seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            removal: RemovalPolicy::OldestFirst,
            arboricity_ceiling: DEFAULT_ARBORICITY_CEILING,
            enforce_chromatic: false,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Idle,
    Mutating,
    Validating,
    Committed,
    RolledBack,
}

/// Per-step edge counts. `add: None` attaches the new vertex to every
/// existing vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCounts {
    pub add: Option<usize>,
    pub remove: usize,
}

impl StepCounts {
    pub fn new(add: Option<usize>, remove: usize) -> Self {
        Self { add, remove }
    }
}

/// What a committed step did and the metrics it was validated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMetrics {
    pub new_vertex: VertexId,
    pub attached: usize,
    pub removed: usize,
    pub chromatic_number: usize,
    pub arboricity: usize,
}

/// Frozen engine state taken before a step mutates anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSnapshot {
    graph: Graph,
    store: EdgeAgingStore,
}

impl StepSnapshot {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn store(&self) -> &EdgeAgingStore {
        &self.store
    }
}

/// Owns the graph, its aging store, and the step RNG for one run.
pub struct GrowthEngine<O = HeuristicOracle> {
    graph: Graph,
    store: EdgeAgingStore,
    config: EngineConfig,
    oracle: O,
    rng: StdRng,
    initial_chromatic: usize,
    phase: StepPhase,
}

impl GrowthEngine<HeuristicOracle> {
    /// Start from K_k with every clique edge stamped in the store.
    pub fn new(k: usize, config: EngineConfig) -> Self {
        Self::with_oracle(k, config, HeuristicOracle)
    }
}

impl<O: ConstraintOracle> GrowthEngine<O> {
    pub fn with_oracle(k: usize, config: EngineConfig, oracle: O) -> Self {
        Self::from_graph(Graph::complete(k), config, oracle)
    }

    /// Start from an arbitrary graph; its edges are stamped in ascending order.
    pub fn from_graph(graph: Graph, config: EngineConfig, oracle: O) -> Self {
        let store = EdgeAgingStore::seeded(&graph);
        let initial_chromatic = oracle.chromatic_number(&graph);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            graph,
            store,
            config,
            oracle,
            rng,
            initial_chromatic,
            phase: StepPhase::Idle,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn store(&self) -> &EdgeAgingStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn initial_chromatic(&self) -> usize {
        self.initial_chromatic
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn snapshot(&self) -> StepSnapshot {
        StepSnapshot {
            graph: self.graph.clone(),
            store: self.store.clone(),
        }
    }

    /// Put back a snapshot taken before a step. The step counts as rolled back.
    pub fn restore(&mut self, snapshot: StepSnapshot) {
        self.graph = snapshot.graph;
        self.store = snapshot.store;
        self.phase = StepPhase::RolledBack;
    }

    /// Run one step under index `step`.
    ///
    /// On rejection the engine is back in its pre-step state and the
    /// returned `Rejection` names the step and the violated bound.
    pub fn step(&mut self, step: usize, counts: StepCounts) -> Result<StepMetrics, Rejection> {
        let snapshot = self.snapshot();

        self.phase = StepPhase::Mutating;
        let new_vertex = self.graph.add_vertex();
        let attached = self.attach(new_vertex, counts.add);
        let removed =
            self.config
                .removal
                .apply(&mut self.graph, &mut self.store, counts.remove, &mut self.rng);

        self.phase = StepPhase::Validating;
        let chromatic_number = self.oracle.chromatic_number(&self.graph);
        let arboricity = self.oracle.arboricity_estimate(&self.graph);

        if let Some(rejection) = self.validate(step, chromatic_number, arboricity) {
            self.restore(snapshot);
            debug!(step, %rejection, "step rolled back");
            return Err(rejection);
        }

        self.phase = StepPhase::Committed;
        debug!(
            step,
            new_vertex,
            attached,
            removed,
            chromatic_number,
            arboricity,
            edges = self.graph.edge_count(),
            "step committed"
        );
        Ok(StepMetrics {
            new_vertex,
            attached,
            removed,
            chromatic_number,
            arboricity,
        })
    }

    /// Connect `new_vertex` to all existing vertices, or to a uniform sample
    /// of `count` of them. Every attempted edge is stamped, even if the graph
    /// already had it.
    fn attach(&mut self, new_vertex: VertexId, count: Option<usize>) -> usize {
        let existing = new_vertex as usize;
        let targets: Vec<VertexId> = match count {
            Some(c) if c < existing => index::sample(&mut self.rng, existing, c)
                .into_iter()
                .map(|i| i as VertexId)
                .collect(),
            _ => (0..new_vertex).collect(),
        };

        for &target in &targets {
            self.graph.add_edge(target, new_vertex);
            self.store.push(target, new_vertex);
        }
        targets.len()
    }

    fn validate(&self, step: usize, chromatic: usize, arboricity: usize) -> Option<Rejection> {
        if self.config.enforce_chromatic && chromatic != self.initial_chromatic {
            return Some(Rejection::ChromaticDrift {
                step,
                found: chromatic,
                initial: self.initial_chromatic,
            });
        }
        if arboricity > self.config.arboricity_ceiling {
            return Some(Rejection::ArboricityCeiling {
                step,
                found: arboricity,
                ceiling: self.config.arboricity_ceiling,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;

    fn seeded(removal: RemovalPolicy) -> EngineConfig {
        EngineConfig {
            removal,
            seed: Some(11),
            ..EngineConfig::default()
        }
    }

    /// Oracle returning fixed metrics, to force a rejection.
    struct FixedOracle {
        chromatic: usize,
        arboricity: usize,
    }

    impl ConstraintOracle for FixedOracle {
        fn chromatic_number(&self, _graph: &Graph) -> usize {
            self.chromatic
        }
        fn arboricity_estimate(&self, _graph: &Graph) -> usize {
            self.arboricity
        }
        fn is_planar(&self, _graph: &Graph) -> bool {
            false
        }
    }

    #[test]
    fn test_new_engine_is_idle() {
        let engine = GrowthEngine::new(5, seeded(RemovalPolicy::OldestFirst));
        assert_eq!(engine.phase(), StepPhase::Idle);
        assert_eq!(engine.initial_chromatic(), 5);
        assert_eq!(engine.store().len(), 10);
    }

    #[test]
    fn test_step_attach_all() {
        let mut engine = GrowthEngine::new(5, seeded(RemovalPolicy::OldestFirst));
        let metrics = engine.step(1, StepCounts::new(None, 0)).unwrap();
        assert_eq!(metrics.new_vertex, 5);
        assert_eq!(metrics.attached, 5);
        assert_eq!(metrics.removed, 0);
        assert_eq!(engine.graph().edge_count(), 15);
        assert_eq!(engine.phase(), StepPhase::Committed);
    }

    #[test]
    fn test_step_attach_count_at_or_above_existing_means_all() {
        let mut engine = GrowthEngine::new(4, seeded(RemovalPolicy::OldestFirst));
        let metrics = engine.step(1, StepCounts::new(Some(9), 0)).unwrap();
        assert_eq!(metrics.attached, 4);
        assert_eq!(engine.graph().degree(4), 4);
    }

    #[test]
    fn test_step_attach_sample() {
        let mut engine = GrowthEngine::new(8, seeded(RemovalPolicy::OldestFirst));
        engine.step(1, StepCounts::new(Some(3), 0)).unwrap();
        assert_eq!(engine.graph().degree(8), 3);
        assert_eq!(engine.store().len(), 28 + 3);
        assert_eq!(engine.store().current_time(), 31);
    }

    #[test]
    fn test_step_oldest_removal_hits_clique_first() {
        let mut engine = GrowthEngine::new(5, seeded(RemovalPolicy::OldestFirst));
        let metrics = engine.step(1, StepCounts::new(None, 3)).unwrap();
        assert_eq!(metrics.removed, 3);
        assert!(!engine.graph().has_edge(0, 1));
        assert!(!engine.graph().has_edge(0, 2));
        assert!(!engine.graph().has_edge(0, 3));
        assert!(engine.graph().has_edge(0, 4));
    }

    #[test]
    fn test_step_random_removal_leaves_stale_records() {
        let mut engine = GrowthEngine::new(6, seeded(RemovalPolicy::RandomSample));
        engine.step(1, StepCounts::new(None, 5)).unwrap();
        assert_eq!(engine.graph().edge_count(), 21 - 5);
        assert_eq!(engine.store().len(), 21);
    }

    #[test]
    fn test_remove_more_than_available() {
        let mut engine = GrowthEngine::new(3, seeded(RemovalPolicy::OldestFirst));
        let metrics = engine.step(1, StepCounts::new(None, 100)).unwrap();
        assert_eq!(metrics.removed, 6);
        assert_eq!(engine.graph().edge_count(), 0);
    }

    #[test]
    fn test_arboricity_ceiling_rolls_back() {
        // K19 has estimate 9; growing it to K20 reaches 10.
        let mut engine = GrowthEngine::new(19, seeded(RemovalPolicy::OldestFirst));
        let before = engine.snapshot();
        let err = engine.step(4, StepCounts::new(None, 0)).unwrap_err();
        assert_eq!(
            err,
            Rejection::ArboricityCeiling {
                step: 4,
                found: 10,
                ceiling: 9
            }
        );
        assert!(err.to_string().contains("step 4"));
        assert_eq!(engine.phase(), StepPhase::RolledBack);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_chromatic_toggle() {
        let config = EngineConfig {
            enforce_chromatic: true,
            ..seeded(RemovalPolicy::OldestFirst)
        };
        let mut engine = GrowthEngine::new(5, config);
        // Ten oldest-first removals strip the whole clique, leaving only the
        // new vertex's single edge: chromatic number 2.
        let before = engine.snapshot();
        match engine.step(1, StepCounts::new(Some(1), 10)) {
            Err(Rejection::ChromaticDrift { step, initial, .. }) => {
                assert_eq!(step, 1);
                assert_eq!(initial, 5);
                assert_eq!(engine.snapshot(), before);
            }
            other => panic!("expected chromatic drift, got {:?}", other),
        }

        let mut lenient = GrowthEngine::new(5, seeded(RemovalPolicy::OldestFirst));
        assert!(lenient.step(1, StepCounts::new(Some(1), 10)).is_ok());
    }

    #[test]
    fn test_restore_after_commit_marks_rolled_back() {
        let mut engine = GrowthEngine::new(4, seeded(RemovalPolicy::OldestFirst));
        let before = engine.snapshot();
        engine.step(1, StepCounts::new(None, 2)).unwrap();
        assert_eq!(engine.phase(), StepPhase::Committed);

        engine.restore(before.clone());
        assert_eq!(engine.phase(), StepPhase::RolledBack);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_fixed_oracle_rejection_restores_store_exactly() {
        let oracle = FixedOracle {
            chromatic: 3,
            arboricity: 12,
        };
        let mut engine =
            GrowthEngine::with_oracle(6, seeded(RemovalPolicy::RandomSample), oracle);
        let graph_before = engine.graph().clone();
        let entries_before = engine.store().entries();
        let time_before = engine.store().current_time();

        assert!(engine.step(2, StepCounts::new(None, 4)).is_err());
        assert_eq!(engine.graph(), &graph_before);
        assert_eq!(engine.store().entries(), entries_before);
        assert_eq!(engine.store().current_time(), time_before);
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let run = || {
            let mut engine = GrowthEngine::new(6, seeded(RemovalPolicy::RandomSample));
            for step in 1..=5 {
                let _ = engine.step(step, StepCounts::new(Some(3), 4));
            }
            engine.graph().edges().collect::<Vec<Edge>>()
        };
        assert_eq!(run(), run());
    }
}
