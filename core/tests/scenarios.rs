//! End-to-end scenarios through the public API.

use std::sync::atomic::AtomicBool;

use rand::rngs::StdRng;
use rand::SeedableRng;

use graph_growth_core::{
    classify, CountSpec, Edge, EngineConfig, Graph, GrowthEngine, Rejection, RemovalPolicy,
    Reporter, Schedule, Simulation, SimulationConfig, StepCounts, StepPhase, SummaryReporter,
};

fn oldest_first() -> EngineConfig {
    EngineConfig {
        removal: RemovalPolicy::OldestFirst,
        seed: Some(2024),
        ..EngineConfig::default()
    }
}

fn scenario_a() -> GrowthEngine {
    let mut engine = GrowthEngine::new(5, oldest_first());
    engine.step(1, StepCounts::new(None, 0)).unwrap();
    engine
}

#[test]
fn test_scenario_a_grow_k5() {
    let engine = scenario_a();
    assert_eq!(engine.graph().vertex_count(), 6);
    assert_eq!(engine.graph().edge_count(), 15);
    assert_eq!(engine.store().len(), 15);
    let stamps: Vec<u64> = engine.store().entries().iter().map(|r| r.timestamp).collect();
    assert_eq!(stamps, (0..15).collect::<Vec<_>>());
}

#[test]
fn test_scenario_b_oldest_removal() {
    let engine = scenario_a();
    let mut graph = engine.graph().clone();
    let mut store = engine.store().clone();
    let oldest: Vec<Edge> = store.entries().iter().take(6).map(|r| r.edge).collect();

    let mut rng = StdRng::seed_from_u64(1);
    let removed = RemovalPolicy::OldestFirst.apply(&mut graph, &mut store, 5, &mut rng);
    assert_eq!(removed, 5);
    for edge in &oldest[..5] {
        assert!(!graph.has_edge(edge.a, edge.b));
    }
    assert_eq!(graph.edge_count(), 10);
    assert_eq!(store.pop_oldest(&graph), Some(oldest[5]));
    assert_eq!(oldest[5], Edge::new(1, 3).unwrap());
}

#[test]
fn test_scenario_c_rejection_restores_state() {
    let mut engine = GrowthEngine::new(19, oldest_first());
    let graph_before = engine.graph().clone();
    let store_before = engine.store().clone();

    let rejection = engine.step(7, StepCounts::new(None, 0)).unwrap_err();
    assert!(matches!(
        rejection,
        Rejection::ArboricityCeiling {
            step: 7,
            found: 10,
            ceiling: 9
        }
    ));
    assert!(rejection.to_string().contains("step 7"));
    assert_eq!(engine.phase(), StepPhase::RolledBack);
    assert_eq!(engine.graph(), &graph_before);
    assert_eq!(engine.store().entries(), store_before.entries());
    assert_eq!(engine.store().current_time(), store_before.current_time());
}

#[test]
fn test_scenario_d_two_triangles() {
    let mut g = Graph::with_vertices(6);
    for &(u, v) in &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)] {
        g.add_edge(u, v);
    }
    let c = classify(&g);
    assert_eq!(c.counter, 6);
    assert_eq!(c.tree_arcs.iter().filter(|&&(u, _)| u < 3).count(), 2);
    assert_eq!(c.tree_arcs.iter().filter(|&&(u, _)| u >= 3).count(), 2);
    assert_eq!(c.fronds.iter().filter(|&&(u, _)| u < 3).count(), 1);
    assert_eq!(c.fronds.iter().filter(|&&(u, _)| u >= 3).count(), 1);
}

#[test]
fn test_full_run_writes_summary() {
    let dir = tempfile::tempdir().unwrap();
    let config = SimulationConfig {
        k: 8,
        engine: EngineConfig {
            removal: RemovalPolicy::RandomSample,
            seed: Some(9),
            ..EngineConfig::default()
        },
        schedule: Schedule::Fixed {
            add: CountSpec::Between(1, 4),
            remove: CountSpec::Between(2, 6),
        },
        max_steps: Some(6),
        stop_on_chromatic_change: false,
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::new(config).unwrap();
    let mut reporter = SummaryReporter::new(dir.path())
        .with_render_dir(dir.path().join("graphs"))
        .with_echo(false);
    let summary = sim.run(&mut reporter, &AtomicBool::new(false)).unwrap();

    assert_eq!(summary.steps, 6);
    assert_eq!(reporter.records().len(), 6);
    let table = std::fs::read_to_string(summary.outputs.table.unwrap()).unwrap();
    assert!(table.contains("Is Planar"));
    assert!(dir.path().join("graph_summary_random_6_steps.json").exists());
    assert!(dir.path().join("graphs/graph_step_5.dot").exists());
}
