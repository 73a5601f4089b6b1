use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::aging::EdgeAgingStore;
use crate::error::ConfigError;
use crate::graph::{Edge, Graph};

/// Which edges a step prunes.
///
/// `OldestFirst` drains the aging store and keeps it in step with the graph.
/// `RandomSample` removes straight from the graph and leaves the store
/// untouched, so the store accumulates stale records that `pop_oldest`
/// later discards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalPolicy {
    #[default]
    OldestFirst,
    RandomSample,
}

impl RemovalPolicy {
    /// Short name used on the command line and in summary file names.
    pub fn name(&self) -> &'static str {
        match self {
            RemovalPolicy::OldestFirst => "old",
            RemovalPolicy::RandomSample => "random",
        }
    }

    /// Remove up to `count` edges. Returns how many were actually removed;
    /// asking for more than are available is not an error.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        graph: &mut Graph,
        store: &mut EdgeAgingStore,
        count: usize,
        rng: &mut R,
    ) -> usize {
        match self {
            RemovalPolicy::OldestFirst => remove_oldest(graph, store, count),
            RemovalPolicy::RandomSample => remove_random(graph, count, rng),
        }
    }
}

fn remove_oldest(graph: &mut Graph, store: &mut EdgeAgingStore, count: usize) -> usize {
    let mut removed = 0;
    while removed < count {
        let Some(edge) = store.pop_oldest(graph) else {
            break;
        };
        graph.remove_edge(edge.a, edge.b);
        removed += 1;
    }
    removed
}

fn remove_random<R: Rng + ?Sized>(graph: &mut Graph, count: usize, rng: &mut R) -> usize {
    let mut edges: Vec<Edge> = graph.edges().collect();
    edges.shuffle(rng);
    edges
        .into_iter()
        .take(count)
        .filter(|e| graph.remove_edge(e.a, e.b))
        .count()
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RemovalPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "old" => Ok(RemovalPolicy::OldestFirst),
            "random" => Ok(RemovalPolicy::RandomSample),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}
