use crate::graph::{Graph, VertexId};
use crate::planarity;

/// Structural metrics the engine validates a step against.
///
/// Implementations must be deterministic for a fixed vertex/edge order; the
/// engine compares values across steps, so stability matters more than
/// optimality.
pub trait ConstraintOracle {
    /// Upper bound on the chromatic number, always >= 1.
    fn chromatic_number(&self, graph: &Graph) -> usize;

    /// Floor of the densest component's `edges / (vertices - 1)`.
    fn arboricity_estimate(&self, graph: &Graph) -> usize;

    fn is_planar(&self, graph: &Graph) -> bool;
}

/// Greedy largest-first coloring, component edge density, exact planarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicOracle;

impl ConstraintOracle for HeuristicOracle {
    fn chromatic_number(&self, graph: &Graph) -> usize {
        greedy_coloring(graph)
            .into_iter()
            .max()
            .map(|c| c + 1)
            .unwrap_or(1)
    }

    fn arboricity_estimate(&self, graph: &Graph) -> usize {
        arboricity_estimate(graph)
    }

    fn is_planar(&self, graph: &Graph) -> bool {
        planarity::is_planar(graph)
    }
}

/// Color vertices in largest-degree-first order (ties by ascending id),
/// each taking the smallest color unused by its colored neighbors.
pub fn greedy_coloring(graph: &Graph) -> Vec<usize> {
    let mut order: Vec<VertexId> = graph.vertices().collect();
    // Stable sort keeps ascending ids within equal degree.
    order.sort_by_key(|&v| std::cmp::Reverse(graph.degree(v)));

    let mut colors: Vec<Option<usize>> = vec![None; graph.vertex_count()];
    let mut taken: Vec<bool> = Vec::new();

    for v in order {
        taken.clear();
        taken.resize(graph.degree(v) + 1, false);
        for &w in graph.neighbors(v) {
            if let Some(c) = colors[w as usize] {
                if c < taken.len() {
                    taken[c] = true;
                }
            }
        }
        let color = taken.iter().position(|&t| !t).unwrap_or(taken.len());
        colors[v as usize] = Some(color);
    }

    colors.into_iter().map(|c| c.unwrap_or(0)).collect()
}

/// Max over connected components with more than one vertex of
/// `floor(edges / (vertices - 1))`. Isolated vertices contribute 0.
pub fn arboricity_estimate(graph: &Graph) -> usize {
    graph
        .connected_components()
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            // Each component edge is seen from both endpoints.
            let degree_sum: usize = component.iter().map(|&v| graph.degree(v)).sum();
            (degree_sum / 2) / (component.len() - 1)
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: usize) -> Graph {
        let mut g = Graph::with_vertices(n);
        for v in 1..n as VertexId {
            g.add_edge(v - 1, v);
        }
        g
    }

    fn cycle(n: usize) -> Graph {
        let mut g = path(n);
        g.add_edge(n as VertexId - 1, 0);
        g
    }

    // --- Coloring tests ---

    #[test]
    fn test_chromatic_complete() {
        for k in 1..=8 {
            assert_eq!(HeuristicOracle.chromatic_number(&Graph::complete(k)), k);
        }
    }

    #[test]
    fn test_chromatic_empty_graph() {
        assert_eq!(HeuristicOracle.chromatic_number(&Graph::new()), 1);
        assert_eq!(HeuristicOracle.chromatic_number(&Graph::with_vertices(4)), 1);
    }

    #[test]
    fn test_chromatic_bipartite_and_odd_cycle() {
        assert_eq!(HeuristicOracle.chromatic_number(&cycle(6)), 2);
        assert_eq!(HeuristicOracle.chromatic_number(&cycle(5)), 3);
    }

    #[test]
    fn test_coloring_is_proper() {
        let mut g = Graph::complete(6);
        g.remove_edge(0, 1);
        g.remove_edge(2, 3);
        let colors = greedy_coloring(&g);
        for e in g.edges() {
            assert_ne!(colors[e.a as usize], colors[e.b as usize]);
        }
    }

    #[test]
    fn test_coloring_deterministic() {
        let g = cycle(9);
        assert_eq!(greedy_coloring(&g), greedy_coloring(&g.clone()));
    }

    // --- Arboricity estimate tests ---

    #[test]
    fn test_arboricity_tree_is_one() {
        assert_eq!(arboricity_estimate(&path(7)), 1);
    }

    #[test]
    fn test_arboricity_complete_is_half_n() {
        for n in 2..=20 {
            assert_eq!(arboricity_estimate(&Graph::complete(n)), n / 2, "K{}", n);
        }
    }

    #[test]
    fn test_arboricity_isolated_vertices() {
        assert_eq!(arboricity_estimate(&Graph::with_vertices(5)), 0);
        assert_eq!(arboricity_estimate(&Graph::new()), 0);
    }

    #[test]
    fn test_arboricity_max_over_components() {
        let mut g = Graph::complete(6);
        for _ in 0..4 {
            g.add_vertex();
        }
        g.add_edge(6, 7);
        g.add_edge(7, 8);
        assert_eq!(arboricity_estimate(&g), 3);
    }

    #[test]
    fn test_oracle_planarity_delegates() {
        assert!(HeuristicOracle.is_planar(&Graph::complete(4)));
        assert!(!HeuristicOracle.is_planar(&Graph::complete(5)));
    }
}
