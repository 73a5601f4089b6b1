//! DFS numbering with tree-arc / frond classification.
//!
//! The "thickness" reported per step is the final value of the numbering
//! counter. After a full multi-component pass that is the vertex count; it
//! is a traversal-coverage scalar, not the graph-theoretic thickness.

use crate::graph::{Graph, VertexId};

/// Result of one classification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// DFS number per vertex, 1-based; 0 never survives a full pass.
    pub numbering: Vec<u32>,
    /// Edges that first reached an unvisited vertex, as (from, to).
    pub tree_arcs: Vec<(VertexId, VertexId)>,
    /// Non-tree edges from a vertex to an earlier-numbered one, as (from, to).
    pub fronds: Vec<(VertexId, VertexId)>,
    /// Highest number assigned.
    pub counter: u32,
}

/// Frame on the explicit DFS stack.
struct Frame {
    vertex: VertexId,
    parent: Option<VertexId>,
    next: usize,
}

/// Number every vertex depth-first and classify each edge exactly once.
///
/// Roots are tried in ascending id order; the counter is not reset between
/// components. Neighbors are visited in adjacency order.
pub fn classify(graph: &Graph) -> Classification {
    let n = graph.vertex_count();
    let mut numbering = vec![0u32; n];
    let mut tree_arcs = Vec::new();
    let mut fronds = Vec::new();
    let mut counter = 0u32;
    let mut stack: Vec<Frame> = Vec::new();

    for root in graph.vertices() {
        if numbering[root as usize] != 0 {
            continue;
        }
        counter += 1;
        numbering[root as usize] = counter;
        stack.push(Frame {
            vertex: root,
            parent: None,
            next: 0,
        });

        while let Some(frame) = stack.last_mut() {
            let v = frame.vertex;
            let Some(&w) = graph.neighbors(v).get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            let parent = frame.parent;

            if numbering[w as usize] == 0 {
                tree_arcs.push((v, w));
                counter += 1;
                numbering[w as usize] = counter;
                stack.push(Frame {
                    vertex: w,
                    parent: Some(v),
                    next: 0,
                });
            } else if numbering[w as usize] < numbering[v as usize] && Some(w) != parent {
                fronds.push((v, w));
            }
        }
    }

    Classification {
        numbering,
        tree_arcs,
        fronds,
        counter,
    }
}

/// The per-step "thickness" column: the final DFS numbering counter.
pub fn thickness_proxy(graph: &Graph) -> u32 {
    classify(graph).counter
}
