use std::collections::{BTreeSet, VecDeque};

/// Vertex identifier. Vertices are numbered densely from 0.
pub type VertexId = u32;

/// An undirected edge, stored with its endpoints in ascending order.
///
/// Two edges compare equal regardless of the order their endpoints were
/// given in, which lets the aging store and the graph agree on identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub a: VertexId,
    pub b: VertexId,
}

impl Edge {
    /// Normalize `(u, v)` into an edge. Returns None for a self-loop.
    pub fn new(u: VertexId, v: VertexId) -> Option<Self> {
        match u.cmp(&v) {
            std::cmp::Ordering::Less => Some(Self { a: u, b: v }),
            std::cmp::Ordering::Greater => Some(Self { a: v, b: u }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn endpoints(&self) -> (VertexId, VertexId) {
        (self.a, self.b)
    }
}

/// Simple undirected graph: adjacency lists + ordered edge set.
///
/// Adjacency lists keep neighbors in insertion order. Traversals that care
/// about "adjacency order" (the thickness classifier) follow this order.
/// The edge set is the authority for membership and duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Graph {
    adjacency: Vec<Vec<VertexId>>,
    edges: BTreeSet<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph with `n` isolated vertices.
    pub fn with_vertices(n: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); n],
            edges: BTreeSet::new(),
        }
    }

    /// Complete graph K_k. Edges are inserted in lexicographic order.
    pub fn complete(k: usize) -> Self {
        let mut graph = Self::with_vertices(k);
        for u in 0..k as VertexId {
            for v in (u + 1)..k as VertexId {
                graph.add_edge(u, v);
            }
        }
        graph
    }

    /// Append the next vertex (id = current vertex count).
    pub fn add_vertex(&mut self) -> VertexId {
        let id = self.adjacency.len() as VertexId;
        self.adjacency.push(Vec::new());
        id
    }

    /// Add an undirected edge. No-op (returns false) for self-loops,
    /// duplicates, or endpoints outside the vertex range.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId) -> bool {
        let Some(edge) = Edge::new(u, v) else {
            return false;
        };
        if !self.contains_vertex(edge.b) || !self.edges.insert(edge) {
            return false;
        }
        self.adjacency[u as usize].push(v);
        self.adjacency[v as usize].push(u);
        true
    }

    /// Remove an undirected edge. Returns false if it was not present.
    pub fn remove_edge(&mut self, u: VertexId, v: VertexId) -> bool {
        let Some(edge) = Edge::new(u, v) else {
            return false;
        };
        if !self.edges.remove(&edge) {
            return false;
        }
        self.adjacency[u as usize].retain(|&w| w != v);
        self.adjacency[v as usize].retain(|&w| w != u);
        true
    }

    pub fn has_edge(&self, u: VertexId, v: VertexId) -> bool {
        Edge::new(u, v).is_some_and(|e| self.edges.contains(&e))
    }

    pub fn contains_vertex(&self, v: VertexId) -> bool {
        (v as usize) < self.adjacency.len()
    }

    /// Neighbors of `v` in insertion order. Empty for unknown vertices.
    pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
        self.adjacency
            .get(v as usize)
            .map(|n| n.as_slice())
            .unwrap_or(&[])
    }

    pub fn degree(&self, v: VertexId) -> usize {
        self.neighbors(v).len()
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> {
        0..self.adjacency.len() as VertexId
    }

    /// All live edges in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().copied()
    }

    pub fn edge_set(&self) -> &BTreeSet<Edge> {
        &self.edges
    }

    /// Connected components as vertex lists, ordered by smallest member.
    pub fn connected_components(&self) -> Vec<Vec<VertexId>> {
        let mut seen = vec![false; self.vertex_count()];
        let mut components = Vec::new();
        let mut queue = VecDeque::new();

        for root in self.vertices() {
            if seen[root as usize] {
                continue;
            }
            seen[root as usize] = true;
            queue.push_back(root);
            let mut component = Vec::new();

            while let Some(current) = queue.pop_front() {
                component.push(current);
                for &next in self.neighbors(current) {
                    if !seen[next as usize] {
                        seen[next as usize] = true;
                        queue.push_back(next);
                    }
                }
            }
            components.push(component);
        }

        components
    }
}
