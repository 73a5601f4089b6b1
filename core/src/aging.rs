use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::graph::{Edge, Graph, VertexId};

/// An edge stamped with its insertion time.
///
/// Ordered by `(timestamp, edge)`; timestamps are unique within a store, so
/// the edge component never decides ordering in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeRecord {
    pub timestamp: u64,
    pub edge: Edge,
}

/// Min-heap of edges keyed by insertion time.
///
/// Records are never evicted when their edge leaves the graph by some other
/// route (random removal, rollback of the graph alone). `pop_oldest` checks
/// the live graph and discards such stale records as it meets them.
#[derive(Debug, Clone, Default)]
pub struct EdgeAgingStore {
    heap: BinaryHeap<Reverse<EdgeRecord>>,
    current_time: u64,
}

impl EdgeAgingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding every edge of `graph`, stamped 0..m-1 in ascending
    /// edge order.
    pub fn seeded(graph: &Graph) -> Self {
        let mut store = Self::new();
        for edge in graph.edges() {
            store.push_edge(edge);
        }
        store
    }

    /// Stamp `(u, v)` with the current time and insert it.
    ///
    /// Returns the assigned timestamp. Self-loops are not edges and are
    /// ignored (None); the clock does not advance for them.
    pub fn push(&mut self, u: VertexId, v: VertexId) -> Option<u64> {
        Edge::new(u, v).map(|edge| self.push_edge(edge))
    }

    pub fn push_edge(&mut self, edge: Edge) -> u64 {
        let timestamp = self.current_time;
        self.heap.push(Reverse(EdgeRecord { timestamp, edge }));
        self.current_time += 1;
        timestamp
    }

    /// Pop records until one refers to an edge still present in `graph`.
    ///
    /// Stale records are dropped on the way. Returns None once the store is
    /// exhausted; that is "nothing left to remove", not an error.
    pub fn pop_oldest(&mut self, graph: &Graph) -> Option<Edge> {
        while let Some(Reverse(record)) = self.heap.pop() {
            if graph.has_edge(record.edge.a, record.edge.b) {
                return Some(record.edge);
            }
        }
        None
    }

    /// Oldest record, live or stale.
    pub fn peek_oldest(&self) -> Option<EdgeRecord> {
        self.heap.peek().map(|Reverse(record)| *record)
    }

    /// Timestamp the next push will receive.
    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// All records, oldest first.
    pub fn entries(&self) -> Vec<EdgeRecord> {
        let mut records: Vec<EdgeRecord> = self.heap.iter().map(|Reverse(r)| *r).collect();
        records.sort_unstable();
        records
    }
}

impl PartialEq for EdgeAgingStore {
    fn eq(&self, other: &Self) -> bool {
        self.current_time == other.current_time && self.entries() == other.entries()
    }
}

impl Eq for EdgeAgingStore {}
