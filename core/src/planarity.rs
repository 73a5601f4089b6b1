//! Exact planarity test.
//!
//! A graph is planar iff each of its biconnected components is. Blocks are
//! found with an iterative Tarjan pass; each block is then tested with the
//! Demoucron–Malgrange–Pertuiset face-embedding procedure: embed a cycle,
//! then repeatedly pick a fragment (bridge) of the remaining graph, route a
//! path of it through an admissible face, and split that face in two. A
//! fragment with no admissible face proves non-planarity.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::graph::{Edge, Graph, VertexId};

pub fn is_planar(graph: &Graph) -> bool {
    let n = graph.vertex_count();
    if n >= 3 && graph.edge_count() > 3 * n - 6 {
        return false;
    }
    biconnected_blocks(graph)
        .iter()
        .all(|block| block_is_planar(block))
}

/// Edge sets of the biconnected components (bridges are one-edge blocks).
pub fn biconnected_blocks(graph: &Graph) -> Vec<Vec<Edge>> {
    let n = graph.vertex_count();
    // 0 = undiscovered
    let mut disc = vec![0u32; n];
    let mut low = vec![0u32; n];
    let mut clock = 0u32;
    let mut edge_stack: Vec<Edge> = Vec::new();
    let mut blocks = Vec::new();

    for root in graph.vertices() {
        if disc[root as usize] != 0 {
            continue;
        }
        clock += 1;
        disc[root as usize] = clock;
        low[root as usize] = clock;

        // (vertex, parent, next neighbor index)
        let mut stack: Vec<(VertexId, Option<VertexId>, usize)> = vec![(root, None, 0)];

        while let Some(frame) = stack.last_mut() {
            let (v, parent, idx) = *frame;
            let neighbors = graph.neighbors(v);

            if let Some(&w) = neighbors.get(idx) {
                frame.2 += 1;
                if Some(w) == parent {
                    continue;
                }
                if disc[w as usize] == 0 {
                    edge_stack.extend(Edge::new(v, w));
                    clock += 1;
                    disc[w as usize] = clock;
                    low[w as usize] = clock;
                    stack.push((w, Some(v), 0));
                } else if disc[w as usize] < disc[v as usize] {
                    edge_stack.extend(Edge::new(v, w));
                    low[v as usize] = low[v as usize].min(disc[w as usize]);
                }
                continue;
            }

            stack.pop();
            let Some(p) = parent else {
                continue;
            };
            low[p as usize] = low[p as usize].min(low[v as usize]);
            if low[v as usize] >= disc[p as usize] {
                let closing = Edge::new(p, v);
                let mut block = Vec::new();
                while let Some(e) = edge_stack.pop() {
                    block.push(e);
                    if Some(e) == closing {
                        break;
                    }
                }
                blocks.push(block);
            }
        }
    }

    blocks
}

/// A piece of the block not yet embedded: either a single chord between two
/// embedded vertices, or a connected set of unembedded vertices together
/// with the embedded vertices it touches.
struct Fragment {
    attachments: Vec<usize>,
    interior: Vec<usize>,
}

struct Embedding {
    placed: Vec<bool>,
    placed_edges: HashSet<(usize, usize)>,
    /// Each face as its boundary cycle.
    faces: Vec<Vec<usize>>,
}

fn ordered(u: usize, v: usize) -> (usize, usize) {
    if u < v {
        (u, v)
    } else {
        (v, u)
    }
}

fn block_is_planar(block: &[Edge]) -> bool {
    // A single edge or a triangle.
    if block.len() <= 3 {
        return true;
    }

    // Relabel into 0..n for dense bookkeeping.
    let mut index: HashMap<VertexId, usize> = HashMap::new();
    let mut adj: Vec<Vec<usize>> = Vec::new();
    let mut edges: Vec<(usize, usize)> = Vec::with_capacity(block.len());
    for e in block {
        let mut local = |v: VertexId| {
            *index.entry(v).or_insert_with(|| {
                adj.push(Vec::new());
                adj.len() - 1
            })
        };
        let (a, b) = (local(e.a), local(e.b));
        adj[a].push(b);
        adj[b].push(a);
        edges.push(ordered(a, b));
    }

    let n = adj.len();
    if edges.len() > 3 * n - 6 {
        return false;
    }
    if edges.len() == n {
        // A block with as many edges as vertices is a simple cycle.
        return true;
    }

    let Some(cycle) = initial_cycle(&adj, edges[0]) else {
        return false;
    };
    let mut emb = Embedding {
        placed: vec![false; n],
        placed_edges: HashSet::new(),
        faces: vec![cycle.clone(), cycle.clone()],
    };
    place_path(&mut emb, &cycle);
    if let (Some(&first), Some(&last)) = (cycle.first(), cycle.last()) {
        emb.placed_edges.insert(ordered(first, last));
    }

    while emb.placed_edges.len() < edges.len() {
        let fragments = find_fragments(&adj, &edges, &emb);

        let mut chosen: Option<(usize, usize)> = None;
        for (i, fragment) in fragments.iter().enumerate() {
            let admissible: Vec<usize> = emb
                .faces
                .iter()
                .enumerate()
                .filter(|(_, face)| fragment.attachments.iter().all(|a| face.contains(a)))
                .map(|(f, _)| f)
                .collect();
            match admissible.as_slice() {
                [] => return false,
                [only] => {
                    chosen = Some((i, *only));
                    break;
                }
                [first, ..] => {
                    if chosen.is_none() {
                        chosen = Some((i, *first));
                    }
                }
            }
        }

        let Some((fragment_idx, face_idx)) = chosen else {
            return true;
        };
        let Some(path) = fragment_path(&fragments[fragment_idx], &adj, &emb) else {
            return false;
        };
        if !split_face(&mut emb, face_idx, &path) {
            return false;
        }
        place_path(&mut emb, &path);
    }

    true
}

/// Cycle through `edge`: the edge plus a shortest detour between its
/// endpoints that avoids it.
fn initial_cycle(adj: &[Vec<usize>], edge: (usize, usize)) -> Option<Vec<usize>> {
    let (u, v) = edge;
    let mut parent: Vec<Option<usize>> = vec![None; adj.len()];
    let mut queue = VecDeque::new();
    parent[v] = Some(v);
    queue.push_back(v);

    while let Some(x) = queue.pop_front() {
        for &y in &adj[x] {
            if x == v && y == u {
                continue;
            }
            if parent[y].is_some() {
                continue;
            }
            parent[y] = Some(x);
            if y == u {
                let mut path = vec![u];
                let mut cur = u;
                while cur != v {
                    cur = parent[cur]?;
                    path.push(cur);
                }
                return Some(path);
            }
            queue.push_back(y);
        }
    }

    None
}

fn find_fragments(adj: &[Vec<usize>], edges: &[(usize, usize)], emb: &Embedding) -> Vec<Fragment> {
    let mut fragments = Vec::new();

    for &(u, v) in edges {
        if emb.placed[u] && emb.placed[v] && !emb.placed_edges.contains(&(u, v)) {
            fragments.push(Fragment {
                attachments: vec![u, v],
                interior: Vec::new(),
            });
        }
    }

    let mut seen = vec![false; adj.len()];
    let mut queue = VecDeque::new();
    for start in 0..adj.len() {
        if emb.placed[start] || seen[start] {
            continue;
        }
        seen[start] = true;
        queue.push_back(start);
        let mut interior = Vec::new();
        let mut attachments = BTreeSet::new();

        while let Some(x) = queue.pop_front() {
            interior.push(x);
            for &y in &adj[x] {
                if emb.placed[y] {
                    attachments.insert(y);
                } else if !seen[y] {
                    seen[y] = true;
                    queue.push_back(y);
                }
            }
        }

        fragments.push(Fragment {
            attachments: attachments.into_iter().collect(),
            interior,
        });
    }

    fragments
}

/// Path through `fragment` joining two distinct attachments.
fn fragment_path(fragment: &Fragment, adj: &[Vec<usize>], emb: &Embedding) -> Option<Vec<usize>> {
    let &start = fragment.attachments.first()?;
    if fragment.interior.is_empty() {
        let &end = fragment.attachments.get(1)?;
        return Some(vec![start, end]);
    }

    let inside: HashSet<usize> = fragment.interior.iter().copied().collect();
    let mut parent: HashMap<usize, usize> = HashMap::new();
    let mut queue = VecDeque::new();
    for &c in &adj[start] {
        if inside.contains(&c) && !parent.contains_key(&c) {
            parent.insert(c, start);
            queue.push_back(c);
        }
    }

    while let Some(x) = queue.pop_front() {
        for &y in &adj[x] {
            if y != start && emb.placed[y] {
                let mut path = vec![y, x];
                let mut cur = x;
                while let Some(&p) = parent.get(&cur) {
                    path.push(p);
                    if p == start {
                        break;
                    }
                    cur = p;
                }
                path.reverse();
                return Some(path);
            }
            if inside.contains(&y) && !parent.contains_key(&y) {
                parent.insert(y, x);
                queue.push_back(y);
            }
        }
    }

    None
}

/// Replace face `face_idx` by the two faces `path` cuts it into.
fn split_face(emb: &mut Embedding, face_idx: usize, path: &[usize]) -> bool {
    let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
        return false;
    };
    let face = emb.faces.swap_remove(face_idx);
    let (Some(i), Some(j)) = (
        face.iter().position(|&x| x == first),
        face.iter().position(|&x| x == last),
    ) else {
        return false;
    };
    let inner = &path[1..path.len() - 1];

    let mut one = walk(&face, i, j);
    one.extend(inner.iter().rev());
    let mut two = walk(&face, j, i);
    two.extend(inner.iter());

    emb.faces.push(one);
    emb.faces.push(two);
    true
}

/// Boundary of `face` from position `from` forward to position `to`, inclusive.
fn walk(face: &[usize], from: usize, to: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut k = from;
    loop {
        out.push(face[k]);
        if k == to {
            break;
        }
        k = (k + 1) % face.len();
    }
    out
}

fn place_path(emb: &mut Embedding, path: &[usize]) {
    for &v in path {
        emb.placed[v] = true;
    }
    for pair in path.windows(2) {
        emb.placed_edges.insert(ordered(pair[0], pair[1]));
    }
}
