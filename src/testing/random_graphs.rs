use crate::EdgeLabel;
use crate::UnGraph;
use crate::block_cut::get_blocks;
use crate::graph::Graph;
use crate::planarity::is_planar;
use petgraph::graph::NodeIndex;
use petgraph::visit::NodeIndexable;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[allow(dead_code)]
pub fn random_graph(n: usize, m: usize, seed: usize) -> UnGraph {
    let mut rng = StdRng::seed_from_u64(seed as u64);
    let mut graph = UnGraph::new_undirected();

    for i in 0..n {
        graph.add_node(i.try_into().unwrap());
        if i > 0 {
            let j = rng.random_range(0..i);
            graph.add_edge(graph.from_index(i), graph.from_index(j), EdgeLabel::Real);
        }
    }

    for _ in n - 1..m {
        let s = rng.random_range(0..n);
        let t = rng.random_range(0..n);
        graph.add_edge(graph.from_index(s), graph.from_index(t), EdgeLabel::Real);
    }

    graph
}

/// Largest biconnected block of a random graph, with compacted node indices.
#[allow(dead_code)]
pub fn random_biconnected_graph(n: usize, m: usize, seed: usize) -> UnGraph {
    let graph = random_graph(n, m, seed);
    let arena = Graph::from_petgraph(&graph);
    let blocks = get_blocks(&arena);

    let block = blocks
        .iter()
        .max_by_key(|b| b.edges.len())
        .expect("random_graph always has an edge");

    let mut out = UnGraph::new_undirected();
    let mut remap = vec![None; arena.node_bound()];
    for &e in &block.edges {
        let (s, t) = arena.endpoints(e);
        for v in [s, t] {
            if remap[v.index()].is_none() {
                remap[v.index()] = Some(out.add_node(v.index() as u32));
            }
        }
        out.add_edge(
            remap[s.index()].unwrap(),
            remap[t.index()].unwrap(),
            EdgeLabel::Real,
        );
    }
    out
}

/// Random connected planar simple graph: a spanning tree plus random extra
/// edges, each kept only if the graph stays planar.
#[allow(dead_code)]
pub fn random_planar_graph(n: usize, attempts: usize, seed: usize) -> UnGraph {
    let mut rng = StdRng::seed_from_u64(seed as u64);
    let mut graph = UnGraph::new_undirected();

    for i in 0..n {
        graph.add_node(i.try_into().unwrap());
        if i > 0 {
            let j = rng.random_range(0..i);
            graph.add_edge(graph.from_index(i), graph.from_index(j), EdgeLabel::Real);
        }
    }

    for _ in 0..attempts {
        let s = rng.random_range(0..n);
        let t = rng.random_range(0..n);
        if s == t
            || graph
                .find_edge(NodeIndex::new(s), NodeIndex::new(t))
                .is_some()
        {
            continue;
        }
        let e = graph.add_edge(graph.from_index(s), graph.from_index(t), EdgeLabel::Real);
        if !is_planar(&graph) {
            graph.remove_edge(e);
        }
    }

    graph
}

/// A random planar graph together with `k` random non-edges (the edges to
/// re-insert in the crossing-minimization tests). The extra pairs are NOT
/// part of the returned graph.
#[allow(dead_code)]
pub fn random_planar_plus_k(
    n: usize,
    attempts: usize,
    k: usize,
    seed: usize,
) -> (UnGraph, Vec<(usize, usize)>) {
    let graph = random_planar_graph(n, attempts, seed);
    let mut rng = StdRng::seed_from_u64(seed as u64 ^ 0x9e37_79b9);
    let mut extra: Vec<(usize, usize)> = Vec::new();
    let mut guard = 0;
    while extra.len() < k && guard < 100 * (k + 1) {
        guard += 1;
        let s = rng.random_range(0..n);
        let t = rng.random_range(0..n);
        if s == t
            || graph
                .find_edge(NodeIndex::new(s), NodeIndex::new(t))
                .is_some()
            || extra.contains(&(s, t))
            || extra.contains(&(t, s))
        {
            continue;
        }
        extra.push((s, t));
    }
    (graph, extra)
}
