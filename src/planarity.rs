use hashbrown::HashMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::UnGraph;
use crate::graph::{AdjId, EdgeId, Graph, NodeId};
use crate::planarity_blocks::dfs::run_dfs;
use crate::planarity_blocks::embed::Embedder;
use crate::planarity_blocks::kuratowski::find_kuratowskis;
use crate::planarity_blocks::structures::BmGraph;

/// An edge/node subset forming a subdivision of K5 or K3,3, certifying
/// non-planarity. Transient: produced per failed test, indices refer to the
/// graph the test ran on.
#[derive(Debug, Clone)]
pub struct KuratowskiSubdivision {
    /// Node slot indices touched by the subdivision.
    pub nodes: Vec<usize>,
    /// Endpoint pairs, as node slot indices.
    pub edges: Vec<(usize, usize)>,
    /// The arena edges behind them.
    pub edge_ids: Vec<EdgeId>,
}

/// A successful embedding: the cyclic edge order around every node.
#[derive(Debug, Clone)]
pub struct PlanarEmbedding {
    /// Rotation per node slot index.
    pub rotations: Vec<Vec<EdgeId>>,
}

/// Result of a planarity test. Either the whole graph embeds or the caller
/// gets certificates pointing at the obstruction; there is no partial
/// success.
#[derive(Debug, Clone)]
pub enum Planarity {
    Planar(PlanarEmbedding),
    NonPlanar {
        kuratowskis: Vec<KuratowskiSubdivision>,
    },
}

impl Planarity {
    pub fn is_planar(&self) -> bool {
        matches!(self, Planarity::Planar(_))
    }
}

/// Boyer-Myrvold planarity tester and embedder.
///
/// `find_kuratowskis` bounds how many distinct certificates a failed test
/// extracts; heuristics that delete minimum-cost edges to restore planarity
/// raise it (the "find unlimited" mode), plain feasibility checks leave it
/// at one.
#[derive(Debug, Clone)]
pub struct BoyerMyrvold {
    pub find_kuratowskis: usize,
}

impl Default for BoyerMyrvold {
    fn default() -> Self {
        BoyerMyrvold { find_kuratowskis: 1 }
    }
}

impl BoyerMyrvold {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unlimited_search(limit: usize) -> Self {
        BoyerMyrvold {
            find_kuratowskis: limit.max(1),
        }
    }

    /// Tests `graph` with the deterministic DFS order.
    pub fn test(&self, graph: &Graph) -> Planarity {
        self.test_inner(graph, None)
    }

    /// Tests `graph` under a randomized DFS order. Distinct seeds explore
    /// different embeddings and different Kuratowski certificates, which is
    /// what the planar-subgraph multi-run heuristic feeds on.
    pub fn test_with_rng(&self, graph: &Graph, rng: &mut StdRng) -> Planarity {
        self.test_inner(graph, Some(rng))
    }

    fn test_inner(&self, graph: &Graph, rng: Option<&mut StdRng>) -> Planarity {
        let mut bm = BmGraph::new(graph);
        let mut order: Vec<usize> = (0..bm.n).collect();
        let mut rng = rng;
        if let Some(r) = rng.as_deref_mut() {
            order.shuffle(r);
            for adj in bm.adj.iter_mut() {
                adj.shuffle(r);
            }
        }
        let data = run_dfs(&bm, &order);
        match Embedder::new(&bm, &data).run() {
            Some(rotations) => {
                debug!(nodes = graph.node_count(), "graph is planar");
                Planarity::Planar(self.expand_rotations(graph, &bm, rotations))
            }
            None => {
                debug!(nodes = graph.node_count(), "graph is non-planar");
                let mut fallback = StdRng::seed_from_u64(0);
                let r = rng.unwrap_or(&mut fallback);
                let subs = find_kuratowskis(bm.n, &bm.edges, self.find_kuratowskis, r);
                let kuratowskis = subs
                    .into_iter()
                    .map(|indices| self.build_certificate(&bm, &indices))
                    .collect();
                Planarity::NonPlanar { kuratowskis }
            }
        }
    }

    /// The "find unlimited" mode: up to `limit` distinct Kuratowski
    /// subdivisions of a non-planar graph, found under shuffled extraction
    /// orders. Planar graphs yield an empty list.
    pub fn kuratowskis(
        &self,
        graph: &Graph,
        limit: usize,
        rng: &mut StdRng,
    ) -> Vec<KuratowskiSubdivision> {
        let bm = BmGraph::new(graph);
        let order: Vec<usize> = (0..bm.n).collect();
        let data = run_dfs(&bm, &order);
        if Embedder::new(&bm, &data).run().is_some() {
            return Vec::new();
        }
        find_kuratowskis(bm.n, &bm.edges, limit, rng)
            .into_iter()
            .map(|indices| self.build_certificate(&bm, &indices))
            .collect()
    }

    fn build_certificate(&self, bm: &BmGraph, indices: &[usize]) -> KuratowskiSubdivision {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let mut edge_ids = Vec::new();
        for &i in indices {
            let (u, v) = bm.edges[i];
            edges.push((u, v));
            edge_ids.push(bm.edge_ids[i]);
            for w in [u, v] {
                if !nodes.contains(&w) {
                    nodes.push(w);
                }
            }
        }
        nodes.sort_unstable();
        KuratowskiSubdivision {
            nodes,
            edges,
            edge_ids,
        }
    }

    /// Translates simple-graph rotations into full arena rotations: parallel
    /// duplicates are embedded alongside their representative (after it on
    /// the source side, mirrored before it on the target side, which traces
    /// a proper bigon face per duplicate) and each self-loop becomes two
    /// consecutive entries.
    fn expand_rotations(
        &self,
        graph: &Graph,
        bm: &BmGraph,
        rotations: Vec<Vec<usize>>,
    ) -> PlanarEmbedding {
        let mut out = vec![Vec::new(); graph.node_bound()];
        for v in graph.nodes() {
            let rot = &rotations[v.index()];
            let full = &mut out[v.index()];
            for &eid in rot {
                let rep = bm.edge_ids[eid];
                if graph.source(rep) == v {
                    full.push(rep);
                    full.extend(bm.duplicates[eid].iter().copied());
                } else {
                    full.extend(bm.duplicates[eid].iter().rev().copied());
                    full.push(rep);
                }
            }
            for &(u, l) in &bm.loops {
                if u == v.index() {
                    full.push(l);
                    full.push(l);
                }
            }
        }
        PlanarEmbedding { rotations: out }
    }
}

/// Whether the given graph is planar.
pub fn is_planar(graph: &UnGraph) -> bool {
    is_planar_graph(&Graph::from_petgraph(graph))
}

/// Whether the given arena graph is planar.
pub fn is_planar_graph(graph: &Graph) -> bool {
    let bm = BmGraph::new(graph);
    let order: Vec<usize> = (0..bm.n).collect();
    let data = run_dfs(&bm, &order);
    Embedder::new(&bm, &data).run().is_some()
}

/// Computes a combinatorial embedding and installs it as the adjacency
/// order, in place. Returns false (leaving the rotation untouched) when the
/// graph is not planar.
pub fn planar_embed(graph: &mut Graph) -> bool {
    let tester = BoyerMyrvold::new();
    let embedding = match tester.test(graph) {
        Planarity::Planar(e) => e,
        Planarity::NonPlanar { .. } => return false,
    };
    apply_embedding(graph, &embedding);
    true
}

/// Reorders every adjacency list to match the given embedding.
pub fn apply_embedding(graph: &mut Graph, embedding: &PlanarEmbedding) {
    for v in graph.nodes() {
        let order = rotation_entries(graph, v, &embedding.rotations[v.index()]);
        graph.set_rotation(v, &order);
    }
}

/// Resolves an edge rotation into the adjacency entries of `v`. Self-loops
/// appear twice in the rotation and consume both their entries.
fn rotation_entries(graph: &Graph, v: NodeId, rotation: &[EdgeId]) -> Vec<AdjId> {
    let mut pool: HashMap<usize, Vec<AdjId>> = HashMap::new();
    for a in graph.adj_list(v) {
        pool.entry(graph.adj_edge(a).index()).or_default().push(a);
    }
    let mut order = Vec::with_capacity(rotation.len());
    for e in rotation {
        let entries = pool.get_mut(&e.index()).expect("rotation edge not at node");
        order.push(entries.pop().expect("rotation uses an edge end twice"));
    }
    order
}
