use hashbrown::HashMap;

use crate::graph::{EdgeId, Graph};

pub const NIL: usize = usize::MAX;

/// Flat copy of the input graph used by the planarity tester.
///
/// Parallel edges and self-loops are set aside here: the core pass runs on
/// the simple residual, and the embedder splices the duplicates back next to
/// their representative (a pair of parallel edges or a loop embedded
/// adjacently never affects planarity).
#[derive(Debug, Clone)]
pub struct BmGraph {
    pub n: usize,
    /// Simple edges as (source, target) vertex indices.
    pub edges: Vec<(usize, usize)>,
    /// Adjacency over `edges`, by edge index.
    pub adj: Vec<Vec<usize>>,
    /// Arena edge behind each simple edge.
    pub edge_ids: Vec<EdgeId>,
    /// Parallel duplicates per simple edge index.
    pub duplicates: Vec<Vec<EdgeId>>,
    /// Self-loops, by owning vertex index.
    pub loops: Vec<(usize, EdgeId)>,
}

impl BmGraph {
    pub fn new(graph: &Graph) -> Self {
        let n = graph.node_bound();
        let mut edges = Vec::with_capacity(graph.edge_count());
        let mut adj = vec![Vec::new(); n];
        let mut edge_ids = Vec::new();
        let mut duplicates: Vec<Vec<EdgeId>> = Vec::new();
        let mut loops = Vec::new();
        let mut seen: HashMap<(usize, usize), usize> = HashMap::new();

        for e in graph.edges() {
            let (s, t) = graph.endpoints(e);
            let (mut u, mut v) = (s.index(), t.index());
            if u == v {
                loops.push((u, e));
                continue;
            }
            if u > v {
                std::mem::swap(&mut u, &mut v);
            }
            match seen.get(&(u, v)) {
                Some(&idx) => duplicates[idx].push(e),
                None => {
                    let idx = edges.len();
                    seen.insert((u, v), idx);
                    edges.push((u, v));
                    adj[u].push(idx);
                    adj[v].push(idx);
                    edge_ids.push(e);
                    duplicates.push(Vec::new());
                }
            }
        }

        BmGraph {
            n,
            edges,
            adj,
            edge_ids,
            duplicates,
            loops,
        }
    }

    /// Flat construction straight from an edge list (Kuratowski minimization
    /// re-tests subsets without an arena graph behind them).
    pub fn from_edge_list(n: usize, list: &[(usize, usize)]) -> Self {
        let mut edges = Vec::new();
        let mut adj = vec![Vec::new(); n];
        let mut seen: HashMap<(usize, usize), ()> = HashMap::new();
        for &(s, t) in list {
            let (mut u, mut v) = (s, t);
            if u == v {
                continue;
            }
            if u > v {
                std::mem::swap(&mut u, &mut v);
            }
            if seen.insert((u, v), ()).is_none() {
                let idx = edges.len();
                edges.push((u, v));
                adj[u].push(idx);
                adj[v].push(idx);
            }
        }
        BmGraph {
            n,
            edges,
            adj,
            edge_ids: Vec::new(),
            duplicates: Vec::new(),
            loops: Vec::new(),
        }
    }

    pub fn other(&self, eid: usize, u: usize) -> usize {
        let (s, t) = self.edges[eid];
        if s == u { t } else { s }
    }
}

/// DFS bookkeeping for the vertex-addition pass.
#[derive(Debug, Clone)]
pub struct DfsData {
    pub dfi: Vec<usize>,
    pub vertex_of_dfi: Vec<usize>,
    pub parent: Vec<usize>,
    pub parent_eid: Vec<usize>,
    pub lowpoint: Vec<usize>,
    pub least_ancestor: Vec<usize>,
    /// Children (as vertex indices) in ascending lowpoint order.
    pub children: Vec<Vec<usize>>,
    /// Back edges to embed at each ancestor: (descendant, eid).
    pub back_targets: Vec<Vec<(usize, usize)>>,
    pub roots: Vec<usize>,
}

impl DfsData {
    pub fn new(n: usize) -> Self {
        DfsData {
            dfi: vec![NIL; n],
            vertex_of_dfi: vec![NIL; n],
            parent: vec![NIL; n],
            parent_eid: vec![NIL; n],
            lowpoint: vec![NIL; n],
            least_ancestor: vec![NIL; n],
            children: vec![Vec::new(); n],
            back_targets: vec![Vec::new(); n],
            roots: Vec::new(),
        }
    }
}
