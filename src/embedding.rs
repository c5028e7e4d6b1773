use crate::graph::{AdjId, EdgeId, Graph, NodeId};
use crate::graph_blocks::disjoint_sets::DisjointSets;

/// Faces of a graph with a rotation system.
///
/// Darts are adjacency entries; the successor of dart `a` inside its face is
/// the rotation successor of `twin(a)`. The orbits of that permutation are
/// the faces of the embedding the rotation system describes (on some
/// orientable surface; see [`Embedding::is_planar`] for the genus check).
#[derive(Debug, Clone)]
pub struct Embedding {
    /// Darts of each face, in traversal order.
    pub faces: Vec<Vec<AdjId>>,
    /// Face id per adjacency slot index.
    face_of: Vec<usize>,
}

impl Embedding {
    pub fn new(graph: &Graph) -> Self {
        let mut face_of = vec![usize::MAX; graph.adj_bound()];
        let mut faces = Vec::new();

        for v in graph.nodes() {
            for a in graph.adj_list(v) {
                if face_of[a.index()] != usize::MAX {
                    continue;
                }
                let id = faces.len();
                let mut orbit = Vec::new();
                let mut cur = a;
                loop {
                    face_of[cur.index()] = id;
                    orbit.push(cur);
                    cur = graph.next_adj(graph.twin(cur));
                    if cur == a {
                        break;
                    }
                }
                faces.push(orbit);
            }
        }

        Embedding { faces, face_of }
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn face_of(&self, a: AdjId) -> usize {
        self.face_of[a.index()]
    }

    /// The two faces separated by `e` (equal for a bridge).
    pub fn faces_of_edge(&self, graph: &Graph, e: EdgeId) -> (usize, usize) {
        let a = graph
            .adj_list(graph.source(e))
            .into_iter()
            .find(|&x| graph.adj_edge(x) == e)
            .unwrap();
        (self.face_of(a), self.face_of(graph.twin(a)))
    }

    /// Faces incident to `v`, deduplicated, in rotation order.
    pub fn faces_at(&self, graph: &Graph, v: NodeId) -> Vec<usize> {
        let mut out = Vec::new();
        for a in graph.adj_list(v) {
            let f = self.face_of(a);
            if !out.contains(&f) {
                out.push(f);
            }
        }
        out
    }

    /// True iff the rotation system describes a genus-0 (planar) embedding:
    /// Euler's formula `V - E + F = 2` holds in every connected component
    /// that has at least one edge.
    pub fn is_planar(&self, graph: &Graph) -> bool {
        let mut sets = DisjointSets::new(graph.node_bound());
        for e in graph.edges() {
            let (s, t) = graph.endpoints(e);
            sets.union(s.index(), t.index());
        }

        let mut v_count = vec![0usize; graph.node_bound()];
        let mut e_count = vec![0usize; graph.node_bound()];
        let mut f_count = vec![0usize; graph.node_bound()];
        for v in graph.nodes() {
            v_count[sets.find(v.index())] += 1;
        }
        for e in graph.edges() {
            e_count[sets.find(graph.source(e).index())] += 1;
        }
        for face in &self.faces {
            let owner = graph.adj_node(face[0]);
            f_count[sets.find(owner.index())] += 1;
        }

        (0..graph.node_bound())
            .all(|c| e_count[c] == 0 || v_count[c] + f_count[c] == e_count[c] + 2)
    }
}
