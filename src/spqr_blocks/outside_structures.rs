use hashbrown::{HashMap, HashSet};

use crate::triconnected::get_split_components;
use crate::triconnected_blocks::outside_structures::{SplitComponents, SplitKind};

/// SPQR-tree of a biconnected multigraph.
///
/// Tree nodes are the merged split components; two components are adjacent
/// exactly when they share a virtual edge pair. `find_path` answers the
/// routing question of edge insertion: which skeletons lie between two
/// vertices.
#[derive(Debug, Clone)]
pub struct SpqrTree {
    pub split: SplitComponents,
    /// Tree adjacency over component indices.
    pub adj: Vec<Vec<usize>>,
    /// Shared virtual edge per adjacent component pair, both orientations.
    pub virt_partner: HashMap<(usize, usize), usize>,
    /// Vertex set of each component's skeleton.
    pub component_vertices: Vec<HashSet<usize>>,
    /// Some component allocating each vertex.
    pub first_allocation: Vec<Option<usize>>,
}

impl SpqrTree {
    pub fn new(n: usize, edges: &[(usize, usize)]) -> Self {
        let split = get_split_components(n, edges);
        Self::from_split(n, split)
    }

    pub fn from_split(n: usize, split: SplitComponents) -> Self {
        let count = split.components.len();
        let mut owners: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, c) in split.components.iter().enumerate() {
            for &eid in &c.edges {
                owners.entry(eid).or_default().push(i);
            }
        }

        let mut adj = vec![Vec::new(); count];
        let mut virt_partner = HashMap::new();
        for (&eid, who) in &owners {
            if split.is_virtual[eid] && who.len() == 2 {
                let (a, b) = (who[0], who[1]);
                adj[a].push(b);
                adj[b].push(a);
                virt_partner.insert((a, b), eid);
                virt_partner.insert((b, a), eid);
            }
        }

        let mut component_vertices = vec![HashSet::new(); count];
        let mut first_allocation = vec![None; n];
        for (i, c) in split.components.iter().enumerate() {
            for &eid in &c.edges {
                let (a, b) = split.edges[eid];
                for v in [a, b] {
                    component_vertices[i].insert(v);
                    if first_allocation[v].is_none() {
                        first_allocation[v] = Some(i);
                    }
                }
            }
        }

        SpqrTree {
            split,
            adj,
            virt_partner,
            component_vertices,
            first_allocation,
        }
    }

    pub fn kind(&self, node: usize) -> SplitKind {
        self.split.components[node].kind.expect("committed component")
    }

    fn find_path_rec(&self, w: usize, end: usize, parent: Option<usize>, path: &mut Vec<usize>) -> bool {
        path.push(w);
        if w == end {
            return true;
        }
        for &to in &self.adj[w] {
            if Some(to) == parent {
                continue;
            }
            if self.find_path_rec(to, end, Some(w), path) {
                return true;
            }
            path.pop();
        }
        false
    }

    /// Tree path between allocation nodes of `u` and `v`, trimmed at both
    /// ends so the terminal components really contain their endpoint. Empty
    /// when either vertex has no allocation node (degenerate blocks).
    pub fn find_path(&self, u: usize, v: usize) -> Vec<usize> {
        let (Some(start), Some(end)) = (self.first_allocation[u], self.first_allocation[v]) else {
            return Vec::new();
        };
        let mut path = Vec::new();
        let found = self.find_path_rec(start, end, None, &mut path);
        debug_assert!(found, "SPQR structure is a tree");

        path.reverse();
        while path.len() > 1 && self.component_vertices[path[path.len() - 2]].contains(&u) {
            path.pop();
        }
        path.reverse();
        while path.len() > 1 && self.component_vertices[path[path.len() - 2]].contains(&v) {
            path.pop();
        }
        path
    }

    /// Real graph edges represented by `eid` in this component: the edge
    /// itself, or everything beyond the virtual edge's partner component.
    /// `skip` marks virtual edges that must stay unexpanded.
    pub fn expand_edge(&self, node: usize, eid: usize, skip: &HashSet<usize>, out: &mut Vec<usize>) {
        if !self.split.is_virtual[eid] {
            out.push(eid);
            return;
        }
        if skip.contains(&eid) {
            return;
        }
        let partner = self
            .adj[node]
            .iter()
            .copied()
            .find(|&other| self.virt_partner.get(&(node, other)) == Some(&eid))
            .expect("virtual edge pairs with a neighbor");
        self.expand_component(partner, node, skip, out);
    }

    /// Every real edge in the subtree hanging off `node`, away from `from`.
    pub fn expand_component(
        &self,
        node: usize,
        from: usize,
        skip: &HashSet<usize>,
        out: &mut Vec<usize>,
    ) {
        for &eid in &self.split.components[node].edges {
            if !self.split.is_virtual[eid] {
                out.push(eid);
                continue;
            }
            if skip.contains(&eid) {
                continue;
            }
            if self.virt_partner.get(&(node, from)) == Some(&eid) {
                continue;
            }
            let partner = self
                .adj[node]
                .iter()
                .copied()
                .find(|&other| other != from && self.virt_partner.get(&(node, other)) == Some(&eid));
            if let Some(partner) = partner {
                self.expand_component(partner, node, skip, out);
            }
        }
    }
}
