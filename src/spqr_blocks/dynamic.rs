use hashbrown::{HashMap, HashSet};

use crate::triconnected::get_split_components;
use crate::triconnected_blocks::outside_structures::SplitKind;

/// One skeleton of the dynamic tree.
#[derive(Debug, Clone)]
struct DynNode {
    kind: SplitKind,
    edges: Vec<usize>,
    vertices: HashSet<usize>,
}

/// SPQR-tree under incremental updates.
///
/// Supports `split_edge` (an edge of the represented graph is subdivided;
/// bonds and rigids sprout an S-node for the two halves, polygons just grow)
/// and `add_edge` between co-allocated vertices: the allocation path
/// collapses into one rigid component, after polygons shed the cycle
/// sections and bonds shed the bundles that do not participate. Queries
/// never mutate; all mutation goes through those two calls.
///
/// Work per update is proportional to the skeletons touched, not to the
/// whole graph, which is what makes the repeated-insertion pipeline cheaper
/// than rebuilding the decomposition per edge.
#[derive(Debug, Clone)]
pub struct DynamicSpqrTree {
    /// Edge table, real and virtual; grows monotonically, dead entries stay.
    pub edges: Vec<(usize, usize)>,
    pub is_virtual: Vec<bool>,
    nodes: Vec<Option<DynNode>>,
    owners: HashMap<usize, Vec<usize>>,
}

impl DynamicSpqrTree {
    pub fn new(n: usize, edges: &[(usize, usize)]) -> Self {
        let split = get_split_components(n, edges);
        let mut tree = DynamicSpqrTree {
            edges: split.edges.clone(),
            is_virtual: split.is_virtual.clone(),
            nodes: Vec::new(),
            owners: HashMap::new(),
        };
        for c in &split.components {
            let id = tree.nodes.len();
            let mut vertices = HashSet::new();
            for &eid in &c.edges {
                let (a, b) = split.edges[eid];
                vertices.insert(a);
                vertices.insert(b);
                tree.owners.entry(eid).or_default().push(id);
            }
            tree.nodes.push(Some(DynNode {
                kind: c.kind.expect("committed component"),
                edges: c.edges.clone(),
                vertices,
            }));
        }
        tree
    }

    pub fn live_nodes(&self) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&i| self.nodes[i].is_some())
            .collect()
    }

    pub fn kind(&self, node: usize) -> SplitKind {
        self.nodes[node].as_ref().unwrap().kind
    }

    pub fn edges_of(&self, node: usize) -> &[usize] {
        &self.nodes[node].as_ref().unwrap().edges
    }

    pub fn vertices_of(&self, node: usize) -> &HashSet<usize> {
        &self.nodes[node].as_ref().unwrap().vertices
    }

    fn alloc_edge(&mut self, u: usize, v: usize, virt: bool) -> usize {
        self.edges.push((u, v));
        self.is_virtual.push(virt);
        self.edges.len() - 1
    }

    fn alloc_node(&mut self, kind: SplitKind, edges: Vec<usize>) -> usize {
        let mut vertices = HashSet::new();
        for &eid in &edges {
            let (a, b) = self.edges[eid];
            vertices.insert(a);
            vertices.insert(b);
        }
        let id = self.nodes.len();
        for &eid in &edges {
            self.owners.entry(eid).or_default().push(id);
        }
        self.nodes.push(Some(DynNode {
            kind,
            edges,
            vertices,
        }));
        id
    }

    fn kill_node(&mut self, node: usize) {
        if let Some(n) = self.nodes[node].take() {
            for eid in n.edges {
                if let Some(list) = self.owners.get_mut(&eid) {
                    list.retain(|&x| x != node);
                }
            }
        }
    }

    /// The node on the far side of a virtual edge.
    pub fn partner(&self, node: usize, eid: usize) -> Option<usize> {
        let list = self.owners.get(&eid)?;
        list.iter().copied().find(|&x| x != node)
    }

    pub fn neighbors(&self, node: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for &eid in self.edges_of(node) {
            if self.is_virtual[eid] {
                if let Some(other) = self.partner(node, eid) {
                    out.push((other, eid));
                }
            }
        }
        out
    }

    fn allocation(&self, v: usize) -> Option<usize> {
        self.live_nodes()
            .into_iter()
            .find(|&i| self.vertices_of(i).contains(&v))
    }

    fn path_rec(&self, w: usize, end: usize, parent: Option<usize>, path: &mut Vec<usize>) -> bool {
        path.push(w);
        if w == end {
            return true;
        }
        for (to, _) in self.neighbors(w) {
            if Some(to) == parent {
                continue;
            }
            if self.path_rec(to, end, Some(w), path) {
                return true;
            }
            path.pop();
        }
        false
    }

    /// Allocation path between `u` and `v`, trimmed like the static tree's.
    pub fn find_path(&self, u: usize, v: usize) -> Vec<usize> {
        let (Some(start), Some(end)) = (self.allocation(u), self.allocation(v)) else {
            return Vec::new();
        };
        let mut path = Vec::new();
        let found = self.path_rec(start, end, None, &mut path);
        debug_assert!(found);
        path.reverse();
        while path.len() > 1 && self.vertices_of(path[path.len() - 2]).contains(&u) {
            path.pop();
        }
        path.reverse();
        while path.len() > 1 && self.vertices_of(path[path.len() - 2]).contains(&v) {
            path.pop();
        }
        path
    }

    /// Real edges represented by `eid` seen from `node`; virtual edges in
    /// `skip` stay closed.
    pub fn expand_edge(&self, node: usize, eid: usize, skip: &HashSet<usize>, out: &mut Vec<usize>) {
        if !self.is_virtual[eid] {
            out.push(eid);
            return;
        }
        if skip.contains(&eid) {
            return;
        }
        if let Some(other) = self.partner(node, eid) {
            self.expand_component(other, Some(eid), skip, out);
        }
    }

    fn expand_component(
        &self,
        node: usize,
        via: Option<usize>,
        skip: &HashSet<usize>,
        out: &mut Vec<usize>,
    ) {
        for &eid in self.edges_of(node) {
            if Some(eid) == via {
                continue;
            }
            self.expand_edge(node, eid, skip, out);
        }
    }

    /// Records the subdivision of `eid` at the fresh vertex `mid` and
    /// returns the table ids of the two halves.
    pub fn split_edge(&mut self, eid: usize, mid: usize) -> (usize, usize) {
        let (a, b) = self.edges[eid];
        let owners = self.owners.get(&eid).cloned().unwrap_or_default();
        debug_assert_eq!(owners.len(), 1, "only real edges are subdivided");
        let node = owners[0];

        let e1 = self.alloc_edge(a, mid, false);
        let e2 = self.alloc_edge(mid, b, false);

        match self.kind(node) {
            SplitKind::S => {
                // the polygon absorbs the new vertex
                let n = self.nodes[node].as_mut().unwrap();
                n.edges.retain(|&x| x != eid);
                n.edges.push(e1);
                n.edges.push(e2);
                n.vertices.insert(mid);
                self.owners.remove(&eid);
                self.owners.entry(e1).or_default().push(node);
                self.owners.entry(e2).or_default().push(node);
            }
            SplitKind::P | SplitKind::R => {
                // the halves become a fresh S-node behind a virtual edge
                let virt = self.alloc_edge(a, b, true);
                let n = self.nodes[node].as_mut().unwrap();
                n.edges.retain(|&x| x != eid);
                n.edges.push(virt);
                self.owners.remove(&eid);
                self.owners.entry(virt).or_default().push(node);
                self.alloc_node(SplitKind::S, vec![e1, e2, virt]);
            }
        }
        (e1, e2)
    }

    /// Cycle order of an S-node: vertex -> its two incident cycle edges.
    fn cycle_adjacency(&self, node: usize) -> HashMap<usize, Vec<usize>> {
        let mut adj: HashMap<usize, Vec<usize>> = HashMap::new();
        for &eid in self.edges_of(node) {
            let (a, b) = self.edges[eid];
            adj.entry(a).or_default().push(eid);
            adj.entry(b).or_default().push(eid);
        }
        adj
    }

    /// Walks the polygon from `from` along `first` until `stop` is hit,
    /// collecting the traversed edges.
    fn walk_arc(
        &self,
        adj: &HashMap<usize, Vec<usize>>,
        from: usize,
        first: usize,
        stop: &dyn Fn(usize) -> bool,
    ) -> (Vec<usize>, usize) {
        let mut arc = vec![first];
        let mut at = {
            let (a, b) = self.edges[first];
            if a == from { b } else { a }
        };
        while !stop(at) {
            let eid = adj[&at]
                .iter()
                .copied()
                .find(|&e| e != *arc.last().unwrap())
                .expect("polygon vertex has two cycle edges");
            let (a, b) = self.edges[eid];
            let next = if a == at { b } else { a };
            arc.push(eid);
            at = next;
        }
        (arc, at)
    }

    /// Turns an arc into its contribution to a merge: nothing when empty,
    /// the bare edge when single, otherwise a split-off polygon behind a
    /// fresh virtual edge.
    fn contribute_arc(&mut self, arc: Vec<usize>, x: usize, y: usize, node: usize) -> Option<usize> {
        match arc.len() {
            0 => None,
            1 => {
                self.detach(arc[0], node);
                Some(arc[0])
            }
            _ => {
                let virt = self.alloc_edge(x, y, true);
                for &eid in &arc {
                    self.detach(eid, node);
                }
                let mut edges = arc;
                edges.push(virt);
                self.alloc_node(SplitKind::S, edges);
                Some(virt)
            }
        }
    }

    /// Removes `eid` from `node`'s ownership without touching other owners.
    fn detach(&mut self, eid: usize, node: usize) {
        if let Some(list) = self.owners.get_mut(&eid) {
            list.retain(|&x| x != node);
        }
        if let Some(n) = self.nodes[node].as_mut() {
            n.edges.retain(|&x| x != eid);
        }
    }

    fn classify(&self, edges: &[usize]) -> SplitKind {
        let mut degree: HashMap<usize, usize> = HashMap::new();
        for &eid in edges {
            let (a, b) = self.edges[eid];
            *degree.entry(a).or_default() += 1;
            *degree.entry(b).or_default() += 1;
        }
        if degree.len() == 2 {
            SplitKind::P
        } else if degree.values().all(|&d| d == 2) {
            SplitKind::S
        } else {
            SplitKind::R
        }
    }

    /// Inserts a real edge between two co-allocated vertices, restructuring
    /// the tree so its invariants survive. Returns the new edge's table id.
    /// Calling this for vertices in different blocks is a contract
    /// violation; the caller routes through the block-cut structure first.
    pub fn add_edge(&mut self, u: usize, v: usize) -> usize {
        debug_assert_ne!(u, v);
        let new_eid = self.alloc_edge(u, v, false);

        // a bond on exactly (u, v) absorbs the edge with no restructuring
        let direct_bond = self.live_nodes().into_iter().find(|&i| {
            self.kind(i) == SplitKind::P
                && self.vertices_of(i).contains(&u)
                && self.vertices_of(i).contains(&v)
        });
        if let Some(node) = direct_bond {
            self.nodes[node].as_mut().unwrap().edges.push(new_eid);
            self.owners.entry(new_eid).or_default().push(node);
            return new_eid;
        }

        let path = self.find_path(u, v);
        debug_assert!(!path.is_empty(), "endpoints must share a block");

        if path.len() == 1 {
            self.add_edge_single(path[0], u, v, new_eid);
        } else {
            self.merge_path(&path, u, v, new_eid);
        }
        new_eid
    }

    fn add_edge_single(&mut self, node: usize, u: usize, v: usize, new_eid: usize) {
        match self.kind(node) {
            SplitKind::P => unreachable!("handled by the direct bond case"),
            SplitKind::R => {
                let existing = self
                    .edges_of(node)
                    .iter()
                    .copied()
                    .find(|&e| {
                        let (a, b) = self.edges[e];
                        (a, b) == (u, v) || (a, b) == (v, u)
                    });
                match existing {
                    None => {
                        self.nodes[node].as_mut().unwrap().edges.push(new_eid);
                        self.owners.entry(new_eid).or_default().push(node);
                    }
                    Some(e) => {
                        // parallel to a skeleton edge: interpose a bond
                        self.detach(e, node);
                        let virt = self.alloc_edge(u, v, true);
                        self.nodes[node].as_mut().unwrap().edges.push(virt);
                        self.owners.entry(virt).or_default().push(node);
                        self.alloc_node(SplitKind::P, vec![e, virt, new_eid]);
                    }
                }
            }
            SplitKind::S => {
                // chord: the cycle splits into two arcs around a new bond
                let adj = self.cycle_adjacency(node);
                debug_assert_eq!(adj[&u].len(), 2, "polygon vertex has two cycle edges");
                let (first, second) = (adj[&u][0], adj[&u][1]);
                let stop = |x: usize| x == v;
                let (arc1, _) = self.walk_arc(&adj, u, first, &stop);
                let (arc2, _) = self.walk_arc(&adj, u, second, &stop);
                let c1 = self.contribute_arc(arc1, u, v, node);
                let c2 = self.contribute_arc(arc2, u, v, node);
                let mut bond = vec![new_eid];
                bond.extend(c1);
                bond.extend(c2);
                self.kill_node(node);
                self.alloc_node(SplitKind::P, bond);
            }
        }
    }

    /// Collapses the allocation path into a single rigid node: polygons and
    /// bonds on the path shed their uninvolved parts first, then the glued
    /// union plus the new edge forms the merged skeleton.
    fn merge_path(&mut self, path: &[usize], u: usize, v: usize, new_eid: usize) {
        let mut merged_edges: Vec<usize> = vec![new_eid];

        for (i, &node) in path.iter().enumerate() {
            let prev_virt = (i > 0).then(|| {
                self.edges_of(node)
                    .iter()
                    .copied()
                    .find(|&e| self.is_virtual[e] && self.partner(node, e) == Some(path[i - 1]))
                    .expect("path nodes share a virtual pair")
            });
            let next_virt = (i + 1 < path.len()).then(|| {
                self.edges_of(node)
                    .iter()
                    .copied()
                    .find(|&e| self.is_virtual[e] && self.partner(node, e) == Some(path[i + 1]))
                    .expect("path nodes share a virtual pair")
            });

            match self.kind(node) {
                SplitKind::R => {
                    for &eid in &self.edges_of(node).to_vec() {
                        if Some(eid) == prev_virt || Some(eid) == next_virt {
                            continue;
                        }
                        self.detach(eid, node);
                        merged_edges.push(eid);
                    }
                }
                SplitKind::P => {
                    let attachments: Vec<usize> =
                        prev_virt.into_iter().chain(next_virt).collect();
                    let bundle: Vec<usize> = self
                        .edges_of(node)
                        .iter()
                        .copied()
                        .filter(|e| !attachments.contains(e))
                        .collect();
                    let (a, b) = {
                        let mut it = self.vertices_of(node).iter().copied();
                        (it.next().unwrap(), it.next().unwrap())
                    };
                    match bundle.len() {
                        0 => {}
                        1 => {
                            self.detach(bundle[0], node);
                            merged_edges.push(bundle[0]);
                        }
                        _ => {
                            let virt = self.alloc_edge(a, b, true);
                            for &eid in &bundle {
                                self.detach(eid, node);
                            }
                            let mut edges = bundle;
                            edges.push(virt);
                            self.alloc_node(SplitKind::P, edges);
                            merged_edges.push(virt);
                        }
                    }
                }
                SplitKind::S => {
                    let terminal = if i == 0 { u } else { v };
                    let contributions = self.shed_polygon(node, prev_virt, next_virt, terminal);
                    merged_edges.extend(contributions);
                }
            }
        }

        for &node in path {
            self.kill_node(node);
        }
        let kind = self.classify(&merged_edges);
        self.alloc_node(kind, merged_edges);
    }

    /// Splits a path polygon into the arcs between its terminals (the
    /// attachment virtual edges, plus the inserted endpoint on a terminal
    /// polygon) and returns the arcs' contributions.
    fn shed_polygon(
        &mut self,
        node: usize,
        prev_virt: Option<usize>,
        next_virt: Option<usize>,
        terminal: usize,
    ) -> Vec<usize> {
        let adj = self.cycle_adjacency(node);
        let mut out = Vec::new();

        match (prev_virt, next_virt) {
            (Some(ea), Some(eb)) => {
                // interior: two arcs between the attachment edges
                let (a1, b1) = self.edges[ea];
                let (a2, b2) = self.edges[eb];
                let is_terminal = |x: usize| x == a2 || x == b2;
                for from in [a1, b1] {
                    let first = adj[&from]
                        .iter()
                        .copied()
                        .find(|&e| e != ea)
                        .expect("cycle degree two");
                    if first == eb {
                        // attachments adjacent on the cycle, empty arc
                        continue;
                    }
                    let (arc, end) = self.walk_arc_until(&adj, from, first, &is_terminal, eb);
                    out.extend(self.contribute_arc(arc, from, end, node));
                }
            }
            (one, None) | (None, one) => {
                let ea = one.expect("terminal path polygon has one attachment");
                let (a1, b1) = self.edges[ea];
                for from in [a1, b1] {
                    if from == terminal {
                        continue;
                    }
                    let first = adj[&from]
                        .iter()
                        .copied()
                        .find(|&e| e != ea)
                        .expect("cycle degree two");
                    let stop = |x: usize| x == terminal;
                    let (arc, _) = self.walk_arc(&adj, from, first, &stop);
                    out.extend(self.contribute_arc(arc, from, terminal, node));
                }
            }
        }
        out
    }

    /// Like [`walk_arc`](Self::walk_arc) but stops when the next edge would
    /// be `forbidden` or a terminal vertex is reached.
    fn walk_arc_until(
        &self,
        adj: &HashMap<usize, Vec<usize>>,
        from: usize,
        first: usize,
        is_terminal: &dyn Fn(usize) -> bool,
        forbidden: usize,
    ) -> (Vec<usize>, usize) {
        let mut arc = vec![first];
        let mut at = {
            let (a, b) = self.edges[first];
            if a == from { b } else { a }
        };
        while !is_terminal(at) {
            let eid = adj[&at]
                .iter()
                .copied()
                .find(|&e| e != *arc.last().unwrap() && e != forbidden)
                .expect("polygon vertex has two cycle edges");
            let (a, b) = self.edges[eid];
            let next = if a == at { b } else { a };
            arc.push(eid);
            at = next;
        }
        (arc, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spqr_blocks::outside_structures::SpqrTree;
    use crate::testing::random_graphs::random_biconnected_graph;
    use petgraph::visit::EdgeRef;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// SPQR-trees are unique, so the dynamic tree and a from-scratch
    /// decomposition of the same graph must produce identical component
    /// multisets.
    fn canonical_dyn(tree: &DynamicSpqrTree) -> Vec<(char, Vec<usize>)> {
        let mut out: Vec<(char, Vec<usize>)> = tree
            .live_nodes()
            .into_iter()
            .map(|i| {
                let mut vs: Vec<usize> = tree.vertices_of(i).iter().copied().collect();
                vs.sort_unstable();
                let k = match tree.kind(i) {
                    SplitKind::P => 'P',
                    SplitKind::S => 'S',
                    SplitKind::R => 'R',
                };
                (k, vs)
            })
            .collect();
        out.sort();
        out
    }

    fn canonical_static(n: usize, edges: &[(usize, usize)]) -> Vec<(char, Vec<usize>)> {
        let tree = SpqrTree::new(n, edges);
        let mut out: Vec<(char, Vec<usize>)> = tree
            .split
            .components
            .iter()
            .map(|c| {
                let mut vs: Vec<usize> = c
                    .edges
                    .iter()
                    .flat_map(|&eid| {
                        let (a, b) = tree.split.edges[eid];
                        [a, b]
                    })
                    .collect();
                vs.sort_unstable();
                vs.dedup();
                let k = match c.kind.unwrap() {
                    SplitKind::P => 'P',
                    SplitKind::S => 'S',
                    SplitKind::R => 'R',
                };
                (k, vs)
            })
            .collect();
        out.sort();
        out
    }

    #[test]
    fn test_chord_into_cycle_builds_theta() {
        let edges: Vec<(usize, usize)> = (0..6).map(|i| (i, (i + 1) % 6)).collect();
        let mut tree = DynamicSpqrTree::new(6, &edges);
        tree.add_edge(0, 3);
        // theta graph: one bond and two polygons
        let mut kinds: Vec<SplitKind> = tree.live_nodes().iter().map(|&i| tree.kind(i)).collect();
        kinds.sort_by_key(|k| format!("{}", k));
        assert_eq!(kinds.len(), 3);
        assert_eq!(
            kinds.iter().filter(|&&k| k == SplitKind::S).count(),
            2
        );
        assert_eq!(
            kinds.iter().filter(|&&k| k == SplitKind::P).count(),
            1
        );
    }

    #[test]
    fn test_parallel_edge_into_rigid_interposes_a_bond() {
        let k4 = vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
        let mut tree = DynamicSpqrTree::new(4, &k4);
        tree.add_edge(0, 1);
        let mut accumulated = k4.clone();
        accumulated.push((0, 1));
        assert_eq!(canonical_dyn(&tree), canonical_static(4, &accumulated));
    }

    #[test]
    fn test_split_edge_matches_rebuild() {
        let k4 = vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
        let mut tree = DynamicSpqrTree::new(4, &k4);
        // subdividing the (2,3) edge of the rigid spawns an S-node
        let eid = (0..tree.edges.len())
            .find(|&e| tree.edges[e] == (2, 3))
            .unwrap();
        tree.split_edge(eid, 4);
        let rebuilt = vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 4), (4, 3)];
        assert_eq!(canonical_dyn(&tree), canonical_static(5, &rebuilt));
    }

    #[test]
    fn test_random_update_sequences_match_rebuild() {
        for seed in 0..30 {
            let pg = random_biconnected_graph(4 + seed % 5, 8 + seed % 8, seed);
            let n0 = pg.node_count();
            if n0 < 4 {
                continue;
            }
            let base: Vec<(usize, usize)> = pg
                .edge_references()
                .map(|e| (e.source().index(), e.target().index()))
                .collect();

            let mut tree = DynamicSpqrTree::new(n0, &base);
            if tree.live_nodes().is_empty() {
                continue;
            }
            let mut real_eids: Vec<usize> = (0..base.len()).collect();
            let mut n = n0;
            let mut rng = StdRng::seed_from_u64(seed as u64);

            for _ in 0..6 {
                if rng.random_bool(0.4) {
                    // subdivide a random real edge
                    let at = rng.random_range(0..real_eids.len());
                    let eid = real_eids.swap_remove(at);
                    let (e1, e2) = tree.split_edge(eid, n);
                    n += 1;
                    real_eids.push(e1);
                    real_eids.push(e2);
                } else {
                    // connect two random distinct vertices
                    let u = rng.random_range(0..n);
                    let mut v = rng.random_range(0..n);
                    if u == v {
                        v = (v + 1) % n;
                    }
                    let eid = tree.add_edge(u, v);
                    real_eids.push(eid);
                }

                let edges: Vec<(usize, usize)> =
                    real_eids.iter().map(|&e| tree.edges[e]).collect();
                assert_eq!(
                    canonical_dyn(&tree),
                    canonical_static(n, &edges),
                    "seed {} after update with edges {:?}",
                    seed,
                    edges
                );
            }
        }
    }
}
