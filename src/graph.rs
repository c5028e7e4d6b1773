use petgraph::visit::EdgeRef;
use thiserror::Error;

use crate::types::{EdgeLabel, UnGraph};

/// Sentinel for "no slot" inside the arena link fields.
const NIL: u32 = u32::MAX;

/// Error raised when the node/edge arena cannot satisfy an allocation.
///
/// A failed allocation must be distinguishable from a valid handle; a silent
/// null-like sentinel used downstream would corrupt the rotation-system
/// invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("graph arena exhausted while allocating a {0} slot")]
    CapacityExhausted(&'static str),
}

/// Handle to a node slot. The generation tag catches use-after-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Handle to an edge slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId {
    index: u32,
    generation: u32,
}

/// Handle to one adjacency entry (an edge end in some node's rotation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdjId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index as usize
    }
}
impl EdgeId {
    pub fn index(self) -> usize {
        self.index as usize
    }
}
impl AdjId {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct NodeSlot {
    generation: u32,
    live: bool,
    first_adj: u32, // entry point into the circular rotation list
    degree: u32,
}

#[derive(Debug, Clone)]
struct EdgeSlot {
    generation: u32,
    live: bool,
    source: u32,
    target: u32,
    source_adj: u32,
    target_adj: u32,
}

#[derive(Debug, Clone)]
struct AdjSlot {
    generation: u32,
    live: bool,
    node: u32,
    edge: u32,
    twin: u32,
    prev: u32,
    next: u32,
}

/// Mutable graph with an explicit rotation system.
///
/// Nodes, edges and adjacency entries live in arena slot vectors indexed by
/// small integer handles; freed slots are recycled through free lists and
/// bump their generation so stale handles are caught instead of silently
/// resolving to unrelated objects. The cyclic order of adjacency entries
/// around each node is kept as a doubly linked list of slot indices and
/// defines the combinatorial embedding; it is never derived from allocation
/// order.
///
/// All structural operations (`new_edge`, `remove_edge`, `reverse_edge`,
/// `split_edge`, `unsplit`) are O(1).
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<NodeSlot>,
    edges: Vec<EdgeSlot>,
    adjs: Vec<AdjSlot>,
    free_nodes: Vec<u32>,
    free_edges: Vec<u32>,
    free_adjs: Vec<u32>,
    node_count: usize,
    edge_count: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Graph {
            nodes: Vec::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
            adjs: Vec::with_capacity(2 * edges),
            ..Self::default()
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Upper bound (exclusive) on `NodeId::index` values ever handed out.
    /// Suitable for sizing side arrays.
    pub fn node_bound(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_bound(&self) -> usize {
        self.edges.len()
    }

    pub fn adj_bound(&self) -> usize {
        self.adjs.len()
    }

    pub fn is_valid_node(&self, v: NodeId) -> bool {
        self.nodes
            .get(v.index as usize)
            .is_some_and(|s| s.live && s.generation == v.generation)
    }

    pub fn is_valid_edge(&self, e: EdgeId) -> bool {
        self.edges
            .get(e.index as usize)
            .is_some_and(|s| s.live && s.generation == e.generation)
    }

    pub fn is_valid_adj(&self, a: AdjId) -> bool {
        self.adjs
            .get(a.index as usize)
            .is_some_and(|s| s.live && s.generation == a.generation)
    }

    fn node(&self, v: NodeId) -> &NodeSlot {
        debug_assert!(self.is_valid_node(v), "stale node handle {:?}", v);
        &self.nodes[v.index as usize]
    }

    fn edge(&self, e: EdgeId) -> &EdgeSlot {
        debug_assert!(self.is_valid_edge(e), "stale edge handle {:?}", e);
        &self.edges[e.index as usize]
    }

    fn adj(&self, a: AdjId) -> &AdjSlot {
        debug_assert!(self.is_valid_adj(a), "stale adjacency handle {:?}", a);
        &self.adjs[a.index as usize]
    }

    /// Live node with the given slot index, if any.
    pub fn node_by_index(&self, index: usize) -> Option<NodeId> {
        let slot = self.nodes.get(index)?;
        slot.live.then_some(NodeId {
            index: index as u32,
            generation: slot.generation,
        })
    }

    /// Live edge with the given slot index, if any.
    pub fn edge_by_index(&self, index: usize) -> Option<EdgeId> {
        let slot = self.edges.get(index)?;
        slot.live.then_some(EdgeId {
            index: index as u32,
            generation: slot.generation,
        })
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        (0..self.nodes.len())
            .filter_map(|i| self.node_by_index(i))
            .collect()
    }

    pub fn edges(&self) -> Vec<EdgeId> {
        (0..self.edges.len())
            .filter_map(|i| self.edge_by_index(i))
            .collect()
    }

    pub fn try_new_node(&mut self) -> Result<NodeId, GraphError> {
        let index = match self.free_nodes.pop() {
            Some(i) => i,
            None => {
                if self.nodes.len() >= NIL as usize {
                    return Err(GraphError::CapacityExhausted("node"));
                }
                self.nodes.push(NodeSlot {
                    generation: 0,
                    live: false,
                    first_adj: NIL,
                    degree: 0,
                });
                self.nodes.len() as u32 - 1
            }
        };
        let slot = &mut self.nodes[index as usize];
        slot.live = true;
        slot.first_adj = NIL;
        slot.degree = 0;
        self.node_count += 1;
        Ok(NodeId {
            index,
            generation: slot.generation,
        })
    }

    pub fn new_node(&mut self) -> NodeId {
        match self.try_new_node() {
            Ok(v) => v,
            Err(e) => panic!("{}", e),
        }
    }

    fn alloc_adj(&mut self, node: u32, edge: u32) -> Result<u32, GraphError> {
        let index = match self.free_adjs.pop() {
            Some(i) => i,
            None => {
                if self.adjs.len() >= NIL as usize {
                    return Err(GraphError::CapacityExhausted("adjacency"));
                }
                self.adjs.push(AdjSlot {
                    generation: 0,
                    live: false,
                    node: NIL,
                    edge: NIL,
                    twin: NIL,
                    prev: NIL,
                    next: NIL,
                });
                self.adjs.len() as u32 - 1
            }
        };
        let slot = &mut self.adjs[index as usize];
        slot.live = true;
        slot.node = node;
        slot.edge = edge;
        slot.twin = NIL;
        Ok(index)
    }

    /// Links adjacency slot `a` at the rotation tail of node `v` (just before
    /// `first_adj`, i.e. last in iteration order).
    fn link_adj_at_tail(&mut self, v: u32, a: u32) {
        let first = self.nodes[v as usize].first_adj;
        if first == NIL {
            self.adjs[a as usize].prev = a;
            self.adjs[a as usize].next = a;
            self.nodes[v as usize].first_adj = a;
        } else {
            let last = self.adjs[first as usize].prev;
            self.adjs[a as usize].prev = last;
            self.adjs[a as usize].next = first;
            self.adjs[last as usize].next = a;
            self.adjs[first as usize].prev = a;
        }
        self.nodes[v as usize].degree += 1;
    }

    fn unlink_adj(&mut self, a: u32) {
        let v = self.adjs[a as usize].node;
        let prev = self.adjs[a as usize].prev;
        let next = self.adjs[a as usize].next;
        if next == a {
            self.nodes[v as usize].first_adj = NIL;
        } else {
            self.adjs[prev as usize].next = next;
            self.adjs[next as usize].prev = prev;
            if self.nodes[v as usize].first_adj == a {
                self.nodes[v as usize].first_adj = next;
            }
        }
        self.nodes[v as usize].degree -= 1;
        let slot = &mut self.adjs[a as usize];
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_adjs.push(a);
    }

    pub fn try_new_edge(&mut self, u: NodeId, v: NodeId) -> Result<EdgeId, GraphError> {
        debug_assert!(self.is_valid_node(u) && self.is_valid_node(v));
        let index = match self.free_edges.pop() {
            Some(i) => i,
            None => {
                if self.edges.len() >= NIL as usize {
                    return Err(GraphError::CapacityExhausted("edge"));
                }
                self.edges.push(EdgeSlot {
                    generation: 0,
                    live: false,
                    source: NIL,
                    target: NIL,
                    source_adj: NIL,
                    target_adj: NIL,
                });
                self.edges.len() as u32 - 1
            }
        };
        let sa = self.alloc_adj(u.index, index)?;
        let ta = self.alloc_adj(v.index, index)?;
        self.adjs[sa as usize].twin = ta;
        self.adjs[ta as usize].twin = sa;
        self.link_adj_at_tail(u.index, sa);
        self.link_adj_at_tail(v.index, ta);

        let slot = &mut self.edges[index as usize];
        slot.live = true;
        slot.source = u.index;
        slot.target = v.index;
        slot.source_adj = sa;
        slot.target_adj = ta;
        self.edge_count += 1;
        Ok(EdgeId {
            index,
            generation: slot.generation,
        })
    }

    pub fn new_edge(&mut self, u: NodeId, v: NodeId) -> EdgeId {
        match self.try_new_edge(u, v) {
            Ok(e) => e,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn remove_edge(&mut self, e: EdgeId) {
        debug_assert!(self.is_valid_edge(e));
        let (sa, ta) = {
            let slot = &self.edges[e.index as usize];
            (slot.source_adj, slot.target_adj)
        };
        self.unlink_adj(sa);
        self.unlink_adj(ta);
        let slot = &mut self.edges[e.index as usize];
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_edges.push(e.index);
        self.edge_count -= 1;
    }

    /// Removes an isolated node. Removing a node that still has incident
    /// edges is a contract violation.
    pub fn remove_node(&mut self, v: NodeId) {
        debug_assert!(self.is_valid_node(v));
        debug_assert!(
            self.nodes[v.index as usize].degree == 0,
            "remove_node on a node with incident edges"
        );
        let slot = &mut self.nodes[v.index as usize];
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_nodes.push(v.index);
        self.node_count -= 1;
    }

    pub fn source(&self, e: EdgeId) -> NodeId {
        let s = self.edge(e).source;
        self.node_by_index(s as usize).unwrap()
    }

    pub fn target(&self, e: EdgeId) -> NodeId {
        let t = self.edge(e).target;
        self.node_by_index(t as usize).unwrap()
    }

    pub fn endpoints(&self, e: EdgeId) -> (NodeId, NodeId) {
        (self.source(e), self.target(e))
    }

    pub fn opposite(&self, e: EdgeId, v: NodeId) -> NodeId {
        let (s, t) = self.endpoints(e);
        if s == v { t } else { s }
    }

    pub fn is_self_loop(&self, e: EdgeId) -> bool {
        let slot = self.edge(e);
        slot.source == slot.target
    }

    /// Swaps the roles of source and target. The rotation system is untouched.
    pub fn reverse_edge(&mut self, e: EdgeId) {
        debug_assert!(self.is_valid_edge(e));
        let slot = &mut self.edges[e.index as usize];
        std::mem::swap(&mut slot.source, &mut slot.target);
        std::mem::swap(&mut slot.source_adj, &mut slot.target_adj);
    }

    pub fn degree(&self, v: NodeId) -> usize {
        self.node(v).degree as usize
    }

    fn adj_id(&self, index: u32) -> AdjId {
        AdjId {
            index,
            generation: self.adjs[index as usize].generation,
        }
    }

    pub fn first_adj(&self, v: NodeId) -> Option<AdjId> {
        let first = self.node(v).first_adj;
        (first != NIL).then(|| self.adj_id(first))
    }

    /// Cyclic successor in the rotation around the owning node.
    pub fn next_adj(&self, a: AdjId) -> AdjId {
        self.adj_id(self.adj(a).next)
    }

    /// Cyclic predecessor in the rotation around the owning node.
    pub fn prev_adj(&self, a: AdjId) -> AdjId {
        self.adj_id(self.adj(a).prev)
    }

    /// The entry of the same edge at the opposite endpoint.
    pub fn twin(&self, a: AdjId) -> AdjId {
        self.adj_id(self.adj(a).twin)
    }

    pub fn adj_node(&self, a: AdjId) -> NodeId {
        self.node_by_index(self.adj(a).node as usize).unwrap()
    }

    pub fn adj_edge(&self, a: AdjId) -> EdgeId {
        let e = self.adj(a).edge;
        self.edge_by_index(e as usize).unwrap()
    }

    /// The node the entry points at (opposite endpoint of its edge).
    pub fn adj_head(&self, a: AdjId) -> NodeId {
        self.adj_node(self.twin(a))
    }

    /// Adjacency entries of `v` in rotation order, starting at `first_adj`.
    pub fn adj_list(&self, v: NodeId) -> Vec<AdjId> {
        let mut out = Vec::with_capacity(self.degree(v));
        let Some(first) = self.first_adj(v) else {
            return out;
        };
        let mut a = first;
        loop {
            out.push(a);
            a = self.next_adj(a);
            if a == first {
                break;
            }
        }
        out
    }

    /// Neighbors of `v` in rotation order (with repetition for multi-edges).
    pub fn neighbors(&self, v: NodeId) -> Vec<NodeId> {
        self.adj_list(v).iter().map(|&a| self.adj_head(a)).collect()
    }

    /// First edge between `u` and `v` in `u`'s rotation order, if any.
    pub fn search_edge(&self, u: NodeId, v: NodeId) -> Option<EdgeId> {
        self.adj_list(u)
            .into_iter()
            .find(|&a| self.adj_head(a) == v)
            .map(|a| self.adj_edge(a))
    }

    /// Replaces the rotation at `v` with the given order. The slice must be a
    /// permutation of the current entries of `v`.
    pub fn set_rotation(&mut self, v: NodeId, order: &[AdjId]) {
        debug_assert!(self.is_valid_node(v));
        debug_assert_eq!(order.len(), self.degree(v));
        debug_assert!(order.iter().all(|&a| self.is_valid_adj(a) && self.adj(a).node == v.index));
        if order.is_empty() {
            return;
        }
        let k = order.len();
        for i in 0..k {
            let a = order[i].index;
            let next = order[(i + 1) % k].index;
            let prev = order[(i + k - 1) % k].index;
            self.adjs[a as usize].next = next;
            self.adjs[a as usize].prev = prev;
        }
        self.nodes[v.index as usize].first_adj = order[0].index;
    }

    /// Splits `e = (a, b)` at a fresh node `d`, producing `(a, d)` and
    /// `(d, b)`. Both replacement edges occupy the rotation positions of the
    /// old entries, so the embedding is preserved.
    pub fn split_edge(&mut self, e: EdgeId) -> Result<(NodeId, EdgeId, EdgeId), GraphError> {
        debug_assert!(self.is_valid_edge(e));
        let (a, b, sa, ta) = {
            let slot = &self.edges[e.index as usize];
            (slot.source, slot.target, slot.source_adj, slot.target_adj)
        };
        let d = self.try_new_node()?;

        // Retire the old edge slot; its two adjacency slots are retargeted in
        // place so the rotation positions at `a` and `b` survive.
        {
            let slot = &mut self.edges[e.index as usize];
            slot.live = false;
            slot.generation = slot.generation.wrapping_add(1);
        }
        self.free_edges.push(e.index);
        self.edge_count -= 1;

        let e1 = self.alloc_edge_slot()?;
        let e2 = self.alloc_edge_slot()?;
        let da1 = self.alloc_adj(d.index, e1.index)?;
        let da2 = self.alloc_adj(d.index, e2.index)?;
        self.link_adj_at_tail(d.index, da1);
        self.link_adj_at_tail(d.index, da2);

        for (adj, edge) in [(sa, e1.index), (ta, e2.index)] {
            let slot = &mut self.adjs[adj as usize];
            slot.edge = edge;
            slot.generation = slot.generation.wrapping_add(1);
        }
        self.adjs[sa as usize].twin = da1;
        self.adjs[da1 as usize].twin = sa;
        self.adjs[ta as usize].twin = da2;
        self.adjs[da2 as usize].twin = ta;

        {
            let slot = &mut self.edges[e1.index as usize];
            slot.source = a;
            slot.target = d.index;
            slot.source_adj = sa;
            slot.target_adj = da1;
        }
        {
            let slot = &mut self.edges[e2.index as usize];
            slot.source = d.index;
            slot.target = b;
            slot.source_adj = da2;
            slot.target_adj = ta;
        }
        Ok((d, e1, e2))
    }

    fn alloc_edge_slot(&mut self) -> Result<EdgeId, GraphError> {
        let index = match self.free_edges.pop() {
            Some(i) => i,
            None => {
                if self.edges.len() >= NIL as usize {
                    return Err(GraphError::CapacityExhausted("edge"));
                }
                self.edges.push(EdgeSlot {
                    generation: 0,
                    live: false,
                    source: NIL,
                    target: NIL,
                    source_adj: NIL,
                    target_adj: NIL,
                });
                self.edges.len() as u32 - 1
            }
        };
        let slot = &mut self.edges[index as usize];
        slot.live = true;
        self.edge_count += 1;
        Ok(EdgeId {
            index,
            generation: slot.generation,
        })
    }

    /// Inverse of [`split_edge`](Self::split_edge): `d` must have degree
    /// exactly 2; its two incident edges are replaced by a single edge
    /// between the outer endpoints, keeping their rotation positions.
    pub fn unsplit(&mut self, d: NodeId) -> EdgeId {
        debug_assert!(self.is_valid_node(d));
        debug_assert_eq!(self.degree(d), 2, "unsplit on a node of degree != 2");
        let adjs = self.adj_list(d);
        let (x, y) = (adjs[0], adjs[1]);
        let ex = self.adj_edge(x);
        let ey = self.adj_edge(y);
        let p = self.opposite(ex, d);
        let q = self.opposite(ey, d);
        // The surviving outer entries.
        let pa = self.twin(x).index;
        let qa = self.twin(y).index;

        for e in [ex, ey] {
            let slot = &mut self.edges[e.index as usize];
            slot.live = false;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_edges.push(e.index);
            self.edge_count -= 1;
        }
        self.unlink_adj(x.index);
        self.unlink_adj(y.index);
        self.remove_node(d);

        let f = self.alloc_edge_slot().unwrap();
        for adj in [pa, qa] {
            let slot = &mut self.adjs[adj as usize];
            slot.edge = f.index;
            slot.generation = slot.generation.wrapping_add(1);
        }
        self.adjs[pa as usize].twin = qa;
        self.adjs[qa as usize].twin = pa;
        let slot = &mut self.edges[f.index as usize];
        slot.source = p.index;
        slot.target = q.index;
        slot.source_adj = pa;
        slot.target_adj = qa;
        f
    }

    /// Builds an arena graph from a petgraph graph. Node and edge slot
    /// indices coincide with the petgraph indices.
    pub fn from_petgraph(graph: &UnGraph) -> Self {
        let mut g = Graph::with_capacity(graph.node_count(), graph.edge_count());
        let nodes: Vec<NodeId> = (0..graph.node_count()).map(|_| g.new_node()).collect();
        for e in graph.edge_references() {
            g.new_edge(nodes[e.source().index()], nodes[e.target().index()]);
        }
        g
    }

    /// Dumps the live part of the graph back into a petgraph graph. Slot
    /// indices are compacted; the returned map gives petgraph index per node
    /// slot index.
    pub fn to_petgraph(&self) -> (UnGraph, Vec<Option<usize>>) {
        let mut out = UnGraph::new_undirected();
        let mut map = vec![None; self.node_bound()];
        for v in self.nodes() {
            let idx = out.add_node(v.index() as u32);
            map[v.index()] = Some(idx.index());
        }
        for e in self.edges() {
            let (s, t) = self.endpoints(e);
            out.add_edge(
                petgraph::graph::NodeIndex::new(map[s.index()].unwrap()),
                petgraph::graph::NodeIndex::new(map[t.index()].unwrap()),
                EdgeLabel::Real,
            );
        }
        (out, map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(k: usize) -> (Graph, Vec<NodeId>) {
        let mut g = Graph::new();
        let nodes: Vec<NodeId> = (0..k).map(|_| g.new_node()).collect();
        for i in 1..k {
            g.new_edge(nodes[i - 1], nodes[i]);
        }
        (g, nodes)
    }

    #[test]
    fn test_rotation_order_is_insertion_order() {
        let mut g = Graph::new();
        let c = g.new_node();
        let others: Vec<NodeId> = (0..4).map(|_| g.new_node()).collect();
        for &v in &others {
            g.new_edge(c, v);
        }
        assert_eq!(g.neighbors(c), others);
        assert_eq!(g.degree(c), 4);
    }

    #[test]
    fn test_set_rotation() {
        let mut g = Graph::new();
        let c = g.new_node();
        let others: Vec<NodeId> = (0..4).map(|_| g.new_node()).collect();
        for &v in &others {
            g.new_edge(c, v);
        }
        let mut order = g.adj_list(c);
        order.reverse();
        g.set_rotation(c, &order);
        let mut expect = others.clone();
        expect.reverse();
        assert_eq!(g.neighbors(c), expect);
    }

    #[test]
    fn test_remove_edge_keeps_rotation_of_rest() {
        let mut g = Graph::new();
        let c = g.new_node();
        let others: Vec<NodeId> = (0..4).map(|_| g.new_node()).collect();
        let edges: Vec<EdgeId> = others.iter().map(|&v| g.new_edge(c, v)).collect();
        g.remove_edge(edges[1]);
        assert_eq!(g.neighbors(c), vec![others[0], others[2], others[3]]);
        assert_eq!(g.edge_count(), 3);
        assert!(!g.is_valid_edge(edges[1]));
    }

    #[test]
    fn test_split_edge_preserves_positions() {
        let mut g = Graph::new();
        let c = g.new_node();
        let others: Vec<NodeId> = (0..3).map(|_| g.new_node()).collect();
        let edges: Vec<EdgeId> = others.iter().map(|&v| g.new_edge(c, v)).collect();
        let (d, e1, e2) = g.split_edge(edges[1]).unwrap();
        assert_eq!(g.degree(d), 2);
        assert_eq!(g.neighbors(c), vec![others[0], d, others[2]]);
        assert_eq!(g.endpoints(e1), (c, d));
        assert_eq!(g.endpoints(e2), (d, others[1]));
        assert_eq!(g.edge_count(), 4);

        let f = g.unsplit(d);
        assert_eq!(g.neighbors(c), vec![others[0], others[1], others[2]]);
        assert_eq!(g.opposite(f, c), others[1]);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn test_handle_generations() {
        let mut g = Graph::new();
        let u = g.new_node();
        let v = g.new_node();
        let e = g.new_edge(u, v);
        g.remove_edge(e);
        assert!(!g.is_valid_edge(e));
        let e2 = g.new_edge(u, v);
        // The slot is recycled but the stale handle stays dead.
        assert_eq!(e2.index(), e.index());
        assert!(!g.is_valid_edge(e));
        assert!(g.is_valid_edge(e2));
    }

    #[test]
    fn test_search_edge_and_petgraph_round_trip() {
        let (g, nodes) = path_graph(4);
        assert!(g.search_edge(nodes[0], nodes[1]).is_some());
        assert!(g.search_edge(nodes[0], nodes[2]).is_none());

        let (pg, map) = g.to_petgraph();
        assert_eq!(pg.node_count(), 4);
        assert_eq!(pg.edge_count(), 3);
        assert!(map.iter().all(|m| m.is_some()));

        let back = Graph::from_petgraph(&pg);
        assert_eq!(back.node_count(), 4);
        assert_eq!(back.edge_count(), 3);
    }

    #[test]
    fn test_twin_and_face_walk_links() {
        let (g, nodes) = path_graph(3);
        let a = g.first_adj(nodes[0]).unwrap();
        let t = g.twin(a);
        assert_eq!(g.adj_node(t), nodes[1]);
        assert_eq!(g.adj_edge(t), g.adj_edge(a));
        assert_eq!(g.twin(t), a);
        assert_eq!(g.adj_head(a), nodes[1]);
    }
}
