use std::ops::{Index, IndexMut};

use crate::graph::{EdgeId, Graph, NodeId};

/// Per-node associative storage, indexed by node slot index.
///
/// Sized from `Graph::node_bound` at construction; `grow` re-sizes after the
/// graph gained nodes. Entries of dead slots keep the default value.
#[derive(Debug, Clone)]
pub struct NodeArray<T> {
    data: Vec<T>,
    default: T,
}

impl<T: Clone> NodeArray<T> {
    pub fn new(graph: &Graph, default: T) -> Self {
        NodeArray {
            data: vec![default.clone(); graph.node_bound()],
            default,
        }
    }

    pub fn grow(&mut self, graph: &Graph) {
        if self.data.len() < graph.node_bound() {
            self.data.resize(graph.node_bound(), self.default.clone());
        }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Index<NodeId> for NodeArray<T> {
    type Output = T;
    fn index(&self, v: NodeId) -> &T {
        &self.data[v.index()]
    }
}

impl<T> IndexMut<NodeId> for NodeArray<T> {
    fn index_mut(&mut self, v: NodeId) -> &mut T {
        &mut self.data[v.index()]
    }
}

/// Per-edge associative storage, indexed by edge slot index.
#[derive(Debug, Clone)]
pub struct EdgeArray<T> {
    data: Vec<T>,
    default: T,
}

impl<T: Clone> EdgeArray<T> {
    pub fn new(graph: &Graph, default: T) -> Self {
        EdgeArray {
            data: vec![default.clone(); graph.edge_bound()],
            default,
        }
    }

    pub fn grow(&mut self, graph: &Graph) {
        if self.data.len() < graph.edge_bound() {
            self.data.resize(graph.edge_bound(), self.default.clone());
        }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Index<EdgeId> for EdgeArray<T> {
    type Output = T;
    fn index(&self, e: EdgeId) -> &T {
        &self.data[e.index()]
    }
}

impl<T> IndexMut<EdgeId> for EdgeArray<T> {
    fn index_mut(&mut self, e: EdgeId) -> &mut T {
        &mut self.data[e.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn test_node_array_grow() {
        let mut g = Graph::new();
        let u = g.new_node();
        let mut arr = NodeArray::new(&g, 0usize);
        arr[u] = 7;
        let v = g.new_node();
        arr.grow(&g);
        assert_eq!(arr[u], 7);
        assert_eq!(arr[v], 0);
    }

    #[test]
    fn test_edge_array() {
        let mut g = Graph::new();
        let u = g.new_node();
        let v = g.new_node();
        let e = g.new_edge(u, v);
        let mut arr = EdgeArray::new(&g, false);
        arr[e] = true;
        assert!(arr[e]);
    }
}
