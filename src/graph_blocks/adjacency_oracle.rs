use fixedbitset::FixedBitSet;

use crate::graph::{Graph, NodeId};
use crate::graph_blocks::arrays::NodeArray;

/// Constant-time adjacency queries for high-degree nodes.
///
/// Nodes whose degree exceeds `degree_threshold` get a bitset row over all
/// node slots; queries between two low-degree nodes fall back to a scan of
/// the shorter rotation list. With threshold 0 every node gets a row, with a
/// very large threshold every query is a linear search; both regimes must
/// agree with [`Graph::search_edge`] exactly.
#[derive(Debug, Clone)]
pub struct AdjacencyOracle {
    rows: NodeArray<Option<FixedBitSet>>,
}

impl AdjacencyOracle {
    pub fn new(graph: &Graph, degree_threshold: usize) -> Self {
        let mut rows = NodeArray::new(graph, None);
        for v in graph.nodes() {
            if graph.degree(v) > degree_threshold {
                let mut row = FixedBitSet::with_capacity(graph.node_bound());
                for w in graph.neighbors(v) {
                    row.insert(w.index());
                }
                rows[v] = Some(row);
            }
        }
        AdjacencyOracle { rows }
    }

    /// True iff `u` and `v` are connected by an edge. A self-loop makes a
    /// node adjacent to itself.
    pub fn adjacent(&self, graph: &Graph, u: NodeId, v: NodeId) -> bool {
        if let Some(row) = &self.rows[u] {
            return row.contains(v.index());
        }
        if let Some(row) = &self.rows[v] {
            return row.contains(u.index());
        }
        let (a, b) = if graph.degree(u) <= graph.degree(v) {
            (u, v)
        } else {
            (v, u)
        };
        graph.search_edge(a, b).is_some()
    }
}
