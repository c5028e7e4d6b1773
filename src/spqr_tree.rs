use petgraph::visit::EdgeRef;

use crate::UnGraph;
use crate::spqr_blocks::outside_structures::SpqrTree;

/// Builds the SPQR-tree of a biconnected graph given as petgraph graph.
pub fn get_spqr_tree(graph: &UnGraph) -> SpqrTree {
    let edges: Vec<(usize, usize)> = graph
        .edge_references()
        .map(|e| (e.source().index(), e.target().index()))
        .collect();
    SpqrTree::new(graph.node_count(), &edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::graph_enumerator::GraphEnumeratorState;
    use crate::testing::random_graphs::random_biconnected_graph;
    use crate::{Graph, block_cut::get_blocks};
    use std::mem;

    /// The real edges scattered over the tree's skeletons must reassemble
    /// exactly the input graph.
    fn same_graphs(og_graph: &UnGraph, tree: &SpqrTree) -> bool {
        if tree.split.components.is_empty() {
            return og_graph.node_count() == 2 && og_graph.edge_count() <= 2;
        }
        let mut spq_edges = Vec::new();
        for c in &tree.split.components {
            for &eid in &c.edges {
                if tree.split.is_virtual[eid] {
                    continue;
                }
                let (mut u, mut v) = tree.split.edges[eid];
                if u > v {
                    mem::swap(&mut u, &mut v);
                }
                spq_edges.push((u, v));
            }
        }
        spq_edges.sort_unstable();

        let mut edges_in = Vec::new();
        for edge in og_graph.edge_references() {
            let mut u = edge.source().index();
            let mut v = edge.target().index();
            if u > v {
                mem::swap(&mut u, &mut v);
            }
            edges_in.push((u, v));
        }
        edges_in.sort_unstable();

        spq_edges == edges_in
    }

    #[test]
    fn test_spqr_tree_random() {
        for i in 0..100 {
            let n = 2 + i / 10;
            let m = 1 + i;
            let in_graph = random_biconnected_graph(n, m, i);
            let tree = get_spqr_tree(&in_graph);
            assert!(same_graphs(&in_graph, &tree));
        }
    }

    #[test]
    fn test_spqr_tree_exhaustive() {
        for n in 2..=5 {
            let enumerator = GraphEnumeratorState {
                n,
                mask: 0,
                last_mask: 1 << (n * (n - 1) / 2),
            };
            for in_graph in enumerator {
                let arena = Graph::from_petgraph(&in_graph);
                let blocks = get_blocks(&arena);
                if blocks.len() != 1 || blocks[0].nodes.len() != n {
                    continue; // not biconnected
                }
                let tree = get_spqr_tree(&in_graph);
                assert!(same_graphs(&in_graph, &tree));
            }
        }
    }
}
