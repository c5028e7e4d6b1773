use crate::UnGraph;
use crate::block_cut::get_blocks;
use crate::graph::Graph;
use crate::pq_tree::PqTree;
use crate::st_numbering::st_number;

/// Lempel-Even-Cederbaum planarity test: st-number each biconnected block
/// and feed the vertices in that order through a PQ-tree, one
/// reduce/replace pair per vertex. Fully independent of the Boyer-Myrvold
/// machinery, which makes it the cross-check oracle of choice in tests.
///
/// Leaves are edge indices; processing vertex `v` makes the edges arriving
/// from lower-numbered vertices consecutive (or fails, which certifies
/// non-planarity) and then swaps them for the edges leaving towards
/// higher-numbered vertices.
pub fn is_planar_lec(graph: &UnGraph) -> bool {
    let arena = Graph::from_petgraph(graph);
    let blocks = get_blocks(&arena);
    blocks.iter().all(|block| {
        let edges: Vec<(usize, usize)> = block
            .edges
            .iter()
            .map(|&e| {
                let (s, t) = arena.endpoints(e);
                (s.index(), t.index())
            })
            .collect();
        block_is_planar(arena.node_bound(), &edges)
    })
}

fn block_is_planar(n: usize, edges: &[(usize, usize)]) -> bool {
    if edges.len() <= 2 {
        return true;
    }
    let Some(st) = edges.iter().position(|&(a, b)| a != b) else {
        return true;
    };
    let numbers = st_number(n, edges, st);

    // vertices of the block in st order
    let mut order: Vec<usize> = Vec::new();
    {
        let mut present = vec![false; n];
        for &(a, b) in edges {
            present[a] = true;
            present[b] = true;
        }
        let mut with_num: Vec<(usize, usize)> = (0..n)
            .filter(|&v| present[v])
            .map(|v| (numbers[v], v))
            .collect();
        with_num.sort_unstable();
        order.extend(with_num.into_iter().map(|(_, v)| v));
    }

    let outgoing = |v: usize| -> Vec<usize> {
        edges
            .iter()
            .enumerate()
            .filter(|&(_, &(a, b))| {
                (a == v && numbers[b] > numbers[v]) || (b == v && numbers[a] > numbers[v])
            })
            .map(|(eid, _)| eid)
            .collect()
    };
    let incoming = |v: usize| -> Vec<usize> {
        edges
            .iter()
            .enumerate()
            .filter(|&(_, &(a, b))| {
                (a == v && numbers[b] < numbers[v]) || (b == v && numbers[a] < numbers[v])
            })
            .map(|(eid, _)| eid)
            .collect()
    };

    let source = order[0];
    let mut tree = match PqTree::from_leaves(&outgoing(source)) {
        Ok(t) => t,
        Err(_) => return true, // no outgoing edges means no block at all
    };

    let sink = *order.last().unwrap();
    for &v in &order[1..] {
        let arriving = incoming(v);
        if !tree.reduce(&arriving) {
            return false;
        }
        if v == sink {
            return true;
        }
        if tree.replace_pertinent_by_new_leaves(&outgoing(v)).is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planarity::is_planar;
    use crate::testing::graph_enumerator::GraphEnumeratorState;
    use crate::testing::random_graphs::random_graph;

    #[test]
    fn test_small_classics() {
        use crate::EdgeLabel;
        use petgraph::visit::NodeIndexable;

        let complete = |n: usize| {
            let mut g = UnGraph::new_undirected();
            for i in 0..n {
                g.add_node(i as u32);
            }
            for i in 0..n {
                for j in (i + 1)..n {
                    g.add_edge(g.from_index(i), g.from_index(j), EdgeLabel::Real);
                }
            }
            g
        };
        assert!(is_planar_lec(&complete(4)));
        assert!(!is_planar_lec(&complete(5)));
        assert!(is_planar_lec(&complete(2)));

        let mut k33 = UnGraph::new_undirected();
        for i in 0..6 {
            k33.add_node(i);
        }
        for i in 0..3 {
            for j in 3..6 {
                k33.add_edge(k33.from_index(i), k33.from_index(j), EdgeLabel::Real);
            }
        }
        assert!(!is_planar_lec(&k33));
    }

    #[test]
    fn test_agrees_with_boyer_myrvold_exhaustively() {
        // two fully independent planarity algorithms must agree on every
        // graph with up to 6 nodes
        for n in 2..=6 {
            let enumerator = GraphEnumeratorState {
                n,
                mask: 0,
                last_mask: 1 << (n * (n - 1) / 2),
            };
            for pg in enumerator {
                assert_eq!(
                    is_planar_lec(&pg),
                    is_planar(&pg),
                    "oracles disagree on {:?}",
                    pg
                );
            }
        }
    }

    #[test]
    fn test_agrees_with_boyer_myrvold_on_random_graphs() {
        for seed in 0..80 {
            let n = 3 + seed % 10;
            let m = 1 + (3 * seed) % (3 * n);
            let pg = random_graph(n, m, seed);
            assert_eq!(is_planar_lec(&pg), is_planar(&pg));
        }
    }
}
