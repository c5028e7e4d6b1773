use crate::graph::{EdgeId, Graph, NodeId};
use crate::graph_blocks::arrays::NodeArray;

/// One biconnected block: its edges plus the nodes they touch.
#[derive(Debug, Clone)]
pub struct Block {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
}

/// One hop of a route through the block-cut forest: traverse `block`
/// entering at `from` and leaving at `to`.
#[derive(Debug, Clone, Copy)]
pub struct BlockStep {
    pub block: usize,
    pub from: NodeId,
    pub to: NodeId,
}

/// Block-cut decomposition of a (multi)graph. Self-loops belong to no block.
#[derive(Debug, Clone)]
pub struct BlockCutForest {
    pub blocks: Vec<Block>,
    pub is_cut: NodeArray<bool>,
    /// Blocks incident to each node; a non-cut node has at most one.
    pub blocks_of: NodeArray<Vec<usize>>,
}

/// Lowpoint DFS with an edge stack; every time a child subtree cannot reach
/// above `u`, the stacked edges down to the tree edge form one block.
fn dfs(
    graph: &Graph,
    u: NodeId,
    parent_edge: Option<EdgeId>,
    time: &mut usize,
    preorder: &mut NodeArray<usize>,
    low: &mut NodeArray<usize>,
    edge_stack: &mut Vec<EdgeId>,
    blocks: &mut Vec<Vec<EdgeId>>,
    is_cut: &mut NodeArray<bool>,
) {
    preorder[u] = *time;
    low[u] = *time;
    *time += 1;
    let mut children = 0;

    for a in graph.adj_list(u) {
        let e = graph.adj_edge(a);
        if Some(e) == parent_edge || graph.is_self_loop(e) {
            continue;
        }
        let to = graph.adj_head(a);
        if preorder[to] == usize::MAX {
            children += 1;
            edge_stack.push(e);
            dfs(
                graph, to, Some(e), time, preorder, low, edge_stack, blocks, is_cut,
            );
            low[u] = low[u].min(low[to]);
            if low[to] >= preorder[u] {
                if parent_edge.is_some() || children > 1 {
                    is_cut[u] = true;
                }
                let mut block = Vec::new();
                while let Some(&top) = edge_stack.last() {
                    edge_stack.pop();
                    block.push(top);
                    if top == e {
                        break;
                    }
                }
                blocks.push(block);
            }
        } else if preorder[to] < preorder[u] {
            // back edge
            edge_stack.push(e);
            low[u] = low[u].min(preorder[to]);
        }
    }
}

pub fn get_block_cut_forest(graph: &Graph) -> BlockCutForest {
    let mut time = 0;
    let mut preorder = NodeArray::new(graph, usize::MAX);
    let mut low = NodeArray::new(graph, 0);
    let mut is_cut = NodeArray::new(graph, false);
    let mut edge_stack = Vec::new();
    let mut raw_blocks = Vec::new();

    for u in graph.nodes() {
        if preorder[u] == usize::MAX {
            dfs(
                graph,
                u,
                None,
                &mut time,
                &mut preorder,
                &mut low,
                &mut edge_stack,
                &mut raw_blocks,
                &mut is_cut,
            );
        }
    }

    let mut blocks = Vec::with_capacity(raw_blocks.len());
    let mut blocks_of: NodeArray<Vec<usize>> = NodeArray::new(graph, Vec::new());
    let mut seen = NodeArray::new(graph, usize::MAX);
    for (i, edges) in raw_blocks.into_iter().enumerate() {
        let mut nodes = Vec::new();
        for &e in &edges {
            let (s, t) = graph.endpoints(e);
            for v in [s, t] {
                if seen[v] != i {
                    seen[v] = i;
                    nodes.push(v);
                    blocks_of[v].push(i);
                }
            }
        }
        blocks.push(Block { nodes, edges });
    }

    BlockCutForest {
        blocks,
        is_cut,
        blocks_of,
    }
}

/// Biconnected blocks only, without the cut-vertex bookkeeping.
pub fn get_blocks(graph: &Graph) -> Vec<Block> {
    get_block_cut_forest(graph).blocks
}

impl BlockCutForest {
    /// Route from `u` to `v` through the block-cut forest: the sequence of
    /// blocks traversed, with the entry and exit vertex of each. `None` if
    /// the endpoints are equal, isolated or in different components.
    pub fn block_path(&self, graph: &Graph, u: NodeId, v: NodeId) -> Option<Vec<BlockStep>> {
        if u == v || self.blocks_of[u].is_empty() || self.blocks_of[v].is_empty() {
            return None;
        }

        // BFS over blocks; two blocks are neighbors iff they share a cut vertex.
        let start: Vec<usize> = self.blocks_of[u].clone();
        let targets: Vec<usize> = self.blocks_of[v].clone();
        let mut parent: Vec<Option<(usize, NodeId)>> = vec![None; self.blocks.len()];
        let mut visited = vec![false; self.blocks.len()];
        let mut queue = std::collections::VecDeque::new();
        for &b in &start {
            visited[b] = true;
            queue.push_back(b);
        }
        let mut found = None;
        'bfs: while let Some(b) = queue.pop_front() {
            if targets.contains(&b) {
                found = Some(b);
                break 'bfs;
            }
            for &c in &self.blocks[b].nodes {
                if !self.is_cut[c] {
                    continue;
                }
                for &nb in &self.blocks_of[c] {
                    if !visited[nb] {
                        visited[nb] = true;
                        parent[nb] = Some((b, c));
                        queue.push_back(nb);
                    }
                }
            }
        }

        let last = found?;
        // Walk back to a start block collecting (block, cut-vertex-on-entry).
        let mut chain = vec![(last, v)];
        let mut cur = last;
        while let Some((prev, via)) = parent[cur] {
            chain.push((prev, via));
            cur = prev;
        }
        chain.reverse();

        let mut steps = Vec::with_capacity(chain.len());
        let mut from = u;
        for &(block, exit) in &chain {
            steps.push(BlockStep {
                block,
                from,
                to: exit,
            });
            from = exit;
        }
        Some(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::testing::random_graphs::random_graph;

    fn graph_from_edges(n: usize, edges: &[(usize, usize)]) -> Graph {
        let mut g = Graph::new();
        let nodes: Vec<NodeId> = (0..n).map(|_| g.new_node()).collect();
        for &(s, t) in edges {
            g.new_edge(nodes[s], nodes[t]);
        }
        g
    }

    #[test]
    fn test_two_triangles_sharing_a_cut_vertex() {
        let g = graph_from_edges(5, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 2)]);
        let forest = get_block_cut_forest(&g);
        assert_eq!(forest.blocks.len(), 2);
        let cut = g.node_by_index(2).unwrap();
        assert!(forest.is_cut[cut]);
        assert_eq!(forest.blocks_of[cut].len(), 2);
        assert!(forest.blocks.iter().all(|b| b.edges.len() == 3));
    }

    #[test]
    fn test_bridge_is_its_own_block() {
        let g = graph_from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        let forest = get_block_cut_forest(&g);
        assert_eq!(forest.blocks.len(), 3);
        assert!(forest.is_cut[g.node_by_index(1).unwrap()]);
        assert!(forest.is_cut[g.node_by_index(2).unwrap()]);
        assert!(!forest.is_cut[g.node_by_index(0).unwrap()]);
    }

    #[test]
    fn test_parallel_edges_stay_biconnected() {
        let g = graph_from_edges(2, &[(0, 1), (0, 1)]);
        let forest = get_block_cut_forest(&g);
        assert_eq!(forest.blocks.len(), 1);
        assert_eq!(forest.blocks[0].edges.len(), 2);
    }

    #[test]
    fn test_block_path_through_cut_vertices() {
        // triangle - bridge - triangle
        let g = graph_from_edges(
            7,
            &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 5), (5, 3), (5, 6)],
        );
        let forest = get_block_cut_forest(&g);
        let u = g.node_by_index(0).unwrap();
        let v = g.node_by_index(6).unwrap();
        let path = forest.block_path(&g, u, v).unwrap();
        assert!(path.len() >= 3);
        assert_eq!(path.first().unwrap().from, u);
        assert_eq!(path.last().unwrap().to, v);
        // consecutive steps chain through shared vertices
        for w in path.windows(2) {
            assert_eq!(w[0].to, w[1].from);
        }
    }

    #[test]
    fn test_every_edge_in_exactly_one_block() {
        for seed in 0..50 {
            let n = 3 + seed % 9;
            let g = Graph::from_petgraph(&random_graph(n, 2 * n, seed));
            let blocks = get_blocks(&g);
            let mut count = vec![0usize; g.edge_bound()];
            for b in &blocks {
                for &e in &b.edges {
                    count[e.index()] += 1;
                }
            }
            for e in g.edges() {
                let expected = if g.is_self_loop(e) { 0 } else { 1 };
                assert_eq!(count[e.index()], expected);
            }
        }
    }
}
