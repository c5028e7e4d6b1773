use radsort::sort_by_key;

use crate::planarity_blocks::structures::{BmGraph, DfsData, NIL};

fn dfs(graph: &BmGraph, u: usize, time: &mut usize, data: &mut DfsData) {
    data.dfi[u] = *time;
    data.vertex_of_dfi[*time] = u;
    data.lowpoint[u] = *time;
    data.least_ancestor[u] = *time;
    *time += 1;

    for &eid in &graph.adj[u] {
        if eid == data.parent_eid[u] {
            continue;
        }
        let to = graph.other(eid, u);
        if data.dfi[to] == NIL {
            data.parent[to] = u;
            data.parent_eid[to] = eid;
            dfs(graph, to, time, data);
            data.children[u].push(to);
            data.lowpoint[u] = data.lowpoint[u].min(data.lowpoint[to]);
        } else if data.dfi[to] < data.dfi[u] {
            // back edge towards the ancestor `to`
            data.back_targets[to].push((u, eid));
            data.least_ancestor[u] = data.least_ancestor[u].min(data.dfi[to]);
            data.lowpoint[u] = data.lowpoint[u].min(data.dfi[to]);
        }
    }
}

/// DFS over the simple graph: depth-first indices, lowpoints, least
/// ancestors, children sorted by lowpoint and the back-edge lists consumed by
/// the vertex-addition pass.
pub fn run_dfs(graph: &BmGraph, order: &[usize]) -> DfsData {
    let mut data = DfsData::new(graph.n);
    let mut time = 0;
    for &u in order {
        if data.dfi[u] == NIL {
            data.roots.push(u);
            dfs(graph, u, &mut time, &mut data);
        }
    }
    for u in 0..graph.n {
        sort_by_key(&mut data.children[u], |&c| data.lowpoint[c]);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dfs_on_a_triangle_with_a_tail() {
        // 0-1, 1-2, 2-0 plus 2-3
        let g = BmGraph::from_edge_list(4, &[(0, 1), (1, 2), (2, 0), (2, 3)]);
        let order: Vec<usize> = (0..4).collect();
        let data = run_dfs(&g, &order);
        assert_eq!(data.roots, vec![0]);
        assert_eq!(data.dfi[0], 0);
        // one back edge closes the triangle at vertex 0
        assert_eq!(data.back_targets[0].len(), 1);
        // the tail vertex has lowpoint equal to its own dfi
        assert_eq!(data.lowpoint[3], data.dfi[3]);
        // vertices on the cycle can reach the root
        assert_eq!(data.lowpoint[1], 0);
        assert_eq!(data.lowpoint[2], 0);
    }

    #[test]
    fn test_children_sorted_by_lowpoint() {
        // star at 0 with a cycle through one branch: 0-1, 0-2, 0-3, 3-4, 4-0
        let g = BmGraph::from_edge_list(5, &[(0, 1), (0, 2), (0, 3), (3, 4), (4, 0)]);
        let order: Vec<usize> = (0..5).collect();
        let data = run_dfs(&g, &order);
        let kids = &data.children[0];
        for w in kids.windows(2) {
            assert!(data.lowpoint[w[0]] <= data.lowpoint[w[1]]);
        }
    }
}
