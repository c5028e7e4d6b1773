use crate::planarity_blocks::structures::NIL;

struct StState {
    adj: Vec<Vec<usize>>,
    edges: Vec<(usize, usize)>,
    pre: Vec<usize>,
    low: Vec<usize>,
    parent: Vec<usize>,
    parent_eid: Vec<usize>,
    edge_used: Vec<bool>,
    old_vertex: Vec<bool>,
}

impl StState {
    fn other(&self, eid: usize, u: usize) -> usize {
        let (a, b) = self.edges[eid];
        if a == u { b } else { a }
    }

    fn dfs(&mut self, u: usize, time: &mut usize) {
        self.pre[u] = *time;
        self.low[u] = *time;
        *time += 1;
        for i in 0..self.adj[u].len() {
            let eid = self.adj[u][i];
            if eid == self.parent_eid[u] {
                continue;
            }
            let to = self.other(eid, u);
            if self.pre[to] == NIL {
                self.parent[to] = u;
                self.parent_eid[to] = eid;
                self.dfs(to, time);
                self.low[u] = self.low[u].min(self.low[to]);
            } else {
                self.low[u] = self.low[u].min(self.pre[to]);
            }
        }
    }

    /// Target of `eid` when it is a back edge from `v` towards an ancestor.
    fn is_ancestor_target(&self, v: usize, eid: usize) -> Option<usize> {
        let w = self.other(eid, v);
        (w != v && self.parent_eid[v] != eid && self.pre[w] < self.pre[v]).then_some(w)
    }

    /// One new path out of `v`, per the Even-Tarjan case analysis: an unused
    /// back edge up, an unused tree edge extended along lowpoint paths, or
    /// an unused back edge from below climbed back to an old vertex.
    fn find_path(&mut self, v: usize) -> Vec<usize> {
        // back edge from v to an ancestor
        for i in 0..self.adj[v].len() {
            let eid = self.adj[v][i];
            if self.edge_used[eid] {
                continue;
            }
            if let Some(w) = self.is_ancestor_target(v, eid) {
                self.edge_used[eid] = true;
                return vec![v, w];
            }
        }
        // tree edge down, then the lowpoint path to an old ancestor
        for i in 0..self.adj[v].len() {
            let eid = self.adj[v][i];
            if self.edge_used[eid] {
                continue;
            }
            let w = self.other(eid, v);
            if self.parent_eid[w] != eid {
                continue;
            }
            self.edge_used[eid] = true;
            let mut path = vec![v];
            let mut u = w;
            loop {
                path.push(u);
                if self.old_vertex[u] {
                    break;
                }
                self.old_vertex[u] = true;
                // leave through the back edge realizing low[u] if it exists,
                // otherwise descend into the child carrying it
                let mut next = NIL;
                for j in 0..self.adj[u].len() {
                    let e2 = self.adj[u][j];
                    if self.edge_used[e2] {
                        continue;
                    }
                    let x = self.other(e2, u);
                    if self.parent_eid[u] != e2
                        && self.parent_eid[x] != e2
                        && self.pre[x] == self.low[u]
                    {
                        self.edge_used[e2] = true;
                        path.push(x);
                        next = NIL;
                        break;
                    }
                    if self.parent_eid[x] == e2 && self.low[x] == self.low[u] && next == NIL {
                        next = e2;
                    }
                }
                if *path.last().unwrap() != u {
                    // the back edge ended the path
                    break;
                }
                debug_assert!(next != NIL, "lowpoint path broke off");
                self.edge_used[next] = true;
                u = self.other(next, u);
            }
            return path;
        }
        // back edge arriving from a descendant; climb tree edges to an old vertex
        for i in 0..self.adj[v].len() {
            let eid = self.adj[v][i];
            if self.edge_used[eid] {
                continue;
            }
            let w = self.other(eid, v);
            if self.pre[w] > self.pre[v] && self.parent_eid[w] != eid {
                self.edge_used[eid] = true;
                let mut path = vec![v];
                let mut u = w;
                loop {
                    path.push(u);
                    if self.old_vertex[u] {
                        break;
                    }
                    self.old_vertex[u] = true;
                    let up = self.parent_eid[u];
                    self.edge_used[up] = true;
                    u = self.parent[u];
                }
                return path;
            }
        }
        Vec::new()
    }
}

/// Even-Tarjan st-numbering of a biconnected multigraph given over its edge
/// list. Vertices get numbers `0..n` such that the endpoints of edge
/// `st_eid` get the extremes and every other vertex has both a lower and a
/// higher neighbor. Calling this on a non-biconnected graph is a contract
/// violation.
pub fn st_number(n: usize, edges: &[(usize, usize)], st_eid: usize) -> Vec<usize> {
    let (s, t) = edges[st_eid];
    debug_assert!(s != t, "st edge must not be a loop");
    let mut adj = vec![Vec::new(); n];
    // the st edge is forced to be the first tree edge
    adj[s].push(st_eid);
    for (eid, &(a, b)) in edges.iter().enumerate() {
        if eid == st_eid || a == b {
            continue;
        }
        adj[a].push(eid);
        adj[b].push(eid);
    }

    let mut state = StState {
        adj,
        edges: edges.to_vec(),
        pre: vec![NIL; n],
        low: vec![NIL; n],
        parent: vec![NIL; n],
        parent_eid: vec![NIL; n],
        edge_used: vec![false; edges.len()],
        old_vertex: vec![false; n],
    };
    let mut time = 0;
    state.dfs(s, &mut time);
    debug_assert_eq!(state.parent[t], s, "st edge must open the DFS");

    state.edge_used[st_eid] = true;
    state.old_vertex[s] = true;
    state.old_vertex[t] = true;

    let mut stack = vec![t, s];
    let mut number = vec![NIL; n];
    let mut next = 0;
    while let Some(v) = stack.pop() {
        let path = state.find_path(v);
        if path.is_empty() {
            number[v] = next;
            next += 1;
        } else {
            // internal vertices in reverse, then v back on top
            for &u in path[1..path.len() - 1].iter().rev() {
                stack.push(u);
            }
            stack.push(v);
        }
    }
    number
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verify_st(n: usize, edges: &[(usize, usize)], numbers: &[usize]) {
        let mut seen = vec![false; n];
        for &x in numbers {
            assert!(x < n && !seen[x]);
            seen[x] = true;
        }
        for v in 0..n {
            if numbers[v] == 0 || numbers[v] == n - 1 {
                continue;
            }
            let mut lower = false;
            let mut higher = false;
            for &(a, b) in edges {
                let w = if a == v {
                    b
                } else if b == v {
                    a
                } else {
                    continue;
                };
                if numbers[w] < numbers[v] {
                    lower = true;
                }
                if numbers[w] > numbers[v] {
                    higher = true;
                }
            }
            assert!(lower && higher, "vertex {} lacks a lower or higher neighbor", v);
        }
    }

    #[test]
    fn test_triangle() {
        let edges = [(0, 1), (1, 2), (2, 0)];
        let numbers = st_number(3, &edges, 0);
        verify_st(3, &edges, &numbers);
        assert_eq!(numbers[0].min(numbers[1]), 0);
        assert_eq!(numbers[0].max(numbers[1]), 2);
    }

    #[test]
    fn test_k4_and_cycles() {
        let k4 = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
        verify_st(4, &k4, &st_number(4, &k4, 0));

        for n in 3..9 {
            let cycle: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
            verify_st(n, &cycle, &st_number(n, &cycle, 0));
        }
    }

    #[test]
    fn test_random_biconnected() {
        use crate::graph::Graph;
        use crate::testing::random_graphs::random_biconnected_graph;
        use petgraph::visit::EdgeRef;

        for seed in 0..40 {
            let pg = random_biconnected_graph(4 + seed % 8, 3 * (2 + seed % 5), seed);
            if pg.node_count() < 3 {
                continue;
            }
            let g = Graph::from_petgraph(&pg);
            let n = g.node_bound();
            let edges: Vec<(usize, usize)> = pg
                .edge_references()
                .map(|e| (e.source().index(), e.target().index()))
                .collect();
            let st = edges.iter().position(|&(a, b)| a != b).unwrap();
            let numbers = st_number(n, &edges, st);
            verify_st(n, &edges, &numbers);
        }
    }
}
