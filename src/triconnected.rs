use tracing::trace;

use crate::triconnected_blocks::outside_structures::{Component, SplitComponents, SplitKind};
use crate::triconnected_blocks::splitter::find_components;
use crate::triconnected_blocks::state::{
    DfsState, bond_duplicate_edges, make_adjacency_acceptable, run_palm_dfs, run_pathfinder,
};

/// Merges adjacent same-kind components: two polygons or two bonds sharing
/// a virtual edge pair collapse into one, consuming both copies of the pair.
/// Afterwards no two components of equal kind S or P are adjacent, which is
/// the SPQR-tree invariant.
fn merge_components(total_edges: usize, split_components: Vec<Component>) -> Vec<Component> {
    let mut owners: Vec<Vec<usize>> = vec![Vec::new(); total_edges];
    for (i, c) in split_components.iter().enumerate() {
        for &eid in &c.edges {
            owners[eid].push(i);
        }
    }

    let mut merged = vec![false; split_components.len()];
    let mut out = Vec::new();
    for i in 0..split_components.len() {
        if merged[i] {
            continue;
        }
        let kind = split_components[i].kind;
        if kind == Some(SplitKind::R) {
            out.push(split_components[i].clone());
            continue;
        }
        merged[i] = true;
        let mut collected = split_components[i].edges.clone();
        let mut j = 0;
        while j < collected.len() {
            let eid = collected[j];
            let absorb = owners[eid]
                .iter()
                .copied()
                .find(|&k| !merged[k] && split_components[k].kind == kind);
            if let Some(k) = absorb {
                merged[k] = true;
                collected.swap_remove(j);
                collected.extend(
                    split_components[k]
                        .edges
                        .iter()
                        .copied()
                        .filter(|&e| e != eid),
                );
            } else {
                j += 1;
            }
        }
        out.push(Component {
            edges: collected,
            kind,
        });
    }
    out
}

/// Computes the triconnected components of a biconnected, loopless
/// multigraph given as an edge list over vertices `0..n`.
///
/// Split pairs are found along the generated paths of a palm-tree DFS
/// (type-1 and type-2 case analysis), each split leaving a virtual edge
/// behind in both halves; bonding duplicate edges first keeps the search on
/// a simple graph. Calling this on a graph that is not biconnected, or with
/// self-loops, is a contract violation.
///
/// Reference:
/// Hopcroft & Tarjan, Dividing a Graph into Triconnected Components (1973),
/// with the corrections from Gutwenger & Mutzel, A Linear Time
/// Implementation of SPQR-Trees (2001).
pub fn get_split_components(n: usize, edges: &[(usize, usize)]) -> SplitComponents {
    debug_assert!(n >= 2);
    debug_assert!(edges.iter().all(|&(s, t)| s != t), "loopless input required");

    let input_m = edges.len();
    if n == 2 {
        let components = if input_m >= 3 {
            let mut c = Component::new(Some(SplitKind::P));
            c.edges.extend(0..input_m);
            vec![c]
        } else {
            Vec::new()
        };
        return SplitComponents {
            components,
            edges: edges.to_vec(),
            is_virtual: vec![false; input_m],
        };
    }

    let mut state = DfsState::new(n, edges);
    let mut split_components = Vec::new();

    bond_duplicate_edges(&mut state, &mut split_components);
    run_palm_dfs(&mut state, 0);
    make_adjacency_acceptable(&mut state);
    run_pathfinder(&mut state, 0);

    let cutoff = state.edges.len();
    let mut estack = Vec::new();
    let mut tstack = Vec::new();
    find_components(
        0,
        0,
        cutoff,
        &mut state,
        &mut estack,
        &mut tstack,
        &mut split_components,
    );

    let mut last = Component::new(None);
    while let Some(eid) = estack.pop() {
        last.push_edge(eid, &mut state, false);
    }
    if !last.edges.is_empty() {
        last.commit(&mut split_components);
    }

    trace!(
        components = split_components.len(),
        virtual_edges = state.edges.len() - input_m,
        "split search finished"
    );

    let components = merge_components(state.edges.len(), split_components);
    let mut is_virtual = vec![false; state.edges.len()];
    for flag in is_virtual.iter_mut().skip(input_m) {
        *flag = true;
    }

    SplitComponents {
        components,
        edges: state.edges,
        is_virtual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::graph_enumerator::GraphEnumeratorState;
    use crate::testing::random_graphs::random_biconnected_graph;
    use crate::{Graph, UnGraph, block_cut::get_blocks};
    use petgraph::visit::EdgeRef;

    fn edge_list(pg: &UnGraph) -> (usize, Vec<(usize, usize)>) {
        (
            pg.node_count(),
            pg.edge_references()
                .map(|e| (e.source().index(), e.target().index()))
                .collect(),
        )
    }

    /// Three internally vertex-disjoint paths between every vertex pair, by
    /// three rounds of augmenting flow on the split-vertex network.
    fn are_triconnected_brute(n: usize, edges: &[(usize, usize)]) -> Vec<Vec<bool>> {
        let mut res = vec![vec![false; n]; n];
        let mut cap = vec![vec![0i32; 2 * n]; 2 * n];
        for &(u, v) in edges {
            cap[u + n][v] += 1;
            cap[v + n][u] += 1;
        }
        for u in 0..n {
            cap[u][u + n] += 1;
        }

        fn dfs(u: usize, t: usize, cap: &mut Vec<Vec<i32>>, vis: &mut Vec<bool>) -> bool {
            vis[u] = true;
            if u == t {
                return true;
            }
            for v in 0..cap.len() {
                if !vis[v] && cap[u][v] > 0 && dfs(v, t, cap, vis) {
                    cap[u][v] -= 1;
                    cap[v][u] += 1;
                    return true;
                }
            }
            false
        }

        for s in 0..n {
            for t in 0..n {
                if s == t {
                    continue;
                }
                let mut cap = cap.clone();
                let mut vis = vec![false; 2 * n];
                let mut flows = 0;
                for _ in 0..3 {
                    if dfs(s + n, t, &mut cap, &mut vis) {
                        flows += 1;
                    }
                    vis.fill(false);
                }
                res[s][t] = flows >= 3;
            }
        }
        res
    }

    fn answer_fast(n: usize, m: usize, split: &SplitComponents) -> Vec<Vec<bool>> {
        if n == 2 && m <= 2 {
            return vec![vec![false; n]; n];
        }
        let mut res = vec![vec![false; n]; n];
        for c in &split.components {
            if c.kind == Some(SplitKind::S) {
                continue;
            }
            let mut vs = Vec::new();
            for &eid in &c.edges {
                let (u, v) = split.edges[eid];
                vs.push(u);
                vs.push(v);
            }
            vs.sort_unstable();
            vs.dedup();
            for &x in &vs {
                for &y in &vs {
                    if x != y {
                        res[x][y] = true;
                    }
                }
            }
        }
        res
    }

    fn verify_components(n: usize, split: &SplitComponents) {
        let mut occs = vec![0usize; split.edges.len()];
        for c in &split.components {
            let mut vs = Vec::new();
            let mut deg = vec![0usize; n];
            for &eid in &c.edges {
                occs[eid] += 1;
                let (u, v) = split.edges[eid];
                vs.push(u);
                vs.push(v);
                deg[u] += 1;
                deg[v] += 1;
            }
            vs.sort_unstable();
            vs.dedup();
            match c.kind {
                Some(SplitKind::P) => {
                    assert_eq!(vs.len(), 2);
                    assert!(c.edges.len() >= 3);
                }
                Some(SplitKind::S) => {
                    assert!(vs.len() >= 3);
                    assert_eq!(c.edges.len(), vs.len(), "polygon must be a cycle");
                    assert!(deg.iter().all(|&d| d == 0 || d == 2));
                }
                Some(SplitKind::R) => assert!(vs.len() >= 4),
                None => panic!("uncommitted component"),
            }
        }
        // input edges in exactly one component, virtual edges in two or gone
        for (eid, &cnt) in occs.iter().enumerate() {
            if split.is_virtual[eid] {
                assert!(cnt == 0 || cnt == 2, "virtual edge {} seen {} times", eid, cnt);
            } else {
                assert_eq!(cnt, 1, "real edge {} seen {} times", eid, cnt);
            }
        }
        // no two adjacent components of equal kind S or P
        for eid in 0..split.edges.len() {
            if !split.is_virtual[eid] {
                continue;
            }
            let owners: Vec<&Component> = split
                .components
                .iter()
                .filter(|c| c.edges.contains(&eid))
                .collect();
            if owners.len() == 2 && owners[0].kind == owners[1].kind {
                assert_eq!(owners[0].kind, Some(SplitKind::R));
            }
        }
    }

    #[test]
    fn test_cycle_is_one_polygon() {
        let edges: Vec<(usize, usize)> = (0..5).map(|i| (i, (i + 1) % 5)).collect();
        let split = get_split_components(5, &edges);
        assert_eq!(split.components.len(), 1);
        assert_eq!(split.components[0].kind, Some(SplitKind::S));
        verify_components(5, &split);
    }

    #[test]
    fn test_k4_is_one_rigid() {
        let edges = vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
        let split = get_split_components(4, &edges);
        assert_eq!(split.components.len(), 1);
        assert_eq!(split.components[0].kind, Some(SplitKind::R));
        verify_components(4, &split);
    }

    #[test]
    fn test_parallel_edges_make_a_bond() {
        let edges = vec![(0, 1), (0, 1), (1, 2), (2, 0)];
        let split = get_split_components(3, &edges);
        verify_components(3, &split);
        assert!(
            split
                .components
                .iter()
                .any(|c| c.kind == Some(SplitKind::P))
        );
        assert!(
            split
                .components
                .iter()
                .any(|c| c.kind == Some(SplitKind::S))
        );
    }

    #[test]
    fn test_two_triangles_sharing_an_edge() {
        // the shared edge is a split pair: two triangles and one bond
        let edges = vec![(0, 1), (1, 2), (2, 0), (1, 3), (3, 2)];
        let split = get_split_components(4, &edges);
        verify_components(4, &split);
        let kinds: Vec<_> = split.components.iter().map(|c| c.kind.unwrap()).collect();
        assert_eq!(
            kinds.iter().filter(|&&k| k == SplitKind::S).count(),
            2,
            "{:?}",
            split
        );
        assert_eq!(kinds.iter().filter(|&&k| k == SplitKind::P).count(), 1);
    }

    #[test]
    fn test_against_brute_force_triconnectivity_random() {
        for seed in 0..120 {
            let pg = random_biconnected_graph(2 + seed / 12, 1 + seed, seed);
            let (n, edges) = edge_list(&pg);
            if n < 2 || edges.is_empty() {
                continue;
            }
            let split = get_split_components(n, &edges);
            verify_components(n, &split);
            let brute = are_triconnected_brute(n, &edges);
            let fast = answer_fast(n, edges.len(), &split);
            assert_eq!(brute, fast, "seed {} n {} edges {:?}", seed, n, edges);
        }
    }

    #[test]
    fn test_against_brute_force_triconnectivity_exhaustive() {
        for n in 4..=5 {
            let enumerator = GraphEnumeratorState {
                n,
                mask: 0,
                last_mask: 1 << (n * (n - 1) / 2),
            };
            for pg in enumerator {
                // restrict to biconnected graphs covering all n vertices
                let arena = Graph::from_petgraph(&pg);
                let blocks = get_blocks(&arena);
                if blocks.len() != 1 || blocks[0].nodes.len() != n {
                    continue;
                }
                let (n, edges) = edge_list(&pg);
                let split = get_split_components(n, &edges);
                verify_components(n, &split);
                let brute = are_triconnected_brute(n, &edges);
                let fast = answer_fast(n, edges.len(), &split);
                assert_eq!(brute, fast, "edges {:?}", edges);
            }
        }
    }
}
