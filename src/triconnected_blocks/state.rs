use std::mem;

use crate::triconnected_blocks::outside_structures::{Component, SplitKind};

pub const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcKind {
    Tree,
    Back,
    Killed,
}

/// Working graph of the split-component search: flat index vectors over the
/// block's vertices and edges, extended with the virtual edges created while
/// splitting. Edges are reoriented during the palm DFS so tree arcs point
/// parent to child and back arcs point descendant to ancestor.
#[derive(Debug, Clone)]
pub struct DfsState {
    pub n: usize,
    pub m: usize,
    pub adj: Vec<Vec<usize>>,
    pub edges: Vec<(usize, usize)>,
    pub kind: Vec<Option<ArcKind>>,

    pub dfi: Vec<usize>,
    pub vertex_of_dfi: Vec<usize>,
    pub parent: Vec<usize>,
    pub parent_eid: Vec<usize>,
    pub low1: Vec<usize>,
    pub low2: Vec<usize>,
    pub subtree: Vec<usize>,
    pub degree: Vec<usize>,

    /// Pending fronds into each vertex, drained lazily by [`high`](Self::high).
    pub high_stack: Vec<Vec<usize>>,
    pub path_start: Vec<bool>,
}

impl DfsState {
    pub fn new(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut state = DfsState {
            n,
            m: 0,
            adj: vec![Vec::new(); n],
            edges: Vec::with_capacity(edges.len()),
            kind: Vec::new(),
            dfi: vec![NIL; n],
            vertex_of_dfi: vec![NIL; n],
            parent: vec![NIL; n],
            parent_eid: vec![NIL; n],
            low1: vec![0; n],
            low2: vec![0; n],
            subtree: vec![0; n],
            degree: vec![0; n],
            high_stack: vec![Vec::new(); n],
            path_start: Vec::new(),
        };
        for &(s, t) in edges {
            state.add_edge(s, t, None);
        }
        state
    }

    pub fn add_edge(&mut self, s: usize, t: usize, kind: Option<ArcKind>) -> usize {
        let eid = self.edges.len();
        self.edges.push((s, t));
        self.kind.push(kind);
        self.adj[s].push(eid);
        self.path_start.push(false);
        self.degree[s] += 1;
        self.degree[t] += 1;
        self.m += 1;
        eid
    }

    pub fn kill_edge(&mut self, eid: usize) {
        debug_assert!(self.kind[eid] != Some(ArcKind::Killed));
        self.kind[eid] = Some(ArcKind::Killed);
        let (s, t) = self.edges[eid];
        self.degree[s] -= 1;
        self.degree[t] -= 1;
    }

    pub fn set_tree(&mut self, eid: usize) {
        debug_assert!(self.kind[eid].is_none());
        self.kind[eid] = Some(ArcKind::Tree);
        let (s, t) = self.edges[eid];
        self.parent_eid[t] = eid;
        self.parent[t] = s;
    }

    pub fn set_back(&mut self, eid: usize) {
        debug_assert!(self.kind[eid].is_none());
        self.kind[eid] = Some(ArcKind::Back);
        let (s, t) = self.edges[eid];
        if self.high(s) < self.dfi[s] {
            self.high_stack[t].push(eid);
        }
    }

    pub fn other(&self, eid: usize, u: usize) -> usize {
        let (s, t) = self.edges[eid];
        if s == u { t } else { s }
    }

    /// Head of the first live outgoing edge of `u`, if any.
    pub fn first_live_target(&self, root: usize, u: usize) -> Option<usize> {
        if u == root {
            return None;
        }
        self.adj[u]
            .iter()
            .find(|&&eid| self.kind[eid] != Some(ArcKind::Killed))
            .map(|&eid| self.edges[eid].1)
    }

    /// Highest dfi with a live frond into `u`, 0 when none remain.
    pub fn high(&mut self, u: usize) -> usize {
        while let Some(&eid) = self.high_stack[u].last() {
            if self.kind[eid] == Some(ArcKind::Killed) {
                self.high_stack[u].pop();
            } else {
                return self.dfi[self.other(eid, u)];
            }
        }
        0
    }
}

/// Bonds duplicate edges away before the search: each parallel class of two
/// or more edges becomes one P component holding the duplicates plus a fresh
/// virtual edge that replaces them in the (now simple) graph.
pub fn bond_duplicate_edges(state: &mut DfsState, split_components: &mut Vec<Component>) {
    use hashbrown::HashMap;

    let mut groups: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for eid in 0..state.edges.len() {
        let (mut s, mut t) = state.edges[eid];
        if s > t {
            mem::swap(&mut s, &mut t);
        }
        groups.entry((s, t)).or_default().push(eid);
    }

    let mut keys: Vec<(usize, usize)> = groups.keys().copied().collect();
    keys.sort_unstable();
    for key in keys {
        let eids = &groups[&key];
        if eids.len() < 2 {
            continue;
        }
        let mut component = Component::new(Some(SplitKind::P));
        for &eid in eids {
            component.edges.push(eid);
            state.kill_edge(eid);
        }
        let (s, t) = key;
        let virt = state.add_edge(s, t, None);
        component.edges.push(virt);
        component.commit(split_components);
    }

    // rebuild adjacency without the bonded duplicates
    for list in state.adj.iter_mut() {
        list.clear();
    }
    for eid in 0..state.edges.len() {
        if state.kind[eid] == Some(ArcKind::Killed) {
            continue;
        }
        let (s, t) = state.edges[eid];
        state.adj[s].push(eid);
        state.adj[t].push(eid);
        state.kind[eid] = None;
    }
    state.m = state
        .kind
        .iter()
        .filter(|k| **k != Some(ArcKind::Killed))
        .count();
}

fn palm_dfs(state: &mut DfsState, u: usize, time: &mut usize) {
    state.dfi[u] = *time;
    state.low1[u] = *time;
    state.low2[u] = *time;
    state.subtree[u] = 1;
    *time += 1;

    let neighbors = state.adj[u].clone();
    for eid in neighbors {
        if state.kind[eid].is_some() {
            continue;
        }
        let to = state.other(eid, u);
        if state.dfi[to] == NIL {
            state.parent_eid[to] = eid;
            state.parent[to] = u;
            state.kind[eid] = Some(ArcKind::Tree);

            palm_dfs(state, to, time);

            state.subtree[u] += state.subtree[to];
            if state.low1[to] < state.low1[u] {
                state.low2[u] = state.low1[u].min(state.low2[to]);
                state.low1[u] = state.low1[to];
            } else if state.low1[to] == state.low1[u] {
                state.low2[u] = state.low2[u].min(state.low2[to]);
            } else {
                state.low2[u] = state.low2[u].min(state.low1[to]);
            }
        } else {
            state.kind[eid] = Some(ArcKind::Back);
            if state.dfi[to] < state.low1[u] {
                state.low2[u] = state.low1[u];
                state.low1[u] = state.dfi[to];
            } else if state.dfi[to] > state.low1[u] {
                state.low2[u] = state.low2[u].min(state.dfi[to]);
            }
        }
    }
}

/// First pass: dfi, low1/low2, subtree sizes, arc kinds, and a consistent
/// arc orientation (tree arcs down, fronds up).
pub fn run_palm_dfs(state: &mut DfsState, root: usize) {
    let mut time = 0;
    palm_dfs(state, root, &mut time);

    for eid in 0..state.edges.len() {
        if state.kind[eid] == Some(ArcKind::Killed) {
            continue;
        }
        let (s, t) = state.edges[eid];
        let swap = match state.kind[eid] {
            Some(ArcKind::Back) => state.dfi[s] < state.dfi[t],
            Some(ArcKind::Tree) => state.dfi[s] > state.dfi[t],
            _ => false,
        };
        if swap {
            let edge = &mut state.edges[eid];
            mem::swap(&mut edge.0, &mut edge.1);
        }
    }
}

/// Sorts every adjacency list by the Hopcroft-Tarjan potential so the
/// second DFS generates paths in the order the split search requires: tree
/// arcs sort by low1 (chordal ones after plain ones), fronds between them.
pub fn make_adjacency_acceptable(state: &mut DfsState) {
    let phi = |state: &DfsState, eid: usize| -> usize {
        let (v, w) = state.edges[eid];
        match state.kind[eid] {
            Some(ArcKind::Tree) => {
                if state.low2[w] < state.dfi[v] {
                    3 * state.low1[w]
                } else {
                    3 * state.low1[w] + 2
                }
            }
            Some(ArcKind::Back) => 3 * state.dfi[w] + 1,
            _ => usize::MAX,
        }
    };

    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); 3 * state.n + 3];
    for eid in 0..state.edges.len() {
        if state.kind[eid] == Some(ArcKind::Killed) {
            continue;
        }
        buckets[phi(state, eid)].push(eid);
    }

    for list in state.adj.iter_mut() {
        list.clear();
    }
    for bucket in buckets {
        for eid in bucket {
            let (s, _) = state.edges[eid];
            state.adj[s].push(eid);
        }
    }
}

fn pathfinder_dfs(state: &mut DfsState, root: usize, u: usize, newnum: &mut [usize], time: &mut usize) {
    let first_to = state.first_live_target(root, u);

    let neighbors = state.adj[u].clone();
    for eid in neighbors {
        let to = state.other(eid, u);
        if Some(to) != first_to {
            state.path_start[eid] = true;
        }
        if state.kind[eid] == Some(ArcKind::Tree) {
            pathfinder_dfs(state, root, to, newnum, time);
        } else {
            state.high_stack[to].push(eid);
        }
    }

    newnum[u] = *time;
    *time = time.saturating_sub(1);
}

/// Second pass: renumber vertices so each generated path is a descending
/// interval, record which edges start a path and stage the frond stacks
/// behind [`DfsState::high`].
pub fn run_pathfinder(state: &mut DfsState, root: usize) {
    let mut newnum = vec![0; state.n];
    let mut time = state.n - 1;
    pathfinder_dfs(state, root, root, &mut newnum, &mut time);

    let mut renumber = vec![0; state.n];
    for u in 0..state.n {
        renumber[state.dfi[u]] = newnum[u];
    }
    for u in 0..state.n {
        state.low1[u] = renumber[state.low1[u]];
        state.low2[u] = renumber[state.low2[u]];
        state.dfi[u] = newnum[u];
        state.vertex_of_dfi[state.dfi[u]] = u;
        state.high_stack[u].reverse();
    }
}
