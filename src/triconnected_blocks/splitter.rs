use crate::triconnected_blocks::outside_structures::{Component, SplitKind};
use crate::triconnected_blocks::state::{ArcKind, DfsState};

/// Entries are (h, a, b): a candidate type-2 split pair (a, b) with h the
/// highest dfi in the spanned subtree.
pub(crate) type TStack = Vec<(usize, usize, usize)>;

fn pop_tstack(
    cutoff: usize,
    mut max_h: usize,
    mut last_b: usize,
    tstack: &mut TStack,
) -> (usize, usize, usize) {
    while let Some(&(h, a, b)) = tstack.last() {
        if a > cutoff {
            tstack.pop();
            max_h = h.max(max_h);
            last_b = b;
        } else {
            break;
        }
    }
    (max_h, cutoff, last_b)
}

fn update_tstack(u: usize, to: usize, eid: usize, tstack: &mut TStack, state: &DfsState) {
    let entry = if state.kind[eid] == Some(ArcKind::Tree) {
        pop_tstack(
            state.low1[to],
            state.dfi[to] + state.subtree[to] - 1,
            state.dfi[u],
            tstack,
        )
    } else {
        pop_tstack(state.dfi[to], state.dfi[u], state.dfi[u], tstack)
    };
    tstack.push(entry);
}

fn check_highpoint(u: usize, tstack: &mut TStack, state: &mut DfsState) {
    let u_high = state.high(u);
    while let Some(&(h, a, b)) = tstack.last() {
        if a != state.dfi[u] && b != state.dfi[u] && u_high > h {
            tstack.pop();
        } else {
            break;
        }
    }
}

/// Type-2 splits: a split pair (u, b) spanning the subtree just left, or a
/// degree-2 vertex wedged between its neighbors.
#[allow(clippy::too_many_arguments)]
fn check_type_2(
    root: usize,
    u: usize,
    mut to: usize,
    tstack: &mut TStack,
    estack: &mut Vec<usize>,
    state: &mut DfsState,
    split_components: &mut Vec<Component>,
) {
    if state.dfi[u] == root {
        return;
    }

    loop {
        let (h, a, b) = if let Some(&last) = tstack.last() {
            last
        } else {
            (0, usize::MAX, 0)
        };

        let pair_open = a == state.dfi[u];
        let degree_two = state.degree[to] == 2
            && state.dfi[state.first_live_target(root, to).unwrap()] > state.dfi[to];

        if !(pair_open || degree_two) {
            break;
        }
        if pair_open && state.parent[state.vertex_of_dfi[b]] == u {
            tstack.pop();
            continue;
        }

        let mut eab = None;
        let mut evirt;
        if degree_two {
            // squeeze the degree-2 vertex out as a triangle
            to = state.first_live_target(root, to).unwrap();

            let mut component = Component::new(Some(SplitKind::S));
            for _ in 0..2 {
                let eid = estack.pop().unwrap();
                component.push_edge(eid, state, false);
            }

            evirt = state.add_edge(u, to, None);
            component.push_edge(evirt, state, true);
            component.commit(split_components);

            if let Some(&eid) = estack.last() {
                if state.edges[eid] == (to, u) {
                    estack.pop();
                    eab = Some(eid);
                }
            }
        } else {
            to = state.vertex_of_dfi[b];

            tstack.pop();
            let mut component = Component::new(None);
            while let Some(&eid) = estack.last() {
                let (x, y) = state.edges[eid];
                let x_inside = state.dfi[u] <= state.dfi[x] && state.dfi[x] <= h;
                let y_inside = state.dfi[u] <= state.dfi[y] && state.dfi[y] <= h;
                if !(x_inside && y_inside) {
                    break;
                }
                estack.pop();
                if (x == u && y == to) || (y == u && x == to) {
                    eab = Some(eid);
                } else {
                    component.push_edge(eid, state, false);
                }
            }

            evirt = state.add_edge(u, to, None);
            component.push_edge(evirt, state, true);
            component.commit(split_components);
        }

        if let Some(eab) = eab {
            // the split pair is directly connected: bond it in parallel
            let mut component = Component::new(Some(SplitKind::P));
            component.push_edge(eab, state, false);
            component.push_edge(evirt, state, false);
            evirt = state.add_edge(u, to, None);
            component.push_edge(evirt, state, true);
            component.commit(split_components);
        }

        estack.push(evirt);
        state.set_tree(evirt);
    }
}

/// Type-1 splits: the subtree under `to` touches the rest of the graph only
/// through `u` and the vertex realizing `low1[to]`.
fn check_type_1(
    root: usize,
    u: usize,
    to: usize,
    estack: &mut Vec<usize>,
    state: &mut DfsState,
    split_components: &mut Vec<Component>,
    tree_arcs_left: usize,
) {
    if !(state.low2[to] >= state.dfi[u]
        && state.low1[to] < state.dfi[u]
        && (state.parent[u] != state.vertex_of_dfi[root] || tree_arcs_left != 0))
    {
        return;
    }
    let mut component = Component::new(None);
    while let Some(&eid) = estack.last() {
        let (x, y) = state.edges[eid];
        let x_inside =
            state.dfi[to] <= state.dfi[x] && state.dfi[x] < state.dfi[to] + state.subtree[to];
        let y_inside =
            state.dfi[to] <= state.dfi[y] && state.dfi[y] < state.dfi[to] + state.subtree[to];
        if !(x_inside || y_inside) {
            break;
        }
        estack.pop();
        component.push_edge(eid, state, true);
        state.kill_edge(eid);
    }

    let low_vertex = state.vertex_of_dfi[state.low1[to]];
    let mut evirt = state.add_edge(u, low_vertex, None);
    component.push_edge(evirt, state, true);
    component.commit(split_components);

    if let Some(&eid) = estack.last() {
        let (x, y) = state.edges[eid];
        if (x == u && y == low_vertex) || (y == u && x == low_vertex) {
            estack.pop();
            let mut component = Component::new(Some(SplitKind::P));
            component.push_edge(eid, state, false);
            component.push_edge(evirt, state, false);
            evirt = state.add_edge(u, low_vertex, None);
            component.push_edge(evirt, state, true);
            component.commit(split_components);
        }
    }

    if low_vertex != state.parent[u] {
        estack.push(evirt);
        state.set_back(evirt);
    } else {
        // the low vertex is u's parent: bond the virtual edge with the
        // parent tree arc
        let parent_edge = state.parent_eid[u];
        let mut component = Component::new(Some(SplitKind::P));
        component.push_edge(parent_edge, state, false);
        component.push_edge(evirt, state, false);
        evirt = state.add_edge(state.parent[u], u, None);
        component.push_edge(evirt, state, true);
        component.commit(split_components);

        state.set_tree(evirt);
        state.parent_eid[u] = evirt;
    }
}

/// The path-driven split search. `vedges_cutoff` is the edge count before
/// any virtual edge existed: the walk only follows input edges, virtual
/// edges surface through the stacks.
pub fn find_components(
    root: usize,
    u: usize,
    vedges_cutoff: usize,
    state: &mut DfsState,
    estack: &mut Vec<usize>,
    tstack: &mut TStack,
    split_components: &mut Vec<Component>,
) {
    let mut tree_arcs = state.adj[u]
        .iter()
        .filter(|&&eid| state.kind[eid] == Some(ArcKind::Tree))
        .count();

    let mut i = 0;
    while i < state.adj[u].len() {
        let eid = state.adj[u][i];
        if eid >= vedges_cutoff {
            break;
        }

        let to = state.other(eid, u);
        if state.path_start[eid] {
            update_tstack(u, to, eid, tstack, state);
        }

        if state.kind[eid] == Some(ArcKind::Tree) {
            let mut fresh_tstack = Vec::new();
            let sub_tstack: &mut TStack = if state.path_start[eid] {
                &mut fresh_tstack
            } else {
                &mut *tstack
            };
            find_components(
                root,
                to,
                vedges_cutoff,
                state,
                estack,
                sub_tstack,
                split_components,
            );
            tree_arcs -= 1;

            // the tree arc into `to` may have been replaced by a bond
            let push_eid = state.parent_eid[to];
            estack.push(push_eid);

            let sub_tstack: &mut TStack = if state.path_start[eid] {
                &mut fresh_tstack
            } else {
                &mut *tstack
            };
            check_type_2(root, u, to, sub_tstack, estack, state, split_components);
            check_type_1(root, u, to, estack, state, split_components, tree_arcs);

            check_highpoint(u, tstack, state);
        } else {
            estack.push(eid);
        }

        i += 1;
    }
}
