use std::collections::VecDeque;

use crate::planarity_blocks::structures::{BmGraph, DfsData, NIL};

/// One embedded edge end. `link` holds the (at most two) list neighbors in
/// the owner's adjacency list; an end arc has a `NIL` slot. Arc links carry
/// no direction of their own: traversal arrives from one neighbor and leaves
/// through the other.
#[derive(Debug, Clone)]
struct Arc {
    neighbor: usize,
    eid: usize,
    twin: usize,
    link: [usize; 2],
}

/// A bicomp root descended through during walk-down, waiting to be merged
/// into its parent vertex once a back edge lands below it. `w_in` is the
/// side the walk entered the parent vertex by, `root_out` the side it left
/// the child root by.
#[derive(Debug, Clone, Copy)]
struct MergeEntry {
    w: usize,
    w_in: usize,
    root: usize,
    root_out: usize,
}

/// Vertex-addition embedder: processes vertices in reverse DFI order,
/// walk-up marking the chain of pertinent bicomp roots for each back edge
/// and walk-down embedding the back edges while merging bicomps through
/// their virtual roots.
///
/// Adjacency lists are kept consistently oriented at all times: reading a
/// list from slot 0 to slot 1 is the clockwise rotation, so a clockwise
/// external-face walk leaves every vertex through slot 0 and enters through
/// slot 1. A child bicomp walked against the parent's handedness is flipped
/// eagerly at merge time by swapping the end slots of each of its vertices.
pub struct Embedder<'a> {
    graph: &'a BmGraph,
    data: &'a DfsData,
    arcs: Vec<Arc>,
    /// Ends of each adjacency list: slots `0..n` are the real vertices,
    /// `n + c` is the virtual root of the bicomp that child `c` hangs from.
    vlink: Vec<[usize; 2]>,
    pertinent_roots: Vec<VecDeque<usize>>,
    /// Children still in separate bicomps, ascending by lowpoint.
    separated: Vec<Vec<usize>>,
    sep_alive: Vec<bool>,
    root_alive: Vec<bool>,
    /// Real vertices of the bicomp rooted at `n + c`, per child `c`.
    members: Vec<Vec<usize>>,
    backedge_flag: Vec<usize>,
    backedge_eid: Vec<usize>,
    root_stamp: Vec<usize>,
}

impl<'a> Embedder<'a> {
    pub fn new(graph: &'a BmGraph, data: &'a DfsData) -> Self {
        let n = graph.n;
        let mut emb = Embedder {
            graph,
            data,
            arcs: Vec::with_capacity(4 * graph.edges.len()),
            vlink: vec![[NIL, NIL]; 2 * n],
            pertinent_roots: vec![VecDeque::new(); n],
            separated: data.children.clone(),
            sep_alive: vec![false; n],
            root_alive: vec![false; n],
            members: (0..n).map(|c| vec![c]).collect(),
            backedge_flag: vec![NIL; n],
            backedge_eid: vec![NIL; n],
            root_stamp: vec![NIL; n],
        };
        // one single-edge bicomp per tree edge
        for c in 0..n {
            let u = data.parent[c];
            if u == NIL {
                continue;
            }
            let root = n + c;
            let eid = data.parent_eid[c];
            let a_root = emb.push_arc(c, eid);
            let a_child = emb.push_arc(root, eid);
            emb.arcs[a_root].twin = a_child;
            emb.arcs[a_child].twin = a_root;
            emb.vlink[root] = [a_root, a_root];
            emb.vlink[c] = [a_child, a_child];
            emb.sep_alive[c] = true;
            emb.root_alive[c] = true;
        }
        emb
    }

    fn push_arc(&mut self, neighbor: usize, eid: usize) -> usize {
        self.arcs.push(Arc {
            neighbor,
            eid,
            twin: NIL,
            link: [NIL, NIL],
        });
        self.arcs.len() - 1
    }

    /// Joins two arcs through their free link slots (both must be list ends).
    fn connect(&mut self, a: usize, b: usize) {
        let sa = if self.arcs[a].link[0] == NIL { 0 } else { 1 };
        debug_assert!(self.arcs[a].link[sa] == NIL);
        self.arcs[a].link[sa] = b;
        let sb = if self.arcs[b].link[0] == NIL { 0 } else { 1 };
        debug_assert!(self.arcs[b].link[sb] == NIL);
        self.arcs[b].link[sb] = a;
    }

    /// One step along the external face: leave `from` through the given list
    /// end, land on the neighbor, report the side entered there. A vertex
    /// with a single arc cannot encode the side, so the walk's handedness
    /// carries through it unchanged.
    fn step(&self, from: usize, exit_end: usize) -> (usize, usize) {
        let out = self.vlink[from][exit_end];
        let w = self.arcs[out].neighbor;
        let tw = self.arcs[out].twin;
        let w_in = if self.vlink[w][0] == self.vlink[w][1] {
            1 - exit_end
        } else if self.vlink[w][0] == tw {
            0
        } else {
            debug_assert_eq!(self.vlink[w][1], tw, "entered off the external face");
            1
        };
        (w, w_in)
    }

    /// Lowpoint of the first still-separated child of `w`, if any.
    fn first_separated_lowpoint(&self, w: usize) -> Option<usize> {
        self.separated[w]
            .iter()
            .find(|&&c| self.sep_alive[c])
            .map(|&c| self.data.lowpoint[c])
    }

    fn externally_active(&self, step_dfi: usize, w: usize) -> bool {
        if self.data.least_ancestor[w] < step_dfi {
            return true;
        }
        self.first_separated_lowpoint(w)
            .is_some_and(|lp| lp < step_dfi)
    }

    fn pertinent(&self, step_dfi: usize, w: usize) -> bool {
        self.backedge_flag[w] == step_dfi || !self.pertinent_roots[w].is_empty()
    }

    fn internally_active(&self, step_dfi: usize, w: usize) -> bool {
        self.pertinent(step_dfi, w) && !self.externally_active(step_dfi, w)
    }

    /// Lock-step walk around the external face of the bicomp containing `x`
    /// until the (unique) virtual root comes up on either side.
    fn find_root(&self, x: usize) -> usize {
        let n = self.graph.n;
        let mut p0 = (x, 1usize);
        let mut p1 = (x, 0usize);
        loop {
            p0 = self.step(p0.0, 1 - p0.1);
            if p0.0 >= n {
                return p0.0;
            }
            p1 = self.step(p1.0, 1 - p1.1);
            if p1.0 >= n {
                return p1.0;
            }
        }
    }

    /// Marks the chain of bicomp roots between `w` and `v` pertinent for the
    /// back edge `(v, w)`.
    fn walkup(&mut self, v: usize, w: usize, eid: usize) {
        let step_dfi = self.data.dfi[v];
        self.backedge_flag[w] = step_dfi;
        self.backedge_eid[w] = eid;

        let n = self.graph.n;
        let mut x = w;
        while x != v {
            let root = self.find_root(x);
            let c = root - n;
            if self.root_stamp[c] == step_dfi {
                // an earlier walk-up of this step already climbed from here
                break;
            }
            self.root_stamp[c] = step_dfi;
            let u = self.data.parent[c];
            if self.data.lowpoint[c] < step_dfi {
                // externally active root: considered last during walk-down
                self.pertinent_roots[u].push_back(root);
            } else {
                self.pertinent_roots[u].push_front(root);
            }
            x = u;
        }
    }

    /// First active vertex on the external face of the bicomp rooted at
    /// `root`, walking away through the given end.
    fn first_active(&self, step_dfi: usize, root: usize, dir: usize) -> usize {
        let (mut w, mut w_in) = self.step(root, dir);
        while w != root && !self.pertinent(step_dfi, w) && !self.externally_active(step_dfi, w) {
            let next = self.step(w, 1 - w_in);
            w = next.0;
            w_in = next.1;
        }
        w
    }

    fn choose_root_exit(&self, step_dfi: usize, root: usize) -> usize {
        let x = self.first_active(step_dfi, root, 0);
        let y = self.first_active(step_dfi, root, 1);
        // the walk-up that marked this root pertinent passed through a
        // vertex on its external face, so both scans stop before wrapping
        debug_assert!(x < self.graph.n && y < self.graph.n);
        if self.internally_active(step_dfi, x) {
            0
        } else if self.internally_active(step_dfi, y) {
            1
        } else if self.pertinent(step_dfi, x) {
            0
        } else {
            1
        }
    }

    /// Absorbs a child bicomp root into its parent vertex. Entering the
    /// parent and leaving the child through same-numbered sides means the
    /// two walks disagree on handedness, so the child bicomp is flipped.
    /// Returns the flipped vertices so the caller can patch walk state that
    /// referenced their old sides.
    fn merge_bicomp(&mut self, top_c: usize, entry: MergeEntry) -> Option<Vec<usize>> {
        let n = self.graph.n;
        let c = entry.root - n;
        let u = entry.w;
        debug_assert_eq!(self.pertinent_roots[u].front(), Some(&entry.root));
        self.pertinent_roots[u].pop_front();
        self.sep_alive[c] = false;
        self.root_alive[c] = false;

        let flip = entry.w_in == entry.root_out;
        let mems = std::mem::take(&mut self.members[c]);
        if flip {
            for &x in &mems {
                self.vlink[x].swap(0, 1);
            }
        }

        self.retarget_arcs(entry.root, u);

        let w_end = self.vlink[u][entry.w_in];
        let r_inner = self.vlink[entry.root][entry.root_out];
        let r_outer = self.vlink[entry.root][1 - entry.root_out];
        self.connect(r_inner, w_end);
        self.vlink[u][entry.w_in] = r_outer;
        self.vlink[entry.root] = [NIL, NIL];

        let ret = flip.then(|| mems.clone());
        self.members[top_c].extend(mems);
        ret
    }

    /// Twins of every arc in `root`'s list now point at `u`.
    fn retarget_arcs(&mut self, root: usize, u: usize) {
        let mut a = self.vlink[root][0];
        let mut prev = NIL;
        while a != NIL {
            let tw = self.arcs[a].twin;
            self.arcs[tw].neighbor = u;
            let [n0, n1] = self.arcs[a].link;
            let next = if n0 == prev { n1 } else { n0 };
            prev = a;
            a = next;
        }
    }

    fn embed_back_edge(&mut self, root: usize, dir: usize, w: usize, w_in: usize, eid: usize) {
        let a_root = self.push_arc(w, eid);
        let a_w = self.push_arc(root, eid);
        self.arcs[a_root].twin = a_w;
        self.arcs[a_w].twin = a_root;

        let old_r = self.vlink[root][dir];
        self.connect(a_root, old_r);
        self.vlink[root][dir] = a_root;

        let old_w = self.vlink[w][w_in];
        self.connect(a_w, old_w);
        self.vlink[w][w_in] = a_w;
    }

    /// Embeds the back edges of the current step reachable through `root`.
    /// Returns the number embedded.
    fn walkdown(&mut self, v: usize, root: usize) -> usize {
        let step_dfi = self.data.dfi[v];
        let top_c = root - self.graph.n;
        let mut embedded = 0;
        for dir in 0..2 {
            let mut stack: Vec<MergeEntry> = Vec::new();
            let (mut w, mut w_in) = self.step(root, dir);
            while w != root {
                if self.backedge_flag[w] == step_dfi {
                    let mut entries = std::mem::take(&mut stack);
                    for i in 0..entries.len() {
                        if let Some(flipped) = self.merge_bicomp(top_c, entries[i]) {
                            // sides captured before the flip are stale now
                            for e in entries[i + 1..].iter_mut() {
                                if flipped.contains(&e.w) {
                                    e.w_in = 1 - e.w_in;
                                }
                            }
                            if flipped.contains(&w) {
                                w_in = 1 - w_in;
                            }
                        }
                    }
                    let eid = self.backedge_eid[w];
                    self.embed_back_edge(root, dir, w, w_in, eid);
                    self.backedge_flag[w] = NIL;
                    embedded += 1;
                }
                if let Some(&r) = self.pertinent_roots[w].front() {
                    let root_out = self.choose_root_exit(step_dfi, r);
                    stack.push(MergeEntry {
                        w,
                        w_in,
                        root: r,
                        root_out,
                    });
                    let next = self.step(r, root_out);
                    w = next.0;
                    w_in = next.1;
                } else if self.externally_active(step_dfi, w) {
                    // blocked on this side
                    break;
                } else {
                    let next = self.step(w, 1 - w_in);
                    w = next.0;
                    w_in = next.1;
                }
            }
        }
        embedded
    }

    /// Runs the vertex-addition pass. `Some(rotations)` (edge indices per
    /// vertex, in cyclic order) on success, `None` on a non-planar input.
    pub fn run(mut self) -> Option<Vec<Vec<usize>>> {
        let n = self.graph.n;
        for i in (0..n).rev() {
            let v = self.data.vertex_of_dfi[i];
            if v == NIL {
                continue;
            }
            let wanted = self.data.back_targets[v].len();
            if wanted == 0 {
                continue;
            }
            for k in 0..wanted {
                let (w, eid) = self.data.back_targets[v][k];
                self.walkup(v, w, eid);
            }
            let mut embedded = 0;
            while let Some(root) = self.pertinent_roots[v].pop_front() {
                embedded += self.walkdown(v, root);
            }
            if embedded != wanted {
                return None;
            }
        }
        Some(self.read_rotations())
    }

    /// Merges the bicomps still hanging at cut vertices and reads the
    /// rotations off the adjacency lists. Blocks meeting at a cut vertex are
    /// embedded next to each other, which is planar for any relative
    /// orientation, so these merges never flip.
    fn read_rotations(&mut self) -> Vec<Vec<usize>> {
        let n = self.graph.n;
        for c in 0..n {
            if !self.root_alive[c] {
                continue;
            }
            let root = n + c;
            let u = self.data.parent[c];
            self.retarget_arcs(root, u);
            if self.vlink[u][0] == NIL {
                self.vlink[u] = self.vlink[root];
            } else {
                self.connect(self.vlink[root][1], self.vlink[u][0]);
                self.vlink[u][0] = self.vlink[root][0];
            }
            self.vlink[root] = [NIL, NIL];
            self.root_alive[c] = false;
        }

        let mut rotations = vec![Vec::new(); n];
        for (v, rotation) in rotations.iter_mut().enumerate() {
            let mut a = self.vlink[v][0];
            let mut prev = NIL;
            while a != NIL {
                rotation.push(self.arcs[a].eid);
                let [n0, n1] = self.arcs[a].link;
                let next = if n0 == prev { n1 } else { n0 };
                prev = a;
                a = next;
            }
        }
        rotations
    }
}
