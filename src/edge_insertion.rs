use std::time::{Duration, Instant};

use hashbrown::HashMap;
use tracing::debug;

use crate::block_cut::{Block, get_block_cut_forest};
use crate::edge_insertion_blocks::dual_router::{TreeRef, route_through_tree};
use crate::graph::{EdgeId, Graph, NodeId};
use crate::plan_rep::PlanRep;
use crate::spqr_blocks::dynamic::DynamicSpqrTree;
use crate::spqr_blocks::outside_structures::SpqrTree;
use crate::types::ReturnType;

/// Remove-reinsert policy applied after (or during) the insertion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Postprocessing {
    /// Keep the routes of the first pass.
    None,
    /// Re-route the edges this call inserted, once, at the end.
    Inserted,
    /// Re-route the K chains with the most crossings, at the end.
    MostCrossed(usize),
    /// Re-route every chain of the representation, at the end.
    All,
    /// After every single insertion, re-route every chain.
    Incremental,
    /// After every single insertion, re-route the edges inserted so far.
    IncInserted,
}

/// Knobs of one insertion call. Costs, crossability and subgraph membership
/// are per original edge of the representation; the time limit is checked
/// between edges, never inside one routing step.
#[derive(Default)]
pub struct InsertionOptions<'a> {
    pub costs: Option<&'a [u64]>,
    pub forbidden: Option<&'a [bool]>,
    pub subgraph: Option<&'a [bool]>,
    pub postprocessing: Option<Postprocessing>,
    pub time_limit: Option<Duration>,
}

impl InsertionOptions<'_> {
    /// Price of crossing the given original edge; `None` when crossing it is
    /// not allowed.
    fn crossing_cost(&self, orig: usize) -> Option<u64> {
        if self.forbidden.is_some_and(|f| f[orig]) {
            return None;
        }
        if self.subgraph.is_some_and(|s| !s[orig]) {
            return None;
        }
        Some(self.costs.map_or(1, |c| c[orig]))
    }

    fn postprocessing(&self) -> Postprocessing {
        self.postprocessing.unwrap_or(Postprocessing::None)
    }
}

/// An edge-insertion algorithm: threads the given original edges into the
/// planarized representation, one at a time, minimizing crossings.
pub trait EdgeInsertionStrategy {
    fn call(&self, rep: &mut PlanRep, orig_edges: &[usize], options: &InsertionOptions)
    -> ReturnType;
}

/// Static variant: the SPQR decomposition of each traversed block is rebuilt
/// from scratch for every edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableEmbeddingInserter;

/// Dynamic variant: consecutive insertions into the same block keep one
/// incrementally maintained SPQR-tree (split/merge updates instead of
/// rebuilds); insertions spanning several blocks fall back to the static
/// route and drop the cache, since they merge blocks wholesale.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableEmbeddingInserterDyn;

enum InsertError {
    NoRoute,
    Arena,
}

/// Cached dynamic decomposition of one block.
struct DynCache {
    signature: Vec<EdgeId>,
    tree: DynamicSpqrTree,
    local_of_node: HashMap<NodeId, usize>,
    next_local: usize,
    arena_of_eid: HashMap<usize, EdgeId>,
    eid_of_arena: HashMap<EdgeId, usize>,
}

fn localize(graph: &Graph, block: &Block) -> (usize, Vec<(usize, usize)>, Vec<EdgeId>, HashMap<NodeId, usize>) {
    let mut local: HashMap<NodeId, usize> = HashMap::new();
    let mut ledges = Vec::with_capacity(block.edges.len());
    let mut arena = Vec::with_capacity(block.edges.len());
    for &e in &block.edges {
        let (s, t) = graph.endpoints(e);
        let next = local.len();
        let ls = *local.entry(s).or_insert(next);
        let next = local.len();
        let lt = *local.entry(t).or_insert(next);
        ledges.push((ls, lt));
        arena.push(e);
    }
    (local.len(), ledges, arena, local)
}

/// Routes one original edge through the block-cut structure, statically
/// rebuilding each block's SPQR-tree. Returns the arena edges to cross.
fn route_static(
    rep: &PlanRep,
    orig: usize,
    options: &InsertionOptions,
) -> Result<Vec<EdgeId>, InsertError> {
    let (u, v) = rep.orig_edges[orig];
    let (un, vn) = (rep.nodes[u], rep.nodes[v]);
    let forest = get_block_cut_forest(&rep.graph);
    let Some(path) = forest.block_path(&rep.graph, un, vn) else {
        return Ok(Vec::new());
    };

    let mut crossed = Vec::new();
    for step in path {
        let block = &forest.blocks[step.block];
        if block.edges.len() <= 2 {
            continue;
        }
        let (ln, ledges, arena, local) = localize(&rep.graph, block);
        let tree = SpqrTree::new(ln, &ledges);
        if tree.split.components.is_empty() {
            continue;
        }
        let section = route_through_tree(
            &TreeRef::Static(&tree),
            local[&step.from],
            local[&step.to],
            &|leid| {
                let o = rep.orig_of(arena[leid])?;
                options.crossing_cost(o)
            },
        )
        .ok_or(InsertError::NoRoute)?;
        crossed.extend(section.into_iter().map(|leid| arena[leid]));
    }
    Ok(crossed)
}

/// One complete insertion with the static router.
fn insert_one_static(
    rep: &mut PlanRep,
    orig: usize,
    options: &InsertionOptions,
) -> Result<usize, InsertError> {
    let (u, v) = rep.orig_edges[orig];
    if u == v {
        rep.insert_direct(orig).map_err(|_| InsertError::Arena)?;
        return Ok(0);
    }
    let crossed = route_static(rep, orig, options)?;
    let report = rep
        .insert_chain(orig, &crossed)
        .map_err(|_| InsertError::Arena)?;
    Ok(report.dummies.len())
}

/// One insertion with the dynamic router; reuses and updates `cache` when
/// the route stays inside a single already-decomposed block.
fn insert_one_dynamic(
    rep: &mut PlanRep,
    orig: usize,
    options: &InsertionOptions,
    cache: &mut Option<DynCache>,
) -> Result<usize, InsertError> {
    let (u, v) = rep.orig_edges[orig];
    if u == v {
        rep.insert_direct(orig).map_err(|_| InsertError::Arena)?;
        return Ok(0);
    }
    let (un, vn) = (rep.nodes[u], rep.nodes[v]);
    let forest = get_block_cut_forest(&rep.graph);
    let path = forest.block_path(&rep.graph, un, vn);

    let single_block = match &path {
        Some(p) if p.len() == 1 && forest.blocks[p[0].block].edges.len() > 2 => Some(p[0].block),
        _ => None,
    };
    let Some(block_id) = single_block else {
        // multi-block insertions merge blocks; the cached tree dies with them
        *cache = None;
        let crossed = route_static(rep, orig, options)?;
        let report = rep
            .insert_chain(orig, &crossed)
            .map_err(|_| InsertError::Arena)?;
        return Ok(report.dummies.len());
    };

    let block = &forest.blocks[block_id];
    let mut signature: Vec<EdgeId> = block.edges.clone();
    signature.sort();

    let hit = cache
        .as_ref()
        .is_some_and(|c| c.signature == signature);
    if !hit {
        let (ln, ledges, arena, local) = localize(&rep.graph, block);
        let tree = DynamicSpqrTree::new(ln, &ledges);
        let mut arena_of_eid = HashMap::new();
        let mut eid_of_arena = HashMap::new();
        for (leid, &e) in arena.iter().enumerate() {
            arena_of_eid.insert(leid, e);
            eid_of_arena.insert(e, leid);
        }
        *cache = Some(DynCache {
            signature,
            tree,
            next_local: ln,
            local_of_node: local,
            arena_of_eid,
            eid_of_arena,
        });
    } else {
        debug!(block = block_id, "dynamic SPQR cache hit");
    }
    let cache = cache.as_mut().unwrap();

    if cache.tree.live_nodes().is_empty() {
        let crossed: Vec<EdgeId> = Vec::new();
        let report = rep
            .insert_chain(orig, &crossed)
            .map_err(|_| InsertError::Arena)?;
        return Ok(report.dummies.len());
    }

    let crossed_local = route_through_tree(
        &TreeRef::Dynamic(&cache.tree),
        cache.local_of_node[&un],
        cache.local_of_node[&vn],
        &|eid| {
            let o = rep.orig_of(cache.arena_of_eid[&eid])?;
            options.crossing_cost(o)
        },
    )
    .ok_or(InsertError::NoRoute)?;
    let crossed: Vec<EdgeId> = crossed_local
        .iter()
        .map(|eid| cache.arena_of_eid[eid])
        .collect();

    let report = rep
        .insert_chain(orig, &crossed)
        .map_err(|_| InsertError::Arena)?;

    // mirror the splits and the chain into the cached tree
    for (k, &(old, e1, e2)) in report.splits.iter().enumerate() {
        let dyn_old = cache
            .eid_of_arena
            .remove(&old)
            .expect("crossed edge was mapped");
        cache.arena_of_eid.remove(&dyn_old);
        let mid = cache.next_local;
        cache.next_local += 1;
        cache.local_of_node.insert(report.dummies[k], mid);
        let (l1, l2) = cache.tree.split_edge(dyn_old, mid);
        cache.arena_of_eid.insert(l1, e1);
        cache.eid_of_arena.insert(e1, l1);
        cache.arena_of_eid.insert(l2, e2);
        cache.eid_of_arena.insert(e2, l2);
        cache.signature.retain(|&e| e != old);
        cache.signature.push(e1);
        cache.signature.push(e2);
    }
    for &ce in &report.chain {
        let (s, t) = rep.graph.endpoints(ce);
        let leid = cache
            .tree
            .add_edge(cache.local_of_node[&s], cache.local_of_node[&t]);
        cache.arena_of_eid.insert(leid, ce);
        cache.eid_of_arena.insert(ce, leid);
        cache.signature.push(ce);
    }
    cache.signature.sort();

    Ok(report.dummies.len())
}

/// Re-routes a single chain from scratch. The old route stays available to
/// the optimizer, so the fresh route can only be at least as good; the swap
/// is therefore applied unconditionally.
fn improve_one(
    rep: &mut PlanRep,
    orig: usize,
    options: &InsertionOptions,
    cache: &mut Option<DynCache>,
    dynamic: bool,
) -> Result<bool, InsertError> {
    let before = rep.chain_dummies(orig).len();
    if before == 0 {
        return Ok(false);
    }
    rep.remove_chain(orig);
    *cache = None; // chain removal reshapes the block
    let after = if dynamic {
        insert_one_dynamic(rep, orig, options, cache)?
    } else {
        insert_one_static(rep, orig, options)?
    };
    debug_assert!(after <= before, "re-routing must never cost more");
    Ok(after < before)
}

struct Pass<'a> {
    options: &'a InsertionOptions<'a>,
    deadline: Option<Instant>,
    dynamic: bool,
    cache: Option<DynCache>,
    failed: bool,
    errored: bool,
}

impl Pass<'_> {
    fn out_of_time(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    fn insert(&mut self, rep: &mut PlanRep, orig: usize) {
        let outcome = if self.dynamic {
            insert_one_dynamic(rep, orig, self.options, &mut self.cache)
        } else {
            insert_one_static(rep, orig, self.options)
        };
        match outcome {
            Ok(crossings) => {
                debug!(orig, crossings, "edge inserted");
            }
            Err(InsertError::NoRoute) => self.failed = true,
            Err(InsertError::Arena) => self.errored = true,
        }
    }

    fn improve(&mut self, rep: &mut PlanRep, orig: usize) {
        if !rep.is_inserted(orig) {
            return;
        }
        let dynamic = self.dynamic;
        if improve_one(rep, orig, self.options, &mut self.cache, dynamic).is_err() {
            self.errored = true;
        }
    }

    fn improve_batch(&mut self, rep: &mut PlanRep, targets: &[usize]) {
        for &orig in targets {
            if self.errored || self.out_of_time() {
                return;
            }
            self.improve(rep, orig);
        }
    }
}

fn inserted_chains(rep: &PlanRep) -> Vec<usize> {
    (0..rep.orig_edges.len())
        .filter(|&o| rep.is_inserted(o))
        .collect()
}

fn most_crossed(rep: &PlanRep, k: usize) -> Vec<usize> {
    let mut with_count: Vec<(usize, usize)> = inserted_chains(rep)
        .into_iter()
        .map(|o| (rep.chain_dummies(o).len(), o))
        .filter(|&(c, _)| c > 0)
        .collect();
    with_count.sort_unstable_by(|a, b| b.cmp(a));
    with_count.into_iter().take(k).map(|(_, o)| o).collect()
}

fn run_insertion(
    rep: &mut PlanRep,
    orig_edges: &[usize],
    options: &InsertionOptions,
    dynamic: bool,
) -> ReturnType {
    let mut pass = Pass {
        options,
        deadline: options.time_limit.map(|d| Instant::now() + d),
        dynamic,
        cache: None,
        failed: false,
        errored: false,
    };

    let mut done: Vec<usize> = Vec::new();
    for &orig in orig_edges {
        if pass.out_of_time() {
            return if pass.failed {
                ReturnType::TimeoutInfeasible
            } else {
                ReturnType::TimeoutFeasible
            };
        }
        pass.insert(rep, orig);
        if pass.errored {
            return ReturnType::Error;
        }
        if rep.is_inserted(orig) {
            done.push(orig);
        }
        match options.postprocessing() {
            Postprocessing::Incremental => {
                let all = inserted_chains(rep);
                pass.improve_batch(rep, &all);
            }
            Postprocessing::IncInserted => {
                let so_far = done.clone();
                pass.improve_batch(rep, &so_far);
            }
            _ => {}
        }
        if pass.errored {
            return ReturnType::Error;
        }
    }

    match options.postprocessing() {
        Postprocessing::Inserted => pass.improve_batch(rep, &done),
        Postprocessing::MostCrossed(k) => {
            let targets = most_crossed(rep, k);
            pass.improve_batch(rep, &targets);
        }
        Postprocessing::All => {
            let all = inserted_chains(rep);
            pass.improve_batch(rep, &all);
        }
        _ => {}
    }
    if pass.errored {
        return ReturnType::Error;
    }
    if pass.out_of_time() {
        return if pass.failed {
            ReturnType::TimeoutInfeasible
        } else {
            ReturnType::TimeoutFeasible
        };
    }
    if pass.failed {
        ReturnType::NoFeasibleSolution
    } else if orig_edges.len() == 1 && options.postprocessing() == Postprocessing::None {
        // a lone edge gets the provably minimum number of crossings
        ReturnType::Optimal
    } else {
        ReturnType::Feasible
    }
}

impl EdgeInsertionStrategy for VariableEmbeddingInserter {
    fn call(
        &self,
        rep: &mut PlanRep,
        orig_edges: &[usize],
        options: &InsertionOptions,
    ) -> ReturnType {
        run_insertion(rep, orig_edges, options, false)
    }
}

impl EdgeInsertionStrategy for VariableEmbeddingInserterDyn {
    fn call(
        &self,
        rep: &mut PlanRep,
        orig_edges: &[usize],
        options: &InsertionOptions,
    ) -> ReturnType {
        run_insertion(rep, orig_edges, options, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EdgeLabel;
    use crate::UnGraph;
    use crate::embedding::Embedding;
    use crate::planarity::planar_embed;
    use crate::testing::grids::{generate_grid_graph, grid_insertion_crossings};
    use crate::testing::random_graphs::random_planar_plus_k;
    use petgraph::graph::NodeIndex;
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    /// Representation plus the indices of the extra edges to insert.
    fn setup(pg: &UnGraph, extra: &[(usize, usize)]) -> (PlanRep, Vec<usize>) {
        let mut full = pg.clone();
        for &(u, v) in extra {
            full.add_edge(NodeIndex::new(u), NodeIndex::new(v), EdgeLabel::Real);
        }
        let mut rep = PlanRep::new(&full);
        for orig in 0..pg.edge_count() {
            rep.insert_direct(orig).unwrap();
        }
        let to_insert: Vec<usize> = (pg.edge_count()..full.edge_count()).collect();
        (rep, to_insert)
    }

    /// Crossings of a single edge routed through one fixed embedding of the
    /// whole graph: the baseline no variable-embedding router may exceed.
    fn naive_fixed_crossings(rep: &PlanRep, u: usize, v: usize) -> usize {
        let mut graph = rep.graph.clone();
        assert!(planar_embed(&mut graph));
        let emb = Embedding::new(&graph);
        let faces = emb.num_faces();
        let source = faces;
        let target = faces + 1;
        let mut adj: Vec<Vec<(usize, u64)>> = vec![Vec::new(); faces + 2];
        for e in graph.edges() {
            let (f1, f2) = emb.faces_of_edge(&graph, e);
            if f1 != f2 {
                adj[f1].push((f2, 1));
                adj[f2].push((f1, 1));
            }
        }
        for f in emb.faces_at(&graph, rep.nodes[u]) {
            adj[source].push((f, 0));
        }
        for f in emb.faces_at(&graph, rep.nodes[v]) {
            adj[f].push((target, 0));
        }
        let mut dist = vec![u64::MAX; faces + 2];
        let mut heap = BinaryHeap::new();
        dist[source] = 0;
        heap.push(Reverse((0u64, source)));
        while let Some(Reverse((d, x))) = heap.pop() {
            if d > dist[x] {
                continue;
            }
            for &(y, w) in &adj[x] {
                if d + w < dist[y] {
                    dist[y] = d + w;
                    heap.push(Reverse((d + w, y)));
                }
            }
        }
        dist[target] as usize
    }

    fn check_result(rep: &mut PlanRep) {
        // crossings equal the dummy count, every dummy has degree 4, and the
        // planarized graph embeds
        for v in rep.graph.nodes() {
            if rep.is_dummy(v) {
                assert_eq!(rep.graph.degree(v), 4);
            }
        }
        assert!(planar_embed(&mut rep.graph), "planarization must stay planar");
    }

    #[test]
    fn test_single_edge_into_grid_is_optimal() {
        for (rows, cols) in [(3, 3), (4, 4), (5, 5)] {
            let pg = generate_grid_graph(rows, cols);
            for (u, v) in [(0, rows * cols - 1), (cols + 1, rows * cols - 2), (1, cols * 2)] {
                if pg.find_edge(NodeIndex::new(u), NodeIndex::new(v)).is_some() {
                    continue;
                }
                for dynamic in [false, true] {
                    let (mut rep, to_insert) = setup(&pg, &[(u, v)]);
                    let options = InsertionOptions::default();
                    let ret = if dynamic {
                        VariableEmbeddingInserterDyn.call(&mut rep, &to_insert, &options)
                    } else {
                        VariableEmbeddingInserter.call(&mut rep, &to_insert, &options)
                    };
                    assert_eq!(ret, ReturnType::Optimal);
                    assert_eq!(
                        rep.crossing_count(),
                        grid_insertion_crossings(rows, cols, u, v),
                        "grid {}x{} edge ({}, {}) dynamic={}",
                        rows,
                        cols,
                        u,
                        v,
                        dynamic
                    );
                    check_result(&mut rep);
                }
            }
        }
    }

    #[test]
    fn test_k5_needs_one_crossing() {
        let mut pg = UnGraph::new_undirected();
        for i in 0..5 {
            pg.add_node(i);
        }
        let mut pairs = Vec::new();
        for i in 0..5 {
            for j in (i + 1)..5 {
                pairs.push((i, j));
            }
        }
        // all but the last edge form a planar graph
        for &(u, v) in &pairs[..9] {
            pg.add_edge(NodeIndex::new(u), NodeIndex::new(v), EdgeLabel::Real);
        }
        let (mut rep, to_insert) = setup(&pg, &pairs[9..]);
        let ret = VariableEmbeddingInserter.call(&mut rep, &to_insert, &InsertionOptions::default());
        assert_eq!(ret, ReturnType::Optimal);
        assert_eq!(rep.crossing_count(), 1);
        check_result(&mut rep);
    }

    #[test]
    fn test_idempotence_with_none_postprocessing() {
        for seed in 0..10 {
            let (pg, extra) = random_planar_plus_k(8, 30, 3, seed);
            if extra.is_empty() {
                continue;
            }
            let run = || {
                let (mut rep, to_insert) = setup(&pg, &extra);
                let ret = VariableEmbeddingInserter.call(
                    &mut rep,
                    &to_insert,
                    &InsertionOptions::default(),
                );
                assert!(ret.is_feasible());
                (rep.crossing_count(), rep.crossing_structure())
            };
            let (c1, s1) = run();
            let (c2, s2) = run();
            assert_eq!(c1, c2);
            assert_eq!(s1, s2);
        }
    }

    #[test]
    fn test_static_and_dynamic_agree_on_crossing_counts() {
        for seed in 0..25 {
            let (pg, extra) = random_planar_plus_k(7 + seed % 4, 30, 1 + seed % 3, seed);
            if extra.is_empty() {
                continue;
            }
            let (mut rep_s, to_insert) = setup(&pg, &extra);
            let ret_s =
                VariableEmbeddingInserter.call(&mut rep_s, &to_insert, &InsertionOptions::default());
            let (mut rep_d, to_insert_d) = setup(&pg, &extra);
            let ret_d = VariableEmbeddingInserterDyn.call(
                &mut rep_d,
                &to_insert_d,
                &InsertionOptions::default(),
            );
            assert_eq!(ret_s, ret_d, "seed {}", seed);
            assert_eq!(
                rep_s.crossing_count(),
                rep_d.crossing_count(),
                "seed {} extra {:?}",
                seed,
                extra
            );
            check_result(&mut rep_s);
            check_result(&mut rep_d);
        }
    }

    #[test]
    fn test_single_edge_never_beats_the_smart_router() {
        for seed in 0..20 {
            let (pg, extra) = random_planar_plus_k(9, 40, 1, seed);
            if extra.is_empty() {
                continue;
            }
            let (u, v) = extra[0];
            let (mut rep, to_insert) = setup(&pg, &extra);
            let baseline = naive_fixed_crossings(&rep, u, v);
            let ret =
                VariableEmbeddingInserter.call(&mut rep, &to_insert, &InsertionOptions::default());
            assert!(ret.is_feasible());
            assert!(
                rep.crossing_count() <= baseline,
                "seed {}: smart {} > fixed-embedding {}",
                seed,
                rep.crossing_count(),
                baseline
            );
        }
    }

    #[test]
    fn test_postprocessing_never_increases_crossings() {
        for seed in 0..12 {
            let (pg, extra) = random_planar_plus_k(8, 30, 3, seed);
            if extra.len() < 2 {
                continue;
            }
            let baseline = {
                let (mut rep, to_insert) = setup(&pg, &extra);
                VariableEmbeddingInserter.call(&mut rep, &to_insert, &InsertionOptions::default());
                rep.crossing_count()
            };
            for post in [
                Postprocessing::Inserted,
                Postprocessing::MostCrossed(2),
                Postprocessing::All,
                Postprocessing::Incremental,
                Postprocessing::IncInserted,
            ] {
                let (mut rep, to_insert) = setup(&pg, &extra);
                let options = InsertionOptions {
                    postprocessing: Some(post),
                    ..Default::default()
                };
                let ret = VariableEmbeddingInserter.call(&mut rep, &to_insert, &options);
                assert!(ret.is_feasible());
                assert!(
                    rep.crossing_count() <= baseline,
                    "{:?} raised crossings (seed {})",
                    post,
                    seed
                );
                check_result(&mut rep);
            }
        }
    }

    #[test]
    fn test_forbidden_edges_give_no_feasible_solution() {
        let pg = generate_grid_graph(5, 5);
        let (mut rep, to_insert) = setup(&pg, &[(12, 0)]);
        let forbidden = vec![true; rep.orig_edges.len()];
        let options = InsertionOptions {
            forbidden: Some(&forbidden),
            ..Default::default()
        };
        let ret = VariableEmbeddingInserter.call(&mut rep, &to_insert, &options);
        assert_eq!(ret, ReturnType::NoFeasibleSolution);
        assert!(!rep.is_inserted(to_insert[0]));
        assert_eq!(rep.crossing_count(), 0);
    }

    #[test]
    fn test_zero_time_limit_reports_timeout() {
        let pg = generate_grid_graph(4, 4);
        let (mut rep, to_insert) = setup(&pg, &[(0, 15)]);
        let options = InsertionOptions {
            time_limit: Some(Duration::ZERO),
            ..Default::default()
        };
        let ret = VariableEmbeddingInserter.call(&mut rep, &to_insert, &options);
        assert_eq!(ret, ReturnType::TimeoutFeasible);
        assert!(!rep.is_inserted(to_insert[0]));
    }

    #[test]
    fn test_costs_reroute_around_expensive_chains() {
        // inserting into the 5x5 grid center with one direction priced out
        let pg = generate_grid_graph(5, 5);
        let (mut rep, to_insert) = setup(&pg, &[(12, 0)]);
        let mut costs = vec![1u64; rep.orig_edges.len()];
        // uniform costs reproduce the unit-cost optimum
        let options = InsertionOptions {
            costs: Some(&costs),
            ..Default::default()
        };
        let ret = VariableEmbeddingInserter.call(&mut rep, &to_insert, &options);
        assert!(ret.is_feasible());
        assert_eq!(rep.crossing_count(), 2);

        // pricing everything at 10 keeps the same route structure
        costs.iter_mut().for_each(|c| *c = 10);
        let (mut rep2, to_insert2) = setup(&pg, &[(12, 0)]);
        let options = InsertionOptions {
            costs: Some(&costs),
            ..Default::default()
        };
        let ret = VariableEmbeddingInserter.call(&mut rep2, &to_insert2, &options);
        assert!(ret.is_feasible());
        assert_eq!(rep2.crossing_count(), 2);
    }

    #[test]
    fn test_multi_block_insertion_adds_per_block_optima() {
        // two 5x5 grids joined by a bridge between corners: inserting
        // center-to-center routes through both blocks; each block
        // contributes its own center-to-corner optimum of two crossings
        let mut pg = generate_grid_graph(5, 5);
        let base = pg.node_count();
        let second = generate_grid_graph(5, 5);
        for i in 0..second.node_count() {
            pg.add_node((base + i) as u32);
        }
        use petgraph::visit::EdgeRef;
        for e in second.edge_references() {
            pg.add_edge(
                NodeIndex::new(base + e.source().index()),
                NodeIndex::new(base + e.target().index()),
                EdgeLabel::Real,
            );
        }
        pg.add_edge(NodeIndex::new(24), NodeIndex::new(base), EdgeLabel::Real);

        for dynamic in [false, true] {
            let (mut rep, to_insert) = setup(&pg, &[(12, base + 12)]);
            let options = InsertionOptions::default();
            let ret = if dynamic {
                VariableEmbeddingInserterDyn.call(&mut rep, &to_insert, &options)
            } else {
                VariableEmbeddingInserter.call(&mut rep, &to_insert, &options)
            };
            assert!(ret.is_feasible());
            assert_eq!(
                rep.crossing_count(),
                grid_insertion_crossings(5, 5, 12, 24) + grid_insertion_crossings(5, 5, 12, 0),
                "dynamic={}",
                dynamic
            );
            check_result(&mut rep);
        }
    }
}
