use petgraph::graph::EdgeIndex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::UnGraph;
use crate::graph::Graph;
use crate::planarity::{BoyerMyrvold, Planarity};
use crate::types::ReturnType;

/// Strategy for picking a small edge set whose removal leaves the graph
/// planar.
pub trait PlanarSubgraphStrategy {
    /// Returns the edges to delete. Edges listed in `preferred` are kept in
    /// the subgraph whenever possible; `costs` (per edge index) skews the
    /// selection towards deleting cheap edges.
    fn call(
        &self,
        graph: &UnGraph,
        preferred: &[EdgeIndex],
        costs: Option<&[u64]>,
    ) -> (ReturnType, Vec<EdgeIndex>);
}

/// Randomized multi-start maximal planar subgraph heuristic.
///
/// Each trial copies the graph and repeatedly asks the planarity tester for
/// a Kuratowski subdivision, deleting its cheapest edge until the copy
/// embeds; the cheapest trial by total deleted cost wins. Trial zero runs
/// the deterministic baseline order, later trials re-randomize the DFS, so
/// a fixed seed makes the whole call reproducible.
#[derive(Debug, Clone)]
pub struct MaximalPlanarSubgraph {
    pub runs: usize,
    pub seed: u64,
}

impl Default for MaximalPlanarSubgraph {
    fn default() -> Self {
        MaximalPlanarSubgraph { runs: 8, seed: 0 }
    }
}

/// Single deterministic trial; the cheapest baseline when the randomized
/// search is not worth its cycles.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrivialPlanarSubgraph;

impl MaximalPlanarSubgraph {
    fn trial(
        &self,
        graph: &UnGraph,
        preferred: &[EdgeIndex],
        costs: Option<&[u64]>,
        rng: Option<&mut StdRng>,
    ) -> Vec<EdgeIndex> {
        let mut work = Graph::from_petgraph(graph);
        let tester = BoyerMyrvold::new();
        let mut deleted = Vec::new();
        let mut rng = rng;

        loop {
            let verdict = match rng.as_deref_mut() {
                Some(r) => tester.test_with_rng(&work, r),
                None => tester.test(&work),
            };
            let kuratowskis = match verdict {
                Planarity::Planar(_) => break,
                Planarity::NonPlanar { kuratowskis } => kuratowskis,
            };
            let certificate = &kuratowskis[0];

            // cheapest certificate edge, never a preferred one unless the
            // whole subdivision is preferred
            let price = |eid: usize| -> (bool, u64) {
                let is_preferred = preferred.contains(&EdgeIndex::new(eid));
                (is_preferred, costs.map_or(1, |c| c[eid]))
            };
            let victim = certificate
                .edge_ids
                .iter()
                .copied()
                .min_by_key(|e| price(e.index()))
                .expect("certificates are never empty");

            deleted.push(EdgeIndex::new(victim.index()));
            work.remove_edge(victim);
        }
        deleted
    }

    fn total_cost(deleted: &[EdgeIndex], costs: Option<&[u64]>) -> u64 {
        deleted
            .iter()
            .map(|e| costs.map_or(1, |c| c[e.index()]))
            .sum()
    }
}

impl PlanarSubgraphStrategy for MaximalPlanarSubgraph {
    fn call(
        &self,
        graph: &UnGraph,
        preferred: &[EdgeIndex],
        costs: Option<&[u64]>,
    ) -> (ReturnType, Vec<EdgeIndex>) {
        if crate::planarity::is_planar(graph) {
            return (ReturnType::Optimal, Vec::new());
        }

        let mut best = self.trial(graph, preferred, costs, None);
        let mut best_cost = Self::total_cost(&best, costs);
        debug!(deleted = best.len(), cost = best_cost, "baseline trial");

        let mut rng = StdRng::seed_from_u64(self.seed);
        for run in 1..self.runs {
            let candidate = self.trial(graph, preferred, costs, Some(&mut rng));
            let cost = Self::total_cost(&candidate, costs);
            debug!(run, deleted = candidate.len(), cost, "randomized trial");
            if cost < best_cost {
                best_cost = cost;
                best = candidate;
            }
        }
        (ReturnType::Feasible, best)
    }
}

impl PlanarSubgraphStrategy for TrivialPlanarSubgraph {
    fn call(
        &self,
        graph: &UnGraph,
        preferred: &[EdgeIndex],
        costs: Option<&[u64]>,
    ) -> (ReturnType, Vec<EdgeIndex>) {
        MaximalPlanarSubgraph { runs: 1, seed: 0 }.call(graph, preferred, costs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EdgeLabel;
    use crate::planarity::is_planar;
    use crate::testing::random_graphs::random_graph;
    use petgraph::visit::NodeIndexable;

    fn complete(n: usize) -> UnGraph {
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
    }

    fn remaining(graph: &UnGraph, deleted: &[EdgeIndex]) -> UnGraph {
        let mut g = graph.clone();
        let mut dead: Vec<EdgeIndex> = deleted.to_vec();
        // remove from the back so the smaller indices stay stable
        dead.sort_unstable_by(|a, b| b.cmp(a));
        for e in dead {
            g.remove_edge(e);
        }
        g
    }

    #[test]
    fn test_planar_input_deletes_nothing() {
        let mut g = UnGraph::new_undirected();
        for i in 0..4 {
            g.add_node(i);
        }
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0)] {
            g.add_edge(g.from_index(a), g.from_index(b), EdgeLabel::Real);
        }
        let (ret, deleted) = MaximalPlanarSubgraph::default().call(&g, &[], None);
        assert_eq!(ret, ReturnType::Optimal);
        assert!(deleted.is_empty());
    }

    #[test]
    fn test_k5_and_k33_lose_exactly_one_edge() {
        for g in [complete(5), {
            let mut k33 = UnGraph::new_undirected();
            for i in 0..6 {
                k33.add_node(i);
            }
            for i in 0..3 {
                for j in 3..6 {
                    k33.add_edge(k33.from_index(i), k33.from_index(j), EdgeLabel::Real);
                }
            }
            k33
        }] {
            let (ret, deleted) = MaximalPlanarSubgraph::default().call(&g, &[], None);
            assert_eq!(ret, ReturnType::Feasible);
            assert_eq!(deleted.len(), 1);
            assert!(is_planar(&remaining(&g, &deleted)));
        }
    }

    #[test]
    fn test_k6_skewness_is_reached() {
        // K6 becomes planar after deleting two edges, never one
        let g = complete(6);
        let strategy = MaximalPlanarSubgraph { runs: 12, seed: 5 };
        let (ret, deleted) = strategy.call(&g, &[], None);
        assert_eq!(ret, ReturnType::Feasible);
        assert!(deleted.len() >= 2);
        assert!(deleted.len() <= 3, "heuristic strayed far from skewness 2");
        assert!(is_planar(&remaining(&g, &deleted)));
    }

    #[test]
    fn test_costs_pick_the_cheap_edge() {
        let g = complete(5);
        let mut costs = vec![10u64; g.edge_count()];
        costs[7] = 1;
        let (_, deleted) = MaximalPlanarSubgraph::default().call(&g, &[], Some(&costs));
        assert_eq!(deleted, vec![EdgeIndex::new(7)]);
    }

    #[test]
    fn test_preferred_edges_survive() {
        let g = complete(5);
        // all edges but one are preferred; only the last can go
        let preferred: Vec<EdgeIndex> = (0..9).map(EdgeIndex::new).collect();
        let (_, deleted) = MaximalPlanarSubgraph::default().call(&g, &preferred, None);
        assert_eq!(deleted, vec![EdgeIndex::new(9)]);
    }

    #[test]
    fn test_seeded_runs_are_reproducible_and_leave_planar_graphs() {
        for seed in 0..8 {
            let g = random_graph(8, 22, seed);
            let strategy = MaximalPlanarSubgraph {
                runs: 4,
                seed: seed as u64,
            };
            let (_, d1) = strategy.call(&g, &[], None);
            let (_, d2) = strategy.call(&g, &[], None);
            assert_eq!(d1, d2);
            assert!(is_planar(&remaining(&g, &d1)));
        }
    }
}
