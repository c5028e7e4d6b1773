use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::planarity_blocks::dfs::run_dfs;
use crate::planarity_blocks::embed::Embedder;
use crate::planarity_blocks::structures::BmGraph;

fn planar_subset(n: usize, edges: &[(usize, usize)], keep: &[bool]) -> bool {
    let subset: Vec<(usize, usize)> = edges
        .iter()
        .zip(keep)
        .filter_map(|(&e, &k)| k.then_some(e))
        .collect();
    let g = BmGraph::from_edge_list(n, &subset);
    let order: Vec<usize> = (0..n).collect();
    let data = run_dfs(&g, &order);
    Embedder::new(&g, &data).run().is_some()
}

/// Minimizes a non-planar edge set down to a Kuratowski subdivision using
/// the planarity tester as an oracle: drop each edge in turn and keep the
/// drop whenever the rest stays non-planar. The survivors form a minimal
/// non-planar subgraph, which is a subdivision of K5 or K3,3.
///
/// Works in O(m) planarity calls. Returns indices into `edges`.
pub fn minimize_to_kuratowski(n: usize, edges: &[(usize, usize)], order: &[usize]) -> Vec<usize> {
    debug_assert!(!planar_subset(n, edges, &vec![true; edges.len()]));
    let mut keep = vec![true; edges.len()];
    for &i in order {
        keep[i] = false;
        if planar_subset(n, edges, &keep) {
            keep[i] = true;
        }
    }
    (0..edges.len()).filter(|&i| keep[i]).collect()
}

/// Extracts up to `limit` distinct Kuratowski subdivisions by re-running the
/// minimization under shuffled edge orders. The first round always uses the
/// unshuffled order, so a limit of one is deterministic.
pub fn find_kuratowskis(
    n: usize,
    edges: &[(usize, usize)],
    limit: usize,
    rng: &mut StdRng,
) -> Vec<Vec<usize>> {
    let mut found: Vec<Vec<usize>> = Vec::new();
    let mut order: Vec<usize> = (0..edges.len()).collect();
    let attempts = if limit <= 1 { 1 } else { 3 * limit };
    for round in 0..attempts {
        if found.len() >= limit {
            break;
        }
        if round > 0 {
            order.shuffle(rng);
        }
        let mut subdivision = minimize_to_kuratowski(n, edges, &order);
        subdivision.sort_unstable();
        if !found.contains(&subdivision) {
            found.push(subdivision);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn complete(n: usize) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                edges.push((i, j));
            }
        }
        edges
    }

    #[test]
    fn test_k5_minimizes_to_itself() {
        let edges = complete(5);
        let order: Vec<usize> = (0..edges.len()).collect();
        let sub = minimize_to_kuratowski(5, &edges, &order);
        assert_eq!(sub.len(), 10);
    }

    #[test]
    fn test_k6_certificate_is_a_kuratowski_subdivision() {
        let edges = complete(6);
        let order: Vec<usize> = (0..edges.len()).collect();
        let sub = minimize_to_kuratowski(6, &edges, &order);
        // a subdivision of K5 (10 edges) or K3,3 (9 edges); no subdivision
        // vertices exist inside K6
        assert!(sub.len() == 9 || sub.len() == 10);
        let subset: Vec<(usize, usize)> = sub.iter().map(|&i| edges[i]).collect();
        let g = BmGraph::from_edge_list(6, &subset);
        let ord: Vec<usize> = (0..6).collect();
        let data = run_dfs(&g, &ord);
        assert!(Embedder::new(&g, &data).run().is_none());
    }

    #[test]
    fn test_multiple_distinct_certificates_in_k6() {
        let edges = complete(6);
        let mut rng = StdRng::seed_from_u64(7);
        let found = find_kuratowskis(6, &edges, 4, &mut rng);
        assert!(!found.is_empty());
        // K6 holds many Kuratowski subgraphs; shuffling should surface more
        // than one of them
        assert!(found.len() > 1);
        for sub in &found {
            let subset: Vec<(usize, usize)> = sub.iter().map(|&i| edges[i]).collect();
            let g = BmGraph::from_edge_list(6, &subset);
            let ord: Vec<usize> = (0..6).collect();
            let data = run_dfs(&g, &ord);
            assert!(Embedder::new(&g, &data).run().is_none());
        }
    }
}
