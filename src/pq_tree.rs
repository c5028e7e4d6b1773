use std::hash::Hash;

use hashbrown::{HashMap, HashSet};
use thiserror::Error;

use crate::pq_blocks::node::{PqNode, PqNodeKind};
use crate::pq_blocks::templates::process;

/// Construction/replacement errors of a PQ-tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PqTreeError {
    #[error("a PQ-tree needs at least one leaf")]
    EmptyLeafSet,
    #[error("duplicate leaf key")]
    DuplicateLeaf,
    #[error("replacement requires a preceding successful reduction")]
    NoPertinentSubtree,
}

/// PQ-tree over a universe of leaf keys.
///
/// Represents the set of circular/linear leaf orderings consistent with the
/// containment constraints applied so far: P-node children may be permuted
/// freely, Q-node children only reversed as a whole. Each [`reduce`]
/// (`PqTree::reduce`) narrows the set by one "these leaves are consecutive"
/// constraint via the Booth-Lueker template catalogue; a failed reduction
/// poisons the tree, signalling that the constraints are unsatisfiable
/// (non-planarity, in the classic use).
#[derive(Debug, Clone)]
pub struct PqTree<T: Eq + Hash + Clone> {
    nodes: Vec<PqNode<T>>,
    root: usize,
    leaves: HashMap<T, usize>,
    poisoned: bool,
    last_reduced: Option<Vec<T>>,
}

impl<T: Eq + Hash + Clone> PqTree<T> {
    pub fn from_leaves(keys: &[T]) -> Result<Self, PqTreeError> {
        if keys.is_empty() {
            return Err(PqTreeError::EmptyLeafSet);
        }
        let mut nodes = Vec::with_capacity(keys.len() + 1);
        let mut leaves = HashMap::new();
        let mut children = Vec::with_capacity(keys.len());
        for key in keys {
            if leaves.contains_key(key) {
                return Err(PqTreeError::DuplicateLeaf);
            }
            nodes.push(PqNode::leaf(key.clone()));
            leaves.insert(key.clone(), nodes.len() - 1);
            children.push(nodes.len() - 1);
        }
        nodes.push(PqNode::internal(PqNodeKind::P, children));
        let root = nodes.len() - 1;
        let mut tree = PqTree {
            nodes,
            root,
            leaves,
            poisoned: false,
            last_reduced: None,
        };
        tree.normalize();
        Ok(tree)
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Applies one constraint: the given leaves must end up consecutive.
    /// Returns false (and poisons the tree) when that is inconsistent with
    /// the constraints applied before. Reducing with keys outside the
    /// universe is a contract violation.
    pub fn reduce(&mut self, s: &[T]) -> bool {
        if self.poisoned {
            return false;
        }
        debug_assert!(
            s.iter().all(|k| self.leaves.contains_key(k)),
            "reduce with a leaf outside the universe"
        );
        let keys: Vec<T> = s
            .iter()
            .filter(|k| self.leaves.contains_key(*k))
            .cloned()
            .collect();
        if keys.is_empty() {
            return true;
        }

        let (counts, _totals) = self.count(&keys);
        let pertinent = self.pertinent_root(&counts, keys.len());
        let ok = process(&mut self.nodes, &counts, pertinent, true).is_some();
        if ok {
            self.last_reduced = Some(keys);
        } else {
            self.poisoned = true;
            self.last_reduced = None;
        }
        ok
    }

    /// Swaps the pertinent (full) part of the last successful reduction for
    /// a fresh set of leaves; with an empty set the pertinent part just
    /// disappears. Direction indicators inside the replaced part survive,
    /// moved next to the replacement.
    pub fn replace_pertinent_by_new_leaves(&mut self, new: &[T]) -> Result<(), PqTreeError> {
        let reduced = self
            .last_reduced
            .take()
            .ok_or(PqTreeError::NoPertinentSubtree)?;
        for key in new {
            if self.leaves.contains_key(key) {
                return Err(PqTreeError::DuplicateLeaf);
            }
        }

        let (counts, totals) = self.count(&reduced);
        let full = |x: usize, counts: &[usize], totals: &[usize]| -> bool {
            totals[x] > 0 && counts[x] == totals[x]
        };

        // rescue indicators buried in the full region before dropping it
        let pertinent = self.pertinent_root(&counts, reduced.len());
        let replacement = self.build_replacement(new);

        if full(pertinent, &counts, &totals) {
            let mut rescued = Vec::new();
            self.collect_indicators(pertinent, &mut rescued);
            self.kill_subtree(pertinent);
            let mut seq = rescued;
            if let Some(r) = replacement {
                seq.push(r);
            }
            if pertinent == self.root {
                self.replace_root(seq);
            } else {
                let host = self
                    .parent_of(pertinent)
                    .expect("non-root pertinent node has a parent");
                let at = self.nodes[host]
                    .children
                    .iter()
                    .position(|&c| c == pertinent)
                    .unwrap();
                self.nodes[host].children.splice(at..=at, seq);
            }
        } else {
            // the maximal full subtrees are consecutive children of one host
            let host = self
                .find_full_host(&counts, &totals)
                .expect("pertinent region exists after a successful reduce");
            let children = self.nodes[host].children.clone();
            let mut first = None;
            let mut kept = Vec::new();
            let mut rescued = Vec::new();
            for (i, &c) in children.iter().enumerate() {
                if full(c, &counts, &totals) {
                    first.get_or_insert(i);
                    self.collect_indicators(c, &mut rescued);
                    self.kill_subtree(c);
                } else {
                    kept.push(c);
                }
            }
            let at = first.expect("host has a full child");
            // indicators within the span stay put, right before the new node
            let mut insert = rescued;
            if let Some(r) = replacement {
                insert.push(r);
            }
            // `at` counts removed children too; clamp into the kept list
            let at = at.min(kept.len());
            let mut seq = kept;
            seq.splice(at..at, insert);
            self.nodes[host].children = seq;
        }

        for key in &reduced {
            self.leaves.remove(key);
        }
        self.normalize();
        Ok(())
    }

    /// Leaf keys left to right. Indicators are not part of the frontier.
    pub fn frontier(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.leaves.len());
        self.frontier_rec(self.root, &mut out);
        out
    }

    /// Drops a direction indicator right before the pertinent region of the
    /// last successful reduction. The indicator is transparent to future
    /// reductions and survives replacements until [`remove_indicators`]
    /// (`PqTree::remove_indicators`).
    pub fn insert_indicator(&mut self, key: T) -> Result<(), PqTreeError> {
        let reduced = self
            .last_reduced
            .clone()
            .ok_or(PqTreeError::NoPertinentSubtree)?;
        let (counts, totals) = self.count(&reduced);
        let pertinent = self.pertinent_root(&counts, reduced.len());
        self.nodes.push(PqNode::indicator(key));
        let ind = self.nodes.len() - 1;

        if totals[pertinent] > 0 && counts[pertinent] == totals[pertinent] {
            if pertinent == self.root {
                if self.nodes[self.root].is_leaf() {
                    let old = self.root;
                    self.nodes
                        .push(PqNode::internal(PqNodeKind::P, vec![ind, old]));
                    self.root = self.nodes.len() - 1;
                } else {
                    self.nodes[self.root].children.insert(0, ind);
                }
            } else {
                let host = self.parent_of(pertinent).unwrap();
                let at = self.nodes[host]
                    .children
                    .iter()
                    .position(|&c| c == pertinent)
                    .unwrap();
                self.nodes[host].children.insert(at, ind);
            }
        } else {
            let host = self
                .find_full_host(&counts, &totals)
                .ok_or(PqTreeError::NoPertinentSubtree)?;
            let at = self.nodes[host]
                .children
                .iter()
                .position(|&c| totals[c] > 0 && counts[c] == totals[c])
                .unwrap();
            self.nodes[host].children.insert(at, ind);
        }
        Ok(())
    }

    /// Explicit teardown of all direction indicators, with their remembered
    /// orientations.
    pub fn remove_indicators(&mut self) -> Vec<(T, bool)> {
        let mut out = Vec::new();
        self.strip_indicators_rec(self.root, &mut out);
        self.normalize();
        out
    }

    // internal helpers

    fn build_replacement(&mut self, new: &[T]) -> Option<usize> {
        match new.len() {
            0 => None,
            1 => {
                self.nodes.push(PqNode::leaf(new[0].clone()));
                let id = self.nodes.len() - 1;
                self.leaves.insert(new[0].clone(), id);
                Some(id)
            }
            _ => {
                let mut children = Vec::with_capacity(new.len());
                for key in new {
                    self.nodes.push(PqNode::leaf(key.clone()));
                    children.push(self.nodes.len() - 1);
                    self.leaves.insert(key.clone(), self.nodes.len() - 1);
                }
                self.nodes.push(PqNode::internal(PqNodeKind::P, children));
                Some(self.nodes.len() - 1)
            }
        }
    }

    fn replace_root(&mut self, seq: Vec<usize>) {
        match seq.len() {
            0 => {
                // empty universe; keep a husk P root
                self.nodes.push(PqNode::internal(PqNodeKind::P, Vec::new()));
                self.root = self.nodes.len() - 1;
            }
            1 => self.root = seq[0],
            _ => {
                self.nodes.push(PqNode::internal(PqNodeKind::P, seq));
                self.root = self.nodes.len() - 1;
            }
        }
    }

    /// Pertinent leaf count and key-leaf total per node (post-order).
    fn count(&self, keys: &[T]) -> (Vec<usize>, Vec<usize>) {
        let marked: HashSet<usize> = keys.iter().map(|k| self.leaves[k]).collect();
        let mut counts = vec![0usize; self.nodes.len()];
        let mut totals = vec![0usize; self.nodes.len()];
        self.count_rec(self.root, &marked, &mut counts, &mut totals);
        (counts, totals)
    }

    fn count_rec(
        &self,
        x: usize,
        marked: &HashSet<usize>,
        counts: &mut [usize],
        totals: &mut [usize],
    ) {
        if self.nodes[x].is_leaf() {
            totals[x] = 1;
            counts[x] = usize::from(marked.contains(&x));
            return;
        }
        let children = &self.nodes[x].children;
        for &c in children {
            self.count_rec(c, marked, counts, totals);
            counts[x] += counts[c];
            totals[x] += totals[c];
        }
    }

    /// Deepest node whose subtree holds every pertinent leaf.
    fn pertinent_root(&self, counts: &[usize], total: usize) -> usize {
        let mut x = self.root;
        'descend: loop {
            if self.nodes[x].is_leaf() {
                return x;
            }
            for &c in &self.nodes[x].children {
                if counts[c] == total {
                    x = c;
                    continue 'descend;
                }
            }
            return x;
        }
    }

    fn parent_of(&self, target: usize) -> Option<usize> {
        self.parent_rec(self.root, target)
    }

    fn parent_rec(&self, x: usize, target: usize) -> Option<usize> {
        for &c in &self.nodes[x].children {
            if c == target {
                return Some(x);
            }
            if let Some(p) = self.parent_rec(c, target) {
                return Some(p);
            }
        }
        None
    }

    /// The unique node with an all-full child (the maximal full subtrees are
    /// consecutive children of it after a successful reduce).
    fn find_full_host(&self, counts: &[usize], totals: &[usize]) -> Option<usize> {
        self.find_full_host_rec(self.root, counts, totals)
    }

    fn find_full_host_rec(&self, x: usize, counts: &[usize], totals: &[usize]) -> Option<usize> {
        for &c in &self.nodes[x].children {
            if totals[c] > 0 && counts[c] == totals[c] {
                return Some(x);
            }
            if counts[c] > 0 {
                if let Some(h) = self.find_full_host_rec(c, counts, totals) {
                    return Some(h);
                }
            }
        }
        None
    }

    fn collect_indicators(&mut self, x: usize, out: &mut Vec<usize>) {
        if self.nodes[x].is_indicator() {
            out.push(x);
            return;
        }
        let children = self.nodes[x].children.clone();
        for c in children {
            self.collect_indicators(c, out);
        }
        // detach survivors so kill_subtree will not reap them
        self.nodes[x].children.retain(|c| !out.contains(c));
    }

    fn kill_subtree(&mut self, x: usize) {
        let children = self.nodes[x].children.clone();
        for c in children {
            self.kill_subtree(c);
        }
        if let PqNodeKind::Leaf(key) = &self.nodes[x].kind {
            let key = key.clone();
            self.leaves.remove(&key);
        }
        self.nodes[x].dead = true;
        self.nodes[x].children.clear();
    }

    fn frontier_rec(&self, x: usize, out: &mut Vec<T>) {
        match &self.nodes[x].kind {
            PqNodeKind::Leaf(key) => out.push(key.clone()),
            PqNodeKind::Indicator { .. } => {}
            _ => {
                for &c in &self.nodes[x].children.clone() {
                    self.frontier_rec(c, out);
                }
            }
        }
    }

    fn strip_indicators_rec(&mut self, x: usize, out: &mut Vec<(T, bool)>) {
        let children = self.nodes[x].children.clone();
        for &c in &children {
            if let PqNodeKind::Indicator { key, flipped } = &self.nodes[c].kind {
                out.push((key.clone(), *flipped));
                self.nodes[c].dead = true;
            } else {
                self.strip_indicators_rec(c, out);
            }
        }
        let kept: Vec<usize> = children
            .into_iter()
            .filter(|&c| !self.nodes[c].dead)
            .collect();
        self.nodes[x].children = kept;
    }

    /// Drops dead children and splices single-child internal nodes. Nested
    /// P-in-P / Q-in-Q structures are left alone: they encode different
    /// constraint sets than their flattened forms.
    fn normalize(&mut self) {
        if let Some(new_root) = self.normalize_rec(self.root) {
            self.root = new_root;
        } else {
            self.nodes.push(PqNode::internal(PqNodeKind::P, Vec::new()));
            self.root = self.nodes.len() - 1;
        }
    }

    fn normalize_rec(&mut self, x: usize) -> Option<usize> {
        if self.nodes[x].dead {
            return None;
        }
        if self.nodes[x].is_leaf() || self.nodes[x].is_indicator() {
            return Some(x);
        }
        let children = self.nodes[x].children.clone();
        let mut kept = Vec::with_capacity(children.len());
        for c in children {
            if let Some(k) = self.normalize_rec(c) {
                kept.push(k);
            }
        }
        let real = kept
            .iter()
            .filter(|&&c| !self.nodes[c].is_indicator())
            .count();
        if real == 0 && kept.is_empty() {
            self.nodes[x].dead = true;
            return None;
        }
        if kept.len() == 1 {
            self.nodes[x].dead = true;
            return Some(kept[0]);
        }
        self.nodes[x].children = kept;
        Some(x)
    }
}
