use crate::pq_blocks::node::{Label, PqNode, PqNodeKind};

/// Child classification during one template pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Indicator,
    Empty,
    Full,
    Partial,
}

/// Reverses a Q-node in place. Direction indicators sitting directly under
/// it change their remembered orientation.
pub(crate) fn reverse_q<T>(nodes: &mut [PqNode<T>], x: usize) {
    nodes[x].children.reverse();
    let children = nodes[x].children.clone();
    for c in children {
        if let PqNodeKind::Indicator { flipped, .. } = &mut nodes[c].kind {
            *flipped = !*flipped;
        }
    }
}

/// Wraps a set of same-label children into a single node (a fresh P-node, or
/// the child itself if it is alone).
fn group<T>(nodes: &mut Vec<PqNode<T>>, mut members: Vec<usize>) -> Option<usize> {
    match members.len() {
        0 => None,
        1 => Some(members.pop().unwrap()),
        _ => {
            nodes.push(PqNode::internal(PqNodeKind::P, members));
            Some(nodes.len() - 1)
        }
    }
}

/// Applies the matching template to the pertinent node `x`, bottom-up.
///
/// Returns the node's resulting label, or `None` when no template matches
/// (the constraint set is unsatisfiable). A non-root node may come out
/// Empty, Full or singly Partial; the pertinent root allows doubly-partial
/// shapes. After a Partial transformation the node is a Q whose children run
/// empty side to full side.
pub(crate) fn process<T: Clone>(
    nodes: &mut Vec<PqNode<T>>,
    counts: &[usize],
    x: usize,
    is_root: bool,
) -> Option<Label> {
    if nodes[x].is_leaf() {
        return Some(Label::Full);
    }

    let children = nodes[x].children.clone();
    let mut classes = Vec::with_capacity(children.len());
    for &c in &children {
        let class = if nodes[c].is_indicator() {
            Class::Indicator
        } else if counts.get(c).copied().unwrap_or(0) == 0 {
            Class::Empty
        } else {
            match process(nodes, counts, c, false)? {
                Label::Full => Class::Full,
                Label::Partial => Class::Partial,
                Label::Empty => Class::Empty,
            }
        };
        classes.push(class);
    }

    if nodes[x].is_p() {
        process_p(nodes, x, &children, &classes, is_root)
    } else {
        process_q(nodes, x, &classes, is_root)
    }
}

/// Templates P1-P6. Indicators under a P-node stay transparent: they never
/// influence which template matches and end up on the empty side of
/// whatever structure the template builds.
fn process_p<T: Clone>(
    nodes: &mut Vec<PqNode<T>>,
    x: usize,
    children: &[usize],
    classes: &[Class],
    is_root: bool,
) -> Option<Label> {
    let mut inds = Vec::new();
    let mut empties = Vec::new();
    let mut fulls = Vec::new();
    let mut partials = Vec::new();
    for (&c, &class) in children.iter().zip(classes) {
        match class {
            Class::Indicator => inds.push(c),
            Class::Full => fulls.push(c),
            Class::Partial => partials.push(c),
            Class::Empty => empties.push(c),
        }
    }

    match partials.len() {
        0 => {
            if empties.is_empty() {
                // P1: collapses to full as-is
                return Some(Label::Full);
            }
            if fulls.is_empty() {
                return Some(Label::Empty);
            }
            if is_root {
                // P2: gather the full children under one new child
                let f = group(nodes, fulls).unwrap();
                empties.extend(inds);
                empties.push(f);
                nodes[x].children = empties;
                Some(Label::Partial)
            } else {
                // P3: split into a partial Q
                let e = group(nodes, empties).unwrap();
                let f = group(nodes, fulls).unwrap();
                nodes[x].kind = PqNodeKind::Q;
                let mut seq = inds;
                seq.push(e);
                seq.push(f);
                nodes[x].children = seq;
                Some(Label::Partial)
            }
        }
        1 => {
            let q = partials[0];
            if is_root {
                // P4: hang the gathered fulls on the partial child's full end
                if let Some(f) = group(nodes, fulls) {
                    nodes[q].children.push(f);
                }
                empties.extend(inds);
                empties.push(q);
                nodes[x].children = empties;
                Some(Label::Partial)
            } else {
                // P5: absorb everything into one partial Q
                let mut seq = inds;
                if let Some(e) = group(nodes, empties) {
                    seq.push(e);
                }
                seq.extend(nodes[q].children.iter().copied());
                if let Some(f) = group(nodes, fulls) {
                    seq.push(f);
                }
                nodes[q].dead = true;
                nodes[x].kind = PqNodeKind::Q;
                nodes[x].children = seq;
                Some(Label::Partial)
            }
        }
        2 if is_root => {
            // P6: merge the two partial children around the fulls
            let (q1, q2) = (partials[0], partials[1]);
            let mut seq = nodes[q1].children.clone();
            if let Some(f) = group(nodes, fulls) {
                seq.push(f);
            }
            reverse_q(nodes, q2);
            seq.extend(nodes[q2].children.iter().copied());
            nodes[q1].dead = true;
            nodes[q2].dead = true;
            nodes.push(PqNode::internal(PqNodeKind::Q, seq));
            let qm = nodes.len() - 1;
            empties.extend(inds);
            empties.push(qm);
            nodes[x].children = empties;
            Some(Label::Partial)
        }
        _ => None,
    }
}

/// Templates Q1-Q3. Indicators are skipped by the pattern scan and stay
/// where they sit.
fn process_q<T: Clone>(
    nodes: &mut Vec<PqNode<T>>,
    x: usize,
    classes: &[Class],
    is_root: bool,
) -> Option<Label> {
    // stage machine over non-indicator children: empty run, optional partial,
    // full run, then (root only) optional partial and trailing empty run
    let fits = |classes: &[Class], root: bool| -> bool {
        let mut stage = 0; // 0 E*, 1 after first partial / in fulls, 2 after second boundary, in trailing empties
        for &class in classes {
            match class {
                Class::Indicator => {}
                Class::Empty => match stage {
                    0 => {}
                    1 | 2 => {
                        if !root {
                            return false;
                        }
                        stage = 3;
                    }
                    3 => {}
                    _ => return false,
                },
                Class::Full => match stage {
                    0 | 1 => stage = 1,
                    _ => return false,
                },
                Class::Partial => match stage {
                    0 => stage = 1,
                    1 => {
                        if !root {
                            return false;
                        }
                        stage = 2;
                    }
                    _ => return false,
                },
            }
        }
        true
    };

    let all_full = classes
        .iter()
        .all(|&c| matches!(c, Class::Full | Class::Indicator));
    if all_full {
        return Some(Label::Full);
    }

    let mut classes = classes.to_vec();
    if !fits(&classes, is_root) {
        classes.reverse();
        if !fits(&classes, is_root) {
            return None;
        }
        reverse_q(nodes, x);
    }

    // expand partial children in place, oriented so their full side faces
    // the full run of x
    let children = nodes[x].children.clone();
    let mut expanded = Vec::with_capacity(children.len());
    let mut seen_full_or_partial = false;
    for (&c, &class) in children.iter().zip(&classes) {
        match class {
            Class::Partial => {
                if seen_full_or_partial {
                    // right boundary: full side must face left
                    reverse_q(nodes, c);
                }
                seen_full_or_partial = true;
                expanded.extend(nodes[c].children.iter().copied());
                nodes[c].dead = true;
            }
            Class::Full => {
                seen_full_or_partial = true;
                expanded.push(c);
            }
            Class::Empty | Class::Indicator => expanded.push(c),
        }
    }
    nodes[x].children = expanded;
    // the non-root normalization above leaves empties leading, so a partial
    // result already runs empty side to full side
    Some(Label::Partial)
}
