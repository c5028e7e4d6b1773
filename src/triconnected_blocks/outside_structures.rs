/// Kind of a split/triconnected component.
///
/// - `P`: bond (two vertices, three or more edges)
/// - `S`: polygon (simple cycle)
/// - `R`: rigid, i.e. triconnected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitKind {
    P,
    S,
    R,
}

impl std::fmt::Display for SplitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitKind::P => write!(f, "P"),
            SplitKind::S => write!(f, "S"),
            SplitKind::R => write!(f, "R"),
        }
    }
}

/// One component under construction. The kind is fixed late: a component
/// assembled by the search is a polygon exactly when it has three edges.
#[derive(Debug, Clone)]
pub struct Component {
    pub edges: Vec<usize>,
    pub kind: Option<SplitKind>,
}

impl Component {
    pub fn new(kind: Option<SplitKind>) -> Self {
        Component {
            edges: Vec::new(),
            kind,
        }
    }

    pub fn push_edge(
        &mut self,
        eid: usize,
        state: &mut crate::triconnected_blocks::state::DfsState,
        keep_alive: bool,
    ) -> &mut Self {
        self.edges.push(eid);
        if !keep_alive {
            state.kill_edge(eid);
        }
        self
    }

    pub fn commit(&mut self, split_components: &mut Vec<Component>) {
        if self.kind.is_none() {
            self.kind = Some(if self.edges.len() >= 4 {
                SplitKind::R
            } else {
                SplitKind::S
            });
        }
        split_components.push(self.clone());
    }
}

/// Split components of a biconnected multigraph.
///
/// `edges` lists every edge the search saw, including the virtual edges it
/// created; `is_virtual[eid]` distinguishes them from edges of the input
/// graph (which keep their input indices). Each virtual edge appears in
/// exactly two components, gluing them into the component tree.
#[derive(Debug, Clone)]
pub struct SplitComponents {
    pub components: Vec<Component>,
    pub edges: Vec<(usize, usize)>,
    pub is_virtual: Vec<bool>,
}
