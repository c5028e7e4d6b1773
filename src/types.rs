/// Enum representing the type of edge in a graph.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EdgeLabel {
    Real,
    Virtual,
}

impl std::fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeLabel::Real => write!(f, "Real"),
            EdgeLabel::Virtual => write!(f, "Virtual"),
        }
    }
}

/// Wrapper for petgraph's undirected graph type.
pub type UnGraph = petgraph::graph::UnGraph<u32, EdgeLabel>;

/// Wrapper for petgraph's directed graph type.
pub type DiGraph = petgraph::graph::DiGraph<u32, EdgeLabel>;

/// Outcome reported by every public planarization entry point.
///
/// Ordinary negative outcomes (no solution, ran out of time) are values of
/// this enum, never panics. Callers must check it before trusting any output
/// parameter.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReturnType {
    /// A solution was found, with no optimality claim.
    Feasible,
    /// A provably optimal solution was found.
    Optimal,
    /// No solution exists under the given constraints.
    NoFeasibleSolution,
    /// The time limit expired; the partial solution computed so far is valid.
    TimeoutFeasible,
    /// The time limit expired before any solution was found.
    TimeoutInfeasible,
    /// The computation failed (e.g. arena exhaustion).
    Error,
}

impl ReturnType {
    /// True if the output of the call carries a usable (possibly partial) solution.
    pub fn is_feasible(self) -> bool {
        matches!(
            self,
            ReturnType::Feasible | ReturnType::Optimal | ReturnType::TimeoutFeasible
        )
    }
}

impl std::fmt::Display for ReturnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReturnType::Feasible => "Feasible",
            ReturnType::Optimal => "Optimal",
            ReturnType::NoFeasibleSolution => "NoFeasibleSolution",
            ReturnType::TimeoutFeasible => "TimeoutFeasible",
            ReturnType::TimeoutInfeasible => "TimeoutInfeasible",
            ReturnType::Error => "Error",
        };
        write!(f, "{}", s)
    }
}
