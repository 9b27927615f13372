//! Network solver collaborator interface.

use ul_graph::Topology;

use crate::error::SolverResult;
use crate::solution::Solution;

/// How set-points are interpreted by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolveMode {
    /// Set-points are targets; geometry is sized to meet them.
    #[default]
    Design,
    /// Geometry is fixed; set-points are boundary conditions.
    OffDesign,
}

/// Converges a topology's mass and energy balances.
///
/// Implementations own whatever numerical machinery they need. The rest of
/// the workspace only sees the returned [`Solution`]. A non-converged solve
/// is reported with `Solution::converged == false`; `Err` is reserved for
/// problems the solver could not even set up.
pub trait NetworkSolver {
    fn name(&self) -> &str {
        "network"
    }

    fn solve(&mut self, topology: &Topology, mode: SolveMode) -> SolverResult<Solution>;
}

impl<S: NetworkSolver + ?Sized> NetworkSolver for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&mut self, topology: &Topology, mode: SolveMode) -> SolverResult<Solution> {
        (**self).solve(topology, mode)
    }
}
