//! ul-solver: the physical solver seam.
//!
//! The workspace never converges mass/energy balances itself. It hands a
//! validated [`ul_graph::Topology`] to a [`NetworkSolver`] and reads named
//! connection states back from the returned [`Solution`].

pub mod error;
pub mod scripted;
pub mod solution;
pub mod solver;

pub use error::{SolverError, SolverResult};
pub use scripted::{ScriptedSolver, Step};
pub use solution::{ConnectionState, Solution, VaporQuality};
pub use solver::{NetworkSolver, SolveMode};
