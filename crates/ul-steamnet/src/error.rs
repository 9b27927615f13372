//! Error types for the steam network model.

use thiserror::Error;
use ul_core::UlError;
use ul_fluids::FluidError;
use ul_graph::GraphError;
use ul_solver::SolverError;

pub type SteamNetResult<T> = Result<T, SteamNetError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SteamNetError {
    #[error("Invalid parameter {field}: {reason}")]
    Params { field: &'static str, reason: String },

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Topology error: {0}")]
    Graph(#[from] GraphError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    /// Retry budget exhausted without a converged solve.
    #[error("Steam network did not converge after {attempts} attempt(s): {last_reason}")]
    SolveFailure { attempts: usize, last_reason: String },

    /// Set-point update on a converged network did not converge. The previous
    /// state is still valid.
    #[error("Recalculation failed: {reason}")]
    RecalculationFailed { reason: String },

    #[error("Invalid result for {what}: {value}")]
    InvalidResult { what: &'static str, value: f64 },

    #[error(transparent)]
    Core(#[from] UlError),
}

impl From<SteamNetError> for UlError {
    fn from(err: SteamNetError) -> Self {
        match err {
            SteamNetError::Core(e) => e,
            SteamNetError::Fluid(e) => e.into(),
            SteamNetError::Graph(e) => e.into(),
            SteamNetError::Solver(e) => e.into(),
            SteamNetError::Params { field, .. } => UlError::InvalidArg { what: field },
            SteamNetError::InvalidResult { what, value } => UlError::NonFinite { what, value },
            SteamNetError::SolveFailure { .. } | SteamNetError::RecalculationFailed { .. } => {
                UlError::Invariant {
                    what: "steam network convergence",
                }
            }
        }
    }
}
