//! Error types for solver operations.

use thiserror::Error;
use ul_core::error::UlError;
use ul_fluids::FluidError;
use ul_graph::GraphError;

/// Errors reported by a network solver or while reading its solution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Invalid state: {what}")]
    InvalidState { what: String },

    #[error("No state for connection '{label}' in solution")]
    MissingState { label: String },

    #[error("No power for connection '{label}' in solution")]
    MissingPower { label: String },

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for UlError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::ProblemSetup { .. } => UlError::InvalidArg {
                what: "problem setup",
            },
            SolverError::ConvergenceFailed { .. } => UlError::InvalidArg {
                what: "convergence",
            },
            SolverError::InvalidState { .. } => UlError::InvalidArg { what: "state" },
            SolverError::MissingState { .. } | SolverError::MissingPower { .. } => {
                UlError::InvalidArg {
                    what: "solution lookup",
                }
            }
            SolverError::Fluid(_) => UlError::InvalidArg { what: "fluid" },
            SolverError::Graph(_) => UlError::InvalidArg { what: "graph" },
        }
    }
}
