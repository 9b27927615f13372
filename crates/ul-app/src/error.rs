//! Error types for the ul-app service layer.

use std::path::PathBuf;

use ul_export::ExportError;
use ul_lca::LcaError;
use ul_steamnet::SteamNetError;

use crate::model::Stage;

/// Application error type wrapping the backend crates' errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Steam network error: {0}")]
    SteamNet(#[from] SteamNetError),

    #[error("Allocation error: {0}")]
    Lca(#[from] LcaError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Scenario error: {0}")]
    Project(String),

    #[error("Failed to read score table: {path}")]
    ScoreTable { path: PathBuf, source: LcaError },

    /// The operation needs a later lifecycle stage.
    #[error("Cannot {operation} while {stage}")]
    NotReady {
        operation: &'static str,
        stage: Stage,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for ul-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ul_project::ProjectError> for AppError {
    fn from(err: ul_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl AppError {
    /// Convergence failed after every retry.
    pub fn is_solve_failure(&self) -> bool {
        matches!(self, AppError::SteamNet(SteamNetError::SolveFailure { .. }))
    }

    /// Missing dataset linkage or functional unit.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AppError::Lca(LcaError::Configuration(_)))
            || matches!(self, AppError::Export(ExportError::Lca(LcaError::Configuration(_))))
    }
}
