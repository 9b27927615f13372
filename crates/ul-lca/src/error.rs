//! Error types for impact allocation.

use thiserror::Error;

pub type LcaResult<T> = Result<T, LcaError>;

/// Missing linkage or functional-unit setup detected before any impact is
/// computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("No impact categories requested")]
    NoCategories,

    #[error("No functional edge defined")]
    NoFunctionalEdge,

    #[error("Edge '{edge}' is not linked to a background dataset")]
    UnlinkedEdge { edge: String },

    #[error("Edge '{edge}' must have the model on exactly one side")]
    ModelEndpoint { edge: String },

    #[error("Functional edge '{edge}' has a zero or non-finite amount ({amount})")]
    ZeroFunctionalAmount { edge: String, amount: f64 },

    #[error("Edge '{edge}' not found")]
    MissingEdge { edge: String },

    #[error("Edges of model '{model}' are not populated")]
    EdgesNotPopulated { model: String },

    #[error("Invalid {what}: {value}")]
    InvalidFactor { what: &'static str, value: f64 },
}

#[derive(Error, Debug)]
pub enum LcaError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Unknown unit '{unit}'")]
    UnknownUnit { unit: String },

    #[error("Cannot convert {from} to {to}")]
    IncompatibleUnits { from: String, to: String },

    #[error("No score for category '{category}' and '{key}'")]
    MissingScore { category: String, key: String },

    #[error("Background engine error: {reason}")]
    Backend { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
