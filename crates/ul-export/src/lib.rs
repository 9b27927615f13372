//! ul-export: allocated results as datasets in an external database.

pub mod assemble;
pub mod hash;
pub mod store;
pub mod types;
pub mod writer;

pub use assemble::{DEFAULT_DATABASE, ExportOptions, build_datasets, dataset_code, export_datasets};
pub use hash::{dataset_file_id, fingerprint};
pub use store::JsonDatasetStore;
pub use types::*;
pub use writer::DatasetWriter;

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("Allocation error: {0}")]
    Lca(#[from] ul_lca::LcaError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database not registered: {database}")]
    DatabaseNotFound { database: String },

    #[error("Dataset not found: {database}/{code}")]
    DatasetNotFound { database: String, code: String },

    #[error("Nothing to export: {what}")]
    Empty { what: String },
}
