//! Seam to the database datasets are written to.

use crate::ExportResult;
use crate::types::DatasetNode;

pub trait DatasetWriter {
    /// Create `database` if it does not exist yet.
    fn register_database(&mut self, database: &str) -> ExportResult<()>;

    fn has_database(&self, database: &str) -> bool;

    /// Persist `node` and return its code.
    fn write_dataset(&mut self, node: &DatasetNode) -> ExportResult<String>;
}
