//! Content hashing for dataset files.

use sha2::{Digest, Sha256};

use crate::types::DatasetNode;

/// File id of a dataset: stable for a `(database, code)` pair whatever
/// characters the code contains.
pub fn dataset_file_id(database: &str, code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(database.as_bytes());
    hasher.update([0u8]);
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Hash of a dataset's reference product and exchanges. Ignores the
/// timestamp, so re-exporting an unchanged result gives the same value.
pub fn fingerprint(node: &DatasetNode) -> String {
    let mut hasher = Sha256::new();
    hasher.update(node.name.as_bytes());
    hasher.update(node.unit.as_bytes());
    let exchanges = serde_json::to_string(&node.exchanges).unwrap_or_default();
    hasher.update(exchanges.as_bytes());
    format!("{:x}", hasher.finalize())
}
