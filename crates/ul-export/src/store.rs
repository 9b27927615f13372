//! File-system dataset store.
//!
//! Layout: `<root>/<database>/database.json` lists the dataset codes, and
//! each dataset lives in `<root>/<database>/<file id>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::hash::{dataset_file_id, fingerprint};
use crate::types::{DatabaseManifest, DatasetNode};
use crate::writer::DatasetWriter;
use crate::{ExportError, ExportResult};

#[derive(Clone, Debug)]
pub struct JsonDatasetStore {
    root_dir: PathBuf,
}

impl JsonDatasetStore {
    pub fn new(root_dir: PathBuf) -> ExportResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    fn database_dir(&self, database: &str) -> PathBuf {
        self.root_dir.join(database)
    }

    fn manifest_path(&self, database: &str) -> PathBuf {
        self.database_dir(database).join("database.json")
    }

    fn dataset_path(&self, database: &str, code: &str) -> PathBuf {
        self.database_dir(database)
            .join(format!("{}.json", dataset_file_id(database, code)))
    }

    pub fn load_manifest(&self, database: &str) -> ExportResult<DatabaseManifest> {
        let path = self.manifest_path(database);
        if !path.exists() {
            return Err(ExportError::DatabaseNotFound {
                database: database.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_manifest(&self, manifest: &DatabaseManifest) -> ExportResult<()> {
        let content = serde_json::to_string_pretty(manifest)?;
        fs::write(self.manifest_path(&manifest.name), content)?;
        Ok(())
    }

    pub fn load_dataset(&self, database: &str, code: &str) -> ExportResult<DatasetNode> {
        let path = self.dataset_path(database, code);
        if !path.exists() {
            return Err(ExportError::DatasetNotFound {
                database: database.to_string(),
                code: code.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn list_datasets(&self, database: &str) -> ExportResult<Vec<String>> {
        Ok(self.load_manifest(database)?.datasets)
    }
}

impl DatasetWriter for JsonDatasetStore {
    fn register_database(&mut self, database: &str) -> ExportResult<()> {
        if self.has_database(database) {
            return Ok(());
        }
        fs::create_dir_all(self.database_dir(database))?;
        self.save_manifest(&DatabaseManifest {
            name: database.to_string(),
            created: chrono::Utc::now().to_rfc3339(),
            datasets: Vec::new(),
        })
    }

    fn has_database(&self, database: &str) -> bool {
        self.manifest_path(database).exists()
    }

    fn write_dataset(&mut self, node: &DatasetNode) -> ExportResult<String> {
        let mut manifest = self.load_manifest(&node.database)?;

        let mut stored = node.clone();
        stored.fingerprint = fingerprint(node);
        let content = serde_json::to_string_pretty(&stored)?;
        fs::write(self.dataset_path(&node.database, &node.code), content)?;

        if !manifest.datasets.contains(&node.code) {
            manifest.datasets.push(node.code.clone());
            self.save_manifest(&manifest)?;
        }
        Ok(node.code.clone())
    }
}
