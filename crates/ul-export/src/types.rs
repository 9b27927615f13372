//! Dataset data types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ul_lca::DatasetRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeKind {
    Technosphere,
    Biosphere,
    Production,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub input: DatasetRef,
    /// Per unit of the dataset's reference product. Substitutions are
    /// negative.
    pub amount: f64,
    pub kind: ExchangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Edge the exchange was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetNode {
    pub database: String,
    pub code: String,
    pub name: String,
    pub unit: String,
    /// Process model the dataset was exported from.
    pub model: String,
    pub timestamp: String,
    pub exchanges: Vec<Exchange>,
    /// Allocated impact per category, per unit of reference product.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub impacts: BTreeMap<String, f64>,
    /// Hash of the exchanges, filled in by the writer.
    #[serde(default)]
    pub fingerprint: String,
}

impl DatasetNode {
    pub fn reference(&self) -> DatasetRef {
        DatasetRef::new(&self.database, &self.code)
            .with_name(&self.name)
            .with_unit(&self.unit)
    }

    pub fn production(&self) -> Option<&Exchange> {
        self.exchanges
            .iter()
            .find(|e| e.kind == ExchangeKind::Production)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseManifest {
    pub name: String,
    pub created: String,
    #[serde(default)]
    pub datasets: Vec<String>,
}
