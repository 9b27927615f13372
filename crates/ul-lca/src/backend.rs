//! Background impact engine seam.
//!
//! The engine receives every demand in one request and returns scores indexed
//! by `(category, demand key)`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LcaError, LcaResult};

/// Impact category identifier, e.g. "IPCC 2021|climate change|GWP 100a".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImpactCategory(String);

impl ImpactCategory {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImpactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImpactCategory {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Named demands, each a `{dataset key: coefficient}` map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemandSet {
    demands: BTreeMap<String, BTreeMap<String, f64>>,
}

impl DemandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `coefficient` of `dataset` to the demand named `key`.
    pub fn add(&mut self, key: impl Into<String>, dataset: impl Into<String>, coefficient: f64) {
        *self
            .demands
            .entry(key.into())
            .or_default()
            .entry(dataset.into())
            .or_default() += coefficient;
    }

    pub fn get(&self, key: &str) -> Option<&BTreeMap<String, f64>> {
        self.demands.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, f64>)> {
        self.demands.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.demands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.demands.is_empty()
    }
}

/// Characterized scores by `(category, demand key)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreTable {
    scores: BTreeMap<(ImpactCategory, String), f64>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: ImpactCategory, key: impl Into<String>, score: f64) {
        self.scores.insert((category, key.into()), score);
    }

    pub fn get(&self, category: &ImpactCategory, key: &str) -> Option<f64> {
        self.scores.get(&(category.clone(), key.to_string())).copied()
    }

    pub fn require(&self, category: &ImpactCategory, key: &str) -> LcaResult<f64> {
        self.get(category, key).ok_or_else(|| LcaError::MissingScore {
            category: category.to_string(),
            key: key.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Inventory and characterization for a batch of demands.
pub trait ImpactBackend {
    fn name(&self) -> &str {
        "background"
    }

    fn characterize(
        &self,
        demands: &DemandSet,
        categories: &[ImpactCategory],
    ) -> LcaResult<ScoreTable>;
}

impl<B: ImpactBackend + ?Sized> ImpactBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn characterize(
        &self,
        demands: &DemandSet,
        categories: &[ImpactCategory],
    ) -> LcaResult<ScoreTable> {
        (**self).characterize(demands, categories)
    }
}

/// Precomputed unit scores per `(category, dataset key)`.
///
/// A demand scores `Σ coefficient × unit score` over its datasets. File
/// layout (YAML or JSON):
///
/// ```yaml
/// scores:
///   climate change:
///     ecoinvent::market_for_electricity: 0.12
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StaticScoreBackend {
    #[serde(default)]
    scores: BTreeMap<ImpactCategory, BTreeMap<String, f64>>,
}

impl StaticScoreBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(
        mut self,
        category: impl Into<ImpactCategory>,
        dataset: impl Into<String>,
        score: f64,
    ) -> Self {
        self.insert(category.into(), dataset, score);
        self
    }

    pub fn insert(&mut self, category: ImpactCategory, dataset: impl Into<String>, score: f64) {
        self.scores
            .entry(category)
            .or_default()
            .insert(dataset.into(), score);
    }

    pub fn categories(&self) -> impl Iterator<Item = &ImpactCategory> {
        self.scores.keys()
    }

    pub fn from_yaml_str(content: &str) -> LcaResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> LcaResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a `.json` file, or YAML for any other extension.
    pub fn load(path: &Path) -> LcaResult<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }
}

impl ImpactBackend for StaticScoreBackend {
    fn name(&self) -> &str {
        "static"
    }

    fn characterize(
        &self,
        demands: &DemandSet,
        categories: &[ImpactCategory],
    ) -> LcaResult<ScoreTable> {
        let mut table = ScoreTable::new();
        for category in categories {
            let unit_scores = self.scores.get(category);
            for (key, demand) in demands.iter() {
                let mut score = 0.0;
                for (dataset, coefficient) in demand {
                    let unit = unit_scores.and_then(|s| s.get(dataset)).ok_or_else(|| {
                        LcaError::MissingScore {
                            category: category.to_string(),
                            key: dataset.clone(),
                        }
                    })?;
                    score += coefficient * unit;
                }
                table.insert(category.clone(), key, score);
            }
        }
        Ok(table)
    }
}
