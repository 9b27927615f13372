//! Edges between a process model and background datasets.
//!
//! Every edge has the model on exactly one side. An edge whose other side is
//! a dataset contributes that dataset's characterized score to the model's
//! impact; a functional edge is an output the aggregated impact is allocated
//! to.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Exchange with another engineered process.
    #[default]
    Technosphere,
    /// Elementary flow to or from the environment.
    Biosphere,
}

/// Reference to a dataset in a background database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetRef {
    pub database: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Reference unit of the dataset, e.g. "kWh".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl DatasetRef {
    pub fn new(database: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            code: code.into(),
            name: None,
            unit: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Key used in demand maps and score tables: `database::code`.
    pub fn key(&self) -> String {
        format!("{}::{}", self.database, self.code)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// The process model owning the edge.
    Model,
    Dataset(DatasetRef),
    /// Not linked yet.
    #[default]
    Unlinked,
}

impl Endpoint {
    pub fn is_model(&self) -> bool {
        matches!(self, Endpoint::Model)
    }

    pub fn dataset(&self) -> Option<&DatasetRef> {
        match self {
            Endpoint::Dataset(d) => Some(d),
            _ => None,
        }
    }
}

/// Amount carried by an edge, snapshot from the last converged model state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeAmount {
    /// Magnitude with a unit, e.g. `{ value: 1.2e6, unit: "W" }`.
    Quantity { value: f64, unit: String },
    /// Bare magnitude; unit handling falls back to the edge metadata.
    Raw(f64),
}

impl EdgeAmount {
    pub fn quantity(value: f64, unit: impl Into<String>) -> Self {
        EdgeAmount::Quantity {
            value,
            unit: unit.into(),
        }
    }

    pub fn magnitude(&self) -> f64 {
        match self {
            EdgeAmount::Quantity { value, .. } => *value,
            EdgeAmount::Raw(v) => *v,
        }
    }

    pub fn unit(&self) -> Option<&str> {
        match self {
            EdgeAmount::Quantity { unit, .. } => Some(unit),
            EdgeAmount::Raw(_) => None,
        }
    }
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub name: String,
    #[serde(default)]
    pub kind: EdgeKind,
    pub source: Endpoint,
    pub target: Endpoint,
    pub amount: EdgeAmount,
    /// Unit the model reports the amount in, when the amount is bare.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_unit: Option<String>,
    /// Unit expected on the dataset side. Overrides the dataset's own unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_unit: Option<String>,
    #[serde(default = "one")]
    pub allocation_factor: f64,
    #[serde(default)]
    pub functional: bool,
    /// Multiplier on the dataset's score, e.g. to remove losses a dataset
    /// already includes.
    #[serde(default = "one")]
    pub dataset_correction: f64,
}

impl FlowEdge {
    fn new(name: impl Into<String>, source: Endpoint, target: Endpoint, amount: EdgeAmount) -> Self {
        Self {
            name: name.into(),
            kind: EdgeKind::Technosphere,
            source,
            target,
            amount,
            model_unit: None,
            dataset_unit: None,
            allocation_factor: 1.0,
            functional: false,
            dataset_correction: 1.0,
        }
    }

    /// Flow into the model, e.g. purchased fuel or electricity.
    pub fn input(name: impl Into<String>, from: Endpoint, amount: EdgeAmount) -> Self {
        Self::new(name, from, Endpoint::Model, amount)
    }

    /// Flow out of the model: a product, a substituted co-product or an
    /// emission.
    pub fn output(name: impl Into<String>, to: Endpoint, amount: EdgeAmount) -> Self {
        Self::new(name, Endpoint::Model, to, amount)
    }

    pub fn biosphere(mut self) -> Self {
        self.kind = EdgeKind::Biosphere;
        self
    }

    pub fn functional(mut self, allocation_factor: f64) -> Self {
        self.functional = true;
        self.allocation_factor = allocation_factor;
        self
    }

    pub fn with_model_unit(mut self, unit: impl Into<String>) -> Self {
        self.model_unit = Some(unit.into());
        self
    }

    pub fn with_dataset_unit(mut self, unit: impl Into<String>) -> Self {
        self.dataset_unit = Some(unit.into());
        self
    }

    pub fn with_correction(mut self, correction: f64) -> Self {
        self.dataset_correction = correction;
        self
    }

    pub fn model_is_source(&self) -> bool {
        self.source.is_model()
    }

    /// The side of the edge that is not the model.
    pub fn far_end(&self) -> &Endpoint {
        if self.model_is_source() {
            &self.target
        } else {
            &self.source
        }
    }

    pub fn far_end_mut(&mut self) -> &mut Endpoint {
        if self.model_is_source() {
            &mut self.target
        } else {
            &mut self.source
        }
    }

    pub fn dataset(&self) -> Option<&DatasetRef> {
        self.far_end().dataset()
    }

    /// Dataset-side unit: the explicit override, else the linked dataset's.
    pub fn effective_dataset_unit(&self) -> Option<&str> {
        self.dataset_unit
            .as_deref()
            .or_else(|| self.dataset().and_then(|d| d.unit.as_deref()))
    }

    /// Sign of a non-functional edge's contribution.
    ///
    /// Technosphere outputs that are not functional substitute the linked
    /// dataset and are credited. Everything else adds its score.
    pub fn contribution_sign(&self) -> f64 {
        if self.kind == EdgeKind::Technosphere && self.model_is_source() {
            -1.0
        } else {
            1.0
        }
    }

    pub fn check_endpoints(&self) -> Result<(), ConfigurationError> {
        if self.source.is_model() == self.target.is_model() {
            return Err(ConfigurationError::ModelEndpoint {
                edge: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Edges of one model, keyed by name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeSet {
    edges: BTreeMap<String, FlowEdge>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the edge with the same name.
    pub fn insert(&mut self, edge: FlowEdge) -> Option<FlowEdge> {
        self.edges.insert(edge.name.clone(), edge)
    }

    pub fn with(mut self, edge: FlowEdge) -> Self {
        self.insert(edge);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FlowEdge> {
        self.edges.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FlowEdge> {
        self.edges.get_mut(name)
    }

    pub fn require_mut(&mut self, name: &str) -> Result<&mut FlowEdge, ConfigurationError> {
        self.edges
            .get_mut(name)
            .ok_or_else(|| ConfigurationError::MissingEdge {
                edge: name.to_string(),
            })
    }

    pub fn remove(&mut self, name: &str) -> Option<FlowEdge> {
        self.edges.remove(name)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlowEdge> {
        self.edges.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    pub fn functional(&self) -> impl Iterator<Item = &FlowEdge> {
        self.iter().filter(|e| e.functional)
    }

    pub fn non_functional(&self) -> impl Iterator<Item = &FlowEdge> {
        self.iter().filter(|e| !e.functional)
    }

    /// Point the far end of `name` at `dataset`.
    pub fn link(&mut self, name: &str, dataset: DatasetRef) -> Result<(), ConfigurationError> {
        *self.require_mut(name)?.far_end_mut() = Endpoint::Dataset(dataset);
        Ok(())
    }
}

impl FromIterator<FlowEdge> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = FlowEdge>>(iter: I) -> Self {
        let mut set = EdgeSet::new();
        for edge in iter {
            set.insert(edge);
        }
        set
    }
}
