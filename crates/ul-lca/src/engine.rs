//! Aggregation of background scores and allocation to functional edges.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::backend::{DemandSet, ImpactBackend, ImpactCategory, ScoreTable};
use crate::edge::{EdgeSet, FlowEdge};
use crate::error::{ConfigurationError, LcaError, LcaResult};
use crate::model::ProcessModel;
use crate::units::{UnitResolutionWarning, resolve};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ImpactReport {
    /// Unallocated impact per category.
    pub totals: BTreeMap<ImpactCategory, f64>,
    /// Signed contribution of each non-functional edge.
    pub contributions: BTreeMap<ImpactCategory, BTreeMap<String, f64>>,
    /// Impact per unit of each functional edge's resolved amount.
    pub allocated: BTreeMap<ImpactCategory, BTreeMap<String, f64>>,
    /// Resolved amount of every edge.
    pub resolved: BTreeMap<String, f64>,
    pub warnings: Vec<UnitResolutionWarning>,
}

impl ImpactReport {
    pub fn total(&self, category: &ImpactCategory) -> Option<f64> {
        self.totals.get(category).copied()
    }

    pub fn allocated(&self, category: &ImpactCategory, edge: &str) -> Option<f64> {
        self.allocated.get(category)?.get(edge).copied()
    }
}

struct CachedScores {
    demands: DemandSet,
    categories: Vec<ImpactCategory>,
    table: ScoreTable,
}

/// Turns an edge set into allocated impact.
///
/// Scores are cached per (demand set, categories), so recomputing with
/// unchanged linkage only repeats the arithmetic.
pub struct ImpactEngine {
    backend: Box<dyn ImpactBackend + Send>,
    cache: Option<CachedScores>,
    requests: usize,
}

impl std::fmt::Debug for ImpactEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImpactEngine")
            .field("backend", &self.backend.name())
            .field("cached", &self.cache.is_some())
            .field("requests", &self.requests)
            .finish()
    }
}

/// Check linkage before anything is sent to the background engine.
pub fn check_configuration(
    edges: &EdgeSet,
    categories: &[ImpactCategory],
) -> Result<(), ConfigurationError> {
    if categories.is_empty() {
        return Err(ConfigurationError::NoCategories);
    }
    for edge in edges.iter() {
        edge.check_endpoints()?;
        if !edge.dataset_correction.is_finite() {
            return Err(ConfigurationError::InvalidFactor {
                what: "dataset correction",
                value: edge.dataset_correction,
            });
        }
        if edge.functional {
            if !edge.allocation_factor.is_finite() || edge.allocation_factor < 0.0 {
                return Err(ConfigurationError::InvalidFactor {
                    what: "allocation factor",
                    value: edge.allocation_factor,
                });
            }
        } else if edge.dataset().is_none() {
            return Err(ConfigurationError::UnlinkedEdge {
                edge: edge.name.clone(),
            });
        }
    }
    if edges.functional().next().is_none() {
        return Err(ConfigurationError::NoFunctionalEdge);
    }
    Ok(())
}

/// One demand per non-functional edge, keyed by edge name.
pub fn demand_set(edges: &EdgeSet) -> DemandSet {
    let mut demands = DemandSet::new();
    for edge in edges.non_functional() {
        if let Some(dataset) = edge.dataset() {
            demands.add(edge.name.clone(), dataset.key(), 1.0);
        }
    }
    demands
}

impl ImpactEngine {
    pub fn new(backend: impl ImpactBackend + Send + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            cache: None,
            requests: 0,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Requests sent to the background engine so far.
    pub fn requests(&self) -> usize {
        self.requests
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    fn scores(
        &mut self,
        demands: DemandSet,
        categories: &[ImpactCategory],
    ) -> LcaResult<&ScoreTable> {
        let hit = self
            .cache
            .as_ref()
            .is_some_and(|c| c.demands == demands && c.categories == categories);
        if !hit {
            debug!(
                backend = self.backend.name(),
                demands = demands.len(),
                categories = categories.len(),
                "requesting background scores"
            );
            let table = self.backend.characterize(&demands, categories)?;
            self.requests += 1;
            self.cache = Some(CachedScores {
                demands,
                categories: categories.to_vec(),
                table,
            });
        }
        self.cache
            .as_ref()
            .map(|c| &c.table)
            .ok_or_else(|| LcaError::Backend {
                reason: "score cache empty".to_string(),
            })
    }

    pub fn compute(
        &mut self,
        edges: &EdgeSet,
        categories: &[ImpactCategory],
    ) -> LcaResult<ImpactReport> {
        check_configuration(edges, categories)?;

        let mut report = ImpactReport::default();
        for edge in edges.iter() {
            let r = resolve(edge);
            report.resolved.insert(edge.name.clone(), r.value);
            report.warnings.extend(r.warning);
        }

        let functional: Vec<&FlowEdge> = edges.functional().collect();
        for edge in &functional {
            let amount = report.resolved[&edge.name];
            if amount == 0.0 || !amount.is_finite() {
                return Err(ConfigurationError::ZeroFunctionalAmount {
                    edge: edge.name.clone(),
                    amount,
                }
                .into());
            }
        }

        let table = self.scores(demand_set(edges), categories)?;
        for category in categories {
            let mut total = 0.0;
            let mut parts = BTreeMap::new();
            for edge in edges.non_functional() {
                let score = table.require(category, &edge.name)?;
                let part = edge.contribution_sign()
                    * score
                    * report.resolved[&edge.name]
                    * edge.dataset_correction;
                total += part;
                parts.insert(edge.name.clone(), part);
            }

            let allocated = functional
                .iter()
                .map(|f| {
                    let per_unit = total * f.allocation_factor / report.resolved[&f.name];
                    (f.name.clone(), per_unit)
                })
                .collect();

            report.totals.insert(category.clone(), total);
            report.contributions.insert(category.clone(), parts);
            report.allocated.insert(category.clone(), allocated);
        }

        info!(
            categories = categories.len(),
            functional = functional.len(),
            warnings = report.warnings.len(),
            "impact allocated"
        );
        Ok(report)
    }

    /// Allocate the impact of a model's current edges.
    pub fn compute_for<M: ProcessModel + ?Sized>(
        &mut self,
        model: &M,
        categories: &[ImpactCategory],
    ) -> LcaResult<ImpactReport> {
        let edges = model
            .edges()
            .ok_or_else(|| ConfigurationError::EdgesNotPopulated {
                model: model.name().to_string(),
            })?;
        self.compute(edges, categories)
    }
}
