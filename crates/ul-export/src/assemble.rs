//! Dataset assembly from an allocated edge set.
//!
//! One dataset per functional edge. Each non-functional edge becomes an
//! exchange scaled to one unit of the functional product, and the dataset
//! produces exactly one unit of itself.

use serde::{Deserialize, Serialize};
use tracing::info;
use ul_lca::engine::check_configuration;
use ul_lca::{ConfigurationError, EdgeKind, EdgeSet, FlowEdge, ImpactCategory, ImpactReport, resolve};

use crate::types::{DatasetNode, Exchange, ExchangeKind};
use crate::writer::DatasetWriter;
use crate::{ExportError, ExportResult};

pub const DEFAULT_DATABASE: &str = "utility LCA db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub database: String,
    /// Appended to the functional edge name to form dataset codes. A random
    /// suffix is used when absent.
    pub identifier: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            identifier: None,
        }
    }
}

/// `{functional}_{identifier}`, or `{model}_{functional}_{uuid}` without an
/// identifier.
pub fn dataset_code(model: &str, functional: &str, identifier: Option<&str>) -> String {
    match identifier {
        Some(id) => format!("{functional}_{id}"),
        None => format!("{model}_{functional}_{}", uuid::Uuid::new_v4()),
    }
}

fn exchange_kind(edge: &FlowEdge) -> ExchangeKind {
    match edge.kind {
        EdgeKind::Technosphere => ExchangeKind::Technosphere,
        EdgeKind::Biosphere => ExchangeKind::Biosphere,
    }
}

fn functional_node(
    model: &str,
    functional: &FlowEdge,
    edges: &EdgeSet,
    report: &ImpactReport,
    options: &ExportOptions,
    timestamp: &str,
) -> ExportResult<DatasetNode> {
    let product = resolve(functional);
    if product.value == 0.0 || !product.value.is_finite() {
        return Err(ul_lca::LcaError::from(ConfigurationError::ZeroFunctionalAmount {
            edge: functional.name.clone(),
            amount: product.value,
        })
        .into());
    }
    let scale = functional.allocation_factor / product.value;

    let mut exchanges = Vec::new();
    for edge in edges.non_functional() {
        let dataset = edge
            .dataset()
            .ok_or_else(|| {
                ul_lca::LcaError::from(ConfigurationError::UnlinkedEdge {
                    edge: edge.name.clone(),
                })
            })?
            .clone();
        let amount = resolve(edge);
        exchanges.push(Exchange {
            input: dataset,
            amount: edge.contribution_sign() * amount.value * edge.dataset_correction * scale,
            kind: exchange_kind(edge),
            unit: amount.unit,
            edge: Some(edge.name.clone()),
        });
    }

    let mut node = DatasetNode {
        database: options.database.clone(),
        code: dataset_code(model, &functional.name, options.identifier.as_deref()),
        name: functional
            .dataset()
            .and_then(|d| d.name.clone())
            .unwrap_or_else(|| functional.name.clone()),
        unit: product
            .unit
            .or_else(|| functional.effective_dataset_unit().map(str::to_string))
            .unwrap_or_else(|| "unit".to_string()),
        model: model.to_string(),
        timestamp: timestamp.to_string(),
        exchanges,
        impacts: report
            .allocated
            .iter()
            .filter_map(|(cat, per_edge)| {
                per_edge
                    .get(&functional.name)
                    .map(|v| (cat.to_string(), *v))
            })
            .collect(),
        fingerprint: String::new(),
    };
    node.exchanges.push(Exchange {
        input: node.reference(),
        amount: 1.0,
        kind: ExchangeKind::Production,
        unit: Some(node.unit.clone()),
        edge: Some(functional.name.clone()),
    });
    Ok(node)
}

/// Datasets for every functional edge, not yet written anywhere.
pub fn build_datasets(
    model: &str,
    edges: &EdgeSet,
    report: &ImpactReport,
    options: &ExportOptions,
) -> ExportResult<Vec<DatasetNode>> {
    let categories: Vec<ImpactCategory> = report.totals.keys().cloned().collect();
    check_configuration(edges, &categories).map_err(ul_lca::LcaError::from)?;

    let timestamp = chrono::Utc::now().to_rfc3339();
    edges
        .functional()
        .map(|f| functional_node(model, f, edges, report, options, &timestamp))
        .collect()
}

/// Write one dataset per functional edge and return their codes.
pub fn export_datasets(
    writer: &mut dyn DatasetWriter,
    model: &str,
    edges: &EdgeSet,
    report: &ImpactReport,
    options: &ExportOptions,
) -> ExportResult<Vec<String>> {
    let nodes = build_datasets(model, edges, report, options)?;
    if nodes.is_empty() {
        return Err(ExportError::Empty {
            what: "no functional edges".to_string(),
        });
    }

    writer.register_database(&options.database)?;
    let mut codes = Vec::with_capacity(nodes.len());
    for node in &nodes {
        codes.push(writer.write_dataset(node)?);
    }
    info!(database = %options.database, datasets = codes.len(), "datasets exported");
    Ok(codes)
}
