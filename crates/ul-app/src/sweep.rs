//! Foreground sensitivity sweeps.
//!
//! Each worker thread builds its own model through the factory and reuses
//! it for the points it takes, so the solver, the property backend and the
//! background engine are never shared between threads.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};
use ul_lca::{AllocationBasis, ImpactCategory};
use ul_steamnet::SweepParameter;

use crate::error::AppResult;
use crate::model::{ConvergenceReport, Stage, SteamNetModel};

/// One evaluated sweep value. `None` marks a point that failed to converge
/// or to allocate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub parameter: SweepParameter,
    pub value: f64,
    pub report: Option<ConvergenceReport>,
    /// Allocated impact of the first functional edge, per category.
    pub impact: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone)]
pub struct SweepRequest {
    pub parameter: SweepParameter,
    pub values: Vec<f64>,
    pub categories: Vec<ImpactCategory>,
    pub basis: AllocationBasis,
}

/// Evaluate every value of `request` in parallel. Points come back in the
/// order of `request.values`.
pub fn run_sweep<F>(factory: F, request: &SweepRequest) -> Vec<SweepPoint>
where
    F: Fn() -> AppResult<SteamNetModel> + Sync + Send,
{
    request
        .values
        .par_iter()
        .map_init(
            || build(&factory),
            |slot, &value| {
                // A failed first solve leaves the model without parameters.
                if slot
                    .as_ref()
                    .is_none_or(|m| m.stage() == Stage::Uninitialized)
                {
                    *slot = build(&factory);
                }
                match slot {
                    Some(model) => evaluate_point(model, request, value),
                    None => failed(request, value),
                }
            },
        )
        .collect()
}

fn build<F>(factory: &F) -> Option<SteamNetModel>
where
    F: Fn() -> AppResult<SteamNetModel>,
{
    match factory() {
        Ok(model) => Some(model),
        Err(err) => {
            warn!(error = %err, "sweep model could not be built");
            None
        }
    }
}

fn failed(request: &SweepRequest, value: f64) -> SweepPoint {
    SweepPoint {
        parameter: request.parameter,
        value,
        report: None,
        impact: None,
    }
}

fn evaluate_point(model: &mut SteamNetModel, request: &SweepRequest, value: f64) -> SweepPoint {
    let overrides = request.parameter.overrides(value);
    // Reuse the converged network when the worker already has one.
    let solved = if model.snapshot().is_some() {
        model
            .recalculate(&overrides)
            .or_else(|_| model.solve(&overrides))
    } else {
        model.solve(&overrides)
    };

    let report = match solved {
        Ok(report) => report,
        Err(err) => {
            warn!(parameter = request.parameter.name(), value, error = %err, "sweep point failed");
            return failed(request, value);
        }
    };

    let impact = if request.categories.is_empty() {
        None
    } else {
        match model.compute_impact(&request.categories, request.basis) {
            Ok(impact) => Some(functional_impact(impact)),
            Err(err) => {
                warn!(parameter = request.parameter.name(), value, error = %err, "sweep impact failed");
                None
            }
        }
    };
    debug!(parameter = request.parameter.name(), value, "sweep point done");

    SweepPoint {
        parameter: request.parameter,
        value,
        report: Some(report),
        impact,
    }
}

fn functional_impact(report: &ul_lca::ImpactReport) -> BTreeMap<String, f64> {
    report
        .allocated
        .iter()
        .filter_map(|(category, per_edge)| {
            per_edge
                .get(crate::edges::DISTRIBUTED_STEAM)
                .map(|v| (category.to_string(), *v))
        })
        .collect()
}
