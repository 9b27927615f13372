//! Flow edges of the steam network.

use serde::{Deserialize, Serialize};
use ul_lca::{DatasetRef, EdgeAmount, EdgeSet, Endpoint, FlowEdge};
use ul_steamnet::NetworkResults;

pub const STEAM_GENERATION: &str = "steam generation";
pub const ELECTRICITY_GRID: &str = "electricity grid";
pub const ELECTRICITY_SUBSTITUTION: &str = "electricity substitution";
pub const DISTRIBUTED_STEAM: &str = "distributed steam";
pub const WATER_TREATMENT: &str = "water treatment";

/// Unit the delivered heat is reported per.
pub const HEAT_UNIT: &str = "MJ";

/// Background datasets the network's edges link to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LcaLinks {
    pub heat: Option<DatasetRef>,
    pub electricity: Option<DatasetRef>,
    pub water_treatment: Option<DatasetRef>,
    pub dataset_correction: f64,
}

impl Default for LcaLinks {
    fn default() -> Self {
        Self {
            heat: None,
            electricity: None,
            water_treatment: None,
            dataset_correction: 1.0,
        }
    }
}

fn linked(dataset: &Option<DatasetRef>) -> Endpoint {
    dataset.clone().map_or(Endpoint::Unlinked, Endpoint::Dataset)
}

fn watts(v: f64) -> EdgeAmount {
    EdgeAmount::quantity(v, "W")
}

/// Edges for one converged state. Amounts are rates; the delivered heat is
/// the functional edge.
pub fn network_edges(results: &NetworkResults, links: &LcaLinks) -> EdgeSet {
    let mut edges = EdgeSet::new()
        .with(
            FlowEdge::input(STEAM_GENERATION, linked(&links.heat), watts(results.boiler_duty.value))
                .with_correction(links.dataset_correction),
        )
        .with(FlowEdge::input(
            ELECTRICITY_GRID,
            linked(&links.electricity),
            watts(results.pump_power.value),
        ))
        .with(FlowEdge::output(
            ELECTRICITY_SUBSTITUTION,
            linked(&links.electricity),
            watts(results.grid_power.value),
        ))
        .with(
            FlowEdge::output(DISTRIBUTED_STEAM, Endpoint::Unlinked, watts(results.heat_duty.value))
                .with_dataset_unit(HEAT_UNIT)
                .functional(1.0),
        );
    if links.water_treatment.is_some() {
        edges.insert(FlowEdge::input(
            WATER_TREATMENT,
            linked(&links.water_treatment),
            EdgeAmount::quantity(results.makeup_flow.value, "kg/s"),
        ));
    }
    edges
}
