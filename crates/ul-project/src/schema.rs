//! Scenario schema.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use ul_core::units::{delta_k, w};
use ul_export::ExportOptions;
use ul_lca::{AllocationBasis, DatasetRef, ImpactCategory};
use ul_steamnet::{ControllerOptions, SteamNetParams, SweepParameter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub params: SteamNetParams,
    #[serde(default)]
    pub controller: ControllerDef,
    #[serde(default)]
    pub lca: LcaDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportOptions>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sweeps: Vec<SweepDef>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, params: SteamNetParams) -> Self {
        Self {
            version: crate::validate::LATEST_VERSION,
            name: name.into(),
            params,
            controller: ControllerDef::default(),
            lca: LcaDef::default(),
            export: None,
            sweeps: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerDef {
    pub retry_budget: usize,
    pub placeholder_duty_w: f64,
    pub makeup_offset_k: f64,
}

impl Default for ControllerDef {
    fn default() -> Self {
        let options = ControllerOptions::default();
        Self {
            retry_budget: options.retry_budget,
            placeholder_duty_w: options.placeholder_duty.value,
            makeup_offset_k: options.makeup_offset.value,
        }
    }
}

impl ControllerDef {
    pub fn options(&self) -> ControllerOptions {
        ControllerOptions {
            retry_budget: self.retry_budget,
            placeholder_duty: w(self.placeholder_duty_w),
            makeup_offset: delta_k(self.makeup_offset_k),
            ..ControllerOptions::default()
        }
    }
}

/// Background linkage and allocation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LcaDef {
    pub categories: Vec<ImpactCategory>,
    pub basis: AllocationBasis,
    /// Dataset supplying the boiler's heat.
    pub heat_dataset: Option<DatasetRef>,
    /// Grid electricity, for pump demand and exported power.
    pub electricity_dataset: Option<DatasetRef>,
    pub water_treatment_dataset: Option<DatasetRef>,
    /// Multiplier on the heat dataset, e.g. to remove losses it already
    /// contains.
    pub dataset_correction: f64,
    /// Score table for the static background engine, relative to the
    /// scenario file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<PathBuf>,
}

impl Default for LcaDef {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            basis: AllocationBasis::Credit,
            heat_dataset: None,
            electricity_dataset: None,
            water_treatment_dataset: None,
            dataset_correction: 1.0,
            scores: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepDef {
    pub parameter: SweepParameter,
    pub values: Vec<f64>,
}
