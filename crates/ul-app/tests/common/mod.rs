//! Shared doubles: a table-based steam model and canned converged solutions.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use ul_core::units::{Pressure, Temperature, bar, degc, kgps, to_bar, to_degc, w};
use ul_fluids::{FluidResult, SpecEnthalpy, SpecEntropy, SteamProperties};
use ul_lca::{DatasetRef, StaticScoreBackend};
use ul_solver::{ConnectionState, ScriptedSolver, Solution, Step, VaporQuality};
use ul_steamnet::SteamNetParams;
use ul_steamnet::labels::{conn, power};
use ul_app::{LcaLinks, SteamNetModel};

/// Antoine fit above 100 °C plus a crude latent-heat model.
pub struct TableSteam;

const ANTOINE: (f64, f64, f64) = (8.14019, 1810.94, 244.485);
const MMHG: f64 = 133.322;
const LATENT: f64 = 2.0e6;
const CP: f64 = 4180.0;

impl SteamProperties for TableSteam {
    fn name(&self) -> &str {
        "table"
    }

    fn saturation_pressure(&self, t: Temperature) -> FluidResult<Pressure> {
        let (a, b, c) = ANTOINE;
        let mmhg = 10f64.powf(a - b / (to_degc(t) + c));
        Ok(bar(mmhg * MMHG / 1e5))
    }

    fn saturation_temperature(&self, p: Pressure) -> FluidResult<Temperature> {
        let (a, b, c) = ANTOINE;
        let mmhg = to_bar(p) * 1e5 / MMHG;
        Ok(degc(b / (a - mmhg.log10()) - c))
    }

    fn saturated_enthalpy(&self, p: Pressure, quality: f64) -> FluidResult<SpecEnthalpy> {
        let t = to_degc(self.saturation_temperature(p)?);
        Ok(CP * t + quality * LATENT)
    }

    fn saturated_entropy(&self, p: Pressure, quality: f64) -> FluidResult<SpecEntropy> {
        let t = self.saturation_temperature(p)?.value;
        Ok(CP * (t / 273.15).ln() + quality * LATENT / t)
    }

    fn enthalpy_ps(&self, p: Pressure, s: SpecEntropy) -> FluidResult<SpecEnthalpy> {
        Ok(2.8e6 + 1.0e3 * to_bar(p) + 10.0 * (s - 6.0e3))
    }
}

pub const Q_HEAT: f64 = -1.0e6;
pub const Q_BOILER: f64 = 1.3e6;
pub const P_GRID: f64 = 1.2e5;
pub const P_PUMP: f64 = 1.5e4;
pub const M_MAKEUP: f64 = 0.025;

/// Solver calls of one full solve with superheated steam and no injection.
pub const BASE_CALLS: usize = 2;

pub fn params() -> SteamNetParams {
    SteamNetParams {
        delivery_temperature_c: 200.0,
        heat_duty_w: 1.0e6,
        desuperheat: false,
        ..Default::default()
    }
}

fn stream_table() -> HashMap<&'static str, (f64, f64, f64)> {
    HashMap::from([
        (conn::FEED, (0.5, 0.45e6, 1.4e3)),
        (conn::LIVE_STEAM, (0.5, 3.2e6, 6.5e3)),
        (conn::EXHAUST, (0.5, 2.9e6, 6.6e3)),
        (conn::PIPE_OUTLET, (0.5, 2.85e6, 6.6e3)),
        (conn::TO_VALVE, (0.45, 2.85e6, 6.6e3)),
        (conn::TO_TRAP, (0.45, 2.85e6, 6.6e3)),
        (conn::LEAK, (0.03, 2.85e6, 6.6e3)),
        (conn::DELIVERY, (0.45, 2.85e6, 6.6e3)),
        (conn::CONDENSATE, (0.45, 0.85e6, 2.3e3)),
        (conn::RETURN, (0.45, 0.80e6, 2.2e3)),
        (conn::RECYCLE, (0.425, 0.80e6, 2.2e3)),
        (conn::BLOWDOWN, (0.025, 0.80e6, 2.2e3)),
        (conn::MAKEUP, (M_MAKEUP, 84.0e3, 0.3e3)),
        (conn::LEAK_MAKEUP, (0.03, 84.0e3, 0.3e3)),
        (conn::PUMP_IN, (0.5, 0.42e6, 1.3e3)),
        (conn::PUMP_OUT, (0.5, 0.45e6, 1.3e3)),
        (conn::INJECTION, (0.05, 0.85e6, 2.3e3)),
        (conn::INJECTED_STEAM, (0.5, 2.79e6, 6.4e3)),
        (conn::SPENT_CONDENSATE, (0.5, 0.85e6, 2.3e3)),
        (conn::SURPLUS_CONDENSATE, (0.05, 0.85e6, 2.3e3)),
        (conn::TRAP_VAPOR, (0.44, 2.8e6, 6.5e3)),
        (conn::TRAP_WASTE, (0.01, 0.85e6, 2.3e3)),
        (conn::TRAP_MAKEUP, (0.01, 84.0e3, 0.3e3)),
    ])
}

/// A converged solution with superheated steam at the pipe outlet.
pub fn solution() -> Solution {
    let mut sol = Solution::new(true, 12, 1e-10);
    for (label, (m, h, s)) in stream_table() {
        let quality = if label == conn::PIPE_OUTLET {
            VaporQuality::Superheated
        } else {
            VaporQuality::Subcooled
        };
        sol.insert_state(
            label,
            ConnectionState {
                mass_flow: kgps(m),
                pressure: bar(16.0),
                temperature: degc(200.0),
                enthalpy: h,
                entropy: s,
                quality,
            },
        );
    }
    sol.insert_power(power::HEAT_SINK, w(Q_HEAT));
    sol.insert_power(power::BOILER, w(Q_BOILER));
    sol.insert_power(power::GRID, w(P_GRID));
    sol.insert_power(power::PUMP, w(P_PUMP));
    sol.insert_power(power::TURBINE, w(P_GRID / 0.9));
    sol
}

pub fn converged(calls: usize) -> Vec<Step> {
    (0..calls).map(|_| Step::Converged(solution())).collect()
}

pub fn heat() -> DatasetRef {
    DatasetRef::new("ei", "heat_gas").with_unit("MJ")
}

pub fn grid() -> DatasetRef {
    DatasetRef::new("ei", "grid").with_unit("kWh")
}

pub fn water() -> DatasetRef {
    DatasetRef::new("ei", "water").with_unit("kg")
}

pub fn links() -> LcaLinks {
    LcaLinks {
        heat: Some(heat()),
        electricity: Some(grid()),
        ..Default::default()
    }
}

pub const HEAT_SCORE: f64 = 0.08;
pub const GRID_SCORE: f64 = 0.4;
pub const WATER_SCORE: f64 = 0.002;

pub fn scores() -> StaticScoreBackend {
    StaticScoreBackend::new()
        .with_score("gwp", "ei::heat_gas", HEAT_SCORE)
        .with_score("gwp", "ei::grid", GRID_SCORE)
        .with_score("gwp", "ei::water", WATER_SCORE)
}

/// Initialized model whose solver replays `steps`.
pub fn model(steps: Vec<Step>) -> SteamNetModel {
    let mut model = SteamNetModel::new("steam_net", TableSteam, ScriptedSolver::new(steps))
        .with_links(links())
        .with_backend(scores());
    model.initialize(params()).unwrap();
    model
}

pub fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}
