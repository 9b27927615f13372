//! Derived factors read off a converged steam network.

use ul_core::{UlError, ensure_finite, ensure_non_negative};
use ul_core::units::{MassRate, Power, kgps, w};
use ul_solver::{ConnectionState, Solution};

use crate::controller::ConvergedNetwork;
use crate::error::{SteamNetError, SteamNetResult};
use crate::labels::{conn, power};
use crate::variant::{Variant, exchanger_streams, leak_split_outlet};

/// Per-unit-of-heat factors and the absolute flows behind them.
///
/// All factors refer to one joule of heat delivered at the point of use.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkResults {
    pub variant: Variant,
    /// Heat delivered at the point of use (magnitude).
    pub heat_duty: Power,
    pub boiler_duty: Power,
    /// Electricity exported by the generator (magnitude).
    pub grid_power: Power,
    pub pump_power: Power,
    pub leakage_loss: Power,
    pub pipe_loss: Power,
    pub makeup_flow: MassRate,
    /// Exergy released across the point-of-use exchanger.
    pub heat_exergy: Power,
    pub turbine_exergy: Power,
    /// |P_grid / Q_heat|
    pub elec_factor: f64,
    /// |Q_boiler / Q_heat|
    pub boiler_factor: f64,
    /// |ṁ_makeup / Q_heat| [kg/J]
    pub water_treatment_factor: f64,
    /// (pipe + leakage losses) / |Q_heat|
    pub loss_fraction: f64,
    /// Share of the exergy output attributed to heat, in [0, 1].
    pub alloc_ex: f64,
}

fn invalid_result(err: UlError) -> SteamNetError {
    match err {
        UlError::NonFinite { what, value }
        | UlError::Negative { what, value }
        | UlError::OutOfRange { what, value, .. } => SteamNetError::InvalidResult { what, value },
        other => SteamNetError::Core(other),
    }
}

fn checked(what: &'static str, value: f64) -> SteamNetResult<f64> {
    ensure_finite(value, what).map_err(invalid_result)
}

fn non_negative(what: &'static str, value: f64) -> SteamNetResult<f64> {
    ensure_non_negative(value, what).map_err(invalid_result)
}

/// Exergy drop of a stream between two states, `ṁ((h_in − h_out) − T0(s_in − s_out))`.
pub fn exergy_flow(inlet: &ConnectionState, outlet: &ConnectionState, t0_kelvin: f64) -> f64 {
    inlet.mass_flow.value
        * ((inlet.enthalpy - outlet.enthalpy) - t0_kelvin * (inlet.entropy - outlet.entropy))
}

/// Heat's share of the combined exergy output, clamped to [0, 1].
pub fn exergy_allocation(heat_exergy: f64, turbine_exergy: f64) -> SteamNetResult<f64> {
    let total = heat_exergy + turbine_exergy;
    if total == 0.0 {
        return Err(SteamNetError::InvalidResult {
            what: "total exergy",
            value: total,
        });
    }
    Ok(checked("exergy allocation", heat_exergy / total)?.clamp(0.0, 1.0))
}

fn power_of(solution: &Solution, label: &str) -> SteamNetResult<f64> {
    Ok(solution.power(label)?.value)
}

pub fn extract(network: &ConvergedNetwork) -> SteamNetResult<NetworkResults> {
    let sol = network.solution();
    let variant = network.variant();

    let q_heat = power_of(sol, power::HEAT_SINK)?;
    if checked("heat duty", q_heat)? == 0.0 {
        return Err(SteamNetError::InvalidResult {
            what: "heat duty",
            value: q_heat,
        });
    }
    let q_heat_abs = q_heat.abs();
    let q_boiler = power_of(sol, power::BOILER)?;
    let p_grid = power_of(sol, power::GRID)?;
    let p_pump = power_of(sol, power::PUMP)?;

    let leak = sol.state(conn::LEAK)?;
    let leak_makeup = sol.state(conn::LEAK_MAKEUP)?;
    let leakage_loss = leak.mass_flow.value * (leak.enthalpy - leak_makeup.enthalpy);

    let exhaust = sol.state(conn::EXHAUST)?;
    let to_consumer = sol.state(leak_split_outlet(variant))?;
    let pipe_loss = to_consumer.mass_flow.value * (exhaust.enthalpy - to_consumer.enthalpy);

    let makeup = sol.state(conn::MAKEUP)?;

    let (hx_in, hx_out) = exchanger_streams(variant);
    let t0 = network.params().ambient_temperature().value;
    let heat_exergy = checked(
        "heat exergy",
        exergy_flow(sol.state(hx_in)?, sol.state(hx_out)?, t0),
    )?;
    let turbine_exergy = p_grid.abs();

    Ok(NetworkResults {
        variant,
        heat_duty: w(q_heat_abs),
        boiler_duty: w(q_boiler.abs()),
        grid_power: w(p_grid.abs()),
        pump_power: w(p_pump.abs()),
        leakage_loss: w(checked("leakage loss", leakage_loss)?),
        pipe_loss: w(checked("pipe loss", pipe_loss)?),
        makeup_flow: kgps(makeup.mass_flow.value),
        heat_exergy: w(heat_exergy),
        turbine_exergy: w(turbine_exergy),
        elec_factor: checked("electricity factor", (p_grid / q_heat).abs())?,
        boiler_factor: checked("boiler factor", (q_boiler / q_heat).abs())?,
        water_treatment_factor: checked(
            "water treatment factor",
            (makeup.mass_flow.value / q_heat).abs(),
        )?,
        loss_fraction: non_negative("loss fraction", (pipe_loss + leakage_loss) / q_heat_abs)?,
        alloc_ex: exergy_allocation(heat_exergy, turbine_exergy)?,
    })
}
