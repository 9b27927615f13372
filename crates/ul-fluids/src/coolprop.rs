//! CoolProp-backed water/steam properties.

use crate::error::{FluidError, FluidResult};
use crate::model::{SpecEnthalpy, SpecEntropy, SteamProperties, validation};
use rfluids::prelude::*;
use ul_core::units::{Pressure, Temperature, k, pa};

/// CoolProp backend for pure water.
///
/// Thread-safe: every query builds its own `Fluid` instance.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoolPropSteam;

impl CoolPropSteam {
    pub fn new() -> Self {
        Self
    }

    fn water(&self, a: FluidInput, b: FluidInput, context: &str) -> FluidResult<Fluid> {
        Fluid::from(Pure::Water)
            .in_state(a, b)
            .map_err(|e| FluidError::Backend {
                message: format!("rfluids error at {context}: {e}"),
            })
    }

    fn backend_err(property: &str, e: impl std::fmt::Display) -> FluidError {
        FluidError::Backend {
            message: format!("rfluids error getting {property}: {e}"),
        }
    }
}

impl SteamProperties for CoolPropSteam {
    fn name(&self) -> &str {
        "CoolProp (Water)"
    }

    fn saturation_pressure(&self, t: Temperature) -> FluidResult<Pressure> {
        let t_k = validation::check_temperature(t)?;
        let mut fluid = self.water(
            FluidInput::temperature(t_k),
            FluidInput::quality(0.0),
            &format!("T={t_k} K, Q=0"),
        )?;
        let p = fluid.pressure().map_err(|e| Self::backend_err("pressure", e))?;
        Ok(pa(p))
    }

    fn saturation_temperature(&self, p: Pressure) -> FluidResult<Temperature> {
        let p_pa = validation::check_pressure(p)?;
        let mut fluid = self.water(
            FluidInput::pressure(p_pa),
            FluidInput::quality(1.0),
            &format!("P={p_pa} Pa, Q=1"),
        )?;
        let t = fluid
            .temperature()
            .map_err(|e| Self::backend_err("temperature", e))?;
        Ok(k(t))
    }

    fn saturated_enthalpy(&self, p: Pressure, quality: f64) -> FluidResult<SpecEnthalpy> {
        let p_pa = validation::check_pressure(p)?;
        let q = validation::check_quality(quality)?;
        let mut fluid = self.water(
            FluidInput::pressure(p_pa),
            FluidInput::quality(q),
            &format!("P={p_pa} Pa, Q={q}"),
        )?;
        fluid.enthalpy().map_err(|e| Self::backend_err("enthalpy", e))
    }

    fn saturated_entropy(&self, p: Pressure, quality: f64) -> FluidResult<SpecEntropy> {
        let p_pa = validation::check_pressure(p)?;
        let q = validation::check_quality(quality)?;
        let mut fluid = self.water(
            FluidInput::pressure(p_pa),
            FluidInput::quality(q),
            &format!("P={p_pa} Pa, Q={q}"),
        )?;
        fluid.entropy().map_err(|e| Self::backend_err("entropy", e))
    }

    fn enthalpy_ps(&self, p: Pressure, s: SpecEntropy) -> FluidResult<SpecEnthalpy> {
        let p_pa = validation::check_pressure(p)?;
        if !s.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "entropy",
                value: s,
            });
        }
        let mut fluid = self.water(
            FluidInput::pressure(p_pa),
            FluidInput::entropy(s),
            &format!("P={p_pa} Pa, S={s} J/kg/K"),
        )?;
        fluid.enthalpy().map_err(|e| Self::backend_err("enthalpy", e))
    }
}
