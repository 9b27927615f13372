//! Steam property trait and input guards.

use crate::error::{FluidError, FluidResult};
use ul_core::units::{Pressure, Temperature};

/// Specific enthalpy [J/kg].
pub type SpecEnthalpy = f64;

/// Specific entropy [J/(kg·K)].
pub type SpecEntropy = f64;

/// Water/steam property queries needed to size and evaluate a steam network.
///
/// Implementations must be thread-safe so independent model evaluations
/// (sensitivity sweeps) can share one backend.
pub trait SteamProperties: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Saturation pressure at temperature `t`.
    fn saturation_pressure(&self, t: Temperature) -> FluidResult<Pressure>;

    /// Saturation temperature at pressure `p`.
    fn saturation_temperature(&self, p: Pressure) -> FluidResult<Temperature>;

    /// Enthalpy on the saturation dome at pressure `p` and vapor quality `quality`.
    fn saturated_enthalpy(&self, p: Pressure, quality: f64) -> FluidResult<SpecEnthalpy>;

    /// Entropy on the saturation dome at pressure `p` and vapor quality `quality`.
    fn saturated_entropy(&self, p: Pressure, quality: f64) -> FluidResult<SpecEntropy>;

    /// Enthalpy at pressure `p` and entropy `s` (isentropic lookups).
    fn enthalpy_ps(&self, p: Pressure, s: SpecEntropy) -> FluidResult<SpecEnthalpy>;
}

pub(crate) mod validation {
    use super::*;

    pub fn check_pressure(p: Pressure) -> FluidResult<f64> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure",
                value: p.value,
            });
        }
        Ok(p.value)
    }

    pub fn check_temperature(t: Temperature) -> FluidResult<f64> {
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature",
                value: t.value,
            });
        }
        Ok(t.value)
    }

    pub fn check_quality(q: f64) -> FluidResult<f64> {
        if !(0.0..=1.0).contains(&q) {
            return Err(FluidError::NonPhysical {
                what: "vapor quality",
                value: q,
            });
        }
        Ok(q)
    }
}
