//! Distribution pressure levels and the design point derived from them.

use tracing::warn;
use ul_core::units::{Pressure, Temperature, bar, to_bar};
use ul_fluids::{SpecEnthalpy, SteamProperties};

use crate::error::{SteamNetError, SteamNetResult};
use crate::params::SteamNetParams;

/// Minimum margin of the selected main over the needed pressure.
pub const SELECTION_MARGIN: f64 = 1.01;
/// Margin above which the highest main is considered too low.
pub const FEASIBILITY_MARGIN: f64 = 1.05;

/// Sorted set of distribution pressures.
#[derive(Debug, Clone, PartialEq)]
pub struct MainsLadder {
    mains: Vec<Pressure>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MainSelection {
    pub pressure: Pressure,
    pub index: usize,
    /// `false` when the highest main is too close to (or below) the need.
    pub feasible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MainReport {
    pub pressure: Pressure,
    pub saturation_temperature: Temperature,
}

impl MainsLadder {
    pub fn new(mains_bar: &[f64]) -> SteamNetResult<Self> {
        if mains_bar.is_empty() {
            return Err(SteamNetError::Params {
                field: "mains_bar",
                reason: "at least one main is required".into(),
            });
        }
        let mut sorted = mains_bar.to_vec();
        sorted.sort_by(f64::total_cmp);
        sorted.dedup();
        Ok(Self {
            mains: sorted.into_iter().map(bar).collect(),
        })
    }

    pub fn pressures(&self) -> &[Pressure] {
        &self.mains
    }

    pub fn lowest(&self) -> Pressure {
        self.mains[0]
    }

    pub fn highest(&self) -> Pressure {
        self.mains[self.mains.len() - 1]
    }

    /// Smallest main at least 1 % above `needed`.
    ///
    /// Falls back to the highest main when none qualifies. Either way a
    /// warning is logged if the highest main is less than 5 % above `needed`.
    pub fn select(&self, needed: Pressure) -> MainSelection {
        let top = self.mains.len() - 1;
        let tight = needed * FEASIBILITY_MARGIN > self.highest();
        let found = self
            .mains
            .iter()
            .position(|&p| p >= needed * SELECTION_MARGIN);
        if tight {
            warn!(
                needed_bar = to_bar(needed),
                highest_bar = to_bar(self.highest()),
                "needed pressure larger than network pressure"
            );
        }
        let index = found.unwrap_or(top);
        MainSelection {
            pressure: self.mains[index],
            index,
            feasible: found.is_some() && !tight,
        }
    }

    /// Saturation temperature of each main.
    pub fn report(&self, props: &dyn SteamProperties) -> SteamNetResult<Vec<MainReport>> {
        self.mains
            .iter()
            .map(|&p| -> SteamNetResult<MainReport> {
                Ok(MainReport {
                    pressure: p,
                    saturation_temperature: props.saturation_temperature(p)?,
                })
            })
            .collect()
    }
}

/// Pressures and boiler state implied by a parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignPoint {
    pub ladder: MainsLadder,
    /// Saturation pressure at the delivery temperature.
    pub needed_pressure: Pressure,
    pub main: MainSelection,
    /// Boiler outlet enthalpy: boiler pressure at the saturated-vapor entropy
    /// of the lowest main.
    pub boiler_enthalpy: SpecEnthalpy,
}

impl DesignPoint {
    pub fn compute(params: &SteamNetParams, props: &dyn SteamProperties) -> SteamNetResult<Self> {
        params.validate()?;
        let ladder = MainsLadder::new(&params.mains_bar)?;
        let needed_pressure = props.saturation_pressure(params.delivery_temperature())?;
        let main = ladder.select(needed_pressure);
        let s_lowest = props.saturated_entropy(ladder.lowest(), 1.0)?;
        let boiler_enthalpy = props.enthalpy_ps(params.max_pressure(), s_lowest)?;
        Ok(Self {
            ladder,
            needed_pressure,
            main,
            boiler_enthalpy,
        })
    }

    pub fn main_pressure(&self) -> Pressure {
        self.main.pressure
    }
}
