//! Operating targets of a steam network.
//!
//! Parameters are stored in engineering units (°C, bar, W, m) so scenario
//! files stay readable; the accessors hand out `uom` quantities.

use serde::{Deserialize, Serialize};
use ul_core::{UlError, ensure_finite, ensure_in_range, ensure_non_negative};
use ul_core::units::{Length, Power, Pressure, Temperature, Velocity, bar, degc, m, mps, w};
use ul_graph::EnvironmentMedium;

use crate::error::{SteamNetError, SteamNetResult};

/// Highest delivery temperature with a saturation pressure [°C].
const CRITICAL_TEMPERATURE_C: f64 = 373.946;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteamNetParams {
    /// Temperature the consumer needs, condensing [°C].
    pub delivery_temperature_c: f64,
    /// Heat delivered at the point of use [W].
    pub heat_duty_w: f64,
    /// Available distribution pressure levels [bar].
    pub mains_bar: Vec<f64>,
    /// Boiler outlet pressure [bar].
    pub max_pressure_bar: f64,
    /// Fraction of the distributed steam lost to atmosphere.
    pub leakage_factor: f64,
    /// Make-up water (and blowdown) as a fraction of live steam.
    pub makeup_factor: f64,
    pub ambient_temperature_c: f64,
    pub pipe_length_m: f64,
    pub insulation_thickness_m: f64,
    pub wind_velocity_mps: f64,
    pub environment_medium: EnvironmentMedium,
    /// Inject condensate when steam arrives dry or superheated.
    pub desuperheat: bool,
}

impl Default for SteamNetParams {
    fn default() -> Self {
        Self {
            delivery_temperature_c: 270.0,
            heat_duty_w: 1.0e6,
            mains_bar: vec![4.0, 8.0, 16.0, 40.0],
            max_pressure_bar: 100.0,
            leakage_factor: 0.075,
            makeup_factor: 0.05,
            ambient_temperature_c: 20.0,
            pipe_length_m: 1000.0,
            insulation_thickness_m: 0.1,
            wind_velocity_mps: 2.0,
            environment_medium: EnvironmentMedium::Air,
            desuperheat: true,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SteamNetError {
    SteamNetError::Params {
        field,
        reason: reason.into(),
    }
}

fn guard(field: &'static str, err: UlError) -> SteamNetError {
    let reason = match err {
        UlError::NonFinite { value, .. } => format!("{value} is not finite"),
        UlError::Negative { value, .. } => format!("{value} is negative"),
        UlError::OutOfRange { value, .. } => format!("{value} is outside [0, 1)"),
        other => other.to_string(),
    };
    invalid(field, reason)
}

fn finite(field: &'static str, v: f64) -> SteamNetResult<f64> {
    ensure_finite(v, field).map_err(|e| guard(field, e))
}

fn fraction(field: &'static str, v: f64) -> SteamNetResult<()> {
    let v = ensure_in_range(v, 0.0, 1.0, field).map_err(|e| guard(field, e))?;
    if v == 1.0 {
        return Err(invalid(field, format!("{v} is outside [0, 1)")));
    }
    Ok(())
}

fn non_negative(field: &'static str, v: f64) -> SteamNetResult<()> {
    ensure_non_negative(v, field).map_err(|e| guard(field, e))?;
    Ok(())
}

impl SteamNetParams {
    pub fn validate(&self) -> SteamNetResult<()> {
        let t = finite("delivery_temperature_c", self.delivery_temperature_c)?;
        if t <= 0.0 || t >= CRITICAL_TEMPERATURE_C {
            return Err(invalid(
                "delivery_temperature_c",
                format!("{t} °C has no saturation pressure"),
            ));
        }
        if finite("heat_duty_w", self.heat_duty_w)? <= 0.0 {
            return Err(invalid("heat_duty_w", "must be positive"));
        }
        if self.mains_bar.is_empty() {
            return Err(invalid("mains_bar", "at least one main is required"));
        }
        for &p in &self.mains_bar {
            if finite("mains_bar", p)? <= 0.0 {
                return Err(invalid("mains_bar", format!("{p} bar is not positive")));
            }
        }
        let top = self.mains_bar.iter().copied().fold(f64::MIN, f64::max);
        if finite("max_pressure_bar", self.max_pressure_bar)? <= top {
            return Err(invalid(
                "max_pressure_bar",
                format!(
                    "boiler pressure {} bar must exceed the highest main ({top} bar)",
                    self.max_pressure_bar
                ),
            ));
        }
        fraction("leakage_factor", self.leakage_factor)?;
        fraction("makeup_factor", self.makeup_factor)?;
        finite("ambient_temperature_c", self.ambient_temperature_c)?;
        if self.ambient_temperature_c >= t {
            return Err(invalid(
                "ambient_temperature_c",
                "must be below the delivery temperature",
            ));
        }
        non_negative("pipe_length_m", self.pipe_length_m)?;
        non_negative("insulation_thickness_m", self.insulation_thickness_m)?;
        non_negative("wind_velocity_mps", self.wind_velocity_mps)?;
        Ok(())
    }

    pub fn delivery_temperature(&self) -> Temperature {
        degc(self.delivery_temperature_c)
    }

    pub fn heat_duty(&self) -> Power {
        w(self.heat_duty_w)
    }

    pub fn max_pressure(&self) -> Pressure {
        bar(self.max_pressure_bar)
    }

    pub fn ambient_temperature(&self) -> Temperature {
        degc(self.ambient_temperature_c)
    }

    pub fn pipe_length(&self) -> Length {
        m(self.pipe_length_m)
    }

    pub fn insulation_thickness(&self) -> Length {
        m(self.insulation_thickness_m)
    }

    pub fn wind_velocity(&self) -> Velocity {
        mps(self.wind_velocity_mps)
    }

    pub fn with_overrides(&self, overrides: &ParamOverrides) -> Self {
        overrides.apply(self)
    }
}

/// Partial parameter update. Unset fields keep their current value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamOverrides {
    pub delivery_temperature_c: Option<f64>,
    pub heat_duty_w: Option<f64>,
    pub leakage_factor: Option<f64>,
    pub makeup_factor: Option<f64>,
    pub ambient_temperature_c: Option<f64>,
    pub pipe_length_m: Option<f64>,
    pub insulation_thickness_m: Option<f64>,
    pub wind_velocity_mps: Option<f64>,
}

impl ParamOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, params: &SteamNetParams) -> SteamNetParams {
        let mut out = params.clone();
        if let Some(v) = self.delivery_temperature_c {
            out.delivery_temperature_c = v;
        }
        if let Some(v) = self.heat_duty_w {
            out.heat_duty_w = v;
        }
        if let Some(v) = self.leakage_factor {
            out.leakage_factor = v;
        }
        if let Some(v) = self.makeup_factor {
            out.makeup_factor = v;
        }
        if let Some(v) = self.ambient_temperature_c {
            out.ambient_temperature_c = v;
        }
        if let Some(v) = self.pipe_length_m {
            out.pipe_length_m = v;
        }
        if let Some(v) = self.insulation_thickness_m {
            out.insulation_thickness_m = v;
        }
        if let Some(v) = self.wind_velocity_mps {
            out.wind_velocity_mps = v;
        }
        out
    }
}

/// Foreground parameters a sensitivity sweep can vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    MakeupFactor,
    AmbientTemperature,
    LeakageFactor,
    PipeLength,
    InsulationThickness,
    WindVelocity,
    DeliveryTemperature,
}

impl SweepParameter {
    pub const ALL: [SweepParameter; 7] = [
        SweepParameter::MakeupFactor,
        SweepParameter::AmbientTemperature,
        SweepParameter::LeakageFactor,
        SweepParameter::PipeLength,
        SweepParameter::InsulationThickness,
        SweepParameter::WindVelocity,
        SweepParameter::DeliveryTemperature,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SweepParameter::MakeupFactor => "makeup_factor",
            SweepParameter::AmbientTemperature => "ambient_temperature_c",
            SweepParameter::LeakageFactor => "leakage_factor",
            SweepParameter::PipeLength => "pipe_length_m",
            SweepParameter::InsulationThickness => "insulation_thickness_m",
            SweepParameter::WindVelocity => "wind_velocity_mps",
            SweepParameter::DeliveryTemperature => "delivery_temperature_c",
        }
    }

    /// Current value of this parameter.
    pub fn value(self, params: &SteamNetParams) -> f64 {
        match self {
            SweepParameter::MakeupFactor => params.makeup_factor,
            SweepParameter::AmbientTemperature => params.ambient_temperature_c,
            SweepParameter::LeakageFactor => params.leakage_factor,
            SweepParameter::PipeLength => params.pipe_length_m,
            SweepParameter::InsulationThickness => params.insulation_thickness_m,
            SweepParameter::WindVelocity => params.wind_velocity_mps,
            SweepParameter::DeliveryTemperature => params.delivery_temperature_c,
        }
    }

    pub fn overrides(self, value: f64) -> ParamOverrides {
        let mut o = ParamOverrides::default();
        match self {
            SweepParameter::MakeupFactor => o.makeup_factor = Some(value),
            SweepParameter::AmbientTemperature => o.ambient_temperature_c = Some(value),
            SweepParameter::LeakageFactor => o.leakage_factor = Some(value),
            SweepParameter::PipeLength => o.pipe_length_m = Some(value),
            SweepParameter::InsulationThickness => o.insulation_thickness_m = Some(value),
            SweepParameter::WindVelocity => o.wind_velocity_mps = Some(value),
            SweepParameter::DeliveryTemperature => o.delivery_temperature_c = Some(value),
        }
        o
    }
}
