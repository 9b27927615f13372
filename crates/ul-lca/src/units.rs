//! Unit registry and edge amount resolution.
//!
//! Scale factors come from `uom`, so the registry only decides which names
//! map to which dimension. Rates convert to amounts over a one-second
//! reference period: a model reporting watts and a dataset expecting MJ agree
//! on "per second of operation", and allocation per unit of functional
//! output does not depend on the period.

use std::fmt;

use serde::{Deserialize, Serialize};
use ul_core::units::{Energy, Mass, MassRate, Power, Time, Volume, VolumeRate, kg, m3, s};

use crate::edge::FlowEdge;
use crate::error::{LcaError, LcaResult};

/// Seconds of operation a rate is integrated over.
pub const REFERENCE_PERIOD_S: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Energy,
    Power,
    Mass,
    MassRate,
    Volume,
    VolumeRate,
    Dimensionless,
}

impl Dimension {
    /// Dimension of the rate integrated over time; amounts map to themselves.
    pub fn integrated(self) -> Dimension {
        match self {
            Dimension::Power => Dimension::Energy,
            Dimension::MassRate => Dimension::Mass,
            Dimension::VolumeRate => Dimension::Volume,
            other => other,
        }
    }

    pub fn is_rate(self) -> bool {
        self.integrated() != self
    }

    /// SI unit of the integrated dimension.
    pub fn base_unit(self) -> &'static str {
        match self.integrated() {
            Dimension::Energy => "J",
            Dimension::Mass => "kg",
            Dimension::Volume => "m3",
            _ => "unit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitDef {
    pub symbol: &'static str,
    pub dimension: Dimension,
    /// Value of one unit in SI.
    pub to_si: f64,
}

fn hours(v: f64) -> Time {
    use uom::si::time::hour;
    Time::new::<hour>(v)
}

fn energy<U>(symbol: &'static str) -> UnitDef
where
    U: uom::si::energy::Unit + uom::Conversion<f64, T = f64>,
{
    UnitDef {
        symbol,
        dimension: Dimension::Energy,
        to_si: Energy::new::<U>(1.0).value,
    }
}

fn power<U>(symbol: &'static str) -> UnitDef
where
    U: uom::si::power::Unit + uom::Conversion<f64, T = f64>,
{
    UnitDef {
        symbol,
        dimension: Dimension::Power,
        to_si: Power::new::<U>(1.0).value,
    }
}

fn mass<U>(symbol: &'static str) -> UnitDef
where
    U: uom::si::mass::Unit + uom::Conversion<f64, T = f64>,
{
    UnitDef {
        symbol,
        dimension: Dimension::Mass,
        to_si: Mass::new::<U>(1.0).value,
    }
}

fn volume<U>(symbol: &'static str) -> UnitDef
where
    U: uom::si::volume::Unit + uom::Conversion<f64, T = f64>,
{
    UnitDef {
        symbol,
        dimension: Dimension::Volume,
        to_si: Volume::new::<U>(1.0).value,
    }
}

fn mass_rate(symbol: &'static str, rate: MassRate) -> UnitDef {
    UnitDef {
        symbol,
        dimension: Dimension::MassRate,
        to_si: rate.value,
    }
}

fn volume_rate(symbol: &'static str, rate: VolumeRate) -> UnitDef {
    UnitDef {
        symbol,
        dimension: Dimension::VolumeRate,
        to_si: rate.value,
    }
}

/// Look a unit up by symbol or by its long name (as background databases
/// spell them, e.g. "kilowatt hour"). Case-insensitive.
pub fn lookup(name: &str) -> Option<UnitDef> {
    use uom::si::{energy as e, mass as ma, power as p, volume as v};

    let key = name.trim().to_ascii_lowercase();
    let def = match key.as_str() {
        "j" | "joule" => energy::<e::joule>("J"),
        "kj" | "kilojoule" => energy::<e::kilojoule>("kJ"),
        "mj" | "megajoule" => energy::<e::megajoule>("MJ"),
        "gj" | "gigajoule" => energy::<e::gigajoule>("GJ"),
        "wh" | "watt hour" => energy::<e::watt_hour>("Wh"),
        "kwh" | "kilowatt hour" => energy::<e::kilowatt_hour>("kWh"),
        "mwh" | "megawatt hour" => energy::<e::megawatt_hour>("MWh"),
        "w" | "watt" => power::<p::watt>("W"),
        "kw" | "kilowatt" => power::<p::kilowatt>("kW"),
        "mw" | "megawatt" => power::<p::megawatt>("MW"),
        "g" | "gram" => mass::<ma::gram>("g"),
        "kg" | "kilogram" => mass::<ma::kilogram>("kg"),
        "t" | "ton" | "tonne" => mass::<ma::megagram>("t"),
        "kg/s" => mass_rate("kg/s", kg(1.0) / s(1.0)),
        "kg/h" => mass_rate("kg/h", kg(1.0) / hours(1.0)),
        "t/h" => mass_rate("t/h", kg(1.0e3) / hours(1.0)),
        "l" | "liter" | "litre" => volume::<v::liter>("l"),
        "m3" | "cubic meter" => volume::<v::cubic_meter>("m3"),
        "m3/s" => volume_rate("m3/s", m3(1.0) / s(1.0)),
        "m3/h" => volume_rate("m3/h", m3(1.0) / hours(1.0)),
        "unit" | "dimensionless" | "" => UnitDef {
            symbol: "unit",
            dimension: Dimension::Dimensionless,
            to_si: 1.0,
        },
        _ => return None,
    };
    Some(def)
}

fn require(name: &str) -> LcaResult<UnitDef> {
    lookup(name).ok_or_else(|| LcaError::UnknownUnit {
        unit: name.to_string(),
    })
}

/// Convert `value` from one unit to another.
///
/// Same dimension converts directly. A rate converts to its integrated
/// dimension over [`REFERENCE_PERIOD_S`], and back.
pub fn convert(value: f64, from: &str, to: &str) -> LcaResult<f64> {
    let (f, t) = (require(from)?, require(to)?);
    let si = value * f.to_si;
    let si = if f.dimension == t.dimension {
        si
    } else if f.dimension.is_rate() && f.dimension.integrated() == t.dimension {
        si * REFERENCE_PERIOD_S
    } else if t.dimension.is_rate() && t.dimension.integrated() == f.dimension {
        si / REFERENCE_PERIOD_S
    } else {
        return Err(LcaError::IncompatibleUnits {
            from: from.to_string(),
            to: to.to_string(),
        });
    };
    Ok(si / t.to_si)
}

/// How an amount was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPath {
    /// The amount's own unit, converted to the dataset unit.
    Quantity,
    /// The declared model unit, converted to the implied dataset unit.
    ModelUnit,
    /// Bare magnitude, no conversion.
    Raw,
}

/// Amount resolution fell back to the bare magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitResolutionWarning {
    pub edge: String,
    pub reason: String,
}

impl fmt::Display for UnitResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge '{}': {}", self.edge, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: f64,
    pub path: ResolutionPath,
    /// Unit `value` is expressed in, when known.
    pub unit: Option<String>,
    pub warning: Option<UnitResolutionWarning>,
}

/// Resolve an edge's amount in the unit its dataset side expects.
///
/// Tried in order:
/// 1. the amount carries a unit and the dataset unit is known;
/// 2. a recognized model unit is declared; the target is the dataset unit,
///    or the SI unit of the model unit's dimension when the dataset side
///    declares none;
/// 3. the bare magnitude, with a warning. Never an error, so unitless
///    amounts stay usable.
///
/// The dataset side is [`FlowEdge::far_end`]: the target of an edge the
/// model produces, the source of an edge it consumes. Conversion always runs
/// from the model unit into that side's unit, whichever direction the edge
/// points.
pub fn resolve(edge: &FlowEdge) -> Resolution {
    let magnitude = edge.amount.magnitude();
    let dataset_unit = edge.effective_dataset_unit();
    let mut reasons = Vec::new();

    if let (Some(unit), Some(target)) = (edge.amount.unit(), dataset_unit) {
        match convert(magnitude, unit, target) {
            Ok(value) => {
                return Resolution {
                    value,
                    path: ResolutionPath::Quantity,
                    unit: Some(target.to_string()),
                    warning: None,
                };
            }
            Err(e) => reasons.push(e.to_string()),
        }
    }

    if let Some(model_unit) = edge.model_unit.as_deref() {
        match lookup(model_unit) {
            Some(def) => {
                let target = dataset_unit.unwrap_or(def.dimension.base_unit());
                // A unit-carrying amount is first brought into the model unit.
                let in_model_unit = match edge.amount.unit() {
                    Some(unit) => convert(magnitude, unit, model_unit),
                    None => Ok(magnitude),
                };
                match in_model_unit.and_then(|v| convert(v, model_unit, target)) {
                    Ok(value) => {
                        return Resolution {
                            value,
                            path: ResolutionPath::ModelUnit,
                            unit: Some(target.to_string()),
                            warning: None,
                        };
                    }
                    Err(e) => reasons.push(e.to_string()),
                }
            }
            None => reasons.push(format!("model unit '{model_unit}' not recognized")),
        }
    }

    if reasons.is_empty() {
        reasons.push("no unit information".to_string());
    }
    let warning = UnitResolutionWarning {
        edge: edge.name.clone(),
        reason: format!("using bare magnitude ({})", reasons.join("; ")),
    };
    tracing::warn!(edge = %edge.name, reason = %warning.reason, "unit resolution fell back");
    Resolution {
        value: magnitude,
        path: ResolutionPath::Raw,
        unit: edge.amount.unit().map(str::to_string),
        warning: Some(warning),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{DatasetRef, EdgeAmount, Endpoint};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    fn grid_kwh() -> Endpoint {
        Endpoint::Dataset(DatasetRef::new("ei", "electricity").with_unit("kilowatt hour"))
    }

    #[test]
    fn registry_scales() {
        assert!(close(lookup("kWh").unwrap().to_si, 3.6e6));
        assert!(close(lookup("MJ").unwrap().to_si, 1.0e6));
        assert!(close(lookup("t/h").unwrap().to_si, 1.0e3 / 3600.0));
        assert!(close(lookup("l").unwrap().to_si, 1.0e-3));
        assert_eq!(lookup("megajoule").unwrap().symbol, "MJ");
        assert!(lookup("furlong").is_none());
    }

    #[test]
    fn rates_integrate_over_one_second() {
        assert!(close(convert(1.0e6, "W", "MJ").unwrap(), 1.0));
        assert!(close(convert(3.6e6, "W", "kWh").unwrap(), 1.0));
        assert!(close(convert(2.0, "kg/s", "kg").unwrap(), 2.0));
        assert!(close(convert(1.0, "MJ", "kW").unwrap(), 1.0e3));
    }

    #[test]
    fn incompatible_dimensions_are_rejected() {
        assert!(matches!(
            convert(1.0, "kg", "MJ"),
            Err(LcaError::IncompatibleUnits { .. })
        ));
        assert!(matches!(
            convert(1.0, "W", "parsec"),
            Err(LcaError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn quantity_with_dataset_unit_converts_directly() {
        let edge = FlowEdge::input("power", grid_kwh(), EdgeAmount::quantity(7.2e6, "W"))
            .with_model_unit("kg");
        let r = resolve(&edge);
        assert_eq!(r.path, ResolutionPath::Quantity);
        assert!(close(r.value, 2.0));
        assert!(r.warning.is_none());
    }

    #[test]
    fn model_unit_used_when_amount_is_bare() {
        let edge = FlowEdge::input("power", grid_kwh(), EdgeAmount::Raw(3.6e6)).with_model_unit("W");
        let r = resolve(&edge);
        assert_eq!(r.path, ResolutionPath::ModelUnit);
        assert!(close(r.value, 1.0));
        assert_eq!(r.unit.as_deref(), Some("kilowatt hour"));
    }

    #[test]
    fn model_unit_converts_toward_the_dataset_side_both_ways() {
        let consumed =
            FlowEdge::input("grid", grid_kwh(), EdgeAmount::Raw(7.2e6)).with_model_unit("W");
        let produced =
            FlowEdge::output("export", grid_kwh(), EdgeAmount::Raw(7.2e6)).with_model_unit("W");
        assert!(!consumed.model_is_source());
        assert!(produced.model_is_source());
        for edge in [consumed, produced] {
            let r = resolve(&edge);
            assert_eq!(r.path, ResolutionPath::ModelUnit);
            assert!(close(r.value, 2.0), "{}: {}", edge.name, r.value);
            assert_eq!(r.unit.as_deref(), Some("kilowatt hour"));
        }
    }

    #[test]
    fn model_unit_without_dataset_unit_goes_to_si() {
        let edge = FlowEdge::output("heat", Endpoint::Unlinked, EdgeAmount::Raw(2.5))
            .with_model_unit("MJ");
        let r = resolve(&edge);
        assert_eq!(r.path, ResolutionPath::ModelUnit);
        assert!(close(r.value, 2.5e6));
        assert_eq!(r.unit.as_deref(), Some("J"));
    }

    #[test]
    fn incompatible_units_fall_back_to_raw() {
        let edge = FlowEdge::input("water", grid_kwh(), EdgeAmount::quantity(5.0, "kg"))
            .with_dataset_unit("m3")
            .with_model_unit("kg");
        // kg -> m3 fails in both steps, so the bare magnitude is used
        let r = resolve(&edge);
        assert_eq!(r.path, ResolutionPath::Raw);
        assert_eq!(r.value, 5.0);
        let w = r.warning.unwrap();
        assert_eq!(w.edge, "water");
        assert!(w.reason.contains("kg"), "{}", w.reason);
    }

    #[test]
    fn bare_amount_without_units_warns() {
        let edge = FlowEdge::input("misc", Endpoint::Unlinked, EdgeAmount::Raw(4.0));
        let r = resolve(&edge);
        assert_eq!(r.path, ResolutionPath::Raw);
        assert_eq!(r.value, 4.0);
        assert!(r.warning.unwrap().reason.contains("no unit information"));
    }

    #[test]
    fn unknown_model_unit_warns() {
        let edge = FlowEdge::input("misc", grid_kwh(), EdgeAmount::Raw(4.0)).with_model_unit("BTU");
        let r = resolve(&edge);
        assert_eq!(r.path, ResolutionPath::Raw);
        assert!(r.warning.unwrap().reason.contains("BTU"));
    }
}
