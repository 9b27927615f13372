//! Fluid and power connections.

use ul_core::units::{MassRate, Pressure, TempInterval, Temperature};

/// How one connection variable is specified.
///
/// `Ref` ties the value to the same variable on another connection:
/// `value = factor * reference + offset`.
#[derive(Debug, Clone, PartialEq)]
pub enum Spec<T, D = T> {
    /// Solver unknown.
    Free,
    Fixed(T),
    Ref {
        reference: String,
        factor: f64,
        offset: D,
    },
}

impl<T, D> Spec<T, D> {
    pub fn is_free(&self) -> bool {
        matches!(self, Spec::Free)
    }

    /// Label of the referenced connection, if any.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Spec::Ref { reference, .. } => Some(reference),
            _ => None,
        }
    }
}

impl<T, D> Default for Spec<T, D> {
    fn default() -> Self {
        Spec::Free
    }
}

pub type MassFlowSpec = Spec<MassRate>;
pub type TemperatureSpec = Spec<Temperature, TempInterval>;

/// Solver starting values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Guess {
    pub mass_flow: Option<MassRate>,
    pub pressure: Option<Pressure>,
    /// Specific enthalpy [J/kg].
    pub enthalpy: Option<f64>,
}

/// One end of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub node: String,
    pub port: String,
}

impl PortRef {
    pub fn new(node: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
        }
    }
}

impl std::fmt::Display for PortRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.node, self.port)
    }
}

/// Directed water/steam stream between two node ports.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowConnection {
    pub label: String,
    pub from: PortRef,
    pub to: PortRef,
    pub mass_flow: MassFlowSpec,
    pub temperature: TemperatureSpec,
    pub pressure: Option<Pressure>,
    /// Specific enthalpy [J/kg].
    pub enthalpy: Option<f64>,
    /// Vapor quality, 0 = saturated liquid, 1 = saturated vapor.
    pub quality: Option<f64>,
    /// Fluid composition, e.g. `"H2O"`. Only needed where the solver cannot
    /// propagate it (sources, the loop entry).
    pub fluid: Option<String>,
    pub guess: Guess,
}

impl FlowConnection {
    pub fn new(label: impl Into<String>, from: PortRef, to: PortRef) -> Self {
        Self {
            label: label.into(),
            from,
            to,
            mass_flow: Spec::Free,
            temperature: Spec::Free,
            pressure: None,
            enthalpy: None,
            quality: None,
            fluid: None,
            guess: Guess::default(),
        }
    }

    pub fn with_mass_flow(mut self, spec: MassFlowSpec) -> Self {
        self.mass_flow = spec;
        self
    }

    pub fn with_temperature(mut self, spec: TemperatureSpec) -> Self {
        self.temperature = spec;
        self
    }

    pub fn with_pressure(mut self, p: Pressure) -> Self {
        self.pressure = Some(p);
        self
    }

    pub fn with_enthalpy(mut self, h: f64) -> Self {
        self.enthalpy = Some(h);
        self
    }

    pub fn with_quality(mut self, x: f64) -> Self {
        self.quality = Some(x);
        self
    }

    pub fn with_fluid(mut self, fluid: impl Into<String>) -> Self {
        self.fluid = Some(fluid.into());
        self
    }

    pub fn with_guess(mut self, guess: Guess) -> Self {
        self.guess = guess;
        self
    }

    /// Labels of every connection this one refers to.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.mass_flow
            .reference()
            .into_iter()
            .chain(self.temperature.reference())
    }
}

/// Directed energy edge between two energy ports.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerConnection {
    pub label: String,
    pub from: PortRef,
    pub to: PortRef,
}

impl PowerConnection {
    pub fn new(label: impl Into<String>, from: PortRef, to: PortRef) -> Self {
        Self {
            label: label.into(),
            from,
            to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ul_core::units::{delta_k, kgps};

    #[test]
    fn references_cover_mass_flow_and_temperature() {
        let c = FlowConnection::new(
            "makeup",
            PortRef::new("makeup_source", "out1"),
            PortRef::new("makeup_merge", "in2"),
        )
        .with_mass_flow(Spec::Ref {
            reference: "live_steam".into(),
            factor: 0.05,
            offset: kgps(0.0),
        })
        .with_temperature(Spec::Ref {
            reference: "return".into(),
            factor: 1.0,
            offset: delta_k(-20.0),
        });

        let refs: Vec<&str> = c.references().collect();
        assert_eq!(refs, vec!["live_steam", "return"]);
    }

    #[test]
    fn default_spec_is_free() {
        let spec: MassFlowSpec = Spec::default();
        assert!(spec.is_free());
        assert_eq!(spec.reference(), None);
    }

    #[test]
    fn port_ref_display() {
        assert_eq!(PortRef::new("boiler", "out1").to_string(), "boiler:out1");
    }
}
