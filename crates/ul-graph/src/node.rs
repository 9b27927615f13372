//! Process node catalog.

use serde::{Deserialize, Serialize};
use ul_core::units::{Length, Power, Temperature, Velocity};

/// Closed set of node kinds a steam network can be assembled from.
///
/// Fluid ports are named `in1..inN` / `out1..outN`; energy ports carry the
/// names used by power connections (`heat`, `power`, `power_in1`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Boundary feeding fluid into the network.
    Source,
    /// Boundary removing fluid from the network.
    Sink,
    /// One inlet, `outlets` outlets, same state on every branch.
    Splitter { outlets: u8 },
    /// `inlets` inlets mixed adiabatically into one outlet.
    Merge { inlets: u8 },
    /// Single-stream heat exchanger (boiler, point-of-use consumer).
    HeatExchanger,
    Turbine,
    Pump,
    /// Isenthalpic throttle.
    Valve,
    /// Insulated pipe with heat loss to its environment.
    Pipe,
    /// Droplet separator: `out1` saturated liquid, `out2` saturated vapor.
    PhaseSeparator,
    /// Closes a fluid loop for the solver.
    CycleCloser,
    PowerSource,
    PowerSink,
    PowerBus { inputs: u8, outputs: u8 },
    /// Shaft power to electricity with an efficiency.
    Generator,
}

/// Direction of an energy port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyPort {
    /// Energy flows into the node through this port.
    Input,
    /// Energy flows out of the node through this port.
    Output,
    /// Sign decided by the solver (heat exchangers, pipes).
    Either,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Source => "source",
            NodeKind::Sink => "sink",
            NodeKind::Splitter { .. } => "splitter",
            NodeKind::Merge { .. } => "merge",
            NodeKind::HeatExchanger => "heat exchanger",
            NodeKind::Turbine => "turbine",
            NodeKind::Pump => "pump",
            NodeKind::Valve => "valve",
            NodeKind::Pipe => "pipe",
            NodeKind::PhaseSeparator => "phase separator",
            NodeKind::CycleCloser => "cycle closer",
            NodeKind::PowerSource => "power source",
            NodeKind::PowerSink => "power sink",
            NodeKind::PowerBus { .. } => "power bus",
            NodeKind::Generator => "generator",
        }
    }

    /// Number of fluid inlet ports.
    pub fn fluid_inlets(&self) -> u8 {
        match self {
            NodeKind::Source => 0,
            NodeKind::Merge { inlets } => *inlets,
            NodeKind::PowerSource
            | NodeKind::PowerSink
            | NodeKind::PowerBus { .. }
            | NodeKind::Generator => 0,
            _ => 1,
        }
    }

    /// Number of fluid outlet ports.
    pub fn fluid_outlets(&self) -> u8 {
        match self {
            NodeKind::Sink => 0,
            NodeKind::Splitter { outlets } => *outlets,
            NodeKind::PhaseSeparator => 2,
            NodeKind::PowerSource
            | NodeKind::PowerSink
            | NodeKind::PowerBus { .. }
            | NodeKind::Generator => 0,
            _ => 1,
        }
    }

    pub fn is_fluid_inlet(&self, port: &str) -> bool {
        port_number(port, "in").is_some_and(|n| n >= 1 && n <= u32::from(self.fluid_inlets()))
    }

    pub fn is_fluid_outlet(&self, port: &str) -> bool {
        port_number(port, "out").is_some_and(|n| n >= 1 && n <= u32::from(self.fluid_outlets()))
    }

    /// All fluid port names, inlets first.
    pub fn fluid_ports(&self) -> Vec<String> {
        let inlets = (1..=self.fluid_inlets()).map(|i| format!("in{i}"));
        let outlets = (1..=self.fluid_outlets()).map(|i| format!("out{i}"));
        inlets.chain(outlets).collect()
    }

    /// Direction of the named energy port, `None` if the kind has no such port.
    pub fn energy_port(&self, port: &str) -> Option<EnergyPort> {
        match self {
            NodeKind::HeatExchanger | NodeKind::Pipe if port == "heat" => Some(EnergyPort::Either),
            NodeKind::Turbine if port == "power" => Some(EnergyPort::Output),
            NodeKind::Pump if port == "power" => Some(EnergyPort::Input),
            NodeKind::PowerSource if port == "power" => Some(EnergyPort::Output),
            NodeKind::PowerSink if port == "power" => Some(EnergyPort::Input),
            NodeKind::Generator if port == "power_in" => Some(EnergyPort::Input),
            NodeKind::Generator if port == "power_out" => Some(EnergyPort::Output),
            NodeKind::PowerBus { inputs, outputs } => {
                if port_number(port, "power_in").is_some_and(|n| n >= 1 && n <= u32::from(*inputs)) {
                    Some(EnergyPort::Input)
                } else if port_number(port, "power_out")
                    .is_some_and(|n| n >= 1 && n <= u32::from(*outputs))
                {
                    Some(EnergyPort::Output)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Accepts a heat duty set-point.
    pub fn has_duty(&self) -> bool {
        matches!(self, NodeKind::HeatExchanger)
    }

    /// Accepts an efficiency set-point.
    pub fn has_efficiency(&self) -> bool {
        matches!(self, NodeKind::Turbine | NodeKind::Pump | NodeKind::Generator)
    }

    /// Accepts an outlet/inlet pressure ratio.
    pub fn has_pressure_ratio(&self) -> bool {
        matches!(self, NodeKind::HeatExchanger | NodeKind::Pipe)
    }

    /// Carries pipe geometry and environmental parameters.
    pub fn has_loss_geometry(&self) -> bool {
        matches!(self, NodeKind::Pipe)
    }
}

fn port_number(port: &str, prefix: &str) -> Option<u32> {
    let digits = port.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Medium surrounding a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMedium {
    #[default]
    Air,
    Soil,
    Water,
}

/// Pipe geometry, insulation and surroundings. Diameter is left to the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeGeometry {
    pub length: Length,
    pub roughness: Length,
    pub wall_thickness: Length,
    pub insulation_thickness: Length,
    /// Insulation conductivity [W/(m·K)].
    pub insulation_conductivity: f64,
    pub material: String,
    pub ambient_temperature: Temperature,
    pub wind_velocity: Velocity,
    pub medium: EnvironmentMedium,
}

/// Operating set-points of a node. Unset values are solver unknowns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SetPoints {
    pub pressure_ratio: Option<f64>,
    /// Heat duty, negative when heat leaves the fluid.
    pub duty: Option<Power>,
    pub efficiency: Option<f64>,
    pub pipe: Option<PipeGeometry>,
}

/// A labelled node in a process topology.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessNode {
    pub label: String,
    pub kind: NodeKind,
    pub set_points: SetPoints,
}

impl ProcessNode {
    /// Create a node of `kind` with no set-points.
    pub fn new(label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            label: label.into(),
            kind,
            set_points: SetPoints::default(),
        }
    }

    pub fn with_pressure_ratio(mut self, pr: f64) -> Self {
        self.set_points.pressure_ratio = Some(pr);
        self
    }

    pub fn with_duty(mut self, duty: Power) -> Self {
        self.set_points.duty = Some(duty);
        self
    }

    pub fn with_efficiency(mut self, eta: f64) -> Self {
        self.set_points.efficiency = Some(eta);
        self
    }

    pub fn with_pipe(mut self, geometry: PipeGeometry) -> Self {
        self.set_points.pipe = Some(geometry);
        self
    }
}
