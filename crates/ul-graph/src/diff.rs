//! Declarative edits applied to a topology.

use ul_core::units::{Power, Pressure};

use crate::builder::TopologyBuilder;
use crate::connection::{FlowConnection, MassFlowSpec, TemperatureSpec};
use crate::error::GraphResult;
use crate::node::{NodeKind, PipeGeometry, ProcessNode};

/// A single structural or set-point edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    RemoveConnection(String),
    AddNode(ProcessNode),
    AddConnection(FlowConnection),
    /// Change a node's kind in place, e.g. grow a merge's inlet count.
    SetKind { node: String, kind: NodeKind },
    SetDuty { node: String, duty: Power },
    SetPipe { node: String, geometry: PipeGeometry },
    SetMassFlow { connection: String, spec: MassFlowSpec },
    SetTemperature { connection: String, spec: TemperatureSpec },
    SetPressure { connection: String, pressure: Option<Pressure> },
}

/// Ordered list of edits. Applied atomically by [`crate::Topology::apply`]:
/// either every edit lands and the result validates, or nothing changes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopologyDiff {
    edits: Vec<Edit>,
}

impl TopologyDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn push(&mut self, edit: Edit) -> &mut Self {
        self.edits.push(edit);
        self
    }

    pub fn remove_connection(mut self, label: impl Into<String>) -> Self {
        self.edits.push(Edit::RemoveConnection(label.into()));
        self
    }

    pub fn add_node(mut self, node: ProcessNode) -> Self {
        self.edits.push(Edit::AddNode(node));
        self
    }

    pub fn add_connection(mut self, connection: FlowConnection) -> Self {
        self.edits.push(Edit::AddConnection(connection));
        self
    }

    pub fn set_kind(mut self, node: impl Into<String>, kind: NodeKind) -> Self {
        self.edits.push(Edit::SetKind {
            node: node.into(),
            kind,
        });
        self
    }

    pub fn set_duty(mut self, node: impl Into<String>, duty: Power) -> Self {
        self.edits.push(Edit::SetDuty {
            node: node.into(),
            duty,
        });
        self
    }

    pub fn set_pipe(mut self, node: impl Into<String>, geometry: PipeGeometry) -> Self {
        self.edits.push(Edit::SetPipe {
            node: node.into(),
            geometry,
        });
        self
    }

    pub fn set_mass_flow(mut self, connection: impl Into<String>, spec: MassFlowSpec) -> Self {
        self.edits.push(Edit::SetMassFlow {
            connection: connection.into(),
            spec,
        });
        self
    }

    pub fn set_temperature(
        mut self,
        connection: impl Into<String>,
        spec: TemperatureSpec,
    ) -> Self {
        self.edits.push(Edit::SetTemperature {
            connection: connection.into(),
            spec,
        });
        self
    }

    pub fn set_pressure(mut self, connection: impl Into<String>, pressure: Option<Pressure>) -> Self {
        self.edits.push(Edit::SetPressure {
            connection: connection.into(),
            pressure,
        });
        self
    }

    pub(crate) fn apply_to(&self, builder: &mut TopologyBuilder) -> GraphResult<()> {
        for edit in &self.edits {
            match edit {
                Edit::RemoveConnection(label) => builder.remove_connection(label)?,
                Edit::AddNode(node) => {
                    builder.add_node(node.clone());
                }
                Edit::AddConnection(c) => {
                    builder.connect(c.clone());
                }
                Edit::SetKind { node, kind } => builder.node_mut(node)?.kind = *kind,
                Edit::SetDuty { node, duty } => {
                    builder.node_mut(node)?.set_points.duty = Some(*duty);
                }
                Edit::SetPipe { node, geometry } => {
                    builder.node_mut(node)?.set_points.pipe = Some(geometry.clone());
                }
                Edit::SetMassFlow { connection, spec } => {
                    builder.connection_mut(connection)?.mass_flow = spec.clone();
                }
                Edit::SetTemperature { connection, spec } => {
                    builder.connection_mut(connection)?.temperature = spec.clone();
                }
                Edit::SetPressure {
                    connection,
                    pressure,
                } => builder.connection_mut(connection)?.pressure = *pressure,
            }
        }
        Ok(())
    }
}
