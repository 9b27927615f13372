//! Topology validation logic.

use std::collections::{HashMap, HashSet};

use crate::connection::{FlowConnection, PowerConnection, PortRef, Spec};
use crate::error::{GraphError, GraphResult};
use crate::node::{EnergyPort, NodeKind, ProcessNode};

/// Labels unique, set-points allowed by each kind and physically sane.
pub(crate) fn validate_nodes(nodes: &[ProcessNode]) -> GraphResult<()> {
    let mut seen = HashSet::new();
    for node in nodes {
        if !seen.insert(node.label.as_str()) {
            return Err(GraphError::DuplicateNode {
                label: node.label.clone(),
            });
        }
        validate_set_points(node)?;
    }
    Ok(())
}

fn validate_set_points(node: &ProcessNode) -> GraphResult<()> {
    let sp = &node.set_points;
    let not_allowed = |what| GraphError::SetPointNotAllowed {
        node: node.label.clone(),
        what,
    };
    let invalid = |what, value| GraphError::InvalidSetPoint {
        owner: node.label.clone(),
        what,
        value,
    };

    if let Some(pr) = sp.pressure_ratio {
        if !node.kind.has_pressure_ratio() {
            return Err(not_allowed("pressure ratio"));
        }
        if !pr.is_finite() || pr <= 0.0 || pr > 1.0 {
            return Err(invalid("pressure ratio", pr));
        }
    }
    if let Some(duty) = sp.duty {
        if !node.kind.has_duty() {
            return Err(not_allowed("duty"));
        }
        if !duty.value.is_finite() {
            return Err(invalid("duty", duty.value));
        }
    }
    if let Some(eta) = sp.efficiency {
        if !node.kind.has_efficiency() {
            return Err(not_allowed("efficiency"));
        }
        if !eta.is_finite() || eta <= 0.0 || eta > 1.0 {
            return Err(invalid("efficiency", eta));
        }
    }
    if let Some(pipe) = &sp.pipe {
        if !node.kind.has_loss_geometry() {
            return Err(not_allowed("pipe geometry"));
        }
        for (what, value) in [
            ("pipe length", pipe.length.value),
            ("pipe roughness", pipe.roughness.value),
            ("wall thickness", pipe.wall_thickness.value),
            ("insulation thickness", pipe.insulation_thickness.value),
            ("insulation conductivity", pipe.insulation_conductivity),
            ("wind velocity", pipe.wind_velocity.value),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(what, value));
            }
        }
        if !pipe.ambient_temperature.value.is_finite() || pipe.ambient_temperature.value <= 0.0 {
            return Err(invalid("ambient temperature", pipe.ambient_temperature.value));
        }
    }
    Ok(())
}

/// Endpoints exist, ports exist with the right direction, each port used once,
/// and every fluid port is connected.
pub(crate) fn validate_connections(
    nodes: &[ProcessNode],
    connections: &[FlowConnection],
    power: &[PowerConnection],
) -> GraphResult<()> {
    let kinds: HashMap<&str, NodeKind> = nodes.iter().map(|n| (n.label.as_str(), n.kind)).collect();

    let mut labels = HashSet::new();
    for label in connections
        .iter()
        .map(|c| c.label.as_str())
        .chain(power.iter().map(|p| p.label.as_str()))
    {
        if !labels.insert(label) {
            return Err(GraphError::DuplicateConnection {
                label: label.to_string(),
            });
        }
    }

    let mut used: HashMap<(&str, &str), &str> = HashMap::new();
    for c in connections {
        let from_kind = node_kind(&kinds, &c.from.node)?;
        if !from_kind.is_fluid_outlet(&c.from.port) {
            return Err(invalid_port(&c.label, &c.from));
        }
        let to_kind = node_kind(&kinds, &c.to.node)?;
        if !to_kind.is_fluid_inlet(&c.to.port) {
            return Err(invalid_port(&c.label, &c.to));
        }
        claim_port(&mut used, &c.from, &c.label)?;
        claim_port(&mut used, &c.to, &c.label)?;
        validate_flow_values(c)?;
    }

    for p in power {
        let from_kind = node_kind(&kinds, &p.from.node)?;
        match from_kind.energy_port(&p.from.port) {
            Some(EnergyPort::Output | EnergyPort::Either) => {}
            _ => return Err(invalid_port(&p.label, &p.from)),
        }
        let to_kind = node_kind(&kinds, &p.to.node)?;
        match to_kind.energy_port(&p.to.port) {
            Some(EnergyPort::Input | EnergyPort::Either) => {}
            _ => return Err(invalid_port(&p.label, &p.to)),
        }
        claim_port(&mut used, &p.from, &p.label)?;
        claim_port(&mut used, &p.to, &p.label)?;
    }

    for node in nodes {
        for port in node.kind.fluid_ports() {
            if !used.contains_key(&(node.label.as_str(), port.as_str())) {
                return Err(GraphError::UnconnectedPort {
                    node: node.label.clone(),
                    port,
                });
            }
        }
    }

    Ok(())
}

fn node_kind(kinds: &HashMap<&str, NodeKind>, label: &str) -> GraphResult<NodeKind> {
    kinds
        .get(label)
        .copied()
        .ok_or_else(|| GraphError::UnknownNode {
            label: label.to_string(),
        })
}

fn invalid_port(connection: &str, end: &PortRef) -> GraphError {
    GraphError::InvalidPort {
        connection: connection.to_string(),
        node: end.node.clone(),
        port: end.port.clone(),
    }
}

fn claim_port<'a>(
    used: &mut HashMap<(&'a str, &'a str), &'a str>,
    end: &'a PortRef,
    label: &'a str,
) -> GraphResult<()> {
    if let Some(first) = used.insert((end.node.as_str(), end.port.as_str()), label) {
        return Err(GraphError::PortInUse {
            node: end.node.clone(),
            port: end.port.clone(),
            first: first.to_string(),
            second: label.to_string(),
        });
    }
    Ok(())
}

fn validate_flow_values(c: &FlowConnection) -> GraphResult<()> {
    let invalid = |what, value| GraphError::InvalidSetPoint {
        owner: c.label.clone(),
        what,
        value,
    };

    if let Some(p) = c.pressure
        && (!p.value.is_finite() || p.value <= 0.0)
    {
        return Err(invalid("pressure", p.value));
    }
    if let Some(h) = c.enthalpy
        && !h.is_finite()
    {
        return Err(invalid("enthalpy", h));
    }
    if let Some(x) = c.quality
        && !(0.0..=1.0).contains(&x)
    {
        return Err(invalid("vapor quality", x));
    }
    match &c.mass_flow {
        Spec::Fixed(m) if !m.value.is_finite() => return Err(invalid("mass flow", m.value)),
        Spec::Ref { factor, offset, .. } if !factor.is_finite() || !offset.value.is_finite() => {
            return Err(invalid("mass flow reference factor", *factor));
        }
        _ => {}
    }
    match &c.temperature {
        Spec::Fixed(t) if !t.value.is_finite() || t.value <= 0.0 => {
            return Err(invalid("temperature", t.value));
        }
        Spec::Ref { factor, offset, .. } if !factor.is_finite() || !offset.value.is_finite() => {
            return Err(invalid("temperature reference factor", *factor));
        }
        _ => {}
    }
    Ok(())
}

/// Every referential constraint points at another existing fluid connection.
pub(crate) fn validate_references(connections: &[FlowConnection]) -> GraphResult<()> {
    let labels: HashSet<&str> = connections.iter().map(|c| c.label.as_str()).collect();
    for c in connections {
        for reference in c.references() {
            if reference == c.label {
                return Err(GraphError::SelfReference {
                    connection: c.label.clone(),
                });
            }
            if !labels.contains(reference) {
                return Err(GraphError::DanglingReference {
                    connection: c.label.clone(),
                    reference: reference.to_string(),
                });
            }
        }
    }
    Ok(())
}
