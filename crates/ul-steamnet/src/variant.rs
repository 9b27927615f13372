//! Structural variants chosen from the steam state at the point of use.

use serde::{Deserialize, Serialize};
use ul_core::units::kgps;
use ul_graph::{
    FlowConnection, NodeKind, PortRef, ProcessNode, Spec, Topology, TopologyDiff,
};
use ul_solver::VaporQuality;

use crate::error::SteamNetResult;
use crate::labels::{conn, node};
use crate::mains::DesignPoint;
use crate::params::SteamNetParams;
use crate::topology::WATER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// No modification.
    #[default]
    Base,
    /// Saturated condensate is mixed into the throttled steam so it reaches
    /// the exchanger as saturated vapor.
    Injection,
    /// Wet steam passes a phase separator; only the vapor reaches the valve.
    Trap,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Base => "base",
            Variant::Injection => "injection",
            Variant::Trap => "trap",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the variant from the quality of the steam leaving the distribution
/// pipe.
///
/// Wet steam always gets a trap. Saturated or out-of-dome steam gets
/// condensate injection when `desuperheat` is on. Anything else, including a
/// non-finite quality, keeps the base circuit.
pub fn select_variant(quality: VaporQuality, desuperheat: bool) -> Variant {
    match quality {
        VaporQuality::Saturated(x) if x > 0.0 && x < 1.0 => Variant::Trap,
        VaporQuality::Saturated(x) if (x == 0.0 || x == 1.0) && desuperheat => {
            Variant::Injection
        }
        VaporQuality::Subcooled | VaporQuality::Superheated if desuperheat => Variant::Injection,
        _ => Variant::Base,
    }
}

fn port(node: &str, port: &str) -> PortRef {
    PortRef::new(node, port)
}

/// Mix injected condensate into the delivery steam and divert the surplus.
pub fn injection_diff(design: &DesignPoint) -> TopologyDiff {
    TopologyDiff::new()
        .remove_connection(conn::DELIVERY)
        .remove_connection(conn::CONDENSATE)
        .add_node(ProcessNode::new(
            node::INJECTION_MERGE,
            NodeKind::Merge { inlets: 2 },
        ))
        .add_node(ProcessNode::new(node::INJECTION_SOURCE, NodeKind::Source))
        .add_node(ProcessNode::new(
            node::CONDENSATE_SPLIT,
            NodeKind::Splitter { outlets: 2 },
        ))
        .add_node(ProcessNode::new(node::INJECTION_DUMMY_SINK, NodeKind::Sink))
        .add_connection(
            FlowConnection::new(
                conn::DELIVERY,
                port(node::CONTROL_VALVE, "out1"),
                port(node::INJECTION_MERGE, "in1"),
            )
            .with_pressure(design.needed_pressure),
        )
        .add_connection(
            FlowConnection::new(
                conn::INJECTION,
                port(node::INJECTION_SOURCE, "out1"),
                port(node::INJECTION_MERGE, "in2"),
            )
            .with_quality(0.0)
            .with_fluid(WATER),
        )
        .add_connection(
            FlowConnection::new(
                conn::INJECTED_STEAM,
                port(node::INJECTION_MERGE, "out1"),
                port(node::HEAT_EXCHANGER, "in1"),
            )
            .with_quality(1.0),
        )
        .add_connection(
            FlowConnection::new(
                conn::SPENT_CONDENSATE,
                port(node::HEAT_EXCHANGER, "out1"),
                port(node::CONDENSATE_SPLIT, "in1"),
            )
            .with_quality(0.0),
        )
        .add_connection(
            FlowConnection::new(
                conn::CONDENSATE,
                port(node::CONDENSATE_SPLIT, "out1"),
                port(node::CONDENSATE_PIPE, "in1"),
            )
            .with_mass_flow(Spec::Ref {
                reference: conn::DELIVERY.to_string(),
                factor: 1.0,
                offset: kgps(0.0),
            }),
        )
        .add_connection(FlowConnection::new(
            conn::SURPLUS_CONDENSATE,
            port(node::CONDENSATE_SPLIT, "out2"),
            port(node::INJECTION_DUMMY_SINK, "in1"),
        ))
}

/// Separate condensate after the leak split and replace it with make-up water.
pub fn trap_diff(params: &SteamNetParams) -> TopologyDiff {
    TopologyDiff::new()
        .set_kind(node::MAKEUP_MERGE, NodeKind::Merge { inlets: 4 })
        .remove_connection(conn::TO_VALVE)
        .add_node(ProcessNode::new(
            node::CONDENSATE_TRAP,
            NodeKind::PhaseSeparator,
        ))
        .add_node(ProcessNode::new(node::TRAP_WASTE_SINK, NodeKind::Sink))
        .add_node(ProcessNode::new(node::TRAP_MAKEUP_SOURCE, NodeKind::Source))
        .add_connection(FlowConnection::new(
            conn::TO_TRAP,
            port(node::LEAK_SPLIT, "out1"),
            port(node::CONDENSATE_TRAP, "in1"),
        ))
        .add_connection(FlowConnection::new(
            conn::TRAP_VAPOR,
            port(node::CONDENSATE_TRAP, "out2"),
            port(node::CONTROL_VALVE, "in1"),
        ))
        .add_connection(FlowConnection::new(
            conn::TRAP_WASTE,
            port(node::CONDENSATE_TRAP, "out1"),
            port(node::TRAP_WASTE_SINK, "in1"),
        ))
        .add_connection(
            FlowConnection::new(
                conn::TRAP_MAKEUP,
                port(node::TRAP_MAKEUP_SOURCE, "out1"),
                port(node::MAKEUP_MERGE, "in4"),
            )
            .with_mass_flow(Spec::Ref {
                reference: conn::TRAP_WASTE.to_string(),
                factor: 1.0,
                offset: kgps(0.0),
            })
            .with_temperature(Spec::Fixed(params.ambient_temperature()))
            .with_fluid(WATER),
        )
}

/// Produce the variant topology from a converged base topology.
pub fn apply_variant(
    base: &Topology,
    variant: Variant,
    params: &SteamNetParams,
    design: &DesignPoint,
) -> SteamNetResult<Topology> {
    let diff = match variant {
        Variant::Base => return Ok(base.clone()),
        Variant::Injection => injection_diff(design),
        Variant::Trap => trap_diff(params),
    };
    Ok(base.apply(&diff)?)
}

/// Connection leaving the leak split towards the consumer in `variant`.
pub fn leak_split_outlet(variant: Variant) -> &'static str {
    match variant {
        Variant::Trap => conn::TO_TRAP,
        _ => conn::TO_VALVE,
    }
}

/// Connections across the point-of-use exchanger, inlet then outlet.
pub fn exchanger_streams(variant: Variant) -> (&'static str, &'static str) {
    match variant {
        Variant::Injection => (conn::INJECTED_STEAM, conn::SPENT_CONDENSATE),
        _ => (conn::DELIVERY, conn::CONDENSATE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wet_steam_is_trapped_regardless_of_injection() {
        for desuperheat in [true, false] {
            assert_eq!(
                select_variant(VaporQuality::Saturated(0.97), desuperheat),
                Variant::Trap
            );
        }
    }

    #[test]
    fn dome_boundaries_inject_never_trap() {
        for q in [
            VaporQuality::Saturated(0.0),
            VaporQuality::Saturated(1.0),
            VaporQuality::Superheated,
            VaporQuality::Subcooled,
        ] {
            assert_eq!(select_variant(q, true), Variant::Injection, "{q:?}");
            assert_eq!(select_variant(q, false), Variant::Base, "{q:?}");
        }
    }

    #[test]
    fn non_finite_quality_keeps_base() {
        assert_eq!(
            select_variant(VaporQuality::Saturated(f64::NAN), true),
            Variant::Base
        );
    }

    #[test]
    fn stream_lookups_follow_variant() {
        assert_eq!(leak_split_outlet(Variant::Trap), conn::TO_TRAP);
        assert_eq!(leak_split_outlet(Variant::Base), conn::TO_VALVE);
        assert_eq!(
            exchanger_streams(Variant::Injection),
            (conn::INJECTED_STEAM, conn::SPENT_CONDENSATE)
        );
    }
}
