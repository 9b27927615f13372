//! Base steam/condensate circuit.
//!
//! boiler -> back-pressure turbine -> steam pipe -> leak split -> control
//! valve -> point-of-use exchanger -> condensate pipe -> blowdown split ->
//! make-up merge -> feed pump -> cycle closer, with leak, blowdown and
//! make-up side streams and a power side-graph.

use ul_core::units::{MassRate, Power, TempInterval, constants::p_atm, kgps, m, to_bar};
use ul_graph::{
    FlowConnection, Guess, NodeKind, PipeGeometry, PortRef, PowerConnection, ProcessNode, Spec,
    TemperatureSpec, Topology, TopologyBuilder, TopologyDiff,
};

use crate::error::SteamNetResult;
use crate::labels::{conn, node, power};
use crate::mains::DesignPoint;
use crate::params::SteamNetParams;

pub const TURBINE_EFFICIENCY: f64 = 0.85;
pub const PUMP_EFFICIENCY: f64 = 0.95;
pub const GENERATOR_EFFICIENCY: f64 = 0.9;
pub const PIPE_PRESSURE_RATIO: f64 = 0.95;
/// Pipe wall roughness [m].
pub const PIPE_ROUGHNESS_M: f64 = 4.57e-5;
pub const PIPE_WALL_THICKNESS_M: f64 = 0.004;
/// Insulation conductivity [W/(m·K)].
pub const INSULATION_CONDUCTIVITY: f64 = 0.035;
pub const PIPE_MATERIAL: &str = "Steel";
pub const WATER: &str = "H2O";
/// Rough latent heat used to seed mass-flow guesses [J/kg].
const GUESS_LATENT_HEAT: f64 = 2.7e6;

/// Geometry and surroundings shared by the steam and condensate pipes.
pub fn pipe_geometry(params: &SteamNetParams) -> PipeGeometry {
    PipeGeometry {
        length: params.pipe_length(),
        roughness: m(PIPE_ROUGHNESS_M),
        wall_thickness: m(PIPE_WALL_THICKNESS_M),
        insulation_thickness: params.insulation_thickness(),
        insulation_conductivity: INSULATION_CONDUCTIVITY,
        material: PIPE_MATERIAL.to_string(),
        ambient_temperature: params.ambient_temperature(),
        wind_velocity: params.wind_velocity(),
        medium: params.environment_medium,
    }
}

fn ratio_of(reference: &str, factor: f64) -> Spec<MassRate> {
    Spec::Ref {
        reference: reference.to_string(),
        factor,
        offset: kgps(0.0),
    }
}

fn port(node: &str, port: &str) -> PortRef {
    PortRef::new(node, port)
}

/// Assemble the base circuit with `duty` removed at the point of use.
pub fn build_base(
    params: &SteamNetParams,
    design: &DesignPoint,
    duty: Power,
) -> SteamNetResult<Topology> {
    let geometry = pipe_geometry(params);
    let h_boiler = design.boiler_enthalpy;
    let main = design.main_pressure();
    let m_guess = kgps(duty.value.abs() / GUESS_LATENT_HEAT);
    let steam_guess = Guess {
        mass_flow: Some(m_guess),
        pressure: None,
        enthalpy: Some(h_boiler),
    };

    let mut b = TopologyBuilder::new();

    b.add_node(ProcessNode::new(node::CYCLE_CLOSER, NodeKind::CycleCloser));
    b.add_node(ProcessNode::new(node::BOILER, NodeKind::HeatExchanger).with_pressure_ratio(1.0));
    b.add_node(
        ProcessNode::new(node::TURBINE, NodeKind::Turbine).with_efficiency(TURBINE_EFFICIENCY),
    );
    b.add_node(
        ProcessNode::new(node::STEAM_PIPE, NodeKind::Pipe)
            .with_pressure_ratio(PIPE_PRESSURE_RATIO)
            .with_pipe(geometry.clone()),
    );
    b.add_node(ProcessNode::new(node::LEAK_SPLIT, NodeKind::Splitter { outlets: 2 }));
    b.add_node(ProcessNode::new(node::CONTROL_VALVE, NodeKind::Valve));
    b.add_node(
        ProcessNode::new(node::HEAT_EXCHANGER, NodeKind::HeatExchanger)
            .with_pressure_ratio(1.0)
            .with_duty(-duty),
    );
    b.add_node(
        ProcessNode::new(node::CONDENSATE_PIPE, NodeKind::Pipe)
            .with_pressure_ratio(PIPE_PRESSURE_RATIO)
            .with_pipe(geometry),
    );
    b.add_node(ProcessNode::new(node::BLOWDOWN_SPLIT, NodeKind::Splitter { outlets: 2 }));
    b.add_node(ProcessNode::new(node::MAKEUP_MERGE, NodeKind::Merge { inlets: 3 }));
    b.add_node(
        ProcessNode::new(node::FEED_PUMP, NodeKind::Pump).with_efficiency(PUMP_EFFICIENCY),
    );
    b.add_node(ProcessNode::new(node::STEAM_LOSSES, NodeKind::Sink));
    b.add_node(ProcessNode::new(node::LEAK_MAKEUP_SOURCE, NodeKind::Source));
    b.add_node(ProcessNode::new(node::MAKEUP_SOURCE, NodeKind::Source));
    b.add_node(ProcessNode::new(node::BLOWDOWN_SINK, NodeKind::Sink));

    // Main loop
    b.connect(
        FlowConnection::new(
            conn::FEED,
            port(node::CYCLE_CLOSER, "out1"),
            port(node::BOILER, "in1"),
        )
        .with_guess(Guess {
            mass_flow: Some(m_guess),
            pressure: Some(main),
            enthalpy: None,
        }),
    );
    b.connect(
        FlowConnection::new(
            conn::LIVE_STEAM,
            port(node::BOILER, "out1"),
            port(node::TURBINE, "in1"),
        )
        .with_enthalpy(h_boiler)
        .with_fluid(WATER),
    );
    b.connect(
        FlowConnection::new(
            conn::EXHAUST,
            port(node::TURBINE, "out1"),
            port(node::STEAM_PIPE, "in1"),
        )
        .with_pressure(main)
        .with_guess(steam_guess.clone()),
    );
    b.connect(FlowConnection::new(
        conn::PIPE_OUTLET,
        port(node::STEAM_PIPE, "out1"),
        port(node::LEAK_SPLIT, "in1"),
    ));
    b.connect(FlowConnection::new(
        conn::TO_VALVE,
        port(node::LEAK_SPLIT, "out1"),
        port(node::CONTROL_VALVE, "in1"),
    ));
    b.connect(
        FlowConnection::new(
            conn::DELIVERY,
            port(node::CONTROL_VALVE, "out1"),
            port(node::HEAT_EXCHANGER, "in1"),
        )
        .with_pressure(design.needed_pressure)
        .with_guess(steam_guess.clone()),
    );
    b.connect(
        FlowConnection::new(
            conn::CONDENSATE,
            port(node::HEAT_EXCHANGER, "out1"),
            port(node::CONDENSATE_PIPE, "in1"),
        )
        .with_quality(0.0)
        .with_guess(Guess {
            mass_flow: Some(m_guess),
            pressure: Some(design.needed_pressure),
            enthalpy: None,
        }),
    );
    b.connect(FlowConnection::new(
        conn::RETURN,
        port(node::CONDENSATE_PIPE, "out1"),
        port(node::BLOWDOWN_SPLIT, "in1"),
    ));
    b.connect(FlowConnection::new(
        conn::RECYCLE,
        port(node::BLOWDOWN_SPLIT, "out1"),
        port(node::MAKEUP_MERGE, "in1"),
    ));
    b.connect(
        FlowConnection::new(
            conn::PUMP_IN,
            port(node::MAKEUP_MERGE, "out1"),
            port(node::FEED_PUMP, "in1"),
        )
        .with_guess(Guess {
            mass_flow: Some(m_guess),
            pressure: Some(design.needed_pressure),
            enthalpy: None,
        }),
    );
    b.connect(
        FlowConnection::new(
            conn::PUMP_OUT,
            port(node::FEED_PUMP, "out1"),
            port(node::CYCLE_CLOSER, "in1"),
        )
        .with_pressure(params.max_pressure())
        .with_guess(steam_guess),
    );

    // Side streams
    let ambient: TemperatureSpec = Spec::Fixed(params.ambient_temperature());
    let atmospheric = Guess {
        mass_flow: None,
        pressure: Some(p_atm()),
        enthalpy: None,
    };
    b.connect(
        FlowConnection::new(
            conn::LEAK,
            port(node::LEAK_SPLIT, "out2"),
            port(node::STEAM_LOSSES, "in1"),
        )
        .with_mass_flow(ratio_of(conn::PIPE_OUTLET, params.leakage_factor)),
    );
    b.connect(
        FlowConnection::new(
            conn::BLOWDOWN,
            port(node::BLOWDOWN_SPLIT, "out2"),
            port(node::BLOWDOWN_SINK, "in1"),
        )
        .with_mass_flow(ratio_of(conn::LIVE_STEAM, params.makeup_factor)),
    );
    b.connect(
        FlowConnection::new(
            conn::MAKEUP,
            port(node::MAKEUP_SOURCE, "out1"),
            port(node::MAKEUP_MERGE, "in2"),
        )
        .with_mass_flow(ratio_of(conn::LIVE_STEAM, params.makeup_factor))
        .with_temperature(ambient.clone())
        .with_fluid(WATER)
        .with_guess(atmospheric.clone()),
    );
    b.connect(
        FlowConnection::new(
            conn::LEAK_MAKEUP,
            port(node::LEAK_MAKEUP_SOURCE, "out1"),
            port(node::MAKEUP_MERGE, "in3"),
        )
        .with_mass_flow(ratio_of(conn::LEAK, 1.0))
        .with_temperature(ambient)
        .with_fluid(WATER)
        .with_guess(atmospheric),
    );

    // Power side-graph
    b.add_node(ProcessNode::new(node::BOILER_SOURCE, NodeKind::PowerSource));
    b.add_node(
        ProcessNode::new(node::GENERATOR, NodeKind::Generator)
            .with_efficiency(GENERATOR_EFFICIENCY),
    );
    b.add_node(ProcessNode::new(node::GRID, NodeKind::PowerSink));
    b.add_node(ProcessNode::new(
        node::PIPE_LOSS_BUS,
        NodeKind::PowerBus {
            inputs: 2,
            outputs: 1,
        },
    ));
    b.add_node(ProcessNode::new(node::PIPE_LOSS_SINK, NodeKind::PowerSink));
    b.add_node(ProcessNode::new(node::HEAT_SINK, NodeKind::PowerSink));
    b.add_node(ProcessNode::new(node::PUMP_SOURCE, NodeKind::PowerSource));

    let energy = [
        (power::BOILER, (node::BOILER_SOURCE, "power"), (node::BOILER, "heat")),
        (power::TURBINE, (node::TURBINE, "power"), (node::GENERATOR, "power_in")),
        (power::GRID, (node::GENERATOR, "power_out"), (node::GRID, "power")),
        (power::PIPE_STEAM, (node::STEAM_PIPE, "heat"), (node::PIPE_LOSS_BUS, "power_in1")),
        (
            power::PIPE_CONDENSATE,
            (node::CONDENSATE_PIPE, "heat"),
            (node::PIPE_LOSS_BUS, "power_in2"),
        ),
        (
            power::PIPE_LOSSES,
            (node::PIPE_LOSS_BUS, "power_out1"),
            (node::PIPE_LOSS_SINK, "power"),
        ),
        (power::HEAT_SINK, (node::HEAT_EXCHANGER, "heat"), (node::HEAT_SINK, "power")),
        (power::PUMP, (node::PUMP_SOURCE, "power"), (node::FEED_PUMP, "power")),
    ];
    for (label, (from_node, from_port), (to_node, to_port)) in energy {
        b.connect_power(PowerConnection::new(
            label,
            port(from_node, from_port),
            port(to_node, to_port),
        ));
    }

    let topology = b.build()?;
    tracing::debug!(
        main_bar = to_bar(main),
        needed_bar = to_bar(design.needed_pressure),
        duty_w = duty.value,
        "built base steam network"
    );
    Ok(topology)
}

/// Switch make-up water from ambient temperature to `return - offset`.
pub fn relax_makeup(offset: TempInterval) -> TopologyDiff {
    TopologyDiff::new().set_temperature(
        conn::MAKEUP,
        Spec::Ref {
            reference: conn::RETURN.to_string(),
            factor: 1.0,
            offset: -offset,
        },
    )
}

/// Restore the real point-of-use duty on a network built with a placeholder.
pub fn restore_duty(duty: Power) -> TopologyDiff {
    TopologyDiff::new().set_duty(node::HEAT_EXCHANGER, -duty)
}

/// Duty currently set at the point of use, as a positive heat demand.
pub fn point_of_use_duty(topology: &Topology) -> Option<Power> {
    topology
        .node(node::HEAT_EXCHANGER)
        .and_then(|n| n.set_points.duty)
        .map(|d| -d)
}
