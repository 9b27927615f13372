//! Node and connection labels of the steam network.
//!
//! The result extractor and the recalculation diff address the network by
//! these labels, so they are shared constants rather than literals.

pub mod node {
    pub const CYCLE_CLOSER: &str = "cycle_closer";
    pub const BOILER: &str = "boiler";
    pub const TURBINE: &str = "turbine";
    pub const STEAM_PIPE: &str = "steam_pipe";
    pub const LEAK_SPLIT: &str = "leak_split";
    pub const CONTROL_VALVE: &str = "control_valve";
    pub const HEAT_EXCHANGER: &str = "heat_exchanger";
    pub const CONDENSATE_PIPE: &str = "condensate_pipe";
    pub const BLOWDOWN_SPLIT: &str = "blowdown_split";
    pub const MAKEUP_MERGE: &str = "makeup_merge";
    pub const FEED_PUMP: &str = "feed_pump";
    pub const STEAM_LOSSES: &str = "steam_losses";
    pub const LEAK_MAKEUP_SOURCE: &str = "leak_makeup_source";
    pub const MAKEUP_SOURCE: &str = "makeup_source";
    pub const BLOWDOWN_SINK: &str = "blowdown_sink";

    pub const BOILER_SOURCE: &str = "boiler_source";
    pub const GENERATOR: &str = "generator";
    pub const GRID: &str = "grid";
    pub const PIPE_LOSS_BUS: &str = "pipe_loss_bus";
    pub const PIPE_LOSS_SINK: &str = "pipe_loss_sink";
    pub const HEAT_SINK: &str = "heat_sink";
    pub const PUMP_SOURCE: &str = "pump_source";

    // injection
    pub const INJECTION_MERGE: &str = "injection_merge";
    pub const INJECTION_SOURCE: &str = "injection_source";
    pub const CONDENSATE_SPLIT: &str = "condensate_split";
    pub const INJECTION_DUMMY_SINK: &str = "injection_dummy_sink";

    // trap
    pub const CONDENSATE_TRAP: &str = "condensate_trap";
    pub const TRAP_WASTE_SINK: &str = "trap_waste_sink";
    pub const TRAP_MAKEUP_SOURCE: &str = "trap_makeup_source";
}

pub mod conn {
    pub const FEED: &str = "feed";
    pub const LIVE_STEAM: &str = "live_steam";
    pub const EXHAUST: &str = "exhaust";
    pub const PIPE_OUTLET: &str = "pipe_outlet";
    pub const TO_VALVE: &str = "to_valve";
    pub const LEAK: &str = "leak";
    pub const DELIVERY: &str = "delivery";
    pub const CONDENSATE: &str = "condensate";
    pub const RETURN: &str = "return";
    pub const RECYCLE: &str = "recycle";
    pub const BLOWDOWN: &str = "blowdown";
    pub const MAKEUP: &str = "makeup";
    pub const LEAK_MAKEUP: &str = "leak_makeup";
    pub const PUMP_IN: &str = "pump_in";
    pub const PUMP_OUT: &str = "pump_out";

    // injection
    pub const INJECTION: &str = "injection";
    pub const INJECTED_STEAM: &str = "injected_steam";
    pub const SPENT_CONDENSATE: &str = "spent_condensate";
    pub const SURPLUS_CONDENSATE: &str = "surplus_condensate";

    // trap
    pub const TO_TRAP: &str = "to_trap";
    pub const TRAP_VAPOR: &str = "trap_vapor";
    pub const TRAP_WASTE: &str = "trap_waste";
    pub const TRAP_MAKEUP: &str = "trap_makeup";
}

pub mod power {
    pub const BOILER: &str = "e_boiler";
    pub const TURBINE: &str = "e_turbine";
    pub const GRID: &str = "e_grid";
    pub const PIPE_STEAM: &str = "e_pipe_steam";
    pub const PIPE_CONDENSATE: &str = "e_pipe_condensate";
    pub const PIPE_LOSSES: &str = "e_pipe_losses";
    pub const HEAT_SINK: &str = "e_heat_sink";
    pub const PUMP: &str = "e_pump";
}
