//! Controller, variant and extraction tests against a scripted solver.

use std::collections::HashMap;
use ul_core::units::{Pressure, Temperature, bar, degc, kgps, to_bar, to_degc, w};
use ul_fluids::{FluidResult, SpecEnthalpy, SpecEntropy, SteamProperties};
use ul_graph::{NodeKind, Spec};
use ul_solver::{ConnectionState, ScriptedSolver, Solution, Step, VaporQuality};
use ul_steamnet::labels::{conn, node, power};
use ul_steamnet::{
    ControllerEvent, ControllerOptions, ConvergenceController, ParamOverrides, SolvePass,
    SteamNetError, SteamNetParams, Variant, extract,
};

/// Antoine fit above 100 °C plus a crude latent-heat model.
struct TableSteam;

const ANTOINE: (f64, f64, f64) = (8.14019, 1810.94, 244.485);
const MMHG: f64 = 133.322;
const LATENT: f64 = 2.0e6;
const CP: f64 = 4180.0;

impl SteamProperties for TableSteam {
    fn name(&self) -> &str {
        "table"
    }

    fn saturation_pressure(&self, t: Temperature) -> FluidResult<Pressure> {
        let (a, b, c) = ANTOINE;
        let mmhg = 10f64.powf(a - b / (to_degc(t) + c));
        Ok(bar(mmhg * MMHG / 1e5))
    }

    fn saturation_temperature(&self, p: Pressure) -> FluidResult<Temperature> {
        let (a, b, c) = ANTOINE;
        let mmhg = to_bar(p) * 1e5 / MMHG;
        Ok(degc(b / (a - mmhg.log10()) - c))
    }

    fn saturated_enthalpy(&self, p: Pressure, quality: f64) -> FluidResult<SpecEnthalpy> {
        let t = to_degc(self.saturation_temperature(p)?);
        Ok(CP * t + quality * LATENT)
    }

    fn saturated_entropy(&self, p: Pressure, quality: f64) -> FluidResult<SpecEntropy> {
        let t = self.saturation_temperature(p)?.value;
        Ok(CP * (t / 273.15).ln() + quality * LATENT / t)
    }

    fn enthalpy_ps(&self, p: Pressure, s: SpecEntropy) -> FluidResult<SpecEnthalpy> {
        Ok(2.8e6 + 1.0e3 * to_bar(p) + 10.0 * (s - 6.0e3))
    }
}

fn params(desuperheat: bool) -> SteamNetParams {
    SteamNetParams {
        delivery_temperature_c: 200.0,
        heat_duty_w: 1.0e6,
        desuperheat,
        ..Default::default()
    }
}

/// (m, h, s) per connection label.
fn stream_table() -> HashMap<&'static str, (f64, f64, f64)> {
    HashMap::from([
        (conn::FEED, (0.5, 0.45e6, 1.4e3)),
        (conn::LIVE_STEAM, (0.5, 3.2e6, 6.5e3)),
        (conn::EXHAUST, (0.5, 2.9e6, 6.6e3)),
        (conn::PIPE_OUTLET, (0.5, 2.85e6, 6.6e3)),
        (conn::TO_VALVE, (0.45, 2.85e6, 6.6e3)),
        (conn::TO_TRAP, (0.45, 2.85e6, 6.6e3)),
        (conn::LEAK, (0.03, 2.85e6, 6.6e3)),
        (conn::DELIVERY, (0.45, 2.85e6, 6.6e3)),
        (conn::CONDENSATE, (0.45, 0.85e6, 2.3e3)),
        (conn::RETURN, (0.45, 0.80e6, 2.2e3)),
        (conn::RECYCLE, (0.425, 0.80e6, 2.2e3)),
        (conn::BLOWDOWN, (0.025, 0.80e6, 2.2e3)),
        (conn::MAKEUP, (0.025, 84.0e3, 0.3e3)),
        (conn::LEAK_MAKEUP, (0.03, 84.0e3, 0.3e3)),
        (conn::PUMP_IN, (0.5, 0.42e6, 1.3e3)),
        (conn::PUMP_OUT, (0.5, 0.45e6, 1.3e3)),
        (conn::INJECTION, (0.05, 0.85e6, 2.3e3)),
        (conn::INJECTED_STEAM, (0.5, 2.79e6, 6.4e3)),
        (conn::SPENT_CONDENSATE, (0.5, 0.85e6, 2.3e3)),
        (conn::SURPLUS_CONDENSATE, (0.05, 0.85e6, 2.3e3)),
        (conn::TRAP_VAPOR, (0.44, 2.8e6, 6.5e3)),
        (conn::TRAP_WASTE, (0.01, 0.85e6, 2.3e3)),
        (conn::TRAP_MAKEUP, (0.01, 84.0e3, 0.3e3)),
    ])
}

const Q_HEAT: f64 = -1.0e6;
const Q_BOILER: f64 = 1.3e6;
const P_GRID: f64 = 1.2e5;
const P_PUMP: f64 = 1.5e4;

/// A converged solution whose distribution pipe delivers `quality`.
fn solution(quality: VaporQuality) -> Solution {
    let mut sol = Solution::new(true, 12, 1e-10);
    for (label, (m, h, s)) in stream_table() {
        let q = if label == conn::PIPE_OUTLET {
            quality
        } else {
            VaporQuality::Subcooled
        };
        sol.insert_state(
            label,
            ConnectionState {
                mass_flow: kgps(m),
                pressure: bar(16.0),
                temperature: degc(200.0),
                enthalpy: h,
                entropy: s,
                quality: q,
            },
        );
    }
    sol.insert_power(power::HEAT_SINK, w(Q_HEAT));
    sol.insert_power(power::BOILER, w(Q_BOILER));
    sol.insert_power(power::GRID, w(P_GRID));
    sol.insert_power(power::PUMP, w(P_PUMP));
    sol.insert_power(power::TURBINE, w(P_GRID / 0.9));
    sol
}

fn converged(quality: VaporQuality, calls: usize) -> Vec<Step> {
    (0..calls)
        .map(|_| Step::Converged(solution(quality)))
        .collect()
}

#[test]
fn superheated_without_injection_keeps_base() {
    let mut solver = ScriptedSolver::new(converged(VaporQuality::Superheated, 2));
    let mut events = Vec::new();
    let mut sink = |e: ControllerEvent| events.push(e);

    let net = ConvergenceController::default()
        .solve(&params(false), &TableSteam, &mut solver, Some(&mut sink))
        .unwrap();

    assert_eq!(net.variant(), Variant::Base);
    assert_eq!(net.attempts(), 1);
    assert_eq!(solver.calls(), 2);

    // first pass: make-up at ambient; second: tied to the condensate return
    let first = &solver.seen()[0].0;
    assert_eq!(
        first.connection(conn::MAKEUP).unwrap().temperature,
        Spec::Fixed(degc(20.0))
    );
    let relaxed = net.topology().connection(conn::MAKEUP).unwrap();
    assert_eq!(relaxed.temperature.reference(), Some(conn::RETURN));

    assert!(matches!(
        events.first(),
        Some(ControllerEvent::DesignPoint { feasible: true, .. })
    ));
    assert!(matches!(
        events.last(),
        Some(ControllerEvent::Converged {
            attempts: 1,
            variant: Variant::Base
        })
    ));
}

#[test]
fn base_topology_follows_design_point() {
    let mut solver = ScriptedSolver::new(converged(VaporQuality::Superheated, 2));
    let net = ConvergenceController::default()
        .solve(&params(false), &TableSteam, &mut solver, None)
        .unwrap();

    let design = net.design();
    assert!((to_bar(design.needed_pressure) - 15.5).abs() < 0.1);
    assert_eq!(to_bar(design.main_pressure()), 16.0);

    let topo = net.topology();
    assert_eq!(topo.connection(conn::EXHAUST).unwrap().pressure, Some(bar(16.0)));
    assert_eq!(
        topo.connection(conn::DELIVERY).unwrap().pressure,
        Some(design.needed_pressure)
    );
    assert_eq!(
        topo.connection(conn::PUMP_OUT).unwrap().pressure,
        Some(bar(100.0))
    );
    assert_eq!(
        topo.node(node::HEAT_EXCHANGER).unwrap().set_points.duty,
        Some(w(-1.0e6))
    );
    assert_eq!(
        topo.connection(conn::LEAK).unwrap().mass_flow,
        Spec::Ref {
            reference: conn::PIPE_OUTLET.into(),
            factor: 0.075,
            offset: kgps(0.0)
        }
    );
    for label in [conn::MAKEUP, conn::BLOWDOWN] {
        assert_eq!(
            topo.connection(label).unwrap().mass_flow.reference(),
            Some(conn::LIVE_STEAM)
        );
    }
    assert_eq!(topo.power_connections().len(), 8);
}

#[test]
fn dry_steam_with_injection_inserts_desuperheater() {
    for quality in [VaporQuality::Saturated(1.0), VaporQuality::Superheated] {
        let mut solver = ScriptedSolver::new(converged(quality, 3));
        let net = ConvergenceController::default()
            .solve(&params(true), &TableSteam, &mut solver, None)
            .unwrap();

        assert_eq!(net.variant(), Variant::Injection);
        assert_eq!(solver.calls(), 3);
        let topo = net.topology();
        assert!(topo.node(node::INJECTION_MERGE).is_some());
        assert_eq!(
            topo.inlet(node::HEAT_EXCHANGER, "in1").unwrap().label,
            conn::INJECTED_STEAM
        );
        assert_eq!(
            topo.connection(conn::CONDENSATE).unwrap().mass_flow.reference(),
            Some(conn::DELIVERY)
        );
        assert!(topo.node(node::CONDENSATE_TRAP).is_none());
    }
}

#[test]
fn wet_steam_is_trapped() {
    let mut solver = ScriptedSolver::new(converged(VaporQuality::Saturated(0.96), 3));
    let net = ConvergenceController::default()
        .solve(&params(true), &TableSteam, &mut solver, None)
        .unwrap();

    assert_eq!(net.variant(), Variant::Trap);
    let topo = net.topology();
    assert_eq!(
        topo.node(node::MAKEUP_MERGE).unwrap().kind,
        NodeKind::Merge { inlets: 4 }
    );
    assert!(!topo.has_connection(conn::TO_VALVE));
    assert_eq!(
        topo.inlet(node::CONTROL_VALVE, "in1").unwrap().label,
        conn::TRAP_VAPOR
    );
    assert_eq!(
        topo.connection(conn::TRAP_MAKEUP).unwrap().mass_flow.reference(),
        Some(conn::TRAP_WASTE)
    );
    assert!(topo.node(node::INJECTION_MERGE).is_none());
}

#[test]
fn retry_uses_placeholder_then_restores_duty() {
    let mut steps = vec![Step::NotConverged];
    steps.extend(converged(VaporQuality::Superheated, 3));
    let mut solver = ScriptedSolver::new(steps);
    let mut passes = Vec::new();
    let mut sink = |e: ControllerEvent| {
        if let ControllerEvent::PassFinished { attempt, pass, .. } = e {
            passes.push((attempt, pass));
        }
    };

    let net = ConvergenceController::default()
        .solve(&params(false), &TableSteam, &mut solver, Some(&mut sink))
        .unwrap();

    assert_eq!(net.attempts(), 2);
    assert_eq!(solver.calls(), 4);
    let duty = |i: usize| {
        solver.seen()[i]
            .0
            .node(node::HEAT_EXCHANGER)
            .unwrap()
            .set_points
            .duty
    };
    assert_eq!(duty(0), Some(w(-1.0e6)));
    assert_eq!(duty(1), Some(w(-1.0e9)));
    assert_eq!(duty(3), Some(w(-1.0e6)));
    assert_eq!(
        net.topology().node(node::HEAT_EXCHANGER).unwrap().set_points.duty,
        Some(w(-1.0e6))
    );
    assert_eq!(
        passes,
        vec![
            (1, SolvePass::Base),
            (2, SolvePass::Base),
            (2, SolvePass::RelaxedMakeup),
            (2, SolvePass::RestoredDuty),
        ]
    );
}

#[test]
fn exhausted_budget_reports_solve_failure() {
    let mut solver = ScriptedSolver::new([
        Step::Fail("singular jacobian".into()),
        Step::NotConverged,
    ]);
    let err = ConvergenceController::default()
        .solve(&params(true), &TableSteam, &mut solver, None)
        .unwrap_err();
    match err {
        SteamNetError::SolveFailure {
            attempts,
            last_reason,
        } => {
            assert_eq!(attempts, 2);
            assert!(last_reason.contains("did not converge"), "{last_reason}");
        }
        other => panic!("expected SolveFailure, got {other:?}"),
    }
    assert_eq!(solver.calls(), 2);
}

#[test]
fn zero_budget_fails_after_one_cycle() {
    let mut solver = ScriptedSolver::new([Step::NotConverged, Step::NotConverged]);
    let controller = ConvergenceController::new(ControllerOptions {
        retry_budget: 0,
        ..Default::default()
    });
    let err = controller
        .solve(&params(true), &TableSteam, &mut solver, None)
        .unwrap_err();
    assert!(matches!(err, SteamNetError::SolveFailure { attempts: 1, .. }));
    assert_eq!(solver.calls(), 1);
    assert_eq!(solver.remaining(), 1);
}

#[test]
fn invalid_params_fail_before_solving() {
    let mut solver = ScriptedSolver::default();
    let bad = SteamNetParams {
        makeup_factor: 2.0,
        ..params(true)
    };
    let err = ConvergenceController::default()
        .solve(&bad, &TableSteam, &mut solver, None)
        .unwrap_err();
    assert!(matches!(
        err,
        SteamNetError::Params {
            field: "makeup_factor",
            ..
        }
    ));
    assert_eq!(solver.calls(), 0);
}

#[test]
fn recalculation_edits_set_points_only() {
    let controller = ConvergenceController::default();
    let mut solver = ScriptedSolver::new(converged(VaporQuality::Saturated(0.95), 4));
    let net = controller
        .solve(&params(true), &TableSteam, &mut solver, None)
        .unwrap();
    assert_eq!(net.variant(), Variant::Trap);

    let overrides = ParamOverrides {
        makeup_factor: Some(0.1),
        pipe_length_m: Some(500.0),
        ambient_temperature_c: Some(5.0),
        ..Default::default()
    };
    let updated = controller
        .recalculate(&net, &overrides, &TableSteam, &mut solver, None)
        .unwrap();

    assert_eq!(solver.calls(), 4);
    assert_eq!(updated.variant(), Variant::Trap);
    assert_eq!(updated.params().makeup_factor, 0.1);
    let topo = updated.topology();
    assert_eq!(topo.nodes().len(), net.topology().nodes().len());
    for label in [conn::MAKEUP, conn::BLOWDOWN] {
        match &topo.connection(label).unwrap().mass_flow {
            Spec::Ref { factor, .. } => assert_eq!(*factor, 0.1),
            other => panic!("{label}: {other:?}"),
        }
    }
    let pipe = topo
        .node(node::STEAM_PIPE)
        .unwrap()
        .set_points
        .pipe
        .clone()
        .unwrap();
    assert_eq!(pipe.length.value, 500.0);
    assert_eq!(pipe.ambient_temperature, degc(5.0));
    assert_eq!(
        topo.connection(conn::TRAP_MAKEUP).unwrap().temperature,
        Spec::Fixed(degc(5.0))
    );
    // relaxed make-up temperature survives recalculation
    assert_eq!(
        topo.connection(conn::MAKEUP).unwrap().temperature.reference(),
        Some(conn::RETURN)
    );
}

#[test]
fn failed_recalculation_keeps_snapshot() {
    let controller = ConvergenceController::default();
    let mut solver = ScriptedSolver::new(converged(VaporQuality::Superheated, 2));
    let net = controller
        .solve(&params(false), &TableSteam, &mut solver, None)
        .unwrap();

    solver.push(Step::NotConverged);
    let overrides = ParamOverrides {
        heat_duty_w: Some(2.0e6),
        ..Default::default()
    };
    let err = controller
        .recalculate(&net, &overrides, &TableSteam, &mut solver, None)
        .unwrap_err();
    assert!(matches!(err, SteamNetError::RecalculationFailed { .. }));
    assert_eq!(net.params().heat_duty_w, 1.0e6);
    assert_eq!(
        net.topology().node(node::HEAT_EXCHANGER).unwrap().set_points.duty,
        Some(w(-1.0e6))
    );
}

#[test]
fn extraction_matches_hand_calculation() {
    let mut solver = ScriptedSolver::new(converged(VaporQuality::Superheated, 2));
    let net = ConvergenceController::default()
        .solve(&params(false), &TableSteam, &mut solver, None)
        .unwrap();
    let r = extract(&net).unwrap();
    let t = stream_table();

    let (m_leak, h_leak, _) = t[conn::LEAK];
    let (_, h_lm, _) = t[conn::LEAK_MAKEUP];
    let (m_v, h_v, _) = t[conn::TO_VALVE];
    let (_, h_ex, _) = t[conn::EXHAUST];
    let leakage = m_leak * (h_leak - h_lm);
    let pipe = m_v * (h_ex - h_v);

    let (m_in, h_in, s_in) = t[conn::DELIVERY];
    let (_, h_out, s_out) = t[conn::CONDENSATE];
    let e_hs = m_in * ((h_in - h_out) - 293.15 * (s_in - s_out));

    assert_eq!(r.variant, Variant::Base);
    assert!((r.elec_factor - 0.12).abs() < 1e-12);
    assert!((r.boiler_factor - 1.3).abs() < 1e-12);
    assert!(r.boiler_factor > 1.0);
    assert!((r.water_treatment_factor - 0.025 / 1.0e6).abs() < 1e-18);
    assert!((r.loss_fraction - (leakage + pipe) / 1.0e6).abs() < 1e-12);
    assert!((r.heat_exergy.value - e_hs).abs() < 1e-6);
    assert!((r.alloc_ex - e_hs / (e_hs + P_GRID)).abs() < 1e-12);
    assert!((0.0..=1.0).contains(&r.alloc_ex));
    assert_eq!(r.pump_power, w(P_PUMP));
}

#[test]
fn extraction_follows_injection_streams() {
    let mut solver = ScriptedSolver::new(converged(VaporQuality::Superheated, 3));
    let net = ConvergenceController::default()
        .solve(&params(true), &TableSteam, &mut solver, None)
        .unwrap();
    let r = extract(&net).unwrap();
    let t = stream_table();
    let (m_in, h_in, s_in) = t[conn::INJECTED_STEAM];
    let (_, h_out, s_out) = t[conn::SPENT_CONDENSATE];
    let e_hs = m_in * ((h_in - h_out) - 293.15 * (s_in - s_out));
    assert_eq!(r.variant, Variant::Injection);
    assert!((r.heat_exergy.value - e_hs).abs() < 1e-6);
}

#[test]
fn missing_pipe_outlet_state_is_a_solver_error() {
    let mut sol = Solution::new(true, 3, 0.0);
    sol.insert_power(power::HEAT_SINK, w(Q_HEAT));
    let mut solver = ScriptedSolver::repeating(sol, 2);
    let err = ConvergenceController::default()
        .solve(&params(true), &TableSteam, &mut solver, None)
        .unwrap_err();
    assert!(matches!(err, SteamNetError::Solver(_)));
}
