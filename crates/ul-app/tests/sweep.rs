//! Parallel sensitivity sweeps.

mod common;

use std::path::Path;

use common::*;
use ul_app::scenario_service::{build_model, links, load_scenario, sweep_requests};
use ul_app::{AppError, Stage, SteamNetModel, SweepRequest, run_sweep};
use ul_lca::{AllocationBasis, ImpactCategory};
use ul_solver::ScriptedSolver;
use ul_steamnet::SweepParameter;

fn request(values: Vec<f64>) -> SweepRequest {
    SweepRequest {
        parameter: SweepParameter::LeakageFactor,
        values,
        categories: vec![ImpactCategory::new("gwp")],
        basis: AllocationBasis::Credit,
    }
}

#[test]
fn sweep_keeps_value_order_and_allocates_every_point() {
    let values = vec![0.0, 0.025, 0.05, 0.075, 0.1, 0.125];
    let points = run_sweep(|| Ok(model(converged(64))), &request(values.clone()));

    assert_eq!(points.len(), values.len());
    for (point, value) in points.iter().zip(&values) {
        assert_eq!(point.value, *value);
        assert_eq!(point.parameter, SweepParameter::LeakageFactor);
        let report = point.report.as_ref().unwrap();
        assert!((report.boiler_factor - 1.3).abs() < 1e-12);
        assert!(point.impact.as_ref().unwrap().contains_key("gwp"));
    }
}

#[test]
fn failing_points_yield_none() {
    let points = run_sweep(
        || {
            let mut model =
                SteamNetModel::new("m", TableSteam, ScriptedSolver::default()).with_links(common::links());
            model.initialize(params())?;
            Ok(model)
        },
        &request(vec![0.05, 0.1]),
    );
    assert_eq!(points.len(), 2);
    assert!(points.iter().all(|p| p.report.is_none() && p.impact.is_none()));
}

#[test]
fn factory_errors_yield_none() {
    let points = run_sweep(
        || Err(AppError::InvalidInput("no solver".to_string())),
        &request(vec![0.05]),
    );
    assert_eq!(points[0].report, None);
}

#[test]
fn sweep_without_categories_skips_allocation() {
    let mut req = request(vec![0.05]);
    req.categories.clear();
    let points = run_sweep(|| Ok(model(converged(8))), &req);
    assert!(points[0].report.is_some());
    assert!(points[0].impact.is_none());
}


fn demo_root() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/scenarios")
}

#[test]
fn demo_scenario_builds_a_linked_model() {
    let root = demo_root();
    let scenario = load_scenario(&root.join("steam_200c.yaml")).unwrap();
    let model = build_model(&scenario, &root, TableSteam, ScriptedSolver::default()).unwrap();

    assert_eq!(model.name(), scenario.name);
    assert_eq!(model.stage(), Stage::Parameterized);
    assert_eq!(model.links(), &links(&scenario));
    assert!(model.links().water_treatment.is_some());

    let requests = sweep_requests(&scenario);
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].parameter, SweepParameter::AmbientTemperature);
    assert_eq!(requests[0].categories.len(), 2);
}

#[test]
fn missing_score_table_is_reported() {
    let root = demo_root();
    let mut scenario = load_scenario(&root.join("steam_200c.yaml")).unwrap();
    scenario.lca.scores = Some("missing.yaml".into());
    let err = build_model(&scenario, &root, TableSteam, ScriptedSolver::default()).unwrap_err();
    assert!(matches!(err, AppError::ScoreTable { .. }), "{err}");
}
