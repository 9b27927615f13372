//! Build models from scenario files.

use std::path::Path;

use ul_fluids::SteamProperties;
use ul_lca::StaticScoreBackend;
use ul_project::Scenario;
use ul_solver::NetworkSolver;

use crate::edges::LcaLinks;
use crate::error::{AppError, AppResult};
use crate::model::SteamNetModel;
use crate::sweep::SweepRequest;

pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    Ok(ul_project::load(path)?)
}

pub fn links(scenario: &Scenario) -> LcaLinks {
    LcaLinks {
        heat: scenario.lca.heat_dataset.clone(),
        electricity: scenario.lca.electricity_dataset.clone(),
        water_treatment: scenario.lca.water_treatment_dataset.clone(),
        dataset_correction: scenario.lca.dataset_correction,
    }
}

/// Score table named by the scenario, resolved against `base_dir`.
pub fn load_scores(scenario: &Scenario, base_dir: &Path) -> AppResult<Option<StaticScoreBackend>> {
    let Some(scores) = &scenario.lca.scores else {
        return Ok(None);
    };
    let path = base_dir.join(scores);
    StaticScoreBackend::load(&path)
        .map(Some)
        .map_err(|source| AppError::ScoreTable { path, source })
}

/// An initialized model for `scenario`. The score table, when the scenario
/// names one, becomes the model's background engine.
pub fn build_model(
    scenario: &Scenario,
    base_dir: &Path,
    props: impl SteamProperties + 'static,
    solver: impl NetworkSolver + Send + 'static,
) -> AppResult<SteamNetModel> {
    let mut model = SteamNetModel::new(&scenario.name, props, solver)
        .with_controller(scenario.controller.options())
        .with_links(links(scenario));
    if let Some(backend) = load_scores(scenario, base_dir)? {
        model = model.with_backend(backend);
    }
    model.initialize(scenario.params.clone())?;
    Ok(model)
}

/// Sweep requests declared by the scenario.
pub fn sweep_requests(scenario: &Scenario) -> Vec<SweepRequest> {
    scenario
        .sweeps
        .iter()
        .map(|sweep| SweepRequest {
            parameter: sweep.parameter,
            values: sweep.values.clone(),
            categories: scenario.lca.categories.clone(),
            basis: scenario.lca.basis,
        })
        .collect()
}
