//! The steam network as a linkable process model.
//!
//! [`SteamNetModel`] owns one network's whole lifecycle: parameters, the
//! last converged snapshot, the flow edges read off it and the allocated
//! impact. Every mutation moves it along [`Stage`]; anything derived from an
//! older state is dropped on the way.

use serde::Serialize;
use tracing::{debug, info, warn};
use ul_core::units::to_bar;
use ul_export::{DatasetWriter, ExportOptions, export_datasets};
use ul_fluids::SteamProperties;
use ul_lca::{
    AllocationBasis, CoProducts, EdgeSet, ImpactBackend, ImpactCategory, ImpactEngine,
    ImpactReport, ProcessModel,
};
use ul_solver::NetworkSolver;
use ul_steamnet::{
    ControllerEvent, ControllerOptions, ConvergedNetwork, ConvergenceController, NetworkResults,
    ParamOverrides, SteamNetParams, Variant, extract,
};

use crate::edges::{DISTRIBUTED_STEAM, ELECTRICITY_SUBSTITUTION, LcaLinks, network_edges};
use crate::error::{AppError, AppResult};

/// Where a model is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "variant", rename_all = "snake_case")]
pub enum Stage {
    Uninitialized,
    Parameterized,
    Solved(Variant),
    EdgesPopulated(Variant),
    ImpactComputed(Variant),
    Exported(Variant),
}

impl Stage {
    /// Variant of the converged state this stage rests on.
    pub fn variant(self) -> Option<Variant> {
        match self {
            Stage::Uninitialized | Stage::Parameterized => None,
            Stage::Solved(v)
            | Stage::EdgesPopulated(v)
            | Stage::ImpactComputed(v)
            | Stage::Exported(v) => Some(v),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Uninitialized => f.write_str("uninitialized"),
            Stage::Parameterized => f.write_str("parameterized"),
            Stage::Solved(v) => write!(f, "solved ({v})"),
            Stage::EdgesPopulated(v) => write!(f, "edges populated ({v})"),
            Stage::ImpactComputed(v) => write!(f, "impact computed ({v})"),
            Stage::Exported(v) => write!(f, "exported ({v})"),
        }
    }
}

/// Summary of a converged solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceReport {
    pub variant: Variant,
    pub attempts: usize,
    pub needed_pressure_bar: f64,
    pub main_pressure_bar: f64,
    /// `false` when the highest main was used although it is too low.
    pub feasible: bool,
    pub boiler_factor: f64,
    pub elec_factor: f64,
    pub water_treatment_factor: f64,
    pub loss_fraction: f64,
    pub alloc_ex: f64,
}

impl ConvergenceReport {
    fn new(network: &ConvergedNetwork, results: &NetworkResults) -> Self {
        let design = network.design();
        Self {
            variant: network.variant(),
            attempts: network.attempts(),
            needed_pressure_bar: to_bar(design.needed_pressure),
            main_pressure_bar: to_bar(design.main_pressure()),
            feasible: design.main.feasible,
            boiler_factor: results.boiler_factor,
            elec_factor: results.elec_factor,
            water_treatment_factor: results.water_treatment_factor,
            loss_fraction: results.loss_fraction,
            alloc_ex: results.alloc_ex,
        }
    }
}

/// `overrides` on top of every overridable value of `current`, so that
/// changes made with `set_params` since the snapshot are not lost.
fn with_pending(current: &SteamNetParams, overrides: &ParamOverrides) -> ParamOverrides {
    ParamOverrides {
        delivery_temperature_c: overrides
            .delivery_temperature_c
            .or(Some(current.delivery_temperature_c)),
        heat_duty_w: overrides.heat_duty_w.or(Some(current.heat_duty_w)),
        leakage_factor: overrides.leakage_factor.or(Some(current.leakage_factor)),
        makeup_factor: overrides.makeup_factor.or(Some(current.makeup_factor)),
        ambient_temperature_c: overrides
            .ambient_temperature_c
            .or(Some(current.ambient_temperature_c)),
        pipe_length_m: overrides.pipe_length_m.or(Some(current.pipe_length_m)),
        insulation_thickness_m: overrides
            .insulation_thickness_m
            .or(Some(current.insulation_thickness_m)),
        wind_velocity_mps: overrides
            .wind_velocity_mps
            .or(Some(current.wind_velocity_mps)),
    }
}

/// Allocation of one (basis, categories) request.
#[derive(Debug, Clone)]
struct ImpactState {
    basis: AllocationBasis,
    categories: Vec<ImpactCategory>,
    edges: EdgeSet,
    report: ImpactReport,
}

/// Converged snapshot with everything read off it.
#[derive(Debug, Clone)]
struct SolvedState {
    network: ConvergedNetwork,
    results: NetworkResults,
}

pub struct SteamNetModel {
    name: String,
    params: Option<SteamNetParams>,
    controller: ConvergenceController,
    props: Box<dyn SteamProperties>,
    solver: Box<dyn NetworkSolver + Send>,
    links: LcaLinks,
    engine: Option<ImpactEngine>,
    solved: Option<SolvedState>,
    edges: Option<EdgeSet>,
    impact: Option<ImpactState>,
    stage: Stage,
}

impl std::fmt::Debug for SteamNetModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SteamNetModel")
            .field("name", &self.name)
            .field("stage", &self.stage)
            .field("solver", &self.solver.name())
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl SteamNetModel {
    pub fn new(
        name: impl Into<String>,
        props: impl SteamProperties + 'static,
        solver: impl NetworkSolver + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params: None,
            controller: ConvergenceController::default(),
            props: Box::new(props),
            solver: Box::new(solver),
            links: LcaLinks::default(),
            engine: None,
            solved: None,
            edges: None,
            impact: None,
            stage: Stage::Uninitialized,
        }
    }

    pub fn with_controller(mut self, options: ControllerOptions) -> Self {
        self.controller = ConvergenceController::new(options);
        self
    }

    pub fn with_links(mut self, links: LcaLinks) -> Self {
        self.set_links(links);
        self
    }

    pub fn with_backend(mut self, backend: impl ImpactBackend + Send + 'static) -> Self {
        self.engine = Some(ImpactEngine::new(backend));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn params(&self) -> Option<&SteamNetParams> {
        self.params.as_ref()
    }

    pub fn links(&self) -> &LcaLinks {
        &self.links
    }

    /// Relinking changes the edges, so they are rebuilt from the snapshot.
    pub fn set_links(&mut self, links: LcaLinks) {
        self.links = links;
        self.impact = None;
        if let Some(solved) = &self.solved
            && self.edges.is_some()
        {
            self.edges = Some(network_edges(&solved.results, &self.links));
            self.stage = Stage::EdgesPopulated(solved.network.variant());
        }
    }

    /// Results of the current converged state.
    pub fn results(&self) -> Option<&NetworkResults> {
        self.solved.as_ref().map(|s| &s.results)
    }

    pub fn snapshot(&self) -> Option<&ConvergedNetwork> {
        self.solved.as_ref().map(|s| &s.network)
    }

    pub fn edges(&self) -> Option<&EdgeSet> {
        self.edges.as_ref()
    }

    pub fn impact(&self) -> Option<&ImpactReport> {
        self.impact.as_ref().map(|i| &i.report)
    }

    /// Background requests issued so far.
    pub fn backend_requests(&self) -> usize {
        self.engine.as_ref().map_or(0, ImpactEngine::requests)
    }

    fn not_ready(&self, operation: &'static str) -> AppError {
        AppError::NotReady {
            operation,
            stage: self.stage,
        }
    }

    /// Set fresh parameters. Drops every converged state.
    pub fn initialize(&mut self, params: SteamNetParams) -> AppResult<()> {
        params.validate()?;
        self.params = Some(params);
        self.solved = None;
        self.edges = None;
        self.impact = None;
        self.stage = Stage::Parameterized;
        Ok(())
    }

    /// Change parameters without solving. The converged snapshot is kept as
    /// the rollback point; edges and impact are dropped.
    pub fn set_params(&mut self, overrides: &ParamOverrides) -> AppResult<()> {
        let Some(current) = &self.params else {
            return Err(self.not_ready("set parameters"));
        };
        let params = overrides.apply(current);
        params.validate()?;
        self.params = Some(params);
        self.edges = None;
        self.impact = None;
        self.stage = Stage::Parameterized;
        Ok(())
    }

    /// Build the network from scratch and converge it.
    pub fn solve(&mut self, overrides: &ParamOverrides) -> AppResult<ConvergenceReport> {
        self.solve_with_events(overrides, None)
    }

    pub fn solve_with_events(
        &mut self,
        overrides: &ParamOverrides,
        events: Option<&mut dyn FnMut(ControllerEvent)>,
    ) -> AppResult<ConvergenceReport> {
        let Some(current) = &self.params else {
            return Err(self.not_ready("solve"));
        };
        let params = overrides.apply(current);
        params.validate()?;

        let outcome = self.controller.solve(
            &params,
            self.props.as_ref(),
            &mut self.solver,
            events,
        );
        self.params = Some(params);
        match outcome.map_err(AppError::from).and_then(|n| self.accept(n)) {
            Ok(report) => Ok(report),
            Err(err) => {
                self.roll_back();
                Err(err)
            }
        }
    }

    /// Re-solve the converged network with new set-points.
    pub fn recalculate(&mut self, overrides: &ParamOverrides) -> AppResult<ConvergenceReport> {
        self.recalculate_with_events(overrides, None)
    }

    pub fn recalculate_with_events(
        &mut self,
        overrides: &ParamOverrides,
        events: Option<&mut dyn FnMut(ControllerEvent)>,
    ) -> AppResult<ConvergenceReport> {
        let Some(solved) = &self.solved else {
            return Err(self.not_ready("recalculate"));
        };
        let overrides = match &self.params {
            Some(current) => with_pending(current, overrides),
            None => overrides.clone(),
        };
        let outcome = self.controller.recalculate(
            &solved.network,
            &overrides,
            self.props.as_ref(),
            &mut self.solver,
            events,
        );
        match outcome.map_err(AppError::from).and_then(|n| {
            self.params = Some(n.params().clone());
            self.accept(n)
        }) {
            Ok(report) => Ok(report),
            Err(err) => {
                self.roll_back();
                Err(err)
            }
        }
    }

    /// Store a converged network and read the edges off it.
    fn accept(&mut self, network: ConvergedNetwork) -> AppResult<ConvergenceReport> {
        let results = extract(&network)?;
        let report = ConvergenceReport::new(&network, &results);
        info!(
            model = %self.name,
            variant = %report.variant,
            attempts = report.attempts,
            boiler_factor = report.boiler_factor,
            alloc_ex = report.alloc_ex,
            "steam network solved"
        );
        self.solved = Some(SolvedState { network, results });
        self.stage = Stage::Solved(report.variant);
        self.impact = None;
        self.populate_edges()?;
        Ok(report)
    }

    /// Back to the last converged state, or to nothing.
    fn roll_back(&mut self) {
        self.edges = None;
        self.impact = None;
        match &self.solved {
            Some(solved) => {
                let variant = solved.network.variant();
                warn!(model = %self.name, %variant, "solve failed, keeping last converged state");
                self.params = Some(solved.network.params().clone());
                self.stage = Stage::Solved(variant);
            }
            None => {
                warn!(model = %self.name, "solve failed without a converged state");
                self.params = None;
                self.stage = Stage::Uninitialized;
            }
        }
    }

    /// Rebuild the edges from the converged snapshot.
    pub fn populate_edges(&mut self) -> AppResult<&EdgeSet> {
        let Some(solved) = &self.solved else {
            return Err(self.not_ready("populate edges"));
        };
        let edges = network_edges(&solved.results, &self.links);
        debug!(model = %self.name, edges = edges.len(), "edges populated");
        self.stage = Stage::EdgesPopulated(solved.network.variant());
        self.impact = None;
        Ok(self.edges.insert(edges))
    }

    /// Allocated impact per category and functional edge.
    ///
    /// Repeating the same request on the same converged state returns the
    /// stored report; neither the solver nor the background is called again.
    pub fn compute_impact(
        &mut self,
        categories: &[ImpactCategory],
        basis: AllocationBasis,
    ) -> AppResult<&ImpactReport> {
        let Some(variant) = self.stage.variant() else {
            return Err(self.not_ready("compute impact"));
        };
        let cached = self
            .impact
            .as_ref()
            .is_some_and(|s| s.basis == basis && s.categories == categories);

        if !cached {
            let Some(edges) = &self.edges else {
                return Err(self.not_ready("compute impact"));
            };
            let alloc_ex = self.solved.as_ref().map_or(1.0, |s| s.results.alloc_ex);
            let products = CoProducts::new(DISTRIBUTED_STEAM, ELECTRICITY_SUBSTITUTION, alloc_ex);
            let allocated = basis.apply(edges, &products)?;
            let Some(engine) = self.engine.as_mut() else {
                return Err(AppError::InvalidInput(
                    "no background engine attached".to_string(),
                ));
            };
            let report = engine.compute(&allocated, categories)?;
            info!(model = %self.name, %basis, categories = categories.len(), "impact allocated");
            self.impact = Some(ImpactState {
                basis,
                categories: categories.to_vec(),
                edges: allocated,
                report,
            });
        }

        self.stage = Stage::ImpactComputed(variant);
        match &self.impact {
            Some(state) => Ok(&state.report),
            None => Err(self.not_ready("compute impact")),
        }
    }

    /// Write one dataset per functional edge of the last allocation.
    pub fn export(
        &mut self,
        writer: &mut dyn DatasetWriter,
        options: &ExportOptions,
    ) -> AppResult<Vec<String>> {
        let (Some(state), Some(variant)) = (&self.impact, self.stage.variant()) else {
            return Err(self.not_ready("export"));
        };
        let codes = export_datasets(writer, &self.name, &state.edges, &state.report, options)?;
        self.stage = Stage::Exported(variant);
        Ok(codes)
    }
}

impl ProcessModel for SteamNetModel {
    type Params = SteamNetParams;
    type Overrides = ParamOverrides;
    type Error = AppError;

    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, params: SteamNetParams) -> AppResult<()> {
        SteamNetModel::initialize(self, params)
    }

    fn evaluate(&mut self) -> AppResult<()> {
        self.solve(&ParamOverrides::default()).map(|_| ())
    }

    fn edges(&self) -> Option<&EdgeSet> {
        self.edges.as_ref()
    }

    fn recalculate(&mut self, overrides: ParamOverrides) -> AppResult<()> {
        SteamNetModel::recalculate(self, &overrides).map(|_| ())
    }
}
