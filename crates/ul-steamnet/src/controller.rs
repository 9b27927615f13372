//! Convergence controller: staged solves, variant selection and retries.

use tracing::{debug, info, warn};
use ul_core::units::{Power, Pressure, TempInterval, delta_k, to_bar, w};
use ul_fluids::SteamProperties;
use ul_graph::{Spec, Topology, TopologyDiff};
use ul_solver::{NetworkSolver, Solution, SolveMode, VaporQuality};

use crate::error::{SteamNetError, SteamNetResult};
use crate::labels::{conn, node};
use crate::mains::DesignPoint;
use crate::params::{ParamOverrides, SteamNetParams};
use crate::topology::{build_base, pipe_geometry, relax_makeup, restore_duty};
use crate::variant::{Variant, apply_variant, select_variant};

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOptions {
    /// Placeholder-duty retries after the first failed cycle.
    pub retry_budget: usize,
    /// Duty used to rebuild the network on a retry.
    pub placeholder_duty: Power,
    /// Make-up water temperature below the condensate return, after relaxing.
    pub makeup_offset: TempInterval,
    pub mode: SolveMode,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            retry_budget: 1,
            placeholder_duty: w(1.0e9),
            makeup_offset: delta_k(20.0),
            mode: SolveMode::Design,
        }
    }
}

/// Which solve within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolvePass {
    Base,
    RelaxedMakeup,
    Variant(Variant),
    RestoredDuty,
    Recalculation,
}

impl std::fmt::Display for SolvePass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolvePass::Base => f.write_str("base"),
            SolvePass::RelaxedMakeup => f.write_str("relaxed make-up"),
            SolvePass::Variant(v) => write!(f, "{v} variant"),
            SolvePass::RestoredDuty => f.write_str("restored duty"),
            SolvePass::Recalculation => f.write_str("recalculation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    DesignPoint {
        needed_pressure: Pressure,
        main_pressure: Pressure,
        feasible: bool,
    },
    AttemptStarted {
        attempt: usize,
        placeholder: bool,
    },
    PassFinished {
        attempt: usize,
        pass: SolvePass,
        converged: bool,
        iterations: usize,
    },
    VariantSelected {
        variant: Variant,
        quality: VaporQuality,
    },
    AttemptFailed {
        attempt: usize,
        reason: String,
    },
    Converged {
        attempts: usize,
        variant: Variant,
    },
}

/// A converged topology together with everything needed to recalculate it.
///
/// Only the controller creates these, so a recalculation always starts from
/// a state that actually converged.
#[derive(Debug, Clone)]
pub struct ConvergedNetwork {
    topology: Topology,
    solution: Solution,
    variant: Variant,
    design: DesignPoint,
    params: SteamNetParams,
    attempts: usize,
}

impl ConvergedNetwork {
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn design(&self) -> &DesignPoint {
        &self.design
    }

    pub fn params(&self) -> &SteamNetParams {
        &self.params
    }

    /// Solve cycles it took to converge.
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

enum Pass {
    Converged(Solution),
    Failed(String),
}

/// A converged cycle, or the reason the attempt failed.
type CycleOutcome = Result<(Topology, Solution, Variant), String>;

fn emit(events: &mut Option<&mut dyn FnMut(ControllerEvent)>, event: ControllerEvent) {
    if let Some(cb) = events.as_deref_mut() {
        cb(event);
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConvergenceController {
    options: ControllerOptions,
}

impl ConvergenceController {
    pub fn new(options: ControllerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Build and converge the network from scratch.
    ///
    /// A cycle is: base solve, relaxed make-up solve, then the selected
    /// variant. If the first cycle fails, each retry rebuilds with the
    /// placeholder duty, restores the real duty on the exchanger and solves
    /// once more. Topology errors abort immediately; solver errors and
    /// non-convergence consume the budget.
    pub fn solve(
        &self,
        params: &SteamNetParams,
        props: &dyn SteamProperties,
        solver: &mut dyn NetworkSolver,
        mut events: Option<&mut dyn FnMut(ControllerEvent)>,
    ) -> SteamNetResult<ConvergedNetwork> {
        let design = DesignPoint::compute(params, props)?;
        info!(
            needed_bar = to_bar(design.needed_pressure),
            main_bar = to_bar(design.main_pressure()),
            solver = solver.name(),
            "solving steam network"
        );
        emit(
            &mut events,
            ControllerEvent::DesignPoint {
                needed_pressure: design.needed_pressure,
                main_pressure: design.main_pressure(),
                feasible: design.main.feasible,
            },
        );

        let total = 1 + self.options.retry_budget;
        let mut last_reason = String::new();
        for attempt in 1..=total {
            let placeholder = attempt > 1;
            emit(
                &mut events,
                ControllerEvent::AttemptStarted {
                    attempt,
                    placeholder,
                },
            );
            let outcome = if placeholder {
                self.placeholder_cycle(params, &design, solver, attempt, &mut events)?
            } else {
                self.cycle(params, &design, params.heat_duty(), solver, attempt, &mut events)?
            };
            match outcome {
                Ok((topology, solution, variant)) => {
                    info!(attempt, %variant, "steam network converged");
                    emit(
                        &mut events,
                        ControllerEvent::Converged {
                            attempts: attempt,
                            variant,
                        },
                    );
                    return Ok(ConvergedNetwork {
                        topology,
                        solution,
                        variant,
                        design,
                        params: params.clone(),
                        attempts: attempt,
                    });
                }
                Err(reason) => {
                    warn!(attempt, %reason, "steam network attempt failed");
                    emit(
                        &mut events,
                        ControllerEvent::AttemptFailed {
                            attempt,
                            reason: reason.clone(),
                        },
                    );
                    last_reason = reason;
                }
            }
        }

        Err(SteamNetError::SolveFailure {
            attempts: total,
            last_reason,
        })
    }

    /// Re-solve `network` with new set-points, without rebuilding.
    ///
    /// On failure the caller still holds `network`, which stays the valid
    /// rollback point.
    pub fn recalculate(
        &self,
        network: &ConvergedNetwork,
        overrides: &ParamOverrides,
        props: &dyn SteamProperties,
        solver: &mut dyn NetworkSolver,
        mut events: Option<&mut dyn FnMut(ControllerEvent)>,
    ) -> SteamNetResult<ConvergedNetwork> {
        let params = network.params.with_overrides(overrides);
        let design = DesignPoint::compute(&params, props)?;
        let diff = set_point_diff(&params, &design, network.variant);
        let topology = network.topology.apply(&diff)?;
        debug!(edits = diff.edits().len(), "recalculating steam network");

        match self.pass(
            solver,
            &topology,
            SolvePass::Recalculation,
            network.attempts,
            &mut events,
        ) {
            Pass::Converged(solution) => Ok(ConvergedNetwork {
                topology,
                solution,
                variant: network.variant,
                design,
                params,
                attempts: network.attempts,
            }),
            Pass::Failed(reason) => {
                warn!(%reason, "recalculation failed, keeping last converged state");
                Err(SteamNetError::RecalculationFailed { reason })
            }
        }
    }

    fn pass(
        &self,
        solver: &mut dyn NetworkSolver,
        topology: &Topology,
        pass: SolvePass,
        attempt: usize,
        events: &mut Option<&mut dyn FnMut(ControllerEvent)>,
    ) -> Pass {
        match solver.solve(topology, self.options.mode) {
            Ok(solution) => {
                debug!(
                    attempt,
                    %pass,
                    converged = solution.converged,
                    iterations = solution.iterations,
                    residual = solution.residual,
                    "solve pass finished"
                );
                emit(
                    events,
                    ControllerEvent::PassFinished {
                        attempt,
                        pass,
                        converged: solution.converged,
                        iterations: solution.iterations,
                    },
                );
                if solution.converged {
                    Pass::Converged(solution)
                } else {
                    Pass::Failed(format!(
                        "{pass} solve did not converge after {} iterations",
                        solution.iterations
                    ))
                }
            }
            Err(e) => Pass::Failed(format!("{pass} solve failed: {e}")),
        }
    }

    /// One build-and-solve cycle. The outer `Result` carries fatal errors.
    fn cycle(
        &self,
        params: &SteamNetParams,
        design: &DesignPoint,
        duty: Power,
        solver: &mut dyn NetworkSolver,
        attempt: usize,
        events: &mut Option<&mut dyn FnMut(ControllerEvent)>,
    ) -> SteamNetResult<CycleOutcome> {
        let base = build_base(params, design, duty)?;
        if let Pass::Failed(reason) = self.pass(solver, &base, SolvePass::Base, attempt, events) {
            return Ok(Err(reason));
        }

        let relaxed = base.apply(&relax_makeup(self.options.makeup_offset))?;
        let solution =
            match self.pass(solver, &relaxed, SolvePass::RelaxedMakeup, attempt, events) {
                Pass::Converged(s) => s,
                Pass::Failed(reason) => return Ok(Err(reason)),
            };

        let quality = solution.state(conn::PIPE_OUTLET)?.quality;
        let variant = select_variant(quality, params.desuperheat);
        emit(events, ControllerEvent::VariantSelected { variant, quality });
        if variant == Variant::Base {
            return Ok(Ok((relaxed, solution, variant)));
        }

        let modified = apply_variant(&relaxed, variant, params, design)?;
        match self.pass(solver, &modified, SolvePass::Variant(variant), attempt, events) {
            Pass::Converged(s) => Ok(Ok((modified, s, variant))),
            Pass::Failed(reason) => Ok(Err(reason)),
        }
    }

    fn placeholder_cycle(
        &self,
        params: &SteamNetParams,
        design: &DesignPoint,
        solver: &mut dyn NetworkSolver,
        attempt: usize,
        events: &mut Option<&mut dyn FnMut(ControllerEvent)>,
    ) -> SteamNetResult<CycleOutcome> {
        let built = self.cycle(
            params,
            design,
            self.options.placeholder_duty,
            solver,
            attempt,
            events,
        )?;
        let (topology, variant) = match built {
            Ok((topology, _, variant)) => (topology, variant),
            Err(reason) => return Ok(Err(reason)),
        };
        let restored = topology.apply(&restore_duty(params.heat_duty()))?;
        match self.pass(solver, &restored, SolvePass::RestoredDuty, attempt, events) {
            Pass::Converged(s) => Ok(Ok((restored, s, variant))),
            Pass::Failed(reason) => Ok(Err(reason)),
        }
    }
}

/// Set-point edits that carry `params` onto an existing topology of `variant`.
pub fn set_point_diff(
    params: &SteamNetParams,
    design: &DesignPoint,
    variant: Variant,
) -> TopologyDiff {
    let geometry = pipe_geometry(params);
    let ambient = Spec::Fixed(params.ambient_temperature());
    let ratio = |reference: &str, factor: f64| Spec::Ref {
        reference: reference.to_string(),
        factor,
        offset: ul_core::units::kgps(0.0),
    };

    let mut diff = TopologyDiff::new()
        .set_pipe(node::STEAM_PIPE, geometry.clone())
        .set_pipe(node::CONDENSATE_PIPE, geometry)
        .set_duty(node::HEAT_EXCHANGER, -params.heat_duty())
        .set_mass_flow(conn::LEAK, ratio(conn::PIPE_OUTLET, params.leakage_factor))
        .set_mass_flow(conn::MAKEUP, ratio(conn::LIVE_STEAM, params.makeup_factor))
        .set_mass_flow(conn::BLOWDOWN, ratio(conn::LIVE_STEAM, params.makeup_factor))
        .set_temperature(conn::LEAK_MAKEUP, ambient.clone())
        .set_pressure(conn::DELIVERY, Some(design.needed_pressure))
        .set_pressure(conn::EXHAUST, Some(design.main_pressure()));
    if variant == Variant::Trap {
        diff = diff.set_temperature(conn::TRAP_MAKEUP, ambient);
    }
    diff
}
