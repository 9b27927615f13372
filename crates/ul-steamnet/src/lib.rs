//! ul-steamnet: steam/condensate utility network.
//!
//! Builds the network topology from operating targets, drives the solver
//! through staged passes with variant selection and retries, and derives
//! the per-unit-of-heat factors used for impact allocation.
//!
//! # Example
//!
//! ```no_run
//! use ul_fluids::CoolPropSteam;
//! use ul_solver::ScriptedSolver;
//! use ul_steamnet::{ConvergenceController, SteamNetParams, extract};
//!
//! let params = SteamNetParams {
//!     delivery_temperature_c: 200.0,
//!     ..Default::default()
//! };
//! let mut solver = ScriptedSolver::default();
//! let network = ConvergenceController::default()
//!     .solve(&params, &CoolPropSteam::new(), &mut solver, None)
//!     .unwrap();
//! let results = extract(&network).unwrap();
//! println!("boiler factor: {}", results.boiler_factor);
//! ```

pub mod controller;
pub mod error;
pub mod extract;
pub mod labels;
pub mod mains;
pub mod params;
pub mod topology;
pub mod variant;

pub use controller::{
    ControllerEvent, ControllerOptions, ConvergedNetwork, ConvergenceController, SolvePass,
};
pub use error::{SteamNetError, SteamNetResult};
pub use extract::{NetworkResults, extract};
pub use mains::{DesignPoint, MainReport, MainSelection, MainsLadder};
pub use params::{ParamOverrides, SteamNetParams, SweepParameter};
pub use topology::build_base;
pub use variant::{Variant, select_variant};
