//! ul-app: programmatic entry point for steam network LCA.
//!
//! [`SteamNetModel`] ties the convergence controller, the result extractor
//! and the allocation engine into one stateful model; [`run_sweep`] evaluates
//! many of them in parallel.

pub mod edges;
pub mod error;
pub mod model;
pub mod scenario_service;
pub mod sweep;

pub use edges::{LcaLinks, network_edges};
pub use error::{AppError, AppResult};
pub use model::{ConvergenceReport, Stage, SteamNetModel};
pub use scenario_service::{build_model, load_scenario, sweep_requests};
pub use sweep::{SweepPoint, SweepRequest, run_sweep};
