//! ul-lca: flow-to-impact allocation.
//!
//! Contains:
//! - edge (technosphere/biosphere edges between a process model and datasets)
//! - units (unit registry and amount resolution)
//! - backend (background impact engine seam + static score tables)
//! - engine (aggregation and allocation across functional edges)
//! - basis (credit and by-exergy allocation policies)
//! - model (the interface a process model exposes to the engine)

pub mod backend;
pub mod basis;
pub mod edge;
pub mod engine;
pub mod error;
pub mod model;
pub mod units;

pub use backend::{DemandSet, ImpactBackend, ImpactCategory, ScoreTable, StaticScoreBackend};
pub use basis::{AllocationBasis, CoProducts};
pub use edge::{DatasetRef, EdgeAmount, EdgeKind, EdgeSet, Endpoint, FlowEdge};
pub use engine::{ImpactEngine, ImpactReport};
pub use error::{ConfigurationError, LcaError, LcaResult};
pub use model::ProcessModel;
pub use units::{
    Dimension, Resolution, ResolutionPath, UnitDef, UnitResolutionWarning, convert, lookup,
    resolve,
};
