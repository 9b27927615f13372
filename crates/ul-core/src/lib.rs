//! ul-core: shared foundation for the utility-network LCA workspace.
//!
//! Contains:
//! - units (uom SI types + engineering-unit constructors)
//! - numeric (float guards)
//! - ids (compact indices for topology lookups)
//! - error (shared error type)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{UlError, UlResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
