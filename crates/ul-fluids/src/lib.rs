//! ul-fluids: water/steam property queries for the steam network.
//!
//! Provides:
//! - `SteamProperties`, the property collaborator the topology builder
//!   and result extractor depend on
//! - `CoolPropSteam`, a CoolProp backend (via `rfluids`)
//!
//! The rest of the workspace never talks to CoolProp directly, so a
//! table-based or IF97 backend can be dropped in behind the same trait.
//!
//! # Example
//!
//! ```no_run
//! use ul_core::units::degc;
//! use ul_fluids::{CoolPropSteam, SteamProperties};
//!
//! let water = CoolPropSteam::new();
//! let p_sat = water.saturation_pressure(degc(200.0)).unwrap();
//! println!("p_sat(200 °C) = {} Pa", p_sat.value);
//! ```

pub mod coolprop;
pub mod error;
pub mod model;

pub use coolprop::CoolPropSteam;
pub use error::{FluidError, FluidResult};
pub use model::{SpecEnthalpy, SpecEntropy, SteamProperties};
