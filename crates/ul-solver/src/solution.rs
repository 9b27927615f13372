//! Converged (or not) network state as reported by a solver.

use std::collections::HashMap;
use ul_core::units::{MassRate, Power, Pressure, Temperature};
use ul_fluids::{SpecEnthalpy, SpecEntropy};

use crate::error::{SolverError, SolverResult};

/// Phase of a stream relative to the saturation dome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VaporQuality {
    /// Liquid below saturation temperature.
    Subcooled,
    /// On or inside the dome; 0 = saturated liquid, 1 = saturated vapor.
    Saturated(f64),
    /// Vapor above saturation temperature.
    Superheated,
}

impl VaporQuality {
    /// Numeric quality if on or inside the dome.
    pub fn value(self) -> Option<f64> {
        match self {
            VaporQuality::Saturated(x) => Some(x),
            _ => None,
        }
    }

    /// Strictly between saturated liquid and saturated vapor.
    pub fn is_wet(self) -> bool {
        matches!(self, VaporQuality::Saturated(x) if x > 0.0 && x < 1.0)
    }
}

/// State of one fluid connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionState {
    pub mass_flow: MassRate,
    pub pressure: Pressure,
    pub temperature: Temperature,
    pub enthalpy: SpecEnthalpy,
    pub entropy: SpecEntropy,
    pub quality: VaporQuality,
}

/// Solver output: convergence flag plus every connection's state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Solution {
    pub converged: bool,
    pub iterations: usize,
    pub residual: f64,
    states: HashMap<String, ConnectionState>,
    power: HashMap<String, Power>,
}

impl Solution {
    pub fn new(converged: bool, iterations: usize, residual: f64) -> Self {
        Self {
            converged,
            iterations,
            residual,
            states: HashMap::new(),
            power: HashMap::new(),
        }
    }

    pub fn insert_state(&mut self, label: impl Into<String>, state: ConnectionState) {
        self.states.insert(label.into(), state);
    }

    pub fn insert_power(&mut self, label: impl Into<String>, power: Power) {
        self.power.insert(label.into(), power);
    }

    pub fn state(&self, label: &str) -> SolverResult<&ConnectionState> {
        self.states.get(label).ok_or_else(|| SolverError::MissingState {
            label: label.to_string(),
        })
    }

    /// Signed power on a power connection.
    pub fn power(&self, label: &str) -> SolverResult<Power> {
        self.power
            .get(label)
            .copied()
            .ok_or_else(|| SolverError::MissingPower {
                label: label.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ul_core::units::{bar, degc, kgps, w};

    fn state() -> ConnectionState {
        ConnectionState {
            mass_flow: kgps(0.5),
            pressure: bar(16.0),
            temperature: degc(201.4),
            enthalpy: 2.79e6,
            entropy: 6.42e3,
            quality: VaporQuality::Saturated(1.0),
        }
    }

    #[test]
    fn lookups_report_missing_labels() {
        let mut sol = Solution::new(true, 7, 1e-9);
        sol.insert_state("exhaust", state());
        sol.insert_power("e_grid", w(-4.0e4));

        assert_eq!(sol.state("exhaust").unwrap().pressure, bar(16.0));
        assert_eq!(sol.power("e_grid").unwrap(), w(-4.0e4));
        assert!(matches!(
            sol.state("nope"),
            Err(SolverError::MissingState { .. })
        ));
        assert!(matches!(
            sol.power("nope"),
            Err(SolverError::MissingPower { .. })
        ));
    }

    #[test]
    fn quality_classification() {
        assert!(VaporQuality::Saturated(0.4).is_wet());
        assert!(!VaporQuality::Saturated(1.0).is_wet());
        assert!(!VaporQuality::Saturated(0.0).is_wet());
        assert!(!VaporQuality::Superheated.is_wet());
        assert_eq!(VaporQuality::Subcooled.value(), None);
    }
}
