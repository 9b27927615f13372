//! Fluid property errors.

use thiserror::Error;
use ul_core::UlError;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during steam property evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative pressure, quality outside [0, 1], ...).
    #[error("Non-physical value for {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },

    /// Query outside the backend's valid region (e.g. above the critical point).
    #[error("Value out of range for {what}")]
    OutOfRange { what: &'static str },

    /// Backend (CoolProp) error.
    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl From<FluidError> for UlError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::NonPhysical { what, .. } => UlError::InvalidArg { what },
            FluidError::OutOfRange { what } => UlError::InvalidArg { what },
            FluidError::Backend { .. } => UlError::Invariant {
                what: "steam property backend failed",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::NonPhysical {
            what: "pressure",
            value: -1.0,
        };
        assert!(err.to_string().contains("pressure"));

        let err = FluidError::Backend {
            message: "CoolProp failed".into(),
        };
        assert!(err.to_string().contains("CoolProp"));
    }

    #[test]
    fn error_to_ul_error() {
        let ul: UlError = FluidError::OutOfRange { what: "quality" }.into();
        assert!(matches!(ul, UlError::InvalidArg { what: "quality" }));
    }
}
