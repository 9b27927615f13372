//! Float guards shared by parameter validation and result extraction.

use crate::UlError;

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, UlError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(UlError::NonFinite { what, value: v })
    }
}

/// Finite and `>= 0`.
pub fn ensure_non_negative(v: f64, what: &'static str) -> Result<f64, UlError> {
    let v = ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(UlError::Negative { what, value: v });
    }
    Ok(v)
}

/// Finite and inside `[min, max]`.
pub fn ensure_in_range(v: f64, min: f64, max: f64, what: &'static str) -> Result<f64, UlError> {
    let v = ensure_finite(v, what)?;
    if v < min || v > max {
        return Err(UlError::OutOfRange {
            what,
            value: v,
            min,
            max,
        });
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(f64::NAN, "test").unwrap_err();
        assert!(format!("{err}").contains("Non-finite"));
    }

    #[test]
    fn ensure_non_negative_rejects_negative() {
        assert!(ensure_non_negative(0.0, "zero").is_ok());
        assert!(matches!(
            ensure_non_negative(-1e-3, "flow"),
            Err(UlError::Negative { .. })
        ));
        assert!(matches!(
            ensure_non_negative(f64::INFINITY, "flow"),
            Err(UlError::NonFinite { .. })
        ));
    }

    #[test]
    fn ensure_in_range_bounds_are_inclusive() {
        assert!(ensure_in_range(0.0, 0.0, 1.0, "x").is_ok());
        assert!(ensure_in_range(1.0, 0.0, 1.0, "x").is_ok());
        assert!(ensure_in_range(1.0 + 1e-9, 0.0, 1.0, "x").is_err());
    }

    proptest! {
        #[test]
        fn in_range_values_pass_through(v in -1e6f64..1e6) {
            prop_assert_eq!(ensure_in_range(v, -1e6, 1e6, "v"), Ok(v));
        }
    }
}
