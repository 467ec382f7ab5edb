use crate::{PfError, PfResult};

/// Floating point type used throughout system
pub type Real = f64;

/// Absolute and relative tolerance pair.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> PfResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PfError::NonFinite { what, value: v })
    }
}

/// Relative deviation `|value - target| / |target|`.
///
/// Fails for a zero or non-finite target, where the ratio has no meaning.
pub fn relative_error(value: Real, target: Real) -> PfResult<Real> {
    if target == 0.0 || !target.is_finite() {
        return Err(PfError::BadReference {
            what: "relative error",
            value: target,
        });
    }
    ensure_finite(((value - target) / target).abs(), "relative error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn relative_error_basic() {
        assert!((relative_error(1001.0, 1000.0).unwrap() - 1e-3).abs() < 1e-12);
        assert!((relative_error(999.0, 1000.0).unwrap() - 1e-3).abs() < 1e-12);
        assert!(matches!(
            relative_error(1.0, 0.0),
            Err(PfError::BadReference { .. })
        ));
    }

    proptest! {
        #[test]
        fn nearly_equal_is_symmetric(a in -1e6_f64..1e6, b in -1e6_f64..1e6) {
            let tol = Tolerances::default();
            prop_assert_eq!(nearly_equal(a, b, tol), nearly_equal(b, a, tol));
        }
    }
}
