//! Bounded scalar Newton solver with finite-difference derivative.

use crate::error::SolverError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Step length schedule applied to the raw Newton step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepDamping {
    /// Undamped Newton step.
    Full,
    /// `λₖ = (1 + k) / (k + lag)` for 0-based iteration `k`; ramps towards 1.
    Ramp { lag: usize },
}

impl StepDamping {
    pub fn factor(&self, iteration: usize) -> f64 {
        match *self {
            StepDamping::Full => 1.0,
            StepDamping::Ramp { lag } => (1.0 + iteration as f64) / (iteration + lag) as f64,
        }
    }
}

/// Newton solver configuration.
///
/// Convergence is declared when `|f(x)| * residual_scale < tolerance`. The
/// two factors are kept separate so either can be tuned without changing the
/// meaning of the other.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonConfig {
    /// Maximum number of Newton updates
    pub max_iterations: usize,
    /// Updates always performed before convergence is accepted
    pub min_iterations: usize,
    /// Forward-difference step for df/dx
    pub derivative_step: f64,
    /// |df/dx| below this is treated as singular
    pub singular_derivative: f64,
    /// Multiplier applied to |f| before comparing with `tolerance`
    pub residual_scale: f64,
    /// Convergence threshold on the scaled residual
    pub tolerance: f64,
    /// Lower clamp for x
    pub lower_bound: f64,
    /// Upper clamp for x
    pub upper_bound: f64,
    /// Step damping schedule
    pub damping: StepDamping,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            min_iterations: 3,
            derivative_step: 10.0,
            singular_derivative: 1e-8,
            residual_scale: 100.0,
            tolerance: 1e-3,
            lower_bound: 1000.0,
            upper_bound: 9000.0,
            damping: StepDamping::Ramp { lag: 5 },
        }
    }
}

impl NewtonConfig {
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.lower_bound.is_finite() && self.upper_bound.is_finite())
            || self.lower_bound > self.upper_bound
        {
            return Err(SolverError::InvalidConfig {
                what: "bounds must be finite with lower <= upper",
            });
        }
        if !(self.derivative_step.is_finite() && self.derivative_step > 0.0) {
            return Err(SolverError::InvalidConfig {
                what: "derivative step must be positive",
            });
        }
        if !(self.tolerance > 0.0 && self.residual_scale > 0.0) {
            return Err(SolverError::InvalidConfig {
                what: "tolerance and residual scale must be positive",
            });
        }
        if let StepDamping::Ramp { lag } = self.damping
            && lag == 0
        {
            return Err(SolverError::InvalidConfig {
                what: "ramp damping lag must be at least 1",
            });
        }
        Ok(())
    }

    fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.lower_bound, self.upper_bound)
    }

    fn is_converged(&self, residual: f64) -> bool {
        residual.abs() * self.residual_scale < self.tolerance
    }
}

/// Terminal state of a Newton solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NewtonStatus {
    Converged,
    IterationLimitReached,
}

/// Newton iteration result.
///
/// `residual` is always evaluated at `x`, whatever the status.
#[derive(Clone, Debug, PartialEq)]
pub struct NewtonResult {
    pub x: f64,
    pub residual: f64,
    pub iterations: usize,
    pub status: NewtonStatus,
}

impl NewtonResult {
    pub fn converged(&self) -> bool {
        self.status == NewtonStatus::Converged
    }
}

/// Solve `f(x) = 0` for scalar `x` within `[lower_bound, upper_bound]`.
///
/// Each iteration estimates `df/dx` by a forward difference of
/// `derivative_step`. A near-zero derivative perturbs `x` by one
/// derivative step instead of dividing. The iterate is clamped to the bounds
/// after every update and iteration continues from the clamped value.
///
/// Errors from the residual closure propagate unchanged; a non-finite
/// residual is reported as [`SolverError::NonFinite`].
pub fn solve_scalar<F, E>(x0: f64, config: &NewtonConfig, mut residual: F) -> Result<NewtonResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<SolverError>,
{
    config.validate()?;
    if !x0.is_finite() {
        return Err(SolverError::NonFinite {
            what: "initial guess",
            x: x0,
        }
        .into());
    }

    let mut eval = |x: f64| -> Result<f64, E> {
        let f = residual(x)?;
        if f.is_finite() {
            Ok(f)
        } else {
            Err(SolverError::NonFinite { what: "residual", x }.into())
        }
    };

    let h = config.derivative_step;
    let mut x = config.clamp(x0);
    let mut iterations = 0;

    loop {
        let f = eval(x)?;
        let converged = config.is_converged(f);

        if converged && iterations >= config.min_iterations {
            return Ok(NewtonResult {
                x,
                residual: f,
                iterations,
                status: NewtonStatus::Converged,
            });
        }
        if iterations >= config.max_iterations {
            return Ok(NewtonResult {
                x,
                residual: f,
                iterations,
                status: NewtonStatus::IterationLimitReached,
            });
        }

        let df = (eval(x + h)? - f) / h;
        let step = if df.abs() < config.singular_derivative {
            // a flat, already-converged residual stays put
            if converged { 0.0 } else { h }
        } else {
            -config.damping.factor(iterations) * f / df
        };

        let next = config.clamp(x + step);
        debug!(iteration = iterations, x, residual = f, df, next, "newton step");
        x = next;
        iterations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unbounded() -> NewtonConfig {
        NewtonConfig {
            derivative_step: 1e-6,
            residual_scale: 1.0,
            tolerance: 1e-10,
            lower_bound: -1e6,
            upper_bound: 1e6,
            min_iterations: 0,
            damping: StepDamping::Full,
            ..NewtonConfig::default()
        }
    }

    #[test]
    fn simple_quadratic() {
        let config = NewtonConfig {
            lower_bound: 0.0,
            ..unbounded()
        };
        let result =
            solve_scalar(3.0, &config, |x| Ok::<_, SolverError>(x * x - 4.0)).unwrap();
        assert!(result.converged());
        assert!((result.x - 2.0).abs() < 1e-8);
        assert!(result.residual.abs() < 1e-10);
    }

    #[test]
    fn default_damping_ramps_to_one() {
        let ramp = StepDamping::Ramp { lag: 5 };
        assert!((ramp.factor(0) - 0.2).abs() < 1e-12);
        assert!((ramp.factor(1) - 2.0 / 6.0).abs() < 1e-12);
        assert!(ramp.factor(1000) > 0.99);
        assert_eq!(StepDamping::Full.factor(7), 1.0);
    }

    #[test]
    fn root_beyond_upper_bound_is_clamped() {
        let config = NewtonConfig::default();
        // root at 12000 rpm, outside [1000, 9000]
        let result = solve_scalar(5000.0, &config, |x| Ok::<_, SolverError>(12000.0 - x)).unwrap();
        assert_eq!(result.status, NewtonStatus::IterationLimitReached);
        assert_eq!(result.iterations, config.max_iterations);
        assert_eq!(result.x, config.upper_bound);
        assert_eq!(result.residual, 3000.0);
    }

    #[test]
    fn min_iterations_are_honoured() {
        let config = NewtonConfig::default();
        let result = solve_scalar(4000.0, &config, |x| Ok::<_, SolverError>(4000.0 - x)).unwrap();
        assert!(result.converged());
        assert_eq!(result.iterations, config.min_iterations);
        assert!((result.x - 4000.0).abs() < 1e-9);
    }

    #[test]
    fn singular_derivative_perturbs_by_step() {
        let config = NewtonConfig {
            max_iterations: 1,
            min_iterations: 0,
            ..NewtonConfig::default()
        };
        // flat non-zero residual: derivative is exactly zero
        let result = solve_scalar(2000.0, &config, |_| Ok::<_, SolverError>(1.0)).unwrap();
        assert_eq!(result.iterations, 1);
        assert!((result.x - 2010.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_residual_is_an_error() {
        let config = NewtonConfig::default();
        let err = solve_scalar(2000.0, &config, |_| Ok::<_, SolverError>(f64::NAN)).unwrap_err();
        assert!(matches!(err, SolverError::NonFinite { what: "residual", .. }));
    }

    #[test]
    fn residual_error_propagates() {
        #[derive(Debug, PartialEq)]
        enum Custom {
            Solver,
            Flash,
        }
        impl From<SolverError> for Custom {
            fn from(_: SolverError) -> Self {
                Custom::Solver
            }
        }
        let err = solve_scalar(2000.0, &NewtonConfig::default(), |_| Err::<f64, _>(Custom::Flash))
            .unwrap_err();
        assert_eq!(err, Custom::Flash);
    }

    #[test]
    fn invalid_bounds_rejected() {
        let config = NewtonConfig {
            lower_bound: 10.0,
            upper_bound: 1.0,
            ..NewtonConfig::default()
        };
        let err = solve_scalar(5.0, &config, |x| Ok::<_, SolverError>(x)).unwrap_err();
        assert!(matches!(err, SolverError::InvalidConfig { .. }));
    }
}
