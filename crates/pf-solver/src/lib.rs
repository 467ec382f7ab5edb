//! Scalar root finding for equipment balances.
//!
//! Provides a bounded, damped Newton-Raphson iteration with a forward
//! finite-difference derivative. The residual is supplied as a closure so
//! the caller keeps ownership of its equipment state and error type.

pub mod error;
pub mod newton;

pub use error::{SolverError, SolverResult};
pub use newton::{NewtonConfig, NewtonResult, NewtonStatus, StepDamping, solve_scalar};
