//! Error types for solver operations.

use thiserror::Error;

/// Errors that can occur while iterating.
///
/// Running out of iterations is not an error; it is reported through
/// [`NewtonStatus`](crate::NewtonStatus).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid solver configuration: {what}")]
    InvalidConfig { what: &'static str },

    #[error("Non-finite {what} at x = {x}")]
    NonFinite { what: &'static str, x: f64 },
}

pub type SolverResult<T> = Result<T, SolverError>;
