//! Thermodynamic evaluation errors.

use pf_core::PfError;
use thiserror::Error;

/// Result type for thermodynamic operations.
pub type ThermoResult<T> = Result<T, ThermoError>;

/// Errors raised by a [`ThermoEngine`](crate::ThermoEngine).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThermoError {
    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Value out of valid range.
    #[error("Value out of range for {what}")]
    OutOfRange { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Operation not supported (e.g., mixtures on a pure-fluid backend).
    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    /// Backend (CoolProp) error.
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// Flash did not converge or the requested state is infeasible.
    #[error("Flash failure ({flash}): {reason}")]
    FlashFailure {
        flash: &'static str,
        reason: String,
    },
}

impl From<PfError> for ThermoError {
    fn from(err: PfError) -> Self {
        match err {
            PfError::NonFinite { what, .. } => ThermoError::NonPhysical { what },
            PfError::InvalidArg { what } => ThermoError::InvalidArg { what },
            PfError::BadReference { what, .. } => ThermoError::InvalidArg { what },
        }
    }
}
