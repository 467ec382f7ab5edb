//! Error types for equipment operations.

use pf_core::PfError;
use pf_solver::SolverError;
use pf_thermo::ThermoError;
use thiserror::Error;

/// Malformed performance curve data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("Curve needs at least 2 samples, got {len}")]
    TooFewSamples { len: usize },

    #[error("Curve sample arrays differ in length (x={x_len}, y={y_len})")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("Non-finite curve sample at index {index}")]
    NonFinite { index: usize },
}

/// Errors that can occur while configuring or running equipment.
///
/// Running out of iterations is not an error; it is reported through the
/// solver status of each equipment result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EquipmentError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Equipment has not been run: {what}")]
    NotRun { what: &'static str },

    #[error("Unable to determine hottest or coldest inlet stream: no streams")]
    NoStreams,

    #[error("Temperature cross: ΔT1 = {dt1} K, ΔT2 = {dt2} K (both must be positive)")]
    TemperatureCross { dt1: f64, dt2: f64 },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Curve error: {0}")]
    Curve(#[from] CurveError),

    #[error("Thermo error: {0}")]
    Thermo(#[from] ThermoError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}

pub type EquipmentResult<T> = Result<T, EquipmentError>;

impl From<PfError> for EquipmentError {
    fn from(e: PfError) -> Self {
        match e {
            PfError::NonFinite { what, .. } => EquipmentError::NonPhysical { what },
            PfError::InvalidArg { what } => EquipmentError::InvalidArg { what },
            PfError::BadReference { what, .. } => EquipmentError::InvalidArg { what },
        }
    }
}
