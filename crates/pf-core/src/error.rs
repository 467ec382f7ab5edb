use thiserror::Error;

pub type PfResult<T> = Result<T, PfError>;

/// Failures of the shared numeric helpers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A relative comparison against zero or a non-finite reference.
    #[error("Reference value for {what} must be finite and non-zero, got {value}")]
    BadReference { what: &'static str, value: f64 },
}
