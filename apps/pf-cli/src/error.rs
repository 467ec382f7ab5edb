//! CLI error type.

use pf_equipment::EquipmentError;
use pf_thermo::ThermoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported case version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Unknown species '{name}'")]
    UnknownSpecies { name: String },

    #[error("Engine '{engine}' does not support the composition of stream '{stream}'")]
    UnsupportedComposition { engine: String, stream: String },

    #[error("Invalid case: {what}")]
    InvalidCase { what: String },

    #[error("Thermo error: {0}")]
    Thermo(#[from] ThermoError),

    #[error("Equipment error: {0}")]
    Equipment(#[from] EquipmentError),
}

pub type CliResult<T> = Result<T, CliError>;
