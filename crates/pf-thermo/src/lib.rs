//! pf-thermo: thermodynamic flash and property evaluation for procflow.
//!
//! Provides:
//! - Chemical species and ideal-gas heat capacity correlations
//! - Composition handling (pure fluids and mixtures)
//! - `StreamState`, a fully flashed process stream
//! - `ThermoEngine` trait consumed by equipment models
//! - `IdealGasEngine` (mixtures, temperature-dependent cp)
//! - `CoolPropEngine` for real pure-fluid properties
//!
//! # Example
//!
//! ```no_run
//! use pf_thermo::{Composition, IdealGasEngine, Species, ThermoEngine};
//! use pf_core::units::{bara, k, kgps};
//!
//! let engine = IdealGasEngine::new();
//! let comp = Composition::pure(Species::CH4);
//! let feed = engine.flash_pt(bara(70.0), k(300.0), &comp, kgps(10.0)).unwrap();
//! let out = engine.isentropic_to(&feed, bara(40.0)).unwrap();
//! println!("isentropic drop: {} J/kg", feed.enthalpy() - out.enthalpy());
//! ```

pub mod composition;
pub mod coolprop;
pub mod engine;
pub mod error;
pub mod ideal_gas;
pub mod species;
pub mod state;

// Re-exports for ergonomics
pub use composition::Composition;
pub use coolprop::CoolPropEngine;
pub use engine::ThermoEngine;
pub use error::{ThermoError, ThermoResult};
pub use ideal_gas::IdealGasEngine;
pub use species::{CpPolynomial, Species};
pub use state::{SpecEnthalpy, SpecEntropy, SpecHeatCapacity, StateInput, StreamState};
