//! pf-equipment: steady-state unit operations for gas processing.
//!
//! Provides:
//! - Dimensionless performance curves (parabola, monotonic spline)
//! - Expander and compressor models
//! - Turbo-expander/compressor speed matching
//! - Multi-stream heat exchanger energy balancing
//!
//! Every model implements [`Equipment`]: feeds are owned by the equipment,
//! `run` computes outlets through a [`pf_thermo::ThermoEngine`], and results
//! are read back through typed accessors.
//!
//! # Example
//!
//! ```no_run
//! use pf_core::CalcId;
//! use pf_core::units::{bara, degc, kgps};
//! use pf_equipment::{Equipment, TurboExpanderCompressor, TurboExpanderDesign};
//! use pf_thermo::{Composition, IdealGasEngine, Species, ThermoEngine};
//!
//! let engine = IdealGasEngine::new();
//! let feed = engine
//!     .flash_pt(bara(60.0), degc(20.0), &Composition::pure(Species::CH4), kgps(10.0))
//!     .unwrap();
//!
//! let mut tec =
//!     TurboExpanderCompressor::new("K-100".into(), feed, TurboExpanderDesign::default()).unwrap();
//! tec.run(&engine, CalcId::new()).unwrap();
//! println!("Speed: {:?}", tec.speed());
//! ```

pub mod common;
pub mod compressor;
pub mod curve;
pub mod error;
pub mod expander;
pub mod multi_stream_hx;
pub mod traits;
pub mod turbo_expander_compressor;

// Re-exports
pub use compressor::Compressor;
pub use curve::PerformanceCurve;
pub use error::{CurveError, EquipmentError, EquipmentResult};
pub use expander::Expander;
pub use multi_stream_hx::{
    BalanceConfig, BalancePass, BalanceStatus, FlowArrangement, HeatDirection,
    MultiStreamHeatExchanger, lmtd,
};
pub use traits::Equipment;
pub use turbo_expander_compressor::{
    CurveSlot, SpeedMatchConfig, SpeedMatchResult, SpeedMatchStatus, TurboExpanderCompressor,
    TurboExpanderDesign,
};
