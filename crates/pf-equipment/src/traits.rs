//! Core trait for steady-state equipment models.

use crate::error::EquipmentResult;
use pf_core::CalcId;
use pf_thermo::ThermoEngine;

/// A unit operation that owns its feed streams and computes its outlets.
///
/// `run` may be called repeatedly; each call recomputes every published
/// result from the current feeds and parameters. Results from a failed run
/// are not published and anything from an earlier successful run is
/// discarded.
pub trait Equipment: Send + Sync {
    /// Equipment name for debugging and identification.
    fn name(&self) -> &str;

    /// Solve the equipment at steady state.
    ///
    /// # Arguments
    /// * `engine` - Thermodynamic engine used for every flash
    /// * `id` - Identifier stamped on the results of this run
    fn run(&mut self, engine: &dyn ThermoEngine, id: CalcId) -> EquipmentResult<()>;

    /// Identifier of the last successful run, if any.
    fn calculation_id(&self) -> Option<CalcId>;
}
