//! Thermodynamic engine trait and validation helpers.

use crate::composition::Composition;
use crate::error::{ThermoError, ThermoResult};
use crate::state::{SpecEnthalpy, SpecEntropy, SpecHeatCapacity, StateInput, StreamState};
use pf_core::units::{MassRate, Pressure, Temperature};

/// Flash and property evaluation consumed by equipment models.
///
/// Implementations must be thread-safe (Send + Sync). Every call is blocking
/// and may fail; a non-convergent or infeasible flash is reported as
/// [`ThermoError::FlashFailure`] and must be propagated by callers.
pub trait ThermoEngine: Send + Sync {
    /// Engine name (for debugging/logging).
    fn name(&self) -> &str;

    /// Check if this engine supports the given composition.
    fn supports_composition(&self, comp: &Composition) -> bool;

    /// Flash a stream of `comp` carrying `flow` to the given state.
    fn flash(
        &self,
        input: StateInput,
        comp: &Composition,
        flow: MassRate,
    ) -> ThermoResult<StreamState>;

    /// Specific heat capacity at constant pressure [J/(kg·K)].
    fn cp(&self, state: &StreamState) -> ThermoResult<SpecHeatCapacity>;

    /// Heat capacity ratio γ = cp/cv (dimensionless).
    fn gamma(&self, state: &StreamState) -> ThermoResult<f64>;

    /// PT flash.
    fn flash_pt(
        &self,
        p: Pressure,
        t: Temperature,
        comp: &Composition,
        flow: MassRate,
    ) -> ThermoResult<StreamState> {
        self.flash(StateInput::PT { p, t }, comp, flow)
    }

    /// Re-evaluate a stream at its own pressure and temperature.
    fn refresh(&self, state: &StreamState) -> ThermoResult<StreamState> {
        self.flash_pt(
            state.pressure(),
            state.temperature(),
            state.composition(),
            state.flow_rate(),
        )
    }

    /// Same stream moved to temperature `t` at its current pressure.
    fn with_temperature(&self, state: &StreamState, t: Temperature) -> ThermoResult<StreamState> {
        self.flash_pt(state.pressure(), t, state.composition(), state.flow_rate())
    }

    /// Same stream moved to pressure `p` at its current temperature.
    fn with_pressure(&self, state: &StreamState, p: Pressure) -> ThermoResult<StreamState> {
        self.flash_pt(p, state.temperature(), state.composition(), state.flow_rate())
    }

    /// Enthalpy flash at the stream's current pressure.
    fn flash_ph(&self, state: &StreamState, h: SpecEnthalpy) -> ThermoResult<StreamState> {
        self.flash_ph_at(state, state.pressure(), h)
    }

    /// Enthalpy flash at pressure `p`.
    fn flash_ph_at(
        &self,
        state: &StreamState,
        p: Pressure,
        h: SpecEnthalpy,
    ) -> ThermoResult<StreamState> {
        self.flash(
            StateInput::PH { p, h },
            state.composition(),
            state.flow_rate(),
        )
    }

    /// Entropy flash at the stream's current pressure.
    fn flash_ps(&self, state: &StreamState, s: SpecEntropy) -> ThermoResult<StreamState> {
        self.flash(
            StateInput::PS {
                p: state.pressure(),
                s,
            },
            state.composition(),
            state.flow_rate(),
        )
    }

    /// Isentropic change of the stream to pressure `p`.
    fn isentropic_to(&self, state: &StreamState, p: Pressure) -> ThermoResult<StreamState> {
        self.flash(
            StateInput::PS {
                p,
                s: state.entropy(),
            },
            state.composition(),
            state.flow_rate(),
        )
    }
}

/// Validation helpers for flash inputs and outputs.
pub(crate) mod validation {
    use super::*;

    pub fn validate_pressure(p: Pressure) -> ThermoResult<()> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(ThermoError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_temperature(t: Temperature) -> ThermoResult<()> {
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(ThermoError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_flow(flow: MassRate) -> ThermoResult<()> {
        if !flow.value.is_finite() || flow.value < 0.0 {
            return Err(ThermoError::NonPhysical {
                what: "mass flow must be non-negative and finite",
            });
        }
        Ok(())
    }

    pub fn validate_cp(cp: f64) -> ThermoResult<()> {
        if !cp.is_finite() || cp <= 0.0 {
            return Err(ThermoError::NonPhysical {
                what: "cp must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_gamma(gamma: f64) -> ThermoResult<()> {
        if !gamma.is_finite() || gamma < 1.0 {
            return Err(ThermoError::NonPhysical {
                what: "gamma must be >= 1 and finite",
            });
        }
        Ok(())
    }

    /// Enthalpy and entropy may be negative, only finiteness is required.
    pub fn validate_finite(v: f64, what: &'static str) -> ThermoResult<()> {
        if !v.is_finite() {
            return Err(ThermoError::NonPhysical { what });
        }
        Ok(())
    }
}
