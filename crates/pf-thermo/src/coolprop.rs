//! CoolProp-based thermodynamic engine.

use crate::composition::Composition;
use crate::engine::{ThermoEngine, validation};
use crate::error::{ThermoError, ThermoResult};
use crate::state::{SpecHeatCapacity, StateInput, StreamState};
use pf_core::units::{Density, MassRate, Pressure, k};
use rfluids::prelude::*;
use uom::si::mass_density::kilogram_per_cubic_meter;

/// CoolProp backend (via `rfluids`) for real-fluid properties.
///
/// Supports pure fluids only. PH and PS flashes bisect on temperature at the
/// requested pressure.
pub struct CoolPropEngine {
    t_min: f64,
    t_max: f64,
}

impl CoolPropEngine {
    const MAX_ITER: usize = 100;

    pub fn new() -> Self {
        Self {
            t_min: 100.0,
            t_max: 2000.0,
        }
    }

    fn pure_of(&self, comp: &Composition) -> ThermoResult<Pure> {
        comp.is_pure()
            .map(|species| species.rfluids_pure())
            .ok_or(ThermoError::NotSupported {
                what: "CoolProp engine supports pure fluids only",
            })
    }

    fn fluid_at_pt(&self, pure: Pure, p_pa: f64, t_k: f64) -> ThermoResult<Fluid> {
        Fluid::from(pure)
            .in_state(FluidInput::pressure(p_pa), FluidInput::temperature(t_k))
            .map_err(|e| ThermoError::Backend {
                message: format!("rfluids error at P={} Pa, T={} K: {}", p_pa, t_k, e),
            })
    }

    fn enthalpy_at(&self, pure: Pure, p_pa: f64, t_k: f64) -> ThermoResult<f64> {
        let mut fluid = self.fluid_at_pt(pure, p_pa, t_k)?;
        fluid.enthalpy().map_err(|e| ThermoError::Backend {
            message: format!("rfluids error getting enthalpy: {}", e),
        })
    }

    fn entropy_at(&self, pure: Pure, p_pa: f64, t_k: f64) -> ThermoResult<f64> {
        let mut fluid = self.fluid_at_pt(pure, p_pa, t_k)?;
        fluid.entropy().map_err(|e| ThermoError::Backend {
            message: format!("rfluids error getting entropy: {}", e),
        })
    }

    /// Bisection for T such that `property(P, T) = target`, property increasing in T.
    fn bisect_temperature<F>(&self, flash: &'static str, target: f64, property: F) -> ThermoResult<f64>
    where
        F: Fn(f64) -> ThermoResult<f64>,
    {
        let mut t_low = self.t_min;
        let mut t_high = self.t_max;

        let low = property(t_low)?;
        let high = property(t_high)?;
        if target < low || target > high {
            return Err(ThermoError::FlashFailure {
                flash,
                reason: format!("target {target:.6e} outside [{low:.6e}, {high:.6e}]"),
            });
        }

        let tol = 1e-9 * target.abs().max(1.0);
        for _ in 0..Self::MAX_ITER {
            let t_mid = 0.5 * (t_low + t_high);
            let mid = property(t_mid)?;
            if (mid - target).abs() < tol || t_high - t_low < 1e-9 {
                return Ok(t_mid);
            }
            if mid < target {
                t_low = t_mid;
            } else {
                t_high = t_mid;
            }
        }

        Err(ThermoError::FlashFailure {
            flash,
            reason: format!("bisection did not converge in {} iterations", Self::MAX_ITER),
        })
    }

    fn build_state(
        &self,
        pure: Pure,
        comp: &Composition,
        flow: MassRate,
        p: Pressure,
        t_k: f64,
    ) -> ThermoResult<StreamState> {
        let mut fluid = self.fluid_at_pt(pure, p.value, t_k)?;
        let backend = |e: &dyn std::fmt::Display, what: &str| ThermoError::Backend {
            message: format!("rfluids error getting {}: {}", what, e),
        };
        let h = fluid.enthalpy().map_err(|e| backend(&e, "enthalpy"))?;
        let s = fluid.entropy().map_err(|e| backend(&e, "entropy"))?;
        let rho = fluid.density().map_err(|e| backend(&e, "density"))?;
        StreamState::new(
            comp.clone(),
            flow,
            p,
            k(t_k),
            h,
            s,
            Density::new::<kilogram_per_cubic_meter>(rho),
        )
    }
}

impl Default for CoolPropEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ThermoEngine for CoolPropEngine {
    fn name(&self) -> &str {
        "CoolProp"
    }

    fn supports_composition(&self, comp: &Composition) -> bool {
        comp.is_pure().is_some()
    }

    fn flash(
        &self,
        input: StateInput,
        comp: &Composition,
        flow: MassRate,
    ) -> ThermoResult<StreamState> {
        validation::validate_flow(flow)?;
        let pure = self.pure_of(comp)?;

        match input {
            StateInput::PT { p, t } => {
                validation::validate_pressure(p)?;
                validation::validate_temperature(t)?;
                self.build_state(pure, comp, flow, p, t.value)
            }
            StateInput::PH { p, h } => {
                validation::validate_pressure(p)?;
                validation::validate_finite(h, "enthalpy must be finite")?;
                let t = self.bisect_temperature("PH", h, |t| self.enthalpy_at(pure, p.value, t))?;
                self.build_state(pure, comp, flow, p, t)
            }
            StateInput::PS { p, s } => {
                validation::validate_pressure(p)?;
                validation::validate_finite(s, "entropy must be finite")?;
                let t = self.bisect_temperature("PS", s, |t| self.entropy_at(pure, p.value, t))?;
                self.build_state(pure, comp, flow, p, t)
            }
        }
    }

    fn cp(&self, state: &StreamState) -> ThermoResult<SpecHeatCapacity> {
        let pure = self.pure_of(state.composition())?;
        let mut fluid =
            self.fluid_at_pt(pure, state.pressure().value, state.temperature().value)?;
        let cp = fluid.specific_heat().map_err(|e| ThermoError::Backend {
            message: format!("rfluids error getting specific heat: {}", e),
        })?;
        validation::validate_cp(cp)?;
        Ok(cp)
    }

    fn gamma(&self, state: &StreamState) -> ThermoResult<f64> {
        let cp = self.cp(state)?;
        let p_pa = state.pressure().value;
        let t_k = state.temperature().value;
        let r_specific = p_pa / (state.density().value * t_k);
        let cv = cp - r_specific;

        if cv <= 0.0 || !cv.is_finite() {
            return Err(ThermoError::Backend {
                message: "Failed to compute cv for gamma calculation".into(),
            });
        }

        let gamma = cp / cv;
        validation::validate_gamma(gamma)?;
        Ok(gamma)
    }
}
