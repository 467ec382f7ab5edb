//! Ideal-gas engine with temperature-dependent heat capacity.

use crate::composition::Composition;
use crate::engine::{ThermoEngine, validation};
use crate::error::{ThermoError, ThermoResult};
use crate::species::{CpPolynomial, Species};
use crate::state::{SpecHeatCapacity, StateInput, StreamState};
use pf_core::units::constants::R_UNIVERSAL;
use pf_core::units::{Density, MassRate, Pressure, k};
use uom::si::mass_density::kilogram_per_cubic_meter;

/// Ideal-gas mixture with polynomial cp°(T) per species.
///
/// ## Model
///
/// ```text
/// h(T)   = ∫[T_ref..T] cp° dT / M
/// s(T,p) = (∫[T_ref..T] cp°/T dT - R·ln(p/p_ref) - R·Σ xᵢ ln xᵢ) / M
/// ρ      = p·M / (R·T)
/// ```
///
/// with `T_ref = 298.15 K`, `p_ref = 1 atm` and the mixture cp° taken as the
/// mole-fraction average. PH and PS flashes solve for T with a
/// bracket-safeguarded Newton iteration over [`Self::T_MIN`, `Self::T_MAX`].
#[derive(Debug, Clone, Default)]
pub struct IdealGasEngine {
    overrides: Vec<(Species, CpPolynomial)>,
}

impl IdealGasEngine {
    /// Lower temperature bound for flashes [K].
    pub const T_MIN: f64 = 100.0;
    /// Upper temperature bound for flashes [K].
    pub const T_MAX: f64 = 1500.0;

    const T_REF: f64 = 298.15;
    const P_REF: f64 = 101_325.0;
    const MAX_ITER: usize = 100;

    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the heat capacity correlation of one species.
    pub fn with_cp(mut self, species: Species, cp: CpPolynomial) -> Self {
        self.overrides.retain(|(s, _)| *s != species);
        self.overrides.push((species, cp));
        self
    }

    fn species_cp(&self, species: Species) -> CpPolynomial {
        self.overrides
            .iter()
            .find(|(s, _)| *s == species)
            .map(|(_, cp)| *cp)
            .unwrap_or_else(|| species.ideal_gas_cp())
    }

    fn molar_mass_kg_per_mol(comp: &Composition) -> f64 {
        comp.molar_mass() / 1000.0
    }

    fn enthalpy(&self, poly: &CpPolynomial, mw: f64, t: f64) -> f64 {
        poly.enthalpy_change(Self::T_REF, t) / mw
    }

    fn entropy(&self, poly: &CpPolynomial, comp: &Composition, mw: f64, t: f64, p: f64) -> f64 {
        let molar = poly.entropy_change(Self::T_REF, t) - R_UNIVERSAL * (p / Self::P_REF).ln()
            + R_UNIVERSAL * comp.mixing_entropy_over_r();
        molar / mw
    }

    /// Solve `f(T) = target` for monotonically increasing `f` with derivative `df`.
    fn solve_temperature<F, D>(
        &self,
        flash: &'static str,
        target: f64,
        f: F,
        df: D,
    ) -> ThermoResult<f64>
    where
        F: Fn(f64) -> f64,
        D: Fn(f64) -> f64,
    {
        let mut lo = Self::T_MIN;
        let mut hi = Self::T_MAX;
        if target < f(lo) || target > f(hi) {
            return Err(ThermoError::FlashFailure {
                flash,
                reason: format!(
                    "target {target:.6e} outside [{:.6e}, {:.6e}] on {lo}-{hi} K",
                    f(lo),
                    f(hi)
                ),
            });
        }

        let tol = 1e-9 * target.abs().max(1.0);
        let mut t = Self::T_REF;
        for _ in 0..Self::MAX_ITER {
            let r = f(t) - target;
            if r.abs() <= tol {
                return Ok(t);
            }
            if r < 0.0 {
                lo = t;
            } else {
                hi = t;
            }
            let slope = df(t);
            let newton = t - r / slope;
            t = if slope > 0.0 && newton > lo && newton < hi {
                newton
            } else {
                0.5 * (lo + hi)
            };
        }

        Err(ThermoError::FlashFailure {
            flash,
            reason: format!("no convergence after {} iterations", Self::MAX_ITER),
        })
    }

    fn build_state(
        &self,
        poly: &CpPolynomial,
        comp: &Composition,
        flow: MassRate,
        p: Pressure,
        t: f64,
    ) -> ThermoResult<StreamState> {
        let mw = Self::molar_mass_kg_per_mol(comp);
        validation::validate_cp(poly.cp(t))?;
        let h = self.enthalpy(poly, mw, t);
        let s = self.entropy(poly, comp, mw, t, p.value);
        let rho = Density::new::<kilogram_per_cubic_meter>(p.value * mw / (R_UNIVERSAL * t));
        StreamState::new(comp.clone(), flow, p, k(t), h, s, rho)
    }
}

impl ThermoEngine for IdealGasEngine {
    fn name(&self) -> &str {
        "IdealGas"
    }

    fn supports_composition(&self, _comp: &Composition) -> bool {
        true
    }

    fn flash(
        &self,
        input: StateInput,
        comp: &Composition,
        flow: MassRate,
    ) -> ThermoResult<StreamState> {
        validation::validate_flow(flow)?;
        let poly = comp.mixture_cp(|s| self.species_cp(s));
        let mw = Self::molar_mass_kg_per_mol(comp);
        let label = input.label();

        match input {
            StateInput::PT { p, t } => {
                validation::validate_pressure(p)?;
                validation::validate_temperature(t)?;
                if !(Self::T_MIN..=Self::T_MAX).contains(&t.value) {
                    return Err(ThermoError::OutOfRange {
                        what: "temperature outside the ideal-gas cp correlation range",
                    });
                }
                self.build_state(&poly, comp, flow, p, t.value)
            }
            StateInput::PH { p, h } => {
                validation::validate_pressure(p)?;
                validation::validate_finite(h, "enthalpy must be finite")?;
                let t = self.solve_temperature(
                    label,
                    h,
                    |t| self.enthalpy(&poly, mw, t),
                    |t| poly.cp(t) / mw,
                )?;
                self.build_state(&poly, comp, flow, p, t)
            }
            StateInput::PS { p, s } => {
                validation::validate_pressure(p)?;
                validation::validate_finite(s, "entropy must be finite")?;
                let t = self.solve_temperature(
                    label,
                    s,
                    |t| self.entropy(&poly, comp, mw, t, p.value),
                    |t| poly.cp(t) / (mw * t),
                )?;
                self.build_state(&poly, comp, flow, p, t)
            }
        }
    }

    fn cp(&self, state: &StreamState) -> ThermoResult<SpecHeatCapacity> {
        let comp = state.composition();
        let poly = comp.mixture_cp(|s| self.species_cp(s));
        let cp = poly.cp(state.temperature().value) / Self::molar_mass_kg_per_mol(comp);
        validation::validate_cp(cp)?;
        Ok(cp)
    }

    fn gamma(&self, state: &StreamState) -> ThermoResult<f64> {
        let cp = self.cp(state)?;
        let r_specific = R_UNIVERSAL / Self::molar_mass_kg_per_mol(state.composition());
        let cv = cp - r_specific;
        validation::validate_cp(cv)?;
        let gamma = cp / cv;
        validation::validate_gamma(gamma)?;
        Ok(gamma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::units::{bara, kgps, pa};

    fn methane() -> Composition {
        Composition::pure(Species::CH4)
    }

    #[test]
    fn reference_state_is_zero() {
        let engine = IdealGasEngine::new();
        let state = engine
            .flash_pt(pa(101_325.0), k(298.15), &methane(), kgps(1.0))
            .unwrap();
        assert!(state.enthalpy().abs() < 1e-9);
        assert!(state.entropy().abs() < 1e-9);
    }

    #[test]
    fn ph_flash_inverts_pt() {
        let engine = IdealGasEngine::new();
        let comp =
            Composition::new_mole_fractions(vec![(Species::CH4, 0.9), (Species::Ethane, 0.1)])
                .unwrap();
        let reference = engine
            .flash_pt(bara(50.0), k(350.0), &comp, kgps(2.0))
            .unwrap();
        let back = engine.flash_ph(&reference, reference.enthalpy()).unwrap();
        assert!((back.temperature().value - 350.0).abs() < 1e-6);
        assert_eq!(back.flow_rate().value, 2.0);
    }

    #[test]
    fn isentropic_expansion_cools() {
        let engine = IdealGasEngine::new();
        let feed = engine
            .flash_pt(bara(70.0), k(300.0), &methane(), kgps(10.0))
            .unwrap();
        let out = engine.isentropic_to(&feed, bara(40.0)).unwrap();
        assert!(out.temperature().value < feed.temperature().value);
        assert!((out.entropy() - feed.entropy()).abs() < 1e-6);
        assert!(out.enthalpy() < feed.enthalpy());
    }

    #[test]
    fn isentropic_temperature_matches_constant_cp_closed_form() {
        // cp = 3.5 R  =>  T2/T1 = (p2/p1)^(2/7)
        let engine = IdealGasEngine::new().with_cp(Species::N2, CpPolynomial::constant(3.5 * R_UNIVERSAL));
        let comp = Composition::pure(Species::N2);
        let feed = engine
            .flash_pt(bara(10.0), k(400.0), &comp, kgps(1.0))
            .unwrap();
        let out = engine.isentropic_to(&feed, bara(5.0)).unwrap();
        let expected = 400.0 * 0.5_f64.powf(2.0 / 7.0);
        assert!((out.temperature().value - expected).abs() < 1e-6);
    }

    #[test]
    fn throttling_keeps_temperature_and_raises_entropy() {
        let engine = IdealGasEngine::new();
        let feed = engine
            .flash_pt(bara(40.0), k(320.0), &methane(), kgps(1.0))
            .unwrap();
        let throttled = engine.with_pressure(&feed, bara(20.0)).unwrap();
        assert!((throttled.enthalpy() - feed.enthalpy()).abs() < 1e-6);
        assert!(throttled.entropy() > feed.entropy());

        // PS flash at the lower pressure recovers the isentropic outlet
        let back = engine.flash_ps(&throttled, feed.entropy()).unwrap();
        let direct = engine.isentropic_to(&feed, bara(20.0)).unwrap();
        assert!((back.temperature().value - direct.temperature().value).abs() < 1e-6);
    }

    #[test]
    fn gamma_of_monatomic_gas() {
        let engine = IdealGasEngine::new();
        let state = engine
            .flash_pt(bara(1.0), k(300.0), &Composition::pure(Species::Ar), kgps(1.0))
            .unwrap();
        let gamma = engine.gamma(&state).unwrap();
        assert!((gamma - 5.0 / 3.0).abs() < 1e-3, "gamma = {gamma}");
    }

    #[test]
    fn out_of_range_enthalpy_is_flash_failure() {
        let engine = IdealGasEngine::new();
        let state = engine
            .flash_pt(bara(10.0), k(300.0), &methane(), kgps(1.0))
            .unwrap();
        let err = engine.flash_ph(&state, 1e12).unwrap_err();
        assert!(matches!(err, ThermoError::FlashFailure { flash: "PH", .. }));
    }

    #[test]
    fn temperature_outside_correlation_range_rejected() {
        let engine = IdealGasEngine::new();
        let err = engine
            .flash_pt(bara(1.0), k(50.0), &methane(), kgps(1.0))
            .unwrap_err();
        assert!(matches!(err, ThermoError::OutOfRange { .. }));
        assert!(engine.flash_pt(bara(1.0), k(2000.0), &methane(), kgps(1.0)).is_err());
    }

    #[test]
    fn density_follows_ideal_gas_law() {
        let engine = IdealGasEngine::new();
        let state = engine
            .flash_pt(pa(101_325.0), k(273.15), &Composition::pure(Species::N2), kgps(1.0))
            .unwrap();
        assert!((state.density().value - 1.2498).abs() < 1e-3);
        assert!((state.compressibility() - 1.0).abs() < 1e-12);
    }
}
