//! Stream state definitions.

use crate::composition::Composition;
use crate::error::{ThermoError, ThermoResult};
use pf_core::units::constants::R_UNIVERSAL;
use pf_core::units::{Density, MassRate, Power, Pressure, Temperature, VolumeRate, m3ps, watt};

/// Specific enthalpy [J/kg].
///
/// Not part of uom's standard set, so we use f64 with clear documentation.
pub type SpecEnthalpy = f64;

/// Specific entropy [J/(kg·K)].
pub type SpecEntropy = f64;

/// Specific heat capacity [J/(kg·K)].
pub type SpecHeatCapacity = f64;

/// State variable pair that fixes a flash.
#[derive(Debug, Clone, PartialEq)]
pub enum StateInput {
    /// Pressure and temperature.
    PT { p: Pressure, t: Temperature },
    /// Pressure and specific enthalpy.
    PH { p: Pressure, h: SpecEnthalpy },
    /// Pressure and specific entropy.
    PS { p: Pressure, s: SpecEntropy },
}

impl StateInput {
    pub fn label(&self) -> &'static str {
        match self {
            StateInput::PT { .. } => "PT",
            StateInput::PH { .. } => "PH",
            StateInput::PS { .. } => "PS",
        }
    }
}

/// A fully flashed process stream.
///
/// Produced only by a [`ThermoEngine`](crate::ThermoEngine); equipment reads
/// it but never computes enthalpy or entropy itself. Cloning a state is the
/// equivalent of cloning a stream before re-flashing it elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamState {
    comp: Composition,
    flow: MassRate,
    p: Pressure,
    t: Temperature,
    h: SpecEnthalpy,
    s: SpecEntropy,
    rho: Density,
}

impl StreamState {
    /// Assemble a state from engine outputs.
    ///
    /// Validates that pressure, temperature and density are positive and
    /// finite, enthalpy and entropy finite, and the mass flow non-negative.
    pub fn new(
        comp: Composition,
        flow: MassRate,
        p: Pressure,
        t: Temperature,
        h: SpecEnthalpy,
        s: SpecEntropy,
        rho: Density,
    ) -> ThermoResult<Self> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(ThermoError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(ThermoError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        if !rho.value.is_finite() || rho.value <= 0.0 {
            return Err(ThermoError::NonPhysical {
                what: "density must be positive and finite",
            });
        }
        if !h.is_finite() || !s.is_finite() {
            return Err(ThermoError::NonPhysical {
                what: "enthalpy and entropy must be finite",
            });
        }
        if !flow.value.is_finite() || flow.value < 0.0 {
            return Err(ThermoError::NonPhysical {
                what: "mass flow must be non-negative and finite",
            });
        }
        Ok(Self {
            comp,
            flow,
            p,
            t,
            h,
            s,
            rho,
        })
    }

    pub fn composition(&self) -> &Composition {
        &self.comp
    }

    pub fn flow_rate(&self) -> MassRate {
        self.flow
    }

    pub fn pressure(&self) -> Pressure {
        self.p
    }

    pub fn temperature(&self) -> Temperature {
        self.t
    }

    /// Specific enthalpy [J/kg].
    pub fn enthalpy(&self) -> SpecEnthalpy {
        self.h
    }

    /// Specific entropy [J/(kg·K)].
    pub fn entropy(&self) -> SpecEntropy {
        self.s
    }

    pub fn density(&self) -> Density {
        self.rho
    }

    /// Mixture molar mass [kg/kmol].
    pub fn molar_mass(&self) -> f64 {
        self.comp.molar_mass()
    }

    /// Total enthalpy flow H = ṁ·h.
    pub fn enthalpy_flow(&self) -> Power {
        watt(self.flow.value * self.h)
    }

    /// Total entropy flow ṁ·s [W/K].
    pub fn entropy_flow(&self) -> f64 {
        self.flow.value * self.s
    }

    /// Actual volumetric flow ṁ/ρ.
    pub fn volumetric_flow(&self) -> VolumeRate {
        m3ps(self.flow.value / self.rho.value)
    }

    /// Compressibility factor Z = p·M / (ρ·R·T).
    pub fn compressibility(&self) -> f64 {
        let mw_kg_per_mol = self.molar_mass() / 1000.0;
        self.p.value * mw_kg_per_mol / (self.rho.value * R_UNIVERSAL * self.t.value)
    }

    /// Same thermodynamic state carrying a different mass flow.
    pub fn with_flow_rate(&self, flow: MassRate) -> ThermoResult<Self> {
        if !flow.value.is_finite() || flow.value < 0.0 {
            return Err(ThermoError::NonPhysical {
                what: "mass flow must be non-negative and finite",
            });
        }
        let mut next = self.clone();
        next.flow = flow;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;
    use pf_core::units::{k, kgps, pa};
    use uom::si::mass_density::kilogram_per_cubic_meter;

    fn rho(v: f64) -> Density {
        Density::new::<kilogram_per_cubic_meter>(v)
    }

    fn nitrogen(flow: f64) -> ThermoResult<StreamState> {
        StreamState::new(
            Composition::pure(Species::N2),
            kgps(flow),
            pa(101_325.0),
            k(300.0),
            1000.0,
            10.0,
            rho(1.138),
        )
    }

    #[test]
    fn create_valid_state() {
        let state = nitrogen(2.0).unwrap();
        assert_eq!(state.pressure().value, 101_325.0);
        assert_eq!(state.temperature().value, 300.0);
        assert!((state.enthalpy_flow().value - 2000.0).abs() < 1e-9);
        assert!((state.volumetric_flow().value - 2.0 / 1.138).abs() < 1e-12);
    }

    #[test]
    fn reject_negative_flow() {
        assert!(nitrogen(-1.0).is_err());
    }

    #[test]
    fn reject_non_physical() {
        let comp = Composition::pure(Species::N2);
        let bad_p = StreamState::new(
            comp.clone(),
            kgps(1.0),
            pa(-1.0),
            k(300.0),
            0.0,
            0.0,
            rho(1.0),
        );
        assert!(bad_p.is_err());
        let bad_h = StreamState::new(
            comp,
            kgps(1.0),
            pa(1e5),
            k(300.0),
            f64::NAN,
            0.0,
            rho(1.0),
        );
        assert!(bad_h.is_err());
    }

    #[test]
    fn ideal_nitrogen_has_unit_compressibility() {
        // rho from ideal gas law at 1 atm, 300 K
        let r_specific = R_UNIVERSAL / 0.028014;
        let state = StreamState::new(
            Composition::pure(Species::N2),
            kgps(1.0),
            pa(101_325.0),
            k(300.0),
            0.0,
            0.0,
            rho(101_325.0 / (r_specific * 300.0)),
        )
        .unwrap();
        assert!((state.compressibility() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_flow_is_allowed() {
        let state = nitrogen(0.0).unwrap();
        assert_eq!(state.enthalpy_flow().value, 0.0);
        let doubled = state.with_flow_rate(kgps(4.0)).unwrap();
        assert_eq!(doubled.flow_rate().value, 4.0);
        assert_eq!(doubled.enthalpy(), state.enthalpy());
    }
}
