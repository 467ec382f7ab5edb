//! Stream composition (pure or mixtures).

use crate::error::{ThermoError, ThermoResult};
use crate::species::{CpPolynomial, Species};
use pf_core::numeric::{Tolerances, nearly_equal};

/// Stream composition defined by normalized mole fractions.
///
/// Always normalized so that the mole fractions sum to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    items: Vec<(Species, f64)>,
}

impl Composition {
    /// Create a pure-species composition.
    pub fn pure(species: Species) -> Self {
        Self {
            items: vec![(species, 1.0)],
        }
    }

    /// Create a composition from mole fractions.
    ///
    /// Fractions must be finite and non-negative with a positive sum; they are
    /// normalized and repeated species are merged.
    pub fn new_mole_fractions(fractions: Vec<(Species, f64)>) -> ThermoResult<Self> {
        if fractions.is_empty() {
            return Err(ThermoError::InvalidArg {
                what: "empty composition",
            });
        }

        let mut merged: Vec<(Species, f64)> = Vec::with_capacity(fractions.len());
        let mut sum = 0.0;
        for (species, frac) in fractions {
            if !frac.is_finite() {
                return Err(ThermoError::NonPhysical {
                    what: "non-finite mole fraction",
                });
            }
            if frac < 0.0 {
                return Err(ThermoError::NonPhysical {
                    what: "negative mole fraction",
                });
            }
            sum += frac;
            match merged.iter_mut().find(|(s, _)| *s == species) {
                Some((_, existing)) => *existing += frac,
                None => merged.push((species, frac)),
            }
        }

        if sum <= 0.0 || !sum.is_finite() {
            return Err(ThermoError::NonPhysical {
                what: "mole fractions sum to zero or non-finite",
            });
        }

        let normalized: Vec<(Species, f64)> = merged
            .into_iter()
            .map(|(s, f)| (s, f / sum))
            .filter(|(_, f)| *f > 1e-15)
            .collect();

        if normalized.is_empty() {
            return Err(ThermoError::NonPhysical {
                what: "all mole fractions negligible",
            });
        }

        Ok(Self { items: normalized })
    }

    /// Get mole fraction of a species (0.0 if not present).
    pub fn mole_fraction(&self, species: Species) -> f64 {
        self.items
            .iter()
            .find(|(s, _)| *s == species)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    /// Returns `Some(species)` if exactly one species has fraction ≈1.0.
    pub fn is_pure(&self) -> Option<Species> {
        if self.items.len() == 1 {
            let (species, frac) = self.items[0];
            let tol = Tolerances {
                abs: 1e-10,
                rel: 1e-10,
            };
            if nearly_equal(frac, 1.0, tol) {
                return Some(species);
            }
        }
        None
    }

    /// Iterate over all species with non-zero mole fractions.
    pub fn iter(&self) -> impl Iterator<Item = (Species, f64)> + '_ {
        self.items.iter().copied()
    }

    /// Mixture molar mass [kg/kmol]: M_mix = Σ xᵢ·Mᵢ.
    pub fn molar_mass(&self) -> f64 {
        self.items
            .iter()
            .map(|(species, x)| species.molar_mass() * x)
            .sum()
    }

    /// Mass fractions wᵢ = xᵢ·Mᵢ / M_mix, in the same order as [`iter`](Self::iter).
    pub fn mass_fractions(&self) -> Vec<(Species, f64)> {
        let mw = self.molar_mass();
        self.items
            .iter()
            .map(|(species, x)| (*species, x * species.molar_mass() / mw))
            .collect()
    }

    /// Ideal mixing entropy -R·Σ xᵢ ln xᵢ per mole, divided by R [-].
    pub(crate) fn mixing_entropy_over_r(&self) -> f64 {
        -self
            .items
            .iter()
            .map(|(_, x)| if *x > 0.0 { x * x.ln() } else { 0.0 })
            .sum::<f64>()
    }

    /// Mole-fraction weighted heat capacity polynomial, using `lookup` per species.
    pub(crate) fn mixture_cp<F>(&self, lookup: F) -> CpPolynomial
    where
        F: Fn(Species) -> CpPolynomial,
    {
        self.items
            .iter()
            .fold(CpPolynomial::constant(0.0), |acc, (species, x)| {
                let p = lookup(*species);
                CpPolynomial::new(
                    acc.a + x * p.a,
                    acc.b + x * p.b,
                    acc.c + x * p.c,
                    acc.d + x * p.d,
                )
            })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalized_sum_is_one(fracs in prop::collection::vec(0.0_f64..1.0_f64, 1..6)) {
            let species = [Species::CH4, Species::Ethane, Species::Propane, Species::N2, Species::CO2];
            let input: Vec<(Species, f64)> = fracs
                .iter()
                .enumerate()
                .map(|(i, &f)| (species[i % species.len()], f))
                .collect();

            if let Ok(comp) = Composition::new_mole_fractions(input) {
                let sum: f64 = comp.iter().map(|(_, f)| f).sum();
                let tol = Tolerances { abs: 1e-9, rel: 1e-9 };
                prop_assert!(nearly_equal(sum, 1.0, tol));
            }
        }
    }
}
