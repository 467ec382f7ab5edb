//! Chemical species for natural-gas and process streams.

/// Ideal-gas isobaric heat capacity polynomial.
///
/// ```text
/// cp°(T) = a + b·T + c·T² + d·T³    [J/(mol·K)], T in K
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpPolynomial {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl CpPolynomial {
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// Temperature-independent heat capacity.
    pub const fn constant(cp: f64) -> Self {
        Self::new(cp, 0.0, 0.0, 0.0)
    }

    /// cp° at `t` [J/(mol·K)].
    pub fn cp(&self, t: f64) -> f64 {
        self.a + t * (self.b + t * (self.c + t * self.d))
    }

    /// ∫ cp dT from `t0` to `t1` [J/mol].
    pub fn enthalpy_change(&self, t0: f64, t1: f64) -> f64 {
        let antiderivative = |t: f64| {
            t * (self.a + t * (self.b / 2.0 + t * (self.c / 3.0 + t * self.d / 4.0)))
        };
        antiderivative(t1) - antiderivative(t0)
    }

    /// ∫ cp/T dT from `t0` to `t1` [J/(mol·K)].
    pub fn entropy_change(&self, t0: f64, t1: f64) -> f64 {
        let antiderivative =
            |t: f64| self.a * t.ln() + t * (self.b + t * (self.c / 2.0 + t * self.d / 3.0));
        antiderivative(t1) - antiderivative(t0)
    }
}

/// Chemical species found in gas processing streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Methane (CH₄)
    CH4,
    /// Ethane (C₂H₆)
    Ethane,
    /// Propane (C₃H₈)
    Propane,
    /// n-Butane
    NButane,
    /// Isobutane
    Isobutane,
    /// n-Pentane
    NPentane,
    /// Isopentane
    Isopentane,
    /// n-Hexane
    NHexane,
    /// Nitrogen (N₂)
    N2,
    /// Carbon dioxide (CO₂)
    CO2,
    /// Water (H₂O)
    H2O,
    /// Oxygen (O₂)
    O2,
    /// Hydrogen (H₂)
    H2,
    /// Argon (Ar)
    Ar,
    /// Helium (He)
    He,
    /// Air (pseudo-pure)
    Air,
}

impl Species {
    pub const ALL: [Species; 16] = [
        Species::CH4,
        Species::Ethane,
        Species::Propane,
        Species::NButane,
        Species::Isobutane,
        Species::NPentane,
        Species::Isopentane,
        Species::NHexane,
        Species::N2,
        Species::CO2,
        Species::H2O,
        Species::O2,
        Species::H2,
        Species::Ar,
        Species::He,
        Species::Air,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Species::CH4 => "CH4",
            Species::Ethane => "Ethane",
            Species::Propane => "Propane",
            Species::NButane => "nButane",
            Species::Isobutane => "Isobutane",
            Species::NPentane => "nPentane",
            Species::Isopentane => "Isopentane",
            Species::NHexane => "nHexane",
            Species::N2 => "N2",
            Species::CO2 => "CO2",
            Species::H2O => "H2O",
            Species::O2 => "O2",
            Species::H2 => "H2",
            Species::Ar => "Ar",
            Species::He => "He",
            Species::Air => "Air",
        }
    }

    /// Get molar mass [kg/kmol].
    pub fn molar_mass(&self) -> f64 {
        match self {
            Species::CH4 => 16.043,
            Species::Ethane => 30.070,
            Species::Propane => 44.097,
            Species::NButane => 58.124,
            Species::Isobutane => 58.124,
            Species::NPentane => 72.151,
            Species::Isopentane => 72.151,
            Species::NHexane => 86.178,
            Species::N2 => 28.014,
            Species::CO2 => 44.010,
            Species::H2O => 18.015,
            Species::O2 => 31.999,
            Species::H2 => 2.016,
            Species::Ar => 39.948,
            Species::He => 4.003,
            Species::Air => 28.965,
        }
    }

    /// Ideal-gas heat capacity correlation, valid roughly 270–1500 K.
    pub fn ideal_gas_cp(&self) -> CpPolynomial {
        match self {
            Species::CH4 => CpPolynomial::new(19.25, 5.213e-2, 1.197e-5, -1.132e-8),
            Species::Ethane => CpPolynomial::new(5.409, 1.781e-1, -6.938e-5, 8.713e-9),
            Species::Propane => CpPolynomial::new(-4.224, 3.063e-1, -1.586e-4, 3.215e-8),
            Species::NButane => CpPolynomial::new(9.487, 3.313e-1, -1.108e-4, -2.822e-9),
            Species::Isobutane => CpPolynomial::new(-1.390, 3.847e-1, -1.846e-4, 2.895e-8),
            Species::NPentane => CpPolynomial::new(-3.626, 4.873e-1, -2.580e-4, 5.305e-8),
            Species::Isopentane => CpPolynomial::new(-9.525, 5.066e-1, -2.729e-4, 5.723e-8),
            Species::NHexane => CpPolynomial::new(-4.413, 5.820e-1, -3.119e-4, 6.494e-8),
            Species::N2 => CpPolynomial::new(31.15, -1.357e-2, 2.680e-5, -1.168e-8),
            Species::CO2 => CpPolynomial::new(19.80, 7.344e-2, -5.602e-5, 1.715e-8),
            Species::H2O => CpPolynomial::new(32.24, 1.924e-3, 1.055e-5, -3.596e-9),
            Species::O2 => CpPolynomial::new(28.11, -3.680e-6, 1.746e-5, -1.065e-8),
            Species::H2 => CpPolynomial::new(27.14, 9.274e-3, -1.381e-5, 7.645e-9),
            Species::Ar | Species::He => CpPolynomial::constant(20.786),
            Species::Air => CpPolynomial::new(28.11, 1.967e-3, 4.802e-6, -1.966e-9),
        }
    }

    /// Map to rfluids Pure enum (internal use for CoolProp backend).
    pub(crate) fn rfluids_pure(&self) -> rfluids::substance::Pure {
        use rfluids::substance::Pure;
        match self {
            Species::CH4 => Pure::Methane,
            Species::Ethane => Pure::Ethane,
            Species::Propane => Pure::nPropane,
            Species::NButane => Pure::nButane,
            Species::Isobutane => Pure::Isobutane,
            Species::NPentane => Pure::nPentane,
            Species::Isopentane => Pure::Isopentane,
            Species::NHexane => Pure::nHexane,
            Species::N2 => Pure::Nitrogen,
            Species::CO2 => Pure::CarbonDioxide,
            Species::H2O => Pure::Water,
            Species::O2 => Pure::Oxygen,
            Species::H2 => Pure::Hydrogen,
            Species::Ar => Pure::Argon,
            Species::He => Pure::Helium,
            Species::Air => Pure::Air,
        }
    }
}

impl std::str::FromStr for Species {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CH4" | "METHANE" => Ok(Species::CH4),
            "C2H6" | "ETHANE" => Ok(Species::Ethane),
            "C3H8" | "PROPANE" => Ok(Species::Propane),
            "NBUTANE" | "N-BUTANE" | "BUTANE" | "NC4" => Ok(Species::NButane),
            "ISOBUTANE" | "I-BUTANE" | "IC4" => Ok(Species::Isobutane),
            "NPENTANE" | "N-PENTANE" | "PENTANE" | "NC5" => Ok(Species::NPentane),
            "ISOPENTANE" | "I-PENTANE" | "IC5" => Ok(Species::Isopentane),
            "NHEXANE" | "N-HEXANE" | "HEXANE" | "NC6" => Ok(Species::NHexane),
            "N2" | "NITROGEN" => Ok(Species::N2),
            "CO2" | "CARBONDIOXIDE" | "CARBON DIOXIDE" => Ok(Species::CO2),
            "H2O" | "WATER" => Ok(Species::H2O),
            "O2" | "OXYGEN" => Ok(Species::O2),
            "H2" | "HYDROGEN" => Ok(Species::H2),
            "AR" | "ARGON" => Ok(Species::Ar),
            "HE" | "HELIUM" => Ok(Species::He),
            "AIR" => Ok(Species::Air),
            _ => Err("unknown species"),
        }
    }
}
