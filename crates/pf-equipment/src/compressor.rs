//! Centrifugal compressor driven by a known shaft power.

use crate::common::{EPSILON_MDOT, check_efficiency, check_finite};
use crate::error::{EquipmentError, EquipmentResult};
use crate::traits::Equipment;
use pf_core::CalcId;
use pf_core::units::constants::R_UNIVERSAL;
use pf_core::units::{Power, Pressure, pa};
use pf_thermo::{StreamState, ThermoEngine};

/// Polytropic compressor that absorbs a prescribed shaft power.
///
/// The discharge pressure follows from the power and the polytropic
/// efficiency, evaluated with inlet properties.
///
/// ## Model
///
/// ```text
/// Δh  = W / ṁ
/// Hp  = η_p·Δh
/// n   = 1 / (1 − (κ − 1)/(κ·η_p))
/// B   = n/(n − 1) · Z·R·T_in / MW
/// PR  = ((Hp + B) / B)^(n/(n − 1))
/// P_out = PR·P_in
/// h_out = h_in + Δh
/// ```
///
/// The outlet is the PH flash at `(P_out, h_out)`. An idle machine
/// (ṁ ≈ 0) passes its feed through unchanged.
///
/// ## Sign Conventions
///
/// - `power` is POSITIVE (power consumed from the shaft)
#[derive(Clone, Debug)]
pub struct Compressor {
    /// Equipment name for debugging
    pub name: String,
    /// Shaft power absorbed by the gas
    pub power: Power,
    /// Polytropic efficiency
    pub polytropic_efficiency: f64,
    feed: StreamState,
    outlet: Option<StreamState>,
    polytropic_head: f64,
    calc_id: Option<CalcId>,
}

impl Compressor {
    /// Create a new compressor.
    ///
    /// # Arguments
    /// * `name` - Equipment identifier
    /// * `feed` - Suction stream
    /// * `power` - Shaft power, non-negative
    /// * `polytropic_efficiency` - Efficiency in (0, 1]
    ///
    /// # Errors
    /// Returns error if parameters are out of physical bounds.
    pub fn new(
        name: String,
        feed: StreamState,
        power: Power,
        polytropic_efficiency: f64,
    ) -> EquipmentResult<Self> {
        check_efficiency(
            polytropic_efficiency,
            "compressor polytropic efficiency must be in (0,1]",
        )?;
        Self::with_corrected_efficiency(name, feed, power, polytropic_efficiency)
    }

    /// Compressor whose efficiency comes from a corrected performance map.
    ///
    /// The efficiency must still be positive for the polytropic exponent to
    /// exist; values above 1 are accepted.
    pub(crate) fn with_corrected_efficiency(
        name: String,
        feed: StreamState,
        power: Power,
        polytropic_efficiency: f64,
    ) -> EquipmentResult<Self> {
        check_finite(power.value, "compressor power")?;
        if power.value < 0.0 {
            return Err(EquipmentError::InvalidArg {
                what: "compressor power must be non-negative",
            });
        }
        if !polytropic_efficiency.is_finite() || polytropic_efficiency <= 0.0 {
            return Err(EquipmentError::NonPhysical {
                what: "compressor polytropic efficiency must be positive",
            });
        }
        Ok(Self {
            name,
            power,
            polytropic_efficiency,
            feed,
            outlet: None,
            polytropic_head: 0.0,
            calc_id: None,
        })
    }

    pub fn feed(&self) -> &StreamState {
        &self.feed
    }

    /// Outlet stream of the last run.
    pub fn outlet(&self) -> Option<&StreamState> {
        self.outlet.as_ref()
    }

    /// Polytropic head of the last run [J/kg].
    pub fn polytropic_head(&self) -> f64 {
        self.polytropic_head
    }

    /// Discharge pressure of the last run.
    pub fn outlet_pressure(&self) -> Option<Pressure> {
        self.outlet.as_ref().map(StreamState::pressure)
    }

    /// Pressure ratio reached with polytropic head `head` [J/kg].
    fn pressure_ratio(&self, feed: &StreamState, kappa: f64, head: f64) -> EquipmentResult<f64> {
        let eta = self.polytropic_efficiency;
        let n = 1.0 / (1.0 - (kappa - 1.0) / kappa / eta);
        if !n.is_finite() || n <= 1.0 {
            return Err(EquipmentError::NonPhysical {
                what: "polytropic exponent must exceed 1",
            });
        }
        let exponent = n / (n - 1.0);
        let mw_kg_per_mol = feed.molar_mass() / 1000.0;
        let base = exponent * feed.compressibility() * R_UNIVERSAL * feed.temperature().value
            / mw_kg_per_mol;
        let ratio = ((head + base) / base).powf(exponent);
        check_finite(ratio, "compressor pressure ratio")?;
        Ok(ratio)
    }
}

impl Equipment for Compressor {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, engine: &dyn ThermoEngine, id: CalcId) -> EquipmentResult<()> {
        self.outlet = None;
        self.calc_id = None;

        let feed = engine.refresh(&self.feed)?;
        let mdot = feed.flow_rate().value;

        let (outlet, head) = if mdot <= EPSILON_MDOT {
            (feed.clone(), 0.0)
        } else {
            let dh = self.power.value / mdot;
            let head = dh * self.polytropic_efficiency;
            let kappa = engine.gamma(&feed)?;
            let ratio = self.pressure_ratio(&feed, kappa, head)?;
            let p_out = pa(ratio * feed.pressure().value);
            let outlet = engine.flash_ph_at(&feed, p_out, feed.enthalpy() + dh)?;
            (outlet, head)
        };

        self.polytropic_head = head;
        self.feed = feed;
        self.outlet = Some(outlet);
        self.calc_id = Some(id);
        Ok(())
    }

    fn calculation_id(&self) -> Option<CalcId> {
        self.calc_id
    }
}
