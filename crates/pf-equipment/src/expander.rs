//! Expander (turbine) with a fixed outlet pressure.

use crate::common::{check_efficiency, check_finite, check_positive};
use crate::error::{EquipmentError, EquipmentResult};
use crate::traits::Equipment;
use pf_core::CalcId;
use pf_core::units::{Power, Pressure, watt};
use pf_thermo::{SpecEnthalpy, StreamState, ThermoEngine};

/// Adiabatic expander with an isentropic efficiency.
///
/// ## Model
///
/// ```text
/// h_s   = h(P_out, s_in)
/// Δh_s  = h_in − h_s
/// h_out = h_in − η_s·Δh_s
/// W     = ṁ·(h_in − h_out)
/// ```
///
/// The outlet is the PH flash at `(P_out, h_out)`.
///
/// ## Sign Conventions
///
/// - `power()` is POSITIVE for work delivered to the shaft
#[derive(Clone, Debug)]
pub struct Expander {
    /// Equipment name for debugging
    pub name: String,
    /// Discharge pressure
    pub outlet_pressure: Pressure,
    /// Isentropic efficiency
    pub isentropic_efficiency: f64,
    feed: StreamState,
    outlet: Option<StreamState>,
    isentropic_drop: SpecEnthalpy,
    power: Power,
    calc_id: Option<CalcId>,
}

impl Expander {
    /// Create a new expander.
    ///
    /// # Arguments
    /// * `name` - Equipment identifier
    /// * `feed` - Inlet stream
    /// * `outlet_pressure` - Discharge pressure, below the feed pressure
    /// * `isentropic_efficiency` - Efficiency in (0, 1]
    ///
    /// # Errors
    /// Returns error if parameters are out of physical bounds.
    pub fn new(
        name: String,
        feed: StreamState,
        outlet_pressure: Pressure,
        isentropic_efficiency: f64,
    ) -> EquipmentResult<Self> {
        check_efficiency(
            isentropic_efficiency,
            "expander isentropic efficiency must be in (0,1]",
        )?;
        Self::with_corrected_efficiency(name, feed, outlet_pressure, isentropic_efficiency)
    }

    /// Expander whose efficiency comes from a corrected performance map.
    ///
    /// Map extrapolation can leave the efficiency outside (0, 1]; only
    /// finiteness is enforced.
    pub(crate) fn with_corrected_efficiency(
        name: String,
        feed: StreamState,
        outlet_pressure: Pressure,
        isentropic_efficiency: f64,
    ) -> EquipmentResult<Self> {
        check_finite(isentropic_efficiency, "expander isentropic efficiency")?;
        check_positive(outlet_pressure.value, "expander outlet pressure must be positive")?;
        if outlet_pressure.value >= feed.pressure().value {
            return Err(EquipmentError::InvalidArg {
                what: "expander outlet pressure must be below feed pressure",
            });
        }
        Ok(Self {
            name,
            outlet_pressure,
            isentropic_efficiency,
            feed,
            outlet: None,
            isentropic_drop: 0.0,
            power: watt(0.0),
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

    /// Shaft power delivered in the last run.
    pub fn power(&self) -> Power {
        self.power
    }

    /// Isentropic enthalpy drop of the last run [J/kg].
    pub fn isentropic_enthalpy_drop(&self) -> SpecEnthalpy {
        self.isentropic_drop
    }
}

impl Equipment for Expander {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, engine: &dyn ThermoEngine, id: CalcId) -> EquipmentResult<()> {
        self.outlet = None;
        self.calc_id = None;

        let feed = engine.refresh(&self.feed)?;
        let isentropic = engine.isentropic_to(&feed, self.outlet_pressure)?;
        let drop = feed.enthalpy() - isentropic.enthalpy();
        check_finite(drop, "isentropic enthalpy drop")?;

        let h_out = feed.enthalpy() - self.isentropic_efficiency * drop;
        let outlet = engine.flash_ph_at(&feed, self.outlet_pressure, h_out)?;

        self.power = watt(feed.flow_rate().value * (feed.enthalpy() - outlet.enthalpy()));
        self.isentropic_drop = drop;
        self.feed = feed;
        self.outlet = Some(outlet);
        self.calc_id = Some(id);
        Ok(())
    }

    fn calculation_id(&self) -> Option<CalcId> {
        self.calc_id
    }
}
