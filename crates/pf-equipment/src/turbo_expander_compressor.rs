//! Turbo-expander/compressor on a common shaft.

use crate::common::{check_efficiency, check_finite, check_positive};
use crate::compressor::Compressor;
use crate::curve::PerformanceCurve;
use crate::error::{EquipmentError, EquipmentResult};
use crate::expander::Expander;
use crate::traits::Equipment;
use pf_core::CalcId;
use pf_core::units::{
    AngularVelocity, Area, Length, Power, Pressure, bara, m, mm2, rpm, to_rpm, watt,
};
use pf_solver::{NewtonConfig, NewtonStatus, solve_scalar};
use pf_thermo::{StreamState, ThermoEngine};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, info, warn};

/// Curvature of the default expander U/C efficiency parabola.
pub const DEFAULT_UC_CURVATURE: f64 = -3.56;

/// Design point of the expander/compressor pair.
#[derive(Clone, Debug, PartialEq)]
pub struct TurboExpanderDesign {
    /// Expander wheel diameter
    pub impeller_diameter: Length,
    /// Shaft speed at the design point
    pub design_speed: AngularVelocity,
    /// Velocity ratio U/C at peak expander efficiency
    pub design_uc: f64,
    /// Flow coefficient Q/N [m³/rev] at the compressor design point
    pub design_qn: f64,
    /// Expander isentropic efficiency at design U/C
    pub expander_isentropic_efficiency: f64,
    /// Compressor polytropic efficiency at design Q/N
    pub compressor_polytropic_efficiency: f64,
    /// Compressor polytropic head at design speed [kJ/kg]
    pub compressor_polytropic_head: f64,
    /// Bearing friction at design speed, scales with (N/N_design)²
    pub bearing_loss: Power,
    /// Expander discharge pressure
    pub expander_outlet_pressure: Pressure,
    /// Inlet guide vane area when fully open
    pub maximum_igv_area: Area,
    /// Inlet guide vane opening fraction
    pub igv_opening: f64,
    /// Compressor speed over expander speed
    pub gear_ratio: f64,
}

impl Default for TurboExpanderDesign {
    fn default() -> Self {
        Self {
            impeller_diameter: m(0.424),
            design_speed: rpm(6850.0),
            design_uc: 0.7,
            design_qn: 0.03328,
            expander_isentropic_efficiency: 1.0,
            compressor_polytropic_efficiency: 0.81,
            compressor_polytropic_head: 20.47,
            bearing_loss: watt(10.0),
            expander_outlet_pressure: bara(40.0),
            maximum_igv_area: mm2(1.637e4),
            igv_opening: 1.0,
            gear_ratio: 1.0,
        }
    }
}

impl TurboExpanderDesign {
    pub fn validate(&self) -> EquipmentResult<()> {
        check_positive(self.impeller_diameter.value, "impeller diameter must be positive")?;
        check_positive(self.design_speed.value, "design speed must be positive")?;
        check_positive(self.design_uc, "design U/C must be positive")?;
        check_positive(self.design_qn, "design Q/N must be positive")?;
        check_efficiency(
            self.expander_isentropic_efficiency,
            "expander design efficiency must be in (0,1]",
        )?;
        check_efficiency(
            self.compressor_polytropic_efficiency,
            "compressor design efficiency must be in (0,1]",
        )?;
        check_finite(self.compressor_polytropic_head, "compressor design head")?;
        check_finite(self.bearing_loss.value, "bearing loss")?;
        if self.bearing_loss.value < 0.0 {
            return Err(EquipmentError::InvalidArg {
                what: "bearing loss must be non-negative",
            });
        }
        check_positive(
            self.expander_outlet_pressure.value,
            "expander outlet pressure must be positive",
        )?;
        check_finite(self.maximum_igv_area.value, "maximum IGV area")?;
        if self.maximum_igv_area.value < 0.0 {
            return Err(EquipmentError::InvalidArg {
                what: "maximum IGV area must be non-negative",
            });
        }
        if !(0.0..=1.0).contains(&self.igv_opening) {
            return Err(EquipmentError::InvalidArg {
                what: "IGV opening must be in [0,1]",
            });
        }
        check_positive(self.gear_ratio, "gear ratio must be positive")?;
        Ok(())
    }
}

/// Speed matching configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedMatchConfig {
    /// Newton iteration on shaft speed, in rpm
    pub newton: NewtonConfig,
    /// Starting speed [rpm]; the design speed when unset
    pub initial_speed_rpm: Option<f64>,
}

/// Terminal state of the speed match.
pub type SpeedMatchStatus = NewtonStatus;

/// Correction-curve slots of the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveSlot {
    /// Expander efficiency multiplier vs. U/C ratio
    ExpanderUc,
    /// Compressor efficiency multiplier vs. Q/N ratio
    CompressorQnEfficiency,
    /// Compressor head multiplier vs. Q/N ratio
    CompressorQnHead,
}

/// Results of a speed match, all evaluated at the final speed.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedMatchResult {
    pub status: SpeedMatchStatus,
    pub iterations: usize,
    /// Expander shaft speed
    pub speed: AngularVelocity,
    /// Power imbalance W_expander − W_compressor − W_bearing
    pub residual: Power,
    pub expander_power: Power,
    pub compressor_power: Power,
    pub bearing_loss: Power,
    pub expander_isentropic_efficiency: f64,
    pub compressor_polytropic_efficiency: f64,
    /// [kJ/kg]
    pub compressor_polytropic_head: f64,
    /// U/C over design U/C
    pub uc_ratio: f64,
    /// Q/N over design Q/N
    pub qn_ratio: f64,
    /// Flow parameter N/60·Q/designQn
    pub qn: f64,
    /// Expander isentropic enthalpy drop [J/kg]
    pub isentropic_enthalpy_drop: f64,
}

/// Single-shaft turbo-expander driving a centrifugal compressor.
///
/// The shaft speed is found so that expander power covers compressor power
/// plus bearing friction. Off-design behaviour comes from dimensionless
/// correction curves; an unset curve leaves the design value unchanged.
///
/// ## Model
///
/// Speed independent:
///
/// ```text
/// h_s = h_in − h(P_out, s_in)
/// C   = √(2·h_s)
/// Q   = ṁ_comp / ρ_comp
/// ```
///
/// At shaft speed N [rpm]:
///
/// ```text
/// U      = π·D·N/60
/// uc     = U / C / designUC
/// η_s    = η_s,design · CF_uc(uc)
/// W_exp  = ṁ_exp · h_s · η_s
///
/// qn     = (Q·60/N) / designQn
/// η_p    = η_p,design · CF_eff(qn)
/// Hp     = Hp_design · (N/N_design)² · CF_head(qn)
/// W_comp = ṁ_comp · Hp / η_p
///
/// W_bear = W_bear,design · (N/N_design)²
/// f(N)   = W_exp − W_comp − W_bear
/// ```
///
/// `f(N) = 0` is solved with the bounded damped Newton iteration of
/// [`pf_solver::solve_scalar`]. Afterwards an [`Expander`] and a
/// [`Compressor`] are run at the matched efficiencies and power to produce
/// full outlet streams.
#[derive(Clone, Debug)]
pub struct TurboExpanderCompressor {
    /// Equipment name for debugging
    pub name: String,
    pub design: TurboExpanderDesign,
    pub config: SpeedMatchConfig,
    expander_feed: StreamState,
    compressor_feed: StreamState,
    uc_curve: Option<PerformanceCurve>,
    qn_efficiency_curve: Option<PerformanceCurve>,
    qn_head_curve: Option<PerformanceCurve>,
    result: Option<SpeedMatchResult>,
    expander: Option<Expander>,
    compressor: Option<Compressor>,
    calc_id: Option<CalcId>,
}

impl TurboExpanderCompressor {
    /// Create a machine whose compressor takes a copy of the expander feed.
    ///
    /// The expander U/C curve defaults to a parabola of curvature
    /// [`DEFAULT_UC_CURVATURE`]; both Q/N curves start unset.
    ///
    /// # Errors
    /// Returns error if the design parameters are out of physical bounds.
    pub fn new(
        name: String,
        expander_feed: StreamState,
        design: TurboExpanderDesign,
    ) -> EquipmentResult<Self> {
        design.validate()?;
        Ok(Self {
            name,
            design,
            config: SpeedMatchConfig::default(),
            compressor_feed: expander_feed.clone(),
            expander_feed,
            uc_curve: Some(PerformanceCurve::parabola(DEFAULT_UC_CURVATURE)),
            qn_efficiency_curve: None,
            qn_head_curve: None,
            result: None,
            expander: None,
            compressor: None,
            calc_id: None,
        })
    }

    pub fn with_compressor_feed(mut self, feed: StreamState) -> Self {
        self.compressor_feed = feed;
        self
    }

    pub fn expander_feed(&self) -> &StreamState {
        &self.expander_feed
    }

    pub fn compressor_feed(&self) -> &StreamState {
        &self.compressor_feed
    }

    pub fn set_expander_feed(&mut self, feed: StreamState) {
        self.expander_feed = feed;
    }

    pub fn set_compressor_feed(&mut self, feed: StreamState) {
        self.compressor_feed = feed;
    }

    pub fn curve(&self, slot: CurveSlot) -> Option<&PerformanceCurve> {
        match slot {
            CurveSlot::ExpanderUc => self.uc_curve.as_ref(),
            CurveSlot::CompressorQnEfficiency => self.qn_efficiency_curve.as_ref(),
            CurveSlot::CompressorQnHead => self.qn_head_curve.as_ref(),
        }
    }

    /// Replace a correction curve; `None` makes the slot an identity multiplier.
    pub fn set_curve(&mut self, slot: CurveSlot, curve: Option<PerformanceCurve>) {
        match slot {
            CurveSlot::ExpanderUc => self.uc_curve = curve,
            CurveSlot::CompressorQnEfficiency => self.qn_efficiency_curve = curve,
            CurveSlot::CompressorQnHead => self.qn_head_curve = curve,
        }
    }

    /// Fit the expander U/C parabola from (uc, efficiency factor) samples.
    ///
    /// On error the current curve is kept.
    pub fn set_uc_curve(&mut self, uc: &[f64], factor: &[f64]) -> EquipmentResult<()> {
        let curve = PerformanceCurve::fit_parabola(uc, factor)?;
        self.set_curve(CurveSlot::ExpanderUc, Some(curve));
        Ok(())
    }

    /// Fit the compressor Q/N efficiency spline. On error the current curve is kept.
    pub fn set_qn_efficiency_curve(&mut self, qn: &[f64], factor: &[f64]) -> EquipmentResult<()> {
        let curve = PerformanceCurve::fit_spline(qn, factor)?;
        self.set_curve(CurveSlot::CompressorQnEfficiency, Some(curve));
        Ok(())
    }

    /// Fit the compressor Q/N head spline. On error the current curve is kept.
    pub fn set_qn_head_curve(&mut self, qn: &[f64], factor: &[f64]) -> EquipmentResult<()> {
        let curve = PerformanceCurve::fit_spline(qn, factor)?;
        self.set_curve(CurveSlot::CompressorQnHead, Some(curve));
        Ok(())
    }

    /// Inlet guide vane open area.
    pub fn igv_open_area(&self) -> Area {
        self.design.maximum_igv_area * self.design.igv_opening
    }

    /// IGV opening that passes the expander feed at 1 m/s, capped at fully open.
    pub fn igv_opening_from_flow(&self) -> f64 {
        let max_area = self.design.maximum_igv_area.value;
        if max_area <= 0.0 {
            return 0.0;
        }
        // Q [m³/s] over 1 m/s gives the required area in m²
        let required_area = self.expander_feed.volumetric_flow().value / 1.0;
        (required_area / max_area).min(1.0)
    }

    /// Results of the last successful run.
    pub fn result(&self) -> Option<&SpeedMatchResult> {
        self.result.as_ref()
    }

    pub fn speed(&self) -> Option<AngularVelocity> {
        self.result.as_ref().map(|r| r.speed)
    }

    /// Compressor shaft speed, expander speed times the gear ratio.
    pub fn compressor_speed(&self) -> Option<AngularVelocity> {
        self.speed().map(|n| n * self.design.gear_ratio)
    }

    pub fn expander_power(&self) -> Option<Power> {
        self.result.as_ref().map(|r| r.expander_power)
    }

    pub fn compressor_power(&self) -> Option<Power> {
        self.result.as_ref().map(|r| r.compressor_power)
    }

    pub fn expander_isentropic_efficiency(&self) -> Option<f64> {
        self.result.as_ref().map(|r| r.expander_isentropic_efficiency)
    }

    pub fn compressor_polytropic_efficiency(&self) -> Option<f64> {
        self.result.as_ref().map(|r| r.compressor_polytropic_efficiency)
    }

    /// Compressor polytropic head [kJ/kg].
    pub fn compressor_polytropic_head(&self) -> Option<f64> {
        self.result.as_ref().map(|r| r.compressor_polytropic_head)
    }

    pub fn uc_ratio(&self) -> Option<f64> {
        self.result.as_ref().map(|r| r.uc_ratio)
    }

    pub fn qn_ratio(&self) -> Option<f64> {
        self.result.as_ref().map(|r| r.qn_ratio)
    }

    pub fn qn(&self) -> Option<f64> {
        self.result.as_ref().map(|r| r.qn)
    }

    pub fn expander_outlet(&self) -> Option<&StreamState> {
        self.expander.as_ref().and_then(Expander::outlet)
    }

    pub fn compressor_outlet(&self) -> Option<&StreamState> {
        self.compressor.as_ref().and_then(Compressor::outlet)
    }

    /// Expander model of the last run.
    pub fn expander(&self) -> Option<&Expander> {
        self.expander.as_ref()
    }

    /// Compressor model of the last run.
    pub fn compressor(&self) -> Option<&Compressor> {
        self.compressor.as_ref()
    }
}

fn correction(curve: Option<&PerformanceCurve>, x: f64) -> f64 {
    curve.map_or(1.0, |c| c.evaluate(x))
}

/// Shaft power balance at a given speed.
#[derive(Clone, Copy, Debug)]
struct OperatingPoint {
    uc_ratio: f64,
    qn_ratio: f64,
    expander_efficiency: f64,
    compressor_efficiency: f64,
    polytropic_head: f64,
    expander_power: f64,
    compressor_power: f64,
    bearing_loss: f64,
}

impl OperatingPoint {
    fn residual(&self) -> f64 {
        self.expander_power - self.compressor_power - self.bearing_loss
    }
}

/// Speed-independent quantities of one run.
struct ShaftModel<'a> {
    machine: &'a TurboExpanderCompressor,
    design_rpm: f64,
    spouting_velocity: f64,
    isentropic_drop: f64,
    expander_mdot: f64,
    compressor_mdot: f64,
    compressor_q: f64,
}

impl ShaftModel<'_> {
    fn at(&self, n: f64) -> OperatingPoint {
        let design = &self.machine.design;
        let speed_ratio = n / self.design_rpm;

        let tip_speed = PI * design.impeller_diameter.value * n / 60.0;
        let uc_ratio = tip_speed / self.spouting_velocity / design.design_uc;
        let expander_efficiency = design.expander_isentropic_efficiency
            * correction(self.machine.uc_curve.as_ref(), uc_ratio);
        let expander_power = self.expander_mdot * self.isentropic_drop * expander_efficiency;

        let qn_ratio = self.compressor_q * 60.0 / n / design.design_qn;
        let compressor_efficiency = design.compressor_polytropic_efficiency
            * correction(self.machine.qn_efficiency_curve.as_ref(), qn_ratio);
        let polytropic_head = design.compressor_polytropic_head
            * speed_ratio.powi(2)
            * correction(self.machine.qn_head_curve.as_ref(), qn_ratio);
        let compressor_power = self.compressor_mdot * polytropic_head / compressor_efficiency * 1000.0;

        let bearing_loss = design.bearing_loss.value * speed_ratio.powi(2);

        OperatingPoint {
            uc_ratio,
            qn_ratio,
            expander_efficiency,
            compressor_efficiency,
            polytropic_head,
            expander_power,
            compressor_power,
            bearing_loss,
        }
    }
}

impl Equipment for TurboExpanderCompressor {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, engine: &dyn ThermoEngine, id: CalcId) -> EquipmentResult<()> {
        self.result = None;
        self.expander = None;
        self.compressor = None;
        self.calc_id = None;

        self.design.validate()?;
        if self.config.newton.lower_bound <= 0.0 {
            return Err(EquipmentError::InvalidArg {
                what: "minimum shaft speed must be positive",
            });
        }

        let expander_feed = engine.refresh(&self.expander_feed)?;
        let compressor_feed = engine.refresh(&self.compressor_feed)?;
        let p_out = self.design.expander_outlet_pressure;
        if p_out.value >= expander_feed.pressure().value {
            return Err(EquipmentError::InvalidArg {
                what: "expander outlet pressure must be below feed pressure",
            });
        }

        let isentropic = engine.isentropic_to(&expander_feed, p_out)?;
        let isentropic_drop = expander_feed.enthalpy() - isentropic.enthalpy();
        if !isentropic_drop.is_finite() || isentropic_drop <= 0.0 {
            return Err(EquipmentError::NonPhysical {
                what: "expander isentropic enthalpy drop must be positive",
            });
        }

        let design_rpm = to_rpm(self.design.design_speed);
        let compressor_q = compressor_feed.volumetric_flow().value;
        let shaft = ShaftModel {
            machine: self,
            design_rpm,
            spouting_velocity: (2.0 * isentropic_drop).sqrt(),
            isentropic_drop,
            expander_mdot: expander_feed.flow_rate().value,
            compressor_mdot: compressor_feed.flow_rate().value,
            compressor_q,
        };

        let n0 = self.config.initial_speed_rpm.unwrap_or(design_rpm);
        let solution = solve_scalar(n0, &self.config.newton, |n| {
            let point = shaft.at(n);
            debug!(
                speed_rpm = n,
                expander_power = point.expander_power,
                compressor_power = point.compressor_power,
                "shaft balance"
            );
            Ok::<f64, EquipmentError>(point.residual())
        })?;
        let point = shaft.at(solution.x);

        match solution.status {
            NewtonStatus::Converged => info!(
                name = %self.name,
                speed_rpm = solution.x,
                iterations = solution.iterations,
                "speed match converged"
            ),
            NewtonStatus::IterationLimitReached => warn!(
                name = %self.name,
                speed_rpm = solution.x,
                residual = solution.residual,
                iterations = solution.iterations,
                "speed match reached iteration limit; publishing last iterate"
            ),
        }

        let mut expander = Expander::with_corrected_efficiency(
            format!("{}/expander", self.name),
            expander_feed,
            p_out,
            point.expander_efficiency,
        )?;
        expander.run(engine, id)?;

        let mut compressor = Compressor::with_corrected_efficiency(
            format!("{}/compressor", self.name),
            compressor_feed,
            watt(point.compressor_power),
            point.compressor_efficiency,
        )?;
        compressor.run(engine, id)?;

        self.result = Some(SpeedMatchResult {
            status: solution.status,
            iterations: solution.iterations,
            speed: rpm(solution.x),
            residual: watt(point.residual()),
            expander_power: watt(point.expander_power),
            compressor_power: watt(point.compressor_power),
            bearing_loss: watt(point.bearing_loss),
            expander_isentropic_efficiency: point.expander_efficiency,
            compressor_polytropic_efficiency: point.compressor_efficiency,
            compressor_polytropic_head: point.polytropic_head,
            uc_ratio: point.uc_ratio,
            qn_ratio: point.qn_ratio,
            qn: solution.x / 60.0 * compressor_q / self.design.design_qn,
            isentropic_enthalpy_drop: isentropic_drop,
        });
        self.expander = Some(expander);
        self.compressor = Some(compressor);
        self.calc_id = Some(id);
        Ok(())
    }

    fn calculation_id(&self) -> Option<CalcId> {
        self.calc_id
    }
}
