//! Multi-stream heat exchanger solved by energy balancing.

use crate::common::{check_positive, hottest_and_coldest};
use crate::error::{EquipmentError, EquipmentResult};
use crate::traits::Equipment;
use pf_core::CalcId;
use pf_core::numeric::relative_error;
use pf_core::units::{Power, TempInterval, Temperature, dk, k, watt};
use pf_thermo::{StreamState, ThermoEngine};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Default minimum temperature approach [K].
pub const DEFAULT_APPROACH_K: f64 = 10.0;

/// Outer-loop configuration of the energy balance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Balancing passes allowed when matching a target UA
    pub max_iterations: usize,
    /// Relative UA mismatch accepted as converged
    pub ua_rel_tol: f64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            ua_rel_tol: 1e-3,
        }
    }
}

/// Terminal state of a balance run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceStatus {
    Converged,
    IterationLimitReached,
}

/// Flow arrangement used for effectiveness-NTU estimates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowArrangement {
    #[default]
    CounterFlow,
    ParallelFlow,
    CrossFlow,
}

impl FlowArrangement {
    /// Thermal effectiveness ε for `ntu` and capacity ratio `cr = C_min/C_max`.
    pub fn effectiveness(self, ntu: f64, cr: f64) -> f64 {
        match self {
            FlowArrangement::CounterFlow => {
                if (cr - 1.0).abs() < 1e-12 {
                    ntu / (1.0 + ntu)
                } else {
                    let e = (-ntu * (1.0 - cr)).exp();
                    (1.0 - e) / (1.0 - cr * e)
                }
            }
            FlowArrangement::ParallelFlow => (1.0 - (-ntu * (1.0 + cr)).exp()) / (1.0 + cr),
            FlowArrangement::CrossFlow => 1.0 - (-ntu * (1.0 + cr).powf(0.22)).exp(),
        }
    }
}

/// Direction of heat flow for one stream in a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeatDirection {
    Heated,
    Cooled,
    Unchanged,
}

/// Diagnostics of one balancing pass.
#[derive(Clone, Debug, PartialEq)]
pub struct BalancePass {
    /// Per-stream ΔH = H_out − H_in before rescaling
    pub stream_duties: Vec<Power>,
    pub directions: Vec<HeatDirection>,
    pub heat_gained: Power,
    pub heat_lost: Power,
    /// Side whose total was the smaller; its streams are left as bootstrapped
    pub limiting_side: HeatDirection,
    pub limiting_heat: Power,
    pub scaling_factor: f64,
    /// Largest outlet temperature shift caused by rescaling
    pub max_temperature_change: TempInterval,
    /// Temperature approach this pass started from
    pub approach: TempInterval,
    /// [K]
    pub lmtd: f64,
    /// [W/K]
    pub ua: f64,
}

/// Log-mean temperature difference of two terminal differences [K].
///
/// Differences that agree to 1e-9 relative use their mean, which is the
/// limit of the log-mean.
pub fn lmtd(dt1: f64, dt2: f64) -> f64 {
    if (dt1 - dt2).abs() <= 1e-9 * dt1.abs().max(dt2.abs()) {
        0.5 * (dt1 + dt2)
    } else {
        (dt1 - dt2) / (dt1 / dt2).ln()
    }
}

/// Multi-stream heat exchanger.
///
/// Every feed leaves at its own inlet pressure; only outlet temperatures
/// are solved for.
///
/// ## Model
///
/// Bootstrap outlet temperatures from the temperature approach `a`:
///
/// ```text
/// T_out(hottest) = T_in(coldest) + a
/// T_out(other)   = T_in(hottest) − a
/// ```
///
/// Each pass classifies streams by `ΔH = ṁ·(h_out − h_in)`, takes the
/// smaller of total heat gained and lost as the limiting duty, and rescales
/// the other side so both totals agree:
///
/// ```text
/// s     = limiting / larger
/// h_out = h_in ± s·|h_out − h_in|
/// ```
///
/// The exchanger is then rated on the hottest and coldest feeds:
///
/// ```text
/// ΔT1  = T_in(hot) − T_out(cold)
/// ΔT2  = T_out(hot) − T_in(cold)
/// LMTD = (ΔT1 − ΔT2) / ln(ΔT1/ΔT2)
/// UA   = limiting / LMTD
/// ```
///
/// With a target UA set, the approach is updated as `a ← a·UA/UA_target`
/// and the exchanger is bootstrapped again until the UA matches.
#[derive(Clone, Debug)]
pub struct MultiStreamHeatExchanger {
    /// Equipment name for debugging
    pub name: String,
    pub config: BalanceConfig,
    /// Arrangement assumed by [`Self::thermal_effectiveness`]
    pub flow_arrangement: FlowArrangement,
    inlets: Vec<StreamState>,
    outlets: Vec<StreamState>,
    approach: f64,
    ua_target: Option<f64>,
    status: Option<BalanceStatus>,
    iterations: usize,
    last_pass: Option<BalancePass>,
    calc_id: Option<CalcId>,
}

/// Steps of the outer loop.
enum Phase {
    Bootstrap,
    Balancing,
}

impl MultiStreamHeatExchanger {
    /// Create an exchanger with no feeds and the default approach.
    pub fn new(name: String) -> Self {
        Self {
            name,
            config: BalanceConfig::default(),
            flow_arrangement: FlowArrangement::default(),
            inlets: Vec::new(),
            outlets: Vec::new(),
            approach: DEFAULT_APPROACH_K,
            ua_target: None,
            status: None,
            iterations: 0,
            last_pass: None,
            calc_id: None,
        }
    }

    /// Append a feed stream.
    pub fn add_in_stream(&mut self, feed: StreamState) {
        self.inlets.push(feed);
        self.clear_results();
    }

    /// Replace feed stream `index`.
    pub fn set_feed_stream(&mut self, index: usize, feed: StreamState) -> EquipmentResult<()> {
        let len = self.inlets.len();
        let slot = self.inlets.get_mut(index).ok_or(EquipmentError::IndexOob {
            what: "feed stream",
            index,
            len,
        })?;
        *slot = feed;
        self.clear_results();
        Ok(())
    }

    pub fn number_of_feed_streams(&self) -> usize {
        self.inlets.len()
    }

    pub fn in_stream(&self, index: usize) -> EquipmentResult<&StreamState> {
        self.inlets.get(index).ok_or(EquipmentError::IndexOob {
            what: "feed stream",
            index,
            len: self.inlets.len(),
        })
    }

    /// Outlet of feed `index` from the last run.
    pub fn out_stream(&self, index: usize) -> EquipmentResult<&StreamState> {
        if self.status.is_none() {
            return Err(EquipmentError::NotRun {
                what: "outlet streams",
            });
        }
        self.outlets.get(index).ok_or(EquipmentError::IndexOob {
            what: "outlet stream",
            index,
            len: self.outlets.len(),
        })
    }

    pub fn in_temperature(&self, index: usize) -> EquipmentResult<Temperature> {
        self.in_stream(index).map(StreamState::temperature)
    }

    pub fn out_temperature(&self, index: usize) -> EquipmentResult<Temperature> {
        self.out_stream(index).map(StreamState::temperature)
    }

    pub fn temperature_approach(&self) -> TempInterval {
        dk(self.approach)
    }

    pub fn set_temperature_approach(&mut self, approach: TempInterval) -> EquipmentResult<()> {
        check_positive(approach.value, "temperature approach must be positive")?;
        self.approach = approach.value;
        Ok(())
    }

    /// UA [W/K] computed by the last run, else the target if one is set.
    pub fn ua_value(&self) -> Option<f64> {
        self.last_pass.as_ref().map(|p| p.ua).or(self.ua_target)
    }

    /// Set a target UA [W/K]; runs then adjust the approach to meet it.
    pub fn set_ua_value(&mut self, ua: f64) -> EquipmentResult<()> {
        check_positive(ua, "target UA must be positive")?;
        self.ua_target = Some(ua);
        Ok(())
    }

    pub fn clear_ua_value(&mut self) {
        self.ua_target = None;
    }

    pub fn ua_target(&self) -> Option<f64> {
        self.ua_target
    }

    pub fn status(&self) -> Option<BalanceStatus> {
        self.status
    }

    /// Balancing passes used by the last run.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn last_pass(&self) -> Option<&BalancePass> {
        self.last_pass.as_ref()
    }

    /// Exchanger duty, the limiting heat of the last pass.
    pub fn duty(&self) -> EquipmentResult<Power> {
        self.last_pass
            .as_ref()
            .map(|p| p.limiting_heat)
            .ok_or(EquipmentError::NotRun { what: "duty" })
    }

    /// Enthalpy flow change H_out − H_in of stream `index`.
    pub fn stream_duty(&self, index: usize) -> EquipmentResult<Power> {
        let outlet = self.out_stream(index)?;
        let inlet = self.in_stream(index)?;
        Ok(outlet.enthalpy_flow() - inlet.enthalpy_flow())
    }

    /// Mass balance Σ(ṁ_out − ṁ_in) [kg/s]; zero for a well-posed run.
    pub fn mass_balance(&self) -> EquipmentResult<f64> {
        if self.status.is_none() {
            return Err(EquipmentError::NotRun {
                what: "mass balance",
            });
        }
        Ok(self
            .inlets
            .iter()
            .zip(&self.outlets)
            .map(|(i, o)| o.flow_rate().value - i.flow_rate().value)
            .sum())
    }

    /// Entropy production [W/K].
    ///
    /// Stream entropy change plus the duty transferred between the first
    /// and last feed temperatures.
    pub fn entropy_production(&self) -> EquipmentResult<f64> {
        let duty = self.duty()?.value.abs();
        let streams: f64 = self
            .inlets
            .iter()
            .zip(&self.outlets)
            .map(|(i, o)| o.entropy_flow() - i.entropy_flow())
            .sum();
        let (first, last) = match (self.inlets.first(), self.inlets.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(EquipmentError::NoStreams),
        };
        let transfer = duty * (1.0 / last.temperature().value - 1.0 / first.temperature().value);
        Ok(streams + transfer)
    }

    /// Enthalpy imbalance Σ ΔH as a percentage of stream 0's duty.
    pub fn heat_balance_deviation(&self) -> EquipmentResult<f64> {
        let reference = self.stream_duty(0)?.value;
        let mut total = 0.0;
        for i in 0..self.outlets.len() {
            total += self.stream_duty(i)?.value;
        }
        if reference == 0.0 {
            return Ok(0.0);
        }
        Ok(total / reference.abs() * 100.0)
    }

    /// Effectiveness for the configured flow arrangement.
    pub fn thermal_effectiveness(&self, ntu: f64, cr: f64) -> f64 {
        self.flow_arrangement.effectiveness(ntu, cr)
    }

    fn clear_results(&mut self) {
        self.outlets.clear();
        self.status = None;
        self.iterations = 0;
        self.last_pass = None;
        self.calc_id = None;
    }
}

/// Initial outlet guesses from the temperature approach.
fn bootstrap(
    engine: &dyn ThermoEngine,
    inlets: &[StreamState],
    approach: f64,
) -> EquipmentResult<Vec<StreamState>> {
    let (hot, cold) = hottest_and_coldest(inlets).ok_or(EquipmentError::NoStreams)?;
    let t_hot = inlets[hot].temperature().value;
    let t_cold = inlets[cold].temperature().value;

    inlets
        .iter()
        .enumerate()
        .map(|(i, inlet)| {
            let t_out = if i == hot {
                t_cold + approach
            } else {
                t_hot - approach
            };
            engine
                .with_temperature(inlet, k(t_out))
                .map_err(EquipmentError::from)
        })
        .collect()
}

/// One energy balance and rating pass over refreshed inlets and outlets.
fn balance_pass(
    engine: &dyn ThermoEngine,
    inlets: &mut [StreamState],
    outlets: &mut [StreamState],
    approach: f64,
) -> EquipmentResult<BalancePass> {
    for state in inlets.iter_mut().chain(outlets.iter_mut()) {
        *state = engine.refresh(state)?;
    }

    let stream_duties: Vec<f64> = inlets
        .iter()
        .zip(outlets.iter())
        .map(|(i, o)| o.enthalpy_flow().value - i.enthalpy_flow().value)
        .collect();
    let directions: Vec<HeatDirection> = stream_duties
        .iter()
        .map(|&dh| {
            if dh > 0.0 {
                HeatDirection::Heated
            } else if dh < 0.0 {
                HeatDirection::Cooled
            } else {
                HeatDirection::Unchanged
            }
        })
        .collect();

    let heat_gained: f64 = stream_duties.iter().filter(|&&dh| dh > 0.0).sum();
    let heat_lost: f64 = -stream_duties.iter().filter(|&&dh| dh < 0.0).sum::<f64>();

    let (limiting_side, limiting_heat, larger) = if heat_gained <= heat_lost {
        (HeatDirection::Heated, heat_gained, heat_lost)
    } else {
        (HeatDirection::Cooled, heat_lost, heat_gained)
    };
    let scaling_factor = if larger == 0.0 { 1.0 } else { limiting_heat / larger };

    let mut max_temperature_change: f64 = 0.0;
    for (i, direction) in directions.iter().enumerate() {
        if *direction == HeatDirection::Unchanged || *direction == limiting_side {
            continue;
        }
        let h_in = inlets[i].enthalpy();
        let dh = (outlets[i].enthalpy() - h_in).abs() * scaling_factor;
        let h_target = match direction {
            HeatDirection::Heated => h_in + dh,
            _ => h_in - dh,
        };
        let rescaled = engine.flash_ph(&outlets[i], h_target)?;
        let shift = (rescaled.temperature().value - outlets[i].temperature().value).abs();
        max_temperature_change = max_temperature_change.max(shift);
        outlets[i] = rescaled;
    }

    debug!(
        heat_gained,
        heat_lost,
        scaling_factor,
        max_temperature_change,
        "energy balance pass"
    );

    let (hot, cold) = hottest_and_coldest(inlets).ok_or(EquipmentError::NoStreams)?;
    let dt1 = inlets[hot].temperature().value - outlets[cold].temperature().value;
    let dt2 = outlets[hot].temperature().value - inlets[cold].temperature().value;
    if dt1 <= 0.0 || dt2 <= 0.0 {
        return Err(EquipmentError::TemperatureCross { dt1, dt2 });
    }

    let lmtd = lmtd(dt1, dt2);
    let ua = limiting_heat / lmtd;

    Ok(BalancePass {
        stream_duties: stream_duties.into_iter().map(watt).collect(),
        directions,
        heat_gained: watt(heat_gained),
        heat_lost: watt(heat_lost),
        limiting_side,
        limiting_heat: watt(limiting_heat),
        scaling_factor,
        max_temperature_change: dk(max_temperature_change),
        approach: dk(approach),
        lmtd,
        ua,
    })
}

impl Equipment for MultiStreamHeatExchanger {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, engine: &dyn ThermoEngine, id: CalcId) -> EquipmentResult<()> {
        self.clear_results();
        if self.inlets.is_empty() {
            return Err(EquipmentError::NoStreams);
        }

        let mut inlets = self.inlets.clone();
        let mut outlets = Vec::new();
        let mut approach = self.approach;
        let mut iterations = 0;
        let mut phase = Phase::Bootstrap;

        let (status, pass) = loop {
            match phase {
                Phase::Bootstrap => {
                    outlets = bootstrap(engine, &inlets, approach)?;
                    phase = Phase::Balancing;
                }
                Phase::Balancing => {
                    iterations += 1;
                    let pass = balance_pass(engine, &mut inlets, &mut outlets, approach)?;

                    let Some(target) = self.ua_target else {
                        break (BalanceStatus::Converged, pass);
                    };
                    if relative_error(pass.ua, target)? <= self.config.ua_rel_tol {
                        break (BalanceStatus::Converged, pass);
                    }
                    if iterations >= self.config.max_iterations {
                        warn!(
                            name = %self.name,
                            ua = pass.ua,
                            ua_target = target,
                            iterations,
                            "energy balance reached iteration limit"
                        );
                        break (BalanceStatus::IterationLimitReached, pass);
                    }
                    approach *= pass.ua / target;
                    debug!(approach, ua = pass.ua, ua_target = target, "adjusting approach");
                    phase = Phase::Bootstrap;
                }
            }
        };

        info!(
            name = %self.name,
            duty = pass.limiting_heat.value,
            lmtd = pass.lmtd,
            ua = pass.ua,
            iterations,
            "heat exchanger balanced"
        );

        self.inlets = inlets;
        self.outlets = outlets;
        if self.ua_target.is_some() {
            self.approach = approach;
        }
        self.status = Some(status);
        self.iterations = iterations;
        self.last_pass = Some(pass);
        self.calc_id = Some(id);
        Ok(())
    }

    fn calculation_id(&self) -> Option<CalcId> {
        self.calc_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::units::{bara, kgps};
    use pf_thermo::{Composition, CpPolynomial, IdealGasEngine, Species};

    /// N2 with cp = 1000 J/(kg·K) exactly.
    fn flat_cp_engine() -> IdealGasEngine {
        IdealGasEngine::new().with_cp(Species::N2, CpPolynomial::constant(Species::N2.molar_mass()))
    }

    fn n2(engine: &IdealGasEngine, t: f64, flow: f64) -> StreamState {
        engine
            .flash_pt(bara(5.0), k(t), &Composition::pure(Species::N2), kgps(flow))
            .unwrap()
    }

    #[test]
    fn test_lmtd() {
        assert!((lmtd(10.0, 10.0) - 10.0).abs() < 1e-12);
        let expected = (30.0 - 10.0) / 3.0_f64.ln();
        assert!((lmtd(30.0, 10.0) - expected).abs() < 1e-12);
        assert!((lmtd(10.0, 30.0) - expected).abs() < 1e-12);
        assert!(lmtd(10.0, 10.0 + 1e-12).is_finite());
    }

    #[test]
    fn test_effectiveness() {
        let cf = FlowArrangement::CounterFlow;
        assert!((cf.effectiveness(1.0, 1.0) - 0.5).abs() < 1e-12);
        let e = cf.effectiveness(2.0, 0.5);
        let x = (-2.0_f64 * 0.5).exp();
        assert!((e - (1.0 - x) / (1.0 - 0.5 * x)).abs() < 1e-12);

        let pf = FlowArrangement::ParallelFlow;
        assert!((pf.effectiveness(1.0, 0.0) - (1.0 - (-1.0_f64).exp())).abs() < 1e-12);

        // Cr = 0 makes every arrangement 1 − e^(−NTU)
        let xf = FlowArrangement::CrossFlow;
        assert!((xf.effectiveness(1.5, 0.0) - cf.effectiveness(1.5, 0.0)).abs() < 1e-12);
    }

    #[test]
    fn test_no_streams() {
        let engine = IdealGasEngine::new();
        let mut hx = MultiStreamHeatExchanger::new("hx".into());
        assert_eq!(hx.run(&engine, CalcId::new()), Err(EquipmentError::NoStreams));
    }

    #[test]
    fn test_equal_capacity_two_streams() {
        let engine = flat_cp_engine();
        let mut hx = MultiStreamHeatExchanger::new("hx".into());
        hx.add_in_stream(n2(&engine, 400.0, 1.0));
        hx.add_in_stream(n2(&engine, 300.0, 1.0));
        hx.run(&engine, CalcId::new()).unwrap();

        let pass = hx.last_pass().unwrap();
        assert!((pass.scaling_factor - 1.0).abs() < 1e-9);
        let hot = hx.stream_duty(0).unwrap().value;
        let cold = hx.stream_duty(1).unwrap().value;
        assert!((hot + cold).abs() < 1e-6 * cold);

        // ΔT1 = ΔT2 = approach
        assert!((pass.lmtd - 10.0).abs() < 1e-6);
        assert!((hx.duty().unwrap().value - 90_000.0).abs() < 1e-3);
        assert!((hx.ua_value().unwrap() - 9_000.0).abs() < 1e-3);
        assert!((hx.out_temperature(0).unwrap().value - 310.0).abs() < 1e-6);
        assert!((hx.out_temperature(1).unwrap().value - 390.0).abs() < 1e-6);
        assert_eq!(hx.status(), Some(BalanceStatus::Converged));
        assert_eq!(hx.iterations(), 1);
    }

    #[test]
    fn test_unequal_capacity_rescales_larger_side() {
        let engine = flat_cp_engine();
        let mut hx = MultiStreamHeatExchanger::new("hx".into());
        hx.add_in_stream(n2(&engine, 400.0, 2.0));
        hx.add_in_stream(n2(&engine, 300.0, 1.0));
        hx.run(&engine, CalcId::new()).unwrap();

        let pass = hx.last_pass().unwrap();
        // cold side gains 90 kW, hot side would lose 180 kW
        assert_eq!(pass.limiting_side, HeatDirection::Heated);
        assert!((pass.scaling_factor - 0.5).abs() < 1e-9);
        assert!((hx.out_temperature(0).unwrap().value - 355.0).abs() < 1e-6);
        assert!((pass.max_temperature_change.value - 45.0).abs() < 1e-6);
        assert!(hx.heat_balance_deviation().unwrap().abs() < 1e-6);
    }

    #[test]
    fn test_temperature_cross_is_fatal() {
        // equal feed temperatures: the first feed counts as both hottest and coldest
        let engine = flat_cp_engine();
        let mut hx = MultiStreamHeatExchanger::new("hx".into());
        hx.add_in_stream(n2(&engine, 300.0, 1.0));
        hx.add_in_stream(n2(&engine, 300.0, 1.0));
        let err = hx.run(&engine, CalcId::new()).unwrap_err();
        assert!(matches!(err, EquipmentError::TemperatureCross { .. }));
        assert!(hx.out_stream(0).is_err());
        assert!(hx.calculation_id().is_none());
    }

    #[test]
    fn test_index_errors() {
        let engine = flat_cp_engine();
        let mut hx = MultiStreamHeatExchanger::new("hx".into());
        hx.add_in_stream(n2(&engine, 400.0, 1.0));
        assert!(matches!(
            hx.set_feed_stream(3, n2(&engine, 300.0, 1.0)),
            Err(EquipmentError::IndexOob { index: 3, len: 1, .. })
        ));
        assert!(matches!(hx.out_stream(0), Err(EquipmentError::NotRun { .. })));
        assert!(matches!(hx.in_temperature(1), Err(EquipmentError::IndexOob { .. })));
        assert!(hx.set_ua_value(-1.0).is_err());
        assert!(hx.set_temperature_approach(dk(0.0)).is_err());
    }

    #[test]
    fn test_target_ua_adjusts_approach() {
        let engine = flat_cp_engine();
        let mut hx = MultiStreamHeatExchanger::new("hx".into());
        hx.add_in_stream(n2(&engine, 400.0, 1.0));
        hx.add_in_stream(n2(&engine, 300.0, 1.0));
        hx.set_ua_value(4000.0).unwrap();
        hx.run(&engine, CalcId::new()).unwrap();

        // fixed point a = C·R/(UA + C) = 1000·100/5000
        assert_eq!(hx.status(), Some(BalanceStatus::Converged));
        assert!((hx.temperature_approach().value - 20.0).abs() < 0.05);
        let ua = hx.ua_value().unwrap();
        assert!((ua - 4000.0).abs() / 4000.0 <= 1e-3);
        assert!(hx.iterations() > 1);

        // without a target a run is a single pass at the adjusted approach
        hx.clear_ua_value();
        hx.run(&engine, CalcId::new()).unwrap();
        assert_eq!(hx.ua_target(), None);
        assert_eq!(hx.iterations(), 1);
        assert!((hx.last_pass().unwrap().approach.value - hx.temperature_approach().value).abs() < 1e-12);
    }

    #[test]
    fn test_target_ua_iteration_limit() {
        let engine = flat_cp_engine();
        let mut hx = MultiStreamHeatExchanger::new("hx".into());
        hx.add_in_stream(n2(&engine, 400.0, 1.0));
        hx.add_in_stream(n2(&engine, 300.0, 1.0));
        hx.set_ua_value(4000.0).unwrap();
        hx.config.max_iterations = 2;
        hx.run(&engine, CalcId::new()).unwrap();
        assert_eq!(hx.status(), Some(BalanceStatus::IterationLimitReached));
        assert_eq!(hx.iterations(), 2);
    }
}
