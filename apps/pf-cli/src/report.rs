//! Result summaries printed by `run`.

use crate::case::BuiltCase;
use crate::error::CliResult;
use pf_core::units::to_rpm;
use pf_equipment::{
    CurveSlot, Equipment, EquipmentError, MultiStreamHeatExchanger, TurboExpanderCompressor,
};
use pf_thermo::StreamState;
use uom::si::pressure::bar;
use uom::si::thermodynamic_temperature::degree_celsius;

#[derive(Debug, Clone)]
pub struct StreamReport {
    pub name: String,
    pub pressure_bara: f64,
    pub temperature_c: f64,
    pub mass_flow_kgps: f64,
    pub enthalpy_j_per_kg: f64,
}

impl StreamReport {
    fn new(name: impl Into<String>, state: &StreamState) -> Self {
        Self {
            name: name.into(),
            pressure_bara: state.pressure().get::<bar>(),
            temperature_c: state.temperature().get::<degree_celsius>(),
            mass_flow_kgps: state.flow_rate().value,
            enthalpy_j_per_kg: state.enthalpy(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TurboExpanderReport {
    pub name: String,
    pub calculation_id: String,
    pub status: String,
    pub iterations: usize,
    pub speed_rpm: f64,
    pub compressor_speed_rpm: f64,
    pub expander_power_kw: f64,
    pub compressor_power_kw: f64,
    pub bearing_loss_w: f64,
    pub expander_isentropic_efficiency: f64,
    pub compressor_polytropic_efficiency: f64,
    pub compressor_polytropic_head_kj_per_kg: f64,
    pub uc_ratio: f64,
    pub qn_ratio: f64,
    pub qn: f64,
    pub igv_opening_from_flow: f64,
    /// Slot label and curve kind for every correction curve slot
    pub curves: Vec<(&'static str, &'static str)>,
    pub expander_outlet: StreamReport,
    pub compressor_outlet: StreamReport,
}

#[derive(Debug, Clone)]
pub struct HeatExchangerReport {
    pub name: String,
    pub calculation_id: String,
    pub status: String,
    pub iterations: usize,
    pub duty_kw: f64,
    pub lmtd_k: f64,
    pub ua_w_per_k: f64,
    pub approach_k: f64,
    pub mass_balance_kgps: f64,
    pub entropy_production_w_per_k: f64,
    pub heat_balance_deviation_pct: f64,
    pub outlets: Vec<StreamReport>,
}

#[derive(Debug, Clone)]
pub enum Report {
    TurboExpanderCompressor(TurboExpanderReport),
    MultiStreamHeatExchanger(HeatExchangerReport),
}

fn not_run(what: &'static str) -> EquipmentError {
    EquipmentError::NotRun { what }
}

fn calculation_id(equipment: &dyn Equipment) -> String {
    equipment
        .calculation_id()
        .map(|id| id.to_string())
        .unwrap_or_default()
}

const CURVE_SLOTS: [(CurveSlot, &str); 3] = [
    (CurveSlot::ExpanderUc, "expander U/C"),
    (CurveSlot::CompressorQnEfficiency, "compressor Qn efficiency"),
    (CurveSlot::CompressorQnHead, "compressor Qn head"),
];

fn curve_kinds(tec: &TurboExpanderCompressor) -> Vec<(&'static str, &'static str)> {
    CURVE_SLOTS
        .iter()
        .map(|&(slot, label)| (label, tec.curve(slot).map_or("none", |c| c.kind())))
        .collect()
}

fn turbo_expander_report(tec: &TurboExpanderCompressor) -> CliResult<TurboExpanderReport> {
    let result = tec.result().ok_or(not_run("speed match"))?;
    let expander_outlet = tec.expander_outlet().ok_or(not_run("expander outlet"))?;
    let compressor_outlet = tec.compressor_outlet().ok_or(not_run("compressor outlet"))?;
    Ok(TurboExpanderReport {
        name: tec.name.clone(),
        calculation_id: calculation_id(tec),
        status: format!("{:?}", result.status),
        iterations: result.iterations,
        speed_rpm: to_rpm(result.speed),
        compressor_speed_rpm: tec.compressor_speed().map(to_rpm).unwrap_or_default(),
        expander_power_kw: result.expander_power.value / 1000.0,
        compressor_power_kw: result.compressor_power.value / 1000.0,
        bearing_loss_w: result.bearing_loss.value,
        expander_isentropic_efficiency: result.expander_isentropic_efficiency,
        compressor_polytropic_efficiency: result.compressor_polytropic_efficiency,
        compressor_polytropic_head_kj_per_kg: result.compressor_polytropic_head,
        uc_ratio: result.uc_ratio,
        qn_ratio: result.qn_ratio,
        qn: result.qn,
        igv_opening_from_flow: tec.igv_opening_from_flow(),
        curves: curve_kinds(tec),
        expander_outlet: StreamReport::new("expander outlet", expander_outlet),
        compressor_outlet: StreamReport::new("compressor outlet", compressor_outlet),
    })
}

fn heat_exchanger_report(
    hx: &MultiStreamHeatExchanger,
    stream_names: &[String],
) -> CliResult<HeatExchangerReport> {
    let pass = hx.last_pass().ok_or(not_run("energy balance"))?;
    let status = hx.status().ok_or(not_run("energy balance"))?;
    let outlets = stream_names
        .iter()
        .enumerate()
        .map(|(i, name)| Ok(StreamReport::new(name.as_str(), hx.out_stream(i)?)))
        .collect::<Result<Vec<_>, EquipmentError>>()?;
    Ok(HeatExchangerReport {
        name: hx.name.clone(),
        calculation_id: calculation_id(hx),
        status: format!("{status:?}"),
        iterations: hx.iterations(),
        duty_kw: pass.limiting_heat.value / 1000.0,
        lmtd_k: pass.lmtd,
        ua_w_per_k: pass.ua,
        approach_k: hx.temperature_approach().value,
        mass_balance_kgps: hx.mass_balance()?,
        entropy_production_w_per_k: hx.entropy_production()?,
        heat_balance_deviation_pct: hx.heat_balance_deviation()?,
        outlets,
    })
}

impl Report {
    pub fn from_case(built: &BuiltCase) -> CliResult<Self> {
        Ok(match built {
            BuiltCase::TurboExpander(tec) => {
                Report::TurboExpanderCompressor(turbo_expander_report(tec)?)
            }
            BuiltCase::HeatExchanger { hx, stream_names } => {
                Report::MultiStreamHeatExchanger(heat_exchanger_report(hx, stream_names)?)
            }
        })
    }

    pub fn print(&self) {
        match self {
            Report::TurboExpanderCompressor(r) => {
                println!("Turbo-expander/compressor: {} ({})", r.name, r.status);
                println!("  Iterations: {}", r.iterations);
                println!("  Speed: {:.1} rpm (compressor {:.1} rpm)", r.speed_rpm, r.compressor_speed_rpm);
                println!("  Expander power: {:.2} kW", r.expander_power_kw);
                println!("  Compressor power: {:.2} kW", r.compressor_power_kw);
                println!("  Bearing loss: {:.2} W", r.bearing_loss_w);
                println!(
                    "  Efficiencies: expander η_s = {:.4}, compressor η_p = {:.4}",
                    r.expander_isentropic_efficiency, r.compressor_polytropic_efficiency
                );
                println!("  Polytropic head: {:.3} kJ/kg", r.compressor_polytropic_head_kj_per_kg);
                println!(
                    "  U/C ratio: {:.4}, Q/N ratio: {:.4}, Qn: {:.4}",
                    r.uc_ratio, r.qn_ratio, r.qn
                );
                println!("  IGV opening for flow: {:.3}", r.igv_opening_from_flow);
                for (label, kind) in &r.curves {
                    println!("  Curve {label}: {kind}");
                }
                print_stream(&r.expander_outlet);
                print_stream(&r.compressor_outlet);
            }
            Report::MultiStreamHeatExchanger(r) => {
                println!("Multi-stream heat exchanger: {} ({})", r.name, r.status);
                println!("  Iterations: {}", r.iterations);
                println!("  Duty: {:.3} kW", r.duty_kw);
                println!("  LMTD: {:.3} K", r.lmtd_k);
                println!("  UA: {:.2} W/K", r.ua_w_per_k);
                println!("  Approach: {:.3} K", r.approach_k);
                println!("  Mass balance: {:.3e} kg/s", r.mass_balance_kgps);
                println!("  Entropy production: {:.4} W/K", r.entropy_production_w_per_k);
                println!("  Heat balance deviation: {:.3e} %", r.heat_balance_deviation_pct);
                for outlet in &r.outlets {
                    print_stream(outlet);
                }
            }
        }
    }
}

fn print_stream(s: &StreamReport) {
    println!(
        "  {}: {:.3} bara, {:.2} °C, {:.3} kg/s",
        s.name, s.pressure_bara, s.temperature_c, s.mass_flow_kgps
    );
}
