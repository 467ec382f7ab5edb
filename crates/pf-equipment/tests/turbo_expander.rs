//! Integration tests for turbo-expander/compressor speed matching.

use pf_core::CalcId;
use pf_core::units::{bara, degc, kgps, to_rpm};
use pf_equipment::{
    CurveSlot, Equipment, PerformanceCurve, SpeedMatchStatus, TurboExpanderCompressor,
    TurboExpanderDesign,
};
use pf_thermo::{Composition, IdealGasEngine, Species, StreamState, ThermoEngine};

fn natural_gas() -> Composition {
    Composition::new_mole_fractions(vec![
        (Species::CH4, 0.90),
        (Species::Ethane, 0.06),
        (Species::Propane, 0.03),
        (Species::N2, 0.01),
    ])
    .unwrap()
}

fn feed(engine: &IdealGasEngine, p_bara: f64, t_c: f64, flow: f64) -> StreamState {
    engine
        .flash_pt(bara(p_bara), degc(t_c), &natural_gas(), kgps(flow))
        .unwrap()
}

#[test]
fn ten_kg_per_second_expander() {
    let engine = IdealGasEngine::new();
    let mut tec = TurboExpanderCompressor::new(
        "K-100".into(),
        feed(&engine, 60.0, 20.0, 10.0),
        TurboExpanderDesign::default(),
    )
    .unwrap();
    let id = CalcId::new();
    tec.run(&engine, id).unwrap();

    let config = &tec.config.newton;
    let result = tec.result().unwrap();
    let n = to_rpm(result.speed);
    assert!(n >= config.lower_bound && n <= config.upper_bound);

    match result.status {
        SpeedMatchStatus::Converged => {
            let imbalance = result.expander_power.value
                - result.compressor_power.value
                - result.bearing_loss.value;
            assert!(imbalance.abs() < 1e-3 / 100.0);
            assert!(result.iterations >= config.min_iterations);
        }
        SpeedMatchStatus::IterationLimitReached => {
            assert_eq!(result.iterations, config.max_iterations);
        }
    }

    // published powers are consistent with the final speed
    let balance = result.expander_power - result.compressor_power - result.bearing_loss;
    assert!((balance.value - result.residual.value).abs() < 1e-6);

    let expander_out = tec.expander_outlet().unwrap();
    assert!((expander_out.pressure().value - 40e5).abs() < 1e-6);
    assert!(expander_out.temperature() < tec.expander_feed().temperature());

    let compressor_out = tec.compressor_outlet().unwrap();
    assert!(compressor_out.pressure() > tec.compressor_feed().pressure());

    // the standalone expander reproduces the matched shaft power
    let expander_power = tec.expander().unwrap().power().value;
    assert!((expander_power - result.expander_power.value).abs() / expander_power < 1e-6);

    assert_eq!(tec.calculation_id(), Some(id));
}

#[test]
fn separate_compressor_feed() {
    let engine = IdealGasEngine::new();
    let mut tec = TurboExpanderCompressor::new(
        "K-100".into(),
        feed(&engine, 60.0, -10.0, 10.0),
        TurboExpanderDesign::default(),
    )
    .unwrap()
    .with_compressor_feed(feed(&engine, 30.0, 25.0, 8.0));
    tec.run(&engine, CalcId::new()).unwrap();

    let q = tec.compressor_feed().volumetric_flow().value;
    let n = to_rpm(tec.speed().unwrap());
    let design_qn = tec.design.design_qn;
    assert!((tec.qn_ratio().unwrap() - q * 60.0 / n / design_qn).abs() < 1e-9);
    assert!((tec.qn().unwrap() - n / 60.0 * q / design_qn).abs() < 1e-9);
    assert!((tec.compressor_outlet().unwrap().flow_rate().value - 8.0).abs() < 1e-12);
}

#[test]
fn compressor_curves_change_the_match() {
    let engine = IdealGasEngine::new();
    let base = TurboExpanderCompressor::new(
        "K-100".into(),
        feed(&engine, 60.0, 20.0, 10.0),
        TurboExpanderDesign::default(),
    )
    .unwrap();

    let mut plain = base.clone();
    plain.run(&engine, CalcId::new()).unwrap();

    let mut curved = base;
    curved
        .set_qn_head_curve(&[0.0, 50.0, 100.0], &[1.2, 1.1, 0.9])
        .unwrap();
    curved.set_curve(
        CurveSlot::CompressorQnEfficiency,
        Some(PerformanceCurve::parabola(-0.0001)),
    );
    curved.run(&engine, CalcId::new()).unwrap();

    let head = curved.result().unwrap();
    assert!(head.compressor_polytropic_efficiency < curved.design.compressor_polytropic_efficiency);
    assert_ne!(plain.result().unwrap().compressor_power, head.compressor_power);
}

#[test]
fn flat_uc_curve_uses_design_efficiency() {
    let engine = IdealGasEngine::new();
    let mut tec = TurboExpanderCompressor::new(
        "K-100".into(),
        feed(&engine, 60.0, 20.0, 10.0),
        TurboExpanderDesign::default(),
    )
    .unwrap();
    tec.set_curve(CurveSlot::ExpanderUc, None);
    tec.run(&engine, CalcId::new()).unwrap();
    assert_eq!(
        tec.expander_isentropic_efficiency().unwrap(),
        tec.design.expander_isentropic_efficiency
    );
}
