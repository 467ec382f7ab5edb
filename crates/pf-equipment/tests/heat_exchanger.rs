//! Integration tests for multi-stream heat exchanger balancing.

use pf_core::CalcId;
use pf_core::units::{bara, degc, dk, k, kgps};
use pf_equipment::{BalanceStatus, Equipment, HeatDirection, MultiStreamHeatExchanger};
use pf_thermo::{Composition, IdealGasEngine, Species, StreamState, ThermoEngine};

fn stream(engine: &IdealGasEngine, species: Species, p_bara: f64, t_k: f64, flow: f64) -> StreamState {
    engine
        .flash_pt(bara(p_bara), k(t_k), &Composition::pure(species), kgps(flow))
        .unwrap()
}

#[test]
fn three_streams_conserve_energy() {
    let engine = IdealGasEngine::new();
    let mut hx = MultiStreamHeatExchanger::new("E-100".into());
    hx.add_in_stream(stream(&engine, Species::N2, 10.0, 400.0, 2.0));
    hx.add_in_stream(stream(&engine, Species::N2, 5.0, 300.0, 1.0));
    hx.add_in_stream(stream(&engine, Species::CH4, 20.0, 350.0, 1.0));
    hx.run(&engine, CalcId::new()).unwrap();

    assert_eq!(hx.number_of_feed_streams(), 3);
    assert_eq!(hx.status(), Some(BalanceStatus::Converged));

    let duties: Vec<f64> = (0..3).map(|i| hx.stream_duty(i).unwrap().value).collect();
    let gained: f64 = duties.iter().filter(|d| **d > 0.0).sum();
    let lost: f64 = -duties.iter().filter(|d| **d < 0.0).sum::<f64>();
    assert!((gained - lost).abs() < 1e-6 * gained, "gained {gained}, lost {lost}");
    assert!((hx.duty().unwrap().value - gained).abs() < 1e-6 * gained);

    // each outlet stays at its inlet pressure
    for i in 0..3 {
        let p_in = hx.in_stream(i).unwrap().pressure().value;
        let p_out = hx.out_stream(i).unwrap().pressure().value;
        assert!((p_in - p_out).abs() < 1e-9);
    }

    assert_eq!(hx.mass_balance().unwrap(), 0.0);
    assert!(hx.heat_balance_deviation().unwrap().abs() < 1e-4);

    let pass = hx.last_pass().unwrap();
    assert_eq!(pass.directions[0], HeatDirection::Cooled);
    assert_eq!(pass.directions[1], HeatDirection::Heated);
    assert!(pass.lmtd > 0.0 && pass.ua > 0.0);
}

#[test]
fn entropy_production_is_positive_for_counterflow_cooling() {
    let engine = IdealGasEngine::new();
    let mut hx = MultiStreamHeatExchanger::new("E-101".into());
    hx.add_in_stream(stream(&engine, Species::Air, 5.0, 450.0, 1.0));
    hx.add_in_stream(stream(&engine, Species::Air, 5.0, 300.0, 1.5));
    hx.run(&engine, CalcId::new()).unwrap();

    assert!(hx.entropy_production().unwrap() > 0.0);
    assert!(hx.in_temperature(0).unwrap() > hx.out_temperature(0).unwrap());
    assert!(hx.out_temperature(1).unwrap() > hx.in_temperature(1).unwrap());
}

#[test]
fn replacing_a_feed_clears_results() {
    let engine = IdealGasEngine::new();
    let mut hx = MultiStreamHeatExchanger::new("E-102".into());
    hx.add_in_stream(stream(&engine, Species::N2, 5.0, 400.0, 1.0));
    hx.add_in_stream(stream(&engine, Species::N2, 5.0, 300.0, 1.0));
    hx.run(&engine, CalcId::new()).unwrap();
    let first_duty = hx.duty().unwrap();

    let warmer = engine
        .flash_pt(bara(5.0), degc(200.0), &Composition::pure(Species::N2), kgps(1.0))
        .unwrap();
    hx.set_feed_stream(0, warmer).unwrap();
    assert!(hx.duty().is_err());
    assert!(hx.calculation_id().is_none());

    hx.run(&engine, CalcId::new()).unwrap();
    assert!(hx.duty().unwrap() > first_duty);
}

#[test]
fn target_ua_with_real_cp() {
    let engine = IdealGasEngine::new();
    let mut hx = MultiStreamHeatExchanger::new("E-103".into());
    hx.add_in_stream(stream(&engine, Species::N2, 5.0, 400.0, 1.0));
    hx.add_in_stream(stream(&engine, Species::N2, 5.0, 300.0, 1.0));
    hx.set_temperature_approach(dk(5.0)).unwrap();
    hx.set_ua_value(3000.0).unwrap();
    hx.run(&engine, CalcId::new()).unwrap();

    assert_eq!(hx.status(), Some(BalanceStatus::Converged));
    let ua = hx.ua_value().unwrap();
    assert!((ua - 3000.0).abs() / 3000.0 <= hx.config.ua_rel_tol);
    assert!(hx.temperature_approach().value > 5.0);
}
