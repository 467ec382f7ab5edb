//! CoolProp integration tests.
//!
//! Broad tolerances avoid backend version issues while still enforcing
//! physical plausibility.

use pf_core::units::{bara, k, kgps, pa};
use pf_thermo::{Composition, CoolPropEngine, IdealGasEngine, Species, ThermoEngine};

#[test]
fn water_at_1atm_300k() {
    let engine = CoolPropEngine::new();
    let state = engine
        .flash_pt(pa(101_325.0), k(300.0), &Composition::pure(Species::H2O), kgps(1.0))
        .unwrap();

    // ~996 kg/m³
    let rho = state.density().value;
    assert!(rho > 900.0 && rho < 1100.0, "rho = {rho} kg/m³");
}

#[test]
fn methane_ph_flash_round_trip() {
    let engine = CoolPropEngine::new();
    let comp = Composition::pure(Species::CH4);
    let reference = engine
        .flash_pt(bara(50.0), k(300.0), &comp, kgps(5.0))
        .unwrap();

    let back = engine.flash_ph(&reference, reference.enthalpy()).unwrap();
    assert!(
        (back.temperature().value - 300.0).abs() < 0.01,
        "T = {}",
        back.temperature().value
    );
    assert_eq!(back.flow_rate().value, 5.0);
}

#[test]
fn methane_isentropic_drop_close_to_ideal_gas() {
    let real = CoolPropEngine::new();
    let ideal = IdealGasEngine::new();
    let comp = Composition::pure(Species::CH4);

    let drop = |engine: &dyn ThermoEngine| {
        let feed = engine
            .flash_pt(bara(10.0), k(320.0), &comp, kgps(1.0))
            .unwrap();
        let out = engine.isentropic_to(&feed, bara(5.0)).unwrap();
        feed.enthalpy() - out.enthalpy()
    };

    let dh_real = drop(&real);
    let dh_ideal = drop(&ideal);
    assert!(dh_real > 0.0 && dh_ideal > 0.0);
    // low pressure: within a few percent of the ideal-gas value
    let rel = (dh_real - dh_ideal).abs() / dh_ideal;
    assert!(rel < 0.05, "real {dh_real} vs ideal {dh_ideal}");
}

#[test]
fn nitrogen_compressibility_near_one_at_low_pressure() {
    let engine = CoolPropEngine::new();
    let state = engine
        .flash_pt(pa(101_325.0), k(300.0), &Composition::pure(Species::N2), kgps(1.0))
        .unwrap();
    let z = state.compressibility();
    assert!((z - 1.0).abs() < 0.01, "Z = {z}");
    let gamma = engine.gamma(&state).unwrap();
    assert!(gamma > 1.35 && gamma < 1.45, "gamma = {gamma}");
}
