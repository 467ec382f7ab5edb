//! Case file schema and construction of the equipment it describes.

use crate::error::{CliError, CliResult};
use pf_core::units::{bara, degc, kgps, m, mm2, rpm, to_rpm, watt};
use pf_equipment::{
    BalanceConfig, CurveError, CurveSlot, Equipment, FlowArrangement, MultiStreamHeatExchanger,
    PerformanceCurve, SpeedMatchConfig, TurboExpanderCompressor, TurboExpanderDesign,
};
use pf_thermo::{
    Composition, CoolPropEngine, IdealGasEngine, Species, StreamState, ThermoEngine,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uom::si::area::square_millimeter;
use uom::si::pressure::bar;

pub const CASE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseDef {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub engine: EngineDef,
    pub equipment: EquipmentDef,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngineDef {
    #[default]
    IdealGas,
    CoolProp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CompositionDef {
    Pure { species: String },
    Mixture { fractions: Vec<(String, f64)> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamDef {
    pub name: String,
    pub composition: CompositionDef,
    pub pressure_bara: f64,
    pub temperature_c: f64,
    pub mass_flow_kgps: f64,
}

/// Design data in engineering units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DesignDef {
    pub impeller_diameter_m: f64,
    pub design_speed_rpm: f64,
    pub design_uc: f64,
    pub design_qn: f64,
    pub expander_isentropic_efficiency: f64,
    pub compressor_polytropic_efficiency: f64,
    pub compressor_polytropic_head_kj_per_kg: f64,
    pub bearing_loss_w: f64,
    pub expander_outlet_pressure_bara: f64,
    pub maximum_igv_area_mm2: f64,
    pub igv_opening: f64,
    pub gear_ratio: f64,
}

impl Default for DesignDef {
    fn default() -> Self {
        Self::from(&TurboExpanderDesign::default())
    }
}

impl From<&TurboExpanderDesign> for DesignDef {
    fn from(d: &TurboExpanderDesign) -> Self {
        Self {
            impeller_diameter_m: d.impeller_diameter.value,
            design_speed_rpm: to_rpm(d.design_speed),
            design_uc: d.design_uc,
            design_qn: d.design_qn,
            expander_isentropic_efficiency: d.expander_isentropic_efficiency,
            compressor_polytropic_efficiency: d.compressor_polytropic_efficiency,
            compressor_polytropic_head_kj_per_kg: d.compressor_polytropic_head,
            bearing_loss_w: d.bearing_loss.value,
            expander_outlet_pressure_bara: d.expander_outlet_pressure.get::<bar>(),
            maximum_igv_area_mm2: d.maximum_igv_area.get::<square_millimeter>(),
            igv_opening: d.igv_opening,
            gear_ratio: d.gear_ratio,
        }
    }
}

impl DesignDef {
    pub fn to_design(&self) -> TurboExpanderDesign {
        TurboExpanderDesign {
            impeller_diameter: m(self.impeller_diameter_m),
            design_speed: rpm(self.design_speed_rpm),
            design_uc: self.design_uc,
            design_qn: self.design_qn,
            expander_isentropic_efficiency: self.expander_isentropic_efficiency,
            compressor_polytropic_efficiency: self.compressor_polytropic_efficiency,
            compressor_polytropic_head: self.compressor_polytropic_head_kj_per_kg,
            bearing_loss: watt(self.bearing_loss_w),
            expander_outlet_pressure: bara(self.expander_outlet_pressure_bara),
            maximum_igv_area: mm2(self.maximum_igv_area_mm2),
            igv_opening: self.igv_opening,
            gear_ratio: self.gear_ratio,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CurveDef {
    /// Fixed-vertex parabola with a known curvature
    Parabola { coefficient: f64 },
    /// Fixed-vertex parabola fitted to samples
    ParabolaFit { x: Vec<f64>, y: Vec<f64> },
    Spline { x: Vec<f64>, y: Vec<f64> },
    /// No correction
    Identity,
}

impl CurveDef {
    fn build(&self) -> Result<Option<PerformanceCurve>, CurveError> {
        Ok(match self {
            CurveDef::Parabola { coefficient } => Some(PerformanceCurve::parabola(*coefficient)),
            CurveDef::ParabolaFit { x, y } => Some(PerformanceCurve::fit_parabola(x, y)?),
            CurveDef::Spline { x, y } => Some(PerformanceCurve::fit_spline(x, y)?),
            CurveDef::Identity => None,
        })
    }
}

/// Curve overrides; an omitted slot keeps the machine default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CurvesDef {
    #[serde(default)]
    pub uc: Option<CurveDef>,
    #[serde(default)]
    pub qn_efficiency: Option<CurveDef>,
    #[serde(default)]
    pub qn_head: Option<CurveDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EquipmentDef {
    TurboExpanderCompressor {
        expander_feed: StreamDef,
        #[serde(default)]
        compressor_feed: Option<StreamDef>,
        #[serde(default)]
        design: DesignDef,
        #[serde(default)]
        curves: CurvesDef,
        #[serde(default)]
        speed_match: SpeedMatchConfig,
    },
    MultiStreamHeatExchanger {
        streams: Vec<StreamDef>,
        #[serde(default)]
        approach_k: Option<f64>,
        #[serde(default)]
        ua_target_w_per_k: Option<f64>,
        #[serde(default)]
        balance: BalanceConfig,
        #[serde(default)]
        flow_arrangement: FlowArrangement,
    },
}

/// Equipment ready to run.
pub enum BuiltCase {
    TurboExpander(TurboExpanderCompressor),
    HeatExchanger {
        hx: MultiStreamHeatExchanger,
        stream_names: Vec<String>,
    },
}

impl BuiltCase {
    pub fn equipment_mut(&mut self) -> &mut dyn Equipment {
        match self {
            BuiltCase::TurboExpander(tec) => tec,
            BuiltCase::HeatExchanger { hx, .. } => hx,
        }
    }
}

pub fn load_case(path: &Path) -> CliResult<CaseDef> {
    let text = std::fs::read_to_string(path)?;
    parse_case(&text)
}

pub fn parse_case(text: &str) -> CliResult<CaseDef> {
    let case: CaseDef = serde_yaml::from_str(text)?;
    if case.version != CASE_VERSION {
        return Err(CliError::UnsupportedVersion {
            found: case.version,
            expected: CASE_VERSION,
        });
    }
    Ok(case)
}

pub fn build_engine(def: EngineDef) -> Box<dyn ThermoEngine> {
    match def {
        EngineDef::IdealGas => Box::new(IdealGasEngine::new()),
        EngineDef::CoolProp => Box::new(CoolPropEngine::new()),
    }
}

fn parse_species(name: &str) -> CliResult<Species> {
    name.parse::<Species>().map_err(|_| CliError::UnknownSpecies {
        name: name.to_string(),
    })
}

fn build_composition(def: &CompositionDef) -> CliResult<Composition> {
    match def {
        CompositionDef::Pure { species } => Ok(Composition::pure(parse_species(species)?)),
        CompositionDef::Mixture { fractions } => {
            let parsed = fractions
                .iter()
                .map(|(name, x)| parse_species(name).map(|species| (species, *x)))
                .collect::<CliResult<Vec<_>>>()?;
            Ok(Composition::new_mole_fractions(parsed)?)
        }
    }
}

fn build_stream(def: &StreamDef, engine: &dyn ThermoEngine) -> CliResult<StreamState> {
    let comp = build_composition(&def.composition)?;
    if !engine.supports_composition(&comp) {
        return Err(CliError::UnsupportedComposition {
            engine: engine.name().to_string(),
            stream: def.name.clone(),
        });
    }
    Ok(engine.flash_pt(
        bara(def.pressure_bara),
        degc(def.temperature_c),
        &comp,
        kgps(def.mass_flow_kgps),
    )?)
}

/// Flash every feed and configure the equipment described by `case`.
pub fn build_case(case: &CaseDef, engine: &dyn ThermoEngine) -> CliResult<BuiltCase> {
    match &case.equipment {
        EquipmentDef::TurboExpanderCompressor {
            expander_feed,
            compressor_feed,
            design,
            curves,
            speed_match,
        } => {
            let feed = build_stream(expander_feed, engine)?;
            let mut tec = TurboExpanderCompressor::new(case.name.clone(), feed, design.to_design())?;
            if let Some(def) = compressor_feed {
                tec.set_compressor_feed(build_stream(def, engine)?);
            }
            for (slot, def) in [
                (CurveSlot::ExpanderUc, &curves.uc),
                (CurveSlot::CompressorQnEfficiency, &curves.qn_efficiency),
                (CurveSlot::CompressorQnHead, &curves.qn_head),
            ] {
                if let Some(def) = def {
                    let curve = def
                        .build()
                        .map_err(pf_equipment::EquipmentError::from)?;
                    tec.set_curve(slot, curve);
                }
            }
            tec.config = speed_match.clone();
            Ok(BuiltCase::TurboExpander(tec))
        }
        EquipmentDef::MultiStreamHeatExchanger {
            streams,
            approach_k,
            ua_target_w_per_k,
            balance,
            flow_arrangement,
        } => {
            if streams.is_empty() {
                return Err(CliError::InvalidCase {
                    what: "heat exchanger needs at least one stream".into(),
                });
            }
            let mut hx = MultiStreamHeatExchanger::new(case.name.clone());
            for def in streams {
                hx.add_in_stream(build_stream(def, engine)?);
            }
            if let Some(approach) = approach_k {
                hx.set_temperature_approach(pf_core::units::dk(*approach))?;
            }
            if let Some(ua) = ua_target_w_per_k {
                hx.set_ua_value(*ua)?;
            }
            hx.config = balance.clone();
            hx.flow_arrangement = *flow_arrangement;
            Ok(BuiltCase::HeatExchanger {
                hx,
                stream_names: streams.iter().map(|s| s.name.clone()).collect(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::CalcId;

    const TURBO_EXPANDER: &str = include_str!("../cases/turbo_expander.yaml");
    const HEAT_EXCHANGER: &str = include_str!("../cases/heat_exchanger.yaml");

    #[test]
    fn bundled_turbo_expander_case_runs() {
        let case = parse_case(TURBO_EXPANDER).unwrap();
        let engine = build_engine(case.engine);
        let mut built = build_case(&case, engine.as_ref()).unwrap();
        built.equipment_mut().run(engine.as_ref(), CalcId::new()).unwrap();
        match built {
            BuiltCase::TurboExpander(tec) => {
                assert!(tec.speed().is_some());
                assert!(tec.curve(CurveSlot::CompressorQnEfficiency).is_some());
            }
            _ => panic!("expected a turbo-expander case"),
        }
    }

    #[test]
    fn bundled_heat_exchanger_case_runs() {
        let case = parse_case(HEAT_EXCHANGER).unwrap();
        let engine = build_engine(case.engine);
        let mut built = build_case(&case, engine.as_ref()).unwrap();
        built.equipment_mut().run(engine.as_ref(), CalcId::new()).unwrap();
        match built {
            BuiltCase::HeatExchanger { hx, stream_names } => {
                assert_eq!(stream_names.len(), hx.number_of_feed_streams());
                assert!(hx.duty().unwrap().value > 0.0);
            }
            _ => panic!("expected a heat exchanger case"),
        }
    }

    #[test]
    fn design_defaults_round_trip() {
        let def = DesignDef::default();
        assert!((def.design_speed_rpm - 6850.0).abs() < 1e-9);
        assert!((def.expander_outlet_pressure_bara - 40.0).abs() < 1e-9);
        assert!((def.maximum_igv_area_mm2 - 1.637e4).abs() < 1e-6);

        let design = def.to_design();
        assert!((design.impeller_diameter.value - 0.424).abs() < 1e-12);
        assert!((to_rpm(design.design_speed) - def.design_speed_rpm).abs() < 1e-9);
    }

    #[test]
    fn version_mismatch_rejected() {
        let text = TURBO_EXPANDER.replacen("version: 1", "version: 9", 1);
        assert!(matches!(
            parse_case(&text),
            Err(CliError::UnsupportedVersion { found: 9, .. })
        ));
    }

    #[test]
    fn unknown_species_rejected() {
        let text = HEAT_EXCHANGER.replacen("N2", "Unobtainium", 1);
        let case = parse_case(&text).unwrap();
        let engine = build_engine(case.engine);
        assert!(matches!(
            build_case(&case, engine.as_ref()),
            Err(CliError::UnknownSpecies { .. })
        ));
    }

    #[test]
    fn malformed_curve_rejected() {
        let yaml = r#"
version: 1
name: bad-curve
equipment:
  type: turbo_expander_compressor
  expander_feed:
    name: feed
    composition: { type: Pure, species: CH4 }
    pressure_bara: 60.0
    temperature_c: 20.0
    mass_flow_kgps: 10.0
  curves:
    qn_head: { type: Spline, x: [1.0], y: [1.0] }
"#;
        let case = parse_case(yaml).unwrap();
        let engine = build_engine(case.engine);
        assert!(matches!(
            build_case(&case, engine.as_ref()),
            Err(CliError::Equipment(pf_equipment::EquipmentError::Curve(_)))
        ));
    }
}
