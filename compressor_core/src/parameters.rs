//! # Parameter Map Boundary
//!
//! Builds an [`OperatingPoint`] from a flat map of named numeric parameters,
//! as collected by a form or a command line. Values are in the unit system of
//! the supplied [`CalcSettings`] and are converted to SI here.
//!
//! ## Keys
//!
//! | Key | Meaning | Unit (si / field / metric) |
//! |-----|---------|----------------------------|
//! | `suction_pressure` * | Stage 1 suction pressure | bar(a) / psig / kgf/cm2(g) |
//! | `discharge_pressure` * | Final discharge pressure | bar(a) / psig / kgf/cm2(g) |
//! | `suction_temperature` * | Stage 1 suction temperature | K / degF / degC |
//! | `speed_rpm` * | Crankshaft speed | rpm |
//! | `stroke` | Frame stroke | m / in / mm |
//! | `bore`, `bore_stage_<n>` | Cylinder bore (all stages, or stage n) | m / in / mm |
//! | `rod_diameter` | Piston rod diameter | m / in / mm |
//! | `clearance_pct`, `vvcp_pct`, `sace_pct` | Cylinder configuration | % |
//! | `stages`, `cylinders_per_stage` | Counts (integers) | - |
//! | `mass_flow` | Required throughput | kg/s |
//! | `single_acting` | 1 for single acting cylinders | - |
//! | `molecular_weight`, `specific_heat_ratio`, `z_suction`, `z_discharge` | Gas | - |
//! | `mechanical_efficiency` | Frame efficiency | - |
//! | `cooler_pressure_drop_pct`, `cooler_outlet_temperature` | Interstage cooler | % / temperature |
//! | `driver_power_kw`, `driver_derate_pct`, `driver_fan_pct`, `driver_electric` | Driver | kW / % / % / flag |
//! | `max_discharge_temperature` | Discharge temperature limit | temperature |
//!
//! `*` required.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use compressor_core::parameters::operating_point_from_map;
//! use compressor_core::settings::CalcSettings;
//!
//! let params = BTreeMap::from([
//!     ("suction_pressure".to_string(), 1.0),
//!     ("discharge_pressure".to_string(), 8.0),
//!     ("suction_temperature".to_string(), 300.0),
//!     ("speed_rpm".to_string(), 1200.0),
//! ]);
//!
//! let op = operating_point_from_map(&params, &CalcSettings::default()).unwrap();
//! assert_eq!(op.discharge_pressure_bar, 8.0);
//! ```

use std::collections::BTreeMap;

use crate::calculations::operating_point::{
    AirCooler, Cylinder, CylinderAction, Driver, DriverKind, OperatingPoint, MAX_STAGES,
};
use crate::errors::{CalcError, CalcResult};
use crate::settings::CalcSettings;

/// Prefix of per-stage bore keys
const BORE_STAGE_PREFIX: &str = "bore_stage_";

/// Most cylinders generated for one stage
const MAX_CYLINDERS_PER_STAGE: u32 = 16;

/// Keys accepted besides `bore_stage_<n>`
pub const KNOWN_KEYS: &[&str] = &[
    "suction_pressure",
    "discharge_pressure",
    "suction_temperature",
    "speed_rpm",
    "stroke",
    "bore",
    "rod_diameter",
    "clearance_pct",
    "vvcp_pct",
    "sace_pct",
    "stages",
    "cylinders_per_stage",
    "mass_flow",
    "single_acting",
    "molecular_weight",
    "specific_heat_ratio",
    "z_suction",
    "z_discharge",
    "mechanical_efficiency",
    "cooler_pressure_drop_pct",
    "cooler_outlet_temperature",
    "driver_power_kw",
    "driver_derate_pct",
    "driver_fan_pct",
    "driver_electric",
    "max_discharge_temperature",
];

/// Build an operating point from named parameters.
///
/// # Errors
///
/// * `MissingField` - a required key is absent, or driver options are given
///   without `driver_power_kw`
/// * `InvalidInput` - unknown key, non-integer count, flag other than 0/1, or
///   a `bore_stage_<n>` outside the stage range
///
/// Physical ranges are checked later by the calculator.
pub fn operating_point_from_map(params: &BTreeMap<String, f64>, settings: &CalcSettings) -> CalcResult<OperatingPoint> {
    settings.validate()?;
    for key in params.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) && stage_of_bore_key(key).is_none() {
            return Err(CalcError::invalid_input(key.as_str(), params[key].to_string(), "Unknown parameter"));
        }
    }

    let units = settings.unit_system;
    let atmosphere = settings.atmospheric_pressure_bar;
    let pressure = |v: f64| units.pressure_to_bar_abs(v, atmosphere).value();
    let temperature = |v: f64| units.temperature_to_kelvin(v).value();
    let length = |v: f64| units.length_to_meters(v).value();

    let required = |key: &str| params.get(key).copied().ok_or_else(|| CalcError::missing_field(key));
    let optional = |key: &str| params.get(key).copied();

    let mut op = OperatingPoint::new(
        pressure(required("suction_pressure")?),
        pressure(required("discharge_pressure")?),
        temperature(required("suction_temperature")?),
        required("speed_rpm")?,
    );

    if let Some(stroke) = optional("stroke") {
        op.stroke_m = length(stroke);
    }
    if let Some(stages) = optional("stages") {
        op.stages = count("stages", stages, MAX_STAGES)?;
    }
    op.mass_flow_kg_s = optional("mass_flow");

    // === Cylinders ===
    let per_stage = match optional("cylinders_per_stage") {
        Some(value) => count("cylinders_per_stage", value, MAX_CYLINDERS_PER_STAGE)?,
        None => 1,
    };
    let action = match optional("single_acting") {
        Some(value) if flag("single_acting", value)? => CylinderAction::SingleActing,
        _ => CylinderAction::DoubleActing,
    };

    let mut stage_bores = BTreeMap::new();
    for (key, value) in params {
        if let Some(stage) = stage_of_bore_key(key) {
            if stage == 0 || stage > op.stages {
                return Err(CalcError::invalid_input(
                    key.as_str(),
                    value.to_string(),
                    format!("Stage must be between 1 and {}", op.stages),
                ));
            }
            stage_bores.insert(stage, length(*value));
        }
    }

    let template = Cylinder::new(0, 1);
    let bore = optional("bore").map(length).unwrap_or(template.bore_m);
    let rod = optional("rod_diameter").map(length).unwrap_or(template.rod_diameter_m);
    let clearance = optional("clearance_pct").unwrap_or(template.clearance_pct);
    let vvcp = optional("vvcp_pct").unwrap_or(template.vvcp_pct);
    let sace = optional("sace_pct").unwrap_or(template.sace_pct);

    let mut cylinders = Vec::new();
    for stage in 1..=op.stages {
        let stage_bore = stage_bores.get(&stage).copied().unwrap_or(bore);
        for _ in 0..per_stage {
            let number = cylinders.len() as u32 + 1;
            cylinders.push(
                Cylinder::new(number, stage)
                    .with_bore(stage_bore, rod)
                    .with_action(action)
                    .with_clearance(clearance, vvcp)
                    .with_sace(sace),
            );
        }
    }
    op.cylinders = cylinders;

    // === Gas ===
    if let Some(mw) = optional("molecular_weight") {
        op.gas.molecular_weight = mw;
        op.gas.name = "User gas".to_string();
        op.gas.composition.clear();
    }
    if let Some(k) = optional("specific_heat_ratio") {
        op.gas.specific_heat_ratio = k;
        op.gas.name = "User gas".to_string();
        op.gas.composition.clear();
    }
    if let Some(z) = optional("z_suction") {
        op.gas.z_suction = z;
    }
    if let Some(z) = optional("z_discharge") {
        op.gas.z_discharge = z;
    }

    if let Some(efficiency) = optional("mechanical_efficiency") {
        op.mechanical_efficiency = efficiency;
    }
    if let Some(limit) = optional("max_discharge_temperature") {
        op.max_discharge_temperature_k = temperature(limit);
    }

    // === Cooler ===
    let drop = optional("cooler_pressure_drop_pct");
    let outlet = optional("cooler_outlet_temperature");
    if drop.is_some() || outlet.is_some() {
        let mut cooler = AirCooler::default();
        if let Some(drop) = drop {
            cooler.pressure_drop_pct = drop;
        }
        if let Some(outlet) = outlet {
            cooler.outlet_temperature_k = temperature(outlet);
        }
        op.interstage_cooler = Some(cooler);
    }

    // === Driver ===
    match optional("driver_power_kw") {
        Some(power) => {
            let kind = match optional("driver_electric") {
                Some(value) if flag("driver_electric", value)? => DriverKind::ElectricMotor,
                _ => DriverKind::NaturalGasEngine,
            };
            let mut driver = Driver::new(kind, power);
            if let Some(derate) = optional("driver_derate_pct") {
                driver.derate_pct = derate;
            }
            if let Some(fan) = optional("driver_fan_pct") {
                driver.cooler_fan_pct = fan;
            }
            op.driver = Some(driver);
        }
        None => {
            if ["driver_derate_pct", "driver_fan_pct", "driver_electric"]
                .iter()
                .any(|key| params.contains_key(*key))
            {
                return Err(CalcError::missing_field("driver_power_kw"));
            }
        }
    }

    Ok(op)
}

/// Stage number of a `bore_stage_<n>` key
fn stage_of_bore_key(key: &str) -> Option<u32> {
    key.strip_prefix(BORE_STAGE_PREFIX)?.parse().ok()
}

fn count(field: &str, value: f64, max: u32) -> CalcResult<u32> {
    if value.fract() != 0.0 || !(1.0..=f64::from(max)).contains(&value) {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            format!("Must be a whole number between 1 and {}", max),
        ));
    }
    Ok(value as u32)
}

fn flag(field: &str, value: f64) -> CalcResult<bool> {
    if value == 0.0 {
        Ok(false)
    } else if value == 1.0 {
        Ok(true)
    } else {
        Err(CalcError::invalid_input(field, value.to_string(), "Must be 0 or 1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitSystem;

    fn base(values: &[(&str, f64)]) -> BTreeMap<String, f64> {
        values.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn si_example() -> BTreeMap<String, f64> {
        base(&[
            ("suction_pressure", 1.0),
            ("discharge_pressure", 8.0),
            ("suction_temperature", 300.0),
            ("speed_rpm", 1200.0),
        ])
    }

    #[test]
    fn test_si_passthrough() {
        let op = operating_point_from_map(&si_example(), &CalcSettings::default()).unwrap();
        assert_eq!(op.suction_pressure_bar, 1.0);
        assert_eq!(op.suction_temperature_k, 300.0);
        assert_eq!(op.cylinders.len(), 1);
        assert!(op.interstage_cooler.is_none());
        assert!(op.driver.is_none());
    }

    #[test]
    fn test_field_units() {
        let params = base(&[
            ("suction_pressure", 0.0),
            ("discharge_pressure", 100.0),
            ("suction_temperature", 80.0),
            ("speed_rpm", 1200.0),
            ("stroke", 5.0),
            ("bore", 8.0),
            ("max_discharge_temperature", 300.0),
        ]);
        let settings = CalcSettings::default().with_unit_system(UnitSystem::Field);
        let op = operating_point_from_map(&params, &settings).unwrap();

        assert!((op.suction_pressure_bar - 1.01325).abs() < 1e-12);
        assert!((op.discharge_pressure_bar - (100.0 / 14.503_773_8 + 1.01325)).abs() < 1e-9);
        assert!((op.suction_temperature_k - 299.8167).abs() < 1e-3);
        assert!((op.stroke_m - 0.127).abs() < 1e-12);
        assert!((op.cylinders[0].bore_m - 0.2032).abs() < 1e-12);
        assert!((op.max_discharge_temperature_k - 422.0389).abs() < 1e-3);
    }

    #[test]
    fn test_metric_units() {
        let params = base(&[
            ("suction_pressure", 1.0),
            ("discharge_pressure", 10.0),
            ("suction_temperature", 30.0),
            ("speed_rpm", 1000.0),
            ("stroke", 140.0),
        ]);
        let settings = CalcSettings {
            atmospheric_pressure_bar: 1.0,
            ..CalcSettings::default().with_unit_system(UnitSystem::Metric)
        };
        let op = operating_point_from_map(&params, &settings).unwrap();

        assert!((op.suction_pressure_bar - 1.980_665).abs() < 1e-12);
        assert!((op.discharge_pressure_bar - 10.806_65).abs() < 1e-9);
        assert!((op.suction_temperature_k - 303.15).abs() < 1e-12);
        assert!((op.stroke_m - 0.14).abs() < 1e-12);
    }

    #[test]
    fn test_missing_required() {
        let mut params = si_example();
        params.remove("speed_rpm");
        let err = operating_point_from_map(&params, &CalcSettings::default()).unwrap_err();
        assert_eq!(err, CalcError::missing_field("speed_rpm"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut params = si_example();
        params.insert("flux_capacitor".to_string(), 1.21);
        let err = operating_point_from_map(&params, &CalcSettings::default()).unwrap_err();
        assert_eq!(err.field(), Some("flux_capacitor"));
    }

    #[test]
    fn test_counts_must_be_integers() {
        let mut params = si_example();
        params.insert("stages".to_string(), 2.5);
        let err = operating_point_from_map(&params, &CalcSettings::default()).unwrap_err();
        assert_eq!(err.field(), Some("stages"));
    }

    #[test]
    fn test_mass_flow_key() {
        let op = operating_point_from_map(&si_example(), &CalcSettings::default()).unwrap();
        assert_eq!(op.mass_flow_kg_s, None);

        let mut params = si_example();
        params.insert("mass_flow".to_string(), 0.25);
        let settings = CalcSettings::default().with_unit_system(UnitSystem::Field);
        let op = operating_point_from_map(&params, &settings).unwrap();
        assert_eq!(op.mass_flow_kg_s, Some(0.25));
    }

    #[test]
    fn test_stage_count_limit() {
        let mut params = si_example();
        params.insert("stages".to_string(), f64::from(MAX_STAGES + 1));
        let err = operating_point_from_map(&params, &CalcSettings::default()).unwrap_err();
        assert_eq!(err.field(), Some("stages"));

        let mut params = si_example();
        params.insert("cylinders_per_stage".to_string(), 1e9);
        let err = operating_point_from_map(&params, &CalcSettings::default()).unwrap_err();
        assert_eq!(err.field(), Some("cylinders_per_stage"));
    }

    #[test]
    fn test_cylinder_layout_and_stage_bores() {
        let mut params = si_example();
        params.insert("stages".to_string(), 2.0);
        params.insert("cylinders_per_stage".to_string(), 2.0);
        params.insert("bore".to_string(), 0.25);
        params.insert("bore_stage_2".to_string(), 0.15);
        params.insert("single_acting".to_string(), 1.0);

        let op = operating_point_from_map(&params, &CalcSettings::default()).unwrap();
        let numbers: Vec<_> = op.cylinders.iter().map(|c| (c.number, c.stage)).collect();
        assert_eq!(numbers, vec![(1, 1), (2, 1), (3, 2), (4, 2)]);
        assert_eq!(op.cylinders[0].bore_m, 0.25);
        assert_eq!(op.cylinders[3].bore_m, 0.15);
        assert!(op.cylinders.iter().all(|c| c.action == CylinderAction::SingleActing));
    }

    #[test]
    fn test_bore_stage_out_of_range() {
        let mut params = si_example();
        params.insert("bore_stage_3".to_string(), 0.15);
        let err = operating_point_from_map(&params, &CalcSettings::default()).unwrap_err();
        assert_eq!(err.field(), Some("bore_stage_3"));
    }

    #[test]
    fn test_cooler_and_driver() {
        let mut params = si_example();
        params.insert("stages".to_string(), 2.0);
        params.insert("cooler_outlet_temperature".to_string(), 310.0);
        params.insert("driver_power_kw".to_string(), 300.0);
        params.insert("driver_electric".to_string(), 1.0);
        params.insert("driver_derate_pct".to_string(), 5.0);

        let op = operating_point_from_map(&params, &CalcSettings::default()).unwrap();
        let cooler = op.interstage_cooler.unwrap();
        assert_eq!(cooler.outlet_temperature_k, 310.0);
        assert_eq!(cooler.pressure_drop_pct, 1.0);

        let driver = op.driver.unwrap();
        assert_eq!(driver.kind, DriverKind::ElectricMotor);
        assert_eq!(driver.derate_pct, 5.0);
        assert_eq!(driver.cooler_fan_pct, 4.0);
    }

    #[test]
    fn test_driver_options_need_power() {
        let mut params = si_example();
        params.insert("driver_derate_pct".to_string(), 5.0);
        let err = operating_point_from_map(&params, &CalcSettings::default()).unwrap_err();
        assert_eq!(err, CalcError::missing_field("driver_power_kw"));
    }

    #[test]
    fn test_bad_flag() {
        let mut params = si_example();
        params.insert("single_acting".to_string(), 2.0);
        let err = operating_point_from_map(&params, &CalcSettings::default()).unwrap_err();
        assert_eq!(err.field(), Some("single_acting"));
    }
}
