//! # Reciprocating Compressor Performance
//!
//! Computes stage-by-stage performance of a reciprocating compressor at one
//! operating point: pressure ratios, discharge temperatures, capacity, gas and
//! brake power, and the limit checks against the discharge temperature limit,
//! cylinder capacity and driver rating.
//!
//! ## Assumptions
//!
//! - Equal pressure ratio in every stage
//! - Coolers only between stages (no aftercooler credit in the results)
//! - Throughput is the required mass flow when given, otherwise the stage 1
//!   mass capacity; every stage reports its capacity load against it
//! - Isentropic efficiency estimated from the cylinder configuration
//!
//! ## Example
//!
//! ```rust
//! use compressor_core::calculations::operating_point::OperatingPoint;
//! use compressor_core::calculations::performance::calculate;
//!
//! let op = OperatingPoint::new(1.0, 8.0, 300.0, 1200.0);
//! let result = calculate(&op).unwrap();
//!
//! assert_eq!(result.compression_ratio, 8.0);
//! println!("Brake power: {:.1} kW", result.brake_power_kw);
//! println!("Pass: {}", result.passes());
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::operating_point::{Cylinder, DriverKind, OperatingPoint};
use crate::equations::cylinder::{effective_clearance, isentropic_efficiency, piston_displacement, volumetric_efficiency};
use crate::equations::thermo::{
    actual_discharge_temperature, gas_density, gas_power_kw, isentropic_discharge_temperature,
    normal_volume_flow_nm3_h, polytropic_exponent, stage_pressure_ratio,
};
use crate::errors::{CalcError, CalcResult};
use crate::units::{Horsepower, Kilowatts};

/// Slack allowed on a unity ratio before a check fails
const UNITY_TOLERANCE: f64 = 1e-9;

/// Performance of one compression stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage number (1-based)
    pub stage: u32,
    /// Cylinder numbers assigned to this stage
    pub cylinders: Vec<u32>,

    // === Pressures ===
    /// Suction pressure (bar absolute)
    pub suction_pressure_bar: f64,
    /// Discharge pressure (bar absolute)
    pub discharge_pressure_bar: f64,
    pub pressure_ratio: f64,

    // === Temperatures ===
    /// Suction temperature (K)
    pub suction_temperature_k: f64,
    /// Isentropic discharge temperature (K)
    pub isentropic_discharge_temperature_k: f64,
    /// Actual discharge temperature (K)
    pub discharge_temperature_k: f64,
    pub isentropic_efficiency: f64,
    pub polytropic_exponent: f64,

    // === Capacity ===
    /// Clearance fraction including opened pocket volume
    pub effective_clearance: f64,
    pub volumetric_efficiency: f64,
    /// Piston displacement of all stage cylinders (m3/h)
    pub displacement_m3_h: f64,
    /// Stage capacity at suction conditions, VE x PD (m3/h)
    pub actual_capacity_m3_h: f64,
    /// Gas density at stage suction (kg/m3)
    pub suction_density_kg_m3: f64,
    /// Throughput divided by the stage mass capacity
    pub capacity_load: f64,

    // === Power ===
    pub gas_power_kw: f64,
    pub brake_power_kw: f64,
    pub brake_horsepower: f64,
}

/// Driver loading at the operating point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverLoad {
    pub kind: DriverKind,
    /// Nameplate power (kW)
    pub rated_power_kw: f64,
    /// Power after derate and cooler fan (kW)
    pub available_power_kw: f64,
    /// Brake power / available power
    pub utilization: f64,
}

/// One pass/fail check against a limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitCheck {
    /// Description (e.g., "Stage 1 discharge temperature")
    pub name: String,
    pub actual: f64,
    pub allowable: f64,
    /// actual / allowable, must be <= 1.0 to pass
    pub unity: f64,
    pub passes: bool,
}

impl LimitCheck {
    pub fn new(name: impl Into<String>, actual: f64, allowable: f64) -> Self {
        let unity = actual / allowable;
        Self {
            name: name.into(),
            actual,
            allowable,
            unity,
            passes: unity <= 1.0 + UNITY_TOLERANCE,
        }
    }
}

/// Results of a compressor performance calculation.
///
/// ## JSON Example (abridged)
///
/// ```json
/// {
///   "label": "K-101",
///   "compression_ratio": 8.0,
///   "stage_pressure_ratio": 8.0,
///   "mass_flow_kg_s": 0.0745,
///   "discharge_temperature_k": 579.8,
///   "brake_power_kw": 34.6,
///   "checks": [
///     { "name": "Stage 1 discharge temperature", "actual": 579.8, "allowable": 422.0, "unity": 1.37, "passes": false }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceResult {
    pub label: String,
    /// Input the result was computed from
    pub operating_point: OperatingPoint,

    // === Overall ===
    /// Pd / Ps
    pub compression_ratio: f64,
    /// Per-stage ratio
    pub stage_pressure_ratio: f64,
    /// Throughput (kg/s)
    pub mass_flow_kg_s: f64,
    /// Throughput as volume flow at stage 1 inlet (m3/h)
    pub actual_capacity_m3_h: f64,
    /// Throughput at 0 degC and 1.01325 bar (Nm3/h)
    pub normal_flow_nm3_h: f64,
    /// Stage 1 volumetric efficiency
    pub volumetric_efficiency: f64,
    /// Final stage discharge temperature (K)
    pub discharge_temperature_k: f64,
    pub gas_power_kw: f64,
    pub brake_power_kw: f64,
    pub brake_horsepower: f64,

    pub stages: Vec<StageResult>,
    pub driver: Option<DriverLoad>,
    pub checks: Vec<LimitCheck>,
}

impl PerformanceResult {
    /// Check if every limit check passes
    pub fn passes(&self) -> bool {
        self.checks.iter().all(|c| c.passes)
    }

    /// Check with the highest unity ratio
    pub fn governing_check(&self) -> Option<&LimitCheck> {
        self.checks
            .iter()
            .max_by(|a, b| a.unity.total_cmp(&b.unity))
    }

    /// Checks that fail
    pub fn failed_checks(&self) -> impl Iterator<Item = &LimitCheck> {
        self.checks.iter().filter(|c| !c.passes)
    }
}

/// Stage values known before the throughput is fixed
struct StageState {
    stage: u32,
    cylinders: Vec<u32>,
    suction_pressure_bar: f64,
    discharge_pressure_bar: f64,
    suction_temperature_k: f64,
    isentropic_discharge_temperature_k: f64,
    discharge_temperature_k: f64,
    isentropic_efficiency: f64,
    polytropic_exponent: f64,
    effective_clearance: f64,
    volumetric_efficiency: f64,
    displacement_m3_s: f64,
    capacity_m3_s: f64,
    suction_density_kg_m3: f64,
}

impl StageState {
    fn mass_capacity_kg_s(&self) -> f64 {
        self.suction_density_kg_m3 * self.capacity_m3_s
    }
}

/// Calculate compressor performance at one operating point.
///
/// This is a pure function: identical input gives an identical result.
///
/// # Returns
///
/// * `Ok(PerformanceResult)` - Stage results, totals and limit checks
/// * `Err(CalcError::InvalidInput)` - Parameters are physically inconsistent,
///   including a stage whose clearance leaves no volumetric efficiency
///
/// # Example
///
/// ```rust
/// use compressor_core::calculations::operating_point::{AirCooler, OperatingPoint};
/// use compressor_core::calculations::performance::calculate;
///
/// let op = OperatingPoint::new(1.0, 16.0, 300.0, 1000.0)
///     .with_stages(2)
///     .with_interstage_cooler(AirCooler::default());
///
/// let result = calculate(&op).expect("Calculation should succeed");
/// assert_eq!(result.stages.len(), 2);
/// assert_eq!(result.stages[1].discharge_pressure_bar, 16.0);
/// ```
pub fn calculate(op: &OperatingPoint) -> CalcResult<PerformanceResult> {
    op.validate()?;

    let layout = op.cylinder_layout();
    let gas = &op.gas;
    let k = gas.specific_heat_ratio;
    let overall_ratio = op.compression_ratio();
    let drop = op.interstage_drop_fraction();
    let ratio = stage_pressure_ratio(overall_ratio, op.stages, drop);

    // === Stage chain: pressures, temperatures, cylinder capacity ===
    let mut states = Vec::with_capacity(op.stages as usize);
    let mut suction_pressure = op.suction_pressure_bar;
    let mut suction_temperature = op.suction_temperature_k;

    for stage in 1..=op.stages {
        let cylinders: Vec<&Cylinder> = layout.iter().filter(|c| c.stage == stage).collect();
        let count = cylinders.len() as f64;

        let discharge_pressure = if stage == op.stages {
            op.discharge_pressure_bar
        } else {
            suction_pressure * ratio
        };

        let eta = cylinders
            .iter()
            .map(|c| isentropic_efficiency(c.sace_pct, c.vvcp_pct, c.clearance_pct))
            .sum::<f64>()
            / count;
        let td_s = isentropic_discharge_temperature(suction_temperature, ratio, k);
        let td = actual_discharge_temperature(suction_temperature, td_s, eta);
        let n_poly = polytropic_exponent(suction_temperature, td, ratio);

        let clearance = cylinders
            .iter()
            .map(|c| effective_clearance(c.clearance_pct, c.vvcp_pct))
            .sum::<f64>()
            / count;
        let ve = volumetric_efficiency(ratio, clearance, k, gas.z_suction, gas.z_discharge);
        if ve <= 0.0 {
            return Err(CalcError::invalid_input(
                format!("stage_{}.clearance_pct", stage),
                format!("{:.1}", clearance * 100.0),
                format!(
                    "Clearance too large for stage ratio {:.2}: volumetric efficiency {:.3}",
                    ratio, ve
                ),
            ));
        }

        let displacement: f64 = cylinders
            .iter()
            .map(|c| {
                piston_displacement(c.bore_m, c.rod_diameter_m, op.stroke_m, op.speed_rpm, c.action.is_double_acting())
            })
            .sum();
        let density = gas_density(suction_pressure, suction_temperature, gas.molecular_weight, gas.z_suction);

        debug!(
            stage,
            suction_pressure_bar = suction_pressure,
            discharge_pressure_bar = discharge_pressure,
            discharge_temperature_k = td,
            volumetric_efficiency = ve,
            "stage computed"
        );

        states.push(StageState {
            stage,
            cylinders: cylinders.iter().map(|c| c.number).collect(),
            suction_pressure_bar: suction_pressure,
            discharge_pressure_bar: discharge_pressure,
            suction_temperature_k: suction_temperature,
            isentropic_discharge_temperature_k: td_s,
            discharge_temperature_k: td,
            isentropic_efficiency: eta,
            polytropic_exponent: n_poly,
            effective_clearance: clearance,
            volumetric_efficiency: ve,
            displacement_m3_s: displacement,
            capacity_m3_s: ve * displacement,
            suction_density_kg_m3: density,
        });

        suction_pressure = discharge_pressure * (1.0 - drop);
        suction_temperature = match &op.interstage_cooler {
            Some(cooler) => td.min(cooler.outlet_temperature_k),
            None => td,
        };
    }

    // === Throughput and power ===
    let first = states
        .first()
        .ok_or_else(|| CalcError::Internal { message: "no stages computed".to_string() })?;
    let (mass_flow, actual_capacity_m3_h) = match op.mass_flow_kg_s {
        Some(required) => (required, required / first.suction_density_kg_m3 * 3600.0),
        None => (first.mass_capacity_kg_s(), first.capacity_m3_s * 3600.0),
    };
    debug!(mass_flow_kg_s = mass_flow, required = op.mass_flow_kg_s.is_some(), "throughput fixed");
    let first_ve = first.volumetric_efficiency;

    let stages: Vec<StageResult> = states
        .into_iter()
        .map(|s| {
            let gas_power = gas_power_kw(
                mass_flow,
                s.suction_temperature_k,
                ratio,
                k,
                gas.molecular_weight,
                gas.z_average(),
                s.isentropic_efficiency,
            );
            let brake_power = gas_power / op.mechanical_efficiency;
            StageResult {
                stage: s.stage,
                capacity_load: mass_flow / s.mass_capacity_kg_s(),
                cylinders: s.cylinders,
                suction_pressure_bar: s.suction_pressure_bar,
                discharge_pressure_bar: s.discharge_pressure_bar,
                pressure_ratio: ratio,
                suction_temperature_k: s.suction_temperature_k,
                isentropic_discharge_temperature_k: s.isentropic_discharge_temperature_k,
                discharge_temperature_k: s.discharge_temperature_k,
                isentropic_efficiency: s.isentropic_efficiency,
                polytropic_exponent: s.polytropic_exponent,
                effective_clearance: s.effective_clearance,
                volumetric_efficiency: s.volumetric_efficiency,
                displacement_m3_h: s.displacement_m3_s * 3600.0,
                actual_capacity_m3_h: s.capacity_m3_s * 3600.0,
                suction_density_kg_m3: s.suction_density_kg_m3,
                gas_power_kw: gas_power,
                brake_power_kw: brake_power,
                brake_horsepower: Horsepower::from(Kilowatts(brake_power)).value(),
            }
        })
        .collect();

    let gas_power_kw: f64 = stages.iter().map(|s| s.gas_power_kw).sum();
    let brake_power_kw: f64 = stages.iter().map(|s| s.brake_power_kw).sum();
    let discharge_temperature_k = stages.last().map_or(op.suction_temperature_k, |s| s.discharge_temperature_k);

    // === Driver ===
    let driver = op.driver.as_ref().map(|d| {
        let available = d.available_power_kw();
        DriverLoad {
            kind: d.kind,
            rated_power_kw: d.rated_power_kw,
            available_power_kw: available,
            utilization: brake_power_kw / available,
        }
    });

    // === Limit checks ===
    let mut checks = Vec::new();
    for s in &stages {
        checks.push(LimitCheck::new(
            format!("Stage {} discharge temperature", s.stage),
            s.discharge_temperature_k,
            op.max_discharge_temperature_k,
        ));
    }
    for s in &stages {
        checks.push(LimitCheck::new(format!("Stage {} capacity load", s.stage), s.capacity_load, 1.0));
    }
    if let Some(load) = &driver {
        checks.push(LimitCheck::new("Driver utilization", brake_power_kw, load.available_power_kw));
    }

    for check in checks.iter().filter(|c| !c.passes) {
        warn!(
            label = %op.label,
            check = %check.name,
            actual = check.actual,
            allowable = check.allowable,
            "limit check failed"
        );
    }

    Ok(PerformanceResult {
        label: op.label.clone(),
        operating_point: op.clone(),
        compression_ratio: overall_ratio,
        stage_pressure_ratio: ratio,
        mass_flow_kg_s: mass_flow,
        actual_capacity_m3_h,
        normal_flow_nm3_h: normal_volume_flow_nm3_h(mass_flow, gas.molecular_weight),
        volumetric_efficiency: first_ve,
        discharge_temperature_k,
        gas_power_kw,
        brake_power_kw,
        brake_horsepower: Horsepower::from(Kilowatts(brake_power_kw)).value(),
        stages,
        driver,
        checks,
    })
}
