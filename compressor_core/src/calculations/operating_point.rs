//! # Operating Point
//!
//! Input parameters for one reciprocating compressor performance run: process
//! conditions, frame and cylinder geometry, gas model, and the optional
//! interstage cooler and driver.
//!
//! All values are SI (bar absolute, kelvin, metres). Field and metric units are
//! converted at the parameter map boundary, see [`crate::parameters`].
//!
//! ## Example
//!
//! ```rust
//! use compressor_core::calculations::operating_point::{AirCooler, OperatingPoint};
//!
//! let op = OperatingPoint::new(1.0, 20.0, 300.0, 1200.0)
//!     .with_label("K-101")
//!     .with_stages(2)
//!     .with_interstage_cooler(AirCooler::default());
//!
//! assert!(op.validate().is_ok());
//! assert_eq!(op.cylinder_layout().len(), 2);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::gas::GasProperties;

/// Default frame stroke: 5 in
pub const DEFAULT_STROKE_M: f64 = 0.127;

/// Default discharge temperature limit: 300 degF
pub const DEFAULT_MAX_DISCHARGE_TEMPERATURE_K: f64 = 422.038_888_9;

/// Default cooler outlet temperature: 120 degF
pub const DEFAULT_COOLER_OUTLET_K: f64 = 322.038_888_9;

/// Most compression stages accepted on one frame
pub const MAX_STAGES: u32 = 64;

// ============================================================================
// Cylinder
// ============================================================================

/// Compression on one or both sides of the piston
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CylinderAction {
    /// Head end only
    SingleActing,
    /// Head end and crank end
    #[default]
    DoubleActing,
}

impl CylinderAction {
    pub fn is_double_acting(self) -> bool {
        matches!(self, CylinderAction::DoubleActing)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            CylinderAction::SingleActing => "Single acting",
            CylinderAction::DoubleActing => "Double acting",
        }
    }
}

/// One compressor cylinder and its stage assignment.
///
/// ## JSON Example
///
/// ```json
/// {
///   "number": 1,
///   "stage": 1,
///   "bore_m": 0.2,
///   "rod_diameter_m": 0.05,
///   "action": "DoubleActing",
///   "clearance_pct": 12.0,
///   "vvcp_pct": 0.0,
///   "sace_pct": 10.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    /// Cylinder number on the frame (throw)
    pub number: u32,
    /// Stage this cylinder belongs to (1-based)
    #[serde(default = "default_stage")]
    pub stage: u32,
    /// Bore diameter (m)
    #[serde(default = "default_bore")]
    pub bore_m: f64,
    /// Piston rod diameter (m)
    #[serde(default = "default_rod")]
    pub rod_diameter_m: f64,
    #[serde(default)]
    pub action: CylinderAction,
    /// Fixed clearance, percent of swept volume
    #[serde(default = "default_five")]
    pub clearance_pct: f64,
    /// Variable volume clearance pocket opening, percent of swept volume
    #[serde(default = "default_five")]
    pub vvcp_pct: f64,
    /// Suction valve area coefficient, percent
    #[serde(default = "default_five")]
    pub sace_pct: f64,
}

fn default_stage() -> u32 {
    1
}

fn default_bore() -> f64 {
    0.2
}

fn default_rod() -> f64 {
    0.05
}

fn default_five() -> f64 {
    5.0
}

impl Cylinder {
    /// Cylinder with default geometry
    pub fn new(number: u32, stage: u32) -> Self {
        Self {
            number,
            stage,
            bore_m: default_bore(),
            rod_diameter_m: default_rod(),
            action: CylinderAction::DoubleActing,
            clearance_pct: default_five(),
            vvcp_pct: default_five(),
            sace_pct: default_five(),
        }
    }

    pub fn with_bore(mut self, bore_m: f64, rod_diameter_m: f64) -> Self {
        self.bore_m = bore_m;
        self.rod_diameter_m = rod_diameter_m;
        self
    }

    pub fn with_action(mut self, action: CylinderAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_clearance(mut self, clearance_pct: f64, vvcp_pct: f64) -> Self {
        self.clearance_pct = clearance_pct;
        self.vvcp_pct = vvcp_pct;
        self
    }

    pub fn with_sace(mut self, sace_pct: f64) -> Self {
        self.sace_pct = sace_pct;
        self
    }

    fn validate(&self, stages: u32) -> CalcResult<()> {
        let field = |name: &str| format!("cylinder_{}.{}", self.number, name);

        if self.stage == 0 || self.stage > stages {
            return Err(CalcError::invalid_input(
                field("stage"),
                self.stage.to_string(),
                format!("Stage must be between 1 and {}", stages),
            ));
        }
        require_positive(&field("bore_m"), self.bore_m)?;
        require_finite(&field("rod_diameter_m"), self.rod_diameter_m)?;
        if self.rod_diameter_m < 0.0 || self.rod_diameter_m >= self.bore_m {
            return Err(CalcError::invalid_input(
                field("rod_diameter_m"),
                self.rod_diameter_m.to_string(),
                "Rod diameter must be non-negative and smaller than the bore",
            ));
        }
        require_non_negative(&field("clearance_pct"), self.clearance_pct)?;
        require_non_negative(&field("vvcp_pct"), self.vvcp_pct)?;
        if self.clearance_pct + self.vvcp_pct >= 100.0 {
            return Err(CalcError::invalid_input(
                field("clearance_pct"),
                self.clearance_pct.to_string(),
                "Clearance plus pocket opening must be below 100% of swept volume",
            ));
        }
        require_finite(&field("sace_pct"), self.sace_pct)?;
        if !(0.0..=100.0).contains(&self.sace_pct) {
            return Err(CalcError::invalid_input(
                field("sace_pct"),
                self.sace_pct.to_string(),
                "SACE must be between 0 and 100",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Interstage Cooler and Driver
// ============================================================================

/// Air cooler installed between consecutive stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirCooler {
    /// Pressure drop across cooler and piping, percent of line pressure
    #[serde(default = "default_cooler_drop")]
    pub pressure_drop_pct: f64,
    /// Gas outlet temperature (K)
    #[serde(default = "default_cooler_outlet")]
    pub outlet_temperature_k: f64,
}

fn default_cooler_drop() -> f64 {
    1.0
}

fn default_cooler_outlet() -> f64 {
    DEFAULT_COOLER_OUTLET_K
}

impl Default for AirCooler {
    fn default() -> Self {
        Self {
            pressure_drop_pct: default_cooler_drop(),
            outlet_temperature_k: default_cooler_outlet(),
        }
    }
}

impl AirCooler {
    /// Pressure drop as a fraction
    pub fn pressure_drop_fraction(&self) -> f64 {
        self.pressure_drop_pct / 100.0
    }

    fn validate(&self) -> CalcResult<()> {
        require_finite("interstage_cooler.pressure_drop_pct", self.pressure_drop_pct)?;
        if !(0.0..100.0).contains(&self.pressure_drop_pct) {
            return Err(CalcError::invalid_input(
                "interstage_cooler.pressure_drop_pct",
                self.pressure_drop_pct.to_string(),
                "Pressure drop must be at least 0% and below 100%",
            ));
        }
        require_positive("interstage_cooler.outlet_temperature_k", self.outlet_temperature_k)
    }
}

/// Prime mover type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DriverKind {
    #[default]
    NaturalGasEngine,
    ElectricMotor,
}

impl DriverKind {
    pub fn display_name(self) -> &'static str {
        match self {
            DriverKind::NaturalGasEngine => "Natural gas engine",
            DriverKind::ElectricMotor => "Electric motor",
        }
    }
}

/// Compressor driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    #[serde(default)]
    pub kind: DriverKind,
    /// Nameplate power at site speed (kW)
    pub rated_power_kw: f64,
    /// Site derate (altitude, ambient), percent
    #[serde(default)]
    pub derate_pct: f64,
    /// Power taken by the air cooler fan, percent of derated power
    #[serde(default = "default_fan_pct")]
    pub cooler_fan_pct: f64,
}

fn default_fan_pct() -> f64 {
    4.0
}

impl Driver {
    pub fn new(kind: DriverKind, rated_power_kw: f64) -> Self {
        Self {
            kind,
            rated_power_kw,
            derate_pct: 0.0,
            cooler_fan_pct: default_fan_pct(),
        }
    }

    pub fn with_derate(mut self, derate_pct: f64) -> Self {
        self.derate_pct = derate_pct;
        self
    }

    pub fn with_cooler_fan(mut self, cooler_fan_pct: f64) -> Self {
        self.cooler_fan_pct = cooler_fan_pct;
        self
    }

    /// Power left for the compressor: P_rated (1 - derate)(1 - fan)
    pub fn available_power_kw(&self) -> f64 {
        self.rated_power_kw * (1.0 - self.derate_pct / 100.0) * (1.0 - self.cooler_fan_pct / 100.0)
    }

    fn validate(&self) -> CalcResult<()> {
        require_positive("driver.rated_power_kw", self.rated_power_kw)?;
        for (field, value) in [
            ("driver.derate_pct", self.derate_pct),
            ("driver.cooler_fan_pct", self.cooler_fan_pct),
        ] {
            require_finite(field, value)?;
            if !(0.0..100.0).contains(&value) {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Must be at least 0% and below 100%",
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Operating Point
// ============================================================================

/// Input parameters for a compressor performance calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "K-101",
///   "suction_pressure_bar": 1.0,
///   "discharge_pressure_bar": 8.0,
///   "suction_temperature_k": 300.0,
///   "speed_rpm": 1200.0,
///   "stages": 1,
///   "gas": { "name": "Natural Gas", "molecular_weight": 18.0, "specific_heat_ratio": 1.3 },
///   "driver": { "kind": "NaturalGasEngine", "rated_power_kw": 250.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    /// Label shown in reports (e.g., "K-101")
    #[serde(default = "default_label")]
    pub label: String,

    /// Stage 1 suction pressure (bar absolute)
    pub suction_pressure_bar: f64,

    /// Final discharge pressure (bar absolute)
    pub discharge_pressure_bar: f64,

    /// Stage 1 suction temperature (K)
    pub suction_temperature_k: f64,

    /// Crankshaft speed (rpm)
    pub speed_rpm: f64,

    /// Frame stroke shared by all cylinders (m)
    #[serde(default = "default_stroke")]
    pub stroke_m: f64,

    /// Number of compression stages
    #[serde(default = "default_stages")]
    pub stages: u32,

    /// Required throughput (kg/s). None means the stage 1 cylinders set it.
    #[serde(default)]
    pub mass_flow_kg_s: Option<f64>,

    /// Cylinders with stage assignment. Empty means one default cylinder per stage.
    #[serde(default)]
    pub cylinders: Vec<Cylinder>,

    #[serde(default)]
    pub gas: GasProperties,

    /// Frame mechanical efficiency, (0, 1]
    #[serde(default = "default_mechanical_efficiency")]
    pub mechanical_efficiency: f64,

    /// Cooler between consecutive stages
    #[serde(default)]
    pub interstage_cooler: Option<AirCooler>,

    #[serde(default)]
    pub driver: Option<Driver>,

    /// Discharge temperature limit for the limit check (K)
    #[serde(default = "default_max_discharge")]
    pub max_discharge_temperature_k: f64,
}

fn default_label() -> String {
    "Compressor".to_string()
}

fn default_stroke() -> f64 {
    DEFAULT_STROKE_M
}

fn default_stages() -> u32 {
    1
}

fn default_mechanical_efficiency() -> f64 {
    0.95
}

fn default_max_discharge() -> f64 {
    DEFAULT_MAX_DISCHARGE_TEMPERATURE_K
}

impl OperatingPoint {
    /// Operating point with default geometry and gas
    pub fn new(suction_pressure_bar: f64, discharge_pressure_bar: f64, suction_temperature_k: f64, speed_rpm: f64) -> Self {
        Self {
            label: default_label(),
            suction_pressure_bar,
            discharge_pressure_bar,
            suction_temperature_k,
            speed_rpm,
            stroke_m: default_stroke(),
            stages: default_stages(),
            mass_flow_kg_s: None,
            cylinders: Vec::new(),
            gas: GasProperties::default(),
            mechanical_efficiency: default_mechanical_efficiency(),
            interstage_cooler: None,
            driver: None,
            max_discharge_temperature_k: default_max_discharge(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_stages(mut self, stages: u32) -> Self {
        self.stages = stages;
        self
    }

    pub fn with_mass_flow(mut self, mass_flow_kg_s: f64) -> Self {
        self.mass_flow_kg_s = Some(mass_flow_kg_s);
        self
    }

    pub fn with_stroke(mut self, stroke_m: f64) -> Self {
        self.stroke_m = stroke_m;
        self
    }

    pub fn with_cylinders(mut self, cylinders: Vec<Cylinder>) -> Self {
        self.cylinders = cylinders;
        self
    }

    pub fn with_gas(mut self, gas: GasProperties) -> Self {
        self.gas = gas;
        self
    }

    pub fn with_mechanical_efficiency(mut self, efficiency: f64) -> Self {
        self.mechanical_efficiency = efficiency;
        self
    }

    pub fn with_interstage_cooler(mut self, cooler: AirCooler) -> Self {
        self.interstage_cooler = Some(cooler);
        self
    }

    pub fn with_driver(mut self, driver: Driver) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn with_max_discharge_temperature(mut self, temperature_k: f64) -> Self {
        self.max_discharge_temperature_k = temperature_k;
        self
    }

    /// Overall compression ratio Pd / Ps
    pub fn compression_ratio(&self) -> f64 {
        self.discharge_pressure_bar / self.suction_pressure_bar
    }

    /// Interstage pressure drop fraction; zero without a cooler or with one stage
    pub fn interstage_drop_fraction(&self) -> f64 {
        match &self.interstage_cooler {
            Some(cooler) if self.stages > 1 => cooler.pressure_drop_fraction(),
            _ => 0.0,
        }
    }

    /// Cylinders actually used by the calculation
    pub fn cylinder_layout(&self) -> Vec<Cylinder> {
        if self.cylinders.is_empty() {
            (1..=self.stages).map(|stage| Cylinder::new(stage, stage)).collect()
        } else {
            self.cylinders.clone()
        }
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("suction_pressure_bar", self.suction_pressure_bar)?;
        require_finite("discharge_pressure_bar", self.discharge_pressure_bar)?;
        if self.discharge_pressure_bar <= self.suction_pressure_bar {
            return Err(CalcError::invalid_input(
                "discharge_pressure_bar",
                self.discharge_pressure_bar.to_string(),
                format!(
                    "Discharge pressure must exceed suction pressure ({} bar)",
                    self.suction_pressure_bar
                ),
            ));
        }
        require_positive("suction_temperature_k", self.suction_temperature_k)?;
        require_positive("speed_rpm", self.speed_rpm)?;
        require_positive("stroke_m", self.stroke_m)?;
        if self.stages == 0 || self.stages > MAX_STAGES {
            return Err(CalcError::invalid_input(
                "stages",
                self.stages.to_string(),
                format!("Must be between 1 and {}", MAX_STAGES),
            ));
        }
        if let Some(mass_flow) = self.mass_flow_kg_s {
            require_positive("mass_flow_kg_s", mass_flow)?;
        }
        self.gas.validate()?;

        require_finite("mechanical_efficiency", self.mechanical_efficiency)?;
        if self.mechanical_efficiency <= 0.0 || self.mechanical_efficiency > 1.0 {
            return Err(CalcError::invalid_input(
                "mechanical_efficiency",
                self.mechanical_efficiency.to_string(),
                "Mechanical efficiency must be in (0, 1]",
            ));
        }
        require_positive("max_discharge_temperature_k", self.max_discharge_temperature_k)?;

        let layout = self.cylinder_layout();
        let mut numbers = HashSet::new();
        for cylinder in &layout {
            if !numbers.insert(cylinder.number) {
                return Err(CalcError::invalid_input(
                    "cylinders",
                    cylinder.number.to_string(),
                    "Cylinder numbers must be unique",
                ));
            }
            cylinder.validate(self.stages)?;
        }
        for stage in 1..=self.stages {
            if !layout.iter().any(|c| c.stage == stage) {
                return Err(CalcError::invalid_input(
                    "cylinders",
                    format!("stage {}", stage),
                    "Every stage needs at least one cylinder",
                ));
            }
        }

        if let Some(cooler) = &self.interstage_cooler {
            cooler.validate()?;
        }
        if let Some(driver) = &self.driver {
            driver.validate()?;
        }
        Ok(())
    }
}

fn require_finite(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() {
        return Err(CalcError::invalid_input(field, value.to_string(), "Must be a finite number"));
    }
    Ok(())
}

fn require_positive(field: &str, value: f64) -> CalcResult<()> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Must be positive"));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> CalcResult<()> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(op: &OperatingPoint) -> String {
        op.validate().unwrap_err().field().unwrap_or_default().to_string()
    }

    #[test]
    fn test_defaults_validate() {
        let op = OperatingPoint::new(1.0, 8.0, 300.0, 1200.0);
        assert!(op.validate().is_ok());
        assert_eq!(op.label, "Compressor");
        assert!((op.compression_ratio() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_discharge_must_exceed_suction() {
        assert_eq!(field_of(&OperatingPoint::new(8.0, 1.0, 300.0, 1200.0)), "discharge_pressure_bar");
        assert_eq!(field_of(&OperatingPoint::new(5.0, 5.0, 300.0, 1200.0)), "discharge_pressure_bar");
    }

    #[test]
    fn test_non_finite_rejected() {
        assert_eq!(field_of(&OperatingPoint::new(f64::NAN, 8.0, 300.0, 1200.0)), "suction_pressure_bar");
        assert_eq!(field_of(&OperatingPoint::new(1.0, 8.0, 300.0, f64::INFINITY)), "speed_rpm");
    }

    #[test]
    fn test_default_layout_one_cylinder_per_stage() {
        let op = OperatingPoint::new(1.0, 30.0, 300.0, 1200.0).with_stages(3);
        let layout = op.cylinder_layout();
        assert_eq!(layout.iter().map(|c| c.stage).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_stage_without_cylinder_rejected() {
        let op = OperatingPoint::new(1.0, 30.0, 300.0, 1200.0)
            .with_stages(2)
            .with_cylinders(vec![Cylinder::new(1, 1), Cylinder::new(2, 1)]);
        assert_eq!(field_of(&op), "cylinders");
    }

    #[test]
    fn test_cylinder_validation() {
        let base = OperatingPoint::new(1.0, 8.0, 300.0, 1200.0);

        let op = base.clone().with_cylinders(vec![Cylinder::new(1, 1).with_bore(0.1, 0.1)]);
        assert_eq!(field_of(&op), "cylinder_1.rod_diameter_m");

        let op = base.clone().with_cylinders(vec![Cylinder::new(4, 2)]);
        assert_eq!(field_of(&op), "cylinder_4.stage");

        let op = base.clone().with_cylinders(vec![Cylinder::new(1, 1).with_clearance(60.0, 40.0)]);
        assert_eq!(field_of(&op), "cylinder_1.clearance_pct");

        let op = base.with_cylinders(vec![Cylinder::new(1, 1), Cylinder::new(1, 1)]);
        assert_eq!(field_of(&op), "cylinders");
    }

    #[test]
    fn test_driver_available_power() {
        let driver = Driver::new(DriverKind::ElectricMotor, 100.0).with_derate(10.0).with_cooler_fan(5.0);
        assert!((driver.available_power_kw() - 85.5).abs() < 1e-9);

        let op = OperatingPoint::new(1.0, 8.0, 300.0, 1200.0).with_driver(driver.with_derate(100.0));
        assert_eq!(field_of(&op), "driver.derate_pct");
    }

    #[test]
    fn test_interstage_drop_ignored_for_single_stage() {
        let op = OperatingPoint::new(1.0, 8.0, 300.0, 1200.0).with_interstage_cooler(AirCooler::default());
        assert_eq!(op.interstage_drop_fraction(), 0.0);
        let op = op.with_stages(2);
        assert!((op.interstage_drop_fraction() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_json_minimal() {
        let json = r#"{
            "suction_pressure_bar": 1.0,
            "discharge_pressure_bar": 8.0,
            "suction_temperature_k": 300.0,
            "speed_rpm": 1200.0
        }"#;
        let op: OperatingPoint = serde_json::from_str(json).unwrap();
        assert_eq!(op, OperatingPoint::new(1.0, 8.0, 300.0, 1200.0));
    }

    #[test]
    fn test_stage_count_bounded() {
        let op = OperatingPoint::new(1.0, 8.0, 300.0, 1200.0).with_stages(MAX_STAGES);
        assert!(op.validate().is_ok());

        let op = op.with_stages(MAX_STAGES + 1);
        assert_eq!(field_of(&op), "stages");

        let json = r#"{
            "suction_pressure_bar": 1.0,
            "discharge_pressure_bar": 8.0,
            "suction_temperature_k": 300.0,
            "speed_rpm": 1200.0,
            "stages": 4294967295
        }"#;
        let op: OperatingPoint = serde_json::from_str(json).unwrap();
        assert_eq!(field_of(&op), "stages");
    }

    #[test]
    fn test_mass_flow_must_be_positive() {
        let op = OperatingPoint::new(1.0, 8.0, 300.0, 1200.0).with_mass_flow(0.0);
        assert_eq!(field_of(&op), "mass_flow_kg_s");

        let op: OperatingPoint = serde_json::from_str(
            r#"{"suction_pressure_bar": 1.0, "discharge_pressure_bar": 8.0,
                "suction_temperature_k": 300.0, "speed_rpm": 1200.0, "mass_flow_kg_s": 0.5}"#,
        )
        .unwrap();
        assert_eq!(op.mass_flow_kg_s, Some(0.5));
        assert!(op.validate().is_ok());
    }

    #[test]
    fn test_mechanical_efficiency_range() {
        let op = OperatingPoint::new(1.0, 8.0, 300.0, 1200.0).with_mechanical_efficiency(1.2);
        assert_eq!(field_of(&op), "mechanical_efficiency");
    }
}
