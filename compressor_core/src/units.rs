//! # Unit Types
//!
//! Type-safe wrappers for the engineering units used by the compressor
//! calculations. These are lightweight f64 newtypes that serialize as plain
//! numbers.
//!
//! ## SI Internally
//!
//! All calculations run in SI-derived units:
//! - Pressure: bar absolute
//! - Temperature: kelvin
//! - Length: metres
//! - Power: kilowatts
//!
//! Field units (psig, degF, inches) and metric shop units (kgf/cm2 gauge,
//! degC, millimetres) only appear at the input boundary, see [`UnitSystem`].
//!
//! ## Example
//!
//! ```rust
//! use compressor_core::units::{Celsius, Fahrenheit, Kelvin, Inches, Meters};
//!
//! let t: Kelvin = Fahrenheit(120.0).into();
//! assert!((t.0 - 322.0389).abs() < 1e-3);
//!
//! let c: Celsius = t.into();
//! assert!((c.0 - 48.8889).abs() < 1e-3);
//!
//! let stroke: Meters = Inches(5.0).into();
//! assert!((stroke.0 - 0.127).abs() < 1e-12);
//! ```

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CalcError;

/// Standard atmosphere in bar
pub const STANDARD_ATMOSPHERE_BAR: f64 = 1.01325;

/// Offset between kelvin and degrees Celsius
pub const KELVIN_OFFSET: f64 = 273.15;

/// Brake horsepower per kilowatt
pub const HP_PER_KW: f64 = 1.34102;

const PSI_PER_BAR: f64 = 14.503_773_8;
const BAR_PER_KGF_CM2: f64 = 0.980_665;

// ============================================================================
// Pressure Units
// ============================================================================

/// Pressure in bar
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bar(pub f64);

/// Pressure in pounds per square inch
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Psi(pub f64);

/// Pressure in kilogram-force per square centimetre
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KgfPerCm2(pub f64);

/// Pressure in kilopascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloPascals(pub f64);

impl From<Psi> for Bar {
    fn from(psi: Psi) -> Self {
        Bar(psi.0 / PSI_PER_BAR)
    }
}

impl From<Bar> for Psi {
    fn from(bar: Bar) -> Self {
        Psi(bar.0 * PSI_PER_BAR)
    }
}

impl From<KgfPerCm2> for Bar {
    fn from(kgf: KgfPerCm2) -> Self {
        Bar(kgf.0 * BAR_PER_KGF_CM2)
    }
}

impl From<Bar> for KgfPerCm2 {
    fn from(bar: Bar) -> Self {
        KgfPerCm2(bar.0 / BAR_PER_KGF_CM2)
    }
}

impl From<Bar> for KiloPascals {
    fn from(bar: Bar) -> Self {
        KiloPascals(bar.0 * 100.0)
    }
}

impl From<KiloPascals> for Bar {
    fn from(kpa: KiloPascals) -> Self {
        Bar(kpa.0 / 100.0)
    }
}

// ============================================================================
// Temperature Units
// ============================================================================

/// Absolute temperature in kelvin
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kelvin(pub f64);

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Celsius(pub f64);

/// Temperature in degrees Fahrenheit
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fahrenheit(pub f64);

impl From<Celsius> for Kelvin {
    fn from(c: Celsius) -> Self {
        Kelvin(c.0 + KELVIN_OFFSET)
    }
}

impl From<Kelvin> for Celsius {
    fn from(k: Kelvin) -> Self {
        Celsius(k.0 - KELVIN_OFFSET)
    }
}

impl From<Fahrenheit> for Kelvin {
    fn from(f: Fahrenheit) -> Self {
        Kelvin((f.0 - 32.0) * 5.0 / 9.0 + KELVIN_OFFSET)
    }
}

impl From<Kelvin> for Fahrenheit {
    fn from(k: Kelvin) -> Self {
        Fahrenheit((k.0 - KELVIN_OFFSET) * 9.0 / 5.0 + 32.0)
    }
}

// ============================================================================
// Length Units
// ============================================================================

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

impl From<Inches> for Meters {
    fn from(inches: Inches) -> Self {
        Meters(inches.0 * 0.0254)
    }
}

impl From<Meters> for Inches {
    fn from(m: Meters) -> Self {
        Inches(m.0 / 0.0254)
    }
}

// ============================================================================
// Power Units
// ============================================================================

/// Power in kilowatts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilowatts(pub f64);

/// Brake horsepower
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Horsepower(pub f64);

impl From<Kilowatts> for Horsepower {
    fn from(kw: Kilowatts) -> Self {
        Horsepower(kw.0 * HP_PER_KW)
    }
}

impl From<Horsepower> for Kilowatts {
    fn from(hp: Horsepower) -> Self {
        Kilowatts(hp.0 / HP_PER_KW)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Bar);
impl_arithmetic!(Psi);
impl_arithmetic!(KgfPerCm2);
impl_arithmetic!(KiloPascals);
impl_arithmetic!(Kelvin);
impl_arithmetic!(Celsius);
impl_arithmetic!(Fahrenheit);
impl_arithmetic!(Meters);
impl_arithmetic!(Millimeters);
impl_arithmetic!(Inches);
impl_arithmetic!(Kilowatts);
impl_arithmetic!(Horsepower);

// ============================================================================
// Input Unit Systems
// ============================================================================

/// Unit system used by the parameter-map input boundary.
///
/// | System   | Pressure      | Temperature | Length |
/// |----------|---------------|-------------|--------|
/// | `Si`     | bar absolute  | K           | m      |
/// | `Field`  | psig          | degF        | in     |
/// | `Metric` | kgf/cm2 gauge | degC        | mm     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Si,
    Field,
    Metric,
}

impl UnitSystem {
    /// All unit systems, in display order
    pub const ALL: [UnitSystem; 3] = [UnitSystem::Si, UnitSystem::Field, UnitSystem::Metric];

    /// Pressure unit label
    pub fn pressure_unit(self) -> &'static str {
        match self {
            UnitSystem::Si => "bar(a)",
            UnitSystem::Field => "psig",
            UnitSystem::Metric => "kgf/cm2(g)",
        }
    }

    /// Temperature unit label
    pub fn temperature_unit(self) -> &'static str {
        match self {
            UnitSystem::Si => "K",
            UnitSystem::Field => "degF",
            UnitSystem::Metric => "degC",
        }
    }

    /// Length unit label
    pub fn length_unit(self) -> &'static str {
        match self {
            UnitSystem::Si => "m",
            UnitSystem::Field => "in",
            UnitSystem::Metric => "mm",
        }
    }

    /// Convert a pressure in this system to bar absolute.
    ///
    /// Gauge systems add `atmospheric_bar`.
    pub fn pressure_to_bar_abs(self, value: f64, atmospheric_bar: f64) -> Bar {
        match self {
            UnitSystem::Si => Bar(value),
            UnitSystem::Field => Bar::from(Psi(value)) + Bar(atmospheric_bar),
            UnitSystem::Metric => Bar::from(KgfPerCm2(value)) + Bar(atmospheric_bar),
        }
    }

    /// Convert a temperature in this system to kelvin
    pub fn temperature_to_kelvin(self, value: f64) -> Kelvin {
        match self {
            UnitSystem::Si => Kelvin(value),
            UnitSystem::Field => Fahrenheit(value).into(),
            UnitSystem::Metric => Celsius(value).into(),
        }
    }

    /// Convert a length in this system to metres
    pub fn length_to_meters(self, value: f64) -> Meters {
        match self {
            UnitSystem::Si => Meters(value),
            UnitSystem::Field => Inches(value).into(),
            UnitSystem::Metric => Millimeters(value).into(),
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitSystem::Si => "si",
            UnitSystem::Field => "field",
            UnitSystem::Metric => "metric",
        };
        f.write_str(name)
    }
}

impl FromStr for UnitSystem {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "si" => Ok(UnitSystem::Si),
            "field" | "us" | "imperial" => Ok(UnitSystem::Field),
            "metric" => Ok(UnitSystem::Metric),
            other => Err(CalcError::invalid_input(
                "unit_system",
                other,
                "Expected one of: si, field, metric",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_psi_to_bar() {
        let bar: Bar = Psi(14.503_773_8).into();
        assert!((bar.0 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_kgf_to_bar() {
        let bar: Bar = KgfPerCm2(10.0).into();
        assert!((bar.0 - 9.80665).abs() < 1e-12);
    }

    #[test]
    fn test_temperature_conversions() {
        let k: Kelvin = Celsius(25.0).into();
        assert!((k.0 - 298.15).abs() < 1e-12);

        let k: Kelvin = Fahrenheit(32.0).into();
        assert!((k.0 - 273.15).abs() < 1e-12);

        let f: Fahrenheit = Kelvin(373.15).into();
        assert!((f.0 - 212.0).abs() < 1e-9);
    }

    #[test]
    fn test_power_conversion() {
        let hp: Horsepower = Kilowatts(100.0).into();
        assert!((hp.0 - 134.102).abs() < 1e-9);
    }

    #[test]
    fn test_arithmetic() {
        let a = Bar(10.0);
        let b = Bar(2.5);
        assert_eq!((a + b).0, 12.5);
        assert_eq!((a - b).0, 7.5);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 4.0).0, 2.5);
    }

    #[test]
    fn test_gauge_pressure_conversion() {
        let p = UnitSystem::Field.pressure_to_bar_abs(0.0, STANDARD_ATMOSPHERE_BAR);
        assert!((p.0 - STANDARD_ATMOSPHERE_BAR).abs() < 1e-12);

        let p = UnitSystem::Metric.pressure_to_bar_abs(1.0, 1.0);
        assert!((p.0 - 1.980665).abs() < 1e-12);

        // SI is already absolute
        let p = UnitSystem::Si.pressure_to_bar_abs(5.0, STANDARD_ATMOSPHERE_BAR);
        assert_eq!(p.0, 5.0);
    }

    #[test]
    fn test_unit_system_parse() {
        assert_eq!("SI".parse::<UnitSystem>().unwrap(), UnitSystem::Si);
        assert_eq!("field".parse::<UnitSystem>().unwrap(), UnitSystem::Field);
        assert_eq!(" metric ".parse::<UnitSystem>().unwrap(), UnitSystem::Metric);
        assert!("cgs".parse::<UnitSystem>().is_err());
    }

    #[test]
    fn test_serialization() {
        let t = Kelvin(300.0);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "300.0");

        let system = serde_json::to_string(&UnitSystem::Metric).unwrap();
        assert_eq!(system, "\"metric\"");
        let roundtrip: UnitSystem = serde_json::from_str(&system).unwrap();
        assert_eq!(roundtrip, UnitSystem::Metric);
    }
}
