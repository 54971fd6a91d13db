//! # Calculation Settings
//!
//! Settings shared by every run: the input unit system, the local atmospheric
//! pressure used for gauge inputs, and report defaults.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "unit_system": "field",
//!   "atmospheric_pressure_bar": 0.95,
//!   "report": {
//!     "company": "Acme Compression",
//!     "engineer": "J. Smith",
//!     "job_id": "26-014"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::{UnitSystem, STANDARD_ATMOSPHERE_BAR};

/// Settings for the parameter boundary and the report header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcSettings {
    /// Unit system of parameter-map inputs
    #[serde(default)]
    pub unit_system: UnitSystem,

    /// Local atmospheric pressure added to gauge inputs (bar)
    #[serde(default = "default_atmosphere")]
    pub atmospheric_pressure_bar: f64,

    /// Defaults for the report header
    #[serde(default)]
    pub report: ReportDefaults,
}

fn default_atmosphere() -> f64 {
    STANDARD_ATMOSPHERE_BAR
}

impl Default for CalcSettings {
    fn default() -> Self {
        CalcSettings {
            unit_system: UnitSystem::Si,
            atmospheric_pressure_bar: STANDARD_ATMOSPHERE_BAR,
            report: ReportDefaults::default(),
        }
    }
}

impl CalcSettings {
    /// Settings with a different unit system
    pub fn with_unit_system(mut self, unit_system: UnitSystem) -> Self {
        self.unit_system = unit_system;
        self
    }

    /// Parse and validate settings from JSON.
    ///
    /// ```rust
    /// use compressor_core::settings::CalcSettings;
    /// use compressor_core::units::UnitSystem;
    ///
    /// let settings = CalcSettings::from_json(r#"{ "unit_system": "metric" }"#).unwrap();
    /// assert_eq!(settings.unit_system, UnitSystem::Metric);
    /// assert_eq!(settings.atmospheric_pressure_bar, 1.01325);
    /// ```
    pub fn from_json(json: &str) -> CalcResult<Self> {
        let settings: CalcSettings = serde_json::from_str(json).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid settings: {}", e),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> CalcResult<()> {
        if !self.atmospheric_pressure_bar.is_finite() || self.atmospheric_pressure_bar <= 0.0 {
            return Err(CalcError::invalid_input(
                "atmospheric_pressure_bar",
                self.atmospheric_pressure_bar.to_string(),
                "Atmospheric pressure must be positive",
            ));
        }
        Ok(())
    }
}

/// Report header defaults
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportDefaults {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub engineer: String,
    #[serde(default)]
    pub job_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = CalcSettings::default();
        assert_eq!(settings.unit_system, UnitSystem::Si);
        assert_eq!(settings.atmospheric_pressure_bar, STANDARD_ATMOSPHERE_BAR);
        assert!(settings.report.company.is_empty());
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(CalcSettings::from_json("{}").unwrap(), CalcSettings::default());
    }

    #[test]
    fn test_full_json() {
        let json = r#"{
            "unit_system": "field",
            "atmospheric_pressure_bar": 0.95,
            "report": { "company": "Acme", "engineer": "J. Smith", "job_id": "26-014" }
        }"#;
        let settings = CalcSettings::from_json(json).unwrap();
        assert_eq!(settings.unit_system, UnitSystem::Field);
        assert_eq!(settings.report.job_id, "26-014");
    }

    #[test]
    fn test_invalid_atmosphere() {
        let err = CalcSettings::from_json(r#"{ "atmospheric_pressure_bar": -1.0 }"#).unwrap_err();
        assert_eq!(err.field(), Some("atmospheric_pressure_bar"));
    }

    #[test]
    fn test_bad_unit_system() {
        let err = CalcSettings::from_json(r#"{ "unit_system": "cgs" }"#).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
