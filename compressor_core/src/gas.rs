//! # Gas Properties
//!
//! Gas model used by the performance calculator: molecular weight, ratio of
//! specific heats and compressibility at suction and discharge.
//!
//! Pure gases and a generic natural gas are available as presets. Mixtures are
//! built from a mole-fraction composition.
//!
//! ## Example
//!
//! ```rust
//! use compressor_core::gas::{GasComponent, GasProperties};
//!
//! let gas = GasProperties::from_composition(
//!     "Lean gas",
//!     &[(GasComponent::Methane, 0.9), (GasComponent::Ethane, 0.1)],
//! ).unwrap();
//! assert!((gas.molecular_weight - 17.4457).abs() < 1e-4);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::thermo::UNIVERSAL_GAS_CONSTANT;
use crate::errors::{CalcError, CalcResult};

/// Allowed deviation of a composition's mole-fraction sum from 1
pub const COMPOSITION_TOLERANCE: f64 = 1e-3;

/// Pure components available for mixtures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GasComponent {
    Methane,
    Ethane,
    Propane,
    NButane,
    Nitrogen,
    CarbonDioxide,
    HydrogenSulfide,
    Hydrogen,
}

impl GasComponent {
    pub const ALL: [GasComponent; 8] = [
        GasComponent::Methane,
        GasComponent::Ethane,
        GasComponent::Propane,
        GasComponent::NButane,
        GasComponent::Nitrogen,
        GasComponent::CarbonDioxide,
        GasComponent::HydrogenSulfide,
        GasComponent::Hydrogen,
    ];

    /// Chemical formula
    pub fn formula(&self) -> &'static str {
        match self {
            GasComponent::Methane => "CH4",
            GasComponent::Ethane => "C2H6",
            GasComponent::Propane => "C3H8",
            GasComponent::NButane => "nC4H10",
            GasComponent::Nitrogen => "N2",
            GasComponent::CarbonDioxide => "CO2",
            GasComponent::HydrogenSulfide => "H2S",
            GasComponent::Hydrogen => "H2",
        }
    }

    /// Molecular weight (kg/kmol)
    pub fn molecular_weight(&self) -> f64 {
        match self {
            GasComponent::Methane => 16.043,
            GasComponent::Ethane => 30.070,
            GasComponent::Propane => 44.097,
            GasComponent::NButane => 58.120,
            GasComponent::Nitrogen => 28.013,
            GasComponent::CarbonDioxide => 44.010,
            GasComponent::HydrogenSulfide => 34.080,
            GasComponent::Hydrogen => 2.016,
        }
    }

    /// Ideal-gas ratio of specific heats near 15 degC
    pub fn specific_heat_ratio(&self) -> f64 {
        match self {
            GasComponent::Methane => 1.304,
            GasComponent::Ethane => 1.190,
            GasComponent::Propane => 1.130,
            GasComponent::NButane => 1.094,
            GasComponent::Nitrogen => 1.400,
            GasComponent::CarbonDioxide => 1.290,
            GasComponent::HydrogenSulfide => 1.320,
            GasComponent::Hydrogen => 1.410,
        }
    }

    /// Parse from a name or chemical formula
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "methane" | "ch4" | "c1" => Ok(GasComponent::Methane),
            "ethane" | "c2h6" | "c2" => Ok(GasComponent::Ethane),
            "propane" | "c3h8" | "c3" => Ok(GasComponent::Propane),
            "n_butane" | "nbutane" | "butane" | "nc4h10" | "nc4" => Ok(GasComponent::NButane),
            "nitrogen" | "n2" => Ok(GasComponent::Nitrogen),
            "carbon_dioxide" | "co2" => Ok(GasComponent::CarbonDioxide),
            "hydrogen_sulfide" | "h2s" => Ok(GasComponent::HydrogenSulfide),
            "hydrogen" | "h2" => Ok(GasComponent::Hydrogen),
            _ => Err(CalcError::invalid_input("gas_component", s, "Unknown gas component")),
        }
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            GasComponent::Methane => "Methane",
            GasComponent::Ethane => "Ethane",
            GasComponent::Propane => "Propane",
            GasComponent::NButane => "n-Butane",
            GasComponent::Nitrogen => "Nitrogen",
            GasComponent::CarbonDioxide => "Carbon Dioxide",
            GasComponent::HydrogenSulfide => "Hydrogen Sulfide",
            GasComponent::Hydrogen => "Hydrogen",
        }
    }
}

impl std::fmt::Display for GasComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Gas model for one operating point.
///
/// ## JSON Serialization
///
/// ```json
/// {
///   "name": "Natural Gas",
///   "molecular_weight": 18.0,
///   "specific_heat_ratio": 1.3,
///   "z_suction": 0.98,
///   "z_discharge": 0.96
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasProperties {
    /// Display name
    #[serde(default = "default_gas_name")]
    pub name: String,
    /// Molecular weight (kg/kmol)
    pub molecular_weight: f64,
    /// Ratio of specific heats, k = cp/cv
    pub specific_heat_ratio: f64,
    /// Compressibility at suction conditions
    #[serde(default = "default_z")]
    pub z_suction: f64,
    /// Compressibility at discharge conditions
    #[serde(default = "default_z")]
    pub z_discharge: f64,
    /// Mole fractions the properties were mixed from; empty for a single gas
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composition: Vec<(GasComponent, f64)>,
}

fn default_gas_name() -> String {
    "Natural Gas".to_string()
}

fn default_z() -> f64 {
    1.0
}

impl Default for GasProperties {
    fn default() -> Self {
        Self::natural_gas()
    }
}

impl GasProperties {
    /// Ideal gas with the given molecular weight and k
    pub fn new(name: impl Into<String>, molecular_weight: f64, specific_heat_ratio: f64) -> Self {
        Self {
            name: name.into(),
            molecular_weight,
            specific_heat_ratio,
            z_suction: 1.0,
            z_discharge: 1.0,
            composition: Vec::new(),
        }
    }

    /// Generic pipeline natural gas (MW 18.0, k 1.30)
    pub fn natural_gas() -> Self {
        Self::new("Natural Gas", 18.0, 1.30)
    }

    /// Dry air
    pub fn air() -> Self {
        Self::new("Air", 28.964, 1.40)
    }

    pub fn methane() -> Self {
        Self::pure(GasComponent::Methane)
    }

    pub fn nitrogen() -> Self {
        Self::pure(GasComponent::Nitrogen)
    }

    pub fn hydrogen() -> Self {
        Self::pure(GasComponent::Hydrogen)
    }

    pub fn carbon_dioxide() -> Self {
        Self::pure(GasComponent::CarbonDioxide)
    }

    /// Single pure component
    pub fn pure(component: GasComponent) -> Self {
        Self::new(component.display_name(), component.molecular_weight(), component.specific_heat_ratio())
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> CalcResult<Self> {
        match name.to_lowercase().replace([' ', '-'], "_").as_str() {
            "natural_gas" | "ng" => Ok(Self::natural_gas()),
            "air" => Ok(Self::air()),
            "methane" => Ok(Self::methane()),
            "nitrogen" => Ok(Self::nitrogen()),
            "hydrogen" => Ok(Self::hydrogen()),
            "carbon_dioxide" | "co2" => Ok(Self::carbon_dioxide()),
            _ => Err(CalcError::invalid_input("gas", name, "Unknown gas preset")),
        }
    }

    /// Mixture from mole fractions.
    ///
    /// MW = sum(y_i MW_i). Molar heat capacities are mixed linearly,
    /// Cp_i = k_i R / (k_i - 1), and k = Cp / (Cp - R).
    pub fn from_composition(name: impl Into<String>, composition: &[(GasComponent, f64)]) -> CalcResult<Self> {
        if composition.is_empty() {
            return Err(CalcError::missing_field("composition"));
        }

        for (component, fraction) in composition {
            if !fraction.is_finite() || *fraction < 0.0 {
                return Err(CalcError::invalid_input(
                    format!("composition.{}", component.formula()),
                    fraction.to_string(),
                    "Mole fraction must be a non-negative number",
                ));
            }
        }

        let total: f64 = composition.iter().map(|(_, y)| y).sum();
        if (total - 1.0).abs() > COMPOSITION_TOLERANCE {
            return Err(CalcError::invalid_input(
                "composition",
                format!("{:.4}", total),
                "Mole fractions must sum to 1",
            ));
        }

        let molecular_weight: f64 = composition
            .iter()
            .map(|(c, y)| y * c.molecular_weight())
            .sum();

        let r = UNIVERSAL_GAS_CONSTANT;
        let cp: f64 = composition
            .iter()
            .map(|(c, y)| {
                let k = c.specific_heat_ratio();
                y * k * r / (k - 1.0)
            })
            .sum();

        let mut gas = Self::new(name, molecular_weight, cp / (cp - r));
        gas.composition = composition.to_vec();
        Ok(gas)
    }

    /// Whether the properties come from mixing rules
    pub fn is_mixture(&self) -> bool {
        !self.composition.is_empty()
    }

    /// Set compressibility factors
    pub fn with_compressibility(mut self, z_suction: f64, z_discharge: f64) -> Self {
        self.z_suction = z_suction;
        self.z_discharge = z_discharge;
        self
    }

    /// Average of suction and discharge compressibility
    pub fn z_average(&self) -> f64 {
        (self.z_suction + self.z_discharge) / 2.0
    }

    /// Validate physical ranges
    pub fn validate(&self) -> CalcResult<()> {
        check_positive("gas.molecular_weight", self.molecular_weight)?;
        if !self.specific_heat_ratio.is_finite() || self.specific_heat_ratio <= 1.0 {
            return Err(CalcError::invalid_input(
                "gas.specific_heat_ratio",
                self.specific_heat_ratio.to_string(),
                "Ratio of specific heats must be greater than 1",
            ));
        }
        check_positive("gas.z_suction", self.z_suction)?;
        check_positive("gas.z_discharge", self.z_discharge)?;
        Ok(())
    }
}

fn check_positive(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Must be a positive number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_component_mixture_is_identity() {
        let gas = GasProperties::from_composition("N2", &[(GasComponent::Nitrogen, 1.0)]).unwrap();
        assert!((gas.molecular_weight - 28.013).abs() < 1e-12);
        assert!((gas.specific_heat_ratio - 1.40).abs() < 1e-9);
    }

    #[test]
    fn test_mixture_keeps_composition() {
        let composition = [(GasComponent::Methane, 0.9), (GasComponent::Ethane, 0.1)];
        let gas = GasProperties::from_composition("Lean gas", &composition).unwrap();
        assert!(gas.is_mixture());
        assert_eq!(gas.composition, composition.to_vec());
        assert!(!GasProperties::natural_gas().is_mixture());

        let json = serde_json::to_string(&GasProperties::air()).unwrap();
        assert!(!json.contains("composition"));
    }

    #[test]
    fn test_mixture_k_between_components() {
        let gas = GasProperties::from_composition(
            "Rich gas",
            &[(GasComponent::Methane, 0.8), (GasComponent::Propane, 0.2)],
        )
        .unwrap();
        assert!(gas.specific_heat_ratio < 1.304);
        assert!(gas.specific_heat_ratio > 1.130);
        assert!((gas.molecular_weight - (0.8 * 16.043 + 0.2 * 44.097)).abs() < 1e-9);
    }

    #[test]
    fn test_composition_must_sum_to_one() {
        let err = GasProperties::from_composition(
            "Bad",
            &[(GasComponent::Methane, 0.5), (GasComponent::Ethane, 0.4)],
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("composition"));

        // Within tolerance
        assert!(GasProperties::from_composition(
            "Ok",
            &[(GasComponent::Methane, 0.9995)],
        )
        .is_ok());
    }

    #[test]
    fn test_negative_fraction_rejected() {
        let err = GasProperties::from_composition(
            "Bad",
            &[(GasComponent::Methane, 1.2), (GasComponent::Hydrogen, -0.2)],
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("composition.H2"));
    }

    #[test]
    fn test_presets() {
        assert_eq!(GasProperties::default(), GasProperties::natural_gas());
        assert_eq!(GasProperties::preset("CO2").unwrap(), GasProperties::carbon_dioxide());
        assert_eq!(GasProperties::preset("Natural Gas").unwrap().molecular_weight, 18.0);
        assert!(GasProperties::preset("argon").is_err());
    }

    #[test]
    fn test_component_parsing() {
        assert_eq!(GasComponent::from_str_flexible("n-Butane").unwrap(), GasComponent::NButane);
        assert_eq!(GasComponent::from_str_flexible("H2S").unwrap(), GasComponent::HydrogenSulfide);
        assert!(GasComponent::from_str_flexible("xenon").is_err());
    }

    #[test]
    fn test_validate() {
        assert!(GasProperties::natural_gas().validate().is_ok());

        let mut gas = GasProperties::natural_gas();
        gas.specific_heat_ratio = 1.0;
        assert_eq!(gas.validate().unwrap_err().field(), Some("gas.specific_heat_ratio"));

        let gas = GasProperties::natural_gas().with_compressibility(0.0, 1.0);
        assert_eq!(gas.validate().unwrap_err().field(), Some("gas.z_suction"));
    }

    #[test]
    fn test_json_defaults() {
        let gas: GasProperties = serde_json::from_str(r#"{"molecular_weight": 20.0, "specific_heat_ratio": 1.25}"#).unwrap();
        assert_eq!(gas.z_suction, 1.0);
        assert_eq!(gas.name, "Natural Gas");
    }
}
