//! # Equation Registry
//!
//! Central registry of the compressor equations used by the performance
//! calculator. Each equation has metadata including references, formulas,
//! and variable definitions.
//!
//! ## Architecture
//!
//! The registry provides:
//! - Type-safe equation identification via the `Equation` enum
//! - Full metadata for the PDF appendix and for EQUATIONS.md
//! - An `EquationTracker` that records where each equation was applied
//!
//! ## Usage
//!
//! ```rust
//! use compressor_core::equations::registry::{Equation, EquationUsage};
//!
//! let usage = EquationUsage::new(Equation::VolumetricEfficiency, "Stage 1");
//!
//! let meta = Equation::VolumetricEfficiency.metadata();
//! println!("Formula: {}", meta.formula_typst);
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

// ============================================================================
// References
// ============================================================================

/// Reference to the source of an equation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum CodeReference {
    /// GPSA Engineering Data Book
    Gpsa {
        edition: u8,
        section: &'static str,
    },
    /// API 618 - Reciprocating Compressors
    Api618 {
        edition: u8,
        section: &'static str,
    },
    /// Fundamental thermodynamics (ideal/real gas relations)
    Thermodynamics,
    /// Empirical correlation
    Empirical { source: &'static str },
}

impl CodeReference {
    /// Format the reference for display in reports
    pub fn citation(&self) -> String {
        match self {
            CodeReference::Gpsa { edition, section } => {
                format!("GPSA Engineering Data Book {}ed, Section {}", edition, section)
            }
            CodeReference::Api618 { edition, section } => {
                format!("API 618 {}ed, {}", edition, section)
            }
            CodeReference::Thermodynamics => "Fundamental Thermodynamics".to_string(),
            CodeReference::Empirical { source } => format!("Empirical correlation ({})", source),
        }
    }

    /// Short form for inline references
    pub fn short_form(&self) -> &'static str {
        match self {
            CodeReference::Gpsa { .. } => "GPSA",
            CodeReference::Api618 { .. } => "API 618",
            CodeReference::Thermodynamics => "Thermodynamics",
            CodeReference::Empirical { .. } => "Empirical",
        }
    }
}

// ============================================================================
// Equation Categories
// ============================================================================

/// Categories for organizing equations in the appendix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// Gas constant, density, mixing rules
    GasProperties,
    /// Stage pressure ratio and interstage pressures
    StagePressures,
    /// Isentropic and actual discharge temperature
    DischargeTemperature,
    /// Isentropic efficiency estimate
    Efficiency,
    /// Displacement, volumetric efficiency, capacity
    Capacity,
    /// Gas and brake power
    Power,
    /// Driver rating checks
    DriverChecks,
}

impl EquationCategory {
    /// Display name for the category
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::GasProperties => "Gas Properties",
            EquationCategory::StagePressures => "Stage Pressures",
            EquationCategory::DischargeTemperature => "Discharge Temperature",
            EquationCategory::Efficiency => "Efficiency",
            EquationCategory::Capacity => "Capacity",
            EquationCategory::Power => "Power",
            EquationCategory::DriverChecks => "Driver Checks",
        }
    }

    /// Sort order for the appendix (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            EquationCategory::GasProperties => 1,
            EquationCategory::StagePressures => 2,
            EquationCategory::DischargeTemperature => 3,
            EquationCategory::Efficiency => 4,
            EquationCategory::Capacity => 5,
            EquationCategory::Power => 6,
            EquationCategory::DriverChecks => 7,
        }
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in an equation.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol (e.g., "r", "T_s", "k")
    pub symbol: &'static str,
    /// Description
    pub description: &'static str,
    /// Units (e.g., "K", "bar(a)", "kW")
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

// ============================================================================
// Equation Metadata
// ============================================================================

/// Complete metadata for a compressor equation.
#[derive(Debug, Clone)]
pub struct EquationMetadata {
    /// Human-readable name
    pub name: &'static str,
    /// Brief description of what this equation calculates
    pub description: &'static str,
    /// The formula in Typst math notation for PDF rendering
    pub formula_typst: &'static str,
    /// The formula in plain text for markdown
    pub formula_plain: &'static str,
    /// Reference
    pub reference: CodeReference,
    /// Variable definitions
    pub variables: Vec<Variable>,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
    /// Category for grouping in appendix
    pub category: EquationCategory,
    /// Source module where the equation implementation lives
    pub source_module: &'static str,
    /// Function name implementing the equation
    pub source_function: &'static str,
}

// ============================================================================
// Equation Enum
// ============================================================================

/// All equations used by the performance calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Equation {
    // Gas properties
    /// R_s = R / MW
    SpecificGasConstant,
    /// rho = P MW / (Z R T)
    GasDensity,
    /// MW = sum(y_i MW_i)
    MixtureMolecularWeight,
    /// k from molar heat capacity mixing
    MixtureHeatCapacityRatio,

    // Stage pressures
    /// r = ((Pd/Ps) / (1-d)^(n-1))^(1/n)
    StagePressureRatio,
    /// Ps_(i+1) = Pd_i (1 - d)
    InterstagePressure,

    // Discharge temperature
    /// Td_s = Ts r^((k-1)/k)
    IsentropicDischargeTemperature,
    /// Td = Ts + (Td_s - Ts) / eta
    ActualDischargeTemperature,
    /// n = 1 / (1 - ln(Td/Ts) / ln(r))
    PolytropicExponent,

    // Efficiency
    /// eta from SACE, VVCP, clearance
    IsentropicEfficiencyCorrelation,

    // Capacity
    /// C = (CL + VVCP) / 100
    EffectiveClearance,
    /// PD = (2A - a) L N / 60
    PistonDisplacement,
    /// VE = 0.96 - r/100 - C((Zs/Zd) r^(1/k) - 1)
    VolumetricEfficiency,
    /// Q = VE PD, m = rho Q
    ActualCapacity,
    /// Q_n = m / rho_n
    NormalVolumeFlow,

    // Power
    /// W = m Z R_s Ts k/(k-1) (r^((k-1)/k) - 1) / eta
    GasPower,
    /// BP = W / eta_m
    BrakePower,

    // Driver
    /// P_avail = P_rated (1 - derate)(1 - fan)
    DriverAvailablePower,
    /// U = BP / P_avail
    DriverUtilization,
}

impl Equation {
    /// Get the full metadata for this equation
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            Equation::SpecificGasConstant => EquationMetadata {
                name: "Specific Gas Constant",
                description: "Gas constant per unit mass from the universal gas constant",
                formula_typst: r#"$R_s = R / M W$"#,
                formula_plain: "R_s = R / MW",
                reference: CodeReference::Thermodynamics,
                variables: vec![
                    Variable::new("R", "Universal gas constant, 8.314462618", "kJ/(kmol K)"),
                    Variable::new("M W", "Molecular weight", "kg/kmol"),
                    Variable::new("R_s", "Specific gas constant", "kJ/(kg K)"),
                ],
                assumptions: vec![],
                category: EquationCategory::GasProperties,
                source_module: "equations/thermo.rs",
                source_function: "specific_gas_constant",
            },

            Equation::GasDensity => EquationMetadata {
                name: "Real Gas Density",
                description: "Density at cylinder suction from the real-gas equation of state",
                formula_typst: r#"$rho = (P dot M W) / (Z R T)$"#,
                formula_plain: "rho = P MW / (Z R T)",
                reference: CodeReference::Gpsa { edition: 13, section: "23" },
                variables: vec![
                    Variable::new("P", "Absolute pressure", "kPa"),
                    Variable::new("T", "Absolute temperature", "K"),
                    Variable::new("Z", "Compressibility factor", "-"),
                    Variable::new("rho", "Density", "kg/m3"),
                ],
                assumptions: vec!["Compressibility factor supplied by the user"],
                category: EquationCategory::GasProperties,
                source_module: "equations/thermo.rs",
                source_function: "gas_density",
            },

            Equation::MixtureMolecularWeight => EquationMetadata {
                name: "Mixture Molecular Weight",
                description: "Mole-fraction weighted molecular weight of a gas mixture",
                formula_typst: r#"$M W = sum_i y_i M W_i$"#,
                formula_plain: "MW = sum(y_i MW_i)",
                reference: CodeReference::Gpsa { edition: 13, section: "23" },
                variables: vec![
                    Variable::new("y_i", "Mole fraction of component i", "-"),
                    Variable::new("M W_i", "Molecular weight of component i", "kg/kmol"),
                ],
                assumptions: vec!["Mole fractions sum to 1"],
                category: EquationCategory::GasProperties,
                source_module: "gas.rs",
                source_function: "GasProperties::from_composition",
            },

            Equation::MixtureHeatCapacityRatio => EquationMetadata {
                name: "Mixture Heat Capacity Ratio",
                description: "Ratio of specific heats from mole-fraction weighted molar heat capacity",
                formula_typst: r#"$C_p = sum_i y_i (k_i R) / (k_i - 1)$, $k = C_p / (C_p - R)$"#,
                formula_plain: "Cp = sum(y_i k_i R / (k_i - 1)), k = Cp / (Cp - R)",
                reference: CodeReference::Gpsa { edition: 13, section: "13" },
                variables: vec![
                    Variable::new("k_i", "Heat capacity ratio of component i", "-"),
                    Variable::new("C_p", "Molar heat capacity of the mixture", "kJ/(kmol K)"),
                    Variable::new("k", "Mixture heat capacity ratio", "-"),
                ],
                assumptions: vec!["Ideal-gas heat capacities near suction temperature"],
                category: EquationCategory::GasProperties,
                source_module: "gas.rs",
                source_function: "GasProperties::from_composition",
            },

            Equation::StagePressureRatio => EquationMetadata {
                name: "Stage Pressure Ratio",
                description: "Equal per-stage ratio that delivers the overall discharge pressure after interstage losses",
                formula_typst: r#"$r = ((P_d / P_s) / (1 - d)^(n - 1))^(1 / n)$"#,
                formula_plain: "r = ((Pd/Ps) / (1-d)^(n-1))^(1/n)",
                reference: CodeReference::Gpsa { edition: 13, section: "13" },
                variables: vec![
                    Variable::new("P_s", "Suction pressure", "bar(a)"),
                    Variable::new("P_d", "Discharge pressure", "bar(a)"),
                    Variable::new("n", "Number of stages", "-"),
                    Variable::new("d", "Interstage pressure drop fraction", "-"),
                    Variable::new("r", "Stage pressure ratio", "-"),
                ],
                assumptions: vec!["Equal work split between stages"],
                category: EquationCategory::StagePressures,
                source_module: "equations/thermo.rs",
                source_function: "stage_pressure_ratio",
            },

            Equation::InterstagePressure => EquationMetadata {
                name: "Interstage Pressure",
                description: "Suction pressure of the next stage after the interstage cooler",
                formula_typst: r#"$P_(s, i+1) = P_(d, i) (1 - d)$"#,
                formula_plain: "Ps(i+1) = Pd(i) (1 - d)",
                reference: CodeReference::Gpsa { edition: 13, section: "13" },
                variables: vec![
                    Variable::new("P_(d, i)", "Discharge pressure of stage i", "bar(a)"),
                    Variable::new("d", "Interstage pressure drop fraction", "-"),
                ],
                assumptions: vec!["Pressure drop is a fixed fraction of line pressure"],
                category: EquationCategory::StagePressures,
                source_module: "calculations/performance.rs",
                source_function: "calculate",
            },

            Equation::IsentropicDischargeTemperature => EquationMetadata {
                name: "Isentropic Discharge Temperature",
                description: "Discharge temperature of a reversible adiabatic compression",
                formula_typst: r#"$T_(d,s) = T_s r^((k - 1) / k)$"#,
                formula_plain: "Td_s = Ts r^((k-1)/k)",
                reference: CodeReference::Gpsa { edition: 13, section: "13" },
                variables: vec![
                    Variable::new("T_s", "Suction temperature", "K"),
                    Variable::new("k", "Ratio of specific heats", "-"),
                    Variable::new("T_(d,s)", "Isentropic discharge temperature", "K"),
                ],
                assumptions: vec!["Constant k over the compression"],
                category: EquationCategory::DischargeTemperature,
                source_module: "equations/thermo.rs",
                source_function: "isentropic_discharge_temperature",
            },

            Equation::ActualDischargeTemperature => EquationMetadata {
                name: "Actual Discharge Temperature",
                description: "Discharge temperature including compression losses",
                formula_typst: r#"$T_d = T_s + (T_(d,s) - T_s) / eta$"#,
                formula_plain: "Td = Ts + (Td_s - Ts) / eta",
                reference: CodeReference::Thermodynamics,
                variables: vec![
                    Variable::new("eta", "Isentropic efficiency", "-"),
                    Variable::new("T_d", "Actual discharge temperature", "K"),
                ],
                assumptions: vec!["Adiabatic cylinder (no jacket cooling credit)"],
                category: EquationCategory::DischargeTemperature,
                source_module: "equations/thermo.rs",
                source_function: "actual_discharge_temperature",
            },

            Equation::PolytropicExponent => EquationMetadata {
                name: "Polytropic Exponent",
                description: "Polytropic exponent implied by the actual temperature rise",
                formula_typst: r#"$n_p = 1 / (1 - ln(T_d / T_s) / ln(r))$"#,
                formula_plain: "n_p = 1 / (1 - ln(Td/Ts) / ln(r))",
                reference: CodeReference::Thermodynamics,
                variables: vec![
                    Variable::new("n_p", "Polytropic exponent", "-"),
                ],
                assumptions: vec!["Stage ratio greater than 1"],
                category: EquationCategory::DischargeTemperature,
                source_module: "equations/thermo.rs",
                source_function: "polytropic_exponent",
            },

            Equation::IsentropicEfficiencyCorrelation => EquationMetadata {
                name: "Isentropic Efficiency Estimate",
                description: "Stage isentropic efficiency estimated from cylinder configuration",
                formula_typst: r#"$eta = "clamp"(0.65 + 0.15 S A C E / 100 - 0.05 V V C P / 100 + 0.10 C L / 100, 0.65, 0.92)$"#,
                formula_plain: "eta = clamp(0.65 + 0.15 SACE/100 - 0.05 VVCP/100 + 0.10 CL/100, 0.65, 0.92)",
                reference: CodeReference::Empirical { source: "cylinder configuration" },
                variables: vec![
                    Variable::new("S A C E", "Suction valve area coefficient", "%"),
                    Variable::new("V V C P", "Variable volume clearance pocket opening", "%"),
                    Variable::new("C L", "Fixed clearance", "%"),
                ],
                assumptions: vec!["Stage value is the average of its cylinders"],
                category: EquationCategory::Efficiency,
                source_module: "equations/cylinder.rs",
                source_function: "isentropic_efficiency",
            },

            Equation::EffectiveClearance => EquationMetadata {
                name: "Effective Clearance",
                description: "Fixed clearance plus the opened clearance pocket volume",
                formula_typst: r#"$C = (C L + V V C P) / 100$"#,
                formula_plain: "C = (CL + VVCP) / 100",
                reference: CodeReference::Api618 { edition: 5, section: "Clause 6.5" },
                variables: vec![
                    Variable::new("C", "Clearance fraction of swept volume", "-"),
                ],
                assumptions: vec!["Pocket volume expressed as percent of swept volume"],
                category: EquationCategory::Capacity,
                source_module: "equations/cylinder.rs",
                source_function: "effective_clearance",
            },

            Equation::PistonDisplacement => EquationMetadata {
                name: "Piston Displacement",
                description: "Swept volume rate of a single or double acting cylinder",
                formula_typst: r#"$P D = (2 A - a) L N / 60$"#,
                formula_plain: "PD = (2A - a) L N / 60 (double acting), A L N / 60 (single acting)",
                reference: CodeReference::Gpsa { edition: 13, section: "13" },
                variables: vec![
                    Variable::new("A", "Piston area, pi D^2 / 4", "m2"),
                    Variable::new("a", "Rod area, pi d^2 / 4", "m2"),
                    Variable::new("L", "Stroke", "m"),
                    Variable::new("N", "Speed", "rpm"),
                    Variable::new("P D", "Piston displacement", "m3/s"),
                ],
                assumptions: vec!["Tail rod not present"],
                category: EquationCategory::Capacity,
                source_module: "equations/cylinder.rs",
                source_function: "piston_displacement",
            },

            Equation::VolumetricEfficiency => EquationMetadata {
                name: "Volumetric Efficiency",
                description: "Fraction of swept volume delivered as suction gas",
                formula_typst: r#"$V E = 0.96 - r / 100 - C ((Z_s / Z_d) r^(1 / k) - 1)$"#,
                formula_plain: "VE = 0.96 - r/100 - C((Zs/Zd) r^(1/k) - 1)",
                reference: CodeReference::Gpsa { edition: 13, section: "13" },
                variables: vec![
                    Variable::new("C", "Clearance fraction", "-"),
                    Variable::new("Z_s", "Suction compressibility", "-"),
                    Variable::new("Z_d", "Discharge compressibility", "-"),
                    Variable::new("V E", "Volumetric efficiency", "-"),
                ],
                assumptions: vec!["Lubricated cylinder leakage allowance of 4% plus r%"],
                category: EquationCategory::Capacity,
                source_module: "equations/cylinder.rs",
                source_function: "volumetric_efficiency",
            },

            Equation::ActualCapacity => EquationMetadata {
                name: "Actual Capacity",
                description: "Actual inlet volume flow and mass flow of a stage",
                formula_typst: r#"$Q = V E dot P D$, $dot(m) = rho Q$"#,
                formula_plain: "Q = VE PD, m = rho Q",
                reference: CodeReference::Gpsa { edition: 13, section: "13" },
                variables: vec![
                    Variable::new("Q", "Actual inlet volume flow", "m3/s"),
                    Variable::new("dot(m)", "Mass flow", "kg/s"),
                ],
                assumptions: vec!["Throughput is set by the first stage"],
                category: EquationCategory::Capacity,
                source_module: "calculations/performance.rs",
                source_function: "calculate",
            },

            Equation::NormalVolumeFlow => EquationMetadata {
                name: "Normal Volume Flow",
                description: "Volume flow at 0 degC and 1.01325 bar",
                formula_typst: r#"$Q_n = dot(m) / rho_n$"#,
                formula_plain: "Q_n = m / rho_n",
                reference: CodeReference::Thermodynamics,
                variables: vec![
                    Variable::new("rho_n", "Ideal-gas density at normal conditions", "kg/Nm3"),
                    Variable::new("Q_n", "Normal volume flow", "Nm3/h"),
                ],
                assumptions: vec!["Z = 1 at normal conditions"],
                category: EquationCategory::Capacity,
                source_module: "equations/thermo.rs",
                source_function: "normal_volume_flow_nm3_h",
            },

            Equation::GasPower => EquationMetadata {
                name: "Stage Gas Power",
                description: "Power delivered to the gas in one stage",
                formula_typst: r#"$W = dot(m) Z_"avg" R_s T_s k / (k - 1) (r^((k - 1) / k) - 1) / eta$"#,
                formula_plain: "W = m Zavg R_s Ts k/(k-1) (r^((k-1)/k) - 1) / eta",
                reference: CodeReference::Gpsa { edition: 13, section: "13" },
                variables: vec![
                    Variable::new("Z_\"avg\"", "Average of suction and discharge Z", "-"),
                    Variable::new("W", "Gas power", "kW"),
                ],
                assumptions: vec!["Equals m cp (Td - Ts) for an ideal gas"],
                category: EquationCategory::Power,
                source_module: "equations/thermo.rs",
                source_function: "gas_power_kw",
            },

            Equation::BrakePower => EquationMetadata {
                name: "Brake Power",
                description: "Shaft power required at the crankshaft",
                formula_typst: r#"$B P = W / eta_m$, $B H P = 1.34102 dot B P$"#,
                formula_plain: "BP = W / eta_m, BHP = 1.34102 BP",
                reference: CodeReference::Gpsa { edition: 13, section: "13" },
                variables: vec![
                    Variable::new("eta_m", "Mechanical efficiency", "-"),
                    Variable::new("B P", "Brake power", "kW"),
                ],
                assumptions: vec![],
                category: EquationCategory::Power,
                source_module: "calculations/performance.rs",
                source_function: "calculate",
            },

            Equation::DriverAvailablePower => EquationMetadata {
                name: "Driver Available Power",
                description: "Driver rating after site derate and air cooler fan consumption",
                formula_typst: r#"$P_"avail" = P_"rated" (1 - D / 100) (1 - F / 100)$"#,
                formula_plain: "P_avail = P_rated (1 - D/100) (1 - F/100)",
                reference: CodeReference::Empirical { source: "driver rating practice" },
                variables: vec![
                    Variable::new("D", "Site derate", "%"),
                    Variable::new("F", "Air cooler fan consumption", "%"),
                ],
                assumptions: vec!["Cooler fan is driven from the main driver"],
                category: EquationCategory::DriverChecks,
                source_module: "calculations/performance.rs",
                source_function: "Driver::available_power_kw",
            },

            Equation::DriverUtilization => EquationMetadata {
                name: "Driver Utilization",
                description: "Brake power as a fraction of available driver power",
                formula_typst: r#"$U = B P / P_"avail" <= 1.0$"#,
                formula_plain: "U = BP / P_avail <= 1.0",
                reference: CodeReference::Empirical { source: "driver rating practice" },
                variables: vec![
                    Variable::new("U", "Driver utilization", "-"),
                ],
                assumptions: vec![],
                category: EquationCategory::DriverChecks,
                source_module: "calculations/performance.rs",
                source_function: "calculate",
            },
        }
    }

    /// Get all equations in a specific category
    pub fn in_category(category: EquationCategory) -> Vec<Equation> {
        ALL_EQUATIONS
            .iter()
            .copied()
            .filter(|eq| eq.metadata().category == category)
            .collect()
    }

    /// Get all categories in sort order
    pub fn all_categories() -> Vec<EquationCategory> {
        let mut cats = vec![
            EquationCategory::GasProperties,
            EquationCategory::StagePressures,
            EquationCategory::DischargeTemperature,
            EquationCategory::Efficiency,
            EquationCategory::Capacity,
            EquationCategory::Power,
            EquationCategory::DriverChecks,
        ];
        cats.sort_by_key(|c| c.sort_order());
        cats
    }
}

/// All registered equations
pub const ALL_EQUATIONS: &[Equation] = &[
    Equation::SpecificGasConstant,
    Equation::GasDensity,
    Equation::MixtureMolecularWeight,
    Equation::MixtureHeatCapacityRatio,
    Equation::StagePressureRatio,
    Equation::InterstagePressure,
    Equation::IsentropicDischargeTemperature,
    Equation::ActualDischargeTemperature,
    Equation::PolytropicExponent,
    Equation::IsentropicEfficiencyCorrelation,
    Equation::EffectiveClearance,
    Equation::PistonDisplacement,
    Equation::VolumetricEfficiency,
    Equation::ActualCapacity,
    Equation::NormalVolumeFlow,
    Equation::GasPower,
    Equation::BrakePower,
    Equation::DriverAvailablePower,
    Equation::DriverUtilization,
];

// ============================================================================
// Equation Usage Tracking
// ============================================================================

/// Record of an equation being applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquationUsage {
    /// Which equation was used
    pub equation: Equation,
    /// Context (e.g., "Stage 2 discharge")
    pub context: String,
    /// Label of the compressor or stage the equation was applied to
    pub member_label: Option<String>,
}

impl EquationUsage {
    /// Create a new equation usage record
    pub fn new(equation: Equation, context: impl Into<String>) -> Self {
        Self {
            equation,
            context: context.into(),
            member_label: None,
        }
    }

    /// Create usage record with a member label
    pub fn for_member(equation: Equation, context: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            equation,
            context: context.into(),
            member_label: Some(label.into()),
        }
    }
}

/// Collector for equation usage during report generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquationTracker {
    usages: Vec<EquationUsage>,
}

impl EquationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an equation was used
    pub fn record(&mut self, equation: Equation, context: impl Into<String>) {
        self.usages.push(EquationUsage::new(equation, context));
    }

    /// Record equation usage for a specific member
    pub fn record_for_member(&mut self, equation: Equation, context: impl Into<String>, label: impl Into<String>) {
        self.usages.push(EquationUsage::for_member(equation, context, label));
    }

    /// Get all recorded usages
    pub fn usages(&self) -> &[EquationUsage] {
        &self.usages
    }

    /// Get unique equations used, in first-use order
    pub fn unique_equations(&self) -> Vec<Equation> {
        let mut seen = HashSet::new();
        self.usages
            .iter()
            .filter(|u| seen.insert(u.equation))
            .map(|u| u.equation)
            .collect()
    }

    /// Group usages by equation
    pub fn by_equation(&self) -> HashMap<Equation, Vec<&EquationUsage>> {
        let mut map: HashMap<Equation, Vec<&EquationUsage>> = HashMap::new();
        for usage in &self.usages {
            map.entry(usage.equation).or_default().push(usage);
        }
        map
    }

    /// Group unique equations by category, categories in sort order
    pub fn by_category(&self) -> Vec<(EquationCategory, Vec<Equation>)> {
        let unique = self.unique_equations();
        let mut by_cat: HashMap<EquationCategory, Vec<Equation>> = HashMap::new();

        for eq in unique {
            let cat = eq.metadata().category;
            by_cat.entry(cat).or_default().push(eq);
        }

        let mut result: Vec<_> = by_cat.into_iter().collect();
        result.sort_by_key(|(cat, _)| cat.sort_order());
        result
    }
}

// ============================================================================
// Typst Appendix Generation
// ============================================================================

impl EquationTracker {
    /// Generate Typst markup for the "List of Equations" appendix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use compressor_core::equations::registry::{Equation, EquationTracker};
    ///
    /// let mut tracker = EquationTracker::new();
    /// tracker.record_for_member(Equation::VolumetricEfficiency, "Capacity", "Stage 1");
    ///
    /// let typst = tracker.generate_appendix_typst();
    /// assert!(typst.contains("Volumetric Efficiency"));
    /// ```
    pub fn generate_appendix_typst(&self) -> String {
        let mut output = String::new();

        output.push_str(r##"
#pagebreak()

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Appendix: List of Equations]
  ]
]

#v(12pt)

#text(size: 10pt)[
  This appendix lists the equations used to compute this performance report.
  Each equation includes its formula, reference, and the stages to which it was applied.
]

#v(16pt)
"##);

        let by_category = self.by_category();

        if by_category.is_empty() {
            output.push_str("#text(style: \"italic\")[No equations recorded for this report.]\n");
            return output;
        }

        let usage_by_eq = self.by_equation();

        for (category, equations) in by_category {
            output.push_str(&format!("\n== {}\n\n", category.display_name()));

            for equation in equations {
                let meta = equation.metadata();

                output.push_str(&format!("=== {}\n\n", meta.name));
                output.push_str(&format!("#text(size: 10pt)[{}]\n\n", meta.description));
                output.push_str(&format!("*Formula:* {}\n\n", meta.formula_typst));
                output.push_str(&format!("*Reference:* {}\n\n", meta.reference.citation()));

                if !meta.variables.is_empty() {
                    output.push_str("*Variables:*\n");
                    output.push_str("#table(\n");
                    output.push_str("  columns: (auto, 1fr, auto),\n");
                    output.push_str("  inset: 6pt,\n");
                    output.push_str("  stroke: 0.5pt,\n");
                    output.push_str("  align: (left, left, left),\n");
                    output.push_str("  table.header([*Symbol*], [*Description*], [*Units*]),\n");

                    for var in &meta.variables {
                        output.push_str(&format!(
                            "  [${}$], [{}], [{}],\n",
                            escape_typst_math(var.symbol),
                            var.description,
                            var.units
                        ));
                    }
                    output.push_str(")\n\n");
                }

                if let Some(usages) = usage_by_eq.get(&equation) {
                    let mut labels: Vec<&str> = usages
                        .iter()
                        .filter_map(|u| u.member_label.as_deref())
                        .collect();
                    labels.sort();
                    labels.dedup();

                    if !labels.is_empty() {
                        output.push_str(&format!("*Applied to:* {}\n\n", labels.join(", ")));
                    }
                }

                if !meta.assumptions.is_empty() {
                    output.push_str("*Assumptions:*\n");
                    for assumption in &meta.assumptions {
                        output.push_str(&format!("- {}\n", assumption));
                    }
                    output.push('\n');
                }

                output.push_str("#v(8pt)\n");
                output.push_str("#line(length: 100%, stroke: 0.25pt + gray)\n");
                output.push_str("#v(8pt)\n\n");
            }
        }

        output
    }
}

/// Equations applied to every stage of a performance calculation.
pub fn stage_equations() -> Vec<Equation> {
    vec![
        Equation::StagePressureRatio,
        Equation::IsentropicDischargeTemperature,
        Equation::IsentropicEfficiencyCorrelation,
        Equation::ActualDischargeTemperature,
        Equation::PolytropicExponent,
        Equation::EffectiveClearance,
        Equation::VolumetricEfficiency,
        Equation::PistonDisplacement,
        Equation::GasDensity,
        Equation::ActualCapacity,
        Equation::GasPower,
        Equation::BrakePower,
    ]
}

/// Escape special characters for Typst math mode
fn escape_typst_math(s: &str) -> String {
    s.replace('\\', "\\\\")
}

// ============================================================================
// Markdown Generation for EQUATIONS.md
// ============================================================================

/// Generate a complete EQUATIONS.md document from the registry.
///
/// # Example
///
/// ```rust
/// use compressor_core::equations::registry::generate_equations_markdown;
///
/// let markdown = generate_equations_markdown();
/// assert!(markdown.contains("RecipCalc Equations Reference"));
/// assert!(markdown.contains("Stage Pressures"));
/// ```
pub fn generate_equations_markdown() -> String {
    let mut output = String::with_capacity(16_000);

    output.push_str(r#"# RecipCalc Equations Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-equations`

This document lists all formulas used in RecipCalc performance calculations.
Each equation includes its formula, reference, source location, and assumptions.

## Conventions

| Quantity | Basis |
|----------|-------|
| Pressure | bar absolute |
| Temperature | kelvin |
| Power | kW (BHP = 1.34102 kW) |
| Normal conditions | 0 degC, 1.01325 bar |

---

"#);

    let categories = Equation::all_categories();

    for category in &categories {
        let equations = Equation::in_category(*category);
        if equations.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for equation in equations {
            let meta = equation.metadata();

            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            if !meta.variables.is_empty() {
                output.push_str("**Variables:**\n\n");
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!("| {} | {} | {} |\n", var.symbol, var.description, var.units));
                }
                output.push('\n');
            }

            output.push_str(&format!("**Reference:** {}\n\n", meta.reference.citation()));
            output.push_str(&format!(
                "**Source:** [`{}`]({})\n\n",
                meta.source_function, meta.source_module
            ));

            if !meta.assumptions.is_empty() {
                output.push_str("**Assumptions:**\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str("---\n\n");
        }
    }

    output.push_str(&format!(
        "## Statistics\n\n- **Total Equations:** {}\n- **Categories:** {}\n",
        ALL_EQUATIONS.len(),
        categories.len()
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_equations_have_metadata() {
        assert_eq!(ALL_EQUATIONS.len(), 19);

        for eq in ALL_EQUATIONS {
            let meta = eq.metadata();
            assert!(!meta.name.is_empty(), "Equation {:?} has no name", eq);
            assert!(!meta.formula_typst.is_empty(), "Equation {:?} has no formula", eq);
            assert!(!meta.variables.is_empty(), "Equation {:?} has no variables", eq);
            assert!(!meta.source_module.is_empty(), "Equation {:?} missing source_module", eq);
            assert!(!meta.source_function.is_empty(), "Equation {:?} missing source_function", eq);
        }

        let ve = Equation::VolumetricEfficiency.metadata();
        assert!(ve.formula_plain.contains("0.96 - r/100"));
    }

    #[test]
    fn test_code_reference_citation() {
        let gpsa = CodeReference::Gpsa { edition: 13, section: "13" };
        assert_eq!(gpsa.citation(), "GPSA Engineering Data Book 13ed, Section 13");
        assert_eq!(CodeReference::Thermodynamics.short_form(), "Thermodynamics");
    }

    #[test]
    fn test_equation_tracker() {
        let mut tracker = EquationTracker::new();
        tracker.record(Equation::GasPower, "Stage 1");
        tracker.record(Equation::VolumetricEfficiency, "Stage 1");
        tracker.record(Equation::GasPower, "Stage 2");

        assert_eq!(tracker.usages().len(), 3);
        assert_eq!(tracker.unique_equations(), vec![Equation::GasPower, Equation::VolumetricEfficiency]);
    }

    #[test]
    fn test_by_category_sorted() {
        let mut tracker = EquationTracker::new();
        tracker.record(Equation::DriverUtilization, "test");
        tracker.record(Equation::GasPower, "test");
        tracker.record(Equation::SpecificGasConstant, "test");

        let cats: Vec<_> = tracker.by_category().into_iter().map(|(c, _)| c).collect();
        assert_eq!(
            cats,
            vec![EquationCategory::GasProperties, EquationCategory::Power, EquationCategory::DriverChecks]
        );
    }

    #[test]
    fn test_every_category_has_equations() {
        for cat in Equation::all_categories() {
            assert!(!Equation::in_category(cat).is_empty(), "{:?} is empty", cat);
        }
    }

    #[test]
    fn test_generate_appendix_typst() {
        let mut tracker = EquationTracker::new();
        tracker.record_for_member(Equation::GasPower, "Power", "Stage 2");
        tracker.record_for_member(Equation::GasPower, "Power", "Stage 1");

        let typst = tracker.generate_appendix_typst();
        assert!(typst.contains("Appendix: List of Equations"));
        assert!(typst.contains("Stage Gas Power"));
        assert!(typst.contains("*Applied to:* Stage 1, Stage 2"));
        assert!(typst.contains("GPSA"));
    }

    #[test]
    fn test_generate_appendix_empty_tracker() {
        let typst = EquationTracker::new().generate_appendix_typst();
        assert!(typst.contains("No equations recorded"));
    }

    #[test]
    fn test_generate_equations_markdown() {
        let markdown = generate_equations_markdown();
        assert!(markdown.contains("# RecipCalc Equations Reference"));
        assert!(markdown.contains("## Gas Properties"));
        assert!(markdown.contains("## Driver Checks"));
        assert!(markdown.contains("`Td_s = Ts r^((k-1)/k)`"));
        assert!(markdown.contains("**Total Equations:** 19"));
        assert!(markdown.contains("**Categories:** 7"));
    }
}
