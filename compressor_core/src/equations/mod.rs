//! # Compressor Equations
//!
//! This module contains the thermodynamic and cylinder equations used by the
//! performance calculator. Having equations in one place enables:
//! - Easy verification against references (GPSA, API 618)
//! - Documentation of assumptions and unit bases
//! - One implementation shared by every stage
//!
//! ## Modules
//!
//! - [`thermo`] - Gas properties, stage ratios, temperatures, power
//! - [`cylinder`] - Piston displacement, clearance, efficiencies
//! - [`registry`] - Equation metadata and tracking for PDF appendix generation
//!
//! ## Unit Basis
//!
//! - **Pressure**: bar absolute (converted to kPa inside `gas_density`)
//! - **Temperature**: kelvin
//! - **Mass flow**: kg/s
//! - **Power**: kW
//!
//! ## References
//!
//! - GPSA Engineering Data Book, 13th Edition, Section 13
//! - API 618, 5th Edition: Reciprocating Compressors

pub mod cylinder;
pub mod registry;
pub mod thermo;

// Re-export commonly used items
pub use thermo::{
    specific_gas_constant,
    specific_heat_cp,
    gas_density,
    stage_pressure_ratio,
    isentropic_discharge_temperature,
    actual_discharge_temperature,
    polytropic_exponent,
    gas_power_kw,
    normal_volume_flow_nm3_h,
    UNIVERSAL_GAS_CONSTANT,
};

pub use cylinder::{
    circular_area,
    piston_displacement,
    volumetric_efficiency,
    isentropic_efficiency,
    effective_clearance,
};

pub use registry::{
    CodeReference,
    Equation,
    EquationCategory,
    EquationMetadata,
    EquationTracker,
    EquationUsage,
    Variable,
    ALL_EQUATIONS,
    stage_equations,
    generate_equations_markdown,
};
