//! # compressor_core - Reciprocating Compressor Performance Engine
//!
//! `compressor_core` estimates the performance of multi-stage reciprocating
//! compressors and serializes the results as CSV, XLSX and PDF reports. All
//! inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: Inputs, results and errors implement Serialize
//! - **Rich Errors**: Structured error types naming the offending field
//! - **Deterministic**: Reports depend only on the result and a caller-supplied timestamp
//!
//! ## Quick Start
//!
//! ```rust
//! use compressor_core::calculations::{calculate, OperatingPoint};
//!
//! // Natural gas from 1 to 8 bar(a), 300 K suction, 1200 rpm
//! let op = OperatingPoint::new(1.0, 8.0, 300.0, 1200.0).with_label("K-101");
//! let result = calculate(&op).unwrap();
//!
//! assert!((result.compression_ratio - 8.0).abs() < 1e-12);
//! println!("Brake power: {:.1} kW", result.brake_power_kw);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Operating point inputs and the stage-by-stage calculation
//! - [`equations`] - Thermodynamic and cylinder equations with a metadata registry
//! - [`gas`] - Gas property presets and mixtures
//! - [`parameters`] - Named-parameter input in SI, field or metric units
//! - [`settings`] - Unit system, site atmosphere and report defaults
//! - [`report`] - CSV, XLSX and PDF report serializers
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`file_io`] - JSON input loading and atomic report writes

pub mod calculations;
pub mod equations;
pub mod errors;
pub mod file_io;
pub mod gas;
pub mod parameters;
pub mod report;
pub mod settings;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate, OperatingPoint, PerformanceResult};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_operating_point, load_settings, write_artifact};
pub use gas::GasProperties;
pub use report::{export_report, export_reports, ReportArtifact, ReportContext, ReportFormat};
pub use settings::CalcSettings;
pub use units::UnitSystem;
