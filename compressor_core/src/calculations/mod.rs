//! # Compressor Calculations
//!
//! The performance calculation follows the pattern:
//!
//! - [`OperatingPoint`] - Input parameters (JSON-serializable)
//! - [`PerformanceResult`] - Calculation results (JSON-serializable)
//! - `calculate(input) -> Result<PerformanceResult, CalcError>` - Pure calculation function
//!
//! ## Modules
//!
//! - [`operating_point`] - Process conditions, cylinders, cooler, driver
//! - [`performance`] - Stage-by-stage performance and limit checks

pub mod operating_point;
pub mod performance;

// Re-export commonly used types
pub use operating_point::{AirCooler, Cylinder, CylinderAction, Driver, DriverKind, OperatingPoint};
pub use performance::{calculate, DriverLoad, LimitCheck, PerformanceResult, StageResult};
