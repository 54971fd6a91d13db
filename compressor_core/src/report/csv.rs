//! CSV stage table.
//!
//! One header row, one row per stage, and a `total` row. Temperatures are
//! reported in degrees Celsius. Cells that only make sense per stage are empty
//! in the total row.

use serde::{Deserialize, Serialize};

use crate::calculations::performance::{PerformanceResult, StageResult};
use crate::errors::{CalcError, CalcResult};
use crate::units::{Celsius, Kelvin};

/// Stage column value of the total row
pub const TOTAL_ROW: &str = "total";

/// One row of the stage table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    /// Stage number, or `total`
    pub stage: String,
    pub suction_pressure_bar: Option<f64>,
    pub discharge_pressure_bar: Option<f64>,
    pub pressure_ratio: Option<f64>,
    pub suction_temperature_c: Option<f64>,
    pub discharge_temperature_c: Option<f64>,
    pub isentropic_efficiency: Option<f64>,
    pub volumetric_efficiency: Option<f64>,
    pub mass_flow_kg_s: f64,
    pub actual_capacity_m3_h: f64,
    pub gas_power_kw: f64,
    pub brake_power_kw: f64,
    pub brake_horsepower: f64,
}

impl CsvRow {
    fn for_stage(stage: &StageResult, mass_flow_kg_s: f64) -> Self {
        Self {
            stage: stage.stage.to_string(),
            suction_pressure_bar: Some(stage.suction_pressure_bar),
            discharge_pressure_bar: Some(stage.discharge_pressure_bar),
            pressure_ratio: Some(stage.pressure_ratio),
            suction_temperature_c: Some(celsius(stage.suction_temperature_k)),
            discharge_temperature_c: Some(celsius(stage.discharge_temperature_k)),
            isentropic_efficiency: Some(stage.isentropic_efficiency),
            volumetric_efficiency: Some(stage.volumetric_efficiency),
            mass_flow_kg_s,
            actual_capacity_m3_h: stage.actual_capacity_m3_h,
            gas_power_kw: stage.gas_power_kw,
            brake_power_kw: stage.brake_power_kw,
            brake_horsepower: stage.brake_horsepower,
        }
    }

    fn total(result: &PerformanceResult) -> Self {
        let op = &result.operating_point;
        Self {
            stage: TOTAL_ROW.to_string(),
            suction_pressure_bar: Some(op.suction_pressure_bar),
            discharge_pressure_bar: Some(op.discharge_pressure_bar),
            pressure_ratio: Some(result.compression_ratio),
            suction_temperature_c: Some(celsius(op.suction_temperature_k)),
            discharge_temperature_c: Some(celsius(result.discharge_temperature_k)),
            isentropic_efficiency: None,
            volumetric_efficiency: None,
            mass_flow_kg_s: result.mass_flow_kg_s,
            actual_capacity_m3_h: result.actual_capacity_m3_h,
            gas_power_kw: result.gas_power_kw,
            brake_power_kw: result.brake_power_kw,
            brake_horsepower: result.brake_horsepower,
        }
    }

    /// True for the summary row
    pub fn is_total(&self) -> bool {
        self.stage == TOTAL_ROW
    }
}

fn celsius(kelvin: f64) -> f64 {
    Celsius::from(Kelvin(kelvin)).value()
}

/// Stage rows followed by the total row
pub fn csv_rows(result: &PerformanceResult) -> Vec<CsvRow> {
    result
        .stages
        .iter()
        .map(|s| CsvRow::for_stage(s, result.mass_flow_kg_s))
        .chain(std::iter::once(CsvRow::total(result)))
        .collect()
}

/// Render the stage table as CSV bytes
pub fn render_csv(result: &PerformanceResult) -> CalcResult<Vec<u8>> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    for row in csv_rows(result) {
        writer
            .serialize(&row)
            .map_err(|e| CalcError::report_failed("csv", e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| CalcError::report_failed("csv", e.error().to_string()))
}

/// Read a stage table back into rows.
///
/// ```rust
/// use compressor_core::calculations::{calculate, OperatingPoint};
/// use compressor_core::report::csv::{parse_csv, render_csv};
///
/// let result = calculate(&OperatingPoint::new(1.0, 8.0, 300.0, 1200.0)).unwrap();
/// let rows = parse_csv(&render_csv(&result).unwrap()).unwrap();
/// assert_eq!(rows.len(), 2);
/// assert!(rows[1].is_total());
/// ```
pub fn parse_csv(bytes: &[u8]) -> CalcResult<Vec<CsvRow>> {
    let mut reader = ::csv::Reader::from_reader(bytes);
    reader
        .deserialize::<CsvRow>()
        .map(|row| {
            row.map_err(|e: ::csv::Error| CalcError::SerializationError {
                reason: format!("Invalid CSV: {}", e),
            })
        })
        .collect()
}
