//! XLSX workbook report.
//!
//! - `Summary` sheet: report header, operating point, overall results,
//!   driver load and limit checks as parameter / value / unit rows
//! - `Stages` sheet: the stage table also used for CSV export
//!
//! The document creation time is [`ReportContext::generated_at`], so identical
//! inputs give identical workbook contents.

use rust_xlsxwriter::{DocProperties, Format, Workbook, Worksheet, XlsxError};

use crate::calculations::performance::PerformanceResult;
use crate::errors::{CalcError, CalcResult};
use crate::report::csv::csv_rows;
use crate::report::ReportContext;
use crate::units::{Celsius, Kelvin};

const SUMMARY_SHEET: &str = "Summary";
const STAGES_SHEET: &str = "Stages";

/// Column titles of the Stages sheet
const STAGE_COLUMNS: [(&str, &str); 13] = [
    ("Stage", ""),
    ("Suction pressure", "bar(a)"),
    ("Discharge pressure", "bar(a)"),
    ("Pressure ratio", "-"),
    ("Suction temperature", "degC"),
    ("Discharge temperature", "degC"),
    ("Isentropic efficiency", "-"),
    ("Volumetric efficiency", "-"),
    ("Mass flow", "kg/s"),
    ("Actual capacity", "m3/h"),
    ("Gas power", "kW"),
    ("Brake power", "kW"),
    ("Brake horsepower", "hp"),
];

/// Render the workbook to bytes
pub fn render_xlsx(result: &PerformanceResult, ctx: &ReportContext) -> CalcResult<Vec<u8>> {
    build_workbook(result, ctx).map_err(|e| CalcError::report_failed("xlsx", e.to_string()))
}

fn build_workbook(result: &PerformanceResult, ctx: &ReportContext) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    let properties = DocProperties::new()
        .set_title(format!("{} performance report", result.label))
        .set_author(ctx.engineer.as_str())
        .set_company(ctx.company.as_str())
        .set_creation_datetime(&ctx.generated_at);
    workbook.set_properties(&properties);

    let bold = Format::new().set_bold();
    let number = Format::new().set_num_format("0.000");

    let summary = workbook.add_worksheet().set_name(SUMMARY_SHEET)?;
    write_summary(summary, result, ctx, &bold, &number)?;

    let stages = workbook.add_worksheet().set_name(STAGES_SHEET)?;
    write_stages(stages, result, &bold, &number)?;

    workbook.save_to_buffer()
}

/// Parameter / value / unit rows
struct SummaryWriter<'a> {
    sheet: &'a mut Worksheet,
    row: u32,
    bold: &'a Format,
    number: &'a Format,
}

impl SummaryWriter<'_> {
    fn section(&mut self, title: &str) -> Result<(), XlsxError> {
        if self.row > 0 {
            self.row += 1;
        }
        self.sheet.write_string_with_format(self.row, 0, title, self.bold)?;
        self.row += 1;
        Ok(())
    }

    fn text(&mut self, name: &str, value: &str) -> Result<(), XlsxError> {
        self.sheet.write_string(self.row, 0, name)?;
        self.sheet.write_string(self.row, 1, value)?;
        self.row += 1;
        Ok(())
    }

    fn value(&mut self, name: &str, value: f64, unit: &str) -> Result<(), XlsxError> {
        self.sheet.write_string(self.row, 0, name)?;
        self.sheet.write_number_with_format(self.row, 1, value, self.number)?;
        self.sheet.write_string(self.row, 2, unit)?;
        self.row += 1;
        Ok(())
    }
}

fn celsius(kelvin: f64) -> f64 {
    Celsius::from(Kelvin(kelvin)).value()
}

fn write_summary(
    sheet: &mut Worksheet,
    result: &PerformanceResult,
    ctx: &ReportContext,
    bold: &Format,
    number: &Format,
) -> Result<(), XlsxError> {
    sheet.set_column_width(0, 34.0)?;
    sheet.set_column_width(1, 20.0)?;
    sheet.set_column_width(2, 12.0)?;

    let op = &result.operating_point;
    let mut w = SummaryWriter { sheet, row: 0, bold, number };

    w.section("Report")?;
    w.text("Compressor", &result.label)?;
    w.text("Company", &ctx.company)?;
    w.text("Engineer", &ctx.engineer)?;
    w.text("Job ID", &ctx.job_id)?;
    w.text("Date", &ctx.date_string())?;

    w.section("Operating Point")?;
    w.value("Suction pressure", op.suction_pressure_bar, "bar(a)")?;
    w.value("Discharge pressure", op.discharge_pressure_bar, "bar(a)")?;
    w.value("Suction temperature", celsius(op.suction_temperature_k), "degC")?;
    w.value("Speed", op.speed_rpm, "rpm")?;
    w.value("Stroke", op.stroke_m * 1000.0, "mm")?;
    w.value("Stages", f64::from(op.stages), "-")?;
    if let Some(mass_flow) = op.mass_flow_kg_s {
        w.value("Required mass flow", mass_flow, "kg/s")?;
    }
    w.text("Gas", &op.gas.name)?;
    w.value("Molecular weight", op.gas.molecular_weight, "kg/kmol")?;
    w.value("Specific heat ratio", op.gas.specific_heat_ratio, "-")?;
    w.value("Mechanical efficiency", op.mechanical_efficiency, "-")?;

    w.section("Results")?;
    w.value("Compression ratio", result.compression_ratio, "-")?;
    w.value("Stage pressure ratio", result.stage_pressure_ratio, "-")?;
    w.value("Mass flow", result.mass_flow_kg_s, "kg/s")?;
    w.value("Actual capacity", result.actual_capacity_m3_h, "m3/h")?;
    w.value("Normal flow", result.normal_flow_nm3_h, "Nm3/h")?;
    w.value("Volumetric efficiency", result.volumetric_efficiency, "-")?;
    w.value("Discharge temperature", celsius(result.discharge_temperature_k), "degC")?;
    w.value("Gas power", result.gas_power_kw, "kW")?;
    w.value("Brake power", result.brake_power_kw, "kW")?;
    w.value("Brake horsepower", result.brake_horsepower, "hp")?;

    if let Some(driver) = &result.driver {
        w.section("Driver")?;
        w.text("Type", driver.kind.display_name())?;
        w.value("Rated power", driver.rated_power_kw, "kW")?;
        w.value("Available power", driver.available_power_kw, "kW")?;
        w.value("Utilization", driver.utilization, "-")?;
    }

    w.section("Limit Checks")?;
    for check in &result.checks {
        w.sheet.write_string(w.row, 0, check.name.as_str())?;
        w.sheet.write_number_with_format(w.row, 1, check.unity, w.number)?;
        w.sheet.write_string(w.row, 2, if check.passes { "OK" } else { "FAIL" })?;
        w.row += 1;
    }
    w.text("Overall", if result.passes() { "PASS" } else { "FAIL" })?;

    Ok(())
}

fn write_stages(sheet: &mut Worksheet, result: &PerformanceResult, bold: &Format, number: &Format) -> Result<(), XlsxError> {
    for (col, (title, unit)) in STAGE_COLUMNS.iter().enumerate() {
        let col = col as u16;
        let header = if unit.is_empty() {
            title.to_string()
        } else {
            format!("{} ({})", title, unit)
        };
        sheet.write_string_with_format(0, col, header, bold)?;
        sheet.set_column_width(col, 16.0)?;
    }

    for (i, row) in csv_rows(result).iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, row.stage.as_str())?;

        let cells = [
            row.suction_pressure_bar,
            row.discharge_pressure_bar,
            row.pressure_ratio,
            row.suction_temperature_c,
            row.discharge_temperature_c,
            row.isentropic_efficiency,
            row.volumetric_efficiency,
            Some(row.mass_flow_kg_s),
            Some(row.actual_capacity_m3_h),
            Some(row.gas_power_kw),
            Some(row.brake_power_kw),
            Some(row.brake_horsepower),
        ];
        for (offset, cell) in cells.iter().enumerate() {
            if let Some(value) = cell {
                sheet.write_number_with_format(r, offset as u16 + 1, *value, number)?;
            }
        }
    }

    Ok(())
}
