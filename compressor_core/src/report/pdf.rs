//! # PDF Report
//!
//! Generates the compressor performance report as a PDF using Typst.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Data is injected in one pass over the `{{NAME}}` placeholders
//! - User text enters the document as Typst string literals, never as markup
//! - Fonts come from `typst-assets` and are loaded once per process
//! - The document date and PDF timestamp come from the [`ReportContext`]
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use compressor_core::calculations::{calculate, OperatingPoint};
//! use compressor_core::report::ReportContext;
//! use compressor_core::report::pdf::render_pdf;
//!
//! let result = calculate(&OperatingPoint::new(1.0, 8.0, 300.0, 1200.0)).unwrap();
//! let pdf_bytes = render_pdf(&result, &ReportContext::new(Utc::now())).unwrap();
//! std::fs::write("compressor_report.pdf", pdf_bytes).unwrap();
//! ```

use chrono::{DateTime, Datelike, Timelike, Utc};
use once_cell::sync::Lazy;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::layout::PagedDocument;
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::{PdfOptions, Timestamp};

use crate::calculations::performance::PerformanceResult;
use crate::equations::registry::{stage_equations, Equation, EquationTracker};
use crate::errors::{CalcError, CalcResult};
use crate::report::ReportContext;
use crate::units::{Celsius, Kelvin};

// ============================================================================
// Typst World Implementation
// ============================================================================

/// Bundled fonts, parsed once
static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    let mut fonts = Vec::new();
    for font_bytes in typst_assets::fonts() {
        let buffer = Bytes::new(font_bytes.to_vec());
        for font in Font::iter(buffer) {
            fonts.push(font);
        }
    }
    fonts
});

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    /// The main source document
    main: Source,
    /// Font book
    book: LazyHash<FontBook>,
    /// Library (standard functions)
    library: LazyHash<Library>,
    /// Date reported by `datetime.today()`
    today: Option<Datetime>,
}

impl PdfWorld {
    fn new(source: String, today: Option<Datetime>) -> Self {
        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(FontBook::from_fonts(FONTS.iter())),
            library: LazyHash::new(Library::default()),
            today,
        }
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        self.today
    }
}

fn typst_datetime(at: &DateTime<Utc>) -> Option<Datetime> {
    Datetime::from_ymd_hms(
        at.year(),
        u8::try_from(at.month()).ok()?,
        u8::try_from(at.day()).ok()?,
        u8::try_from(at.hour()).ok()?,
        u8::try_from(at.minute()).ok()?,
        u8::try_from(at.second()).ok()?,
    )
}

// ============================================================================
// PDF Template
// ============================================================================

/// Typst template for the performance report
const REPORT_TEMPLATE: &str = r##"
#set document(title: {{TITLE}}, author: {{AUTHOR}})
#set page(
  paper: "a4",
  margin: (top: 2.2cm, bottom: 2.2cm, left: 2cm, right: 2cm),
  header: align(right)[
    #text(size: 9pt, fill: gray)[{{COMPANY}} Reciprocating Compressor Performance]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 9pt)[Job: {{JOB_ID}}]],
      align(center)[#text(size: 9pt)[Page #counter(page).display()]],
      align(right)[#text(size: 9pt)[{{DATE}}]],
    )
  ]
)

#set text(font: "Libertinus Serif", size: 10pt)
#show raw: set text(font: "DejaVu Sans Mono")

// Title Block
#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Compressor Performance Report]
    #v(4pt)
    #text(size: 14pt)[{{LABEL}}]
  ]
]

#v(12pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 20pt,
  [
    *Project Information*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 4pt,
      [Company:], [{{COMPANY}}],
      [Engineer:], [{{ENGINEER}}],
      [Job ID:], [{{JOB_ID}}],
      [Date:], [{{DATE}}],
    )
  ],
  [
    *Method*
    #v(4pt)
    GPSA Engineering Data Book, Section 13 \
    API 618 cylinder clearance conventions
  ]
)

#v(12pt)
#line(length: 100%, stroke: 0.5pt)
#v(8pt)

== Equipment Configuration

#let unit-box(body) = box(
  stroke: 0.5pt,
  fill: rgb("#f7f7f7"),
  inset: 6pt,
  radius: 3pt,
  align(center, text(size: 9pt, body)),
)

#align(center)[
{{CONFIGURATION}}
]

#v(12pt)

== Operating Point

#table(
  columns: (1fr, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, left),
  table.header([*Parameter*], [*Value*], [*Unit*]),
{{OPERATING_ROWS}}
)

#v(12pt)

== Performance Summary

#table(
  columns: (1fr, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, left),
  table.header([*Result*], [*Value*], [*Unit*]),
{{SUMMARY_ROWS}}
)

#v(12pt)

== Stage Results

#table(
  columns: (auto, auto, auto, auto, auto, auto, auto, auto, auto, auto),
  inset: 5pt,
  stroke: 0.5pt,
  align: (center, right, right, right, right, right, right, right, right, right),
  table.header(
    [*Stage*], [*P#sub[s]* \ bar(a)], [*P#sub[d]* \ bar(a)], [*r*],
    [*T#sub[s]* \ °C], [*T#sub[d]* \ °C], [*η#sub[s]*], [*VE*],
    [*Q* \ m#super[3]/h], [*BP* \ kW],
  ),
{{STAGE_ROWS}}
)

{{DRIVER_SECTION}}

#v(12pt)

== Limit Checks

#table(
  columns: (1fr, auto, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, right, right, center),
  table.header([*Check*], [*Actual*], [*Allowable*], [*Unity*], [*Status*]),
{{CHECK_ROWS}}
)

#v(16pt)

#let pass_status = "{{OVERALL_PASS}}"
#align(center)[
  #block(
    width: auto,
    fill: if pass_status == "PASS" { rgb("#d4edda") } else { rgb("#f8d7da") },
    inset: 16pt,
    radius: 4pt
  )[
    #text(size: 16pt, weight: "bold")[
      #if pass_status == "PASS" [
        WITHIN LIMITS
      ] else [
        LIMIT EXCEEDED
      ]
    ]
    #v(4pt)
    #text(size: 12pt)[Governing check: {{GOVERNING}}]
  ]
]

#v(24pt)
#line(length: 100%, stroke: 0.5pt)
#v(8pt)

#text(size: 9pt, fill: gray)[
  Generated by RecipCalc \
  Performance estimates should be verified against the compressor manufacturer's data.
]
"##;

// ============================================================================
// Row Builders
// ============================================================================

fn celsius(kelvin: f64) -> f64 {
    Celsius::from(Kelvin(kelvin)).value()
}

fn row(name: &str, value: String, unit: &str) -> String {
    format!("  [{}], [{}], [{}],", name, value, unit)
}

fn build_operating_rows(result: &PerformanceResult) -> String {
    let op = &result.operating_point;
    let mut rows = vec![
        row("Suction pressure", format!("{:.3}", op.suction_pressure_bar), "bar(a)"),
        row("Discharge pressure", format!("{:.3}", op.discharge_pressure_bar), "bar(a)"),
        row("Suction temperature", format!("{:.1}", celsius(op.suction_temperature_k)), "°C"),
        row("Speed", format!("{:.0}", op.speed_rpm), "rpm"),
        row("Stroke", format!("{:.1}", op.stroke_m * 1000.0), "mm"),
        row("Stages", op.stages.to_string(), ""),
        row("Gas", typst_text(&op.gas.name), ""),
        row("Molecular weight", format!("{:.3}", op.gas.molecular_weight), "kg/kmol"),
        row("Specific heat ratio k", format!("{:.3}", op.gas.specific_heat_ratio), ""),
        row(
            "Compressibility Z#sub[s] / Z#sub[d]",
            format!("{:.3} / {:.3}", op.gas.z_suction, op.gas.z_discharge),
            "",
        ),
        row("Mechanical efficiency", format!("{:.3}", op.mechanical_efficiency), ""),
        row(
            "Discharge temperature limit",
            format!("{:.1}", celsius(op.max_discharge_temperature_k)),
            "°C",
        ),
    ];

    if let Some(mass_flow) = op.mass_flow_kg_s {
        rows.push(row("Required mass flow", format!("{:.4}", mass_flow), "kg/s"));
    }
    if let Some(cooler) = &op.interstage_cooler {
        rows.push(row("Cooler pressure drop", format!("{:.2}", cooler.pressure_drop_pct), "%"));
        rows.push(row(
            "Cooler outlet temperature",
            format!("{:.1}", celsius(cooler.outlet_temperature_k)),
            "°C",
        ));
    }

    rows.join("\n")
}

fn build_summary_rows(result: &PerformanceResult) -> String {
    [
        row("Compression ratio", format!("{:.3}", result.compression_ratio), ""),
        row("Stage pressure ratio", format!("{:.3}", result.stage_pressure_ratio), ""),
        row("Mass flow", format!("{:.4}", result.mass_flow_kg_s), "kg/s"),
        row("Actual capacity", format!("{:.1}", result.actual_capacity_m3_h), "m#super[3]/h"),
        row("Normal flow", format!("{:.1}", result.normal_flow_nm3_h), "Nm#super[3]/h"),
        row("Volumetric efficiency", format!("{:.3}", result.volumetric_efficiency), ""),
        row(
            "Discharge temperature",
            format!("{:.1}", celsius(result.discharge_temperature_k)),
            "°C",
        ),
        row("Gas power", format!("{:.2}", result.gas_power_kw), "kW"),
        row("Brake power", format!("{:.2}", result.brake_power_kw), "kW"),
        row("Brake horsepower", format!("{:.1}", result.brake_horsepower), "hp"),
    ]
    .join("\n")
}

fn build_stage_rows(result: &PerformanceResult) -> String {
    result
        .stages
        .iter()
        .map(|s| {
            format!(
                "  [{}], [{:.3}], [{:.3}], [{:.3}], [{:.1}], [{:.1}], [{:.3}], [{:.3}], [{:.1}], [{:.2}],",
                s.stage,
                s.suction_pressure_bar,
                s.discharge_pressure_bar,
                s.pressure_ratio,
                celsius(s.suction_temperature_k),
                celsius(s.discharge_temperature_k),
                s.isentropic_efficiency,
                s.volumetric_efficiency,
                s.actual_capacity_m3_h,
                s.brake_power_kw,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_check_rows(result: &PerformanceResult) -> String {
    result
        .checks
        .iter()
        .map(|c| {
            format!(
                "  [{}], [{:.3}], [{:.3}], [{:.3}], [{}],",
                typst_text(&c.name),
                c.actual,
                c.allowable,
                c.unity,
                if c.passes { "OK" } else { "FAIL" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_driver_section(result: &PerformanceResult) -> String {
    let Some(driver) = &result.driver else {
        return String::new();
    };

    format!(
        r##"
#v(12pt)

== Driver

#table(
  columns: (1fr, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, left),
  table.header([*Parameter*], [*Value*], [*Unit*]),
{rows}
)
"##,
        rows = [
            row("Type", driver.kind.display_name().to_string(), ""),
            row("Rated power", format!("{:.1}", driver.rated_power_kw), "kW"),
            row("Available power", format!("{:.1}", driver.available_power_kw), "kW"),
            row("Utilization", format!("{:.1}", driver.utilization * 100.0), "%"),
        ]
        .join("\n"),
    )
}

/// Driver, frame, stages with their cylinders, and interstage coolers as a
/// chain of boxes
fn build_configuration(result: &PerformanceResult) -> String {
    let op = &result.operating_point;
    let mut units = Vec::new();

    if let Some(driver) = &op.driver {
        units.push(format!(
            "#unit-box[*Driver* \\ {} \\ {:.0} kW]",
            driver.kind.display_name(),
            driver.rated_power_kw
        ));
    }
    units.push(format!(
        "#unit-box[*Frame* \\ {:.0} rpm \\ {:.0} mm stroke]",
        op.speed_rpm,
        op.stroke_m * 1000.0
    ));

    let cooled = op.interstage_cooler.is_some();
    for stage in &result.stages {
        if stage.stage > 1 && cooled {
            units.push("#unit-box[*Air cooler*]".to_string());
        }
        let cylinders: Vec<String> = stage.cylinders.iter().map(u32::to_string).collect();
        let noun = if cylinders.len() == 1 { "Cylinder" } else { "Cylinders" };
        units.push(format!(
            "#unit-box[*Stage {}* \\ {} {}]",
            stage.stage,
            noun,
            cylinders.join(", ")
        ));
    }

    format!("  {}", units.join(" → "))
}

/// Equations applied in this result, for the appendix
fn build_equation_tracker(result: &PerformanceResult) -> EquationTracker {
    let mut tracker = EquationTracker::new();
    let op = &result.operating_point;
    let label = typst_text(&result.label);

    if op.gas.is_mixture() {
        let gas = typst_text(&op.gas.name);
        tracker.record_for_member(Equation::MixtureMolecularWeight, "Gas properties", gas.clone());
        tracker.record_for_member(Equation::MixtureHeatCapacityRatio, "Gas properties", gas);
    }
    tracker.record_for_member(Equation::SpecificGasConstant, "Gas properties", label.clone());
    for stage in &result.stages {
        let stage_label = format!("Stage {}", stage.stage);
        for equation in stage_equations() {
            tracker.record_for_member(equation, "Stage performance", stage_label.clone());
        }
        if stage.stage > 1 && op.interstage_cooler.is_some() {
            tracker.record_for_member(Equation::InterstagePressure, "Interstage cooler", stage_label);
        }
    }
    tracker.record_for_member(Equation::NormalVolumeFlow, "Throughput", label.clone());

    if result.driver.is_some() {
        tracker.record_for_member(Equation::DriverAvailablePower, "Driver check", label.clone());
        tracker.record_for_member(Equation::DriverUtilization, "Driver check", label);
    }

    tracker
}

// ============================================================================
// PDF Rendering
// ============================================================================

/// Render a performance result to PDF.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(CalcError::ReportFailed)` - If Typst compilation or PDF export fails
pub fn render_pdf(result: &PerformanceResult, ctx: &ReportContext) -> CalcResult<Vec<u8>> {
    let governing = result
        .governing_check()
        .map(|c| format!("{} (unity {:.2})", typst_text(&c.name), c.unity))
        .unwrap_or_else(|| "none".to_string());

    let mut source = fill_template(
        REPORT_TEMPLATE,
        &[
            ("TITLE", typst_string(&format!("{} Performance Report", result.label))),
            ("AUTHOR", typst_string(&ctx.engineer)),
            ("LABEL", typst_text(&result.label)),
            ("ENGINEER", typst_text(&ctx.engineer)),
            ("JOB_ID", typst_text(&ctx.job_id)),
            ("COMPANY", typst_text(&ctx.company)),
            ("DATE", typst_text(&ctx.date_string())),
            ("CONFIGURATION", build_configuration(result)),
            ("OPERATING_ROWS", build_operating_rows(result)),
            ("SUMMARY_ROWS", build_summary_rows(result)),
            ("STAGE_ROWS", build_stage_rows(result)),
            ("DRIVER_SECTION", build_driver_section(result)),
            ("CHECK_ROWS", build_check_rows(result)),
            ("OVERALL_PASS", if result.passes() { "PASS" } else { "FAIL" }.to_string()),
            ("GOVERNING", governing),
        ],
    );

    // Add the equations appendix
    source.push_str(&build_equation_tracker(result).generate_appendix_typst());

    let today = typst_datetime(&ctx.generated_at)
        .ok_or_else(|| CalcError::report_failed("pdf", format!("Unrepresentable date {}", ctx.generated_at)))?;

    // Compile the Typst document
    let world = PdfWorld::new(source, Some(today));
    let warned = typst::compile::<PagedDocument>(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::report_failed("pdf", format!("Typst compilation failed: {}", error_msgs.join("; ")))
    })?;

    // Render to PDF
    let options = PdfOptions {
        timestamp: Some(Timestamp::new_utc(today)),
        ..PdfOptions::default()
    };
    let pdf_bytes = typst_pdf::pdf(&document, &options).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::report_failed("pdf", format!("PDF rendering failed: {}", error_msgs.join("; ")))
    })?;

    Ok(pdf_bytes)
}

/// Replace each `{{NAME}}` in `template` with its value.
///
/// Values are inserted as-is and never scanned again. Unknown names are kept.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut output = String::with_capacity(template.len() * 2);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };

        let name = &after[..end];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => output.push_str(value),
            None => output.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    output.push_str(rest);
    output
}

/// Typst string literal holding `s`
fn typst_string(s: &str) -> String {
    let mut literal = String::with_capacity(s.len() + 2);
    literal.push('"');
    for c in s.chars() {
        match c {
            '\\' => literal.push_str("\\\\"),
            '"' => literal.push_str("\\\""),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            c if c.is_control() => literal.push_str(&format!("\\u{{{:x}}}", u32::from(c))),
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

/// User text placed in markup: an embedded string expression, so comment,
/// heading and list syntax inside it stays literal
fn typst_text(s: &str) -> String {
    format!("#{}", typst_string(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{calculate, AirCooler, Driver, DriverKind, OperatingPoint};
    use chrono::TimeZone;

    fn context() -> ReportContext {
        ReportContext::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap())
            .with_engineer("J. Smith")
            .with_job_id("26_014")
            .with_company("Acme #1 Compression")
    }

    fn two_stage_with_driver() -> PerformanceResult {
        let op = OperatingPoint::new(1.0, 16.0, 300.0, 1000.0)
            .with_label("K-101 [Unit A]")
            .with_stages(2)
            .with_interstage_cooler(AirCooler::default())
            .with_driver(Driver::new(DriverKind::NaturalGasEngine, 400.0));
        calculate(&op).unwrap()
    }

    #[test]
    fn test_pdf_generation() {
        let pdf = render_pdf(&two_stage_with_driver(), &context());
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());

        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }

    #[test]
    fn test_pdf_is_deterministic() {
        let result = two_stage_with_driver();
        let first = render_pdf(&result, &context()).unwrap();
        let second = render_pdf(&result, &context()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_typst_string_literal() {
        assert_eq!(typst_string("K-101 #2"), "\"K-101 #2\"");
        assert_eq!(typst_string("say \"hi\" \\o/"), "\"say \\\"hi\\\" \\\\o/\"");
        assert_eq!(typst_string("a\nb\u{7}"), "\"a\\nb\\u{7}\"");
        assert_eq!(typst_text("// spare"), "#\"// spare\"");
    }

    #[test]
    fn test_fill_template_single_pass() {
        let filled = fill_template(
            "[{{LABEL}}] [{{COMPANY}}] {{UNKNOWN}}",
            &[("LABEL", "{{COMPANY}}".to_string()), ("COMPANY", "Acme".to_string())],
        );
        assert_eq!(filled, "[{{COMPANY}}] [Acme] {{UNKNOWN}}");
        assert_eq!(fill_template("open {{ end", &[]), "open {{ end");
    }

    #[test]
    fn test_markup_in_user_text_renders() {
        let labels = [
            "K-101 // spare",
            "K-102 /* standby",
            "= Heading",
            "- item",
            "+ item",
            "{{COMPANY}} {{OPERATING_ROWS}}",
            "back\\slash \"quoted\" $x$ <tag> @ref `raw`",
        ];
        for label in labels {
            let op = OperatingPoint::new(1.0, 8.0, 300.0, 1200.0).with_label(label);
            let result = calculate(&op).unwrap();
            let ctx = ReportContext::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap())
                .with_engineer("J. Smith // lead")
                .with_job_id("26-014 /* rev B")
                .with_company("= {{COMPANY}} - Compression");

            let pdf = render_pdf(&result, &ctx);
            assert!(pdf.is_ok(), "PDF failed for {:?}: {:?}", label, pdf.err());
        }
    }

    #[test]
    fn test_mixture_equations_recorded() {
        use crate::gas::{GasComponent, GasProperties};

        let gas = GasProperties::from_composition(
            "Field gas",
            &[(GasComponent::Methane, 0.9), (GasComponent::Ethane, 0.1)],
        )
        .unwrap();
        let result = calculate(&OperatingPoint::new(1.0, 4.0, 300.0, 1200.0).with_gas(gas)).unwrap();
        let unique = build_equation_tracker(&result).unique_equations();
        assert!(unique.contains(&Equation::MixtureMolecularWeight));
        assert!(unique.contains(&Equation::MixtureHeatCapacityRatio));

        let result = calculate(&OperatingPoint::new(1.0, 4.0, 300.0, 1200.0)).unwrap();
        let unique = build_equation_tracker(&result).unique_equations();
        assert!(!unique.contains(&Equation::MixtureMolecularWeight));
    }

    #[test]
    fn test_configuration_diagram() {
        let diagram = build_configuration(&two_stage_with_driver());
        assert!(diagram.contains("*Driver*"));
        assert!(diagram.contains("*Air cooler*"));
        assert!(diagram.contains("*Stage 2* \\ Cylinder 2"));

        let single = calculate(&OperatingPoint::new(1.0, 8.0, 300.0, 1200.0)).unwrap();
        let diagram = build_configuration(&single);
        assert!(!diagram.contains("Driver"));
        assert!(!diagram.contains("Air cooler"));
        assert!(diagram.starts_with("  #unit-box[*Frame*"));
    }

    #[test]
    fn test_tracker_records_driver_and_interstage() {
        let tracker = build_equation_tracker(&two_stage_with_driver());
        let unique = tracker.unique_equations();
        assert!(unique.contains(&Equation::InterstagePressure));
        assert!(unique.contains(&Equation::DriverUtilization));
        assert!(unique.contains(&Equation::VolumetricEfficiency));
    }

    #[test]
    fn test_driver_section_omitted_without_driver() {
        let result = calculate(&OperatingPoint::new(1.0, 8.0, 300.0, 1200.0)).unwrap();
        assert!(build_driver_section(&result).is_empty());
    }
}
