//! # Report Serialization
//!
//! Turns a [`PerformanceResult`] into downloadable report byte streams.
//!
//! ## Formats
//!
//! | Tag | Format | Module |
//! |-----|--------|--------|
//! | `csv` | Stage table, UTF-8 text | [`csv`] |
//! | `xlsx` (alias `excel`) | Workbook with Summary and Stages sheets | [`xlsx`] |
//! | `pdf` | Typst-rendered A4 report with equations appendix | [`pdf`] |
//!
//! Serializers are deterministic: the only time-dependent value is
//! [`ReportContext::generated_at`], which the caller supplies.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use compressor_core::calculations::{calculate, OperatingPoint};
//! use compressor_core::report::{export_report, ReportContext};
//!
//! let result = calculate(&OperatingPoint::new(1.0, 8.0, 300.0, 1200.0)).unwrap();
//! let ctx = ReportContext::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
//!
//! let artifact = export_report(&result, "csv", &ctx).unwrap();
//! assert_eq!(artifact.file_name(), "compressor_performance.csv");
//!
//! assert!(export_report(&result, "XML", &ctx).is_err());
//! ```

pub mod csv;
pub mod pdf;
pub mod xlsx;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calculations::performance::PerformanceResult;
use crate::errors::{CalcError, CalcResult};
use crate::settings::ReportDefaults;

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Csv, ReportFormat::Xlsx, ReportFormat::Pdf];

    /// Canonical tag, also the file extension
    pub fn tag(self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ReportFormat::Csv => "text/csv",
            ReportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ReportFormat::Pdf => "application/pdf",
        }
    }

    /// Comma-separated list of the canonical tags
    pub fn supported_tags() -> String {
        Self::ALL.iter().map(|f| f.tag()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ReportFormat {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "xlsx" | "excel" => Ok(ReportFormat::Xlsx),
            "pdf" => Ok(ReportFormat::Pdf),
            _ => Err(CalcError::unsupported_format(s, Self::supported_tags())),
        }
    }
}

/// Header information for a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportContext {
    pub engineer: String,
    pub job_id: String,
    pub company: String,
    /// Timestamp printed in and embedded into the report
    pub generated_at: DateTime<Utc>,
}

impl ReportContext {
    /// Context with empty header fields
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            engineer: String::new(),
            job_id: String::new(),
            company: String::new(),
            generated_at,
        }
    }

    /// Context populated from settings defaults
    pub fn from_defaults(defaults: &ReportDefaults, generated_at: DateTime<Utc>) -> Self {
        Self {
            engineer: defaults.engineer.clone(),
            job_id: defaults.job_id.clone(),
            company: defaults.company.clone(),
            generated_at,
        }
    }

    pub fn with_engineer(mut self, engineer: impl Into<String>) -> Self {
        self.engineer = engineer.into();
        self
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = job_id.into();
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    /// Report date as YYYY-MM-DD
    pub fn date_string(&self) -> String {
        self.generated_at.format("%Y-%m-%d").to_string()
    }
}

/// Serialized report bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifact {
    pub format: ReportFormat,
    /// Compressor label the report was generated for
    pub label: String,
    pub bytes: Vec<u8>,
}

impl ReportArtifact {
    /// File name derived from the label, e.g. `k_101_performance.pdf`
    pub fn file_name(&self) -> String {
        format!("{}_performance.{}", file_stem(&self.label), self.format.tag())
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Lowercase ASCII stem with runs of other characters collapsed to `_`
fn file_stem(label: &str) -> String {
    let mut stem = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.is_empty() && !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let stem = stem.trim_end_matches('_');
    if stem.is_empty() {
        "compressor".to_string()
    } else {
        stem.to_string()
    }
}

/// Serialize a result in one format.
pub fn render_report(result: &PerformanceResult, format: ReportFormat, ctx: &ReportContext) -> CalcResult<ReportArtifact> {
    let bytes = match format {
        ReportFormat::Csv => csv::render_csv(result)?,
        ReportFormat::Xlsx => xlsx::render_xlsx(result, ctx)?,
        ReportFormat::Pdf => pdf::render_pdf(result, ctx)?,
    };

    info!(label = %result.label, format = %format, bytes = bytes.len(), "report rendered");

    Ok(ReportArtifact {
        format,
        label: result.label.clone(),
        bytes,
    })
}

/// Serialize a result for a format tag.
///
/// Unknown tags fail with `UnsupportedFormat` before anything is rendered.
pub fn export_report(result: &PerformanceResult, tag: &str, ctx: &ReportContext) -> CalcResult<ReportArtifact> {
    let format: ReportFormat = tag.parse()?;
    render_report(result, format, ctx)
}

/// Serialize a result for several tags.
///
/// All tags are parsed first, so one unknown tag produces no artifacts at all.
/// Duplicate tags are rendered once.
pub fn export_reports<S: AsRef<str>>(
    result: &PerformanceResult,
    tags: &[S],
    ctx: &ReportContext,
) -> CalcResult<Vec<ReportArtifact>> {
    let mut formats: Vec<ReportFormat> = Vec::with_capacity(tags.len());
    for tag in tags {
        let format: ReportFormat = tag.as_ref().parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }

    formats
        .into_iter()
        .map(|format| render_report(result, format, ctx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{calculate, OperatingPoint};
    use chrono::TimeZone;

    fn fixture() -> (PerformanceResult, ReportContext) {
        let op = OperatingPoint::new(1.0, 8.0, 300.0, 1200.0).with_label("K-101 / Unit A");
        let result = calculate(&op).unwrap();
        let ctx = ReportContext::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap())
            .with_engineer("J. Smith")
            .with_job_id("26-014");
        (result, ctx)
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ReportFormat>().unwrap(), ReportFormat::Csv);
        assert_eq!("Excel".parse::<ReportFormat>().unwrap(), ReportFormat::Xlsx);
        assert_eq!(" pdf ".parse::<ReportFormat>().unwrap(), ReportFormat::Pdf);

        let err = "XML".parse::<ReportFormat>().unwrap_err();
        assert_eq!(err, CalcError::unsupported_format("XML", "csv, xlsx, pdf"));
    }

    #[test]
    fn test_file_name_from_label() {
        let artifact = ReportArtifact {
            format: ReportFormat::Pdf,
            label: "K-101 / Unit A".to_string(),
            bytes: Vec::new(),
        };
        assert_eq!(artifact.file_name(), "k_101_unit_a_performance.pdf");
        assert_eq!(artifact.mime_type(), "application/pdf");
        assert_eq!(file_stem("***"), "compressor");
    }

    #[test]
    fn test_unknown_tag_produces_nothing() {
        let (result, ctx) = fixture();
        let err = export_reports(&result, &["csv", "xml"], &ctx).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_duplicate_tags_rendered_once() {
        let (result, ctx) = fixture();
        let artifacts = export_reports(&result, &["csv", "CSV"], &ctx).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].format, ReportFormat::Csv);
    }

    #[test]
    fn test_context_from_defaults() {
        let defaults = ReportDefaults {
            company: "Acme".to_string(),
            engineer: "J. Smith".to_string(),
            job_id: "26-014".to_string(),
        };
        let ctx = ReportContext::from_defaults(&defaults, Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(ctx.company, "Acme");
        assert_eq!(ctx.date_string(), "2026-01-02");
    }
}
