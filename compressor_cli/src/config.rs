//! Command-line configuration from flags and environment.

use std::path::PathBuf;

use clap::Parser;
use compressor_core::units::UnitSystem;

/// RecipCalc - reciprocating compressor performance calculator.
#[derive(Parser, Debug)]
#[command(name = "recipcalc", version, about)]
pub struct AppConfig {
    /// Operating point JSON file.
    #[arg(short, long, conflicts_with_all = ["params_file", "param"])]
    pub input: Option<PathBuf>,

    /// Flat JSON file of named parameters, read in the selected unit system.
    #[arg(long, conflicts_with = "param")]
    pub params_file: Option<PathBuf>,

    /// Named parameter, e.g. `--param suction_pressure=1.0` (repeatable).
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub param: Vec<(String, f64)>,

    /// Unit system for parameters: si, field, or metric.
    #[arg(short, long, env = "RECIPCALC_UNITS")]
    pub units: Option<UnitSystem>,

    /// Settings JSON file.
    #[arg(short, long, env = "RECIPCALC_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Report format to write: csv, xlsx, or pdf (repeatable).
    #[arg(short, long = "format", value_name = "TAG")]
    pub format: Vec<String>,

    /// Directory for report files.
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Engineer name printed in reports.
    #[arg(long, env = "RECIPCALC_ENGINEER")]
    pub engineer: Option<String>,

    /// Job identifier printed in reports.
    #[arg(long, env = "RECIPCALC_JOB_ID")]
    pub job_id: Option<String>,

    /// Company name printed in reports.
    #[arg(long, env = "RECIPCALC_COMPANY")]
    pub company: Option<String>,

    /// Print the full result as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,

    /// Verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

/// Parse a `KEY=VALUE` pair with a numeric value.
fn parse_param(s: &str) -> Result<(String, f64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in '{}'", s));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    Ok((key.to_string(), value))
}
