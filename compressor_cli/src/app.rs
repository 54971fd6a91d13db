//! Application orchestration: load inputs, calculate, print, write reports.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use compressor_core::calculations::{calculate, OperatingPoint, PerformanceResult};
use compressor_core::file_io::{load_operating_point, load_parameters, load_settings, write_artifact};
use compressor_core::parameters::operating_point_from_map;
use compressor_core::report::{export_reports, ReportContext};
use compressor_core::settings::CalcSettings;
use compressor_core::units::{Celsius, Kelvin};
use tracing::{debug, info};

use crate::config::AppConfig;

/// Run the calculator with the given configuration.
pub fn run(config: &AppConfig) -> Result<()> {
    let settings = resolve_settings(config)?;
    let op = resolve_operating_point(config, &settings)?;
    debug!(label = %op.label, stages = op.stages, "operating point resolved");

    let result = calculate(&op).with_context(|| format!("performance calculation for '{}' failed", op.label))?;

    if config.json {
        let json = serde_json::to_string_pretty(&result).context("failed to serialize result")?;
        println!("{}", json);
    } else {
        print_summary(&result);
    }

    if !config.format.is_empty() {
        let ctx = report_context(config, &settings);
        let artifacts = export_reports(&result, config.format.as_slice(), &ctx).context("report generation failed")?;

        for artifact in &artifacts {
            let path = write_artifact(artifact, &config.output_dir)
                .with_context(|| format!("failed to write {} report", artifact.format))?;
            info!(path = %path.display(), "report written");
            if !config.json {
                println!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}

/// Settings file (if any) with the `--units` override applied.
fn resolve_settings(config: &AppConfig) -> Result<CalcSettings> {
    let mut settings = match &config.settings {
        Some(path) => load_settings(path).with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => CalcSettings::default(),
    };
    if let Some(units) = config.units {
        settings.unit_system = units;
    }
    Ok(settings)
}

fn resolve_operating_point(config: &AppConfig, settings: &CalcSettings) -> Result<OperatingPoint> {
    if let Some(path) = &config.input {
        return load_operating_point(path).with_context(|| format!("failed to load {}", path.display()));
    }

    if let Some(path) = &config.params_file {
        return load_parameters(path, settings).with_context(|| format!("failed to load {}", path.display()));
    }

    if config.param.is_empty() {
        bail!("no operating point given: use --input, --params-file, or --param KEY=VALUE");
    }

    let mut params = BTreeMap::new();
    for (key, value) in &config.param {
        if params.insert(key.clone(), *value).is_some() {
            bail!("parameter '{}' given more than once", key);
        }
    }

    operating_point_from_map(&params, settings).context("invalid parameters")
}

/// Report header: settings defaults overridden by flags, stamped now.
fn report_context(config: &AppConfig, settings: &CalcSettings) -> ReportContext {
    let mut ctx = ReportContext::from_defaults(&settings.report, Utc::now());
    if let Some(engineer) = &config.engineer {
        ctx.engineer = engineer.clone();
    }
    if let Some(job_id) = &config.job_id {
        ctx.job_id = job_id.clone();
    }
    if let Some(company) = &config.company {
        ctx.company = company.clone();
    }
    ctx
}

fn celsius(kelvin: f64) -> f64 {
    Celsius::from(Kelvin(kelvin)).value()
}

fn print_summary(result: &PerformanceResult) {
    let op = &result.operating_point;

    println!("═══════════════════════════════════════");
    println!("  {} PERFORMANCE", result.label.to_uppercase());
    println!("═══════════════════════════════════════");
    println!();
    println!("Operating point:");
    println!("  Suction:    {:.3} bar(a), {:.1} °C", op.suction_pressure_bar, celsius(op.suction_temperature_k));
    println!("  Discharge:  {:.3} bar(a)", op.discharge_pressure_bar);
    println!("  Speed:      {:.0} rpm, {} stage(s)", op.speed_rpm, op.stages);
    println!("  Gas:        {} (MW {:.2}, k {:.3})", op.gas.name, op.gas.molecular_weight, op.gas.specific_heat_ratio);
    println!();
    println!("Stages:");
    for stage in &result.stages {
        println!(
            "  {}: {:.3} -> {:.3} bar(a), r {:.3}, Td {:.1} °C, VE {:.3}, BP {:.1} kW",
            stage.stage,
            stage.suction_pressure_bar,
            stage.discharge_pressure_bar,
            stage.pressure_ratio,
            celsius(stage.discharge_temperature_k),
            stage.volumetric_efficiency,
            stage.brake_power_kw,
        );
    }
    println!();
    println!("Results:");
    println!("  Compression ratio: {:.3}", result.compression_ratio);
    println!("  Capacity:          {:.1} m3/h ({:.1} Nm3/h)", result.actual_capacity_m3_h, result.normal_flow_nm3_h);
    println!("  Mass flow:         {:.4} kg/s", result.mass_flow_kg_s);
    println!("  Brake power:       {:.1} kW ({:.1} hp)", result.brake_power_kw, result.brake_horsepower);
    println!();
    println!("Limit checks:");
    for check in &result.checks {
        println!(
            "  {:<34} {:.2} {}",
            check.name,
            check.unity,
            status_icon(check.passes)
        );
    }
    println!();
    println!("═══════════════════════════════════════");
    match result.governing_check() {
        Some(check) => println!(
            "  RESULT: {} (governs: {})",
            if result.passes() { "PASS" } else { "FAIL" },
            check.name
        ),
        None => println!("  RESULT: {}", if result.passes() { "PASS" } else { "FAIL" }),
    }
    println!("═══════════════════════════════════════");
}

fn status_icon(pass: bool) -> &'static str {
    if pass { "[OK]" } else { "[FAIL]" }
}
