//! End-to-end CLI integration tests.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn recipcalc() -> Command {
    let mut cmd = Command::cargo_bin("recipcalc").expect("binary not found");
    for var in ["RECIPCALC_UNITS", "RECIPCALC_SETTINGS", "RECIPCALC_ENGINEER", "RECIPCALC_JOB_ID", "RECIPCALC_COMPANY"] {
        cmd.env_remove(var);
    }
    cmd
}

const BASE_PARAMS: [&str; 8] = [
    "--param",
    "suction_pressure=1.0",
    "--param",
    "discharge_pressure=8.0",
    "--param",
    "suction_temperature=300",
    "--param",
    "speed_rpm=1200",
];

#[test]
fn help_flag() {
    recipcalc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compressor"));
}

#[test]
fn summary_from_params() {
    recipcalc()
        .args(BASE_PARAMS)
        .assert()
        .success()
        .stdout(predicate::str::contains("Compression ratio: 8.000"))
        .stdout(predicate::str::contains("Stage 1 discharge temperature"));
}

#[test]
fn json_output_is_parseable() {
    let output = recipcalc().args(BASE_PARAMS).arg("--json").output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["compression_ratio"].as_f64(), Some(8.0));
    assert_eq!(value["stages"].as_array().map(Vec::len), Some(1));
}

#[test]
fn writes_all_report_formats() {
    let dir = tempdir().unwrap();

    recipcalc()
        .args(BASE_PARAMS)
        .args(["--format", "csv", "--format", "xlsx", "--format", "pdf"])
        .args(["--engineer", "J. Smith", "--job-id", "26-014"])
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("compressor_performance.pdf"));

    let csv = fs::read_to_string(dir.path().join("compressor_performance.csv")).unwrap();
    assert!(csv.starts_with("stage,"));
    assert!(csv.lines().last().unwrap().starts_with("total,"));

    let xlsx = fs::read(dir.path().join("compressor_performance.xlsx")).unwrap();
    assert!(xlsx.starts_with(b"PK"));

    let pdf = fs::read(dir.path().join("compressor_performance.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn unsupported_format_fails_without_output() {
    let dir = tempdir().unwrap();

    recipcalc()
        .args(BASE_PARAMS)
        .args(["--format", "csv", "--format", "XML"])
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported report format 'XML'"));

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn discharge_below_suction_fails() {
    recipcalc()
        .args([
            "--param",
            "suction_pressure=8.0",
            "--param",
            "discharge_pressure=1.0",
            "--param",
            "suction_temperature=300",
            "--param",
            "speed_rpm=1200",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("discharge_pressure"));
}

#[test]
fn missing_parameter_is_named() {
    recipcalc()
        .args(["--param", "suction_pressure=1.0", "--param", "discharge_pressure=8.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required field"));
}

#[test]
fn no_input_fails() {
    recipcalc()
        .assert()
        .failure()
        .stderr(predicate::str::contains("no operating point given"));
}

#[test]
fn field_units_from_params_file() {
    let dir = tempdir().unwrap();
    let params = dir.path().join("k101.json");
    fs::write(
        &params,
        r#"{"suction_pressure": 50.0, "discharge_pressure": 400.0,
            "suction_temperature": 80.0, "speed_rpm": 1000.0,
            "bore": 8.0, "stroke": 5.0}"#,
    )
    .unwrap();

    let output = recipcalc()
        .arg("--params-file")
        .arg(&params)
        .args(["--units", "field", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let stroke = value["operating_point"]["stroke_m"].as_f64().unwrap();
    assert!((stroke - 0.127).abs() < 1e-9);
}

#[test]
fn operating_point_json_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("op.json");
    fs::write(
        &input,
        r#"{"label": "K-200", "suction_pressure_bar": 2.0, "discharge_pressure_bar": 30.0,
            "suction_temperature_k": 305.0, "speed_rpm": 900.0, "stages": 2,
            "interstage_cooler": {}}"#,
    )
    .unwrap();

    recipcalc()
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("K-200 PERFORMANCE"))
        .stdout(predicate::str::contains("Stage 2 capacity load"));
}

#[test]
fn settings_file_supplies_units() {
    let dir = tempdir().unwrap();
    let settings = dir.path().join("settings.json");
    fs::write(&settings, r#"{"unit_system": "metric"}"#).unwrap();

    let output = recipcalc()
        .arg("--settings")
        .arg(&settings)
        .args([
            "--param",
            "suction_pressure=0",
            "--param",
            "discharge_pressure=7",
            "--param",
            "suction_temperature=27",
            "--param",
            "speed_rpm=1200",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ps = value["operating_point"]["suction_pressure_bar"].as_f64().unwrap();
    assert!((ps - 1.01325).abs() < 1e-9);
}

#[test]
fn rust_log_raises_level() {
    recipcalc()
        .env("RUST_LOG", "debug")
        .args(BASE_PARAMS)
        .assert()
        .success()
        .stderr(predicate::str::contains("operating point resolved"));

    recipcalc()
        .env_remove("RUST_LOG")
        .args(BASE_PARAMS)
        .assert()
        .success()
        .stderr(predicate::str::contains("operating point resolved").not());
}

#[test]
fn required_mass_flow_param() {
    let output = recipcalc()
        .args(BASE_PARAMS)
        .args(["--param", "mass_flow=0.05", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["mass_flow_kg_s"].as_f64(), Some(0.05));
    assert_eq!(value["operating_point"]["mass_flow_kg_s"].as_f64(), Some(0.05));
}

#[test]
fn huge_stage_count_rejected() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("op.json");
    fs::write(
        &input,
        r#"{"suction_pressure_bar": 1.0, "discharge_pressure_bar": 8.0,
            "suction_temperature_k": 300.0, "speed_rpm": 1200.0, "stages": 4294967295}"#,
    )
    .unwrap();

    recipcalc()
        .arg("--input")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("stages"));
}

#[test]
fn pdf_with_comment_syntax_in_label() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("op.json");
    fs::write(
        &input,
        r#"{"label": "K-101 // spare /* B", "suction_pressure_bar": 1.0, "discharge_pressure_bar": 8.0,
            "suction_temperature_k": 300.0, "speed_rpm": 1200.0}"#,
    )
    .unwrap();

    recipcalc()
        .arg("--input")
        .arg(&input)
        .args(["--format", "pdf", "--company", "= {{COMPANY}} //"])
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .success();

    let pdf = fs::read(dir.path().join("k_101_spare_b_performance.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}
