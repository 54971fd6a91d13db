//! # File I/O Module
//!
//! Reads calculation inputs and writes report artifacts:
//! - **Operating points**: JSON documents deserialized into [`OperatingPoint`]
//! - **Parameter maps**: flat JSON objects of named numbers, interpreted in
//!   the unit system of the active [`CalcSettings`]
//! - **Settings**: JSON [`CalcSettings`] documents
//! - **Atomic saves**: reports are written to `.tmp`, synced, then renamed
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use compressor_core::calculations::calculate;
//! use compressor_core::file_io::{load_operating_point, write_artifact};
//! use compressor_core::report::{export_report, ReportContext};
//! use std::path::Path;
//!
//! let op = load_operating_point(Path::new("k101.json"))?;
//! let result = calculate(&op)?;
//! let artifact = export_report(&result, "pdf", &ReportContext::new(Utc::now()))?;
//! let written = write_artifact(&artifact, Path::new("reports"))?;
//! println!("Wrote {}", written.display());
//! # Ok::<(), compressor_core::errors::CalcError>(())
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::calculations::OperatingPoint;
use crate::errors::{CalcError, CalcResult};
use crate::parameters::operating_point_from_map;
use crate::report::ReportArtifact;
use crate::settings::CalcSettings;

fn read_to_string(path: &Path) -> CalcResult<String> {
    let mut file = File::open(path)
        .map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    Ok(contents)
}

/// Load and validate an operating point from a JSON file.
///
/// # Returns
///
/// * `Ok(OperatingPoint)` - Parsed and validated
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::InvalidInput)` - Parsed, but a value is out of range
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_operating_point(path: &Path) -> CalcResult<OperatingPoint> {
    let contents = read_to_string(path)?;

    let op: OperatingPoint = serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;
    op.validate()?;

    debug!(path = %path.display(), label = %op.label, "operating point loaded");
    Ok(op)
}

/// Load a flat parameter map (`{"suction_pressure": 1.0, ...}`) and
/// convert it using the unit system in `settings`.
pub fn load_parameters(path: &Path, settings: &CalcSettings) -> CalcResult<OperatingPoint> {
    let contents = read_to_string(path)?;

    let params: BTreeMap<String, f64> =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid parameter map in {}: {}", path.display(), e),
        })?;

    operating_point_from_map(&params, settings)
}

/// Load and validate calculation settings from a JSON file.
pub fn load_settings(path: &Path) -> CalcResult<CalcSettings> {
    let contents = read_to_string(path)?;
    CalcSettings::from_json(&contents)
}

/// Write a report artifact into `dir` with atomic write semantics.
///
/// The save process:
/// 1. Create `dir` if it does not exist
/// 2. Write the bytes to a temporary file (`<name>.tmp`)
/// 3. Sync to disk (fsync)
/// 4. Rename to the final name (atomic on most filesystems)
///
/// Returns the path of the written file. An existing file of the same name
/// is replaced.
pub fn write_artifact(artifact: &ReportArtifact, dir: &Path) -> CalcResult<PathBuf> {
    fs::create_dir_all(dir)
        .map_err(|e| CalcError::file_error("create directory", dir.display().to_string(), e.to_string()))?;

    let path = dir.join(artifact.file_name());
    let tmp_path = dir.join(format!("{}.tmp", artifact.file_name()));

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(&artifact.bytes).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    // Sync to disk
    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    drop(tmp_file);

    // Atomic rename
    fs::rename(&tmp_path, &path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), bytes = artifact.bytes.len(), "report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportFormat;
    use crate::units::UnitSystem;
    use tempfile::tempdir;

    fn artifact() -> ReportArtifact {
        ReportArtifact {
            format: ReportFormat::Csv,
            label: "K-101".to_string(),
            bytes: b"stage,mass_flow_kg_s\n".to_vec(),
        }
    }

    #[test]
    fn test_operating_point_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("op.json");
        let op = OperatingPoint::new(2.0, 10.0, 305.0, 900.0).with_label("K-200");
        fs::write(&path, serde_json::to_string_pretty(&op).unwrap()).unwrap();

        let loaded = load_operating_point(&path).unwrap();
        assert_eq!(loaded.label, "K-200");
        assert_eq!(loaded.suction_pressure_bar, 2.0);
        assert_eq!(loaded.discharge_pressure_bar, 10.0);
        assert_eq!(loaded.stages, op.stages);
    }

    #[test]
    fn test_operating_point_minimal_json_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("op.json");
        fs::write(
            &path,
            r#"{"suction_pressure_bar": 1.0, "discharge_pressure_bar": 8.0,
                "suction_temperature_k": 300.0, "speed_rpm": 1200.0}"#,
        )
        .unwrap();

        let loaded = load_operating_point(&path).unwrap();
        assert_eq!(loaded, OperatingPoint::new(1.0, 8.0, 300.0, 1200.0));
    }

    #[test]
    fn test_invalid_operating_point_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("op.json");
        fs::write(
            &path,
            r#"{"suction_pressure_bar": 8.0, "discharge_pressure_bar": 1.0,
                "suction_temperature_k": 300.0, "speed_rpm": 1200.0}"#,
        )
        .unwrap();

        let err = load_operating_point(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("op.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_operating_point(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let dir = tempdir().unwrap();
        let err = load_settings(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_parameters_use_settings_units() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("params.json");
        fs::write(
            &path,
            r#"{"suction_pressure": 0.0, "discharge_pressure": 100.0,
                "suction_temperature": 80.0, "speed_rpm": 1200.0}"#,
        )
        .unwrap();

        let settings = CalcSettings::default().with_unit_system(UnitSystem::Field);
        let op = load_parameters(&path, &settings).unwrap();
        assert!((op.suction_pressure_bar - settings.atmospheric_pressure_bar).abs() < 1e-9);
        assert!(op.discharge_pressure_bar > 7.0);
    }

    #[test]
    fn test_write_artifact_is_atomic() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("reports");

        let path = write_artifact(&artifact(), &out).unwrap();
        assert_eq!(path, out.join("k_101_performance.csv"));
        assert_eq!(fs::read(&path).unwrap(), artifact().bytes);
        assert!(!out.join("k_101_performance.csv.tmp").exists());
    }

    #[test]
    fn test_write_artifact_replaces_existing() {
        let dir = tempdir().unwrap();
        write_artifact(&artifact(), dir.path()).unwrap();

        let mut second = artifact();
        second.bytes = b"replaced".to_vec();
        let path = write_artifact(&second, dir.path()).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"replaced");
    }
}
