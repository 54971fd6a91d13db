//! # Error Types
//!
//! Structured error types for compressor_core. Every failure is a rejected
//! single operation: the calculator and the report serializers never retry
//! and never substitute default values.
//!
//! ## Example
//!
//! ```rust
//! use compressor_core::errors::{CalcError, CalcResult};
//!
//! fn validate_speed(speed_rpm: f64) -> CalcResult<()> {
//!     if speed_rpm <= 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "speed_rpm".to_string(),
//!             value: speed_rpm.to_string(),
//!             reason: "Speed must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for compressor_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation and report operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is out of physical range or inconsistent with another input
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required parameter is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// The requested report format tag is not recognized
    #[error("Unsupported report format '{format}' (supported: {supported})")]
    UnsupportedFormat { format: String, supported: String },

    /// A report serializer failed to produce its byte stream
    #[error("Report generation failed: {format} - {reason}")]
    ReportFailed { format: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create an UnsupportedFormat error
    pub fn unsupported_format(format: impl Into<String>, supported: impl Into<String>) -> Self {
        CalcError::UnsupportedFormat {
            format: format.into(),
            supported: supported.into(),
        }
    }

    /// Create a ReportFailed error
    pub fn report_failed(format: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ReportFailed {
            format: format.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            CalcError::ReportFailed { .. } => "REPORT_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Name of the offending input field, when the error is about an input
    pub fn field(&self) -> Option<&str> {
        match self {
            CalcError::InvalidInput { field, .. } | CalcError::MissingField { field } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("discharge_pressure_bar", "0.5", "Must exceed suction pressure");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("speed_rpm").error_code(), "MISSING_FIELD");
        assert_eq!(CalcError::unsupported_format("XML", "csv, xlsx, pdf").error_code(), "UNSUPPORTED_FORMAT");
        assert_eq!(CalcError::report_failed("pdf", "boom").error_code(), "REPORT_FAILED");
    }

    #[test]
    fn test_field_accessor() {
        assert_eq!(CalcError::missing_field("stroke").field(), Some("stroke"));
        assert_eq!(CalcError::invalid_input("bore", "-1", "negative").field(), Some("bore"));
        assert_eq!(CalcError::unsupported_format("xml", "csv").field(), None);
    }

    #[test]
    fn test_unsupported_format_message() {
        let err = CalcError::unsupported_format("XML", "csv, xlsx, pdf");
        assert_eq!(err.to_string(), "Unsupported report format 'XML' (supported: csv, xlsx, pdf)");
    }
}
