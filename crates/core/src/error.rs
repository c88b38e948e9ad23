//! Error types for Poromet

use std::collections::BTreeMap;
use std::fmt::Write as _;

use thiserror::Error;

/// Supported calibration combinations: `(width, height)` → magnifications.
pub type SupportedCombinations = BTreeMap<(usize, usize), Vec<u32>>;

/// Main error type for Poromet operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing, empty or undecodable input image
    #[error("Invalid input image: {0}")]
    Input(String),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error(
        "Unknown resolution ({width}x{height}) or magnification ({magnification}x). Available combinations: {}",
        format_supported(.supported)
    )]
    Calibration {
        width: usize,
        height: usize,
        magnification: u32,
        supported: SupportedCombinations,
    },

    /// Otsu's threshold is undefined for a constant image
    #[error("Image has zero intensity variance (constant value {value}); cannot segment")]
    DegenerateImage { value: f64 },

    #[error("No pores detected: thickness map has no non-zero values")]
    NoPoresDetected,

    #[error("Request exceeds limit: {what} = {actual} (maximum {limit})")]
    LimitExceeded {
        what: &'static str,
        actual: usize,
        limit: usize,
    },

    #[error("Computation cancelled: {0}")]
    Cancelled(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("{0}")]
    Other(String),
}

/// Whether an error was caused by the request or by the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rejected input, calibration or parameter (4xx)
    Client,
    /// Failure while computing a valid request (5xx)
    Server,
}

impl Error {
    /// Classify the error for the calling boundary.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Input(_)
            | Error::InvalidDimensions { .. }
            | Error::UnsupportedDataType(_)
            | Error::InvalidParameter { .. }
            | Error::Calibration { .. }
            | Error::LimitExceeded { .. } => ErrorClass::Client,
            _ => ErrorClass::Server,
        }
    }

    /// HTTP-style status code for the error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::LimitExceeded { .. } => 413,
            Error::Cancelled(_) => 503,
            e if e.class() == ErrorClass::Client => 400,
            _ => 500,
        }
    }

    /// Shorthand for an [`Error::InvalidParameter`].
    pub fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

fn format_supported(supported: &SupportedCombinations) -> String {
    let mut out = String::new();
    for (i, ((w, h), mags)) in supported.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        let _ = write!(out, "{}x{}: {:?}", w, h, mags);
    }
    out
}

/// Result type alias for Poromet operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(Error::Input("empty".into()).class(), ErrorClass::Client);
        assert_eq!(Error::NoPoresDetected.class(), ErrorClass::Server);
        assert_eq!(
            Error::DegenerateImage { value: 0.5 }.class(),
            ErrorClass::Server
        );
        assert_eq!(Error::invalid_parameter("bins", 0, "zero").status_code(), 400);
        assert_eq!(
            Error::LimitExceeded { what: "pixels", actual: 10, limit: 5 }.status_code(),
            413
        );
        assert_eq!(Error::Cancelled("deadline".into()).status_code(), 503);
        assert_eq!(Error::Export("disk full".into()).status_code(), 500);
    }

    #[test]
    fn test_calibration_message_lists_table() {
        let mut supported = SupportedCombinations::new();
        supported.insert((2560, 1920), vec![10, 20, 50, 100]);
        supported.insert((554, 416), vec![200]);
        let err = Error::Calibration {
            width: 2560,
            height: 1920,
            magnification: 15,
            supported,
        };
        let msg = err.to_string();
        assert!(msg.contains("(2560x1920)"));
        assert!(msg.contains("(15x)"));
        assert!(msg.contains("2560x1920: [10, 20, 50, 100]"));
        assert!(msg.contains("554x416: [200]"));
    }
}
