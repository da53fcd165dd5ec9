//! Error types for dataset loading, parameter validation and projection runs

use thiserror::Error;

/// Errors reported by the projection engine
///
/// Business outcomes such as an unreachable equilibrium are not errors; they
/// are reported as `None` on the affected year point.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// A per-age array does not have one entry per modelled age
    #[error("{field}: expected {expected} entries, found {actual}")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// An age reference lies outside the modelled age range
    #[error("{field}: age {age} is outside 0..={max_age}")]
    AgeOutOfBounds {
        field: String,
        age: usize,
        max_age: usize,
    },

    /// A user parameter lies outside its declared range
    #[error("parameter {name} = {value} is outside [{min}, {max}]")]
    ParameterOutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A value is structurally invalid (negative, non-finite, inconsistent)
    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ProjectionError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ProjectionError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
