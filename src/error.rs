use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SplineError>;

/// Failures reported by spline construction, search and knot persistence.
#[derive(Debug, Error)]
pub enum SplineError {
    #[error("segment index {index} is out of range, spline has {count} segments")]
    InvalidSegment { index: usize, count: usize },

    #[error("failed to read knot data")]
    FileRead(#[source] io::Error),

    #[error("invalid knot data at line {line}: {message}")]
    FileFormat { line: usize, message: String },

    #[error("failed to write knot data")]
    FileWrite(#[source] io::Error),

    #[error("spline is undefined at x = {0}")]
    UndefinedAt(f64),

    #[error("interpolation failed: {0}")]
    InterpolationFailed(String),
}

impl SplineError {
    /// Negative status code for callers that report failures as plain integers.
    pub fn code(&self) -> i32 {
        match self {
            SplineError::InvalidSegment { .. } => -1,
            SplineError::FileRead(_) => -2,
            SplineError::FileFormat { .. } => -3,
            SplineError::FileWrite(_) => -4,
            SplineError::UndefinedAt(_) => -5,
            SplineError::InterpolationFailed(_) => -6,
        }
    }

    pub(crate) fn interpolation(message: impl Into<String>) -> Self {
        SplineError::InterpolationFailed(message.into())
    }
}
