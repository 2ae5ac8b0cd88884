// src/math/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient points for operation: expected at least {expected}, got {actual}")]
    InsufficientPoints { expected: usize, actual: usize },

    #[error(
        "Coordinate reference system mismatch: {input} uses '{found}', expected '{expected}'"
    )]
    CoordinateSystemMismatch {
        expected: String,
        found: String,
        input: String,
    },

    #[error("Degenerate input at point #{index}: {reason}")]
    DegenerateInput { index: usize, reason: String },

    #[error("Point #{index} has no attribute '{attribute}'")]
    MissingAttribute { index: usize, attribute: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Triangulation failed: {reason}")]
    TriangulationFailed { reason: String },

    #[error("Geometric calculation failed: {operation}")]
    GeometricFailure { operation: String },
}

impl MathError {
    /// Zwei Punkte mit identischen Koordinaten.
    pub fn duplicate(index: usize, duplicate_of: usize) -> Self {
        MathError::DegenerateInput {
            index,
            reason: format!("coincides with point #{}", duplicate_of),
        }
    }
}

pub type MathResult<T> = Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_names_both_points() {
        let err = MathError::duplicate(3, 1);
        assert_eq!(
            err.to_string(),
            "Degenerate input at point #3: coincides with point #1"
        );
    }

    #[test]
    fn test_insufficient_points_message() {
        let err = MathError::InsufficientPoints {
            expected: 2,
            actual: 1,
        };
        assert!(err.to_string().contains("expected at least 2, got 1"));
    }
}
