//! Error types for shape authoring and body construction.

use thiserror::Error;

/// Errors raised when building shapes, bodies and chains.
///
/// Only construction-time precondition violations are errors. The simulation
/// step itself is infallible: numeric edge cases are handled in place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KinematicsError {
    #[error("Shape::end() must be called before Shape::begin() can be called again")]
    ShapeAlreadyBegun,

    #[error("Shape::begin() must be called before adding points or calling end()")]
    ShapeNotBegun,

    #[error("a shape needs at least 3 distinct points, found {found}")]
    TooFewPoints { found: usize },

    #[error("shape points are collinear or collapsed onto their centroid")]
    DegenerateShape,

    #[error("mass must be positive (infinity means immovable), got {0}")]
    InvalidMass(f32),

    #[error("dimension must be positive and finite, got {0}")]
    InvalidDimension(f32),

    #[error("invalid segment or side count: {0}")]
    InvalidSegmentCount(usize),

    #[error("point mass index {index} out of range for {count} point masses")]
    PointMassOutOfRange { index: usize, count: usize },

    #[error("operation requires a spring or pressure body")]
    NotSpringBody,
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, KinematicsError>;

/// Reject zero, negative and NaN masses. `f32::INFINITY` is accepted.
pub(crate) fn validate_mass(mass: f32) -> Result<()> {
    if mass > 0.0 {
        Ok(())
    } else {
        Err(KinematicsError::InvalidMass(mass))
    }
}
