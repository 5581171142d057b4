//! Error types for rasterization and margin fields.

use thiserror::Error;

/// Result type for rasterization.
pub type RasterResult<T> = Result<T, RasterError>;

/// Result type for margin field computation.
pub type MarginResult<T> = Result<T, MarginError>;

/// Errors that can occur while rasterizing a trajectory.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum RasterError {
    /// Entry and target coincide, so there is no segment to sample.
    #[error("trajectory entry and target coincide")]
    DegenerateTrajectory,

    /// No sample of the trajectory falls inside the grid.
    #[error("trajectory lies entirely outside the grid ({samples} samples)")]
    OutsideGrid {
        /// Number of samples taken.
        samples: usize,
    },
}

/// Errors that can occur while computing a margin field.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum MarginError {
    /// The centerline mask has no voxels set.
    ///
    /// Rasterization never produces an empty centerline, so this indicates a
    /// broken invariant upstream rather than bad user input.
    #[error("centerline mask is empty")]
    EmptyCenterline,

    /// The distance bound is not a positive finite number.
    #[error("invalid margin distance bound: {0}")]
    InvalidDistance(f64),

    /// The unit factor is not positive and finite.
    #[error("invalid unit factor: {0}")]
    InvalidUnitFactor(f64),

    /// The centerline mask does not cover the grid.
    #[error("centerline shape {actual:?} does not match grid shape {expected:?}")]
    ShapeMismatch {
        /// Grid shape.
        expected: [usize; 3],
        /// Centerline mask shape.
        actual: [usize; 3],
    },
}
